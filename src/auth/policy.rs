//! Role-based authorization predicates. Pure functions over role data the
//! caller has just fetched — handlers must not reuse roles cached in a
//! session or an earlier response.
//!
//! The approval relation is deliberately not a ranking: super admins decide
//! admin attendance, admins decide member attendance, and nothing else.

use crate::models::user::Role;
use crate::models::attendance::AttendanceStatus;

/// Maximum number of admin accounts. The super admin is singular by seeding
/// and never assignable, so it has no counter here.
pub const MAX_ADMINS: i64 = 2;

/// May `actor` decide (approve or reject) an attendance record submitted by
/// a user with `submitter_role`, currently in `status`?
pub fn can_approve(actor: Role, submitter_role: Role, status: AttendanceStatus) -> bool {
    if status != AttendanceStatus::Pending {
        return false;
    }
    match actor {
        Role::SuperAdmin => submitter_role == Role::Admin,
        Role::Admin => submitter_role == Role::Member,
        Role::Member => false,
    }
}

/// May `actor` promote `target` to admin, given the current admin count?
pub fn can_promote(
    actor: Role,
    actor_id: i64,
    target: Role,
    target_id: i64,
    admin_count: i64,
) -> bool {
    actor == Role::SuperAdmin
        && target == Role::Member
        && target_id != actor_id
        && admin_count < MAX_ADMINS
}

/// May `actor` demote `target` back to member?
pub fn can_demote(actor: Role, actor_id: i64, target: Role, target_id: i64) -> bool {
    actor == Role::SuperAdmin && target == Role::Admin && target_id != actor_id
}

/// Schedules and tasks are managed by admins and the super admin.
pub fn can_manage_catalog(role: Role) -> bool {
    matches!(role, Role::Admin | Role::SuperAdmin)
}

/// Only members and admins attend classes; the super admin never does.
pub fn can_attend(role: Role) -> bool {
    matches!(role, Role::Member | Role::Admin)
}

/// Task completions belong to members and admins, mirroring `can_attend`.
pub fn can_mark_complete(role: Role) -> bool {
    matches!(role, Role::Member | Role::Admin)
}

/// Per-task completion statistics are an oversight feature.
pub fn can_view_stats(role: Role) -> bool {
    matches!(role, Role::Admin | Role::SuperAdmin)
}
