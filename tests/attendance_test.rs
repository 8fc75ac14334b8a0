//! Attendance model tests — submission uniqueness, the pending-only
//! decision transition, filtered listing, and status tallies.

mod common;

use abjar::errors::AppError;
use abjar::models::attendance::*;
use abjar::models::user::Role;
use common::*;

const DATE: &str = "2025-03-10";
const NOW: &str = "2025-03-10T10:00:00Z";

#[test]
fn test_submit_creates_pending_record() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", member);

    let id = submit(&conn, member, schedule, DATE).expect("Failed to submit");
    let record = find_by_id(&conn, id).expect("query").expect("record exists");

    assert_eq!(record.status, AttendanceStatus::Pending);
    assert_eq!(record.user_name, "Andi Pratama");
    assert_eq!(record.course, "Mathematics");
    assert!(record.approved_by.is_none());
}

#[test]
fn test_duplicate_submission_is_a_conflict() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", member);

    submit(&conn, member, schedule, DATE).expect("first submission");
    let err = submit(&conn, member, schedule, DATE).expect_err("duplicate must fail");
    assert!(matches!(err, AppError::Conflict(_)));

    // Same class on another day is fine.
    submit(&conn, member, schedule, "2025-03-17").expect("next week's submission");
}

#[test]
fn test_decide_moves_pending_to_terminal() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let admin = create_admin(&conn, "Budi Santoso", "87654321");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", admin);
    let id = submit(&conn, member, schedule, DATE).expect("submit");

    decide(&conn, id, AttendanceStatus::Approved, admin, NOW).expect("approve");

    let record = find_by_id(&conn, id).expect("query").expect("record");
    assert_eq!(record.status, AttendanceStatus::Approved);
    assert_eq!(record.approved_by, Some(admin));
    assert_eq!(record.approver_name.as_deref(), Some("Budi Santoso"));
    assert_eq!(record.approved_at.as_deref(), Some(NOW));
}

#[test]
fn test_decided_record_cannot_be_decided_again() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let admin = create_admin(&conn, "Budi Santoso", "87654321");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", admin);
    let id = submit(&conn, member, schedule, DATE).expect("submit");

    decide(&conn, id, AttendanceStatus::Rejected, admin, NOW).expect("reject");
    let err = decide(&conn, id, AttendanceStatus::Approved, admin, NOW)
        .expect_err("second decision must fail");
    assert!(matches!(err, AppError::Conflict(_)));

    // The first decision stands.
    let record = find_by_id(&conn, id).expect("query").expect("record");
    assert_eq!(record.status, AttendanceStatus::Rejected);
}

#[test]
fn test_list_scoped_to_one_user() {
    let (_dir, conn) = setup_test_db();
    let a = create_member(&conn, "Andi Pratama", "12345678");
    let b = create_member(&conn, "Citra Dewi", "11112222");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", a);

    submit(&conn, a, schedule, DATE).expect("submit a");
    submit(&conn, b, schedule, DATE).expect("submit b");

    let filter = ListFilter {
        user_id: Some(a),
        ..Default::default()
    };
    let records = list(&conn, &filter).expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, a);
}

#[test]
fn test_list_filters_by_date_and_status() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let admin = create_admin(&conn, "Budi Santoso", "87654321");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", admin);

    let first = submit(&conn, member, schedule, DATE).expect("submit");
    submit(&conn, member, schedule, "2025-03-17").expect("submit later");
    decide(&conn, first, AttendanceStatus::Approved, admin, NOW).expect("approve");

    let filter = ListFilter {
        date: Some(DATE.to_string()),
        status: Some(AttendanceStatus::Approved),
        ..Default::default()
    };
    let records = list(&conn, &filter).expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, first);
}

#[test]
fn test_list_pagination() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", member);
    for day in 10..15 {
        submit(&conn, member, schedule, &format!("2025-03-{day}")).expect("submit");
    }

    let filter = ListFilter {
        offset: 2,
        limit: Some(2),
        ..Default::default()
    };
    assert_eq!(list(&conn, &filter).expect("page").len(), 2);

    let past_end = ListFilter {
        offset: 10,
        limit: Some(2),
        ..Default::default()
    };
    assert!(list(&conn, &past_end).expect("empty page").is_empty());
}

#[test]
fn test_status_counts_ignore_pagination() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let admin = create_admin(&conn, "Budi Santoso", "87654321");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", admin);

    let ids: Vec<i64> = (10..14)
        .map(|day| submit(&conn, member, schedule, &format!("2025-03-{day}")).expect("submit"))
        .collect();
    decide(&conn, ids[0], AttendanceStatus::Approved, admin, NOW).expect("approve");
    decide(&conn, ids[1], AttendanceStatus::Rejected, admin, NOW).expect("reject");

    let filter = ListFilter {
        limit: Some(1),
        ..Default::default()
    };
    let counts = status_counts(&conn, &filter).expect("counts");
    assert_eq!(counts.total, 4);
    assert_eq!(counts.pending, 2);
    assert_eq!(counts.approved, 1);
    assert_eq!(counts.rejected, 1);
}

#[test]
fn test_pending_counts_by_submitter_role() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let admin = create_admin(&conn, "Budi Santoso", "87654321");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", admin);

    submit(&conn, member, schedule, DATE).expect("member submits");
    submit(&conn, admin, schedule, DATE).expect("admin submits");

    assert_eq!(count_pending_by_submitter_role(&conn, Role::Member).expect("count"), 1);
    assert_eq!(count_pending_by_submitter_role(&conn, Role::Admin).expect("count"), 1);
    assert_eq!(count_pending_for_user(&conn, member).expect("count"), 1);
}

#[test]
fn test_dated_statuses_since_cutoff() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", member);

    insert_attendance(&conn, member, schedule, "2025-03-01", "approved");
    insert_attendance(&conn, member, schedule, "2025-03-09", "approved");
    insert_attendance(&conn, member, schedule, "2025-03-10", "pending");

    let recent = dated_statuses_since(&conn, member, "2025-03-09").expect("query");
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|r| r.date.as_str() >= "2025-03-09"));
}

#[test]
fn test_submitted_schedule_ids_for_one_day() {
    let (_dir, conn) = setup_test_db();
    let member = create_member(&conn, "Andi Pratama", "12345678");
    let math = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", member);
    let physics = create_schedule(&conn, "Physics", "monday", "10:00", "12:00", member);

    submit(&conn, member, math, DATE).expect("submit");

    let ids = submitted_schedule_ids(&conn, member, DATE).expect("query");
    assert_eq!(ids, vec![math]);
    assert!(!ids.contains(&physics));
}

#[test]
fn test_export_listing_is_oldest_first_and_scoped() {
    let (_dir, conn) = setup_test_db();
    let a = create_member(&conn, "Andi Pratama", "12345678");
    let b = create_member(&conn, "Citra Dewi", "11112222");
    let schedule = create_schedule(&conn, "Mathematics", "monday", "08:00", "10:00", a);

    submit(&conn, a, schedule, "2025-03-17").expect("submit");
    submit(&conn, a, schedule, "2025-03-10").expect("submit");
    submit(&conn, b, schedule, "2025-03-10").expect("submit");

    let all = list_for_export(&conn, None).expect("all");
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].date <= w[1].date));

    let mine = list_for_export(&conn, Some(a)).expect("scoped");
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|r| r.user_id == a));
}
