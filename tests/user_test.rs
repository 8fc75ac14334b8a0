//! User model tests — account creation, the duplicate student id conflict,
//! search, role counts, and role updates.

mod common;

use abjar::errors::AppError;
use abjar::models::user::*;
use common::*;

fn new_user(name: &str, student_id: &str) -> NewUser {
    NewUser {
        full_name: name.to_string(),
        student_id: student_id.to_string(),
        password: TEST_PASSWORD_HASH.to_string(),
    }
}

#[test]
fn test_create_user_defaults_to_member() {
    let (_dir, conn) = setup_test_db();

    let id = create(&conn, &new_user("Andi Pratama", "12345678")).expect("create");
    let user = find_by_id(&conn, id).expect("query").expect("user");

    assert_eq!(user.role, Role::Member);
    assert_eq!(user.full_name, "Andi Pratama");
    assert_eq!(user.student_id, "12345678");
}

#[test]
fn test_duplicate_student_id_is_a_conflict() {
    let (_dir, conn) = setup_test_db();
    create(&conn, &new_user("Andi Pratama", "12345678")).expect("first");

    let err = create(&conn, &new_user("Someone Else", "12345678")).expect_err("duplicate");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn test_find_by_student_id() {
    let (_dir, conn) = setup_test_db();
    let id = create(&conn, &new_user("Andi Pratama", "12345678")).expect("create");

    let found = find_by_student_id(&conn, "12345678").expect("query").expect("user");
    assert_eq!(found.id, id);
    assert!(find_by_student_id(&conn, "99999999").expect("query").is_none());
}

#[test]
fn test_list_search_matches_name_and_student_id() {
    let (_dir, conn) = setup_test_db();
    create(&conn, &new_user("Andi Pratama", "12345678")).expect("create");
    create(&conn, &new_user("Citra Dewi", "87654321")).expect("create");

    let by_name = list(&conn, Some("pratama")).expect("search");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].full_name, "Andi Pratama");

    let by_sid = list(&conn, Some("8765")).expect("search");
    assert_eq!(by_sid.len(), 1);
    assert_eq!(by_sid[0].full_name, "Citra Dewi");

    // Blank search is the unfiltered listing.
    assert_eq!(list(&conn, Some("  ")).expect("blank").len(), 2);
    assert_eq!(list(&conn, None).expect("all").len(), 2);
}

#[test]
fn test_role_counts() {
    let (_dir, conn) = setup_test_db();
    create_member(&conn, "Andi Pratama", "12345678");
    create_member(&conn, "Citra Dewi", "11112222");
    create_admin(&conn, "Budi Santoso", "87654321");
    create_super_admin(&conn);

    let counts = role_counts(&conn).expect("counts");
    assert_eq!(counts.total, 4);
    assert_eq!(counts.members, 2);
    assert_eq!(counts.admins, 1);
    assert_eq!(counts.super_admins, 1);
}

#[test]
fn test_update_role_round_trip() {
    let (_dir, conn) = setup_test_db();
    let id = create_member(&conn, "Andi Pratama", "12345678");

    update_role(&conn, id, Role::Admin).expect("promote");
    assert_eq!(find_by_id(&conn, id).expect("q").expect("u").role, Role::Admin);
    assert_eq!(count_by_role(&conn, Role::Admin).expect("count"), 1);

    update_role(&conn, id, Role::Member).expect("demote");
    assert_eq!(find_by_id(&conn, id).expect("q").expect("u").role, Role::Member);
}

#[test]
fn test_user_display_has_no_password() {
    let (_dir, conn) = setup_test_db();
    let id = create(&conn, &new_user("Andi Pratama", "12345678")).expect("create");
    let user = find_by_id(&conn, id).expect("q").expect("u");

    let json = serde_json::to_value(UserDisplay::from(user)).expect("serialize");
    assert!(json.get("password").is_none());
    assert_eq!(json["role"], "member");
}
