//! Auth building-block tests — password hashing and verification, the
//! suggested-password generator, and field validation.

use abjar::auth::password;
use abjar::auth::validate::*;

const TEST_PASSWORD: &str = "Str0ng!pass";

#[test]
fn test_hash_and_verify_password() {
    let hash = password::hash_password(TEST_PASSWORD).expect("Failed to hash password");

    assert_ne!(hash, TEST_PASSWORD);
    assert!(password::verify_password(TEST_PASSWORD, &hash).expect("verify"));
    assert!(!password::verify_password("wrong-password", &hash).expect("verify"));
}

#[test]
fn test_hashes_are_salted() {
    let first = password::hash_password(TEST_PASSWORD).expect("hash");
    let second = password::hash_password(TEST_PASSWORD).expect("hash");
    assert_ne!(first, second);
}

#[test]
fn test_verify_rejects_garbage_hash() {
    assert!(password::verify_password(TEST_PASSWORD, "not-a-phc-string").is_err());
}

#[test]
fn test_generated_password_shape() {
    const CHARSET: &str =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";
    let generated = password::generate_password();
    assert_eq!(generated.chars().count(), 12);
    assert!(generated.chars().all(|c| CHARSET.contains(c)));
}

#[test]
fn test_full_name_validation() {
    assert!(validate_full_name("Andi Pratama").is_none());
    assert!(validate_full_name("").is_some());
    assert!(validate_full_name("Al").is_some());
    assert!(validate_full_name("Andi123").is_some());
}

#[test]
fn test_student_id_validation() {
    assert!(validate_student_id("12345678").is_none());
    assert!(validate_student_id("123456789012345").is_none());
    assert!(validate_student_id("1234567").is_some());
    assert!(validate_student_id("1234567890123456").is_some());
    assert!(validate_student_id("1234abcd").is_some());
    assert!(validate_student_id("").is_some());
}

#[test]
fn test_password_strength_scoring() {
    assert_eq!(password_strength("").0, 0);
    assert_eq!(password_strength("abc").0, 1);
    assert_eq!(password_strength("Str0ng!pass").0, 5);

    let (_, missing) = password_strength("alllowercase");
    assert!(missing.contains(&"an uppercase letter"));
    assert!(missing.contains(&"a digit"));
}

#[test]
fn test_password_validation_threshold() {
    assert!(validate_password("Str0ngpass").is_none());
    assert!(validate_password("short").is_some());
    assert!(validate_password("alllowercaseonly").is_some());
    assert!(validate_password("").is_some());
}

#[test]
fn test_time_validation() {
    assert!(validate_time("08:00", "Start time").is_none());
    assert!(validate_time("23:59", "Start time").is_none());
    assert!(validate_time("24:00", "Start time").is_some());
    assert!(validate_time("08:60", "Start time").is_some());
    assert!(validate_time("8:00", "Start time").is_some());
    assert!(validate_time("0800", "Start time").is_some());
}

#[test]
fn test_required_and_optional_fields() {
    assert!(validate_required("Mathematics", "Course", 100).is_none());
    assert!(validate_required("   ", "Course", 100).is_some());
    assert!(validate_required(&"x".repeat(101), "Course", 100).is_some());

    assert!(validate_optional("", "Description", 10).is_none());
    assert!(validate_optional(&"x".repeat(11), "Description", 10).is_some());
}
