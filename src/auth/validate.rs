//! Synchronous field validation, run before any write. Each function
//! returns `None` on success or a per-field message.

/// Validate a full name: at least 3 chars, letters and spaces only.
pub fn validate_full_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some("Full name is required".to_string());
    }
    if trimmed.chars().count() < 3 {
        return Some("Full name must be at least 3 characters".to_string());
    }
    if !trimmed.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Some("Full name may only contain letters and spaces".to_string());
    }
    None
}

/// Validate a student id: 8-15 digits.
pub fn validate_student_id(student_id: &str) -> Option<String> {
    let trimmed = student_id.trim();
    if trimmed.is_empty() {
        return Some("Student id is required".to_string());
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some("Student id must be numeric".to_string());
    }
    if trimmed.len() < 8 || trimmed.len() > 15 {
        return Some("Student id must be 8-15 digits".to_string());
    }
    None
}

/// Score a password 0-5: length >= 8, lowercase, uppercase, digit, symbol.
/// Returns the score and the missing criteria.
pub fn password_strength(password: &str) -> (u8, Vec<&'static str>) {
    if password.is_empty() {
        return (0, vec![]);
    }

    let mut score = 0;
    let mut missing = Vec::new();

    if password.len() >= 8 {
        score += 1;
    } else {
        missing.push("at least 8 characters");
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    } else {
        missing.push("a lowercase letter");
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    } else {
        missing.push("an uppercase letter");
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    } else {
        missing.push("a digit");
    }
    if password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)) {
        score += 1;
    } else {
        missing.push("a symbol");
    }

    (score, missing)
}

/// Validate a registration password: min 8 chars and strength score >= 3.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    let (score, missing) = password_strength(password);
    if score < 3 {
        return Some(format!("Password is too weak (needs {})", missing.join(", ")));
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate a wall-clock time in HH:MM form.
pub fn validate_time(value: &str, field_name: &str) -> Option<String> {
    let ok = value.len() == 5
        && value.as_bytes()[2] == b':'
        && value[..2].parse::<u8>().map(|h| h < 24).unwrap_or(false)
        && value[3..].parse::<u8>().map(|m| m < 60).unwrap_or(false);
    if ok {
        None
    } else {
        Some(format!("{field_name} must be a valid HH:MM time"))
    }
}
