//! Request Validation
//! Mission: Reject malformed input before it touches the store

use crate::api::response::{ApiError, FieldError};
use crate::auth::models::{LoginRequest, RegisterRequest};
use crate::models::{CreateUserRequest, UserPatch, UserRole};

pub fn validate_register(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    check_name("name", &req.name, &mut errors);
    check_email("email", &req.email, &mut errors);
    check_password("password", &req.password, &mut errors);
    finish(errors)
}

pub fn validate_login(req: &LoginRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    check_email("email", &req.email, &mut errors);
    if req.password.is_empty() {
        errors.push(FieldError {
            field: "password",
            message: "password is required".to_string(),
        });
    }
    finish(errors)
}

/// Admin create: same field rules as registration, plus an explicit role
/// that may only be USER or OWNER.
pub fn validate_create_user(req: &CreateUserRequest) -> Result<UserRole, ApiError> {
    let mut errors = Vec::new();
    check_name("name", &req.name, &mut errors);
    check_full_name("full_name", req.full_name.as_deref(), &mut errors);
    check_email("email", &req.email, &mut errors);
    check_password("password", &req.password, &mut errors);
    check_phone("phone_number", req.phone_number.as_deref(), &mut errors);

    let role = match UserRole::from_str(&req.role) {
        Some(role @ (UserRole::User | UserRole::Owner)) => Some(role),
        _ => {
            errors.push(FieldError {
                field: "role",
                message: "role must be one of USER, OWNER".to_string(),
            });
            None
        }
    };

    match role {
        Some(role) if errors.is_empty() => Ok(role),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// Patch validation: absent/empty fields are skipped, present ones must be
/// well formed. Emptiness itself is judged by the store.
pub fn validate_update_user(patch: &UserPatch) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if let Some(name) = patch.name.as_deref().filter(|s| !s.is_empty()) {
        check_name("name", name, &mut errors);
    }
    check_full_name("full_name", patch.full_name.as_deref(), &mut errors);
    if let Some(email) = patch.email.as_deref().filter(|s| !s.is_empty()) {
        check_email("email", email, &mut errors);
    }
    check_phone("phone_number", patch.phone_number.as_deref(), &mut errors);
    finish(errors)
}

fn finish(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn check_name(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if value.len() < 2 || value.len() > 50 {
        errors.push(FieldError {
            field,
            message: "must be between 2 and 50 characters".to_string(),
        });
    } else if !value.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        errors.push(FieldError {
            field,
            message: "may only contain letters and spaces".to_string(),
        });
    }
}

fn check_full_name(field: &'static str, value: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(value) = value {
        if value.len() > 100 {
            errors.push(FieldError {
                field,
                message: "must be at most 100 characters".to_string(),
            });
        }
    }
}

fn check_email(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if !is_valid_email(value) {
        errors.push(FieldError {
            field,
            message: "must be a valid email address".to_string(),
        });
    }
}

fn check_password(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if !is_strong_password(value) {
        errors.push(FieldError {
            field,
            message: "must be 8-255 characters with upper case, lower case and a digit"
                .to_string(),
        });
    }
}

fn check_phone(field: &'static str, value: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(value) = value.filter(|s| !s.is_empty()) {
        if !is_valid_phone(value) {
            errors.push(FieldError {
                field,
                message: "must be an E.164 phone number".to_string(),
            });
        }
    }
}

fn is_valid_email(s: &str) -> bool {
    if s.is_empty() || s.len() > 254 || s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && local.len() <= 64
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}

fn is_strong_password(s: &str) -> bool {
    s.len() >= 8
        && s.len() <= 255
        && s.chars().any(|c| c.is_ascii_uppercase())
        && s.chars().any(|c| c.is_ascii_lowercase())
        && s.chars().any(|c| c.is_ascii_digit())
}

// E.164: optional +, leading digit 1-9, 2 to 15 digits total.
fn is_valid_phone(s: &str) -> bool {
    let digits = s.strip_prefix('+').unwrap_or(s);
    (2..=15).contains(&digits.len())
        && !digits.starts_with('0')
        && digits.chars().all(|c| c.is_ascii_digit())
}
