//! User account forms used by the admin screens: registration, profile
//! update and password reset.
//!
//! Field rules are declared with `validator`; cross-field checks (password
//! confirmation) run afterwards. Inputs are trimmed before validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Shorter passwords are rejected at registration and reset.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Passwords at least this long are rated strong.
pub const STRONG_PASSWORD_LENGTH: usize = 8;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));
static PERSON_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("valid regex"));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Flatten `validator` errors into one message, sorted for stable output.
fn to_core_error(errors: ValidationErrors) -> CoreError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("{field} is invalid"),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    messages.sort();
    CoreError::Validation(messages.join("; "))
}

fn trim_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn check_passwords_match(password: &str, confirm: &str) -> Result<(), CoreError> {
    if password != confirm {
        return Err(CoreError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registration form for a new user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewUserForm {
    #[validate(
        length(min = 3, message = "Username must be at least 3 characters"),
        regex(
            path = *USERNAME_RE,
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
    #[validate(
        length(min = 2, message = "First name must be at least 2 characters"),
        regex(path = *PERSON_NAME_RE, message = "First name can only contain letters and spaces")
    )]
    pub first_name: String,
    #[validate(
        length(min = 2, message = "Last name must be at least 2 characters"),
        regex(path = *PERSON_NAME_RE, message = "Last name can only contain letters and spaces")
    )]
    pub last_name: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
    #[validate(email(message = "Email address is invalid"))]
    pub email: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Phone number must be 10 digits"))]
    pub phone_number: Option<String>,
    pub warehouse_code: Option<String>,
    pub site_code: Option<String>,
}

impl NewUserForm {
    /// Trim every field, validate, and return the cleaned form.
    pub fn validated(&self) -> Result<Self, CoreError> {
        let clean = Self {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role: self.role.trim().to_string(),
            email: trim_opt(&self.email),
            phone_number: trim_opt(&self.phone_number),
            warehouse_code: trim_opt(&self.warehouse_code),
            site_code: trim_opt(&self.site_code),
        };
        clean.validate().map_err(to_core_error)?;
        check_passwords_match(&clean.password, &clean.confirm_password)?;
        Ok(clean)
    }
}

// ---------------------------------------------------------------------------
// Profile update
// ---------------------------------------------------------------------------

/// Profile fields an admin may change on an existing user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserUpdateForm {
    #[validate(
        length(min = 2, message = "First name must be at least 2 characters"),
        regex(path = *PERSON_NAME_RE, message = "First name can only contain letters and spaces")
    )]
    pub first_name: String,
    #[validate(
        length(min = 2, message = "Last name must be at least 2 characters"),
        regex(path = *PERSON_NAME_RE, message = "Last name can only contain letters and spaces")
    )]
    pub last_name: String,
    #[validate(email(message = "Email address is invalid"))]
    pub email: String,
    #[validate(regex(path = *PHONE_RE, message = "Phone number must be 10 digits"))]
    pub phone_number: String,
}

impl UserUpdateForm {
    pub fn validated(&self) -> Result<Self, CoreError> {
        let clean = Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
        };
        clean.validate().map_err(to_core_error)?;
        Ok(clean)
    }
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PasswordResetForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordResetForm {
    pub fn validated(&self) -> Result<Self, CoreError> {
        let clean = Self {
            username: self.username.trim().to_string(),
            ..self.clone()
        };
        clean.validate().map_err(to_core_error)?;
        check_passwords_match(&clean.new_password, &clean.confirm_password)?;
        Ok(clean)
    }
}

// ---------------------------------------------------------------------------
// Password strength
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordStrength {
    None,
    Weak,
    Medium,
    Strong,
}

/// Length-based strength hint shown while typing.
pub fn password_strength(password: &str) -> PasswordStrength {
    let len = password.chars().count();
    if len == 0 {
        PasswordStrength::None
    } else if len < MIN_PASSWORD_LENGTH {
        PasswordStrength::Weak
    } else if len < STRONG_PASSWORD_LENGTH {
        PasswordStrength::Medium
    } else {
        PasswordStrength::Strong
    }
}
