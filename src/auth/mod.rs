pub mod extractors;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::models::{Role, User};

// Re-export necessary items
pub use extractors::{AdminUser, CurrentUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

lazy_static! {
    // Regex for username validation: letters, digits and underscores
    pub(crate) static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9_]+$").unwrap();
}

/// Requires at least one lowercase letter, one uppercase letter and one digit.
pub(crate) fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_lower && has_upper && has_digit {
        return Ok(());
    }
    let mut err = ValidationError::new("password_strength");
    err.message = Some(Cow::from(
        "Password must contain at least one lowercase letter, one uppercase letter, and one number",
    ));
    Err(err)
}

/// Trims a username and trims/lowercases an email the way they are stored.
pub(crate) fn normalize_identity_fields(username: &mut String, email: &mut String) {
    *username = username.trim().to_string();
    *email = email.trim().to_lowercase();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// 3 to 50 characters: letters, digits or underscores.
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = "USERNAME_REGEX",
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    pub username: String,
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 100, message = "Email must not exceed 100 characters")
    )]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        custom = "validate_password_strength"
    )]
    pub password: String,
    /// Requested role; defaults to `user`.
    #[serde(default)]
    pub role: Option<Role>,
}

impl RegisterRequest {
    pub fn normalized(mut self) -> Self {
        normalize_identity_fields(&mut self.username, &mut self.email);
        self
    }
}

/// Changes a caller may make to their own profile.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = "USERNAME_REGEX",
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    pub username: Option<String>,
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 100, message = "Email must not exceed 100 characters")
    )]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.map(|u| u.trim().to_string()),
            email: self.email.map(|e| e.trim().to_lowercase()),
        }
    }
}

/// Returned after a successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    /// The JWT for subsequent requests.
    pub token: String,
}
