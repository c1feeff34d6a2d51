pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserId;

pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

lazy_static! {
    // Letters (any script), spaces, apostrophes, dots and hyphens
    static ref FULLNAME_REGEX: regex::Regex = regex::Regex::new(r"^[\p{L}][\p{L} .'-]*$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// "First Last". Everything after the first space is the last name.
    #[validate(
        length(min = 1, max = 300),
        regex(
            path = "FULLNAME_REGEX",
            message = "Full name may only contain letters, spaces, dots, apostrophes or hyphens"
        )
    )]
    pub fullname: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub repeated_password: String,
}

impl RegisterRequest {
    /// Splits `fullname` into first and last name.
    pub fn name_parts(&self) -> (String, String) {
        let fullname = self.fullname.trim();
        match fullname.split_once(' ') {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (fullname.to_string(), String::new()),
        }
    }
}

/// Response structure after successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub fullname: String,
    pub email: String,
    pub user_id: UserId,
}

/// Query string of the email lookup.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}
