use crate::error::AppError;
use crate::models::UserId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's id.
    pub sub: UserId,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET").map_err(|_| {
        log::error!("JWT_SECRET is not set");
        AppError::InternalServerError("JWT_SECRET not set".into())
    })
}

/// Generates a JWT for a given user ID.
///
/// The token expires in 24 hours and is signed with the `JWT_SECRET`
/// environment variable.
///
/// # Returns
/// `AppError::InternalServerError` if `JWT_SECRET` is not set or encoding fails.
pub fn generate_token(user_id: UserId) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(TOKEN_LIFETIME_HOURS))
        .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        exp: expiration,
    };

    let secret = jwt_secret()?;

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a JWT string and decodes its claims.
///
/// # Returns
/// `AppError::Unauthorized` if the token is malformed, its signature is invalid, or it has expired.
/// `AppError::InternalServerError` if `JWT_SECRET` is not set.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let secret = jwt_secret()?;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
