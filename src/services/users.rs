use crate::error::{AppError, AppResult};
use crate::models::UserSummary;
use crate::store::Store;

/// Resolves an email to the public user summary, for adding board members.
pub async fn find_by_email(store: &dyn Store, email: &str) -> AppResult<UserSummary> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("The email address is missing".into()));
    }
    store
        .find_user_by_email(email)
        .await?
        .map(|user| UserSummary::from(&user))
        .ok_or_else(|| AppError::NotFound("Email address not found".into()))
}
