use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::UserId;

/// The acting user, as resolved by `AuthMiddleware`.
///
/// Only usable on routes wrapped by the middleware. If no id is present in the
/// request extensions the extractor fails with `AppError::Unauthorized`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUserId(pub UserId);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserId>().copied() {
            Some(user_id) => ready(Ok(AuthenticatedUserId(user_id))),
            None => {
                let err = AppError::Unauthorized(
                    "User ID not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_authenticated_user_id_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(123 as UserId);

        let mut payload = Payload::None;
        let extracted_id = AuthenticatedUserId::from_request(&req, &mut payload).await;
        assert_eq!(extracted_id.unwrap().0, 123);
    }

    #[actix_rt::test]
    async fn test_authenticated_user_id_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let extracted_id_result = AuthenticatedUserId::from_request(&req, &mut payload).await;

        let err = extracted_id_result.unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
