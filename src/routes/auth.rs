use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, EmailQuery, LoginRequest,
        RegisterRequest,
    },
    error::AppError,
    models::NewUser,
    services,
    store::Store,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
#[post("/registration")]
pub async fn registration(
    store: web::Data<dyn Store>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    if register_data.password != register_data.repeated_password {
        return Err(AppError::BadRequest("Passwords do not match".into()));
    }

    if store
        .find_user_by_email(&register_data.email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&register_data.password)?;
    let (first_name, last_name) = register_data.name_parts();

    let user = store
        .insert_user(NewUser {
            email: register_data.email.clone(),
            first_name,
            last_name,
            password_hash,
        })
        .await?;
    log::info!("registered user {}", user.id);

    let token = generate_token(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        fullname: user.fullname(),
        email: user.email,
        user_id: user.id,
    }))
}

/// Login user
///
/// Authenticates a user by email and password and returns an authentication token.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let credentials = store
        .find_credentials(&login_data.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&login_data.password, &credentials.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let user = credentials.user;
    let token = generate_token(user.id)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        fullname: user.fullname(),
        email: user.email,
        user_id: user.id,
    }))
}

/// Look up a user by email
///
/// Used by clients to resolve an email address to a user id before adding
/// the user to a board.
#[get("/email-check")]
pub async fn email_check(
    store: web::Data<dyn Store>,
    query: web::Query<EmailQuery>,
) -> Result<impl Responder, AppError> {
    let email = query.email.as_deref().unwrap_or_default();
    let user = services::users::find_by_email(&**store, email).await?;
    Ok(HttpResponse::Ok().json(user))
}
