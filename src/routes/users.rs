use actix_web::{web, HttpResponse};
use log::{info, warn};

use crate::{
    auth::{authenticate, AuthenticatedUser, PasswordHasher},
    error::AppError,
    models::username_taken,
    serializers::{
        user::{INVALID_CREDENTIALS, LOGGED_IN, REGISTERED},
        LoginPayload, LoginResponse, RegisterResponse, UserPayload,
    },
    store::Store,
};

/// Register a new user
///
/// Creates the account and issues its token.
///
/// ## Responses:
/// - `201 Created`: `{"user": {...}, "token": "...", "message": "..."}`.
/// - `400 Bad Request`: field errors, e.g. a username that is already taken.
pub async fn register(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    payload: web::Json<UserPayload>,
) -> Result<HttpResponse, AppError> {
    let new_user = payload.into_inner().into_new_user(&hasher)?;

    if store.find_user_by_username(&new_user.username).await?.is_some() {
        return Err(username_taken());
    }

    let user = store.create_user(new_user).await?;
    let token = store.get_or_create_token(user.id).await?;
    info!("Registered user {} (id {})", user.username, user.id);

    Ok(HttpResponse::Created().json(RegisterResponse {
        user,
        token: token.key,
        message: REGISTERED.into(),
    }))
}

/// Log in
///
/// Exchanges a username and password for the user's token. Logging in again
/// returns the same token.
///
/// ## Responses:
/// - `200 OK`: `{"token": "...", "user": {...}, "message": "..."}`.
/// - `400 Bad Request`: username or password missing.
/// - `401 Unauthorized`: unknown user or wrong password, not distinguished.
pub async fn login(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
    let (username, password) = payload.into_inner().credentials()?;

    let user = match authenticate(store.get_ref(), &hasher, &username, &password).await? {
        Some(user) => user,
        None => {
            warn!("Failed login attempt for username {:?}", username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };

    let token = store.get_or_create_token(user.id).await?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        token: token.key,
        user,
        message: LOGGED_IN.into(),
    }))
}

pub async fn list(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let users = store.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Creates a user without issuing a token.
pub async fn create(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    caller: AuthenticatedUser,
    payload: web::Json<UserPayload>,
) -> Result<HttpResponse, AppError> {
    let new_user = payload.into_inner().into_new_user(&hasher)?;
    let user = store.create_user(new_user).await?;
    info!("User {} created user {}", caller.username(), user.id);
    Ok(HttpResponse::Created().json(user))
}

pub async fn retrieve(
    store: web::Data<dyn Store>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = store
        .get_user(user_id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(user))
}

async fn apply_update(
    store: &dyn Store,
    hasher: &PasswordHasher,
    user_id: i64,
    payload: UserPayload,
    partial: bool,
) -> Result<HttpResponse, AppError> {
    let changes = payload.into_changes(hasher, partial)?;
    let user = store
        .update_user(user_id, changes)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(user))
}

/// `PUT`: username and password are required.
pub async fn update(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    user_id: web::Path<i64>,
    payload: web::Json<UserPayload>,
) -> Result<HttpResponse, AppError> {
    apply_update(
        store.get_ref(),
        &hasher,
        user_id.into_inner(),
        payload.into_inner(),
        false,
    )
    .await
}

/// `PATCH`: only the supplied fields change.
pub async fn partial_update(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    user_id: web::Path<i64>,
    payload: web::Json<UserPayload>,
) -> Result<HttpResponse, AppError> {
    apply_update(
        store.get_ref(),
        &hasher,
        user_id.into_inner(),
        payload.into_inner(),
        true,
    )
    .await
}

pub async fn destroy(
    store: web::Data<dyn Store>,
    caller: AuthenticatedUser,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    if !store.delete_user(user_id).await? {
        return Err(AppError::not_found());
    }
    info!("User {} deleted user {}", caller.username(), user_id);
    Ok(HttpResponse::NoContent().finish())
}
