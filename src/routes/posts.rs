use actix_web::{web, HttpResponse};

use crate::{error::AppError, serializers::PostPayload, store::Store};

/// Lists all posts, newest first.
pub async fn list(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let posts = store.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Creates a post. `title` and `content` are required.
///
/// ## Responses:
/// - `201 Created`: the new post.
/// - `400 Bad Request`: field errors.
pub async fn create(
    store: web::Data<dyn Store>,
    payload: web::Json<PostPayload>,
) -> Result<HttpResponse, AppError> {
    let new_post = payload.into_inner().into_new_post()?;
    let post = store.create_post(new_post).await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn retrieve(
    store: web::Data<dyn Store>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let post = store
        .get_post(post_id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(post))
}

/// Replaces a post; every field is required.
pub async fn update(
    store: web::Data<dyn Store>,
    post_id: web::Path<i64>,
    payload: web::Json<PostPayload>,
) -> Result<HttpResponse, AppError> {
    let changes = payload.into_inner().into_new_post()?.into();
    let post = store
        .update_post(post_id.into_inner(), changes)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn partial_update(
    store: web::Data<dyn Store>,
    post_id: web::Path<i64>,
    payload: web::Json<PostPayload>,
) -> Result<HttpResponse, AppError> {
    let changes = payload.into_inner().into_changes()?;
    let post = store
        .update_post(post_id.into_inner(), changes)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(post))
}

/// Deletes a post and its comments.
pub async fn destroy(
    store: web::Data<dyn Store>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    if store.delete_post(post_id.into_inner()).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::not_found())
    }
}
