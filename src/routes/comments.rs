use actix_web::{web, HttpResponse};

use crate::{
    error::AppError,
    models::CommentChanges,
    serializers::{comment::ensure_post_exists, CommentPayload},
    store::Store,
};

/// Lists all comments, newest first.
pub async fn list(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let comments = store.list_comments().await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Creates a comment on an existing post.
///
/// ## Responses:
/// - `201 Created`: the new comment.
/// - `400 Bad Request`: field errors, including a `post` that does not exist.
pub async fn create(
    store: web::Data<dyn Store>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse, AppError> {
    let new_comment = payload.into_inner().into_new_comment()?;
    ensure_post_exists(store.get_ref(), new_comment.post_id).await?;
    let comment = store.create_comment(new_comment).await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn retrieve(
    store: web::Data<dyn Store>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let comment = store
        .get_comment(comment_id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(comment))
}

async fn apply_changes(
    store: &dyn Store,
    comment_id: i64,
    changes: CommentChanges,
) -> Result<HttpResponse, AppError> {
    if let Some(post_id) = changes.post_id {
        ensure_post_exists(store, post_id).await?;
    }
    let comment = store
        .update_comment(comment_id, changes)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Replaces a comment; `post` and `content` are required.
pub async fn update(
    store: web::Data<dyn Store>,
    comment_id: web::Path<i64>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse, AppError> {
    let changes = payload.into_inner().into_new_comment()?.into();
    apply_changes(store.get_ref(), comment_id.into_inner(), changes).await
}

pub async fn partial_update(
    store: web::Data<dyn Store>,
    comment_id: web::Path<i64>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse, AppError> {
    let changes = payload.into_inner().into_changes()?;
    apply_changes(store.get_ref(), comment_id.into_inner(), changes).await
}

pub async fn destroy(
    store: web::Data<dyn Store>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    if store.delete_comment(comment_id.into_inner()).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::not_found())
    }
}
