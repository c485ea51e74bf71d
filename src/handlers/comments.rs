use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::notifications::notify,
    models::{
        comment::{Comment, CreateCommentRequest},
        notification::KIND_COMMENT,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Create a new comment on a film.
///
/// Comments are immutable and carry a snapshot of the author's username at
/// creation time. The film owner gets a Comment notification carrying the
/// text, unless they commented on their own film.
pub async fn create_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(film_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user_id = claims.user_id()?;

    let content = clean_html(payload.content.trim());
    if content.is_empty() {
        return Err(AppError::BadRequest("Comment must not be empty".to_string()));
    }

    let mut tx = pool.begin().await?;

    let owner_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM films WHERE id = $1")
        .bind(film_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Film not found".to_string()))?;

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (film_id, user_id, username, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(film_id)
    .bind(user_id)
    .bind(&claims.username)
    .bind(&content)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE films SET comments_count = comments_count + 1 WHERE id = $1")
        .bind(film_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    // Self-comment policy: the owner is not notified about their own comment.
    if owner_id != user_id {
        notify(
            &pool,
            KIND_COMMENT,
            owner_id,
            user_id,
            Some(film_id),
            Some(&content),
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List all comments for a film, oldest first.
pub async fn list_comments(
    State(pool): State<PgPool>,
    Path(film_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM films WHERE id = $1")
        .bind(film_id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Film not found".to_string()));
    }

    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT *
        FROM comments
        WHERE film_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(film_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(comments))
}
