use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::notifications::notify,
    models::{follow::IsFollowingResponse, notification::KIND_FOLLOW},
    utils::jwt::Claims,
};

/// Follow a user.
///
/// The follows edge table is the source of truth; both users' denormalized
/// counts are bumped in the same transaction, and only when the edge insert
/// actually changed a row. Re-following is therefore a no-op on counts.
pub async fn follow_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(target_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor_id = claims.user_id()?;

    if actor_id == target_id {
        return Err(AppError::BadRequest(
            "You cannot follow yourself".to_string(),
        ));
    }

    let target_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(target_id)
        .fetch_optional(&pool)
        .await?;
    if target_exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO follows (follower_id, followee_id)
        VALUES ($1, $2)
        ON CONFLICT (follower_id, followee_id) DO NOTHING
        "#,
    )
    .bind(actor_id)
    .bind(target_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let newly_followed = inserted == 1;

    if newly_followed {
        sqlx::query("UPDATE users SET following_count = following_count + 1 WHERE id = $1")
            .bind(actor_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE users SET followers_count = followers_count + 1 WHERE id = $1")
            .bind(target_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    if newly_followed {
        notify(&pool, KIND_FOLLOW, target_id, actor_id, None, None).await;
    }

    Ok(Json(serde_json::json!({ "following": true })))
}

/// Unfollow a user. Emits no notification.
pub async fn unfollow_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(target_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor_id = claims.user_id()?;

    if actor_id == target_id {
        return Err(AppError::BadRequest(
            "You cannot unfollow yourself".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
        .bind(actor_id)
        .bind(target_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if removed == 1 {
        sqlx::query(
            "UPDATE users SET following_count = GREATEST(0, following_count - 1) WHERE id = $1",
        )
        .bind(actor_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "UPDATE users SET followers_count = GREATEST(0, followers_count - 1) WHERE id = $1",
        )
        .bind(target_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Json(serde_json::json!({ "following": false })))
}

/// Whether the current user follows the given user.
pub async fn is_following(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(target_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor_id = claims.user_id()?;

    let edge = sqlx::query_scalar::<_, i64>(
        "SELECT follower_id FROM follows WHERE follower_id = $1 AND followee_id = $2",
    )
    .bind(actor_id)
    .bind(target_id)
    .fetch_optional(&pool)
    .await?;

    Ok(Json(IsFollowingResponse {
        following: edge.is_some(),
    }))
}
