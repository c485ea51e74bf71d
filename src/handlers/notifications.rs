use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{error::AppError, models::notification::NotificationResponse, utils::jwt::Claims};

/// Appends a notification for `target_user_id`.
///
/// Fire-and-forget: a failed insert must never fail or roll back the action
/// that triggered it, so errors are logged and swallowed here.
pub async fn notify(
    pool: &PgPool,
    kind: &str,
    target_user_id: i64,
    initiator_id: i64,
    film_id: Option<i64>,
    comment_text: Option<&str>,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (user_id, kind, initiator_id, film_id, comment_text)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(target_user_id)
    .bind(kind)
    .bind(initiator_id)
    .bind(film_id)
    .bind(comment_text)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(
            "Failed to write {} notification for user {}: {:?}",
            kind,
            target_user_id,
            e
        );
    }
}

/// List the current user's notifications, newest first.
pub async fn list_notifications(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let notifications = sqlx::query_as::<_, NotificationResponse>(
        r#"
        SELECT
            n.id, n.kind, n.initiator_id, u.username AS initiator_username,
            n.film_id, n.comment_text, n.created_at
        FROM notifications n
        JOIN users u ON n.initiator_id = u.id
        WHERE n.user_id = $1
        ORDER BY n.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(notifications))
}
