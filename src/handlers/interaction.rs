use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::{AppError, is_unique_violation},
    handlers::notifications::notify,
    models::{
        film::{VoteRequest, VoteStateResponse},
        notification::KIND_VOTE,
    },
    utils::jwt::Claims,
};

/// Toggle a vote on a film.
///
/// One row per (film, user) in film_votes, vote = 1 or -1; the primary key
/// guarantees a user is never in both camps. Exactly one transition happens
/// per call, inside one transaction together with the votes_count cache:
///   no row   + upvote   -> insert 1,  count +1
///   vote  1  + upvote   -> delete,    count -1   (un-vote)
///   vote  1  + downvote -> update -1, count -1
///   vote -1  + downvote -> delete,    count unchanged
///   no row   + downvote -> insert -1, count unchanged
///   vote -1  + upvote   -> update 1,  count +1
/// Only upvotes carry a delta: the visible count is the number of upvotes.
pub async fn toggle_vote(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(film_id): Path<i64>,
    Json(payload): Json<VoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_upvote == payload.is_downvote {
        return Err(AppError::BadRequest(
            "Exactly one of isUpvote / isDownvote must be set".to_string(),
        ));
    }
    let requested: i16 = if payload.is_upvote { 1 } else { -1 };

    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    let owner_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM films WHERE id = $1")
        .bind(film_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Film not found".to_string()))?;

    let existing = sqlx::query_scalar::<_, i16>(
        "SELECT vote FROM film_votes WHERE film_id = $1 AND user_id = $2",
    )
    .bind(film_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let mut delta: i32 = 0;
    let mut new_upvote = false;

    match existing {
        None => {
            sqlx::query("INSERT INTO film_votes (film_id, user_id, vote) VALUES ($1, $2, $3)")
                .bind(film_id)
                .bind(user_id)
                .bind(requested)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        // Concurrent duplicate toggle handled gracefully
                        return AppError::Conflict("Already voted".to_string());
                    }
                    AppError::from(e)
                })?;
            if requested == 1 {
                delta = 1;
                new_upvote = true;
            }
        }
        Some(v) if v == requested => {
            // Same button again: retract the vote. The vote value is part
            // of the predicate so a concurrent toggle that already changed
            // or removed the row leaves this a 0-row no-op, and the count
            // delta only applies when this request actually won.
            let removed = sqlx::query(
                "DELETE FROM film_votes WHERE film_id = $1 AND user_id = $2 AND vote = $3",
            )
            .bind(film_id)
            .bind(user_id)
            .bind(v)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if removed == 1 && v == 1 {
                delta = -1;
            }
        }
        Some(_) => {
            // Switch sides, compare-and-set on the current value
            let switched = sqlx::query(
                "UPDATE film_votes SET vote = $3 \
                 WHERE film_id = $1 AND user_id = $2 AND vote <> $3",
            )
            .bind(film_id)
            .bind(user_id)
            .bind(requested)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if switched == 1 {
                if requested == 1 {
                    delta = 1;
                    new_upvote = true;
                } else {
                    delta = -1;
                }
            }
        }
    }

    if delta != 0 {
        sqlx::query("UPDATE films SET votes_count = GREATEST(0, votes_count + $2) WHERE id = $1")
            .bind(film_id)
            .bind(delta)
            .execute(&mut *tx)
            .await?;
    }

    let votes = sqlx::query_scalar::<_, i32>("SELECT votes_count FROM films WHERE id = $1")
        .bind(film_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    // Notify the owner only when a new upvote lands; retractions and
    // downvotes stay silent, as do votes on one's own film.
    if new_upvote && owner_id != user_id {
        notify(&pool, KIND_VOTE, owner_id, user_id, Some(film_id), None).await;
    }

    Ok(Json(serde_json::json!({ "votes": votes })))
}

/// Current vote membership of a film, plus the caller's own state.
pub async fn get_votes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(film_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM films WHERE id = $1")
        .bind(film_id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Film not found".to_string()));
    }

    let votes = sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM film_votes WHERE film_id = $1 AND vote = 1 ORDER BY user_id",
    )
    .bind(film_id)
    .fetch_all(&pool)
    .await?;

    let downvotes = sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM film_votes WHERE film_id = $1 AND vote = -1 ORDER BY user_id",
    )
    .bind(film_id)
    .fetch_all(&pool)
    .await?;

    let my_vote = if votes.contains(&user_id) {
        1
    } else if downvotes.contains(&user_id) {
        -1
    } else {
        0
    };

    Ok(Json(VoteStateResponse {
        votes,
        downvotes,
        my_vote,
    }))
}
