// src/handlers/explore.rs
//
// Feed and ranking queries. Rank is an externally assigned ordinal: these
// handlers only ever sort on it, never compute it.

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::film::{Film, FilmListParams},
    utils::jwt::Claims,
};

/// The user's feed: public films by anyone they follow, plus their own
/// films regardless of visibility. Newest first.
pub async fn get_feed(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<FilmListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let limit = params.limit.unwrap_or(20).min(100);

    let films = sqlx::query_as::<_, Film>(
        r#"
        SELECT f.*
        FROM films f
        WHERE (
                f.user_id = $1
                OR (
                    f.visibility = 'public'
                    AND f.user_id IN (
                        SELECT followee_id FROM follows WHERE follower_id = $1
                    )
                )
              )
          AND ($2::TIMESTAMPTZ IS NULL OR f.created_at < $2)
        ORDER BY f.created_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(params.cursor)
    .bind(limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to build feed for user {}: {:?}", user_id, e);
        AppError::from(e)
    })?;

    Ok(Json(films))
}

/// Global top 10: the highest-rank public films. Unranked films
/// (rank IS NULL) are excluded, never treated as rank 0. Ties break on
/// created_at, newest first.
pub async fn top_films(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let films = sqlx::query_as::<_, Film>(
        r#"
        SELECT *
        FROM films
        WHERE rank IS NOT NULL AND visibility = 'public'
        ORDER BY rank DESC, created_at DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(films))
}

/// Top 10 per genre under the same rule as the global listing.
/// Returns a mapping genre -> films.
pub async fn top_films_by_genre(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let films = sqlx::query_as::<_, Film>(
        r#"
        SELECT *
        FROM (
            SELECT f.*,
                   ROW_NUMBER() OVER (
                       PARTITION BY f.genre
                       ORDER BY f.rank DESC, f.created_at DESC
                   ) AS rn
            FROM films f
            WHERE f.rank IS NOT NULL AND f.visibility = 'public'
        ) ranked
        WHERE rn <= 10
        ORDER BY genre, rn
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let mut by_genre: HashMap<String, Vec<Film>> = HashMap::new();
    for film in films {
        by_genre.entry(film.genre.clone()).or_default().push(film);
    }

    Ok(Json(by_genre))
}
