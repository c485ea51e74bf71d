use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::film::{
        Film, FilmListParams, UploadFilmRequest, VISIBILITY_PRIVATE, VISIBILITY_PUBLIC,
        is_valid_visibility,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Upload film metadata (the binary has already been pushed to object
/// storage; we only persist the resulting URLs).
///
/// The uploader's film count is bumped in the same transaction as the
/// insert so the cache cannot drift from the films table.
pub async fn upload_film(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UploadFilmRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;

    let description = payload.description.as_deref().map(clean_html);
    let visibility = payload
        .visibility
        .unwrap_or_else(|| VISIBILITY_PUBLIC.to_string());
    if !is_valid_visibility(&visibility) {
        return Err(AppError::BadRequest(
            "visibility must be 'private', 'unlisted' or 'public'".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let film = sqlx::query_as::<_, Film>(
        r#"
        INSERT INTO films
            (user_id, title, description, thumbnail_url, film_url, genre,
             duration_secs, visibility)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&payload.title)
    .bind(&description)
    .bind(&payload.thumbnail_url)
    .bind(&payload.film_url)
    .bind(&payload.genre)
    .bind(payload.duration_secs.unwrap_or(0))
    .bind(&visibility)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upload film: {:?}", e);
        AppError::from(e)
    })?;

    sqlx::query("UPDATE users SET uploaded_films_count = uploaded_films_count + 1 WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(film)))
}

/// List public films, newest first.
/// Supports cursor-based pagination.
pub async fn list_films(
    State(pool): State<PgPool>,
    Query(params): Query<FilmListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(20).min(100); // Default 20, max 100

    let films = sqlx::query_as::<_, Film>(
        r#"
        SELECT *
        FROM films
        WHERE visibility = 'public'
          AND ($1::TIMESTAMPTZ IS NULL OR created_at < $1)
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(params.cursor)
    .bind(limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list films: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(films))
}

/// Get a single film by ID and count the view.
///
/// Private films are visible only to their owner; unlisted films are
/// returned to anyone holding the ID.
pub async fn get_film(
    State(pool): State<PgPool>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut film = sqlx::query_as::<_, Film>("SELECT * FROM films WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Film not found".to_string()))?;

    if film.visibility == VISIBILITY_PRIVATE {
        let viewer = match &claims {
            Some(Extension(c)) => Some(c.user_id()?),
            None => None,
        };
        if viewer != Some(film.user_id) {
            // Do not reveal that the film exists
            return Err(AppError::NotFound("Film not found".to_string()));
        }
    }

    sqlx::query("UPDATE films SET views = views + 1 WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    film.views += 1;

    Ok(Json(film))
}

/// List a user's films, newest first.
/// Private films are included only when the caller is the owner.
pub async fn list_user_films(
    State(pool): State<PgPool>,
    claims: Option<Extension<Claims>>,
    Path(user_id): Path<i64>,
    Query(params): Query<FilmListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(20).min(100);

    let viewer = match &claims {
        Some(Extension(c)) => Some(c.user_id()?),
        None => None,
    };
    let is_owner = viewer == Some(user_id);

    let films = sqlx::query_as::<_, Film>(
        r#"
        SELECT *
        FROM films
        WHERE user_id = $1
          AND ($2 OR visibility <> 'private')
          AND ($3::TIMESTAMPTZ IS NULL OR created_at < $3)
        ORDER BY created_at DESC
        LIMIT $4
        "#,
    )
    .bind(user_id)
    .bind(is_owner)
    .bind(params.cursor)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(films))
}

/// List public films of one genre, newest first.
pub async fn list_films_by_genre(
    State(pool): State<PgPool>,
    Path(genre): Path<String>,
    Query(params): Query<FilmListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(20).min(100);

    let films = sqlx::query_as::<_, Film>(
        r#"
        SELECT *
        FROM films
        WHERE genre = $1
          AND visibility = 'public'
          AND ($2::TIMESTAMPTZ IS NULL OR created_at < $2)
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(&genre)
    .bind(params.cursor)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(films))
}

/// Delete a film. Owner only; votes, comments and series membership go
/// with it via cascade, and the uploader's film count is decremented in
/// the same transaction.
pub async fn delete_film(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(film_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let owner_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM films WHERE id = $1")
        .bind(film_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Film not found".to_string()))?;

    if owner_id != user_id {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this film".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM films WHERE id = $1")
        .bind(film_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE users SET uploaded_films_count = GREATEST(0, uploaded_films_count - 1) WHERE id = $1",
    )
    .bind(owner_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
