use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        film::Film,
        series::{AddFilmToSeriesRequest, CreateSeriesRequest, Series, SeriesResponse},
    },
    utils::jwt::Claims,
};

/// Create a new series.
pub async fn create_series(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSeriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;

    let series = sqlx::query_as::<_, Series>(
        r#"
        INSERT INTO series (user_id, title, description)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&payload.title)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create series: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(series)))
}

/// Append a film to a series.
///
/// Both sides of the relationship (series_films row and films.series_id
/// back-fill) are written in one transaction so they cannot diverge.
/// Only the series owner may add, and only their own films.
pub async fn add_film_to_series(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(series_id): Path<i64>,
    Json(payload): Json<AddFilmToSeriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    let series_owner = sqlx::query_scalar::<_, i64>("SELECT user_id FROM series WHERE id = $1")
        .bind(series_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Series not found".to_string()))?;

    if series_owner != user_id {
        return Err(AppError::Forbidden(
            "You are not the owner of this series".to_string(),
        ));
    }

    let film_owner = sqlx::query_scalar::<_, i64>("SELECT user_id FROM films WHERE id = $1")
        .bind(payload.film_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Film not found".to_string()))?;

    if film_owner != user_id {
        return Err(AppError::Forbidden(
            "You can only add your own films to a series".to_string(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO series_films (series_id, film_id, position)
        VALUES (
            $1, $2,
            COALESCE((SELECT MAX(position) + 1 FROM series_films WHERE series_id = $1), 0)
        )
        "#,
    )
    .bind(series_id)
    .bind(payload.film_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            return AppError::Conflict("Film is already in this series".to_string());
        }
        AppError::from(e)
    })?;

    sqlx::query("UPDATE films SET series_id = $1 WHERE id = $2")
        .bind(series_id)
        .bind(payload.film_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get a series with its films in position order.
pub async fn get_series(
    State(pool): State<PgPool>,
    Path(series_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let series = sqlx::query_as::<_, Series>("SELECT * FROM series WHERE id = $1")
        .bind(series_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Series not found".to_string()))?;

    let films = sqlx::query_as::<_, Film>(
        r#"
        SELECT f.*
        FROM series_films sf
        JOIN films f ON sf.film_id = f.id
        WHERE sf.series_id = $1
        ORDER BY sf.position ASC
        "#,
    )
    .bind(series_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(SeriesResponse { series, films }))
}

/// List a user's series, newest first.
pub async fn list_user_series(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let series = sqlx::query_as::<_, Series>(
        r#"
        SELECT *
        FROM series
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(series))
}
