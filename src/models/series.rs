use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'series' table: a named ordered grouping of films.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new series.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSeriesRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 chars"))]
    pub description: Option<String>,
}

/// DTO for appending a film to a series.
#[derive(Debug, Deserialize)]
pub struct AddFilmToSeriesRequest {
    pub film_id: i64,
}

/// A series together with its films in position order.
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    #[serde(flatten)]
    pub series: Series,
    pub films: Vec<super::film::Film>,
}
