use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'films' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Film {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub film_url: String,
    pub genre: String,
    pub series_id: Option<i64>,
    pub duration_secs: i32,

    /// Externally assigned ordinal used for "top" listings; never computed
    /// in-system. NULL means unranked and excluded from top queries.
    pub rank: Option<i32>,

    pub views: i32,

    /// Derived cache: number of rows in film_votes with vote = 1.
    pub votes_count: i32,
    pub comments_count: i32,

    /// 'private', 'unlisted' or 'public'.
    pub visibility: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub const VISIBILITY_PRIVATE: &str = "private";
pub const VISIBILITY_UNLISTED: &str = "unlisted";
pub const VISIBILITY_PUBLIC: &str = "public";

/// True for the three visibility states the schema accepts.
pub fn is_valid_visibility(v: &str) -> bool {
    matches!(v, VISIBILITY_PRIVATE | VISIBILITY_UNLISTED | VISIBILITY_PUBLIC)
}

/// DTO for uploading film metadata (the binary itself goes to object
/// storage elsewhere; we only keep the resulting URLs).
#[derive(Debug, Deserialize, Validate)]
pub struct UploadFilmRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 chars"))]
    pub description: Option<String>,

    #[validate(url(message = "film_url must be a valid URL"))]
    pub film_url: String,

    #[validate(url(message = "thumbnail_url must be a valid URL"))]
    pub thumbnail_url: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Genre is required"))]
    pub genre: String,

    #[validate(range(min = 0, message = "Duration must be non-negative"))]
    pub duration_secs: Option<i32>,

    /// Checked against the visibility enum in the handler.
    pub visibility: Option<String>,
}

/// Query parameters for film listings.
#[derive(Debug, Deserialize)]
pub struct FilmListParams {
    /// Cursor for pagination: the created_at timestamp of the last film in
    /// the previous page.
    pub cursor: Option<chrono::DateTime<chrono::Utc>>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,
}

/// Vote toggle request. Exactly one of the two flags must be set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub is_upvote: bool,
    #[serde(default)]
    pub is_downvote: bool,
}

/// Current vote state of a film, as seen by the requesting user.
#[derive(Debug, Serialize)]
pub struct VoteStateResponse {
    pub votes: Vec<i64>,
    pub downvotes: Vec<i64>,
    /// 1 if the caller has upvoted, -1 if downvoted, 0 otherwise.
    pub my_vote: i16,
}
