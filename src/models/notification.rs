use serde::Serialize;
use sqlx::FromRow;

/// Notification kinds. Stored as text in the database. The table is
/// append-only and tracks no read/unread state (the client treats fetched
/// as seen).
pub const KIND_VOTE: &str = "Vote";
pub const KIND_FOLLOW: &str = "Follow";
pub const KIND_COMMENT: &str = "Comment";

/// DTO for listing notifications with the initiator's username joined in.
#[derive(Debug, Serialize, FromRow)]
pub struct NotificationResponse {
    pub id: i64,
    pub kind: String,
    pub initiator_id: i64,
    pub initiator_username: String,
    pub film_id: Option<i64>,
    pub comment_text: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
