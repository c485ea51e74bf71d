use serde::Serialize;

// The 'follows' edge table (follower -> followee) is the authoritative
// representation of the follow graph; handlers work on it with scalar
// queries and the per-user counts are caches maintained in the same
// transaction.

/// Response for the is-following check.
#[derive(Debug, Serialize)]
pub struct IsFollowingResponse {
    pub following: bool,
}
