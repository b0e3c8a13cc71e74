//! Slogan model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::User;

/// Slogan entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Slogan {
    pub id: i32,
    pub user_id: i32,
    pub slogan: String,
    pub created_at: DateTime<Utc>,
}

/// Request for slogan creation
///
/// The owner always comes from the bearer token; any id sent in the body
/// is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSloganRequest {
    pub slogan: Option<String>,
}

/// A user together with their slogans
#[derive(Debug, Serialize)]
pub struct UserSlogansResponse {
    pub user: User,
    pub slogans: Vec<Slogan>,
}
