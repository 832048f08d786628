use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile snapshot returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Authenticated identity plus its bearer credential.
///
/// Created on successful login or registration, destroyed on logout or on an
/// authorization failure seen by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}
