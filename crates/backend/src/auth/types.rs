//! Types for authentication

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response of the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,

    pub refresh_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Lifetime of the access token in seconds
    pub expires_in: i64,

    /// Expiry as a unix timestamp, when the backend sends it
    #[serde(default)]
    pub expires_at: Option<i64>,

    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// User data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub last_sign_in_at: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    /// User ID
    pub sub: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    /// Expiry as a unix timestamp
    pub exp: i64,
}
