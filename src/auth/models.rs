//! User and identity data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Claims of a bearer token issued by the identity provider
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// External identity id
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub plan: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields of a user that may be shown on public pages
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: i64,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            bio: user.bio,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

// ============================================================================
// Identity provider webhook
// ============================================================================

/// User lifecycle event mirrored from the identity provider
#[derive(Deserialize, Debug)]
#[serde(tag = "type", content = "data")]
pub enum IdentityWebhookEvent {
    #[serde(rename = "user.created")]
    UserCreated(IdentityUserData),
    #[serde(rename = "user.updated")]
    UserUpdated(IdentityUserData),
    #[serde(rename = "user.deleted")]
    UserDeleted(DeletedUserData),
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUserData {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DeletedUserData {
    pub id: String,
}
