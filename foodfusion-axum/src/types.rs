use chrono::{DateTime, Utc};
use foodfusion::{
    BlockStatus, DashboardStats, LikeOutcome, Post, PostInput, ProfileUpdate, Recipe,
    RecipeInput, Resource, ResourceInput, User, UserId,
};
use serde::{Deserialize, Serialize};

/// The JSON envelope every endpoint answers with.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A success with no `data` field.
    pub fn without_data(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

// Missing fields deserialize as empty strings so they reach the services'
// "X is required" validation instead of failing in the JSON extractor.

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl From<ResourceRequest> for ResourceInput {
    fn from(request: ResourceRequest) -> Self {
        ResourceInput {
            title: request.title,
            description: request.description,
            link: request.link,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditResourceRequest {
    #[serde(default)]
    pub resource_id: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// `?id=` on the detail endpoints. Kept as text so a malformed id reads as "not found".
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditRecipeRequest {
    #[serde(default)]
    pub recipe_id: Option<i64>,
    #[serde(flatten)]
    pub recipe: RecipeInput,
}

#[derive(Debug, Deserialize)]
pub struct EditPostRequest {
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(flatten)]
    pub post: PostInput,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    #[serde(default)]
    pub post_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(request: ProfileRequest) -> Self {
        ProfileUpdate {
            first_name: request.first_name,
            last_name: request.last_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlockStatusResponse {
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_until: Option<DateTime<Utc>>,
    pub message: String,
}

impl From<BlockStatus> for BlockStatusResponse {
    fn from(status: BlockStatus) -> Self {
        if status.blocked {
            BlockStatusResponse {
                blocked: true,
                remaining_seconds: Some(status.remaining_seconds),
                blocked_until: status.blocked_until,
                message: format!(
                    "Account is temporarily locked. Please wait {} before trying again.",
                    foodfusion_core::storage::format_wait(status.remaining_seconds)
                ),
            }
        } else {
            BlockStatusResponse {
                blocked: false,
                remaining_seconds: None,
                blocked_until: None,
                message: "Account is not blocked. You can attempt to login.".to_string(),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: UserId,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ResourceListResponse {
    pub resources: Vec<Resource>,
}

#[derive(Debug, Serialize)]
pub struct ResourceCreatedResponse {
    pub resource_id: i64,
    pub resource: Resource,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct RecipeCreatedResponse {
    pub recipe_id: i64,
    pub recipe: Recipe,
}

#[derive(Debug, Serialize)]
pub struct PostCreatedResponse {
    pub post_id: i64,
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub status: LikeOutcome,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
}
