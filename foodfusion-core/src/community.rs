//! Community posts, comments and likes
//!
//! Guests only see posts by the site account [`SYSTEM_EMAIL`]; signed-in
//! members see every post.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Author, UserId};

/// The account whose posts are shown to visitors who are not signed in.
pub const SYSTEM_EMAIL: &str = "system@foodfusion.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: UserId,
    pub title: String,
    pub photo_url: Option<String>,
    pub caption: Option<String>,
    pub author: Option<Author>,
    pub like_count: u64,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied post fields for create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: UserId,
    pub comment: String,
    pub author: Option<Author>,
    pub created_at: DateTime<Utc>,
}

/// A post with the names of some who liked it and its newest comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub liked_by: Vec<String>,
    pub comments: Vec<Comment>,
}

/// What a like toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeOutcome {
    Liked,
    Unliked,
}

impl LikeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            LikeOutcome::Liked => "Post liked",
            LikeOutcome::Unliked => "Post unliked",
        }
    }
}
