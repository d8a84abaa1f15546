use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Author, Error, UserId,
    community::{Comment, LikeOutcome, Post},
};

/// Validated post fields written by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub photo_url: Option<String>,
    pub caption: Option<String>,
}

/// Repository for community posts and the comments and likes on them
///
/// Returned posts carry their author's name and current like and comment counts.
#[async_trait]
pub trait CommunityRepository: Send + Sync + 'static {
    async fn create_post(
        &self,
        user_id: UserId,
        fields: PostFields,
        at: DateTime<Utc>,
    ) -> Result<Post, Error>;

    /// Newest first, at most `limit` rows
    ///
    /// With `author_email`, only posts by the account with that email.
    async fn list_posts(&self, author_email: Option<&str>, limit: u32) -> Result<Vec<Post>, Error>;

    async fn find_post(&self, id: i64) -> Result<Option<Post>, Error>;

    /// Overwrite a post's fields if it is owned by `user_id`
    ///
    /// Returns `None` when no row with that id and owner exists.
    async fn update_post(
        &self,
        id: i64,
        user_id: UserId,
        fields: PostFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, Error>;

    /// Every post owned by `user_id`, newest first
    async fn list_posts_by_user(&self, user_id: UserId) -> Result<Vec<Post>, Error>;

    async fn count_posts_by_user(&self, user_id: UserId) -> Result<u64, Error>;

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: UserId,
        comment: &str,
        at: DateTime<Utc>,
    ) -> Result<Comment, Error>;

    /// Newest first, at most `limit` rows
    async fn recent_comments(&self, post_id: i64, limit: u32) -> Result<Vec<Comment>, Error>;

    /// Who liked a post, earliest first, at most `limit` names
    async fn liked_by(&self, post_id: i64, limit: u32) -> Result<Vec<Author>, Error>;

    /// Like the post for `user_id`, or remove the like if there already is one
    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<LikeOutcome, Error>;
}
