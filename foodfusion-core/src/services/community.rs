use crate::{
    Error, UserId,
    community::{Comment, LikeOutcome, Post, PostDetail, PostInput, SYSTEM_EMAIL},
    error::{AuthError, ValidationError},
    repositories::{CommunityRepository, PostFields},
    validation::validate_required,
};
use chrono::Utc;
use std::sync::Arc;

/// Members' feed length.
pub const FEED_LIMIT: u32 = 100;

/// Guests' feed length.
pub const GUEST_FEED_LIMIT: u32 = 10;

/// Names listed under a post's likes.
pub const LIKED_BY_LIMIT: u32 = 5;

/// Comments shown with a post.
pub const COMMENT_LIMIT: u32 = 10;

/// Service for community posts, comments and likes
pub struct CommunityService<R: CommunityRepository> {
    repository: Arc<R>,
}

impl<R: CommunityRepository> CommunityService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Publish a post. Only the title is required.
    pub async fn create_post(&self, user_id: UserId, input: PostInput) -> Result<Post, Error> {
        let fields = fields(input)?;
        let post = self
            .repository
            .create_post(user_id, fields, Utc::now())
            .await?;

        tracing::info!(post_id = post.id, user_id = %user_id, "Community post created");
        Ok(post)
    }

    /// The feed for `viewer`: every post for a member, the site's own posts for a guest.
    pub async fn list_posts(&self, viewer: Option<UserId>) -> Result<Vec<Post>, Error> {
        match viewer {
            Some(_) => self.repository.list_posts(None, FEED_LIMIT).await,
            None => {
                self.repository
                    .list_posts(Some(SYSTEM_EMAIL), GUEST_FEED_LIMIT)
                    .await
            }
        }
    }

    /// A post with who liked it and its newest comments.
    pub async fn post_detail(&self, post_id: i64) -> Result<Option<PostDetail>, Error> {
        match self.repository.find_post(post_id).await? {
            Some(post) => Ok(Some(self.detail(post).await?)),
            None => Ok(None),
        }
    }

    /// Overwrite a post owned by `user_id`.
    ///
    /// A missing post and one owned by someone else give the same
    /// `AuthError::Forbidden`.
    pub async fn edit_post(
        &self,
        user_id: UserId,
        post_id: i64,
        input: PostInput,
    ) -> Result<Post, Error> {
        let fields = fields(input)?;

        let owned = self
            .repository
            .find_post(post_id)
            .await?
            .is_some_and(|p| p.user_id == user_id);
        if !owned {
            return Err(denied());
        }

        self.repository
            .update_post(post_id, user_id, fields, Utc::now())
            .await?
            .ok_or_else(denied)
    }

    /// Comment on a post. Returns `None` when the post does not exist.
    pub async fn add_comment(
        &self,
        user_id: UserId,
        post_id: i64,
        comment: &str,
    ) -> Result<Option<Comment>, Error> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ValidationError::MissingField("Comment cannot be empty".to_string()).into());
        }

        if self.repository.find_post(post_id).await?.is_none() {
            return Ok(None);
        }

        let comment = self
            .repository
            .add_comment(post_id, user_id, comment, Utc::now())
            .await?;
        tracing::debug!(post_id, user_id = %user_id, "Comment added");
        Ok(Some(comment))
    }

    /// Like a post, or take the like back. Returns `None` when the post does not exist.
    pub async fn toggle_like(
        &self,
        user_id: UserId,
        post_id: i64,
    ) -> Result<Option<LikeOutcome>, Error> {
        if self.repository.find_post(post_id).await?.is_none() {
            return Ok(None);
        }

        let outcome = self
            .repository
            .toggle_like(post_id, user_id, Utc::now())
            .await?;
        Ok(Some(outcome))
    }

    /// Every post by `user_id` with its likes and comments.
    pub async fn posts_by_user(&self, user_id: UserId) -> Result<Vec<PostDetail>, Error> {
        let posts = self.repository.list_posts_by_user(user_id).await?;
        let mut details = Vec::with_capacity(posts.len());
        for post in posts {
            details.push(self.detail(post).await?);
        }
        Ok(details)
    }

    pub async fn count_by_user(&self, user_id: UserId) -> Result<u64, Error> {
        self.repository.count_posts_by_user(user_id).await
    }

    async fn detail(&self, post: Post) -> Result<PostDetail, Error> {
        let liked_by = self
            .repository
            .liked_by(post.id, LIKED_BY_LIMIT)
            .await?
            .iter()
            .map(|author| author.full_name())
            .collect();
        let comments = self.repository.recent_comments(post.id, COMMENT_LIMIT).await?;

        Ok(PostDetail {
            post,
            liked_by,
            comments,
        })
    }
}

fn fields(input: PostInput) -> Result<PostFields, Error> {
    validate_required("Title", &input.title)?;

    Ok(PostFields {
        title: input.title.trim().to_string(),
        photo_url: input.photo_url,
        caption: input.caption,
    })
}

fn denied() -> Error {
    AuthError::Forbidden("Post not found or access denied".to_string()).into()
}
