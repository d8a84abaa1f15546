use crate::{
    Author, ClientId, Error, User, UserId,
    community::{Comment, LikeOutcome, Post},
    recipe::Recipe,
    repositories::{
        CommunityRepository, LoginAttemptRepository, PostFields, RecipeFields, RecipeRepository,
        RepositoryProvider, ResourceFields, ResourceRepository, UserRepository,
    },
    resource::{Resource, ResourceKind},
    storage::AttemptRecord,
    user::{NewUser, ProfileUpdate},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Adapter that wraps a RepositoryProvider and implements individual repository traits
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser, password_hash: &str) -> Result<User, Error> {
        self.provider.user().create(user, password_hash).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, Error> {
        self.provider.user().get_password_hash(id).await
    }

    async fn set_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), Error> {
        self.provider.user().set_last_login(id, at).await
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        self.provider.user().update_profile(id, update, at).await
    }

    async fn set_active(
        &self,
        id: UserId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        self.provider.user().set_active(id, active, at).await
    }
}

pub struct LoginAttemptRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> LoginAttemptRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> LoginAttemptRepository for LoginAttemptRepositoryAdapter<R> {
    async fn find(&self, client_id: &ClientId) -> Result<Option<AttemptRecord>, Error> {
        self.provider.login_attempt().find(client_id).await
    }

    async fn increment(
        &self,
        client_id: &ClientId,
        at: DateTime<Utc>,
    ) -> Result<AttemptRecord, Error> {
        self.provider.login_attempt().increment(client_id, at).await
    }

    async fn set_blocked_until(
        &self,
        client_id: &ClientId,
        until: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.provider
            .login_attempt()
            .set_blocked_until(client_id, until)
            .await
    }

    async fn reset(&self, client_id: &ClientId) -> Result<(), Error> {
        self.provider.login_attempt().reset(client_id).await
    }

    async fn delete(&self, client_id: &ClientId) -> Result<(), Error> {
        self.provider.login_attempt().delete(client_id).await
    }

    async fn purge_stale(&self, before: DateTime<Utc>, now: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.login_attempt().purge_stale(before, now).await
    }
}

pub struct ResourceRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ResourceRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ResourceRepository for ResourceRepositoryAdapter<R> {
    async fn create(
        &self,
        kind: ResourceKind,
        user_id: UserId,
        fields: ResourceFields,
        at: DateTime<Utc>,
    ) -> Result<Resource, Error> {
        self.provider
            .resource()
            .create(kind, user_id, fields, at)
            .await
    }

    async fn list(&self, kind: ResourceKind, limit: u32) -> Result<Vec<Resource>, Error> {
        self.provider.resource().list(kind, limit).await
    }

    async fn find(&self, kind: ResourceKind, id: i64) -> Result<Option<Resource>, Error> {
        self.provider.resource().find(kind, id).await
    }

    async fn list_by_user(
        &self,
        kind: ResourceKind,
        user_id: UserId,
    ) -> Result<Vec<Resource>, Error> {
        self.provider.resource().list_by_user(kind, user_id).await
    }

    async fn count_by_user(&self, kind: ResourceKind, user_id: UserId) -> Result<u64, Error> {
        self.provider.resource().count_by_user(kind, user_id).await
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: i64,
        user_id: UserId,
        fields: ResourceFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Resource>, Error> {
        self.provider
            .resource()
            .update(kind, id, user_id, fields, at)
            .await
    }
}

pub struct RecipeRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> RecipeRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> RecipeRepository for RecipeRepositoryAdapter<R> {
    async fn create(
        &self,
        user_id: UserId,
        fields: RecipeFields,
        at: DateTime<Utc>,
    ) -> Result<Recipe, Error> {
        self.provider.recipe().create(user_id, fields, at).await
    }

    async fn list(&self, limit: u32) -> Result<Vec<Recipe>, Error> {
        self.provider.recipe().list(limit).await
    }

    async fn find(&self, id: i64) -> Result<Option<Recipe>, Error> {
        self.provider.recipe().find(id).await
    }

    async fn update(
        &self,
        id: i64,
        user_id: UserId,
        fields: RecipeFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Recipe>, Error> {
        self.provider.recipe().update(id, user_id, fields, at).await
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Recipe>, Error> {
        self.provider.recipe().list_by_user(user_id).await
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, Error> {
        self.provider.recipe().count_by_user(user_id).await
    }
}

pub struct CommunityRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> CommunityRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> CommunityRepository for CommunityRepositoryAdapter<R> {
    async fn create_post(
        &self,
        user_id: UserId,
        fields: PostFields,
        at: DateTime<Utc>,
    ) -> Result<Post, Error> {
        self.provider.community().create_post(user_id, fields, at).await
    }

    async fn list_posts(&self, author_email: Option<&str>, limit: u32) -> Result<Vec<Post>, Error> {
        self.provider.community().list_posts(author_email, limit).await
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, Error> {
        self.provider.community().find_post(id).await
    }

    async fn update_post(
        &self,
        id: i64,
        user_id: UserId,
        fields: PostFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, Error> {
        self.provider
            .community()
            .update_post(id, user_id, fields, at)
            .await
    }

    async fn list_posts_by_user(&self, user_id: UserId) -> Result<Vec<Post>, Error> {
        self.provider.community().list_posts_by_user(user_id).await
    }

    async fn count_posts_by_user(&self, user_id: UserId) -> Result<u64, Error> {
        self.provider.community().count_posts_by_user(user_id).await
    }

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: UserId,
        comment: &str,
        at: DateTime<Utc>,
    ) -> Result<Comment, Error> {
        self.provider
            .community()
            .add_comment(post_id, user_id, comment, at)
            .await
    }

    async fn recent_comments(&self, post_id: i64, limit: u32) -> Result<Vec<Comment>, Error> {
        self.provider.community().recent_comments(post_id, limit).await
    }

    async fn liked_by(&self, post_id: i64, limit: u32) -> Result<Vec<Author>, Error> {
        self.provider.community().liked_by(post_id, limit).await
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<LikeOutcome, Error> {
        self.provider.community().toggle_like(post_id, user_id, at).await
    }
}
