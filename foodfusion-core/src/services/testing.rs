//! In-memory repositories shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Author, ClientId, Error, User, UserId,
    community::{Comment, LikeOutcome, Post},
    error::{AuthError, StorageError},
    recipe::Recipe,
    repositories::{
        CommunityRepository, LoginAttemptRepository, PostFields, RecipeFields, RecipeRepository,
        ResourceFields, ResourceRepository, UserRepository,
    },
    resource::{Resource, ResourceKind},
    storage::AttemptRecord,
    user::{NewUser, ProfileUpdate},
};

#[derive(Default)]
pub struct MockLoginAttemptRepository {
    records: Mutex<HashMap<ClientId, AttemptRecord>>,
}

impl MockLoginAttemptRepository {
    pub fn get(&self, client_id: &ClientId) -> Option<AttemptRecord> {
        self.records.lock().unwrap().get(client_id).cloned()
    }
}

#[async_trait]
impl LoginAttemptRepository for MockLoginAttemptRepository {
    async fn find(&self, client_id: &ClientId) -> Result<Option<AttemptRecord>, Error> {
        Ok(self.get(client_id))
    }

    async fn increment(
        &self,
        client_id: &ClientId,
        at: DateTime<Utc>,
    ) -> Result<AttemptRecord, Error> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(client_id.clone())
            .or_insert_with(|| AttemptRecord {
                client_id: client_id.clone(),
                attempts: 0,
                last_attempt_at: at,
                blocked_until: None,
            });
        record.attempts += 1;
        record.last_attempt_at = at;
        Ok(record.clone())
    }

    async fn set_blocked_until(
        &self,
        client_id: &ClientId,
        until: DateTime<Utc>,
    ) -> Result<(), Error> {
        if let Some(record) = self.records.lock().unwrap().get_mut(client_id) {
            record.blocked_until = Some(until);
        }
        Ok(())
    }

    async fn reset(&self, client_id: &ClientId) -> Result<(), Error> {
        if let Some(record) = self.records.lock().unwrap().get_mut(client_id) {
            record.attempts = 0;
            record.blocked_until = None;
        }
        Ok(())
    }

    async fn delete(&self, client_id: &ClientId) -> Result<(), Error> {
        self.records.lock().unwrap().remove(client_id);
        Ok(())
    }

    async fn purge_stale(&self, before: DateTime<Utc>, now: DateTime<Utc>) -> Result<u64, Error> {
        let mut records = self.records.lock().unwrap();
        let before_len = records.len();
        records.retain(|_, r| r.last_attempt_at >= before || r.is_blocked_at(now));
        Ok((before_len - records.len()) as u64)
    }
}

/// An attempt store that is always down.
pub struct FailingLoginAttemptRepository;

fn unavailable() -> Error {
    StorageError::Unavailable("attempt store offline".to_string()).into()
}

#[async_trait]
impl LoginAttemptRepository for FailingLoginAttemptRepository {
    async fn find(&self, _client_id: &ClientId) -> Result<Option<AttemptRecord>, Error> {
        Err(unavailable())
    }

    async fn increment(
        &self,
        _client_id: &ClientId,
        _at: DateTime<Utc>,
    ) -> Result<AttemptRecord, Error> {
        Err(unavailable())
    }

    async fn set_blocked_until(
        &self,
        _client_id: &ClientId,
        _until: DateTime<Utc>,
    ) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn reset(&self, _client_id: &ClientId) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn delete(&self, _client_id: &ClientId) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn purge_stale(&self, _before: DateTime<Utc>, _now: DateTime<Utc>) -> Result<u64, Error> {
        Err(unavailable())
    }
}

#[derive(Default)]
pub struct MockUserRepository {
    users: Mutex<Vec<(User, String)>>,
}

impl MockUserRepository {
    pub fn deactivate(&self, email: &str) {
        for (user, _) in self.users.lock().unwrap().iter_mut() {
            if user.email == email {
                user.is_active = false;
            }
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, user: NewUser, password_hash: &str) -> Result<User, Error> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|(u, _)| u.email == user.email) {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let created = User::builder()
            .id(UserId::new(users.len() as i64 + 1))
            .first_name(user.first_name)
            .last_name(user.last_name)
            .email(user.email)
            .build()?;
        users.push((created.clone(), password_hash.to_string()));
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, _)| u.clone()))
    }

    async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|(u, _)| u.id == id).map(|(_, h)| h.clone()))
    }

    async fn set_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), Error> {
        let mut users = self.users.lock().unwrap();
        if let Some((user, _)) = users.iter_mut().find(|(u, _)| u.id == id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        _at: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        let mut users = self.users.lock().unwrap();
        let Some((user, _)) = users.iter_mut().find(|(u, _)| u.id == id) else {
            return Ok(None);
        };
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        Ok(Some(user.clone()))
    }

    async fn set_active(
        &self,
        id: UserId,
        active: bool,
        _at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let mut users = self.users.lock().unwrap();
        let Some((user, _)) = users.iter_mut().find(|(u, _)| u.id == id) else {
            return Ok(false);
        };
        user.is_active = active;
        Ok(true)
    }
}

#[derive(Default)]
pub struct MockResourceRepository {
    resources: Mutex<Vec<Resource>>,
}

#[async_trait]
impl ResourceRepository for MockResourceRepository {
    async fn create(
        &self,
        kind: ResourceKind,
        user_id: UserId,
        fields: ResourceFields,
        at: DateTime<Utc>,
    ) -> Result<Resource, Error> {
        let mut resources = self.resources.lock().unwrap();
        let resource = Resource {
            id: resources.len() as i64 + 1,
            kind,
            user_id,
            title: fields.title,
            description: fields.description,
            link: fields.link,
            is_system_resource: false,
            author: None,
            created_at: at,
            updated_at: at,
        };
        resources.push(resource.clone());
        Ok(resource)
    }

    async fn list(&self, kind: ResourceKind, limit: u32) -> Result<Vec<Resource>, Error> {
        let resources = self.resources.lock().unwrap();
        let mut listed: Vec<Resource> = resources
            .iter()
            .rev()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect();
        listed.sort_by_key(|r| !r.is_system_resource);
        listed.truncate(limit as usize);
        Ok(listed)
    }

    async fn list_by_user(
        &self,
        kind: ResourceKind,
        user_id: UserId,
    ) -> Result<Vec<Resource>, Error> {
        let resources = self.resources.lock().unwrap();
        Ok(resources
            .iter()
            .rev()
            .filter(|r| r.kind == kind && r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_by_user(&self, kind: ResourceKind, user_id: UserId) -> Result<u64, Error> {
        let resources = self.resources.lock().unwrap();
        Ok(resources
            .iter()
            .filter(|r| r.kind == kind && r.user_id == user_id)
            .count() as u64)
    }

    async fn find(&self, kind: ResourceKind, id: i64) -> Result<Option<Resource>, Error> {
        let resources = self.resources.lock().unwrap();
        Ok(resources
            .iter()
            .find(|r| r.kind == kind && r.id == id)
            .cloned())
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: i64,
        user_id: UserId,
        fields: ResourceFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Resource>, Error> {
        let mut resources = self.resources.lock().unwrap();
        let Some(resource) = resources
            .iter_mut()
            .find(|r| r.kind == kind && r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        resource.title = fields.title;
        resource.description = fields.description;
        resource.link = fields.link;
        resource.updated_at = at;
        Ok(Some(resource.clone()))
    }
}

impl MockResourceRepository {
    pub fn mark_system(&self, id: i64) {
        for resource in self.resources.lock().unwrap().iter_mut() {
            if resource.id == id {
                resource.is_system_resource = true;
            }
        }
    }
}

#[derive(Default)]
pub struct MockRecipeRepository {
    recipes: Mutex<Vec<Recipe>>,
}

fn apply_recipe_fields(recipe: &mut Recipe, fields: RecipeFields) {
    recipe.title = fields.title;
    recipe.description = fields.description;
    recipe.ingredients = fields.ingredients;
    recipe.instructions = fields.instructions;
    recipe.cuisine = fields.cuisine;
    recipe.difficulty = fields.difficulty;
    recipe.prep_time = fields.prep_time;
    recipe.cook_time = fields.cook_time;
    recipe.servings = fields.servings;
    recipe.image_url = fields.image_url;
}

#[async_trait]
impl RecipeRepository for MockRecipeRepository {
    async fn create(
        &self,
        user_id: UserId,
        fields: RecipeFields,
        at: DateTime<Utc>,
    ) -> Result<Recipe, Error> {
        let mut recipes = self.recipes.lock().unwrap();
        let mut recipe = Recipe {
            id: recipes.len() as i64 + 1,
            user_id,
            title: String::new(),
            description: None,
            ingredients: None,
            instructions: None,
            cuisine: None,
            difficulty: Default::default(),
            prep_time: 0,
            cook_time: 0,
            servings: 1,
            image_url: None,
            author: None,
            created_at: at,
            updated_at: at,
        };
        apply_recipe_fields(&mut recipe, fields);
        recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn list(&self, limit: u32) -> Result<Vec<Recipe>, Error> {
        let recipes = self.recipes.lock().unwrap();
        Ok(recipes.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Recipe>, Error> {
        let recipes = self.recipes.lock().unwrap();
        Ok(recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn update(
        &self,
        id: i64,
        user_id: UserId,
        fields: RecipeFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Recipe>, Error> {
        let mut recipes = self.recipes.lock().unwrap();
        let Some(recipe) = recipes
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        apply_recipe_fields(recipe, fields);
        recipe.updated_at = at;
        Ok(Some(recipe.clone()))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Recipe>, Error> {
        let recipes = self.recipes.lock().unwrap();
        Ok(recipes
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, Error> {
        let recipes = self.recipes.lock().unwrap();
        Ok(recipes.iter().filter(|r| r.user_id == user_id).count() as u64)
    }
}

/// Posts, comments and likes in memory.
///
/// Authors are resolved from names registered with [`add_author`](Self::add_author).
#[derive(Default)]
pub struct MockCommunityRepository {
    authors: Mutex<HashMap<UserId, (Author, String)>>,
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
    likes: Mutex<Vec<(i64, UserId)>>,
}

impl MockCommunityRepository {
    pub fn add_author(&self, user_id: UserId, first_name: &str, email: &str) {
        let author = Author {
            first_name: first_name.to_string(),
            last_name: "Cook".to_string(),
        };
        self.authors
            .lock()
            .unwrap()
            .insert(user_id, (author, email.to_string()));
    }

    fn author(&self, user_id: UserId) -> Option<Author> {
        self.authors
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|(author, _)| author.clone())
    }

    fn email(&self, user_id: UserId) -> Option<String> {
        self.authors
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|(_, email)| email.clone())
    }

    fn with_counts(&self, mut post: Post) -> Post {
        post.like_count = self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == post.id)
            .count() as u64;
        post.comment_count = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post.id)
            .count() as u64;
        post
    }
}

#[async_trait]
impl CommunityRepository for MockCommunityRepository {
    async fn create_post(
        &self,
        user_id: UserId,
        fields: PostFields,
        at: DateTime<Utc>,
    ) -> Result<Post, Error> {
        let author = self.author(user_id);
        let mut posts = self.posts.lock().unwrap();
        let post = Post {
            id: posts.len() as i64 + 1,
            user_id,
            title: fields.title,
            photo_url: fields.photo_url,
            caption: fields.caption,
            author,
            like_count: 0,
            comment_count: 0,
            created_at: at,
            updated_at: at,
        };
        posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self, author_email: Option<&str>, limit: u32) -> Result<Vec<Post>, Error> {
        let posts: Vec<Post> = self.posts.lock().unwrap().iter().rev().cloned().collect();
        Ok(posts
            .into_iter()
            .filter(|p| {
                author_email.is_none_or(|email| self.email(p.user_id).as_deref() == Some(email))
            })
            .take(limit as usize)
            .map(|p| self.with_counts(p))
            .collect())
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, Error> {
        let post = self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned();
        Ok(post.map(|p| self.with_counts(p)))
    }

    async fn update_post(
        &self,
        id: i64,
        user_id: UserId,
        fields: PostFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, Error> {
        let updated = {
            let mut posts = self.posts.lock().unwrap();
            let Some(post) = posts
                .iter_mut()
                .find(|p| p.id == id && p.user_id == user_id)
            else {
                return Ok(None);
            };
            post.title = fields.title;
            post.photo_url = fields.photo_url;
            post.caption = fields.caption;
            post.updated_at = at;
            post.clone()
        };
        Ok(Some(self.with_counts(updated)))
    }

    async fn list_posts_by_user(&self, user_id: UserId) -> Result<Vec<Post>, Error> {
        let posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(posts.into_iter().map(|p| self.with_counts(p)).collect())
    }

    async fn count_posts_by_user(&self, user_id: UserId) -> Result<u64, Error> {
        let posts = self.posts.lock().unwrap();
        Ok(posts.iter().filter(|p| p.user_id == user_id).count() as u64)
    }

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: UserId,
        comment: &str,
        at: DateTime<Utc>,
    ) -> Result<Comment, Error> {
        let author = self.author(user_id);
        let mut comments = self.comments.lock().unwrap();
        let comment = Comment {
            id: comments.len() as i64 + 1,
            post_id,
            user_id,
            comment: comment.to_string(),
            author,
            created_at: at,
        };
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn recent_comments(&self, post_id: i64, limit: u32) -> Result<Vec<Comment>, Error> {
        let comments = self.comments.lock().unwrap();
        Ok(comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn liked_by(&self, post_id: i64, limit: u32) -> Result<Vec<Author>, Error> {
        let likers: Vec<UserId> = self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == post_id)
            .map(|(_, user_id)| *user_id)
            .collect();
        Ok(likers
            .into_iter()
            .filter_map(|user_id| self.author(user_id))
            .take(limit as usize)
            .collect())
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: UserId,
        _at: DateTime<Utc>,
    ) -> Result<LikeOutcome, Error> {
        let mut likes = self.likes.lock().unwrap();
        if let Some(index) = likes.iter().position(|like| *like == (post_id, user_id)) {
            likes.remove(index);
            Ok(LikeOutcome::Unliked)
        } else {
            likes.push((post_id, user_id));
            Ok(LikeOutcome::Liked)
        }
    }
}
