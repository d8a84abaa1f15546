use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error, UserId,
    recipe::{Difficulty, Recipe},
};

/// Validated fields written by create and update, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub cuisine: Option<String>,
    pub difficulty: Difficulty,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub image_url: Option<String>,
}

/// Repository for recipes. Every returned recipe carries its author's name.
#[async_trait]
pub trait RecipeRepository: Send + Sync + 'static {
    async fn create(
        &self,
        user_id: UserId,
        fields: RecipeFields,
        at: DateTime<Utc>,
    ) -> Result<Recipe, Error>;

    /// Newest first, at most `limit` rows
    async fn list(&self, limit: u32) -> Result<Vec<Recipe>, Error>;

    async fn find(&self, id: i64) -> Result<Option<Recipe>, Error>;

    /// Overwrite a recipe's fields if it is owned by `user_id`
    ///
    /// Returns `None` when no row with that id and owner exists.
    async fn update(
        &self,
        id: i64,
        user_id: UserId,
        fields: RecipeFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Recipe>, Error>;

    /// Every recipe owned by `user_id`, newest first
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Recipe>, Error>;

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, Error>;
}
