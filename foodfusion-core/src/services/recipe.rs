use crate::{
    Error, UserId,
    error::{AuthError, ValidationError},
    recipe::{Recipe, RecipeInput},
    repositories::{RecipeFields, RecipeRepository},
    validation::validate_required,
};
use chrono::Utc;
use std::sync::Arc;

/// Listings return at most this many recipes.
pub const LIST_LIMIT: u32 = 100;

/// Service for member recipes
pub struct RecipeService<R: RecipeRepository> {
    repository: Arc<R>,
}

impl<R: RecipeRepository> RecipeService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Share a new recipe. Only the title is required.
    pub async fn create(&self, user_id: UserId, input: RecipeInput) -> Result<Recipe, Error> {
        let fields = fields(input)?;
        let recipe = self.repository.create(user_id, fields, Utc::now()).await?;

        tracing::info!(recipe_id = recipe.id, user_id = %user_id, "Recipe created");
        Ok(recipe)
    }

    /// Newest recipes from every member.
    pub async fn list(&self) -> Result<Vec<Recipe>, Error> {
        self.repository.list(LIST_LIMIT).await
    }

    pub async fn get(&self, recipe_id: i64) -> Result<Option<Recipe>, Error> {
        self.repository.find(recipe_id).await
    }

    /// Overwrite a recipe owned by `user_id`.
    ///
    /// A missing recipe and one owned by someone else give the same
    /// `AuthError::Forbidden`. Omitted fields fall back to their defaults.
    pub async fn edit(
        &self,
        user_id: UserId,
        recipe_id: i64,
        input: RecipeInput,
    ) -> Result<Recipe, Error> {
        let fields = fields(input)?;

        let owned = self
            .repository
            .find(recipe_id)
            .await?
            .is_some_and(|r| r.user_id == user_id);
        if !owned {
            return Err(denied());
        }

        self.repository
            .update(recipe_id, user_id, fields, Utc::now())
            .await?
            .ok_or_else(denied)
    }

    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Recipe>, Error> {
        self.repository.list_by_user(user_id).await
    }

    pub async fn count_by_user(&self, user_id: UserId) -> Result<u64, Error> {
        self.repository.count_by_user(user_id).await
    }
}

fn fields(input: RecipeInput) -> Result<RecipeFields, Error> {
    validate_required("Title", &input.title)?;

    let servings = input.servings.unwrap_or(1);
    if servings == 0 {
        return Err(ValidationError::InvalidField("Servings must be at least 1".to_string()).into());
    }

    Ok(RecipeFields {
        title: input.title.trim().to_string(),
        description: input.description,
        ingredients: input.ingredients,
        instructions: input.instructions,
        cuisine: input.cuisine,
        difficulty: input.difficulty.unwrap_or_default(),
        prep_time: input.prep_time.unwrap_or(0),
        cook_time: input.cook_time.unwrap_or(0),
        servings,
        image_url: input.image_url,
    })
}

fn denied() -> Error {
    AuthError::Forbidden("Recipe not found or access denied".to_string()).into()
}
