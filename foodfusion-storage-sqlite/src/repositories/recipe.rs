//! SQLite implementation of the recipe repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodfusion_core::{
    Author, Difficulty, Error, Recipe, UserId,
    error::StorageError,
    repositories::{RecipeFields, RecipeRepository},
};
use sqlx::SqlitePool;

use super::timestamp;

pub struct SqliteRecipeRepository {
    pool: SqlitePool,
}

impl SqliteRecipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const RECIPE_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.title, r.description, r.ingredients, r.instructions,
           r.cuisine, r.difficulty, r.prep_time, r.cook_time, r.servings, r.image_url,
           r.created_at, r.updated_at,
           u.first_name AS author_first_name, u.last_name AS author_last_name
    FROM recipes r
    LEFT JOIN users u ON u.id = r.user_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct SqliteRecipe {
    id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    ingredients: Option<String>,
    instructions: Option<String>,
    cuisine: Option<String>,
    difficulty: String,
    prep_time: i64,
    cook_time: i64,
    servings: i64,
    image_url: Option<String>,
    created_at: i64,
    updated_at: i64,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
}

impl TryFrom<SqliteRecipe> for Recipe {
    type Error = Error;

    fn try_from(row: SqliteRecipe) -> Result<Self, Self::Error> {
        let difficulty: Difficulty = row
            .difficulty
            .parse()
            .map_err(|e| StorageError::Database(format!("Corrupt recipe {}: {e}", row.id)))?;

        Ok(Recipe {
            id: row.id,
            user_id: UserId::new(row.user_id),
            title: row.title,
            description: row.description,
            ingredients: row.ingredients,
            instructions: row.instructions,
            cuisine: row.cuisine,
            difficulty,
            prep_time: quantity(row.prep_time)?,
            cook_time: quantity(row.cook_time)?,
            servings: quantity(row.servings)?,
            image_url: row.image_url,
            author: Author::from_parts(row.author_first_name, row.author_last_name),
            created_at: timestamp(row.created_at)?,
            updated_at: timestamp(row.updated_at)?,
        })
    }
}

fn quantity(value: i64) -> Result<u32, Error> {
    u32::try_from(value)
        .map_err(|_| StorageError::Database(format!("Invalid recipe quantity: {value}")).into())
}

fn database_error(action: &str, e: sqlx::Error) -> Error {
    tracing::error!(error = %e, "Failed to {action} recipe");
    StorageError::Database(format!("Failed to {action} recipe")).into()
}

impl SqliteRecipeRepository {
    async fn fetch(&self, id: i64) -> Result<Option<Recipe>, Error> {
        let row = sqlx::query_as::<_, SqliteRecipe>(&format!("{RECIPE_SELECT} WHERE r.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("load", e))?;

        row.map(Recipe::try_from).transpose()
    }
}

#[async_trait]
impl RecipeRepository for SqliteRecipeRepository {
    async fn create(
        &self,
        user_id: UserId,
        fields: RecipeFields,
        at: DateTime<Utc>,
    ) -> Result<Recipe, Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (
                user_id, title, description, ingredients, instructions, cuisine,
                difficulty, prep_time, cook_time, servings, image_url, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            RETURNING id
            "#,
        )
        .bind(user_id.as_i64())
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.ingredients)
        .bind(&fields.instructions)
        .bind(&fields.cuisine)
        .bind(fields.difficulty.as_str())
        .bind(i64::from(fields.prep_time))
        .bind(i64::from(fields.cook_time))
        .bind(i64::from(fields.servings))
        .bind(&fields.image_url)
        .bind(at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create", e))?;

        self.fetch(id).await?.ok_or_else(|| {
            StorageError::Database("Created recipe could not be read back".to_string()).into()
        })
    }

    async fn list(&self, limit: u32) -> Result<Vec<Recipe>, Error> {
        let rows = sqlx::query_as::<_, SqliteRecipe>(&format!(
            "{RECIPE_SELECT} ORDER BY r.created_at DESC, r.id DESC LIMIT ?1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list", e))?;

        rows.into_iter().map(Recipe::try_from).collect()
    }

    async fn find(&self, id: i64) -> Result<Option<Recipe>, Error> {
        self.fetch(id).await
    }

    async fn update(
        &self,
        id: i64,
        user_id: UserId,
        fields: RecipeFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Recipe>, Error> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE recipes
            SET title = ?1, description = ?2, ingredients = ?3, instructions = ?4,
                cuisine = ?5, difficulty = ?6, prep_time = ?7, cook_time = ?8,
                servings = ?9, image_url = ?10, updated_at = ?11
            WHERE id = ?12 AND user_id = ?13
            RETURNING id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.ingredients)
        .bind(&fields.instructions)
        .bind(&fields.cuisine)
        .bind(fields.difficulty.as_str())
        .bind(i64::from(fields.prep_time))
        .bind(i64::from(fields.cook_time))
        .bind(i64::from(fields.servings))
        .bind(&fields.image_url)
        .bind(at.timestamp())
        .bind(id)
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("update", e))?;

        match updated {
            Some(id) => self.fetch(id).await,
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Recipe>, Error> {
        let rows = sqlx::query_as::<_, SqliteRecipe>(&format!(
            "{RECIPE_SELECT} WHERE r.user_id = ?1 ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list", e))?;

        rows.into_iter().map(Recipe::try_from).collect()
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count", e))?;

        Ok(count.unsigned_abs())
    }
}
