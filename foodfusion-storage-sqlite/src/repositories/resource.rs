//! SQLite implementation of the resource repository.
//!
//! Table names come only from [`ResourceKind::table`], which returns one of two
//! static strings, so formatting them into SQL is safe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodfusion_core::{
    Author, Error, Resource, ResourceKind, UserId,
    error::StorageError,
    repositories::{ResourceFields, ResourceRepository},
};
use sqlx::SqlitePool;

use super::timestamp;

pub struct SqliteResourceRepository {
    pool: SqlitePool,
}

impl SqliteResourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Resource columns plus the owner's name from `users`, for `FROM {table} r`.
const RESOURCE_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.title, r.description, r.link, r.is_system_resource,
           r.created_at, r.updated_at,
           u.first_name AS author_first_name, u.last_name AS author_last_name
"#;

#[derive(Debug, sqlx::FromRow)]
struct SqliteResource {
    id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    link: String,
    is_system_resource: bool,
    created_at: i64,
    updated_at: i64,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
}

impl SqliteResource {
    fn into_resource(self, kind: ResourceKind) -> Result<Resource, Error> {
        Ok(Resource {
            id: self.id,
            kind,
            user_id: UserId::new(self.user_id),
            title: self.title,
            description: self.description,
            link: self.link,
            is_system_resource: self.is_system_resource,
            author: Author::from_parts(self.author_first_name, self.author_last_name),
            created_at: timestamp(self.created_at)?,
            updated_at: timestamp(self.updated_at)?,
        })
    }
}

fn database_error(action: &str, kind: ResourceKind, e: sqlx::Error) -> Error {
    tracing::error!(error = %e, kind = %kind, "Failed to {action} resource");
    StorageError::Database(format!("Failed to {action} resource")).into()
}

impl SqliteResourceRepository {
    async fn fetch(&self, kind: ResourceKind, id: i64) -> Result<Option<Resource>, Error> {
        let row = sqlx::query_as::<_, SqliteResource>(&format!(
            "{RESOURCE_SELECT} FROM {} r LEFT JOIN users u ON u.id = r.user_id WHERE r.id = ?1",
            kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("load", kind, e))?;

        row.map(|r| r.into_resource(kind)).transpose()
    }
}

#[async_trait]
impl ResourceRepository for SqliteResourceRepository {
    async fn create(
        &self,
        kind: ResourceKind,
        user_id: UserId,
        fields: ResourceFields,
        at: DateTime<Utc>,
    ) -> Result<Resource, Error> {
        let id: i64 = sqlx::query_scalar(&format!(
            r#"
            INSERT INTO {} (user_id, title, description, link, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id
            "#,
            kind.table()
        ))
        .bind(user_id.as_i64())
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.link)
        .bind(at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create", kind, e))?;

        self.fetch(kind, id).await?.ok_or_else(|| {
            StorageError::Database("Created resource could not be read back".to_string()).into()
        })
    }

    async fn list(&self, kind: ResourceKind, limit: u32) -> Result<Vec<Resource>, Error> {
        let rows = sqlx::query_as::<_, SqliteResource>(&format!(
            r#"
            {RESOURCE_SELECT} FROM {} r LEFT JOIN users u ON u.id = r.user_id
            ORDER BY r.is_system_resource DESC, r.created_at DESC, r.id DESC
            LIMIT ?1
            "#,
            kind.table()
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list", kind, e))?;

        rows.into_iter().map(|r| r.into_resource(kind)).collect()
    }

    async fn list_by_user(
        &self,
        kind: ResourceKind,
        user_id: UserId,
    ) -> Result<Vec<Resource>, Error> {
        let rows = sqlx::query_as::<_, SqliteResource>(&format!(
            r#"
            {RESOURCE_SELECT} FROM {} r LEFT JOIN users u ON u.id = r.user_id
            WHERE r.user_id = ?1
            ORDER BY r.created_at DESC, r.id DESC
            "#,
            kind.table()
        ))
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list", kind, e))?;

        rows.into_iter().map(|r| r.into_resource(kind)).collect()
    }

    async fn count_by_user(&self, kind: ResourceKind, user_id: UserId) -> Result<u64, Error> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = ?1",
            kind.table()
        ))
        .bind(user_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("count", kind, e))?;

        Ok(count.unsigned_abs())
    }

    async fn find(&self, kind: ResourceKind, id: i64) -> Result<Option<Resource>, Error> {
        self.fetch(kind, id).await
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: i64,
        user_id: UserId,
        fields: ResourceFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Resource>, Error> {
        let updated: Option<i64> = sqlx::query_scalar(&format!(
            r#"
            UPDATE {}
            SET title = ?1, description = ?2, link = ?3, updated_at = ?4
            WHERE id = ?5 AND user_id = ?6
            RETURNING id
            "#,
            kind.table()
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.link)
        .bind(at.timestamp())
        .bind(id)
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("update", kind, e))?;

        match updated {
            Some(id) => self.fetch(kind, id).await,
            None => Ok(None),
        }
    }
}
