use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error, UserId,
    resource::{Resource, ResourceKind},
};

/// Validated fields written by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFields {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
}

/// Repository for culinary and educational resources
///
/// Every method takes the [`ResourceKind`] that selects the table.
#[async_trait]
pub trait ResourceRepository: Send + Sync + 'static {
    /// Insert a resource owned by `user_id`
    async fn create(
        &self,
        kind: ResourceKind,
        user_id: UserId,
        fields: ResourceFields,
        at: DateTime<Utc>,
    ) -> Result<Resource, Error>;

    /// System resources first, then newest first; at most `limit` rows
    async fn list(&self, kind: ResourceKind, limit: u32) -> Result<Vec<Resource>, Error>;

    /// Every resource of `kind` owned by `user_id`, newest first
    async fn list_by_user(
        &self,
        kind: ResourceKind,
        user_id: UserId,
    ) -> Result<Vec<Resource>, Error>;

    async fn count_by_user(&self, kind: ResourceKind, user_id: UserId) -> Result<u64, Error>;

    async fn find(&self, kind: ResourceKind, id: i64) -> Result<Option<Resource>, Error>;

    /// Overwrite a resource's fields if it is owned by `user_id`
    ///
    /// Returns `None` when no row with that id and owner exists.
    async fn update(
        &self,
        kind: ResourceKind,
        id: i64,
        user_id: UserId,
        fields: ResourceFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Resource>, Error>;
}
