use crate::{
    Error, UserId,
    error::AuthError,
    repositories::{ResourceFields, ResourceRepository},
    resource::{Resource, ResourceInput, ResourceKind},
    validation::validate_required,
};
use chrono::Utc;
use std::sync::Arc;

/// Listings return at most this many resources.
pub const LIST_LIMIT: u32 = 50;

/// Service for culinary and educational resources
pub struct ResourceService<R: ResourceRepository> {
    repository: Arc<R>,
}

impl<R: ResourceRepository> ResourceService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Share a new resource. Title and link are required.
    pub async fn create(
        &self,
        user_id: UserId,
        kind: ResourceKind,
        input: ResourceInput,
    ) -> Result<Resource, Error> {
        validate_required("Title", &input.title)?;
        let link = input.link.unwrap_or_default();
        validate_required("Link", &link)?;

        let resource = self
            .repository
            .create(
                kind,
                user_id,
                ResourceFields {
                    title: input.title.trim().to_string(),
                    description: input.description,
                    link: link.trim().to_string(),
                },
                Utc::now(),
            )
            .await?;

        tracing::info!(
            resource_id = resource.id,
            kind = %kind,
            user_id = %user_id,
            "Resource created"
        );
        Ok(resource)
    }

    /// System resources, then the newest of a kind.
    pub async fn list(&self, kind: ResourceKind) -> Result<Vec<Resource>, Error> {
        self.repository.list(kind, LIST_LIMIT).await
    }

    /// Every resource of a kind shared by `user_id`.
    pub async fn list_by_user(
        &self,
        kind: ResourceKind,
        user_id: UserId,
    ) -> Result<Vec<Resource>, Error> {
        self.repository.list_by_user(kind, user_id).await
    }

    pub async fn count_by_user(&self, kind: ResourceKind, user_id: UserId) -> Result<u64, Error> {
        self.repository.count_by_user(kind, user_id).await
    }

    /// Overwrite a resource owned by `user_id`.
    ///
    /// A missing resource and one owned by someone else give the same
    /// `AuthError::Forbidden`. Description and link are cleared when omitted.
    pub async fn edit(
        &self,
        user_id: UserId,
        kind: ResourceKind,
        resource_id: i64,
        input: ResourceInput,
    ) -> Result<Resource, Error> {
        validate_required("Title", &input.title)?;

        let owned = self
            .repository
            .find(kind, resource_id)
            .await?
            .is_some_and(|r| r.user_id == user_id);
        if !owned {
            return Err(denied());
        }

        self.repository
            .update(
                kind,
                resource_id,
                user_id,
                ResourceFields {
                    title: input.title.trim().to_string(),
                    description: Some(input.description.unwrap_or_default()),
                    link: input.link.unwrap_or_default(),
                },
                Utc::now(),
            )
            .await?
            .ok_or_else(denied)
    }
}

fn denied() -> Error {
    AuthError::Forbidden("Resource not found or access denied".to_string()).into()
}
