//! Shared learning resources
//!
//! Resources come in two kinds that live in separate tables with the same shape.
//! [`ResourceKind`] is the only way to name a table, so a table name is never
//! assembled from request input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Author, UserId, error::ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Culinary,
    Educational,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Culinary, ResourceKind::Educational];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Culinary => "culinary",
            ResourceKind::Educational => "educational",
        }
    }

    /// The table holding resources of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            ResourceKind::Culinary => "culinary_resources",
            ResourceKind::Educational => "educational_resources",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "culinary" => Ok(ResourceKind::Culinary),
            "educational" => Ok(ResourceKind::Educational),
            other => Err(ValidationError::InvalidField(format!(
                "Unknown resource type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub kind: ResourceKind,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    /// Curated entries seeded by the site; listed ahead of user submissions
    pub is_system_resource: bool,
    /// `None` when the owning account no longer exists
    pub author: Option<Author>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied resource fields for create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResourceInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}
