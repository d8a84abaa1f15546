//! Per-user summaries of everything a member has shared.
use serde::Serialize;

use crate::{Recipe, Resource, community::PostDetail};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub recipe_count: u64,
    pub post_count: u64,
    pub culinary_count: u64,
    pub educational_count: u64,
}

/// Everything one member created, newest first in each list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserContent {
    pub recipes: Vec<Recipe>,
    pub posts: Vec<PostDetail>,
    pub culinary_resources: Vec<Resource>,
    pub educational_resources: Vec<Resource>,
}
