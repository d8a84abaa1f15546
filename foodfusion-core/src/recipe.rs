//! Recipes shared by members
//!
//! | Field          | Type             | Description                                  |
//! | -------------- | ---------------- | -------------------------------------------- |
//! | `title`        | `String`         | Required                                     |
//! | `ingredients`  | `Option<String>` | Free text, one ingredient per line by custom |
//! | `instructions` | `Option<String>` | Free text                                    |
//! | `difficulty`   | `Difficulty`     | `Easy` unless given                          |
//! | `prep_time`    | `u32`            | Minutes, 0 unless given                      |
//! | `cook_time`    | `u32`            | Minutes, 0 unless given                      |
//! | `servings`     | `u32`            | At least 1, 1 unless given                   |
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Author, UserId, error::ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(ValidationError::InvalidField(format!(
                "Unknown difficulty: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub user_id: UserId,
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
    pub author: Option<Author>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied recipe fields for create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecipeInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub prep_time: Option<u32>,
    #[serde(default)]
    pub cook_time: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
}
