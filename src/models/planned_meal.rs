use serde::{Deserialize, Serialize};
use std::fmt;

use super::recipe::Recipe;

/// What a planned meal points at: a free-text entry or an embedded recipe.
/// The two are mutually exclusive by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MealSource {
    Custom,
    Recipe(Recipe),
}

/// One scheduled entry on the calendar.
///
/// The id is either a persisted row id, the backing recipe's id, or a
/// temporary timestamp-based id for a custom entry that has not been
/// confirmed by the store yet. Temporary ids are local-only and are
/// replaced by row ids on the next full refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedMeal {
    pub id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub source: MealSource,
}

impl PlannedMeal {
    /// Creates a custom (free-text) entry.
    pub fn custom(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: None,
            source: MealSource::Custom,
        }
    }

    /// Creates a recipe-backed entry; the entry id is the recipe id.
    pub fn from_recipe(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            image_url: recipe.image_url.clone(),
            source: MealSource::Recipe(recipe),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.source, MealSource::Custom)
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        match &self.source {
            MealSource::Recipe(recipe) => Some(recipe),
            MealSource::Custom => None,
        }
    }
}

impl fmt::Display for PlannedMeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_custom() {
            write!(f, "{} (custom)", self.title)
        } else {
            write!(f, "{}", self.title)
        }
    }
}
