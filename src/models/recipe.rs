use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ingredient::Ingredient;

/// A full recipe aggregate. The planner only ever embeds read-only copies;
/// ownership stays with the recipe repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    /// Row id assigned by the store; 0 until persisted.
    pub id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Additional image URLs shown in the recipe gallery.
    pub gallery_urls: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn new(title: impl Into<String>, created_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title: title.into(),
            image_url: None,
            ingredients: Vec::new(),
            category: None,
            tags: Vec::new(),
            gallery_urls: Vec::new(),
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_gallery_urls(mut self, urls: Vec<String>) -> Self {
        self.gallery_urls = urls;
        self
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;

        if let Some(category) = &self.category {
            writeln!(f, "Category: {}", category)?;
        }

        if !self.tags.is_empty() {
            writeln!(f, "Tags: {}", self.tags.join(", "))?;
        }

        if let Some(url) = &self.image_url {
            writeln!(f, "Image: {}", url)?;
        }

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        Ok(())
    }
}
