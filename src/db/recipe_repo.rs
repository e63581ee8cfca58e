use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{Ingredient, Recipe};

pub struct RecipeRepository {
    pool: SqlitePool,
}

// Row types for database queries
#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: i64,
    title: String,
    image_url: Option<String>,
    category: Option<String>,
    tags: String,
    gallery_urls: String,
    created_by: String,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct IngredientRow {
    name: String,
    amount: f64,
    unit: String,
}

impl RecipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a recipe and its ingredients; returns the stored recipe
    /// with its assigned row id.
    pub async fn create(&self, recipe: &Recipe) -> Result<Recipe, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let tags = serde_json::to_string(&recipe.tags).unwrap_or_else(|_| "[]".to_string());
        let gallery =
            serde_json::to_string(&recipe.gallery_urls).unwrap_or_else(|_| "[]".to_string());
        let created_at = recipe.created_at.to_rfc3339();
        let updated_at = recipe.updated_at.to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO recipes (title, image_url, category, tags, gallery_urls, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&recipe.title)
        .bind(&recipe.image_url)
        .bind(&recipe.category)
        .bind(&tags)
        .bind(&gallery)
        .bind(&recipe.created_by)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();

        for ingredient in &recipe.ingredients {
            sqlx::query(
                "INSERT INTO ingredients (recipe_id, name, amount, unit) VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&ingredient.name)
            .bind(ingredient.amount)
            .bind(&ingredient.unit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>, sqlx::Error> {
        let row: Option<RecipeRow> = sqlx::query_as("SELECT * FROM recipes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.hydrate_recipe(row).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Option<Recipe>, sqlx::Error> {
        let row: Option<RecipeRow> =
            sqlx::query_as("SELECT * FROM recipes WHERE LOWER(title) = LOWER(?)")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.hydrate_recipe(row).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<Recipe>, sqlx::Error> {
        let rows: Vec<RecipeRow> = sqlx::query_as("SELECT * FROM recipes ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in rows {
            recipes.push(self.hydrate_recipe(row).await?);
        }
        Ok(recipes)
    }

    /// Case-insensitive substring search over title, category and tags.
    pub async fn search(&self, query: &str) -> Result<Vec<Recipe>, sqlx::Error> {
        let pattern = format!("%{}%", query.to_lowercase());
        let rows: Vec<RecipeRow> = sqlx::query_as(
            r#"
            SELECT * FROM recipes
            WHERE LOWER(title) LIKE ?
               OR LOWER(COALESCE(category, '')) LIKE ?
               OR LOWER(tags) LIKE ?
            ORDER BY title
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in rows {
            recipes.push(self.hydrate_recipe(row).await?);
        }
        Ok(recipes)
    }

    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        // CASCADE handles ingredients and plan rows
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn hydrate_recipe(&self, row: RecipeRow) -> Result<Recipe, sqlx::Error> {
        let ingredients: Vec<IngredientRow> =
            sqlx::query_as("SELECT name, amount, unit FROM ingredients WHERE recipe_id = ?")
                .bind(row.id)
                .fetch_all(&self.pool)
                .await?;

        let tags: Vec<String> = serde_json::from_str(&row.tags).unwrap_or_default();
        let gallery_urls: Vec<String> = serde_json::from_str(&row.gallery_urls).unwrap_or_default();

        Ok(Recipe {
            id: row.id,
            title: row.title,
            image_url: row.image_url,
            ingredients: ingredients
                .into_iter()
                .map(|i| Ingredient::new(i.name, i.amount, i.unit))
                .collect(),
            category: row.category,
            tags,
            gallery_urls,
            created_by: row.created_by,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
