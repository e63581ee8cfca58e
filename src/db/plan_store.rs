//! SQLite implementation of the planner's storage contract.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::RecipeRepository;
use crate::store::{NewPlanEntry, NoteRow, PlanMatch, PlanRow, PlannerStore, StoreError};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct PlanEntryRow {
    id: i64,
    date: String,
    custom_title: Option<String>,
    recipe_id: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct DailyNoteRow {
    date: String,
    text: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| StoreError::Corrupt(format!("invalid date '{}'", s)))
}

impl PlannerStore for SqliteStore {
    async fn fetch_plan_rows(&self, user: Uuid) -> Result<Vec<PlanRow>, StoreError> {
        let rows: Vec<PlanEntryRow> = sqlx::query_as(
            "SELECT id, date, custom_title, recipe_id FROM meal_plans WHERE user_id = ? ORDER BY id",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await?;

        let recipes = RecipeRepository::new(self.pool.clone());
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let date = parse_date(&row.date)?;
            let recipe = match row.recipe_id {
                Some(id) => recipes.get_by_id(id).await?,
                None => None,
            };
            out.push(PlanRow {
                id: row.id,
                date,
                custom_title: row.custom_title,
                recipe,
            });
        }
        Ok(out)
    }

    async fn fetch_notes(&self, user: Uuid) -> Result<Vec<NoteRow>, StoreError> {
        let rows: Vec<DailyNoteRow> =
            sqlx::query_as("SELECT date, text FROM daily_notes WHERE user_id = ? ORDER BY date")
                .bind(user.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|row| {
                Ok(NoteRow {
                    date: parse_date(&row.date)?,
                    text: row.text,
                })
            })
            .collect()
    }

    async fn insert_plan_entry(
        &self,
        user: Uuid,
        date: NaiveDate,
        entry: NewPlanEntry,
    ) -> Result<(), StoreError> {
        let (recipe_id, custom_title) = match entry {
            NewPlanEntry::Recipe { recipe_id } => (Some(recipe_id), None),
            NewPlanEntry::Custom { title } => (None, Some(title)),
        };

        sqlx::query(
            "INSERT INTO meal_plans (user_id, date, recipe_id, custom_title) VALUES (?, ?, ?, ?)",
        )
        .bind(user.to_string())
        .bind(date.to_string())
        .bind(recipe_id)
        .bind(custom_title)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_plan_entry(
        &self,
        user: Uuid,
        date: NaiveDate,
        target: PlanMatch,
    ) -> Result<(), StoreError> {
        match target {
            PlanMatch::Recipe { recipe_id } => {
                sqlx::query(
                    "DELETE FROM meal_plans WHERE user_id = ? AND date = ? AND recipe_id = ?",
                )
                .bind(user.to_string())
                .bind(date.to_string())
                .bind(recipe_id)
                .execute(&self.pool)
                .await?;
            }
            PlanMatch::Custom { title } => {
                sqlx::query(
                    "DELETE FROM meal_plans WHERE user_id = ? AND date = ? AND custom_title = ?",
                )
                .bind(user.to_string())
                .bind(date.to_string())
                .bind(title)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    async fn upsert_note(
        &self,
        user: Uuid,
        date: NaiveDate,
        text: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO daily_notes (user_id, date, text, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, date) DO UPDATE SET
                text = excluded.text,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user.to_string())
        .bind(date.to_string())
        .bind(text)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_note(&self, user: Uuid, date: NaiveDate) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM daily_notes WHERE user_id = ? AND date = ?")
            .bind(user.to_string())
            .bind(date.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::{Ingredient, Recipe};
    use tempfile::TempDir;

    async fn setup() -> (SqliteStore, RecipeRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(&db_path).await.unwrap();
        (
            SqliteStore::new(pool.clone()),
            RecipeRepository::new(pool),
            temp_dir,
        )
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_fetch_custom_entry() {
        let (store, _, _temp) = setup().await;
        let user = Uuid::new_v4();

        store
            .insert_plan_entry(user, date(5), NewPlanEntry::Custom { title: "Soup".into() })
            .await
            .unwrap();

        let rows = store.fetch_plan_rows(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].custom_title.as_deref(), Some("Soup"));
        assert!(rows[0].recipe.is_none());
    }

    #[tokio::test]
    async fn test_fetch_expands_recipe_aggregate() {
        let (store, recipes, _temp) = setup().await;
        let user = Uuid::new_v4();

        let created = recipes
            .create(
                &Recipe::new("Pasta", "maria")
                    .with_ingredients(vec![Ingredient::new("pasta", 200.0, "g")])
                    .with_tags(vec!["italian".into()]),
            )
            .await
            .unwrap();

        store
            .insert_plan_entry(
                user,
                date(5),
                NewPlanEntry::Recipe {
                    recipe_id: created.id,
                },
            )
            .await
            .unwrap();

        let rows = store.fetch_plan_rows(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        let recipe = rows[0].recipe.as_ref().unwrap();
        assert_eq!(recipe.title, "Pasta");
        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.tags, vec!["italian"]);
    }

    #[tokio::test]
    async fn test_fetch_preserves_insertion_order() {
        let (store, _, _temp) = setup().await;
        let user = Uuid::new_v4();

        for title in ["First", "Second", "Third"] {
            store
                .insert_plan_entry(
                    user,
                    date(5),
                    NewPlanEntry::Custom {
                        title: title.into(),
                    },
                )
                .await
                .unwrap();
        }

        let rows = store.fetch_plan_rows(user).await.unwrap();
        let titles: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.custom_title.as_deref())
            .collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_delete_matches_exact_field_set() {
        let (store, recipes, _temp) = setup().await;
        let user = Uuid::new_v4();

        let created = recipes.create(&Recipe::new("Pasta", "maria")).await.unwrap();
        store
            .insert_plan_entry(
                user,
                date(5),
                NewPlanEntry::Recipe {
                    recipe_id: created.id,
                },
            )
            .await
            .unwrap();
        store
            .insert_plan_entry(user, date(5), NewPlanEntry::Custom { title: "Soup".into() })
            .await
            .unwrap();

        // Deleting the custom entry leaves the recipe-backed one.
        store
            .delete_plan_entry(user, date(5), PlanMatch::Custom { title: "Soup".into() })
            .await
            .unwrap();

        let rows = store.fetch_plan_rows(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].recipe.is_some());

        // A delete for a different date matches nothing.
        store
            .delete_plan_entry(
                user,
                date(6),
                PlanMatch::Recipe {
                    recipe_id: created.id,
                },
            )
            .await
            .unwrap();
        assert_eq!(store.fetch_plan_rows(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rows_are_scoped_to_user() {
        let (store, _, _temp) = setup().await;
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store
            .insert_plan_entry(alice, date(5), NewPlanEntry::Custom { title: "Soup".into() })
            .await
            .unwrap();

        assert!(store.fetch_plan_rows(bob).await.unwrap().is_empty());
        assert!(store.fetch_notes(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_note_upsert_replaces_row() {
        let (store, _, _temp) = setup().await;
        let user = Uuid::new_v4();

        store.upsert_note(user, date(5), "Buy milk").await.unwrap();
        store.upsert_note(user, date(5), "Buy eggs").await.unwrap();

        let notes = store.fetch_notes(user).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "Buy eggs");
    }

    #[tokio::test]
    async fn test_note_delete() {
        let (store, _, _temp) = setup().await;
        let user = Uuid::new_v4();

        store.upsert_note(user, date(5), "Buy milk").await.unwrap();
        store.delete_note(user, date(5)).await.unwrap();

        assert!(store.fetch_notes(user).await.unwrap().is_empty());

        // Deleting a missing note is not an error.
        store.delete_note(user, date(5)).await.unwrap();
    }
}
