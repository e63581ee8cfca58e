//! In-memory [`PlannerStore`] with failure injection.
//!
//! Backs the planner tests; recipes are seeded into a registry so fetches
//! can join plan rows with their aggregates the way the SQLite store does.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::{NewPlanEntry, NoteRow, PlanMatch, PlanRow, PlannerStore, StoreError};
use crate::models::Recipe;

#[derive(Debug, Clone)]
struct StoredRow {
    id: i64,
    user: Uuid,
    date: NaiveDate,
    custom_title: Option<String>,
    recipe_id: Option<i64>,
}

#[derive(Default)]
struct Inner {
    recipes: HashMap<i64, Recipe>,
    rows: Vec<StoredRow>,
    notes: HashMap<(Uuid, NaiveDate), String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    next_row_id: AtomicI64,
    fail_plan_fetches: AtomicBool,
    fail_note_fetches: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_row_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Seeds a recipe so plan rows referencing it can be join-expanded.
    pub fn add_recipe(&self, recipe: Recipe) {
        self.inner
            .lock()
            .unwrap()
            .recipes
            .insert(recipe.id, recipe);
    }

    pub fn fail_plan_fetches(&self, fail: bool) {
        self.fail_plan_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_note_fetches(&self, fail: bool) {
        self.fail_note_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    pub fn note_count(&self) -> usize {
        self.inner.lock().unwrap().notes.len()
    }

    pub fn note_for(&self, user: Uuid, date: NaiveDate) -> Option<String> {
        self.inner.lock().unwrap().notes.get(&(user, date)).cloned()
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

impl PlannerStore for MemoryStore {
    async fn fetch_plan_rows(&self, user: Uuid) -> Result<Vec<PlanRow>, StoreError> {
        if self.fail_plan_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected fetch failure".into()));
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .filter(|row| row.user == user)
            .map(|row| PlanRow {
                id: row.id,
                date: row.date,
                custom_title: row.custom_title.clone(),
                recipe: row
                    .recipe_id
                    .and_then(|id| inner.recipes.get(&id).cloned()),
            })
            .collect())
    }

    async fn fetch_notes(&self, user: Uuid) -> Result<Vec<NoteRow>, StoreError> {
        if self.fail_note_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected fetch failure".into()));
        }

        let inner = self.inner.lock().unwrap();
        let mut notes: Vec<NoteRow> = inner
            .notes
            .iter()
            .filter(|((u, _), _)| *u == user)
            .map(|((_, date), text)| NoteRow {
                date: *date,
                text: text.clone(),
            })
            .collect();
        notes.sort_by_key(|n| n.date);
        Ok(notes)
    }

    async fn insert_plan_entry(
        &self,
        user: Uuid,
        date: NaiveDate,
        entry: NewPlanEntry,
    ) -> Result<(), StoreError> {
        self.check_write()?;

        let id = self.next_row_id.fetch_add(1, Ordering::SeqCst);
        let (custom_title, recipe_id) = match entry {
            NewPlanEntry::Recipe { recipe_id } => (None, Some(recipe_id)),
            NewPlanEntry::Custom { title } => (Some(title), None),
        };

        self.inner.lock().unwrap().rows.push(StoredRow {
            id,
            user,
            date,
            custom_title,
            recipe_id,
        });
        Ok(())
    }

    async fn delete_plan_entry(
        &self,
        user: Uuid,
        date: NaiveDate,
        target: PlanMatch,
    ) -> Result<(), StoreError> {
        self.check_write()?;

        self.inner.lock().unwrap().rows.retain(|row| {
            if row.user != user || row.date != date {
                return true;
            }
            match &target {
                PlanMatch::Recipe { recipe_id } => row.recipe_id != Some(*recipe_id),
                PlanMatch::Custom { title } => row.custom_title.as_deref() != Some(title),
            }
        });
        Ok(())
    }

    async fn upsert_note(
        &self,
        user: Uuid,
        date: NaiveDate,
        text: &str,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner
            .lock()
            .unwrap()
            .notes
            .insert((user, date), text.to_string());
        Ok(())
    }

    async fn delete_note(&self, user: Uuid, date: NaiveDate) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.lock().unwrap().notes.remove(&(user, date));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_fetch_joins_recipe() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.add_recipe(Recipe::new("Pasta", "user1").with_id(7));

        store
            .insert_plan_entry(user, date(5), NewPlanEntry::Recipe { recipe_id: 7 })
            .await
            .unwrap();

        let rows = store.fetch_plan_rows(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].recipe.as_ref().unwrap().title, "Pasta");
        assert!(rows[0].custom_title.is_none());
    }

    #[tokio::test]
    async fn test_fetch_is_scoped_to_user() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store
            .insert_plan_entry(alice, date(5), NewPlanEntry::Custom { title: "Soup".into() })
            .await
            .unwrap();

        assert!(store.fetch_plan_rows(bob).await.unwrap().is_empty());
        assert_eq!(store.fetch_plan_rows(alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_matches_exact_fields() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store
            .insert_plan_entry(user, date(5), NewPlanEntry::Custom { title: "Soup".into() })
            .await
            .unwrap();
        store
            .insert_plan_entry(user, date(5), NewPlanEntry::Custom { title: "Stew".into() })
            .await
            .unwrap();

        store
            .delete_plan_entry(user, date(5), PlanMatch::Custom { title: "Soup".into() })
            .await
            .unwrap();

        let rows = store.fetch_plan_rows(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].custom_title.as_deref(), Some("Stew"));
    }

    #[tokio::test]
    async fn test_upsert_note_replaces() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store.upsert_note(user, date(5), "Buy milk").await.unwrap();
        store.upsert_note(user, date(5), "Buy eggs").await.unwrap();

        assert_eq!(store.note_count(), 1);
        assert_eq!(store.note_for(user, date(5)).as_deref(), Some("Buy eggs"));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store.fail_plan_fetches(true);
        assert!(store.fetch_plan_rows(user).await.is_err());

        store.fail_note_fetches(true);
        assert!(store.fetch_notes(user).await.is_err());

        store.fail_writes(true);
        assert!(store
            .upsert_note(user, date(5), "note")
            .await
            .is_err());
    }
}
