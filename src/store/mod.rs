//! The relational-store contract the planner depends on.
//!
//! The planner never talks to SQLite directly; it goes through
//! [`PlannerStore`], which models the remote store's surface: a filtered,
//! join-expanded select per collection, single-row insert, delete by exact
//! field match, and a note upsert keyed by (user, date).

#[cfg(test)]
mod memory;

#[cfg(test)]
pub use memory::MemoryStore;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::Recipe;

/// One meal-plan row, join-expanded with its recipe aggregate when the
/// row references one.
#[derive(Debug, Clone)]
pub struct PlanRow {
    pub id: i64,
    pub date: NaiveDate,
    pub custom_title: Option<String>,
    pub recipe: Option<Recipe>,
}

/// One daily-note row.
#[derive(Debug, Clone)]
pub struct NoteRow {
    pub date: NaiveDate,
    pub text: String,
}

/// Payload for inserting a plan row.
#[derive(Debug, Clone)]
pub enum NewPlanEntry {
    Recipe { recipe_id: i64 },
    Custom { title: String },
}

/// The exact field-set a plan-row delete must match, beyond (user, date).
#[derive(Debug, Clone, PartialEq)]
pub enum PlanMatch {
    Recipe { recipe_id: i64 },
    Custom { title: String },
}

#[derive(Debug)]
pub enum StoreError {
    /// Underlying database error.
    Database(sqlx::Error),
    /// JSON column could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// A stored value could not be interpreted (e.g. a malformed date).
    Corrupt(String),
    /// The store could not be reached.
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::Corrupt(msg) => write!(f, "Corrupt row: {}", msg),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

/// Storage surface consumed by the meal-plan store.
#[allow(async_fn_in_trait)]
pub trait PlannerStore {
    /// Fetches all plan rows for `user`, each join-expanded with its
    /// recipe aggregate, in insertion order.
    async fn fetch_plan_rows(&self, user: Uuid) -> Result<Vec<PlanRow>, StoreError>;

    /// Fetches all daily-note rows for `user`.
    async fn fetch_notes(&self, user: Uuid) -> Result<Vec<NoteRow>, StoreError>;

    /// Inserts a single plan row.
    async fn insert_plan_entry(
        &self,
        user: Uuid,
        date: NaiveDate,
        entry: NewPlanEntry,
    ) -> Result<(), StoreError>;

    /// Deletes every plan row matching (user, date) plus `target`.
    async fn delete_plan_entry(
        &self,
        user: Uuid,
        date: NaiveDate,
        target: PlanMatch,
    ) -> Result<(), StoreError>;

    /// Upserts the note for (user, date), replacing any existing row.
    async fn upsert_note(&self, user: Uuid, date: NaiveDate, text: &str)
        -> Result<(), StoreError>;

    /// Deletes the note for (user, date), if any.
    async fn delete_note(&self, user: Uuid, date: NaiveDate) -> Result<(), StoreError>;
}

impl<T: PlannerStore> PlannerStore for std::sync::Arc<T> {
    async fn fetch_plan_rows(&self, user: Uuid) -> Result<Vec<PlanRow>, StoreError> {
        (**self).fetch_plan_rows(user).await
    }

    async fn fetch_notes(&self, user: Uuid) -> Result<Vec<NoteRow>, StoreError> {
        (**self).fetch_notes(user).await
    }

    async fn insert_plan_entry(
        &self,
        user: Uuid,
        date: NaiveDate,
        entry: NewPlanEntry,
    ) -> Result<(), StoreError> {
        (**self).insert_plan_entry(user, date, entry).await
    }

    async fn delete_plan_entry(
        &self,
        user: Uuid,
        date: NaiveDate,
        target: PlanMatch,
    ) -> Result<(), StoreError> {
        (**self).delete_plan_entry(user, date, target).await
    }

    async fn upsert_note(
        &self,
        user: Uuid,
        date: NaiveDate,
        text: &str,
    ) -> Result<(), StoreError> {
        (**self).upsert_note(user, date, text).await
    }

    async fn delete_note(&self, user: Uuid, date: NaiveDate) -> Result<(), StoreError> {
        (**self).delete_note(user, date).await
    }
}
