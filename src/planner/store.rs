//! Optimistic in-memory projection of a user's planned meals and notes.
//!
//! The store keeps two date-keyed maps and funnels every change through a
//! small set of mutators: each applies to local state first, then issues a
//! single best-effort write to the backing store. Writes are not retried
//! and never rolled back; a failed write only leaves a log line, and the
//! projection re-converges on the next full refresh. Overlapping refreshes
//! are last-writer-wins (no generation guard).

use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::{MealSource, PlannedMeal, Recipe};
use crate::session::User;
use crate::store::{NewPlanEntry, PlanMatch, PlanRow, PlannerStore};

pub struct MealPlanStore<S> {
    store: S,
    session: watch::Receiver<Option<User>>,
    meals: BTreeMap<NaiveDate, Vec<PlannedMeal>>,
    notes: BTreeMap<NaiveDate, String>,
    loading: bool,
}

impl<S: PlannerStore> MealPlanStore<S> {
    /// Creates an empty projection. Call [`refresh`](Self::refresh) to
    /// populate it; the session receiver should come from
    /// [`Session::subscribe`](crate::session::Session::subscribe).
    pub fn new(store: S, session: watch::Receiver<Option<User>>) -> Self {
        Self {
            store,
            session,
            meals: BTreeMap::new(),
            notes: BTreeMap::new(),
            loading: true,
        }
    }

    /// Planned meals grouped by date. Dates with no entries are absent.
    pub fn meals(&self) -> &BTreeMap<NaiveDate, Vec<PlannedMeal>> {
        &self.meals
    }

    /// Daily notes by date.
    pub fn notes(&self) -> &BTreeMap<NaiveDate, String> {
        &self.notes
    }

    pub fn meals_on(&self, date: NaiveDate) -> &[PlannedMeal] {
        self.meals.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn note_on(&self, date: NaiveDate) -> Option<&str> {
        self.notes.get(&date).map(String::as_str)
    }

    /// True while a refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn current_user(&self) -> Option<User> {
        self.session.borrow().clone()
    }

    /// Rebuilds both maps from the store, fully replacing prior state.
    ///
    /// Anonymous sessions end up with empty maps. The two fetches run
    /// concurrently and fail independently: an error on one side keeps
    /// that map at its previous value while the other still updates. The
    /// loading flag clears once both fetches settle.
    pub async fn refresh(&mut self) {
        self.loading = true;

        let Some(user) = self.current_user() else {
            self.meals.clear();
            self.notes.clear();
            self.loading = false;
            return;
        };

        let (plans, notes) = futures::join!(
            self.store.fetch_plan_rows(user.id),
            self.store.fetch_notes(user.id)
        );

        match plans {
            Ok(rows) => self.meals = group_by_date(rows),
            Err(e) => warn!(error = %e, "meal plan fetch failed, keeping previous entries"),
        }
        match notes {
            Ok(rows) => {
                self.notes = rows.into_iter().map(|row| (row.date, row.text)).collect();
            }
            Err(e) => warn!(error = %e, "daily note fetch failed, keeping previous notes"),
        }

        self.loading = false;
    }

    /// Waits for the next sign-in/sign-out transition, then refreshes.
    /// Returns false once the session has been torn down.
    pub async fn watch_session(&mut self) -> bool {
        if self.session.changed().await.is_err() {
            return false;
        }
        self.refresh().await;
        true
    }

    /// Appends a recipe-backed entry to `date` and inserts it remotely.
    /// No-ops when anonymous.
    pub async fn add_recipe_to_date(&mut self, recipe: Recipe, date: NaiveDate) {
        let Some(user) = self.current_user() else {
            return;
        };

        let recipe_id = recipe.id;
        self.meals
            .entry(date)
            .or_default()
            .push(PlannedMeal::from_recipe(recipe));

        if let Err(e) = self
            .store
            .insert_plan_entry(user.id, date, NewPlanEntry::Recipe { recipe_id })
            .await
        {
            warn!(error = %e, %date, recipe_id, "failed to persist planned recipe");
        }
    }

    /// Appends a custom (free-text) entry to `date` and inserts it
    /// remotely. The local id is a timestamp placeholder, distinct only
    /// among entries created in this session. No-ops when anonymous.
    pub async fn add_custom_meal_to_date(&mut self, title: &str, date: NaiveDate) {
        let Some(user) = self.current_user() else {
            return;
        };

        let id = Utc::now().timestamp_millis();
        self.meals
            .entry(date)
            .or_default()
            .push(PlannedMeal::custom(id, title));

        if let Err(e) = self
            .store
            .insert_plan_entry(
                user.id,
                date,
                NewPlanEntry::Custom {
                    title: title.to_string(),
                },
            )
            .await
        {
            warn!(error = %e, %date, "failed to persist custom meal");
        }
    }

    /// Removes the entry at `index` within `date`'s current sequence and
    /// deletes the matching row remotely. The entry is read before the
    /// splice, since the splice reindexes the sequence. Out-of-range
    /// indexes no-op.
    pub async fn remove_meal_from_date(&mut self, date: NaiveDate, index: usize) {
        let Some(user) = self.current_user() else {
            return;
        };

        let Some(entries) = self.meals.get_mut(&date) else {
            warn!(%date, "no planned meals on date, nothing to remove");
            return;
        };
        if index >= entries.len() {
            warn!(%date, index, len = entries.len(), "remove index out of range");
            return;
        }

        let removed = entries.remove(index);
        if entries.is_empty() {
            self.meals.remove(&date);
        }

        let target = match removed.source {
            MealSource::Custom => PlanMatch::Custom {
                title: removed.title,
            },
            MealSource::Recipe(recipe) => PlanMatch::Recipe {
                recipe_id: recipe.id,
            },
        };

        if let Err(e) = self.store.delete_plan_entry(user.id, date, target).await {
            warn!(error = %e, %date, "failed to delete planned meal");
        }
    }

    /// Saves the trimmed note for `date`. A whitespace-only note means
    /// "no note": the key is removed locally and the row deleted
    /// remotely. No-ops when anonymous.
    pub async fn save_daily_note(&mut self, date: NaiveDate, text: &str) {
        let Some(user) = self.current_user() else {
            return;
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.notes.remove(&date);
            if let Err(e) = self.store.delete_note(user.id, date).await {
                warn!(error = %e, %date, "failed to delete daily note");
            }
        } else {
            self.notes.insert(date, trimmed.to_string());
            if let Err(e) = self.store.upsert_note(user.id, date, trimmed).await {
                warn!(error = %e, %date, "failed to save daily note");
            }
        }
    }
}

/// Groups fetched rows by date, in return order. A row with a custom
/// title becomes a custom entry; otherwise the joined recipe is embedded.
/// Rows with neither are skipped.
fn group_by_date(rows: Vec<PlanRow>) -> BTreeMap<NaiveDate, Vec<PlannedMeal>> {
    let mut meals: BTreeMap<NaiveDate, Vec<PlannedMeal>> = BTreeMap::new();
    for row in rows {
        let meal = if let Some(title) = row.custom_title {
            PlannedMeal::custom(row.id, title)
        } else if let Some(recipe) = row.recipe {
            PlannedMeal::from_recipe(recipe)
        } else {
            debug!(row_id = row.id, "plan row has no title and no recipe, skipping");
            continue;
        };
        meals.entry(row.date).or_default().push(meal);
    }
    meals
}
