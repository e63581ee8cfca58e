use chrono::{Duration, Local};
use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use super::parse_date;
use super::recipe::resolve_recipe;
use crate::db::{RecipeRepository, SqliteStore};
use crate::planner::MealPlanStore;
use crate::session::Session;

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Show planned meals and notes for a week
    Week {
        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<String>,
    },

    /// Add a recipe (by id or title) to a date
    Add {
        recipe: String,
        /// Date (YYYY-MM-DD)
        date: String,
    },

    /// Add a free-text meal to a date
    AddCustom {
        title: String,
        /// Date (YYYY-MM-DD)
        date: String,
    },

    /// Remove the entry at INDEX within a date's list
    Remove {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Zero-based position shown by `plan week`
        index: usize,
    },

    /// Set the note for a date; omit TEXT to clear it
    Note {
        /// Date (YYYY-MM-DD)
        date: String,
        text: Option<String>,
    },
}

impl PlanCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        session: &Session,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut store = MealPlanStore::new(SqliteStore::new(pool.clone()), session.subscribe());
        store.refresh().await;

        match &self.command {
            PlanSubcommand::Week { from } => {
                let start = match from {
                    Some(d) => parse_date(d)?,
                    None => Local::now().date_naive(),
                };

                for offset in 0..7 {
                    let date = start + Duration::days(offset);
                    println!("{}", date.format("%a %Y-%m-%d"));

                    let entries = store.meals_on(date);
                    if entries.is_empty() {
                        println!("  (nothing planned)");
                    }
                    for (index, meal) in entries.iter().enumerate() {
                        println!("  [{}] {}", index, meal);
                    }
                    if let Some(note) = store.note_on(date) {
                        println!("  note: {}", note);
                    }
                }
                Ok(())
            }

            PlanSubcommand::Add { recipe, date } => {
                let date = parse_date(date)?;
                let repo = RecipeRepository::new(pool.clone());
                let found = resolve_recipe(&repo, recipe)
                    .await?
                    .ok_or_else(|| format!("Recipe not found: {}", recipe))?;

                let title = found.title.clone();
                store.add_recipe_to_date(found, date).await;
                println!("Planned '{}' on {}.", title, date);
                Ok(())
            }

            PlanSubcommand::AddCustom { title, date } => {
                let date = parse_date(date)?;
                store.add_custom_meal_to_date(title, date).await;
                println!("Planned '{}' on {}.", title, date);
                Ok(())
            }

            PlanSubcommand::Remove { date, index } => {
                let date = parse_date(date)?;
                let before = store.meals_on(date).len();
                store.remove_meal_from_date(date, *index).await;

                if store.meals_on(date).len() < before {
                    println!("Removed entry {} on {}.", index, date);
                } else {
                    println!("Nothing removed on {} (index {}).", date, index);
                }
                Ok(())
            }

            PlanSubcommand::Note { date, text } => {
                let date = parse_date(date)?;
                let text = text.as_deref().unwrap_or("");
                store.save_daily_note(date, text).await;

                match store.note_on(date) {
                    Some(saved) => println!("Note for {}: {}", date, saved),
                    None => println!("Cleared note for {}.", date),
                }
                Ok(())
            }
        }
    }
}
