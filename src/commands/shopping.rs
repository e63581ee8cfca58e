use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use super::parse_date;
use crate::db::{CartRepository, SqliteStore};
use crate::models::{week_start_of, ManualItem};
use crate::planner::MealPlanStore;
use crate::session::Session;

#[derive(Args)]
pub struct ShoppingCommand {
    #[command(subcommand)]
    pub command: ShoppingSubcommand,

    /// Any date inside the target week (YYYY-MM-DD), defaults to today
    #[arg(long, global = true)]
    week: Option<String>,
}

#[derive(Subcommand)]
pub enum ShoppingSubcommand {
    /// Show the week's cart
    List,

    /// Check an item off
    Check { item: String },

    /// Uncheck an item
    Uncheck { item: String },

    /// Add a manual item to the cart
    Add {
        name: String,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        unit: Option<String>,
    },

    /// Remove a manual item from the cart
    Remove { name: String },
}

impl ShoppingCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        session: &Session,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let user = session
            .current_user()
            .ok_or("Not signed in; set user_name/user_id in config.")?;

        let week = week_start_of(self.anchor_date()?);
        let repo = CartRepository::new(pool.clone());
        let mut cart = repo.get_or_create(user.id, week).await?;

        match &self.command {
            ShoppingSubcommand::List => {
                let mut store =
                    MealPlanStore::new(SqliteStore::new(pool.clone()), session.subscribe());
                store.refresh().await;

                println!("Shopping for week of {}", week);
                let items = cart.items(store.meals());
                if items.is_empty() {
                    println!("  (cart is empty)");
                }
                for item in items {
                    println!("  {}", item);
                }
                Ok(())
            }

            ShoppingSubcommand::Check { item } => {
                cart.check(item);
                repo.save(user.id, &cart).await?;
                println!("Checked '{}'.", item);
                Ok(())
            }

            ShoppingSubcommand::Uncheck { item } => {
                cart.uncheck(item);
                repo.save(user.id, &cart).await?;
                println!("Unchecked '{}'.", item);
                Ok(())
            }

            ShoppingSubcommand::Add {
                name,
                quantity,
                unit,
            } => {
                let item = match (quantity, unit) {
                    (Some(qty), Some(unit)) => ManualItem::with_quantity(name, qty, unit),
                    (Some(qty), None) => ManualItem::with_quantity(name, qty, ""),
                    _ => ManualItem::new(name),
                };
                cart.add_manual_item(item);
                repo.save(user.id, &cart).await?;
                println!("Added '{}' to the cart.", name);
                Ok(())
            }

            ShoppingSubcommand::Remove { name } => {
                if cart.remove_manual_item(name) {
                    repo.save(user.id, &cart).await?;
                    println!("Removed '{}' from the cart.", name);
                } else {
                    println!("No manual item named '{}'.", name);
                }
                Ok(())
            }
        }
    }

    fn anchor_date(&self) -> Result<NaiveDate, String> {
        match &self.week {
            Some(d) => parse_date(d),
            None => Ok(Local::now().date_naive()),
        }
    }
}
