mod config_cmd;
mod plan;
mod recipe;
mod shopping;

pub use config_cmd::ConfigCommand;
pub use plan::PlanCommand;
pub use recipe::RecipeCommand;
pub use shopping::ShoppingCommand;

use chrono::NaiveDate;

/// Parses a YYYY-MM-DD argument.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))
}
