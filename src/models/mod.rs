mod ingredient;
mod planned_meal;
mod recipe;
mod shopping_cart;

pub use ingredient::Ingredient;
pub use planned_meal::{MealSource, PlannedMeal};
pub use recipe::Recipe;
pub use shopping_cart::{week_start_of, ManualItem, ShoppingCart, ShoppingItem};
