mod store;

pub use store::MealPlanStore;
