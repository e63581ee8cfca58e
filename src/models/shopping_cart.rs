//! Weekly shopping cart.
//!
//! A cart aggregates ingredients from the week's recipe-backed planned
//! meals and lets manual items be added. Items can be checked off as
//! they are purchased. Only manual items and the checked set are stored;
//! the aggregated list is recomputed from the meal plan.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::planned_meal::PlannedMeal;

/// Returns the Monday of the week containing `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// A manual item added to the cart (not from a recipe).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualItem {
    pub name: String,
    /// Optional quantity (as string to allow "2" or "a few")
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

impl ManualItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            unit: None,
        }
    }

    pub fn with_quantity(
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        let qty = quantity.into();
        let u = unit.into();
        Self {
            name: name.into(),
            quantity: if qty.is_empty() { None } else { Some(qty) },
            unit: if u.is_empty() { None } else { Some(u) },
        }
    }
}

impl fmt::Display for ManualItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.quantity, &self.unit) {
            (Some(qty), Some(unit)) => write!(f, "{} {} {}", qty, unit, self.name),
            (Some(qty), None) => write!(f, "{} {}", qty, self.name),
            (None, Some(unit)) => write!(f, "{} ({})", self.name, unit),
            (None, None) => write!(f, "{}", self.name),
        }
    }
}

/// A shopping cart for the week starting at `week` (a Monday).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingCart {
    pub week: NaiveDate,
    /// Names of items that have been checked off (case-normalized).
    pub checked: Vec<String>,
    pub manual_items: Vec<ManualItem>,
}

impl ShoppingCart {
    pub fn new(week: NaiveDate) -> Self {
        Self {
            week,
            checked: Vec::new(),
            manual_items: Vec::new(),
        }
    }

    /// Whether an item is checked (case-insensitive).
    pub fn is_checked(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        self.checked.iter().any(|c| c.to_lowercase() == name_lower)
    }

    pub fn check(&mut self, name: &str) {
        let name_lower = name.to_lowercase();
        if !self.is_checked(&name_lower) {
            self.checked.push(name_lower);
        }
    }

    pub fn uncheck(&mut self, name: &str) {
        let name_lower = name.to_lowercase();
        self.checked.retain(|c| c.to_lowercase() != name_lower);
    }

    /// Adds a manual item, ignoring case-insensitive duplicates.
    pub fn add_manual_item(&mut self, item: ManualItem) {
        let name_lower = item.name.to_lowercase();
        if !self
            .manual_items
            .iter()
            .any(|i| i.name.to_lowercase() == name_lower)
        {
            self.manual_items.push(item);
        }
    }

    /// Removes a manual item by name (case-insensitive).
    /// Returns true if an item was removed.
    pub fn remove_manual_item(&mut self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        let len_before = self.manual_items.len();
        self.manual_items
            .retain(|i| i.name.to_lowercase() != name_lower);
        self.manual_items.len() != len_before
    }

    /// Builds the display list for this cart's week: ingredients aggregated
    /// from recipe-backed meals (summed per name + unit, case-insensitive),
    /// followed by manual items.
    pub fn items(&self, meals: &BTreeMap<NaiveDate, Vec<PlannedMeal>>) -> Vec<ShoppingItem> {
        let week_end = self.week + Duration::days(7);
        let mut items: Vec<ShoppingItem> = Vec::new();

        for (_, day_meals) in meals.range(self.week..week_end) {
            for meal in day_meals {
                let Some(recipe) = meal.recipe() else {
                    continue;
                };
                for ingredient in &recipe.ingredients {
                    let name_lower = ingredient.name.to_lowercase();
                    match items.iter_mut().find(|i| {
                        !i.is_manual && i.name.to_lowercase() == name_lower && i.unit == ingredient.unit
                    }) {
                        Some(existing) => existing.quantity += ingredient.amount,
                        None => items.push(ShoppingItem {
                            name: ingredient.name.clone(),
                            quantity: ingredient.amount,
                            unit: ingredient.unit.clone(),
                            checked: self.is_checked(&ingredient.name),
                            is_manual: false,
                        }),
                    }
                }
            }
        }

        for item in &self.manual_items {
            items.push(ShoppingItem {
                name: item.name.clone(),
                quantity: item
                    .quantity
                    .as_ref()
                    .and_then(|q| q.parse::<f64>().ok())
                    .unwrap_or(1.0),
                unit: item.unit.clone().unwrap_or_default(),
                checked: self.is_checked(&item.name),
                is_manual: true,
            });
        }

        items
    }
}

/// A shopping item for display (ingredient or manual item plus checked status).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    /// Quantity, possibly aggregated from multiple recipes.
    pub quantity: f64,
    pub unit: String,
    pub checked: bool,
    pub is_manual: bool,
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = if self.checked { "[x]" } else { "[ ]" };
        if self.unit.is_empty() {
            write!(f, "{} {:<20} {}", check, self.name, self.quantity)
        } else {
            write!(
                f,
                "{} {:<20} {} {}",
                check, self.name, self.quantity, self.unit
            )
        }
    }
}
