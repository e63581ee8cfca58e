use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{ManualItem, ShoppingCart};

pub struct CartRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CartRow {
    checked: String,
    manual_items: String,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(
        &self,
        user: Uuid,
        week: NaiveDate,
    ) -> Result<Option<ShoppingCart>, sqlx::Error> {
        let row: Option<CartRow> = sqlx::query_as(
            "SELECT checked, manual_items FROM carts WHERE user_id = ? AND week = ?",
        )
        .bind(user.to_string())
        .bind(week.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let checked: Vec<String> = serde_json::from_str(&row.checked).unwrap_or_default();
            let manual_items: Vec<ManualItem> =
                serde_json::from_str(&row.manual_items).unwrap_or_default();
            ShoppingCart {
                week,
                checked,
                manual_items,
            }
        }))
    }

    pub async fn get_or_create(
        &self,
        user: Uuid,
        week: NaiveDate,
    ) -> Result<ShoppingCart, sqlx::Error> {
        Ok(self
            .get(user, week)
            .await?
            .unwrap_or_else(|| ShoppingCart::new(week)))
    }

    /// Persists the cart, replacing any existing row for (user, week).
    pub async fn save(&self, user: Uuid, cart: &ShoppingCart) -> Result<(), sqlx::Error> {
        let checked = serde_json::to_string(&cart.checked).unwrap_or_else(|_| "[]".to_string());
        let manual_items =
            serde_json::to_string(&cart.manual_items).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, week, checked, manual_items)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, week) DO UPDATE SET
                checked = excluded.checked,
                manual_items = excluded.manual_items
            "#,
        )
        .bind(user.to_string())
        .bind(cart.week.to_string())
        .bind(&checked)
        .bind(&manual_items)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
