//! Plan row repository.
//!
//! Plan items are small enough to live as plain columns; unlike recipes
//! there is no free-form payload. A dangling `recipe_id` (recipe deleted
//! while still planned) is a valid row, not corruption.

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use larder_core::{Error, MealPlanItem, Result};

/// PostgreSQL meal-plan store.
#[derive(Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every plan row in the household.
    pub async fn fetch_for_household(&self, household_id: &str) -> Result<Vec<MealPlanItem>> {
        let rows = sqlx::query(
            "SELECT id, date, type, recipe_id FROM plans WHERE household_id = $1",
        )
        .bind(household_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                let slot: String = r.get("type");
                Ok(MealPlanItem {
                    id: r.get("id"),
                    date: r.get::<NaiveDate, _>("date"),
                    slot: slot.parse()?,
                    recipe_id: r.get("recipe_id"),
                })
            })
            .collect()
    }

    /// Identities currently present remotely for the household.
    pub async fn ids_for_household(&self, household_id: &str) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT id FROM plans WHERE household_id = $1")
            .bind(household_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|r| r.get("id")).collect())
    }

    /// Insert-or-replace each plan row.
    pub async fn upsert(&self, household_id: &str, items: &[MealPlanItem]) -> Result<()> {
        for item in items {
            sqlx::query(
                "INSERT INTO plans (id, household_id, date, type, recipe_id)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO UPDATE SET
                     household_id = EXCLUDED.household_id,
                     date = EXCLUDED.date,
                     type = EXCLUDED.type,
                     recipe_id = EXCLUDED.recipe_id",
            )
            .bind(&item.id)
            .bind(household_id)
            .bind(item.date)
            .bind(item.slot.as_str())
            .bind(&item.recipe_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        }
        Ok(())
    }

    /// Physically delete the given rows from the household.
    pub async fn delete(&self, household_id: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM plans WHERE household_id = $1 AND id = ANY($2)")
            .bind(household_id)
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
