//! Recipe row repository.
//!
//! Each row carries the full recipe record in its `data` column; `title`
//! is duplicated as a plain column only so the directory stays greppable
//! from SQL. Row identity is the client-generated recipe id.

use std::collections::HashSet;

use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};
use tracing::trace;

use larder_core::{Error, Recipe, Result};

/// PostgreSQL recipe store.
#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Raw `data` payloads of every recipe row in the household.
    pub async fn fetch_for_household(&self, household_id: &str) -> Result<Vec<JsonValue>> {
        let rows = sqlx::query("SELECT data FROM recipes WHERE household_id = $1")
            .bind(household_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|r| r.get("data")).collect())
    }

    /// Identities currently present remotely for the household.
    pub async fn ids_for_household(&self, household_id: &str) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT id FROM recipes WHERE household_id = $1")
            .bind(household_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|r| r.get("id")).collect())
    }

    /// Insert-or-replace each recipe row. A full-value replace per row;
    /// each row commit is independent, nothing spans the batch.
    pub async fn upsert(&self, household_id: &str, recipes: &[Recipe]) -> Result<()> {
        for recipe in recipes {
            let data = serde_json::to_value(recipe)?;
            sqlx::query(
                "INSERT INTO recipes (id, household_id, title, data)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (id) DO UPDATE SET
                     household_id = EXCLUDED.household_id,
                     title = EXCLUDED.title,
                     data = EXCLUDED.data",
            )
            .bind(&recipe.id)
            .bind(household_id)
            .bind(&recipe.title)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

            trace!(
                subsystem = "store",
                component = "recipes",
                op = "upsert",
                household_id,
                id = %recipe.id,
                "Recipe row upserted"
            );
        }
        Ok(())
    }

    /// Physically delete the given rows from the household.
    pub async fn delete(&self, household_id: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM recipes WHERE household_id = $1 AND id = ANY($2)")
            .bind(household_id)
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
