//! Household directory repository.
//!
//! The directory maps a short join code to a household row. Only the
//! single household a device currently belongs to is ever cached locally;
//! everything else here is an uncached remote read.

use sqlx::{PgPool, Row};
use tracing::debug;

use larder_core::{Error, Household, Result};

/// PostgreSQL household directory.
#[derive(Clone)]
pub struct PgHouseholdDirectory {
    pool: PgPool,
}

impl PgHouseholdDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new household row.
    pub async fn insert(&self, household: &Household) -> Result<()> {
        sqlx::query("INSERT INTO households (id, name, code) VALUES ($1, $2, $3)")
            .bind(&household.id)
            .bind(&household.name)
            .bind(&household.code)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "store",
            component = "households",
            op = "insert",
            household_id = %household.id,
            "Household row inserted"
        );
        Ok(())
    }

    /// Resolve a join code to its household row, if any.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Household>> {
        let row = sqlx::query("SELECT id, name, code FROM households WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| Household {
            id: r.get("id"),
            name: r.get("name"),
            code: r.get("code"),
        }))
    }

    /// Current display name of a household, if the row still exists.
    pub async fn name(&self, id: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT name FROM households WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| r.get("name")))
    }

    /// Update a household's display name.
    pub async fn rename(&self, id: &str, name: &str) -> Result<()> {
        let result = sqlx::query("UPDATE households SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("household {id}")));
        }
        Ok(())
    }
}
