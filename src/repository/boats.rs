//! PostgreSQL boat store

use async_trait::async_trait;
use sqlx::{types::Json, Pool, Postgres};

use super::{BoatStore, BOATS_COUNTER};
use crate::{
    error::AppResult,
    models::boat::{Boat, BoatChanges, BoatRow, NewBoat},
};

#[derive(Clone)]
pub struct BoatsRepository {
    pool: Pool<Postgres>,
}

impl BoatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoatStore for BoatsRepository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Option<Boat>> {
        let row = sqlx::query_as::<_, BoatRow>("SELECT * FROM boats WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Boat::from))
    }

    async fn list(&self) -> AppResult<Vec<Boat>> {
        let rows = sqlx::query_as::<_, BoatRow>("SELECT * FROM boats ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Boat::from).collect())
    }

    async fn create(&self, boat: &NewBoat) -> AppResult<Boat> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the counter serializes concurrent creations
        let next_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, next_id) VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET next_id = counters.next_id + 1
            RETURNING next_id
            "#,
        )
        .bind(BOATS_COUNTER)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, BoatRow>(
            r#"
            INSERT INTO boats (id, name, purchase_price, description, images, equipment, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(next_id.to_string())
        .bind(&boat.name)
        .bind(boat.purchase_price)
        .bind(&boat.description)
        .bind(&boat.images)
        .bind(Json(&boat.equipment))
        .bind(&boat.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Assigned boat id {}", next_id);
        Ok(row.into())
    }

    async fn insert_with_id(&self, id: &str, boat: &NewBoat) -> AppResult<Option<Boat>> {
        let mut tx = self.pool.begin().await?;

        if let Ok(numeric) = id.parse::<i64>() {
            sqlx::query(
                r#"
                INSERT INTO counters (name, next_id) VALUES ($1, $2)
                ON CONFLICT (name) DO UPDATE SET next_id = GREATEST(counters.next_id, $2)
                "#,
            )
            .bind(BOATS_COUNTER)
            .bind(numeric)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, BoatRow>(
            r#"
            INSERT INTO boats (id, name, purchase_price, description, images, equipment, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&boat.name)
        .bind(boat.purchase_price)
        .bind(&boat.description)
        .bind(&boat.images)
        .bind(Json(&boat.equipment))
        .bind(&boat.owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.map(Boat::from))
    }

    async fn update(&self, id: &str, changes: &BoatChanges) -> AppResult<Option<Boat>> {
        let row = sqlx::query_as::<_, BoatRow>(
            r#"
            UPDATE boats SET
                name = $2,
                purchase_price = $3,
                description = $4,
                images = $5,
                equipment = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.purchase_price)
        .bind(&changes.description)
        .bind(&changes.images)
        .bind(Json(&changes.equipment))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Boat::from))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM boats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
