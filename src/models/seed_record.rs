//! # Seed Record Model
//!
//! A persisted [`Record`](super::Record): one row per record, with an id and
//! creation timestamp assigned by the store.
//!
//! ## Database Schema
//!
//! Maps to the `seed_records` table:
//! ```sql
//! CREATE TABLE seed_records (
//!   id BIGSERIAL PRIMARY KEY,
//!   label TEXT NOT NULL,
//!   sequence_index BIGINT NOT NULL,
//!   created_at TIMESTAMP NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! `sequence_index` is indexed but not unique; uniqueness within a run comes
//! from planning, not from the table.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SeedRecord {
    pub id: i64,
    pub label: String,
    pub sequence_index: i64,
    pub created_at: NaiveDateTime,
}

/// Single row for creation outside of a batch load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSeedRecord {
    pub label: String,
    pub sequence_index: i64,
}

impl SeedRecord {
    /// Insert one row and return it with its assigned id
    pub async fn create(pool: &PgPool, new_record: NewSeedRecord) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO seed_records (label, sequence_index)
            VALUES ($1, $2)
            RETURNING id, label, sequence_index, created_at
            "#,
        )
        .bind(new_record.label)
        .bind(new_record.sequence_index)
        .fetch_one(pool)
        .await
    }

    /// First row (lowest id) carrying `sequence_index`
    pub async fn find_by_sequence_index(
        pool: &PgPool,
        sequence_index: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, label, sequence_index, created_at
            FROM seed_records
            WHERE sequence_index = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(sequence_index)
        .fetch_optional(pool)
        .await
    }

    /// Rows with `start <= sequence_index < end`, in index order
    pub async fn list_range(pool: &PgPool, start: i64, end: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, label, sequence_index, created_at
            FROM seed_records
            WHERE sequence_index >= $1 AND sequence_index < $2
            ORDER BY sequence_index, id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM seed_records")
            .fetch_one(pool)
            .await
    }
}
