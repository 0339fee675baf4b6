//! PostgreSQL Transfer Store
//!
//! sqlx-backed implementation of [`TransferStore`]. Status updates use an
//! atomic CAS on the version column; inserts rely on the primary-key
//! constraint to report duplicate creates as conflicts.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE transfers_tb (
//!     id              TEXT PRIMARY KEY,
//!     from_account_id TEXT        NOT NULL,
//!     to_account_id   TEXT        NOT NULL,
//!     amount          NUMERIC     NOT NULL,
//!     status          TEXT        NOT NULL,
//!     version         BIGINT      NOT NULL DEFAULT 0,
//!     created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::error::TransferError;
use super::store::{InsertOutcome, TransferStore};
use super::types::{TransferId, TransferRecord, TransferStatus};

/// PostgreSQL-backed transfer repository
pub struct PgTransferStore {
    pool: PgPool,
}

impl PgTransferStore {
    /// Create a new store on the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> TransferRecord {
        let status: String = row.get("status");
        TransferRecord {
            id: TransferId::from_string(row.get("id")),
            from_account_id: row.get("from_account_id"),
            to_account_id: row.get("to_account_id"),
            amount: row.get("amount"),
            status: TransferStatus::parse(&status),
            version: row.get("version"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }
    }
}

#[async_trait]
impl TransferStore for PgTransferStore {
    async fn find_by_id(&self, id: &TransferId) -> Result<Option<TransferRecord>, TransferError> {
        let row = sqlx::query(
            r#"
            SELECT id, from_account_id, to_account_id, amount, status, version, created_at
            FROM transfers_tb
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    async fn insert(&self, record: &TransferRecord) -> Result<InsertOutcome, TransferError> {
        let result = sqlx::query(
            r#"
            INSERT INTO transfers_tb
                (id, from_account_id, to_account_id, amount, status, version, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.from_account_id)
        .bind(&record.to_account_id)
        .bind(record.amount)
        .bind(record.status.as_str())
        .bind(record.version)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::Conflict)
        }
    }

    async fn update_status(
        &self,
        id: &TransferId,
        expected_version: i64,
        status: &TransferStatus,
    ) -> Result<bool, TransferError> {
        let result = sqlx::query(
            r#"
            UPDATE transfers_tb
            SET status = $1, version = version + 1
            WHERE id = $2 AND version = $3
            "#,
        )
        .bind(status.as_str())
        .bind(id.as_str())
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, TransferError> {
        let result = sqlx::query("DELETE FROM transfers_tb WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
