//! SQLite-backed ledger store
//!
//! Schema is created lazily on first use, guarded by a OnceCell so
//! concurrent units of work race on initialization at most once.

use crate::clock::Clock;
use crate::error::AssistantError;
use crate::ledger::LedgerStore;
use crate::models::{NewTransaction, Transaction, TransactionKind};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tokio::sync::OnceCell;

pub struct SqliteLedger {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    schema_ready: OnceCell<()>,
}

impl SqliteLedger {
    /// Connect lazily to the given SQLite URL.
    pub fn connect(database_url: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)
            .map_err(|e| {
                AssistantError::Persistence(format!("failed to open ledger database: {}", e))
            })?;

        Ok(Self::new(pool, clock))
    }

    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            clock,
            schema_ready: OnceCell::new(),
        }
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS transactions (
                      id INTEGER PRIMARY KEY AUTOINCREMENT,
                      user_id INTEGER NOT NULL,
                      user_name TEXT NOT NULL,
                      kind TEXT NOT NULL,
                      amount REAL NOT NULL,
                      description TEXT NOT NULL,
                      created_at TEXT NOT NULL
                    );
                    "#,
                )
                .execute(&self.pool)
                .await?;

                sqlx::query(
                    r#"
                    CREATE INDEX IF NOT EXISTS idx_transactions_user_time
                    ON transactions (user_id, created_at);
                    "#,
                )
                .execute(&self.pool)
                .await?;

                Ok::<(), sqlx::Error>(())
            })
            .await
            .map_err(|e| {
                AssistantError::Persistence(format!("failed to initialize ledger schema: {}", e))
            })?;

        Ok(())
    }

    /// First instant of the month and of the next month, the
    /// half-open window used by `query_month`.
    fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                AssistantError::Persistence(format!("invalid month: {}-{}", year, month))
            })?;

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                AssistantError::Persistence(format!("invalid month: {}-{}", next_year, next_month))
            })?;

        Ok((start, end))
    }
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn append(
        &self,
        user_id: i64,
        user_name: &str,
        transaction: &NewTransaction,
    ) -> Result<Transaction> {
        self.ensure_schema().await?;

        let created_at = self.clock.now();

        let result = sqlx::query(
            r#"
            INSERT INTO transactions (user_id, user_name, kind, amount, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_id)
        .bind(user_name)
        .bind(transaction.kind.as_str())
        .bind(transaction.amount)
        .bind(&transaction.description)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AssistantError::Persistence(format!("failed to append transaction: {}", e)))?;

        Ok(Transaction {
            id: result.last_insert_rowid(),
            user_id,
            user_name: user_name.to_string(),
            kind: transaction.kind,
            amount: transaction.amount,
            description: transaction.description.clone(),
            created_at,
        })
    }

    async fn query_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<(TransactionKind, f64)>> {
        self.ensure_schema().await?;

        let (start, end) = Self::month_bounds(year, month)?;

        let rows = sqlx::query(
            r#"
            SELECT kind, amount
            FROM transactions
            WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AssistantError::Persistence(format!("failed to query month: {}", e)))?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let kind_str: String = row
                .try_get("kind")
                .map_err(|e| AssistantError::Persistence(format!("malformed ledger row: {}", e)))?;
            let kind = TransactionKind::parse(&kind_str).ok_or_else(|| {
                AssistantError::Persistence(format!("unknown kind in ledger: {}", kind_str))
            })?;
            let amount: f64 = row
                .try_get("amount")
                .map_err(|e| AssistantError::Persistence(format!("malformed ledger row: {}", e)))?;

            result.push((kind, amount));
        }

        Ok(result)
    }

    async fn delete_all(&self, user_id: i64) -> Result<u64> {
        self.ensure_schema().await?;

        let result = sqlx::query("DELETE FROM transactions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AssistantError::Persistence(format!("failed to clear history: {}", e)))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn clock_at(year: i32, month: u32, day: u32) -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
        ))
    }

    async fn memory_ledger(clock: Arc<dyn Clock>) -> SqliteLedger {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteLedger::new(pool, clock)
    }

    fn income(amount: f64, description: &str) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Income,
            amount,
            description: description.to_string(),
        }
    }

    #[test]
    fn month_bounds_cover_the_calendar_month() {
        let (start, end) = SqliteLedger::month_bounds(2024, 3).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-04-01T00:00:00+00:00");
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let (start, end) = SqliteLedger::month_bounds(2024, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn month_bounds_reject_invalid_month() {
        assert!(SqliteLedger::month_bounds(2024, 13).is_err());
    }

    #[tokio::test]
    async fn append_then_query_round_trips() {
        let ledger = memory_ledger(clock_at(2024, 3, 15)).await;

        let tx = ledger.append(7, "Ana", &income(1500.0, "salary")).await.unwrap();
        assert_eq!(tx.user_id, 7);
        assert_eq!(tx.kind, TransactionKind::Income);

        let rows = ledger.query_month(7, 2024, 3).await.unwrap();
        assert_eq!(rows, vec![(TransactionKind::Income, 1500.0)]);
    }

    #[tokio::test]
    async fn query_month_excludes_other_months_and_users() {
        let ledger = memory_ledger(clock_at(2024, 3, 15)).await;
        ledger.append(7, "Ana", &income(100.0, "a")).await.unwrap();
        ledger.append(8, "Bia", &income(200.0, "b")).await.unwrap();

        assert!(ledger.query_month(7, 2024, 2).await.unwrap().is_empty());
        assert_eq!(ledger.query_month(7, 2024, 3).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_all_returns_removed_count() {
        let ledger = memory_ledger(clock_at(2024, 3, 15)).await;
        ledger.append(7, "Ana", &income(100.0, "a")).await.unwrap();
        ledger.append(7, "Ana", &income(200.0, "b")).await.unwrap();

        assert_eq!(ledger.delete_all(7).await.unwrap(), 2);
        assert_eq!(ledger.delete_all(7).await.unwrap(), 0);
    }
}
