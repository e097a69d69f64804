//! Ledger store boundary
//!
//! Durable per-user append-only transaction log. The core only
//! depends on the three operations below; per-call atomicity is
//! assumed and no cross-call isolation is required.

pub mod sqlite;

use crate::clock::Clock;
use crate::models::{NewTransaction, Transaction, TransactionKind};
use crate::Result;
use async_trait::async_trait;
use chrono::Datelike;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub use sqlite::SqliteLedger;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append one transaction. Never partially writes; the timestamp
    /// is assigned here, at append time.
    async fn append(
        &self,
        user_id: i64,
        user_name: &str,
        transaction: &NewTransaction,
    ) -> Result<Transaction>;

    /// All of the user's (kind, amount) pairs within the calendar
    /// month. Empty when none; ordering is not significant.
    async fn query_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<(TransactionKind, f64)>>;

    /// Irreversibly delete the user's history. Returns the number of
    /// rows removed, 0 when none existed.
    async fn delete_all(&self, user_id: i64) -> Result<u64>;
}

/// In-memory ledger for tests and development.
pub struct InMemoryLedger {
    clock: Arc<dyn Clock>,
    next_id: AtomicI64,
    rows: Arc<RwLock<HashMap<i64, Vec<Transaction>>>>,
}

impl InMemoryLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: AtomicI64::new(1),
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn append(
        &self,
        user_id: i64,
        user_name: &str,
        transaction: &NewTransaction,
    ) -> Result<Transaction> {
        let row = Transaction {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            user_name: user_name.to_string(),
            kind: transaction.kind,
            amount: transaction.amount,
            description: transaction.description.clone(),
            created_at: self.clock.now(),
        };

        let mut rows = self.rows.write().await;
        rows.entry(user_id).or_default().push(row.clone());

        Ok(row)
    }

    async fn query_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<(TransactionKind, f64)>> {
        let rows = self.rows.read().await;

        Ok(rows
            .get(&user_id)
            .map(|txs| {
                txs.iter()
                    .filter(|tx| tx.created_at.year() == year && tx.created_at.month() == month)
                    .map(|tx| (tx.kind, tx.amount))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_all(&self, user_id: i64) -> Result<u64> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(&user_id).map(|txs| txs.len() as u64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn ledger_at(year: i32, month: u32, day: u32) -> InMemoryLedger {
        let instant = Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap();
        InMemoryLedger::new(Arc::new(FixedClock(instant)))
    }

    fn expense(amount: f64, description: &str) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Expense,
            amount,
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn append_assigns_id_and_timestamp() {
        let ledger = ledger_at(2024, 3, 15);
        let tx = ledger.append(7, "Ana", &expense(55.90, "market")).await.unwrap();

        assert_eq!(tx.user_id, 7);
        assert_eq!(tx.user_name, "Ana");
        assert_eq!(tx.created_at.year(), 2024);
        assert_eq!(tx.created_at.month(), 3);
    }

    #[tokio::test]
    async fn query_month_windows_by_calendar_month() {
        let ledger = ledger_at(2024, 3, 15);
        ledger.append(7, "Ana", &expense(10.0, "a")).await.unwrap();
        ledger.append(7, "Ana", &expense(20.0, "b")).await.unwrap();

        let march = ledger.query_month(7, 2024, 3).await.unwrap();
        assert_eq!(march.len(), 2);

        let april = ledger.query_month(7, 2024, 4).await.unwrap();
        assert!(april.is_empty());
    }

    #[tokio::test]
    async fn query_month_is_scoped_per_user() {
        let ledger = ledger_at(2024, 3, 15);
        ledger.append(7, "Ana", &expense(10.0, "a")).await.unwrap();
        ledger.append(8, "Bia", &expense(99.0, "b")).await.unwrap();

        let rows = ledger.query_month(7, 2024, 3).await.unwrap();
        assert_eq!(rows, vec![(TransactionKind::Expense, 10.0)]);
    }

    #[tokio::test]
    async fn delete_all_reports_exact_count() {
        let ledger = ledger_at(2024, 3, 15);
        ledger.append(7, "Ana", &expense(10.0, "a")).await.unwrap();
        ledger.append(7, "Ana", &expense(20.0, "b")).await.unwrap();

        assert_eq!(ledger.delete_all(7).await.unwrap(), 2);
        assert_eq!(ledger.delete_all(7).await.unwrap(), 0);
        assert!(ledger.query_month(7, 2024, 3).await.unwrap().is_empty());
    }
}
