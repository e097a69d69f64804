//! Core data models for the finance assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

/// Kind of a persisted transaction. Closed set: nothing outside
/// {income, expense} ever reaches the ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind reported by the extraction step. Superset of
/// [`TransactionKind`]: `Invalid` marks non-financial messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionKind {
    Income,
    Expense,
    Invalid,
}

impl ExtractionKind {
    /// Financial kinds carry a mandatory amount and description.
    pub fn is_financial(&self) -> bool {
        !matches!(self, ExtractionKind::Invalid)
    }
}

//
// ================= Transaction =================
//

/// One ledger entry. Immutable once appended; `created_at` is assigned
/// by the ledger store at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Validated (kind, amount, description) triple, ready for
/// `LedgerStore::append`. Produced only by the classifier/normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
}

//
// ================= Extraction =================
//

/// Ephemeral result of validating one inference response. Consumed
/// immediately by the classifier, never persisted.
///
/// `amount` stays a raw JSON value here: the oracle is untrusted and
/// may return a number or a string. Coercion happens in the classifier
/// so a bad amount surfaces as `AmountFormat`, not a parse failure.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub kind: ExtractionKind,
    pub amount: Option<serde_json::Value>,
    pub description: Option<String>,
}

//
// ================= Report =================
//

/// Monthly totals, or the distinct "no data" sentinel for a month with
/// no transactions at all. The sentinel is never conflated with a
/// zero-valued aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum MonthlyAggregate {
    NoData,
    Totals {
        total_income: f64,
        total_expense: f64,
        balance: f64,
    },
}
