//! Transaction classifier/normalizer
//!
//! Last gate before the ledger: takes a validated extraction result
//! with a financial kind and produces the (kind, amount, description)
//! triple handed to `LedgerStore::append`. Nothing is persisted here;
//! the caller appends explicitly after this succeeds.

use crate::error::AssistantError;
use crate::models::{ExtractionKind, ExtractionResult, NewTransaction, TransactionKind};
use crate::Result;

/// Normalize a financial extraction result into a transaction-ready
/// triple.
///
/// - Coerces the raw amount to `f64`. A string amount tolerates
///   currency symbols and a comma decimal separator; anything else is
///   `AmountFormat` — a user-reportable condition distinct from
///   extraction failure.
/// - Rejects negative and non-finite amounts.
/// - Passes the description through unchanged. Fallback text is the
///   prompt builder's responsibility, not re-derived here.
pub fn normalize(result: &ExtractionResult) -> Result<NewTransaction> {
    let kind = match result.kind {
        ExtractionKind::Income => TransactionKind::Income,
        ExtractionKind::Expense => TransactionKind::Expense,
        ExtractionKind::Invalid => {
            return Err(AssistantError::ExtractionSchema(
                "invalid extraction result reached the classifier".to_string(),
            ))
        }
    };

    let raw_amount = result.amount.as_ref().ok_or_else(|| {
        AssistantError::AmountFormat("financial result carried no amount".to_string())
    })?;

    let amount = coerce_amount(raw_amount)?;

    if !amount.is_finite() {
        return Err(AssistantError::AmountFormat(format!(
            "amount is not a finite number: {}",
            amount
        )));
    }
    if amount < 0.0 {
        return Err(AssistantError::AmountFormat(format!(
            "amount must not be negative: {}",
            amount
        )));
    }

    let description = match result.description.as_deref() {
        Some(d) if !d.trim().is_empty() => d.trim().to_string(),
        _ => {
            return Err(AssistantError::ExtractionSchema(
                "financial result carried no description".to_string(),
            ))
        }
    };

    Ok(NewTransaction {
        kind,
        amount,
        description,
    })
}

/// Coerce a raw JSON amount to `f64`. Numbers pass through; strings
/// are cleaned of currency markers and comma separators first.
fn coerce_amount(raw: &serde_json::Value) -> Result<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| {
            AssistantError::AmountFormat(format!("amount is not representable: {}", n))
        }),
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches("R$")
                .trim_start_matches('$')
                .trim()
                .replace(',', ".");

            cleaned.parse::<f64>().map_err(|_| {
                AssistantError::AmountFormat(format!("amount is not numeric: {}", s))
            })
        }
        other => Err(AssistantError::AmountFormat(format!(
            "amount has unexpected shape: {}",
            other
        ))),
    }
}
