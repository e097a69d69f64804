//! Monthly report aggregation and narrative prompt
//!
//! The aggregator is a pure function over the ledger's monthly query
//! result. The narrative builder turns the aggregate into the second
//! deterministic instruction payload; the fixed fallback strings for
//! the "no data" sentinel and for narrative failure also live here.

use crate::models::{MonthlyAggregate, TransactionKind};

/// Reply for a month with no recorded transactions. Sent without
/// invoking the inference collaborator.
pub const NO_DATA_MESSAGE: &str = "You don't have any transactions recorded this month yet, so there is nothing to report. Start sending me your expenses and income! 🚀";

/// Reply when narrative generation fails. The report request never
/// surfaces as a crash.
pub const NARRATIVE_APOLOGY: &str =
    "Sorry, I couldn't generate your report right now. Please try again later.";

/// Compute monthly totals from a ledger query result.
///
/// Pure and idempotent. An empty input yields the `NoData` sentinel,
/// never a zero-valued aggregate: the narrative for "no data yet" is an
/// onboarding nudge, not a zero-balance report.
pub fn aggregate_month(rows: &[(TransactionKind, f64)]) -> MonthlyAggregate {
    if rows.is_empty() {
        return MonthlyAggregate::NoData;
    }

    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for (kind, amount) in rows {
        match kind {
            TransactionKind::Income => total_income += amount,
            TransactionKind::Expense => total_expense += amount,
        }
    }

    MonthlyAggregate::Totals {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    }
}

/// Build the narrative instruction for a non-empty monthly aggregate.
///
/// Deterministic: figures are embedded to two decimal places together
/// with the closed tone policy. Emphasis uses the transport's
/// lightweight markup (`*text*`).
pub fn build_report_prompt(total_income: f64, total_expense: f64, balance: f64) -> String {
    format!(
        r#"You are a friendly and motivating personal finance assistant.
Based on the user's financial data for the current month below, write a brief report about their financial health.

- If the balance is positive, congratulate the user on their good control and give one actionable tip to keep it up.
- If the balance is negative or zero, offer a supportive message and one practical tip to improve over the coming weeks.
- Be concise, use emojis to keep the message light, and emphasize the figures in bold using the transport syntax (*text*).

User data:
- Total income this month: {total_income:.2}
- Total expenses this month: {total_expense:.2}
- Balance this month: {balance:.2}
"#
    )
}
