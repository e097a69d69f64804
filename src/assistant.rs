//! Assistant - handles one inbound message as one sequential unit of work
//!
//! Dispatches transport events to the interpretation pipeline:
//! free text runs extraction -> validation -> normalization -> append,
//! /report runs query -> aggregate -> narrative, /clear runs the
//! confirmed bulk delete. Every failure terminates in a user-visible
//! reply; nothing here panics or retries.

use crate::classifier::normalize;
use crate::clock::Clock;
use crate::error::AssistantError;
use crate::extraction::{build_extraction_prompt, parse_extraction_response};
use crate::inference::InferenceEngine;
use crate::ledger::LedgerStore;
use crate::models::{MonthlyAggregate, Transaction, TransactionKind};
use crate::report::{aggregate_month, build_report_prompt, NARRATIVE_APOLOGY, NO_DATA_MESSAGE};
use crate::transport::{Command, InboundMessage, Reply};
use chrono::Datelike;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Literal argument required to confirm /clear.
pub const CLEAR_CONFIRMATION: &str = "yes";

const GREETING: &str = "Hello! 👋\n\n\
    I'm your personal finance assistant. Just send me your transactions in natural language, like:\n\
    ➡️ *'Spent $50 on lunch'*\n\
    ➡️ *'Received 1500 from my salary'*\n\n\
    I'll record everything for you! At any time, use /report to see a summary of your month.";

const CLARIFICATION_MESSAGE: &str = "I didn't understand that as a financial transaction. 🤔\n\
    Try something like 'spent 25 on lunch' or 'received $100'.";

const AMOUNT_MESSAGE: &str =
    "The amount could not be registered. Please check that it is a valid number.";

const PERSISTENCE_MESSAGE: &str =
    "The operation could not be completed right now. Please try again later.";

const CLEAR_WARNING: &str = "<b>⚠️ ATTENTION: irreversible action! ⚠️</b>\n\n\
    To permanently delete your history, send the command:\n\
    👉 <b>/clear yes</b> 👈";

pub struct Assistant {
    inference: Arc<dyn InferenceEngine>,
    ledger: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
}

impl Assistant {
    pub fn new(
        inference: Arc<dyn InferenceEngine>,
        ledger: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inference,
            ledger,
            clock,
        }
    }

    /// Handle one inbound message end to end and produce the reply.
    pub async fn handle(&self, message: &InboundMessage) -> Reply {
        match Command::parse(&message.text) {
            Command::Start => Reply::markdown(GREETING),
            Command::Report => self.monthly_report(message.user_id).await,
            Command::Clear { confirmation } => {
                self.clear_history(message.user_id, confirmation).await
            }
            Command::Text(text) => self.record_transaction(message, text).await,
        }
    }

    // =============================
    // Free text -> transaction
    // =============================

    async fn record_transaction(&self, message: &InboundMessage, text: &str) -> Reply {
        // Empty input never reaches the prompt builder.
        if text.trim().is_empty() {
            return Reply::plain(CLARIFICATION_MESSAGE);
        }

        match self.extract_and_append(message, text).await {
            Ok(Some(tx)) => confirmation_reply(&tx),
            Ok(None) => Reply::plain(CLARIFICATION_MESSAGE),
            Err(e) => self.registration_failure_reply(message.user_id, e),
        }
    }

    /// Run the extraction pipeline for one message. `Ok(None)` means
    /// the message was classified as non-financial; nothing appended.
    async fn extract_and_append(
        &self,
        message: &InboundMessage,
        text: &str,
    ) -> crate::Result<Option<Transaction>> {
        let prompt = build_extraction_prompt(text);
        let raw = self.inference.generate(&prompt).await?;

        let extraction = parse_extraction_response(&raw)?;
        if !extraction.kind.is_financial() {
            info!(user_id = message.user_id, "message classified as non-financial");
            return Ok(None);
        }

        let transaction = normalize(&extraction)?;
        let appended = self
            .ledger
            .append(message.user_id, &message.user_name, &transaction)
            .await?;

        info!(
            user_id = message.user_id,
            kind = %appended.kind,
            amount = appended.amount,
            "transaction recorded"
        );

        Ok(Some(appended))
    }

    fn registration_failure_reply(&self, user_id: i64, error: AssistantError) -> Reply {
        match error {
            AssistantError::AmountFormat(reason) => {
                warn!(user_id, %reason, "amount rejected");
                Reply::plain(AMOUNT_MESSAGE)
            }
            AssistantError::Persistence(reason) => {
                error!(user_id, %reason, "ledger append failed");
                Reply::plain(PERSISTENCE_MESSAGE)
            }
            AssistantError::Database(e) => {
                error!(user_id, error = %e, "ledger append failed");
                Reply::plain(PERSISTENCE_MESSAGE)
            }
            // Parse/schema failures and inference outages all mean the
            // message could not be understood as a transaction.
            other => {
                warn!(user_id, error = %other, "extraction rejected");
                Reply::plain(CLARIFICATION_MESSAGE)
            }
        }
    }

    // =============================
    // /report
    // =============================

    async fn monthly_report(&self, user_id: i64) -> Reply {
        let now = self.clock.now();

        let rows = match self.ledger.query_month(user_id, now.year(), now.month()).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(user_id, error = %e, "monthly query failed");
                return Reply::plain(PERSISTENCE_MESSAGE);
            }
        };

        let (total_income, total_expense, balance) = match aggregate_month(&rows) {
            MonthlyAggregate::NoData => return Reply::plain(NO_DATA_MESSAGE),
            MonthlyAggregate::Totals {
                total_income,
                total_expense,
                balance,
            } => (total_income, total_expense, balance),
        };

        let prompt = build_report_prompt(total_income, total_expense, balance);

        match self.inference.generate(&prompt).await {
            Ok(narrative) if !narrative.trim().is_empty() => Reply::markdown(narrative),
            Ok(_) => {
                let e = AssistantError::NarrativeGeneration("blank narrative".to_string());
                warn!(user_id, error = %e, "falling back to apology");
                Reply::plain(NARRATIVE_APOLOGY)
            }
            Err(e) => {
                let e = AssistantError::NarrativeGeneration(e.to_string());
                warn!(user_id, error = %e, "falling back to apology");
                Reply::plain(NARRATIVE_APOLOGY)
            }
        }
    }

    // =============================
    // /clear
    // =============================

    async fn clear_history(&self, user_id: i64, confirmation: Option<&str>) -> Reply {
        let confirmed = confirmation
            .map(|arg| arg.eq_ignore_ascii_case(CLEAR_CONFIRMATION))
            .unwrap_or(false);

        if !confirmed {
            return Reply::html(CLEAR_WARNING);
        }

        match self.ledger.delete_all(user_id).await {
            Ok(count) => {
                info!(user_id, count, "history cleared");
                Reply::plain(format!(
                    "✅ Done! Your history was cleared. {} transactions were removed.",
                    count
                ))
            }
            Err(e) => {
                error!(user_id, error = %e, "history clear failed");
                Reply::plain(PERSISTENCE_MESSAGE)
            }
        }
    }
}

fn confirmation_reply(tx: &Transaction) -> Reply {
    let (emoji, label) = match tx.kind {
        TransactionKind::Income => ("🟢", "Income"),
        TransactionKind::Expense => ("🔴", "Expense"),
    };

    Reply::markdown(format!(
        "{} Recorded!\n\n*Kind:* {}\n*Amount:* {:.2}\n*Description:* {}",
        emoji, label, tx.amount, tx.description
    ))
}
