//! Extraction prompt builder and response validator
//!
//! The prompt builder turns raw user text into a deterministic
//! instruction payload for the inference collaborator. The validator
//! turns the collaborator's raw text back into a typed
//! [`ExtractionResult`] or rejects it. The oracle is untrusted: every
//! field is re-validated here regardless of what the prompt requested.

use crate::error::AssistantError;
use crate::models::{ExtractionKind, ExtractionResult};
use crate::Result;

/// Fallback description for income without an explicit item.
pub const FALLBACK_INCOME_DESCRIPTION: &str = "incoming funds";
/// Fallback description for expenses without an explicit item.
pub const FALLBACK_EXPENSE_DESCRIPTION: &str = "general payment";

/// Build the extraction instruction for one user message.
///
/// Pure and deterministic: the same text always yields the same prompt,
/// so this stage is testable without invoking the collaborator. The
/// caller is responsible for short-circuiting empty/whitespace input
/// before reaching this builder.
pub fn build_extraction_prompt(user_text: &str) -> String {
    format!(
        r#"You are a natural-language processing specialist for a personal finance application.
Your task is to analyze the user's message and extract the details of a financial transaction.

User message: "{user_text}"

Rules:
1. Type: classify as "income" when money is entering the user's possession (e.g. received, earned, salary) or "expense" when money is leaving it (e.g. spent, paid, bought). Any other language counts as semantic equivalents.
2. Amount: extract the numeric value. Ignore currency symbols and words (R$, $, reais, dollars) and use a period as the decimal separator.
3. Description: extract the main item or reason of the transaction. If there is no explicit item, use a short contextual label: "{income_fallback}" for income, "{expense_fallback}" for expenses. Temporal words like "today" or "yesterday" are never the description.
4. Output format: respond with exactly ONE valid JSON object and nothing else. No prose, no markdown fences.
5. Non-financial: if the message is not a transaction, return a JSON object with "type": "invalid".

Examples:
- Message: "gastei 55,90 no supermercado" -> {{"type": "expense", "amount": 55.90, "description": "supermercado"}}
- Message: "recebi 100 reais hoje" -> {{"type": "income", "amount": 100.0, "description": "{income_fallback}"}}
- Message: "afternoon snack, $15" -> {{"type": "expense", "amount": 15.0, "description": "afternoon snack"}}
- Message: "freelance payment 850" -> {{"type": "income", "amount": 850.0, "description": "freelance payment"}}
- Message: "25 at the pharmacy" -> {{"type": "expense", "amount": 25.0, "description": "pharmacy"}}
- Message: "paid the electricity bill, 120,50" -> {{"type": "expense", "amount": 120.50, "description": "electricity bill"}}
- Message: "ola tudo bem" -> {{"type": "invalid"}}
- Message: "what day is it today?" -> {{"type": "invalid"}}
"#,
        user_text = user_text,
        income_fallback = FALLBACK_INCOME_DESCRIPTION,
        expense_fallback = FALLBACK_EXPENSE_DESCRIPTION,
    )
}

/// Strip incidental markdown artifacts the collaborator may wrap around
/// the JSON object despite the output contract.
fn strip_formatting(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    cleaned = cleaned.strip_prefix("```json").unwrap_or(cleaned);
    cleaned = cleaned.strip_prefix("```").unwrap_or(cleaned);
    cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned);
    cleaned.trim()
}

/// Parse and validate one raw inference response.
///
/// Failure modes:
/// - `ExtractionParse` when the text is not a JSON object;
/// - `ExtractionSchema` when `type` is absent or outside the closed
///   enumeration, or when a financial kind is missing its mandatory
///   amount or non-empty description.
///
/// Both are recoverable: the caller replies with a clarification
/// prompt and nothing is persisted.
pub fn parse_extraction_response(raw: &str) -> Result<ExtractionResult> {
    let cleaned = strip_formatting(raw);

    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| AssistantError::ExtractionParse(format!("{} | raw={}", e, raw)))?;

    let object = value
        .as_object()
        .ok_or_else(|| AssistantError::ExtractionParse(format!("not a JSON object: {}", cleaned)))?;

    let kind_str = object
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AssistantError::ExtractionSchema("missing \"type\" field".to_string()))?;

    let kind = match kind_str {
        "income" => ExtractionKind::Income,
        "expense" => ExtractionKind::Expense,
        "invalid" => ExtractionKind::Invalid,
        other => {
            return Err(AssistantError::ExtractionSchema(format!(
                "unknown transaction type: {}",
                other
            )))
        }
    };

    let amount = object.get("amount").filter(|v| !v.is_null()).cloned();
    let description = object
        .get("description")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string());

    if kind.is_financial() {
        if amount.is_none() {
            return Err(AssistantError::ExtractionSchema(format!(
                "{} result without an amount",
                kind_str
            )));
        }
        // The fallback-description rule lives in the prompt, but the
        // oracle's compliance is not guaranteed. An empty description
        // for a financial kind is rejected here rather than accepted.
        match description.as_deref() {
            Some(d) if !d.is_empty() => {}
            _ => {
                return Err(AssistantError::ExtractionSchema(format!(
                    "{} result without a description",
                    kind_str
                )))
            }
        }
    }

    Ok(ExtractionResult {
        kind,
        amount,
        description,
    })
}
