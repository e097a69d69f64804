//! Personal finance assistant
//!
//! Extracts structured financial facts from free-form natural-language
//! messages, persists them to a per-user append-only ledger, and
//! produces natural-language monthly reports.
//!
//! PIPELINE:
//! INBOUND TEXT → EXTRACTION PROMPT → INFERENCE → VALIDATE → NORMALIZE → APPEND → REPLY
//! REPORT: LEDGER QUERY → AGGREGATE → NARRATIVE PROMPT → INFERENCE → REPLY
//!
//! The inference collaborator is an untrusted oracle: every field it
//! returns is re-validated before it can touch the ledger.

pub mod api;
pub mod assistant;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod error;
pub mod extraction;
pub mod inference;
pub mod ledger;
pub mod models;
pub mod report;
pub mod transport;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use transport::{Command, InboundMessage, ParseMode, Reply};
