//! Inference collaborator boundary
//!
//! The reasoning engine is an untrusted oracle: it accepts an
//! instruction string and returns free text. Everything it returns is
//! re-validated before being trusted (see `extraction` and `report`).

pub mod gemini;

use crate::Result;
use async_trait::async_trait;

pub use gemini::GeminiClient;

#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Send an instruction payload and return the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
