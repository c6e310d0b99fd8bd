//! Sequential per-document summarization with failure isolation.
//!
//! Documents are summarized strictly one at a time. Every document yields exactly one
//! [`SummaryResult`]; a failed generation call is recorded as a sentinel summary and the loop
//! moves on to the next document.

pub mod prompt;

use crate::generation::{GenerationError, GenerationRequest, TextGenerator};
use crate::ingestion::Document;
use serde::Serialize;
use std::sync::Arc;

pub use prompt::{PromptError, PromptTemplate};

/// Summary text used when the generation call returned no replies.
pub const EMPTY_REPLY_SUMMARY: &str = "Unable to generate summary";
/// Summary text used when the generation call failed.
pub const GENERATION_ERROR_SUMMARY: &str = "Error generating summary";

/// Summary produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    /// Document that was summarized.
    pub document: Document,
    /// Generated summary, or a sentinel text when `failed` is set.
    pub summary: String,
    /// Whether generation failed for this document.
    pub failed: bool,
}

impl SummaryResult {
    fn succeeded(document: Document, summary: String) -> Self {
        Self {
            document,
            summary,
            failed: false,
        }
    }

    fn sentinel(document: Document, summary: &str) -> Self {
        Self {
            document,
            summary: summary.to_string(),
            failed: true,
        }
    }
}

/// Renders prompts and runs generation for a batch of documents.
pub struct SummaryProcessor {
    generator: Arc<dyn TextGenerator>,
    template: PromptTemplate,
    model: String,
    temperature: f32,
}

impl SummaryProcessor {
    /// Create a processor bound to a generator and fixed generation settings.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        template: PromptTemplate,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            generator,
            template,
            model: model.into(),
            temperature,
        }
    }

    /// Summarize every document in order; the output always has the same length as the input.
    pub async fn run(&self, documents: Vec<Document>) -> Vec<SummaryResult> {
        let total = documents.len();
        let mut results = Vec::with_capacity(total);
        for document in documents {
            results.push(self.attempt(document).await);
        }

        let failed = results.iter().filter(|result| result.failed).count();
        tracing::info!(total, failed, "Summarization finished");
        results
    }

    /// Summarize one document, converting any generation failure into a sentinel result.
    pub async fn attempt(&self, document: Document) -> SummaryResult {
        match self.generate(&document).await {
            Ok(Some(summary)) => SummaryResult::succeeded(document, summary),
            Ok(None) => {
                tracing::debug!(id = %document.meta.id, "Generator returned no replies");
                SummaryResult::sentinel(document, EMPTY_REPLY_SUMMARY)
            }
            Err(error) => {
                tracing::debug!(
                    id = %document.meta.id,
                    title = document.meta.title.as_deref().unwrap_or("N/A"),
                    error = %error,
                    "Error processing document"
                );
                SummaryResult::sentinel(document, GENERATION_ERROR_SUMMARY)
            }
        }
    }

    async fn generate(&self, document: &Document) -> Result<Option<String>, GenerationError> {
        let request = GenerationRequest {
            prompt: self.template.render(document),
            model: self.model.clone(),
            temperature: self.temperature,
        };
        let replies = self.generator.generate(request).await?;
        Ok(replies.into_iter().next())
    }
}
