//! Prompt template rendering for per-document summaries.

use crate::ingestion::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_TEMPLATE: &str = "\
You are summarizing a Hacker News story for a busy reader.

Title: {{title}}
URL: {{url}}
Score: {{score}} points
Comments: {{comments}}
Author: {{author}}
Posted: {{time}}

Article:
{{content}}

Write exactly one concise sentence that captures what the article is about. \
Output only that sentence.";

const CONTENT_PLACEHOLDER: &str = "content";
const MISSING_VALUE: &str = "N/A";

/// Errors raised while loading a prompt template.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Template file could not be read.
    #[error("failed to read prompt template {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Template lacks a placeholder every prompt needs.
    #[error("prompt template is missing the {{{{{0}}}}} placeholder")]
    MissingPlaceholder(&'static str),
}

/// Text template with `{{name}}` placeholders filled from a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Parse a template, requiring the `{{content}}` placeholder.
    pub fn new(source: impl Into<String>) -> Result<Self, PromptError> {
        let source = source.into();
        if !source.contains(&format!("{{{{{CONTENT_PLACEHOLDER}}}}}")) {
            return Err(PromptError::MissingPlaceholder(CONTENT_PLACEHOLDER));
        }
        Ok(Self { source })
    }

    /// Load a template from disk.
    pub fn from_path(path: &Path) -> Result<Self, PromptError> {
        let source = std::fs::read_to_string(path).map_err(|source| PromptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(source)
    }

    /// Load the template at `path`, or the built-in one when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, PromptError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Render the prompt for one document.
    ///
    /// Substitution is single-pass, so placeholder-like text inside the article is left alone.
    /// Unknown placeholders are kept verbatim.
    pub fn render(&self, document: &Document) -> String {
        let mut out = String::with_capacity(self.source.len() + document.content.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };

            let name = after_open[..end].trim();
            match lookup(document, name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after_open[end + 2..];
        }

        out.push_str(rest);
        out
    }
}

fn lookup(document: &Document, name: &str) -> Option<String> {
    let meta = &document.meta;
    let value = match name {
        "title" => or_missing(meta.title.as_deref()),
        "url" => meta.url.clone(),
        "score" => meta.score.to_string(),
        "comments" => meta.comment_count.to_string(),
        "author" => or_missing(meta.author.as_deref()),
        "time" => or_missing(meta.time_iso.as_deref()),
        "content" => document.content.clone(),
        _ => return None,
    };
    Some(value)
}

fn or_missing(value: Option<&str>) -> String {
    value.unwrap_or(MISSING_VALUE).to_string()
}
