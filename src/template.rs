//! Deployment template loading.

use crate::error::{OrchestratorError, Result};
use std::path::Path;
use tracing::debug;

/// Reads a JSON template, validates it, and returns it re-serialized.
///
/// An unreadable file yields [`OrchestratorError::TemplateRead`], malformed
/// JSON yields [`OrchestratorError::TemplateParse`].
pub async fn load_template(path: &Path) -> Result<String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| OrchestratorError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;

    let parsed: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| OrchestratorError::TemplateParse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), bytes = raw.len(), "Template loaded");
    serde_json::to_string_pretty(&parsed).map_err(|source| OrchestratorError::TemplateParse {
        path: path.to_path_buf(),
        source,
    })
}
