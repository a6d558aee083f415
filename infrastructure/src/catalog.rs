//! Tool catalog file loading
//!
//! A catalog is a JSON array of tool schemas. Entries may also use the
//! OpenAI-style wrapper `{"type": "function", "function": {...}}`.

use fncall_domain::{DomainError, ToolSchema, ToolSet};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Could not read tool catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tool catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool catalog must be a JSON array of tools")]
    NotAnArray,

    #[error("Tool #{index} is invalid: {message}")]
    InvalidTool { index: usize, message: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Unwrap `{"type": "function", "function": {...}}` entries.
fn unwrap_entry(entry: Value) -> Value {
    match entry {
        Value::Object(mut map)
            if map.get("type").and_then(Value::as_str) == Some("function")
                && map.get("function").is_some_and(Value::is_object) =>
        {
            map.remove("function").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Parse catalog text into a [`ToolSet`].
pub fn parse_catalog(text: &str) -> Result<ToolSet, CatalogError> {
    let Value::Array(entries) = serde_json::from_str::<Value>(text)? else {
        return Err(CatalogError::NotAnArray);
    };

    let tools = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<ToolSchema>(unwrap_entry(entry)).map_err(|e| {
                CatalogError::InvalidTool {
                    index,
                    message: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ToolSet::new(tools)?)
}

/// Read and parse a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<ToolSet, CatalogError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tools = parse_catalog(&text)?;
    debug!("Loaded {} tool(s) from {}", tools.len(), path.display());
    Ok(tools)
}
