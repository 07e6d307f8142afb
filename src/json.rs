//! Chain-spec document helpers: lossless JSON file round trips and the
//! deep-merge used by every genesis patch.
//!
//! Balances in these documents exceed 2^53, so the crate turns on
//! serde_json's `arbitrary_precision` numbers: a number keeps its exact
//! decimal digits end to end and is never routed through f64.

use std::path::Path;

use serde_json::Value;
use tokio::fs;

use crate::error::{PipelineError, Result};

/// Merge `source` into `target`, returning a new document.
///
/// Keys present on both sides recurse when both values are objects;
/// any other collision resolves to the source value, arrays included
/// (never element-wise). Type mismatches are not an error: callers
/// control both documents.
pub fn deep_merge(target: &Value, source: &Value) -> Value {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            let mut merged = target_map.clone();
            for (key, source_value) in source_map {
                let value = match target_map.get(key) {
                    Some(target_value) => deep_merge(target_value, source_value),
                    None => source_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        _ => source.clone(),
    }
}

pub async fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| PipelineError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a document as 2-space-indented JSON, creating parent directories.
pub async fn write_json_pretty(path: &Path, doc: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(doc).map_err(|e| PipelineError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_text(path, &text).await
}

/// Write preformatted text, creating parent directories. Used when an
/// external tool already produced the exact document bytes.
pub async fn write_text(path: &Path, text: &str) -> Result<()> {
    ensure_parent(path).await?;
    fs::write(path, text)
        .await
        .map_err(|e| PipelineError::io(path, e))
}

pub(crate) async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::io(parent, e))?;
    }
    Ok(())
}
