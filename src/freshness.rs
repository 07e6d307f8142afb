//! Freshness oracle: decides whether an existing raw spec already embeds
//! a runtime binary, letting the pipeline skip a rebuild.

use std::path::Path;

use log::debug;
use serde_json::Value;
use tokio::fs;

use crate::error::{PipelineError, Result};

/// Storage key of the runtime code blob in a raw spec: hex of `:code`.
pub const CODE_KEY: &str = "0x3a636f6465";

/// Outcome of comparing a raw spec against a candidate runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The embedded code matches the runtime byte for byte.
    Fresh,
    /// The spec parses but embeds different code, or none at all.
    Stale,
    /// The spec could not be inspected; callers rebuild, same as stale.
    Unknown,
}

impl Freshness {
    pub fn is_fresh(self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

/// Best-effort check whether `raw_spec` embeds `runtime`'s current bytes.
/// Never fails: inspection problems degrade to [`Freshness::Unknown`].
pub async fn check(runtime: &Path, raw_spec: &Path) -> Freshness {
    match inspect(runtime, raw_spec).await {
        Ok(freshness) => freshness,
        Err(err) => {
            debug!("cannot inspect {}: {}", raw_spec.display(), err);
            Freshness::Unknown
        }
    }
}

async fn inspect(runtime: &Path, raw_spec: &Path) -> Result<Freshness> {
    let code = fs::read(runtime)
        .await
        .map_err(|e| PipelineError::io(runtime, e))?;
    let text = fs::read_to_string(raw_spec)
        .await
        .map_err(|e| PipelineError::io(raw_spec, e))?;
    let doc: Value = serde_json::from_str(&text).map_err(|e| PipelineError::Parse {
        path: raw_spec.to_path_buf(),
        source: e,
    })?;

    let embedded = doc
        .get("genesis")
        .and_then(|genesis| genesis.get("raw"))
        .and_then(|raw| raw.get("top"))
        .and_then(|top| top.get(CODE_KEY))
        .and_then(Value::as_str);
    Ok(match embedded {
        Some(blob) if blob == format!("0x{}", hex::encode(&code)) => Freshness::Fresh,
        // a parseable spec without a matching blob definitively differs
        _ => Freshness::Stale,
    })
}
