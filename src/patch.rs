//! Genesis patch operations applied to human-readable chain specs before
//! they are converted to raw storage form.

use std::path::{Path, PathBuf};

use log::info;
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::json::{deep_merge, read_json, write_json_pretty};

/// Development account endowed by the dev-balance patch.
pub const DEV_SS58: &str = "5HYRCKHYJN9z5xUtfFkyMj4JUhsAwWyvuU8vKB1FcnYTf9ZQ";

/// Endowment entry `[address, amount]`. The amount is wider than u64, so
/// it is parsed into a lossless JSON number rather than built from an
/// integer literal.
static DEV_BALANCE: Lazy<Value> = Lazy::new(|| {
    let amount: Value = serde_json::from_str("100000000000000001000000000")
        .expect("endowment literal is valid JSON");
    json!([DEV_SS58, amount])
});

/// Which patch operations to apply. They always run in a fixed order:
/// retester overlay, dev balance, dev stakers, custom revive patch.
#[derive(Debug, Clone, Default)]
pub struct PatchSpec {
    pub retester: bool,
    pub dev_balance: bool,
    pub dev_stakers: bool,
    pub custom_patch: Option<PathBuf>,
}

impl PatchSpec {
    /// The retester overlay and a custom patch configure the same genesis
    /// areas and never combine.
    pub fn validate(&self) -> Result<()> {
        if self.retester && self.custom_patch.is_some() {
            return Err(PipelineError::PatchConflict);
        }
        Ok(())
    }
}

/// Walk `path`, turning every missing or non-object step into an empty
/// object, and return the leaf object.
fn ensure_object<'a>(doc: &'a mut Value, path: &[&str]) -> &'a mut Map<String, Value> {
    let mut node = doc;
    for key in path {
        node = as_object(node)
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    as_object(node)
}

fn as_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut().expect("node was just made an object")
}

/// Append the dev account endowment to `balances.balances`, leaving the
/// list untouched if the address is already endowed.
pub fn inject_dev_balance(doc: &mut Value) {
    let balances = ensure_object(doc, &["genesis", "runtimeGenesis", "patch", "balances"]);
    let entries = balances
        .entry("balances".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !entries.is_array() {
        *entries = Value::Array(Vec::new());
    }
    let entries = entries.as_array_mut().expect("entries was just made an array");
    let endowed = entries
        .iter()
        .any(|entry| entry.get(0).and_then(Value::as_str) == Some(DEV_SS58));
    if !endowed {
        entries.push(DEV_BALANCE.clone());
    }
}

/// Set `staking.devStakers` to `[0, 0]`, overwriting any existing value.
/// Zero validators and zero nominators keeps dev genesis construction
/// from minting a large synthetic staker set.
pub fn inject_dev_stakers(doc: &mut Value) {
    let staking = ensure_object(doc, &["genesis", "runtimeGenesis", "patch", "staking"]);
    staking.insert("devStakers".to_string(), json!([0, 0]));
}

/// Deep-merge a caller-supplied document into the revive pallet's genesis
/// config.
pub fn merge_revive_patch(doc: &mut Value, custom: &Value) {
    let patch = ensure_object(doc, &["genesis", "runtimeGenesis", "patch"]);
    let revive = patch
        .entry("revive".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let merged = deep_merge(revive, custom);
    *revive = merged;
}

/// Apply the requested operations to `doc` in the fixed order.
pub async fn apply_patches(mut doc: Value, patches: &PatchSpec, config: &Config) -> Result<Value> {
    if patches.retester {
        let overlay = read_json(&config.retester_patch).await?;
        doc = deep_merge(&doc, &overlay);
    }
    if patches.dev_balance {
        inject_dev_balance(&mut doc);
    }
    if patches.dev_stakers {
        inject_dev_stakers(&mut doc);
    }
    if let Some(path) = &patches.custom_patch {
        let custom = read_json(path).await?;
        merge_revive_patch(&mut doc, &custom);
    }
    Ok(doc)
}

/// Read a chain spec, apply the requested patches and write the result.
pub async fn patch_chain_spec(
    input: &Path,
    output: &Path,
    patches: &PatchSpec,
    config: &Config,
) -> Result<()> {
    let doc = read_json(input).await?;
    let doc = apply_patches(doc, patches, config).await?;
    write_json_pretty(output, &doc).await?;
    info!("chain spec written to {}", output.display());
    Ok(())
}
