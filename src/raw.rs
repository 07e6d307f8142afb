//! Raw chain-spec production: convert a patched spec to raw storage form
//! and stamp it with the dev-chain boot markers.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};
use serde_json::Value;
use sp_crypto_hashing::twox_128;

use crate::error::{PipelineError, Result};
use crate::json::write_json_pretty;
use crate::process::capture;

/// The pretended relay chain lags two hours behind the wall clock.
pub const RELAY_OFFSET_MS: u64 = 7_200_000;
/// Relay-chain block time.
pub const RELAY_BLOCK_TIME_MS: u64 = 6_000;

/// Storage key of a `(pallet, item)` pair: twox128 of each name,
/// concatenated, as lowercase 0x-prefixed hex.
pub fn storage_key(pallet: &str, item: &str) -> String {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&twox_128(pallet.as_bytes()));
    key.extend_from_slice(&twox_128(item.as_bytes()));
    format!("0x{}", hex::encode(key))
}

/// Relay-chain height assumed at `now_ms`, clamped to zero for clocks
/// inside the offset window.
pub fn relay_block_number(now_ms: u64) -> u32 {
    (now_ms.saturating_sub(RELAY_OFFSET_MS) / RELAY_BLOCK_TIME_MS) as u32
}

fn le_hex(value: u32) -> String {
    format!("0x{}", hex::encode(value.to_le_bytes()))
}

/// Insert `Scheduler.IncompleteSince` and
/// `ParachainSystem.LastRelayChainBlockNumber` into `genesis.raw.top`,
/// both set to the back-dated relay height. Without them the scheduler
/// agenda catch-up starts at block one and walks hundreds of millions of
/// empty blocks before the chain accepts transactions.
pub fn inject_boot_markers(doc: &mut Value, now_ms: u64, origin: &Path) -> Result<()> {
    let top = doc
        .get_mut("genesis")
        .and_then(|genesis| genesis.get_mut("raw"))
        .and_then(|raw| raw.get_mut("top"))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| PipelineError::MissingRawTop {
            path: origin.to_path_buf(),
        })?;

    let marker = le_hex(relay_block_number(now_ms));
    top.insert(
        storage_key("Scheduler", "IncompleteSince"),
        Value::String(marker.clone()),
    );
    top.insert(
        storage_key("ParachainSystem", "LastRelayChainBlockNumber"),
        Value::String(marker),
    );
    Ok(())
}

/// Run the node's `build-spec --raw` over a patched spec, stamp the boot
/// markers and write the result.
pub async fn build_raw(node: &Path, input: &Path, output: &Path) -> Result<()> {
    let args = vec![
        "build-spec".to_string(),
        "--raw".to_string(),
        "--chain".to_string(),
        input.display().to_string(),
    ];
    let stdout = capture(node, &args).await?;
    let mut doc: Value = serde_json::from_str(&stdout).map_err(|e| PipelineError::ToolOutput {
        tool: node.display().to_string(),
        source: e,
    })?;
    inject_boot_markers(&mut doc, unix_now_ms(), input)?;
    write_json_pretty(output, &doc).await?;
    info!("raw chain spec written to {}", output.display());
    Ok(())
}

fn unix_now_ms() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as u64,
        Err(_) => {
            warn!("system clock is before the unix epoch");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn storage_key_matches_the_known_system_account_prefix() {
        assert_eq!(
            storage_key("System", "Account"),
            "0x26aa394eea5630e07c48ae0c9558cef7b99d880ec681799c0cf30e8886371da9"
        );
    }

    #[test]
    fn storage_key_is_order_sensitive() {
        assert_ne!(
            storage_key("Scheduler", "IncompleteSince"),
            storage_key("IncompleteSince", "Scheduler")
        );
    }

    #[test]
    fn keys_under_one_pallet_share_the_pallet_prefix() {
        let a = storage_key("ParachainSystem", "LastRelayChainBlockNumber");
        let b = storage_key("ParachainSystem", "ValidationData");
        assert_eq!(a.len(), 66);
        assert_eq!(&a[..34], &b[..34]);
        assert_ne!(&a[34..], &b[34..]);
    }

    #[test]
    fn relay_height_is_floored_and_clamped() {
        assert_eq!(relay_block_number(0), 0);
        assert_eq!(relay_block_number(RELAY_OFFSET_MS), 0);
        assert_eq!(relay_block_number(RELAY_OFFSET_MS + 5_999), 0);
        assert_eq!(relay_block_number(RELAY_OFFSET_MS + 6_000), 1);
        // 2025-era wall clock lands in the hundreds of millions
        assert_eq!(relay_block_number(1_755_000_000_000), 292_498_800);
    }

    #[test]
    fn relay_height_never_decreases_with_time() {
        let mut last = 0;
        for now in (0..100_000_000_000u64).step_by(7_919_000_000) {
            let height = relay_block_number(now);
            assert!(height >= last);
            last = height;
        }
    }

    #[test]
    fn markers_are_little_endian_u32_hex() {
        assert_eq!(le_hex(0), "0x00000000");
        assert_eq!(le_hex(42), "0x2a000000");
        assert_eq!(le_hex(0x1234_5678), "0x78563412");
    }

    #[test]
    fn both_markers_carry_the_same_height() {
        let mut doc = json!({"genesis": {"raw": {"top": {}}}});
        inject_boot_markers(&mut doc, RELAY_OFFSET_MS + 6_000, Path::new("in.json")).unwrap();

        let top = doc["genesis"]["raw"]["top"].as_object().unwrap();
        let scheduler = top
            .get(&storage_key("Scheduler", "IncompleteSince"))
            .and_then(Value::as_str)
            .unwrap();
        let parachain = top
            .get(&storage_key("ParachainSystem", "LastRelayChainBlockNumber"))
            .and_then(Value::as_str)
            .unwrap();
        assert_eq!(scheduler, "0x01000000");
        assert_eq!(scheduler, parachain);
    }

    #[test]
    fn specs_without_a_raw_section_are_rejected() {
        let mut doc = json!({"genesis": {}});
        let err = inject_boot_markers(&mut doc, 0, Path::new("in.json")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingRawTop { .. }));
    }
}
