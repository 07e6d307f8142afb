#![allow(unused)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use revive_specgen::config::Config;

/// A config whose every path lives inside `dir`, so tests never touch
/// real checkouts or the user's chainspec directory.
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        polkadot_sdk_dir: dir.path().join("polkadot-sdk"),
        paseo_dir: dir.path().join("paseo"),
        runtimes_dir: dir.path().join("runtimes"),
        retester_dir: dir.path().join("retester"),
        chainspec_dir: dir.path().join("chainspecs"),
        retester_patch: dir.path().join("retester-chainspec-patch.json"),
        chain_spec_builder: PathBuf::from("chain-spec-builder"),
        omni_node: PathBuf::from("polkadot-omni-node"),
    }
}

pub fn write_json_file(path: &Path, doc: &Value) {
    fs::write(path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
}

pub fn read_json_file(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Write an executable shell script standing in for an external tool.
#[cfg(unix)]
pub fn write_stub_tool(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}
