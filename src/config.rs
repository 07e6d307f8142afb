use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Resolved tool configuration, built once at startup and passed into the
/// pipeline. Precedence per field: TOML config file, then environment
/// variable, then built-in default.
#[derive(Debug, Clone)]
pub struct Config {
    /// polkadot-sdk checkout (asset-hub-westend runtime, revive-dev-node).
    pub polkadot_sdk_dir: PathBuf,
    /// paseo runtimes checkout.
    pub paseo_dir: PathBuf,
    /// polkadot/kusama fellowship runtimes checkout.
    pub runtimes_dir: PathBuf,
    /// revive-differential-tests checkout.
    pub retester_dir: PathBuf,
    /// Where base/patched/raw spec artifacts are written.
    pub chainspec_dir: PathBuf,
    /// Genesis overlay merged in by the `--retester` flag.
    pub retester_patch: PathBuf,
    pub chain_spec_builder: PathBuf,
    pub omni_node: PathBuf,
}

/// Optional TOML overlay, every key optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
struct FileConfig {
    polkadot_sdk_dir: Option<PathBuf>,
    paseo_dir: Option<PathBuf>,
    runtimes_dir: Option<PathBuf>,
    retester_dir: Option<PathBuf>,
    chainspec_dir: Option<PathBuf>,
    retester_patch: Option<PathBuf>,
    chain_spec_builder: Option<PathBuf>,
    omni_node: Option<PathBuf>,
}

impl Config {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let overlay = match file {
            Some(path) => {
                let toml_str =
                    fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
                toml::from_str::<FileConfig>(&toml_str).map_err(|e| {
                    PipelineError::Config(format!("{}: {}", path.display(), e))
                })?
            }
            None => FileConfig::default(),
        };
        Ok(Self::from_env().apply(overlay))
    }

    /// Environment variables and built-in defaults only. Sibling checkouts
    /// default to `../<name>` next to the working directory, matching the
    /// side-by-side checkout layout the tool expects.
    fn from_env() -> Self {
        let retester_dir = env_path("RETESTER_DIR")
            .unwrap_or_else(|| sibling("revive-differential-tests"));
        let home = env_path("HOME").unwrap_or_else(|| PathBuf::from("."));
        let chainspec_dir = home.join(".node-env").join("chainspecs");

        Config {
            polkadot_sdk_dir: env_path("POLKADOT_SDK_DIR")
                .unwrap_or_else(|| sibling("polkadot-sdk")),
            paseo_dir: env_path("PASEO_DIR").unwrap_or_else(|| sibling("paseo")),
            runtimes_dir: env_path("RUNTIMES_DIR").unwrap_or_else(|| sibling("runtimes")),
            retester_patch: retester_dir.join("retester-chainspec-patch.json"),
            retester_dir,
            chainspec_dir,
            chain_spec_builder: PathBuf::from("chain-spec-builder"),
            omni_node: PathBuf::from("polkadot-omni-node"),
        }
    }

    fn apply(mut self, overlay: FileConfig) -> Self {
        if let Some(dir) = overlay.polkadot_sdk_dir {
            self.polkadot_sdk_dir = dir;
        }
        if let Some(dir) = overlay.paseo_dir {
            self.paseo_dir = dir;
        }
        if let Some(dir) = overlay.runtimes_dir {
            self.runtimes_dir = dir;
        }
        if let Some(dir) = overlay.retester_dir {
            self.retester_patch = dir.join("retester-chainspec-patch.json");
            self.retester_dir = dir;
        }
        if let Some(dir) = overlay.chainspec_dir {
            self.chainspec_dir = dir;
        }
        if let Some(path) = overlay.retester_patch {
            self.retester_patch = path;
        }
        if let Some(path) = overlay.chain_spec_builder {
            self.chain_spec_builder = path;
        }
        if let Some(path) = overlay.omni_node {
            self.omni_node = path;
        }
        self
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name).map(PathBuf::from)
}

fn sibling(name: &str) -> PathBuf {
    PathBuf::from("..").join(name)
}

pub fn validate_dir(path: &Path, label: &str) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PipelineError::MissingDir {
            label: label.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// The polkadot-sdk dir must be a real checkout, not a stray empty directory.
pub fn validate_checkout(path: &Path, label: &str) -> Result<()> {
    validate_dir(path, label)?;
    if path.join(".git").exists() {
        Ok(())
    } else {
        Err(PipelineError::NotCheckout {
            path: path.to_path_buf(),
        })
    }
}
