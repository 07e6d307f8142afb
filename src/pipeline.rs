//! The build pipeline: runtime build, freshness gate, spec creation,
//! genesis patching and raw conversion, plus the per-network recipes.

use std::path::{Path, PathBuf};

use log::info;

use crate::builder::{self, CargoBuild, CreateSpec};
use crate::config::{validate_checkout, validate_dir, Config};
use crate::error::{PipelineError, Result};
use crate::freshness::{self, Freshness};
use crate::patch::{self, PatchSpec};
use crate::raw;

/// CLI switches shared by the network subcommands.
#[derive(Debug, Clone, Default)]
pub struct BuildFlags {
    pub retester: bool,
    pub custom_patch: Option<PathBuf>,
    pub force: bool,
    pub no_build: bool,
}

/// Everything needed to produce one network's raw dev spec.
#[derive(Debug, Clone)]
pub struct BuildRecipe {
    /// Network label used in log lines.
    pub name: String,
    /// Runtime wasm embedded into the spec; also the freshness cache key.
    pub runtime: PathBuf,
    /// Manifest and package that rebuild `runtime`.
    pub manifest_path: PathBuf,
    pub package: String,
    /// Spec builder binary handed to [`builder::create_spec`].
    pub builder: PathBuf,
    /// Node binary running `build-spec --raw`.
    pub node: PathBuf,
    pub para_id: u32,
    pub preset: String,
    pub relay_chain: Option<String>,
    pub patches: PatchSpec,
    /// Builder output, pre-patching.
    pub base_path: PathBuf,
    /// Patched human-readable spec, input to the raw conversion.
    pub patched_path: PathBuf,
    /// Final raw spec.
    pub output: PathBuf,
    pub build_runtime: bool,
    pub force: bool,
}

impl BuildRecipe {
    pub fn westend(config: &Config, flags: &BuildFlags) -> Result<Self> {
        validate_checkout(&config.polkadot_sdk_dir, "POLKADOT_SDK_DIR")?;
        let mut recipe = Self::asset_hub(
            "westend",
            &config.polkadot_sdk_dir,
            "asset-hub-westend-runtime",
            config,
            flags,
        )?;
        if flags.retester {
            // the retester consumes specs produced by omni-node itself
            recipe.builder = config.omni_node.clone();
        }
        Ok(recipe)
    }

    pub fn paseo(config: &Config, flags: &BuildFlags) -> Result<Self> {
        validate_dir(&config.paseo_dir, "PASEO_DIR")?;
        Self::asset_hub(
            "paseo",
            &config.paseo_dir,
            "asset-hub-paseo-runtime",
            config,
            flags,
        )
    }

    pub fn polkadot(config: &Config, flags: &BuildFlags) -> Result<Self> {
        validate_dir(&config.runtimes_dir, "RUNTIMES_DIR")?;
        Self::asset_hub(
            "polkadot",
            &config.runtimes_dir,
            "asset-hub-polkadot-runtime",
            config,
            flags,
        )
    }

    pub fn kusama(config: &Config, flags: &BuildFlags) -> Result<Self> {
        validate_dir(&config.runtimes_dir, "RUNTIMES_DIR")?;
        Self::asset_hub(
            "kusama",
            &config.runtimes_dir,
            "asset-hub-kusama-runtime",
            config,
            flags,
        )
    }

    fn asset_hub(
        name: &str,
        dir: &Path,
        package: &str,
        config: &Config,
        flags: &BuildFlags,
    ) -> Result<Self> {
        let patches = patches_for(flags)?;
        let stem = if flags.retester {
            format!("ah-{}-retester-spec", name)
        } else {
            format!("ah-{}-spec", name)
        };
        Ok(BuildRecipe {
            name: name.to_string(),
            runtime: runtime_wasm(dir, package),
            manifest_path: dir.join("Cargo.toml"),
            package: package.to_string(),
            builder: config.chain_spec_builder.clone(),
            node: config.omni_node.clone(),
            para_id: 1000,
            preset: "development".to_string(),
            relay_chain: None,
            patches,
            base_path: config.chainspec_dir.join(format!("{}-base.json", stem)),
            patched_path: config.chainspec_dir.join(format!("{}-patched.json", stem)),
            output: config.chainspec_dir.join(format!("{}.json", stem)),
            build_runtime: !flags.no_build,
            force: flags.force,
        })
    }
}

/// The retester overlay replaces the dev endowment; everything else gets
/// the dev account plus any custom patch.
fn patches_for(flags: &BuildFlags) -> Result<PatchSpec> {
    let patches = PatchSpec {
        retester: flags.retester,
        dev_balance: !flags.retester,
        dev_stakers: true,
        custom_patch: flags.custom_patch.clone(),
    };
    patches.validate()?;
    Ok(patches)
}

/// Location of a wasm-builder artifact inside a runtime checkout.
fn runtime_wasm(dir: &Path, package: &str) -> PathBuf {
    dir.join("target")
        .join("debug")
        .join("wbuild")
        .join(package)
        .join(format!("{}.wasm", package.replace('-', "_")))
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Built,
    /// The existing raw spec already embeds the current runtime.
    Skipped,
}

/// Run one recipe end to end.
///
/// Stages run strictly in sequence. Concurrent invocations targeting the
/// same output path are not synchronized against each other; callers run
/// one build per output path at a time.
pub async fn run(recipe: &BuildRecipe, config: &Config) -> Result<Outcome> {
    if let Some(path) = &recipe.patches.custom_patch {
        if !path.exists() {
            return Err(PipelineError::MissingFile { path: path.clone() });
        }
    }

    if recipe.build_runtime {
        builder::cargo_build(&CargoBuild {
            manifest_path: recipe.manifest_path.clone(),
            package: recipe.package.clone(),
            release: false,
            quiet: true,
        })
        .await?;
    }

    if !recipe.force {
        if let Freshness::Fresh = freshness::check(&recipe.runtime, &recipe.output).await {
            info!(
                "{} raw spec already embeds the current runtime, skipping",
                recipe.name
            );
            return Ok(Outcome::Skipped);
        }
    }

    builder::create_spec(&CreateSpec {
        binary: recipe.builder.clone(),
        para_id: recipe.para_id,
        runtime: recipe.runtime.clone(),
        preset: recipe.preset.clone(),
        relay_chain: recipe.relay_chain.clone(),
        output: recipe.base_path.clone(),
    })
    .await?;
    patch::patch_chain_spec(&recipe.base_path, &recipe.patched_path, &recipe.patches, config)
        .await?;
    raw::build_raw(&recipe.node, &recipe.patched_path, &recipe.output).await?;
    Ok(Outcome::Built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            polkadot_sdk_dir: dir.path().join("polkadot-sdk"),
            paseo_dir: dir.path().join("paseo"),
            runtimes_dir: dir.path().join("runtimes"),
            retester_dir: dir.path().join("retester"),
            chainspec_dir: dir.path().join("chainspecs"),
            retester_patch: dir.path().join("retester/retester-chainspec-patch.json"),
            chain_spec_builder: PathBuf::from("chain-spec-builder"),
            omni_node: PathBuf::from("polkadot-omni-node"),
        }
    }

    fn with_sdk_checkout(dir: &TempDir) -> Config {
        let config = config_in(dir);
        fs::create_dir_all(config.polkadot_sdk_dir.join(".git")).unwrap();
        fs::create_dir_all(&config.paseo_dir).unwrap();
        fs::create_dir_all(&config.runtimes_dir).unwrap();
        config
    }

    #[test]
    fn westend_recipe_points_at_the_sdk_checkout() {
        let dir = TempDir::new().unwrap();
        let config = with_sdk_checkout(&dir);
        let recipe = BuildRecipe::westend(&config, &BuildFlags::default()).unwrap();

        assert_eq!(recipe.package, "asset-hub-westend-runtime");
        assert_eq!(
            recipe.runtime,
            config
                .polkadot_sdk_dir
                .join("target/debug/wbuild/asset-hub-westend-runtime/asset_hub_westend_runtime.wasm")
        );
        assert_eq!(recipe.para_id, 1000);
        assert_eq!(recipe.preset, "development");
        assert_eq!(recipe.builder, PathBuf::from("chain-spec-builder"));
        assert_eq!(recipe.output, config.chainspec_dir.join("ah-westend-spec.json"));
        assert!(recipe.patches.dev_balance);
        assert!(recipe.patches.dev_stakers);
        assert!(!recipe.patches.retester);
    }

    #[test]
    fn retester_flag_switches_builder_patches_and_artifact_names() {
        let dir = TempDir::new().unwrap();
        let config = with_sdk_checkout(&dir);
        let flags = BuildFlags {
            retester: true,
            ..BuildFlags::default()
        };
        let recipe = BuildRecipe::westend(&config, &flags).unwrap();

        assert_eq!(recipe.builder, PathBuf::from("polkadot-omni-node"));
        assert!(recipe.patches.retester);
        assert!(!recipe.patches.dev_balance);
        assert!(recipe.patches.dev_stakers);
        assert_eq!(
            recipe.output,
            config.chainspec_dir.join("ah-westend-retester-spec.json")
        );
        assert_eq!(
            recipe.base_path,
            config.chainspec_dir.join("ah-westend-retester-spec-base.json")
        );
    }

    #[test]
    fn retester_with_custom_patch_is_rejected_up_front() {
        let dir = TempDir::new().unwrap();
        let config = with_sdk_checkout(&dir);
        let flags = BuildFlags {
            retester: true,
            custom_patch: Some(dir.path().join("extra.json")),
            ..BuildFlags::default()
        };
        assert!(matches!(
            BuildRecipe::westend(&config, &flags),
            Err(PipelineError::PatchConflict)
        ));
    }

    #[test]
    fn westend_requires_a_git_checkout_not_just_a_directory() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::create_dir_all(&config.polkadot_sdk_dir).unwrap();

        assert!(matches!(
            BuildRecipe::westend(&config, &BuildFlags::default()),
            Err(PipelineError::NotCheckout { .. })
        ));
    }

    #[test]
    fn relay_runtimes_share_the_runtimes_checkout() {
        let dir = TempDir::new().unwrap();
        let config = with_sdk_checkout(&dir);

        let polkadot = BuildRecipe::polkadot(&config, &BuildFlags::default()).unwrap();
        let kusama = BuildRecipe::kusama(&config, &BuildFlags::default()).unwrap();
        assert_eq!(polkadot.manifest_path, config.runtimes_dir.join("Cargo.toml"));
        assert_eq!(kusama.manifest_path, config.runtimes_dir.join("Cargo.toml"));
        assert_eq!(polkadot.output, config.chainspec_dir.join("ah-polkadot-spec.json"));
        assert_eq!(kusama.output, config.chainspec_dir.join("ah-kusama-spec.json"));
    }

    #[test]
    fn missing_network_dir_is_reported_with_its_label() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let err = BuildRecipe::paseo(&config, &BuildFlags::default()).unwrap_err();
        assert!(err.to_string().contains("PASEO_DIR"));
    }
}
