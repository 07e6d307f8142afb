mod cmd;

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use log::{debug, info};
use structopt::StructOpt;

use revive_specgen::builder::{self, CargoBuild};
use revive_specgen::config::{validate_checkout, Config};
use revive_specgen::error::PipelineError;
use revive_specgen::freshness::{self, Freshness};
use revive_specgen::patch::{self, PatchSpec};
use revive_specgen::pipeline::{self, BuildFlags, BuildRecipe, Outcome};
use revive_specgen::raw;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = cmd::Opt::from_args();
    let config = Config::load(opt.config.as_deref())?;
    debug!("config: {:#?}", config);

    match opt.cmd {
        cmd::Cmd::Westend(opts) => {
            build_network(BuildRecipe::westend(&config, &flags(&opts))?, &config).await
        }
        cmd::Cmd::Paseo(opts) => {
            build_network(BuildRecipe::paseo(&config, &flags(&opts))?, &config).await
        }
        cmd::Cmd::Polkadot(opts) => {
            build_network(BuildRecipe::polkadot(&config, &flags(&opts))?, &config).await
        }
        cmd::Cmd::Kusama(opts) => {
            build_network(BuildRecipe::kusama(&config, &flags(&opts))?, &config).await
        }
        cmd::Cmd::DevNode(opts) => dev_node(&opts, &config).await,
        cmd::Cmd::Patch(opts) => patch_file(&opts, &config).await,
        cmd::Cmd::Raw(opts) => {
            ensure_exists(&opts.input)?;
            let node = opts.node.unwrap_or_else(|| config.omni_node.clone());
            raw::build_raw(&node, &opts.input, &opts.output).await?;
            Ok(())
        }
        cmd::Cmd::Check(opts) => check(&opts).await,
    }
}

fn flags(opts: &cmd::BuildOpts) -> BuildFlags {
    BuildFlags {
        retester: opts.retester,
        custom_patch: opts.patch.clone(),
        force: opts.force,
        no_build: opts.no_build,
    }
}

async fn build_network(recipe: BuildRecipe, config: &Config) -> Result<()> {
    if let Outcome::Built = pipeline::run(&recipe, config).await? {
        info!("{} raw spec ready at {}", recipe.name, recipe.output.display());
    }
    Ok(())
}

/// The dev node writes its own spec via `build-spec --dev`; no raw
/// conversion and no freshness gate apply.
async fn dev_node(opts: &cmd::DevNodeOpts, config: &Config) -> Result<()> {
    validate_checkout(&config.polkadot_sdk_dir, "POLKADOT_SDK_DIR")?;

    let patches = PatchSpec {
        retester: opts.retester,
        dev_balance: false,
        dev_stakers: false,
        custom_patch: opts.patch.clone(),
    };
    patches.validate()?;
    if let Some(path) = &patches.custom_patch {
        ensure_exists(path)?;
    }

    if !opts.no_build {
        builder::cargo_build(&CargoBuild {
            manifest_path: config.polkadot_sdk_dir.join("Cargo.toml"),
            package: "revive-dev-node".to_string(),
            release: opts.release,
            quiet: false,
        })
        .await?;
    }

    let profile = if opts.release { "release" } else { "debug" };
    let binary = config
        .polkadot_sdk_dir
        .join("target")
        .join(profile)
        .join("revive-dev-node");

    let base = config.chainspec_dir.join("revive-dev-node-chainspec-base.json");
    let output = config.chainspec_dir.join("revive-dev-node-chainspec.json");
    builder::dev_node_spec(&binary, &base).await?;
    patch::patch_chain_spec(&base, &output, &patches, config).await?;
    Ok(())
}

async fn patch_file(opts: &cmd::PatchOpts, config: &Config) -> Result<()> {
    let patches = PatchSpec {
        retester: opts.retester,
        dev_balance: opts.dev_balance,
        dev_stakers: opts.dev_stakers,
        custom_patch: opts.patch.clone(),
    };
    patches.validate()?;
    ensure_exists(&opts.input)?;
    if let Some(path) = &patches.custom_patch {
        ensure_exists(path)?;
    }
    patch::patch_chain_spec(&opts.input, &opts.output, &patches, config).await?;
    Ok(())
}

async fn check(opts: &cmd::CheckOpts) -> Result<()> {
    let verdict = match freshness::check(&opts.runtime, &opts.spec).await {
        Freshness::Fresh => {
            println!("fresh");
            return Ok(());
        }
        Freshness::Stale => "stale",
        Freshness::Unknown => "unknown",
    };
    println!("{}", verdict);
    std::io::stdout().flush()?;
    std::process::exit(1);
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(PipelineError::MissingFile {
            path: path.to_path_buf(),
        }
        .into())
    }
}
