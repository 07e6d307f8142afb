//! Invocations of the external spec-producing tools: chain-spec-builder,
//! polkadot-omni-node and cargo.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::json::{ensure_parent, write_text};
use crate::process::{capture, exec};

/// Arguments for the builder's `create` subcommand.
#[derive(Debug, Clone)]
pub struct CreateSpec {
    /// chain-spec-builder, or polkadot-omni-node wrapping it.
    pub binary: PathBuf,
    pub para_id: u32,
    /// Runtime wasm embedded into the spec.
    pub runtime: PathBuf,
    /// Genesis preset name baked into the runtime, e.g. "development".
    pub preset: String,
    /// Defaults to "dontcare"; dev chains never talk to a real relay.
    pub relay_chain: Option<String>,
    pub output: PathBuf,
}

/// Build a human-readable chain spec from a runtime binary.
pub async fn create_spec(opts: &CreateSpec) -> Result<()> {
    ensure_parent(&opts.output).await?;
    let stdout = capture(&opts.binary, &create_args(opts)).await?;
    if !stdout.trim().is_empty() {
        info!("{}", stdout.trim());
    }
    Ok(())
}

fn create_args(opts: &CreateSpec) -> Vec<String> {
    let mut args = Vec::new();
    // omni-node embeds the builder as a subcommand with its own output flag
    if opts.binary.to_string_lossy().contains("polkadot-omni-node") {
        args.push("chain-spec-builder".to_string());
        args.push("--chain-spec-path".to_string());
        args.push(opts.output.display().to_string());
    } else {
        args.push("-c".to_string());
        args.push(opts.output.display().to_string());
    }
    args.push("create".to_string());
    args.push("--relay-chain".to_string());
    args.push(
        opts.relay_chain
            .clone()
            .unwrap_or_else(|| "dontcare".to_string()),
    );
    args.push("--para-id".to_string());
    args.push(opts.para_id.to_string());
    args.push("--runtime".to_string());
    args.push(opts.runtime.display().to_string());
    args.push("named-preset".to_string());
    args.push(opts.preset.clone());
    args
}

/// Generate a dev chain spec from a node binary's own `build-spec --dev`
/// and write it verbatim.
pub async fn dev_node_spec(binary: &Path, output: &Path) -> Result<()> {
    let args = vec!["build-spec".to_string(), "--dev".to_string()];
    let stdout = capture(binary, &args).await?;
    write_text(output, &stdout).await
}

/// A `cargo build` of one package inside an external checkout.
#[derive(Debug, Clone)]
pub struct CargoBuild {
    pub manifest_path: PathBuf,
    pub package: String,
    pub release: bool,
    pub quiet: bool,
}

pub async fn cargo_build(opts: &CargoBuild) -> Result<()> {
    exec(Path::new("cargo"), &cargo_args(opts)).await
}

fn cargo_args(opts: &CargoBuild) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "--manifest-path".to_string(),
        opts.manifest_path.display().to_string(),
        "-p".to_string(),
        opts.package.clone(),
    ];
    if opts.release {
        args.push("--release".to_string());
    }
    if opts.quiet {
        args.push("--quiet".to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(binary: &str) -> CreateSpec {
        CreateSpec {
            binary: PathBuf::from(binary),
            para_id: 1000,
            runtime: PathBuf::from("/tmp/runtime.wasm"),
            preset: "development".to_string(),
            relay_chain: None,
            output: PathBuf::from("/tmp/out.json"),
        }
    }

    #[test]
    fn plain_builder_takes_the_output_as_a_global_flag() {
        let args = create_args(&spec("/opt/bin/chain-spec-builder"));
        assert_eq!(
            args,
            vec![
                "-c",
                "/tmp/out.json",
                "create",
                "--relay-chain",
                "dontcare",
                "--para-id",
                "1000",
                "--runtime",
                "/tmp/runtime.wasm",
                "named-preset",
                "development",
            ]
        );
    }

    #[test]
    fn omni_node_nests_the_builder_subcommand() {
        let args = create_args(&spec("/opt/bin/polkadot-omni-node"));
        assert_eq!(&args[..3], &["chain-spec-builder", "--chain-spec-path", "/tmp/out.json"]);
        assert_eq!(args[3], "create");
    }

    #[test]
    fn explicit_relay_chain_replaces_the_placeholder() {
        let mut opts = spec("chain-spec-builder");
        opts.relay_chain = Some("westend".to_string());
        let args = create_args(&opts);
        let at = args.iter().position(|a| a == "--relay-chain").unwrap();
        assert_eq!(args[at + 1], "westend");
    }

    #[test]
    fn cargo_flags_follow_the_requested_profile() {
        let args = cargo_args(&CargoBuild {
            manifest_path: PathBuf::from("/src/sdk/Cargo.toml"),
            package: "asset-hub-westend-runtime".to_string(),
            release: false,
            quiet: true,
        });
        assert_eq!(
            args,
            vec![
                "build",
                "--manifest-path",
                "/src/sdk/Cargo.toml",
                "-p",
                "asset-hub-westend-runtime",
                "--quiet",
            ]
        );

        let args = cargo_args(&CargoBuild {
            manifest_path: PathBuf::from("/src/sdk/Cargo.toml"),
            package: "revive-dev-node".to_string(),
            release: true,
            quiet: false,
        });
        assert!(args.contains(&"--release".to_string()));
        assert!(!args.contains(&"--quiet".to_string()));
    }
}
