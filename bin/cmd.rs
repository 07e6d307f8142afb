use std::path::PathBuf;

use structopt::StructOpt;

/// Manage dev chain specs for the revive development environment
#[derive(StructOpt, Debug)]
#[structopt(name = "revive-specgen")]
pub struct Opt {
    /// TOML config file overriding directory and binary defaults
    #[structopt(short, long, name = "FILE")]
    pub config: Option<PathBuf>,

    #[structopt(subcommand)]
    pub cmd: Cmd,
}

#[derive(StructOpt, Debug)]
pub enum Cmd {
    /// Build the asset-hub-westend raw dev spec
    Westend(BuildOpts),
    /// Build the asset-hub-paseo raw dev spec
    Paseo(BuildOpts),
    /// Build the asset-hub-polkadot raw dev spec
    Polkadot(BuildOpts),
    /// Build the asset-hub-kusama raw dev spec
    Kusama(BuildOpts),
    /// Generate and patch the revive-dev-node chain spec
    DevNode(DevNodeOpts),
    /// Apply genesis patches to an existing chain spec file
    Patch(PatchOpts),
    /// Convert a patched chain spec to raw storage form
    Raw(RawOpts),
    /// Report whether a raw spec embeds a runtime's current bytes
    Check(CheckOpts),
}

#[derive(StructOpt, Debug)]
pub struct BuildOpts {
    /// Merge the retester genesis overlay (specs built by polkadot-omni-node)
    #[structopt(long)]
    pub retester: bool,

    /// Custom genesis patch merged into the revive config
    #[structopt(long, name = "PATCH")]
    pub patch: Option<PathBuf>,

    /// Rebuild even when the raw spec already embeds the current runtime
    #[structopt(long)]
    pub force: bool,

    /// Skip the cargo build of the runtime package
    #[structopt(long)]
    pub no_build: bool,
}

#[derive(StructOpt, Debug)]
pub struct DevNodeOpts {
    /// Use the release profile for revive-dev-node
    #[structopt(long)]
    pub release: bool,

    /// Merge the retester genesis overlay
    #[structopt(long)]
    pub retester: bool,

    /// Custom genesis patch merged into the revive config
    #[structopt(long, name = "PATCH")]
    pub patch: Option<PathBuf>,

    /// Skip the cargo build of revive-dev-node
    #[structopt(long)]
    pub no_build: bool,
}

#[derive(StructOpt, Debug)]
pub struct PatchOpts {
    /// Chain spec to patch
    #[structopt(name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the patched spec
    #[structopt(name = "OUTPUT")]
    pub output: PathBuf,

    /// Merge the retester genesis overlay
    #[structopt(long)]
    pub retester: bool,

    /// Endow the dev account
    #[structopt(long)]
    pub dev_balance: bool,

    /// Disable the synthetic dev staker set
    #[structopt(long)]
    pub dev_stakers: bool,

    /// Custom genesis patch merged into the revive config
    #[structopt(long, name = "PATCH")]
    pub patch: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct RawOpts {
    /// Patched chain spec to convert
    #[structopt(name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the raw spec
    #[structopt(name = "OUTPUT")]
    pub output: PathBuf,

    /// Node binary running build-spec (default: polkadot-omni-node)
    #[structopt(long, name = "BIN")]
    pub node: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct CheckOpts {
    /// Runtime binary whose bytes should be embedded
    #[structopt(name = "RUNTIME")]
    pub runtime: PathBuf,

    /// Raw chain spec to inspect
    #[structopt(name = "SPEC")]
    pub spec: PathBuf,
}
