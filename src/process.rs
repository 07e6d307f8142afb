//! Thin subprocess layer for the external tools the pipeline drives
//! (cargo, chain-spec-builder, the node binaries).

use std::path::Path;
use std::process::Stdio;

use log::info;
use tokio::process::Command;

use crate::error::{PipelineError, Result};

/// Run a command and return its stdout as text. Stderr stays attached to
/// the terminal so tool diagnostics reach the user unbuffered.
pub async fn capture(program: &Path, args: &[String]) -> Result<String> {
    info!("> {} {}", program.display(), args.join(" "));
    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .await
        .map_err(|e| PipelineError::io(program, e))?;
    if !output.status.success() {
        return Err(PipelineError::Tool {
            tool: program.display().to_string(),
            status: output.status,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a command with fully inherited stdio. Used for cargo builds, whose
/// progress output belongs on the terminal.
pub async fn exec(program: &Path, args: &[String]) -> Result<()> {
    info!("> {} {}", program.display(), args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|e| PipelineError::io(program, e))?;
    if !status.success() {
        return Err(PipelineError::Tool {
            tool: program.display().to_string(),
            status,
        });
    }
    Ok(())
}
