//! Chain-spec pipeline for the revive dev environment: build a base spec
//! from a runtime, patch its genesis, convert it to raw storage form and
//! skip the whole dance when the embedded runtime is already current.

pub mod builder;
pub mod config;
pub mod error;
pub mod freshness;
pub mod json;
pub mod patch;
pub mod pipeline;
pub mod process;
pub mod raw;

pub use error::{PipelineError, Result};
