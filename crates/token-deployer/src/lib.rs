//! Compile, deploy and exercise an ERC20-style token.
//!
//! The [`pipeline`] drives a resumable workflow from account creation to
//! on-chain verification, persisting every completed stage under the build
//! directory. [`operations`] work against the recorded deployment, and
//! [`cli`] defines the `token-deployer` command line.

pub mod analysis;
pub mod cli;
pub mod compiler;
pub mod constants;
pub mod contracts;
pub mod core;
pub mod models;
pub mod operations;
pub mod pipeline;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;

pub use core::{init_logging, Context, EventBus, PipelineEvent};
pub use pipeline::{DeploymentPipeline, PipelineOutcome};
pub use types::{Error, Result};
