//! Operations on an existing deployment
//!
//! Consumed by the CLI alongside the [`crate::pipeline`]. Each handler holds
//! the shared [`crate::Context`].

pub mod diagnostics;
pub mod token;

pub use diagnostics::{DeploymentPlan, DiagnosticOps, TransferPlan};
pub use token::{AccountSummary, GeneratedRecipient, TokenBalance, TokenOps, TransferOutcome};
