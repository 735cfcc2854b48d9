//! Error types and result handling for the token deployer
//!
//! Every failure surfaced to the CLI is one of the kinds below. Errors from
//! the account, configuration and delivery crates are mapped onto them so
//! callers match on a single enum.

use alloy_primitives::{Address, B256, U256};
use deployer_account::AccountError;
use deployer_config::ConfigError;
use deployer_delivery::{DeliveryError, TransactionReceipt};
use std::path::PathBuf;

/// Convenience Result type alias using the local Error type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	// Network errors
	#[error("RPC connection failed: {0}")]
	Connectivity(String),

	#[error("Transaction {} reverted in block {}", .0.hash, .0.block_number)]
	TransactionReverted(Box<TransactionReceipt>),

	#[error("Transaction {hash} not confirmed within {seconds}s")]
	ConfirmationTimeout { hash: B256, seconds: u64 },

	// Compilation errors
	#[error("Contract source not found: {0}")]
	SourceNotFound(PathBuf),

	#[error("Contract '{name}' not found in compiler output (available: {available})")]
	ContractNotFound { name: String, available: String },

	#[error("Compiler toolchain error: {0}")]
	Toolchain(String),

	// Balance guards
	#[error("Account {address} has no native balance to pay for gas")]
	InsufficientFunds { address: Address },

	#[error("Insufficient token balance: have {available}, need {required}")]
	InsufficientBalance { available: U256, required: U256 },

	// State errors
	#[error("Persistence error: {0}")]
	Persistence(String),

	#[error("No account found at {0}; run `deploy` first")]
	AccountNotFound(PathBuf),

	#[error("No deployed contract recorded at {0}; run `deploy` first")]
	ContractNotDeployed(PathBuf),

	// Config errors
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	// Contract errors
	#[error("Invalid ABI: {0}")]
	InvalidAbi(String),

	#[error("Contract call failed: {0}")]
	ContractCallFailed(String),

	#[error("Deployment failed: {0}")]
	DeploymentFailed(String),

	// Signing errors
	#[error("Invalid private key: {0}")]
	InvalidPrivateKey(String),

	#[error("Signing failed: {0}")]
	SigningFailed(String),

	// Validation errors
	#[error("Invalid hex string: {0}")]
	InvalidHex(String),

	#[error("Invalid address: {0}")]
	InvalidAddress(String),

	#[error("Invalid amount: {0}")]
	InvalidAmount(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl From<DeliveryError> for Error {
	fn from(err: DeliveryError) -> Self {
		match err {
			DeliveryError::Network(msg) => Error::Connectivity(msg),
			DeliveryError::Signing(msg) => Error::SigningFailed(msg),
			DeliveryError::TransactionReverted(receipt) => Error::TransactionReverted(receipt),
			DeliveryError::ConfirmationTimeout { hash, seconds } => {
				Error::ConfirmationTimeout { hash, seconds }
			},
		}
	}
}

impl From<AccountError> for Error {
	fn from(err: AccountError) -> Self {
		match err {
			AccountError::InvalidKey(msg) => Error::InvalidPrivateKey(msg),
			AccountError::SigningFailed(msg) => Error::SigningFailed(msg),
			AccountError::Persistence(msg) => Error::Persistence(msg),
		}
	}
}

impl From<ConfigError> for Error {
	fn from(err: ConfigError) -> Self {
		Error::InvalidConfig(err.to_string())
	}
}
