//! Transaction delivery for the token deployer.
//!
//! This crate owns every interaction with the JSON-RPC node. [`ChainInterface`]
//! is the narrow seam over the node (read calls, raw submission, receipt
//! lookup); [`TransactionExecutor`] drives a single transaction through
//! build, sign, submit and confirmation on top of it.

use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

mod executor;

pub use executor::{ExecutorSettings, TransactionExecutor};

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// The node could not be reached or answered with an error.
	#[error("Network error: {0}")]
	Network(String),
	/// The transaction could not be signed.
	#[error("Signing failed: {0}")]
	Signing(String),
	/// The transaction was mined but its execution failed.
	#[error("Transaction {} reverted in block {}", .0.hash, .0.block_number)]
	TransactionReverted(Box<TransactionReceipt>),
	/// No receipt appeared before the confirmation timeout elapsed.
	#[error("Transaction {hash} not confirmed within {seconds}s")]
	ConfirmationTimeout { hash: B256, seconds: u64 },
}

/// What a transaction does: create a contract or call an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
	/// Creation bytecode with ABI-encoded constructor arguments appended.
	Create(Bytes),
	Call { to: Address, data: Bytes },
}

impl Payload {
	fn kind(&self) -> TxKind {
		match self {
			Payload::Create(_) => TxKind::Create,
			Payload::Call { to, .. } => TxKind::Call(*to),
		}
	}

	fn input(&self) -> Bytes {
		match self {
			Payload::Create(code) => code.clone(),
			Payload::Call { data, .. } => data.clone(),
		}
	}
}

/// A fully parameterized, unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
	pub from: Address,
	pub nonce: u64,
	pub gas_limit: u64,
	pub gas_price: u128,
	pub chain_id: u64,
	pub payload: Payload,
}

impl TransactionRequest {
	/// Legacy (EIP-155) transaction carrying no native value.
	pub fn to_legacy(&self) -> TxLegacy {
		TxLegacy {
			chain_id: Some(self.chain_id),
			nonce: self.nonce,
			gas_price: self.gas_price,
			gas_limit: self.gas_limit,
			to: self.payload.kind(),
			value: U256::ZERO,
			input: self.payload.input(),
		}
	}
}

/// Lifecycle of a submission. Only forward transitions happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStage {
	Built,
	Signed,
	Submitted,
	Confirmed,
}

impl std::fmt::Display for TransactionStage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			TransactionStage::Built => "built",
			TransactionStage::Signed => "signed",
			TransactionStage::Submitted => "submitted",
			TransactionStage::Confirmed => "confirmed",
		};
		f.write_str(name)
	}
}

/// Event log emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
	pub hash: B256,
	pub success: bool,
	/// Present only for contract-creation transactions.
	pub contract_address: Option<Address>,
	pub block_number: u64,
	pub gas_used: u64,
	pub logs: Vec<Log>,
}

/// Node operations the deployer depends on.
///
/// Implementations map one method to one JSON-RPC call, without retries.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ChainInterface: Send + Sync {
	/// `eth_chainId`
	async fn chain_id(&self) -> Result<u64, DeliveryError>;

	/// `eth_gasPrice`, in wei.
	async fn gas_price(&self) -> Result<u128, DeliveryError>;

	/// `eth_getTransactionCount` at the latest block.
	async fn transaction_count(&self, address: Address) -> Result<u64, DeliveryError>;

	/// `eth_getBalance`, in wei.
	async fn balance(&self, address: Address) -> Result<U256, DeliveryError>;

	/// `eth_sendRawTransaction`. A returned hash only means the pool accepted it.
	async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, DeliveryError>;

	/// `eth_getTransactionReceipt`; `None` while the transaction is pending.
	async fn transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<TransactionReceipt>, DeliveryError>;

	/// `eth_call` against the latest block.
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DeliveryError>;
}
