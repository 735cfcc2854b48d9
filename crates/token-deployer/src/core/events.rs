//! Progress events emitted by the deployment pipeline.
//!
//! The pipeline publishes what it does on a broadcast bus instead of
//! printing; the CLI subscribes and renders. Publishing with no subscriber
//! is not an error.

use crate::models::TokenInfo;
use alloy_primitives::{Address, B256, U256};
use std::path::PathBuf;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
	AccountCreated { address: Address },
	AccountLoaded { address: Address },
	CompilationSkipped { path: PathBuf },
	Compiled { contract: String, bytecode_size: usize },
	BalanceChecked { address: Address, balance: U256 },
	/// The account holds no native currency; deployment cannot proceed.
	FundingRequired { address: Address },
	/// Bytecode exceeds the code size limit; deployment is still attempted.
	SizeLimitExceeded { size: usize, limit: usize },
	CostEstimated { gas: u64, cost_wei: U256 },
	DeploymentSkipped { address: Address },
	Deployed {
		address: Address,
		tx_hash: B256,
		gas_used: u64,
	},
	Verified(TokenInfo),
}

/// Broadcast bus for [`PipelineEvent`]s.
pub struct EventBus {
	sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
	/// `capacity` events are buffered per subscriber before the oldest are dropped.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
		self.sender.subscribe()
	}

	pub fn publish(&self, event: PipelineEvent) {
		// No subscribers is fine.
		let _ = self.sender.send(event);
	}
}

impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(64)
	}
}
