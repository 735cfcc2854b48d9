//! Single-transaction lifecycle: build, sign, submit, confirm.

use crate::{
	ChainInterface, DeliveryError, Payload, TransactionReceipt, TransactionRequest,
	TransactionStage,
};
use alloy_consensus::{SignableTransaction, TxEnvelope};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, B256};
use deployer_account::Account;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Receipt polling parameters.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorSettings {
	pub poll_interval: Duration,
	pub confirmation_timeout: Duration,
}

impl Default for ExecutorSettings {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_secs(1),
			confirmation_timeout: Duration::from_secs(300),
		}
	}
}

/// Builds, signs, submits and awaits transactions.
///
/// Submissions from the same account are serialized: the nonce is read
/// under a per-address lock that is held until the receipt is interpreted,
/// so two callers can never race for the same nonce.
pub struct TransactionExecutor {
	chain: Arc<dyn ChainInterface>,
	settings: ExecutorSettings,
	account_locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl TransactionExecutor {
	pub fn new(chain: Arc<dyn ChainInterface>, settings: ExecutorSettings) -> Self {
		Self {
			chain,
			settings,
			account_locks: Mutex::new(HashMap::new()),
		}
	}

	pub fn chain(&self) -> &Arc<dyn ChainInterface> {
		&self.chain
	}

	/// Sends `payload` from `account` and waits for it to be mined.
	///
	/// Returns the receipt of a successful transaction. A mined transaction
	/// whose execution failed yields [`DeliveryError::TransactionReverted`]
	/// carrying that receipt.
	#[instrument(skip(self, account, payload), fields(from = %account.address()))]
	pub async fn build_and_send(
		&self,
		account: &Account,
		payload: Payload,
		gas_limit: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		let lock = self.account_lock(account.address());
		let _guard = lock.lock().await;

		let request = self.build(account.address(), payload, gas_limit).await?;
		debug!(
			stage = %TransactionStage::Built,
			nonce = request.nonce,
			gas_price = request.gas_price,
			chain_id = request.chain_id,
			"Transaction built"
		);

		let raw = Self::sign(account, &request).await?;
		debug!(stage = %TransactionStage::Signed, size = raw.len(), "Transaction signed");

		let hash = self.chain.send_raw_transaction(raw).await?;
		info!(stage = %TransactionStage::Submitted, tx_hash = %hash, "Transaction submitted");

		let receipt = self.wait_for_receipt(hash).await?;
		info!(
			stage = %TransactionStage::Confirmed,
			tx_hash = %hash,
			block = receipt.block_number,
			gas_used = receipt.gas_used,
			success = receipt.success,
			"Transaction confirmed"
		);

		if receipt.success {
			Ok(receipt)
		} else {
			Err(DeliveryError::TransactionReverted(Box::new(receipt)))
		}
	}

	/// Polls for the receipt of `hash` until it appears or the timeout elapses.
	///
	/// Errors while polling are logged and polling continues; the
	/// transaction is already in the pool at this point.
	pub async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, DeliveryError> {
		let deadline = Instant::now() + self.settings.confirmation_timeout;

		loop {
			match self.chain.transaction_receipt(hash).await {
				Ok(Some(receipt)) => return Ok(receipt),
				Ok(None) => {},
				Err(e) => warn!(tx_hash = %hash, error = %e, "Receipt lookup failed"),
			}

			if Instant::now() >= deadline {
				return Err(DeliveryError::ConfirmationTimeout {
					hash,
					seconds: self.settings.confirmation_timeout.as_secs(),
				});
			}
			tokio::time::sleep(self.settings.poll_interval).await;
		}
	}

	async fn build(
		&self,
		from: Address,
		payload: Payload,
		gas_limit: u64,
	) -> Result<TransactionRequest, DeliveryError> {
		let nonce = self.chain.transaction_count(from).await?;
		let gas_price = self.chain.gas_price().await?;
		let chain_id = self.chain.chain_id().await?;

		Ok(TransactionRequest {
			from,
			nonce,
			gas_limit,
			gas_price,
			chain_id,
			payload,
		})
	}

	async fn sign(account: &Account, request: &TransactionRequest) -> Result<Bytes, DeliveryError> {
		let mut tx = request.to_legacy();
		let signature = account
			.sign_transaction(&mut tx)
			.await
			.map_err(|e| DeliveryError::Signing(e.to_string()))?;

		let envelope = TxEnvelope::from(tx.into_signed(signature));
		Ok(Bytes::from(envelope.encoded_2718()))
	}

	fn account_lock(&self, address: Address) -> Arc<tokio::sync::Mutex<()>> {
		let mut locks = self
			.account_locks
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		locks.entry(address).or_default().clone()
	}
}
