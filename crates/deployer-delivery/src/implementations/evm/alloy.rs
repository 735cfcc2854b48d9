//! JSON-RPC node access through Alloy.

use crate::{ChainInterface, DeliveryError, Log, TransactionReceipt};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types::TransactionRequest as RpcTransactionRequest;
use async_trait::async_trait;

/// [`ChainInterface`] backed by an HTTP Alloy provider.
///
/// The provider is built without fillers: the executor sets nonce, gas and
/// chain id itself, and every call is a single request with no retry layer.
#[derive(Clone)]
pub struct AlloyChain {
	provider: DynProvider,
	rpc_url: String,
}

impl AlloyChain {
	/// Builds a provider for `rpc_url`. No request is sent until first use.
	pub fn new(rpc_url: &str) -> Result<Self, DeliveryError> {
		let url = rpc_url
			.parse::<url::Url>()
			.map_err(|e| DeliveryError::Network(format!("Invalid RPC URL '{rpc_url}': {e}")))?;

		let client = RpcClient::builder().http(url);
		let provider = ProviderBuilder::new()
			.disable_recommended_fillers()
			.connect_client(client)
			.erased();

		Ok(Self {
			provider,
			rpc_url: rpc_url.to_string(),
		})
	}

	pub fn rpc_url(&self) -> &str {
		&self.rpc_url
	}
}

impl std::fmt::Debug for AlloyChain {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AlloyChain")
			.field("rpc_url", &self.rpc_url)
			.finish()
	}
}

#[async_trait]
impl ChainInterface for AlloyChain {
	async fn chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get chain id: {e}")))
	}

	async fn gas_price(&self) -> Result<u128, DeliveryError> {
		self.provider
			.get_gas_price()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get gas price: {e}")))
	}

	async fn transaction_count(&self, address: Address) -> Result<u64, DeliveryError> {
		self.provider
			.get_transaction_count(address)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get nonce for {address}: {e}")))
	}

	async fn balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get balance of {address}: {e}")))
	}

	async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, DeliveryError> {
		let pending = self
			.provider
			.send_raw_transaction(&raw)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to send transaction: {e}")))?;
		Ok(*pending.tx_hash())
	}

	async fn transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let receipt = self
			.provider
			.get_transaction_receipt(hash)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get receipt for {hash}: {e}")))?;

		Ok(receipt.map(|receipt| {
			let logs = receipt
				.inner
				.logs()
				.iter()
				.map(|log| Log {
					address: log.address(),
					topics: log.topics().to_vec(),
					data: log.inner.data.data.clone(),
				})
				.collect();

			TransactionReceipt {
				hash: receipt.transaction_hash,
				success: receipt.status(),
				contract_address: receipt.contract_address,
				block_number: receipt.block_number.unwrap_or(0),
				gas_used: receipt.gas_used,
				logs,
			}
		}))
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DeliveryError> {
		let request = RpcTransactionRequest::default().to(to).input(data.into());
		self.provider
			.call(request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Call to {to} failed: {e}")))
	}
}
