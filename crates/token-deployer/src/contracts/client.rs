//! ABI-driven calls against a deployed token.

use crate::models::{TokenInfo, TransferReport};
use crate::types::error::{Error, Result};
use crate::utils::to_base_units;
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, Bytes, U256};
use deployer_account::Account;
use deployer_delivery::{ChainInterface, Payload, TransactionExecutor, TransactionReceipt};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Client for one deployed contract.
///
/// Read-only methods go through `eth_call` and never create a transaction.
/// State-changing methods are submitted through the [`TransactionExecutor`]
/// with a fixed gas limit.
#[derive(Clone)]
pub struct ContractClient {
	executor: Arc<TransactionExecutor>,
	address: Address,
	abi: JsonAbi,
	call_gas_limit: u64,
}

impl ContractClient {
	pub fn new(
		executor: Arc<TransactionExecutor>,
		address: Address,
		abi: JsonAbi,
		call_gas_limit: u64,
	) -> Self {
		Self {
			executor,
			address,
			abi,
			call_gas_limit,
		}
	}

	pub fn address(&self) -> Address {
		self.address
	}

	fn chain(&self) -> &Arc<dyn ChainInterface> {
		self.executor.chain()
	}

	fn function(&self, method: &str) -> Result<&Function> {
		self.abi
			.function(method)
			.and_then(|overloads| overloads.first())
			.ok_or_else(|| Error::InvalidAbi(format!("function '{method}' not found in ABI")))
	}

	/// Calldata for `method(args)`.
	pub fn encode(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes> {
		let function = self.function(method)?;
		function
			.abi_encode_input(args)
			.map(Bytes::from)
			.map_err(|e| Error::ContractCallFailed(format!("Failed to encode {method}: {e}")))
	}

	/// Executes a read-only call and decodes its outputs.
	pub async fn call(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
		let function = self.function(method)?;
		let data = self.encode(method, args)?;
		let result = self.chain().call(self.address, data).await?;
		function
			.abi_decode_output(&result)
			.map_err(|e| Error::ContractCallFailed(format!("Failed to decode {method}: {e}")))
	}

	/// Submits a state-changing call from `account` and waits for it to be mined.
	#[instrument(skip(self, args, account), fields(contract = %self.address))]
	pub async fn send(
		&self,
		method: &str,
		args: &[DynSolValue],
		account: &Account,
	) -> Result<TransactionReceipt> {
		let data = self.encode(method, args)?;
		let receipt = self
			.executor
			.build_and_send(
				account,
				Payload::Call {
					to: self.address,
					data,
				},
				self.call_gas_limit,
			)
			.await?;
		debug!(method, tx_hash = %receipt.hash, "Contract call confirmed");
		Ok(receipt)
	}

	async fn call_single(&self, method: &str, args: &[DynSolValue]) -> Result<DynSolValue> {
		self.call(method, args)
			.await?
			.into_iter()
			.next()
			.ok_or_else(|| Error::ContractCallFailed(format!("{method} returned no value")))
	}

	async fn call_string(&self, method: &str) -> Result<String> {
		match self.call_single(method, &[]).await? {
			DynSolValue::String(value) => Ok(value),
			other => Err(Error::ContractCallFailed(format!(
				"{method} returned {other:?}, expected string"
			))),
		}
	}

	async fn call_uint(&self, method: &str, args: &[DynSolValue]) -> Result<U256> {
		self.call_single(method, args)
			.await?
			.as_uint()
			.map(|(value, _)| value)
			.ok_or_else(|| Error::ContractCallFailed(format!("{method} did not return a uint")))
	}

	pub async fn name(&self) -> Result<String> {
		self.call_string("name").await
	}

	pub async fn symbol(&self) -> Result<String> {
		self.call_string("symbol").await
	}

	pub async fn decimals(&self) -> Result<u8> {
		let value = self.call_uint("decimals", &[]).await?;
		if value > U256::from(u8::MAX) {
			return Err(Error::ContractCallFailed(format!(
				"decimals {value} out of range"
			)));
		}
		Ok(value.to::<u8>())
	}

	pub async fn total_supply(&self) -> Result<U256> {
		self.call_uint("totalSupply", &[]).await
	}

	pub async fn balance_of(&self, owner: Address) -> Result<U256> {
		self.call_uint("balanceOf", &[DynSolValue::Address(owner)])
			.await
	}

	pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
		self.call_uint(
			"allowance",
			&[DynSolValue::Address(owner), DynSolValue::Address(spender)],
		)
		.await
	}

	/// Reads name, symbol, decimals and total supply.
	pub async fn token_info(&self) -> Result<TokenInfo> {
		Ok(TokenInfo {
			address: self.address,
			name: self.name().await?,
			symbol: self.symbol().await?,
			decimals: self.decimals().await?,
			total_supply: self.total_supply().await?,
		})
	}

	/// Transfers `amount` whole tokens from `account` to `to`.
	///
	/// The sender's balance is checked first; when it is short, no
	/// transaction is built and [`Error::InsufficientBalance`] is returned.
	#[instrument(skip(self, account), fields(from = %account.address()))]
	pub async fn transfer(
		&self,
		to: Address,
		amount: &str,
		account: &Account,
	) -> Result<TransferReport> {
		let decimals = self.decimals().await?;
		let required = to_base_units(amount, decimals)?;
		let from = account.address();
		let available = self.balance_of(from).await?;
		if available < required {
			return Err(Error::InsufficientBalance {
				available,
				required,
			});
		}

		let receipt = self
			.send(
				"transfer",
				&[DynSolValue::Address(to), DynSolValue::Uint(required, 256)],
				account,
			)
			.await?;
		info!(to = %to, amount = %required, tx_hash = %receipt.hash, "Transfer confirmed");

		Ok(TransferReport {
			receipt,
			from,
			to,
			amount: required,
			sender_balance: self.balance_of(from).await?,
			recipient_balance: self.balance_of(to).await?,
		})
	}

	/// Approves `spender` for `amount` whole tokens.
	pub async fn approve(
		&self,
		spender: Address,
		amount: &str,
		account: &Account,
	) -> Result<TransactionReceipt> {
		let decimals = self.decimals().await?;
		let value = to_base_units(amount, decimals)?;
		self.send(
			"approve",
			&[DynSolValue::Address(spender), DynSolValue::Uint(value, 256)],
			account,
		)
		.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{token_artifact, DEV_KEY};
	use alloy_consensus::{TxEnvelope, TxLegacy};
	use alloy_eips::eip2718::Decodable2718;
	use alloy_primitives::{TxKind, B256};
	use deployer_delivery::{DeliveryError, ExecutorSettings, MockChainInterface};
	use std::collections::HashMap;
	use std::sync::atomic::{AtomicBool, Ordering};
	use std::time::Duration;

	fn token() -> Address {
		Address::repeat_byte(0x42)
	}

	fn outputs(values: Vec<DynSolValue>) -> Bytes {
		Bytes::from(DynSolValue::Tuple(values).abi_encode_params())
	}

	/// Answers `eth_call` by selector from a fixed table.
	fn with_calls(chain: &mut MockChainInterface, answers: Vec<(&str, Bytes)>) {
		let abi = token_artifact().abi;
		let table: HashMap<[u8; 4], Bytes> = answers
			.into_iter()
			.map(|(method, data)| (abi.function(method).unwrap()[0].selector().0, data))
			.collect();
		chain.expect_call().returning(move |to, data| {
			assert_eq!(to, token());
			let mut selector = [0u8; 4];
			selector.copy_from_slice(&data[..4]);
			let answer = table.get(&selector).cloned();
			Box::pin(async move {
				answer.ok_or_else(|| DeliveryError::Network("unexpected call".into()))
			})
		});
	}

	fn client(chain: MockChainInterface) -> ContractClient {
		let executor = TransactionExecutor::new(
			Arc::new(chain),
			ExecutorSettings {
				poll_interval: Duration::from_millis(1),
				confirmation_timeout: Duration::from_millis(100),
			},
		);
		ContractClient::new(Arc::new(executor), token(), token_artifact().abi, 200_000)
	}

	/// Decodes a raw signed legacy transaction.
	fn submitted(raw: &Bytes) -> TxLegacy {
		let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
		envelope.as_legacy().unwrap().tx().clone()
	}

	/// Node that accepts exactly one submission and mines it successfully.
	fn expect_one_submission(
		chain: &mut MockChainInterface,
		check: impl Fn(&TxLegacy) + Send + Sync + 'static,
	) {
		chain
			.expect_transaction_count()
			.returning(|_| Box::pin(async move { Ok(4) }));
		chain
			.expect_gas_price()
			.returning(|| Box::pin(async move { Ok(1_000_000_000) }));
		chain
			.expect_chain_id()
			.returning(|| Box::pin(async move { Ok(11155111) }));
		chain
			.expect_send_raw_transaction()
			.times(1)
			.returning(move |raw| {
				check(&submitted(&raw));
				Box::pin(async move { Ok(B256::repeat_byte(0xa1)) })
			});
		chain.expect_transaction_receipt().returning(|hash| {
			Box::pin(async move {
				Ok(Some(TransactionReceipt {
					hash,
					success: true,
					contract_address: None,
					block_number: 9,
					gas_used: 46_000,
					logs: vec![],
				}))
			})
		});
	}

	fn eighteen_decimals(tokens: u64) -> U256 {
		U256::from(tokens) * U256::from(10u8).pow(U256::from(18))
	}

	#[tokio::test]
	async fn test_token_info() {
		let mut chain = MockChainInterface::new();
		with_calls(
			&mut chain,
			vec![
				("name", outputs(vec![DynSolValue::String("MyToken".into())])),
				("symbol", outputs(vec![DynSolValue::String("MTK".into())])),
				("decimals", outputs(vec![DynSolValue::Uint(U256::from(18), 8)])),
				(
					"totalSupply",
					outputs(vec![DynSolValue::Uint(eighteen_decimals(1_000_000), 256)]),
				),
			],
		);

		let info = client(chain).token_info().await.unwrap();
		assert_eq!(info.name, "MyToken");
		assert_eq!(info.symbol, "MTK");
		assert_eq!(info.decimals, 18);
		assert_eq!(info.total_supply, eighteen_decimals(1_000_000));
		assert_eq!(info.formatted_supply(), "1000000.0");
	}

	#[tokio::test]
	async fn test_unknown_method_is_invalid_abi() {
		let chain = MockChainInterface::new();
		let result = client(chain).call("mint", &[]).await;
		assert!(matches!(result, Err(Error::InvalidAbi(_))));
	}

	#[tokio::test]
	async fn test_bad_arguments_fail_encoding() {
		let chain = MockChainInterface::new();
		let result = client(chain).encode("balanceOf", &[DynSolValue::Bool(true)]);
		assert!(matches!(result, Err(Error::ContractCallFailed(_))));
	}

	#[tokio::test]
	async fn test_transfer_guard_submits_nothing() {
		let account = Account::from_private_key(DEV_KEY).unwrap();
		let mut chain = MockChainInterface::new();
		with_calls(
			&mut chain,
			vec![
				("decimals", outputs(vec![DynSolValue::Uint(U256::from(18), 8)])),
				(
					"balanceOf",
					outputs(vec![DynSolValue::Uint(eighteen_decimals(50), 256)]),
				),
			],
		);
		chain.expect_transaction_count().times(0);
		chain.expect_send_raw_transaction().times(0);

		let result = client(chain)
			.transfer(Address::repeat_byte(0x07), "100", &account)
			.await;

		match result {
			Err(Error::InsufficientBalance {
				available,
				required,
			}) => {
				assert_eq!(available, eighteen_decimals(50));
				assert_eq!(required, eighteen_decimals(100));
			},
			other => panic!("expected InsufficientBalance, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_transfer_submits_and_reports_balances() {
		let account = Account::from_private_key(DEV_KEY).unwrap();
		let recipient = Address::repeat_byte(0x07);
		let sent = Arc::new(AtomicBool::new(false));
		let mut chain = MockChainInterface::new();

		let abi = token_artifact().abi;
		let decimals_selector = abi.function("decimals").unwrap()[0].selector();
		let expected_calldata = client(MockChainInterface::new())
			.encode(
				"transfer",
				&[
					DynSolValue::Address(recipient),
					DynSolValue::Uint(eighteen_decimals(100), 256),
				],
			)
			.unwrap();

		// Balances change once the transfer has been sent.
		let observed = sent.clone();
		chain.expect_call().returning(move |_, data| {
			let answer = if data[..4] == decimals_selector[..] {
				outputs(vec![DynSolValue::Uint(U256::from(18), 8)])
			} else {
				let owner = Address::from_slice(&data[16..36]);
				let done = observed.load(Ordering::SeqCst);
				let balance = match (owner == recipient, done) {
					(false, false) => eighteen_decimals(1_000_000),
					(false, true) => eighteen_decimals(999_900),
					(true, false) => U256::ZERO,
					(true, true) => eighteen_decimals(100),
				};
				outputs(vec![DynSolValue::Uint(balance, 256)])
			};
			Box::pin(async move { Ok(answer) })
		});
		chain
			.expect_transaction_count()
			.returning(|_| Box::pin(async move { Ok(1) }));
		chain
			.expect_gas_price()
			.returning(|| Box::pin(async move { Ok(1_000_000_000) }));
		chain
			.expect_chain_id()
			.returning(|| Box::pin(async move { Ok(11155111) }));
		let marker = sent.clone();
		let calldata = expected_calldata.clone();
		chain
			.expect_send_raw_transaction()
			.times(1)
			.returning(move |raw| {
				marker.store(true, Ordering::SeqCst);
				let tx = submitted(&raw);
				assert_eq!(tx.input, calldata);
				assert_eq!(tx.to, TxKind::Call(token()));
				assert_eq!(tx.gas_limit, 200_000);
				Box::pin(async move { Ok(B256::repeat_byte(0x99)) })
			});
		chain.expect_transaction_receipt().returning(|hash| {
			Box::pin(async move {
				Ok(Some(TransactionReceipt {
					hash,
					success: true,
					contract_address: None,
					block_number: 5,
					gas_used: 51_000,
					logs: vec![],
				}))
			})
		});

		let report = client(chain)
			.transfer(recipient, "100", &account)
			.await
			.unwrap();

		assert_eq!(report.receipt.hash, B256::repeat_byte(0x99));
		assert_eq!(report.amount, eighteen_decimals(100));
		assert_eq!(report.sender_balance, eighteen_decimals(999_900));
		assert_eq!(report.recipient_balance, eighteen_decimals(100));
		assert_eq!(&expected_calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
	}

	#[tokio::test]
	async fn test_approve_submits_base_units() {
		let account = Account::from_private_key(DEV_KEY).unwrap();
		let spender = Address::repeat_byte(0x0c);
		let mut chain = MockChainInterface::new();
		with_calls(
			&mut chain,
			vec![("decimals", outputs(vec![DynSolValue::Uint(U256::from(6), 8)]))],
		);

		let expected = client(MockChainInterface::new())
			.encode(
				"approve",
				&[
					DynSolValue::Address(spender),
					DynSolValue::Uint(U256::from(2_500_000u64), 256),
				],
			)
			.unwrap();
		expect_one_submission(&mut chain, move |tx| {
			assert_eq!(tx.input, expected);
			assert_eq!(tx.to, TxKind::Call(token()));
			assert_eq!(tx.nonce, 4);
			assert_eq!(tx.gas_limit, 200_000);
		});

		let receipt = client(chain)
			.approve(spender, "2.5", &account)
			.await
			.unwrap();
		assert_eq!(receipt.hash, B256::repeat_byte(0xa1));
	}

	#[tokio::test]
	async fn test_approve_rejects_excess_precision() {
		let account = Account::from_private_key(DEV_KEY).unwrap();
		let mut chain = MockChainInterface::new();
		with_calls(
			&mut chain,
			vec![("decimals", outputs(vec![DynSolValue::Uint(U256::from(2), 8)]))],
		);
		chain.expect_send_raw_transaction().times(0);

		let result = client(chain)
			.approve(Address::repeat_byte(0x0c), "1.234", &account)
			.await;
		assert!(matches!(result, Err(Error::InvalidAmount(_))));
	}

	#[tokio::test]
	async fn test_allowance_decodes_owner_spender_value() {
		let owner = Address::repeat_byte(0x01);
		let spender = Address::repeat_byte(0x02);
		let mut chain = MockChainInterface::new();
		chain.expect_call().times(1).returning(move |to, data| {
			assert_eq!(to, token());
			// selector, then two left-padded address words
			assert_eq!(Address::from_slice(&data[16..36]), owner);
			assert_eq!(Address::from_slice(&data[48..68]), spender);
			let answer = outputs(vec![DynSolValue::Uint(U256::from(777u64), 256)]);
			Box::pin(async move { Ok(answer) })
		});

		let allowance = client(chain).allowance(owner, spender).await.unwrap();
		assert_eq!(allowance, U256::from(777u64));
	}
}
