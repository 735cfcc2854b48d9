//! Shared handles created once per process from configuration.

use crate::compiler::{CompilationCache, CompileRequest, CompilerInterface, SolcToolchain};
use crate::contracts::ContractClient;
use crate::core::{EventBus, Storage};
use crate::models::CompiledArtifact;
use crate::types::{
	error::{Error, Result},
	Hex,
};
use alloy_primitives::Address;
use deployer_account::{Account, AccountStore};
use deployer_config::{Config, ADDRESS_FILE};
use deployer_delivery::{
	implementations::evm::alloy::AlloyChain, ChainInterface, ExecutorSettings, TransactionExecutor,
};
use std::sync::Arc;
use tracing::info;

/// Everything an operation needs: configuration, the node client, the
/// transaction executor, the compiler and the persisted state locations.
pub struct Context {
	pub config: Config,
	pub chain: Arc<dyn ChainInterface>,
	pub executor: Arc<TransactionExecutor>,
	pub compiler: Arc<dyn CompilerInterface>,
	pub accounts: AccountStore,
	pub storage: Storage,
	pub events: EventBus,
}

impl Context {
	/// Builds a context around explicit chain and compiler implementations.
	pub fn new(
		config: Config,
		chain: Arc<dyn ChainInterface>,
		compiler: Arc<dyn CompilerInterface>,
	) -> Self {
		let executor = Arc::new(TransactionExecutor::new(
			chain.clone(),
			ExecutorSettings {
				poll_interval: config.transaction.poll_interval(),
				confirmation_timeout: config.transaction.confirmation_timeout(),
			},
		));
		let accounts = AccountStore::new(config.account_path());
		let storage = Storage::new(&config.build.dir);

		Self {
			config,
			chain,
			executor,
			compiler,
			accounts,
			storage,
			events: EventBus::default(),
		}
	}

	/// Builds a context talking to the configured RPC node and `solc`.
	pub fn from_config(config: Config) -> Result<Self> {
		let chain = AlloyChain::new(&config.network.rpc_url)?;
		let compiler = SolcToolchain::new(config.compiler.solc_path.clone());
		Ok(Self::new(config, Arc::new(chain), Arc::new(compiler)))
	}

	/// Confirms the node answers and, when configured, is on the expected chain.
	pub async fn check_connection(&self) -> Result<u64> {
		let chain_id = self.chain.chain_id().await?;
		if let Some(expected) = self.config.network.chain_id {
			if expected != chain_id {
				return Err(Error::InvalidConfig(format!(
					"RPC node reports chain {chain_id}, configuration expects {expected}"
				)));
			}
		}
		info!(chain_id, rpc_url = %self.config.network.rpc_url, "Connected to network");
		Ok(chain_id)
	}

	pub fn compilation_cache(&self) -> CompilationCache {
		CompilationCache::new(self.compiler.clone(), self.storage.clone())
	}

	pub fn compile_request(&self) -> CompileRequest {
		CompileRequest::from(&self.config.compiler)
	}

	/// The persisted account. Missing is an error here; only the pipeline creates one.
	pub fn load_account(&self) -> Result<Account> {
		self.accounts
			.load()?
			.ok_or_else(|| Error::AccountNotFound(self.accounts.path().to_path_buf()))
	}

	/// Cached artifact or a fresh compilation.
	pub async fn artifact(&self) -> Result<CompiledArtifact> {
		let (artifact, _) = self
			.compilation_cache()
			.load_or_compile(&self.compile_request())
			.await?;
		Ok(artifact)
	}

	/// Address recorded by a previous deployment.
	///
	/// A record that is not a valid address is a persistence error.
	pub fn deployed_address(&self) -> Result<Option<Address>> {
		match self.storage.load_text(ADDRESS_FILE)? {
			None => Ok(None),
			Some(text) => Hex::to_address(&text).map(Some).map_err(|e| {
				Error::Persistence(format!(
					"{} does not hold a valid address: {e}",
					self.config.address_path().display()
				))
			}),
		}
	}

	pub fn record_deployment(&self, address: Address) -> Result<()> {
		self.storage
			.save_text(ADDRESS_FILE, &address.to_checksum(None))
	}

	pub fn contract_client(&self, address: Address, artifact: &CompiledArtifact) -> ContractClient {
		ContractClient::new(
			self.executor.clone(),
			address,
			artifact.abi.clone(),
			self.config.transaction.call_gas_limit,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::compiler::MockCompilerInterface;
	use crate::testing::test_config;
	use deployer_delivery::MockChainInterface;
	use tempfile::TempDir;

	fn context(dir: &TempDir, chain: MockChainInterface, expected: Option<u64>) -> Context {
		let mut config = test_config(dir.path());
		config.network.chain_id = expected;
		Context::new(config, Arc::new(chain), Arc::new(MockCompilerInterface::new()))
	}

	#[tokio::test]
	async fn test_check_connection_matches_expected_chain() {
		let dir = TempDir::new().unwrap();
		let mut chain = MockChainInterface::new();
		chain
			.expect_chain_id()
			.returning(|| Box::pin(async move { Ok(11155111) }));

		let ctx = context(&dir, chain, Some(11155111));
		assert_eq!(ctx.check_connection().await.unwrap(), 11155111);
	}

	#[tokio::test]
	async fn test_check_connection_rejects_wrong_chain() {
		let dir = TempDir::new().unwrap();
		let mut chain = MockChainInterface::new();
		chain
			.expect_chain_id()
			.returning(|| Box::pin(async move { Ok(1) }));

		let ctx = context(&dir, chain, Some(11155111));
		assert!(matches!(
			ctx.check_connection().await,
			Err(Error::InvalidConfig(_))
		));
	}

	#[test]
	fn test_deployment_record_round_trip() {
		let dir = TempDir::new().unwrap();
		let ctx = context(&dir, MockChainInterface::new(), None);
		assert_eq!(ctx.deployed_address().unwrap(), None);

		let address = Address::repeat_byte(0xab);
		ctx.record_deployment(address).unwrap();
		assert_eq!(ctx.deployed_address().unwrap(), Some(address));

		let raw = std::fs::read_to_string(ctx.config.address_path()).unwrap();
		assert_eq!(raw.len(), 42);
		assert!(raw.starts_with("0x"));
	}

	#[test]
	fn test_malformed_deployment_record() {
		let dir = TempDir::new().unwrap();
		let ctx = context(&dir, MockChainInterface::new(), None);
		std::fs::create_dir_all(&ctx.config.build.dir).unwrap();
		std::fs::write(ctx.config.address_path(), "not-an-address").unwrap();

		assert!(matches!(ctx.deployed_address(), Err(Error::Persistence(_))));
	}

	#[test]
	fn test_load_account_requires_existing_file() {
		let dir = TempDir::new().unwrap();
		let ctx = context(&dir, MockChainInterface::new(), None);
		assert!(matches!(ctx.load_account(), Err(Error::AccountNotFound(_))));

		let account = Account::generate();
		ctx.accounts.save(&account).unwrap();
		assert_eq!(ctx.load_account().unwrap().address(), account.address());
	}
}
