//! Resumable compile-and-deploy workflow.
//!
//! The pipeline moves persisted state forward through four stages:
//!
//! ```text
//! NoAccount   -> HasAccount   create and save a keypair
//! HasAccount  -> Compiled     compile and cache the artifact
//! Compiled    -> Deployed     send the creation transaction, record the address
//! Deployed    -> Verified     read name, symbol, decimals and totalSupply
//! ```
//!
//! Every stage whose output is already on disk is skipped, so rerunning
//! after a failure resumes after the last persisted stage. A recorded
//! address is authoritative: the pipeline never deploys a second contract
//! while it exists.

use crate::analysis::{check_size, estimate_deploy_cost};
use crate::compiler::CacheStatus;
use crate::core::{Context, PipelineEvent};
use crate::models::{CompiledArtifact, TokenInfo};
use crate::types::error::{Error, Result};
use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_primitives::{Address, Bytes, U256};
use deployer_account::Account;
use deployer_config::TokenConfig;
use deployer_delivery::{Payload, TransactionReceipt};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Furthest stage reflected by the persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
	NoAccount,
	HasAccount,
	Compiled,
	Deployed,
}

/// How a pipeline run ended.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
	/// The account has no native balance; fund it and rerun.
	FundingRequired { account: Address },
	Verified(DeploymentSummary),
}

#[derive(Debug, Clone)]
pub struct DeploymentSummary {
	pub account: Address,
	pub token: TokenInfo,
	/// Receipt of the creation transaction when this run deployed.
	pub deployment: Option<TransactionReceipt>,
}

pub struct DeploymentPipeline {
	ctx: Arc<Context>,
}

impl DeploymentPipeline {
	pub fn new(ctx: Arc<Context>) -> Self {
		Self { ctx }
	}

	/// Inspects persisted state without touching the network.
	pub fn state(&self) -> Result<PipelineState> {
		if !self.ctx.accounts.exists() {
			return Ok(PipelineState::NoAccount);
		}
		let cache = self.ctx.compilation_cache();
		if cache.cached(&self.ctx.config.compiler.contract_name)?.is_none() {
			return Ok(PipelineState::HasAccount);
		}
		if self.ctx.deployed_address()?.is_none() {
			return Ok(PipelineState::Compiled);
		}
		Ok(PipelineState::Deployed)
	}

	/// Runs every outstanding stage in order.
	#[instrument(skip(self))]
	pub async fn run(&self) -> Result<PipelineOutcome> {
		let account = self.ensure_account()?;
		let artifact = self.ensure_artifact().await?;

		let (address, deployment) = match self.ctx.deployed_address()? {
			Some(address) => {
				info!(address = %address, "Contract already deployed, skipping deployment");
				self.ctx
					.events
					.publish(PipelineEvent::DeploymentSkipped { address });
				(address, None)
			},
			None => match self.deploy(&account, &artifact).await {
				Ok((address, receipt)) => (address, Some(receipt)),
				Err(Error::InsufficientFunds { address }) => {
					return Ok(PipelineOutcome::FundingRequired { account: address });
				},
				Err(e) => return Err(e),
			},
		};

		let token = self.verify(address, &artifact).await?;
		Ok(PipelineOutcome::Verified(DeploymentSummary {
			account: account.address(),
			token,
			deployment,
		}))
	}

	/// Loads the persisted account or creates one.
	pub fn ensure_account(&self) -> Result<Account> {
		let (account, created) = self.ctx.accounts.load_or_create()?;
		let address = account.address();
		let event = if created {
			PipelineEvent::AccountCreated { address }
		} else {
			PipelineEvent::AccountLoaded { address }
		};
		self.ctx.events.publish(event);
		Ok(account)
	}

	/// Returns the cached artifact or compiles the configured contract.
	pub async fn ensure_artifact(&self) -> Result<CompiledArtifact> {
		let cache = self.ctx.compilation_cache();
		let request = self.ctx.compile_request();
		let (artifact, status) = cache.load_or_compile(&request).await?;

		let event = match status {
			CacheStatus::Hit => PipelineEvent::CompilationSkipped {
				path: cache.artifact_path(&request.contract_name),
			},
			CacheStatus::Compiled => PipelineEvent::Compiled {
				contract: request.contract_name.clone(),
				bytecode_size: artifact.bin.len() / 2,
			},
		};
		self.ctx.events.publish(event);
		Ok(artifact)
	}

	/// Deploys `artifact` from `account` and records the new address.
	///
	/// Refuses with [`Error::InsufficientFunds`] when the account holds no
	/// native balance. Oversized bytecode only produces a warning.
	#[instrument(skip(self, account, artifact), fields(from = %account.address()))]
	pub async fn deploy(
		&self,
		account: &Account,
		artifact: &CompiledArtifact,
	) -> Result<(Address, TransactionReceipt)> {
		let from = account.address();
		let balance = self.ctx.chain.balance(from).await?;
		self.ctx.events.publish(PipelineEvent::BalanceChecked {
			address: from,
			balance,
		});
		if balance.is_zero() {
			warn!(address = %from, "Account has no balance, deployment needs funding");
			self.ctx
				.events
				.publish(PipelineEvent::FundingRequired { address: from });
			return Err(Error::InsufficientFunds { address: from });
		}

		let size = check_size(&artifact.bin);
		if !size.within_limit {
			self.ctx.events.publish(PipelineEvent::SizeLimitExceeded {
				size: size.size,
				limit: size.limit,
			});
		}

		let gas_price = self.ctx.chain.gas_price().await?;
		let estimate = estimate_deploy_cost(&artifact.bin, gas_price);
		info!(
			gas = estimate.gas,
			gas_price_gwei = %estimate.gas_price_gwei(),
			cost_eth = %estimate.cost_eth(),
			"Estimated deployment cost"
		);
		self.ctx.events.publish(PipelineEvent::CostEstimated {
			gas: estimate.gas,
			cost_wei: estimate.cost_wei,
		});

		let code = encode_deployment(artifact, &constructor_args(&self.ctx.config.token))?;
		let receipt = self
			.ctx
			.executor
			.build_and_send(
				account,
				Payload::Create(code),
				self.ctx.config.transaction.deploy_gas_limit,
			)
			.await?;

		let address = receipt.contract_address.ok_or_else(|| {
			Error::DeploymentFailed(format!(
				"receipt of {} has no contract address",
				receipt.hash
			))
		})?;
		self.ctx.record_deployment(address)?;

		info!(
			address = %address,
			tx_hash = %receipt.hash,
			gas_used = receipt.gas_used,
			"Contract deployed"
		);
		self.ctx.events.publish(PipelineEvent::Deployed {
			address,
			tx_hash: receipt.hash,
			gas_used: receipt.gas_used,
		});
		Ok((address, receipt))
	}

	/// Reads the token metadata back from the deployed contract.
	pub async fn verify(&self, address: Address, artifact: &CompiledArtifact) -> Result<TokenInfo> {
		let token = self.ctx.contract_client(address, artifact).token_info().await?;
		info!(
			address = %address,
			name = %token.name,
			symbol = %token.symbol,
			decimals = token.decimals,
			total_supply = %token.total_supply,
			"Deployment verified"
		);
		self.ctx
			.events
			.publish(PipelineEvent::Verified(token.clone()));
		Ok(token)
	}
}

/// `(name, symbol, decimals, initialSupply)` as constructor arguments.
pub fn constructor_args(token: &TokenConfig) -> Vec<DynSolValue> {
	vec![
		DynSolValue::String(token.name.clone()),
		DynSolValue::String(token.symbol.clone()),
		DynSolValue::Uint(U256::from(token.decimals), 8),
		DynSolValue::Uint(U256::from(token.initial_supply), 256),
	]
}

/// Creation bytecode followed by the ABI-encoded constructor arguments.
pub fn encode_deployment(artifact: &CompiledArtifact, args: &[DynSolValue]) -> Result<Bytes> {
	let mut code = artifact.bytecode()?.to_vec();
	match artifact.abi.constructor() {
		Some(constructor) => {
			let encoded = constructor
				.abi_encode_input(args)
				.map_err(|e| Error::InvalidAbi(format!("constructor arguments rejected: {e}")))?;
			code.extend_from_slice(&encoded);
		},
		None if args.is_empty() => {},
		None => {
			return Err(Error::InvalidAbi(
				"ABI has no constructor but arguments were supplied".into(),
			))
		},
	}
	Ok(Bytes::from(code))
}
