//! Offline inspection of the compiled token
//!
//! Everything here works from the cached artifact (compiling on a miss) and
//! configuration. Only [`DiagnosticOps::estimate_cost`] reads from the
//! network, and nothing here submits a transaction.

use crate::analysis::{
	check_size, estimate_deploy_cost, event_signatures, function_signatures, verify_token_abi,
	AbiReport, CostEstimate, SizeReport,
};
use crate::constants::{DEFAULT_TRANSFER_AMOUNT, SIMULATED_CONTRACT_ADDRESS};
use crate::pipeline::{constructor_args, encode_deployment};
use crate::types::{error::Result, Hex};
use crate::utils::to_base_units;
use crate::Context;
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use deployer_account::Account;
use std::sync::Arc;
use tracing::{info, instrument};

/// Planned deployment, computed without touching the network.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
	pub contract: String,
	/// Placeholder; the real address depends on the deployer nonce.
	pub simulated_address: Address,
	/// Rendered constructor arguments in declaration order.
	pub constructor_args: Vec<(String, String)>,
	/// Creation code plus encoded arguments, in bytes.
	pub init_code_size: usize,
	pub total_supply: U256,
	pub functions: Vec<String>,
	pub events: Vec<String>,
	pub steps: Vec<String>,
}

/// Planned transfer, computed without touching the network.
#[derive(Debug, Clone)]
pub struct TransferPlan {
	pub sender: Address,
	pub receiver: Address,
	pub amount: String,
	pub amount_base_units: U256,
	pub steps: Vec<String>,
}

pub struct DiagnosticOps {
	ctx: Arc<Context>,
}

impl DiagnosticOps {
	pub fn new(ctx: Arc<Context>) -> Self {
		Self { ctx }
	}

	/// Checks the compiled ABI for the full ERC20 surface.
	#[instrument(skip(self))]
	pub async fn verify_abi(&self) -> Result<AbiReport> {
		let artifact = self.ctx.artifact().await?;
		let report = verify_token_abi(&artifact.abi);
		info!(
			functions = report.functions.len(),
			events = report.events.len(),
			complete = report.is_complete(),
			"ABI verified"
		);
		Ok(report)
	}

	/// Size check with a bytecode preview.
	#[instrument(skip(self))]
	pub async fn analyze_bytecode(&self) -> Result<SizeReport> {
		let artifact = self.ctx.artifact().await?;
		Ok(check_size(&artifact.bin))
	}

	/// Heuristic deployment cost at the node's current gas price.
	#[instrument(skip(self))]
	pub async fn estimate_cost(&self) -> Result<CostEstimate> {
		let artifact = self.ctx.artifact().await?;
		let gas_price = self.ctx.chain.gas_price().await?;
		Ok(estimate_deploy_cost(&artifact.bin, gas_price))
	}

	/// Everything a deployment would do, with a placeholder contract address.
	#[instrument(skip(self))]
	pub async fn simulate_deployment(&self) -> Result<DeploymentPlan> {
		let artifact = self.ctx.artifact().await?;
		let token = &self.ctx.config.token;
		let args = constructor_args(token);
		let init_code = encode_deployment(&artifact, &args)?;

		let total_supply =
			U256::from(token.initial_supply) * U256::from(10u8).pow(U256::from(token.decimals));

		let names = ["name", "symbol", "decimals", "initialSupply"];
		let constructor_args = names
			.iter()
			.zip(&args)
			.map(|(name, value)| (name.to_string(), render(value)))
			.collect();

		Ok(DeploymentPlan {
			contract: self.ctx.config.compiler.contract_name.clone(),
			simulated_address: Hex::to_address(SIMULATED_CONTRACT_ADDRESS)?,
			constructor_args,
			init_code_size: init_code.len(),
			total_supply,
			functions: function_signatures(&artifact.abi),
			events: event_signatures(&artifact.abi),
			steps: vec![
				"Check deployer balance".to_string(),
				"Estimate deployment gas".to_string(),
				"Encode constructor arguments".to_string(),
				format!(
					"Sign creation transaction with gas limit {}",
					self.ctx.config.transaction.deploy_gas_limit
				),
				"Submit and wait for receipt".to_string(),
				format!("Record address in {}", self.ctx.config.address_path().display()),
				"Verify name, symbol, decimals and totalSupply".to_string(),
			],
		})
	}

	/// A transfer from the deployer account to a freshly generated receiver.
	#[instrument(skip(self))]
	pub fn simulate_transfer(&self, amount: Option<&str>) -> Result<TransferPlan> {
		let sender = self.ctx.load_account()?.address();
		let receiver = Account::generate().address();
		let amount = amount.unwrap_or(DEFAULT_TRANSFER_AMOUNT).to_string();
		let decimals = self.ctx.config.token.decimals;
		let amount_base_units = to_base_units(&amount, decimals)?;

		Ok(TransferPlan {
			sender,
			receiver,
			steps: vec![
				"Read token decimals".to_string(),
				format!("Convert {amount} tokens to {amount_base_units} base units"),
				"Check sender token balance".to_string(),
				format!(
					"Sign transfer with gas limit {}",
					self.ctx.config.transaction.call_gas_limit
				),
				"Submit and wait for receipt".to_string(),
				"Read sender and receiver balances".to_string(),
			],
			amount,
			amount_base_units,
		})
	}
}

fn render(value: &DynSolValue) -> String {
	match value {
		DynSolValue::String(s) => format!("\"{s}\""),
		DynSolValue::Uint(n, _) => n.to_string(),
		other => format!("{other:?}"),
	}
}
