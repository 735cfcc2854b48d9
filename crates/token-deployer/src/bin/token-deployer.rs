//! `token-deployer` command-line entry point
//!
//! Loads `.env` and the configuration file, checks the configured node for
//! commands that need it and dispatches to the pipeline or the operations.

use alloy_primitives::Address;
use anyhow::Result;
use clap::Parser;
use deployer_config::Config;
use std::sync::Arc;
use token_deployer::{
	analysis::AbiReport,
	cli::{output::Display, Cli, Commands, DiagnoseSubcommand},
	constants::{FAUCETS, RECOMMENDED_BALANCE_ETH},
	operations::{DiagnosticOps, TokenOps, TransferOutcome},
	pipeline::{DeploymentPipeline, PipelineOutcome},
	utils::{format_ether, format_units},
	Context, Error, PipelineEvent,
};
use tokio::sync::broadcast::Receiver;
use tracing::{info, instrument};

#[tokio::main]
async fn main() -> Result<()> {
	let _ = dotenvy::dotenv();
	let cli = Cli::parse();
	token_deployer::init_logging(cli.debug);

	let config = Config::from_file(&cli.config)?;
	info!(config_path = %cli.config.display(), "Configuration loaded");

	let ctx = Arc::new(Context::from_config(config)?);
	if cli.command.needs_network() {
		let chain_id = ctx.check_connection().await?;
		Display::kv("Network", &format!("{} (chain {chain_id})", ctx.config.network.rpc_url));
	}

	match cli.command {
		Commands::Deploy { transfer } => handle_deploy(ctx, transfer).await,
		Commands::Transfer { to, amount } => handle_transfer(ctx, to, amount).await,
		Commands::Account => handle_account(ctx).await,
		Commands::Diagnose(cmd) => handle_diagnose(ctx, cmd.command).await,
	}
}

/// Runs the pipeline, rendering its events as they are drained.
#[instrument(skip(ctx))]
async fn handle_deploy(ctx: Arc<Context>, transfer: bool) -> Result<()> {
	Display::header("Token Deployment");

	let mut events = ctx.events.subscribe();
	let pipeline = DeploymentPipeline::new(ctx.clone());
	let outcome = pipeline.run().await;
	render_events(&mut events);

	match outcome? {
		PipelineOutcome::FundingRequired { account } => {
			Display::warning("Deployer account has no balance");
			Display::kv("Address", &account.to_checksum(None));
			Display::kv("Recommended", &format!("{RECOMMENDED_BALANCE_ETH} ETH"));
			Display::section("Faucets");
			Display::list(FAUCETS);
			Display::next_steps(&[
				"Fund the address above from a faucet",
				"Rerun 'token-deployer deploy'; completed stages are skipped",
			]);
		},
		PipelineOutcome::Verified(summary) => {
			Display::section("Token");
			Display::kv("Address", &summary.token.address.to_checksum(None));
			Display::kv("Name", &summary.token.name);
			Display::kv("Symbol", &summary.token.symbol);
			Display::kv("Decimals", &summary.token.decimals.to_string());
			Display::kv(
				"Total supply",
				&format!("{} {}", summary.token.formatted_supply(), summary.token.symbol),
			);
			if let Some(receipt) = &summary.deployment {
				Display::kv("Transaction", &receipt.hash.to_string());
				Display::kv("Block", &receipt.block_number.to_string());
			}

			if transfer {
				let outcome = TokenOps::new(ctx).transfer(None, None).await?;
				render_transfer(&outcome);
			} else {
				Display::next_steps(&[
					"Send tokens with 'token-deployer transfer --to <address> --amount <n>'",
					"Inspect the account with 'token-deployer account'",
				]);
			}
		},
	}
	Ok(())
}

#[instrument(skip(ctx))]
async fn handle_transfer(ctx: Arc<Context>, to: Option<Address>, amount: String) -> Result<()> {
	Display::header("Token Transfer");

	let outcome = TokenOps::new(ctx).transfer(to, Some(&amount)).await?;
	render_transfer(&outcome);
	Ok(())
}

#[instrument(skip(ctx))]
async fn handle_account(ctx: Arc<Context>) -> Result<()> {
	Display::header("Deployer Account");

	let summary = match TokenOps::new(ctx).account().await {
		Ok(summary) => summary,
		Err(Error::AccountNotFound(path)) => {
			Display::error(&format!("No account at {}", path.display()));
			Display::next_steps(&["Run 'token-deployer deploy' to create one"]);
			return Ok(());
		},
		Err(e) => return Err(e.into()),
	};
	Display::kv("Address", &summary.address.to_checksum(None));
	Display::kv("Private key", &summary.masked_private_key);
	Display::kv("Balance", &format!("{} ETH", format_ether(summary.balance)));

	match summary.token_balance {
		Some(token) => {
			Display::kv("Token", &token.token.to_checksum(None));
			Display::kv(
				"Token balance",
				&format!("{} {}", format_units(token.balance, token.decimals), token.symbol),
			);
		},
		None => Display::info("No deployment recorded yet"),
	}

	if summary.balance.is_zero() {
		Display::warning("Account has no balance; fund it before deploying");
		Display::list(FAUCETS);
	}
	Ok(())
}

#[instrument(skip(ctx))]
async fn handle_diagnose(ctx: Arc<Context>, cmd: DiagnoseSubcommand) -> Result<()> {
	let ops = DiagnosticOps::new(ctx);

	match cmd {
		DiagnoseSubcommand::VerifyAbi => {
			Display::header("ABI Verification");
			render_abi(&ops.verify_abi().await?);
		},
		DiagnoseSubcommand::AnalyzeBytecode => {
			Display::header("Bytecode Analysis");
			let report = ops.analyze_bytecode().await?;
			Display::kv("Size", &format!("{} bytes", report.size));
			Display::kv("Limit", &format!("{} bytes", report.limit));
			Display::kv("Preview", &report.preview);
			if report.within_limit {
				Display::success("Bytecode is within the contract size limit");
			} else {
				Display::warning("Bytecode exceeds the contract size limit");
			}
		},
		DiagnoseSubcommand::EstimateCost => {
			Display::header("Deployment Cost Estimate");
			let estimate = ops.estimate_cost().await?;
			Display::kv("Bytecode size", &format!("{} bytes", estimate.size));
			Display::kv("Estimated gas", &estimate.gas.to_string());
			Display::kv("Gas price", &format!("{} gwei", estimate.gas_price_gwei()));
			Display::kv("Estimated cost", &format!("{} ETH", estimate.cost_eth()));
			Display::info("Heuristic only: 200 gas per byte plus 21000");
		},
		DiagnoseSubcommand::SimulateDeploy => {
			Display::header("Deployment Simulation");
			let plan = ops.simulate_deployment().await?;
			Display::kv("Contract", &plan.contract);
			Display::kv("Simulated address", &plan.simulated_address.to_checksum(None));
			Display::kv("Init code size", &format!("{} bytes", plan.init_code_size));
			Display::kv("Total supply", &format!("{} base units", plan.total_supply));
			Display::section("Constructor Arguments");
			for (name, value) in &plan.constructor_args {
				Display::kv(name, value);
			}
			Display::section("Steps");
			Display::list(&plan.steps);
			Display::section("Functions");
			Display::list(&plan.functions);
			Display::section("Events");
			Display::list(&plan.events);
		},
		DiagnoseSubcommand::SimulateTransfer { amount } => {
			Display::header("Transfer Simulation");
			let plan = ops.simulate_transfer(Some(&amount))?;
			Display::kv("Sender", &plan.sender.to_checksum(None));
			Display::kv("Receiver", &plan.receiver.to_checksum(None));
			Display::kv(
				"Amount",
				&format!("{} ({} base units)", plan.amount, plan.amount_base_units),
			);
			Display::section("Steps");
			Display::list(&plan.steps);
		},
	}
	Ok(())
}

fn render_events(events: &mut Receiver<PipelineEvent>) {
	while let Ok(event) = events.try_recv() {
		match event {
			PipelineEvent::AccountCreated { address } => {
				Display::success(&format!("Created account {}", address.to_checksum(None)))
			},
			PipelineEvent::AccountLoaded { address } => {
				Display::info(&format!("Using account {}", address.to_checksum(None)))
			},
			PipelineEvent::CompilationSkipped { path } => {
				Display::info(&format!("Using compiled artifact {}", path.display()))
			},
			PipelineEvent::Compiled {
				contract,
				bytecode_size,
			} => Display::success(&format!("Compiled {contract} ({bytecode_size} bytes)")),
			PipelineEvent::BalanceChecked { balance, .. } => {
				Display::kv("Balance", &format!("{} ETH", format_ether(balance)))
			},
			PipelineEvent::FundingRequired { .. } => {},
			PipelineEvent::SizeLimitExceeded { size, limit } => Display::warning(&format!(
				"Bytecode is {size} bytes, above the {limit} byte limit"
			)),
			PipelineEvent::CostEstimated { gas, cost_wei } => Display::kv(
				"Estimated cost",
				&format!("{} ETH ({gas} gas)", format_ether(cost_wei)),
			),
			PipelineEvent::DeploymentSkipped { address } => Display::info(&format!(
				"Already deployed at {}",
				address.to_checksum(None)
			)),
			PipelineEvent::Deployed {
				address, gas_used, ..
			} => Display::success(&format!(
				"Deployed at {} ({gas_used} gas used)",
				address.to_checksum(None)
			)),
			PipelineEvent::Verified(_) => Display::success("Deployment verified"),
		}
	}
}

fn render_transfer(outcome: &TransferOutcome) {
	let report = &outcome.report;
	let tokens = |amount| {
		format!(
			"{} {}",
			format_units(amount, outcome.decimals),
			outcome.symbol
		)
	};

	Display::success(&format!("Transferred {}", tokens(report.amount)));
	Display::kv("Transaction", &report.receipt.hash.to_string());
	Display::kv("From", &report.from.to_checksum(None));
	Display::kv("To", &report.to.to_checksum(None));
	if let Some(recipient) = &outcome.generated_recipient {
		Display::kv("Recipient key", &recipient.account.masked_private_key());
		Display::info(&format!(
			"Generated recipient key saved to {}",
			recipient.path.display()
		));
	}
	Display::section("Balances");
	Display::kv("Sender", &tokens(report.sender_balance));
	Display::kv("Recipient", &tokens(report.recipient_balance));
}

fn render_abi(report: &AbiReport) {
	Display::kv("Functions", &report.functions.join(", "));
	Display::kv("Events", &report.events.join(", "));
	Display::kv(
		"Constructor",
		if report.has_constructor { "present" } else { "absent" },
	);
	if report.is_complete() {
		Display::success("ABI exposes the full ERC20 surface");
	} else {
		if !report.missing_functions.is_empty() {
			Display::warning(&format!(
				"Missing functions: {}",
				report.missing_functions.join(", ")
			));
		}
		if !report.missing_events.is_empty() {
			Display::warning(&format!(
				"Missing events: {}",
				report.missing_events.join(", ")
			));
		}
	}
}
