//! Command-line interface definitions
//!
//! The clap parser for the `token-deployer` binary and the terminal
//! rendering helpers it uses. Handlers live in the binary and only consume
//! the public pipeline and operations.

pub mod output;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Compile, deploy and exercise an ERC20-style token
#[derive(Parser, Debug)]
#[command(name = "token-deployer")]
#[command(about = "Compile, deploy and exercise an ERC20-style token")]
#[command(version)]
pub struct Cli {
	/// Configuration file
	#[arg(
		long,
		short,
		global = true,
		env = "DEPLOYER_CONFIG",
		default_value = "config/deployer.toml"
	)]
	pub config: PathBuf,

	/// Debug-level logging for the deployer crates
	#[arg(long, global = true)]
	pub debug: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Create the account, compile, deploy and verify, skipping completed stages
	Deploy {
		/// Transfer the default amount to a fresh address after verifying
		#[arg(long)]
		transfer: bool,
	},

	/// Transfer tokens from the deployer account
	Transfer {
		/// Recipient; a new address is generated when omitted
		#[arg(long)]
		to: Option<Address>,

		/// Amount in whole tokens, decimals allowed
		#[arg(long, default_value = crate::constants::DEFAULT_TRANSFER_AMOUNT)]
		amount: String,
	},

	/// Show the deployer account and its balances
	Account,

	/// Inspect the compiled contract without deploying
	Diagnose(DiagnoseCommand),
}

impl Commands {
	/// Whether the command talks to the RPC node. Offline diagnostics work
	/// from the cached artifact and configuration alone.
	pub fn needs_network(&self) -> bool {
		match self {
			Commands::Deploy { .. } | Commands::Transfer { .. } | Commands::Account => true,
			Commands::Diagnose(cmd) => matches!(cmd.command, DiagnoseSubcommand::EstimateCost),
		}
	}
}

#[derive(Args, Debug)]
pub struct DiagnoseCommand {
	#[command(subcommand)]
	pub command: DiagnoseSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum DiagnoseSubcommand {
	/// Check the ABI for the ERC20 functions and events
	VerifyAbi,

	/// Show bytecode size against the 24576 byte limit
	AnalyzeBytecode,

	/// Estimate deployment cost at the current gas price
	EstimateCost,

	/// Walk through a deployment without sending anything
	SimulateDeploy,

	/// Walk through a transfer to a generated address without sending anything
	SimulateTransfer {
		#[arg(long, default_value = crate::constants::DEFAULT_TRANSFER_AMOUNT)]
		amount: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn test_cli_definition() {
		Cli::command().debug_assert();
	}

	#[test]
	fn test_parse_transfer() {
		let cli = Cli::try_parse_from([
			"token-deployer",
			"transfer",
			"--to",
			"0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
			"--amount",
			"2.5",
		])
		.unwrap();

		match cli.command {
			Commands::Transfer { to, amount } => {
				assert!(to.is_some());
				assert_eq!(amount, "2.5");
			},
			other => panic!("unexpected command {other:?}"),
		}
	}

	#[test]
	fn test_parse_diagnose_defaults() {
		let cli = Cli::try_parse_from(["token-deployer", "diagnose", "simulate-transfer"]).unwrap();
		assert_eq!(cli.config, PathBuf::from("config/deployer.toml"));
		assert!(matches!(
			cli.command,
			Commands::Diagnose(DiagnoseCommand {
				command: DiagnoseSubcommand::SimulateTransfer { .. }
			})
		));
	}

	#[test]
	fn test_only_online_commands_need_network() {
		let needs = |args: &[&str]| {
			let mut argv = vec!["token-deployer"];
			argv.extend_from_slice(args);
			Cli::try_parse_from(argv).unwrap().command.needs_network()
		};

		assert!(needs(&["deploy"]));
		assert!(needs(&["transfer"]));
		assert!(needs(&["account"]));
		assert!(needs(&["diagnose", "estimate-cost"]));
		assert!(!needs(&["diagnose", "verify-abi"]));
		assert!(!needs(&["diagnose", "analyze-bytecode"]));
		assert!(!needs(&["diagnose", "simulate-deploy"]));
		assert!(!needs(&["diagnose", "simulate-transfer"]));
	}
}
