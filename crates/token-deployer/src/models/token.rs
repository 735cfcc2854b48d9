//! Token metadata and transfer results.

use alloy_primitives::{Address, U256};
use deployer_delivery::TransactionReceipt;

use crate::utils::format_units;

/// Metadata read back from a deployed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
	pub address: Address,
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
	/// In base units.
	pub total_supply: U256,
}

impl TokenInfo {
	/// Total supply in whole tokens.
	pub fn formatted_supply(&self) -> String {
		format_units(self.total_supply, self.decimals)
	}
}

/// Result of a confirmed token transfer.
#[derive(Debug, Clone)]
pub struct TransferReport {
	pub receipt: TransactionReceipt,
	pub from: Address,
	pub to: Address,
	/// Transferred amount in base units.
	pub amount: U256,
	pub sender_balance: U256,
	pub recipient_balance: U256,
}
