//! Bytecode size guard and deployment cost heuristic
//!
//! Gas is estimated as 200 per byte of creation code plus the 21000
//! intrinsic cost. It is an estimate only; the node charges what execution
//! actually uses.

use crate::constants::{
	BASE_TX_GAS, BYTECODE_PREVIEW_CHARS, BYTECODE_SIZE_LIMIT, GAS_PER_BYTE,
};
use crate::types::Hex;
use crate::utils::{format_ether, format_gwei};
use alloy_primitives::U256;
use tracing::warn;

/// Size of bytecode given as hex, with or without `0x`.
pub fn size_bytes(bytecode_hex: &str) -> usize {
	Hex::strip_prefix(bytecode_hex).len() / 2
}

/// Outcome of the code size check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReport {
	pub size: usize,
	pub limit: usize,
	pub within_limit: bool,
	/// Leading hex characters of the bytecode.
	pub preview: String,
}

/// Compares bytecode size to the 24576 byte limit.
///
/// Exceeding the limit only logs a warning; the network makes the final call.
pub fn check_size(bytecode_hex: &str) -> SizeReport {
	let stripped = Hex::strip_prefix(bytecode_hex);
	let size = stripped.len() / 2;
	let within_limit = size <= BYTECODE_SIZE_LIMIT;
	if !within_limit {
		warn!(
			size,
			limit = BYTECODE_SIZE_LIMIT,
			"Bytecode exceeds contract size limit; deployment will likely fail"
		);
	}

	SizeReport {
		size,
		limit: BYTECODE_SIZE_LIMIT,
		within_limit,
		preview: stripped.chars().take(BYTECODE_PREVIEW_CHARS).collect(),
	}
}

/// Heuristic deployment cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEstimate {
	pub size: usize,
	pub gas: u64,
	pub gas_price_wei: u128,
	pub cost_wei: U256,
}

impl CostEstimate {
	pub fn gas_price_gwei(&self) -> String {
		format_gwei(U256::from(self.gas_price_wei))
	}

	pub fn cost_eth(&self) -> String {
		format_ether(self.cost_wei)
	}
}

/// `gas = size * 200 + 21000`, `cost = gas * gas_price`.
///
/// Not a substitute for `eth_estimateGas`: execution of the constructor is
/// ignored.
pub fn estimate_deploy_cost(bytecode_hex: &str, gas_price_wei: u128) -> CostEstimate {
	let size = size_bytes(bytecode_hex);
	let gas = size as u64 * GAS_PER_BYTE + BASE_TX_GAS;
	CostEstimate {
		size,
		gas,
		gas_price_wei,
		cost_wei: U256::from(gas) * U256::from(gas_price_wei),
	}
}
