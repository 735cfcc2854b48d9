//! Exact conversion between decimal token amounts and base units.
//!
//! Amounts are parsed as decimal strings, never through floating point, so
//! `"100"` with 18 decimals is exactly `100 * 10^18`.

use crate::types::error::{Error, Result};
use alloy_primitives::U256;

/// Converts a decimal amount such as `"1.5"` to base units.
///
/// More fractional digits than `decimals` is rejected rather than rounded.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256> {
	let amount = amount.trim();
	if amount.is_empty() {
		return Err(Error::InvalidAmount("amount is empty".into()));
	}
	if amount.starts_with('-') {
		return Err(Error::InvalidAmount(format!("{amount}: must be positive")));
	}

	let (whole, fraction) = match amount.split_once('.') {
		Some((whole, fraction)) => (whole, fraction),
		None => (amount, ""),
	};
	if whole.is_empty() && fraction.is_empty() {
		return Err(Error::InvalidAmount(format!("{amount}: no digits")));
	}
	if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
	{
		return Err(Error::InvalidAmount(format!("{amount}: not a decimal number")));
	}
	if fraction.len() > decimals as usize {
		return Err(Error::InvalidAmount(format!(
			"{amount}: more than {decimals} fractional digits"
		)));
	}

	let scale = U256::from(10u8).pow(U256::from(decimals));
	let whole_units = if whole.is_empty() {
		U256::ZERO
	} else {
		U256::from_str_radix(whole, 10)
			.map_err(|e| Error::InvalidAmount(format!("{amount}: {e}")))?
	};
	let fraction_units = if fraction.is_empty() {
		U256::ZERO
	} else {
		let padded = format!("{fraction:0<width$}", width = decimals as usize);
		U256::from_str_radix(&padded, 10)
			.map_err(|e| Error::InvalidAmount(format!("{amount}: {e}")))?
	};

	whole_units
		.checked_mul(scale)
		.and_then(|v| v.checked_add(fraction_units))
		.ok_or_else(|| Error::InvalidAmount(format!("{amount}: exceeds uint256")))
}

/// Formats base units as a decimal string, trimming trailing zeros.
pub fn format_units(amount: U256, decimals: u8) -> String {
	if decimals == 0 {
		return amount.to_string();
	}

	let divisor = U256::from(10u8).pow(U256::from(decimals));
	let whole = amount / divisor;
	let fractional = amount % divisor;

	let fractional_str = format!("{:0>width$}", fractional, width = decimals as usize);
	let trimmed = fractional_str.trim_end_matches('0');

	if trimmed.is_empty() {
		format!("{whole}.0")
	} else {
		format!("{whole}.{trimmed}")
	}
}

/// Formats wei as ether.
pub fn format_ether(wei: U256) -> String {
	format_units(wei, 18)
}

/// Formats wei as gwei.
pub fn format_gwei(wei: U256) -> String {
	format_units(wei, 9)
}
