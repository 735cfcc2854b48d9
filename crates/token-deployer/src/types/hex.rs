//! Hexadecimal parsing helpers for bytecode and addresses

use crate::types::error::{Error, Result};
use alloy_primitives::{Address, Bytes};

/// Static helpers for `0x`-optional hex strings.
pub struct Hex;

impl Hex {
	/// Strips a leading `0x`, if present.
	pub fn strip_prefix(s: &str) -> &str {
		let s = s.trim();
		s.strip_prefix("0x").unwrap_or(s)
	}

	/// Decode a hexadecimal string to bytes
	///
	/// # Errors
	/// Returns Error::InvalidHex if the string is not valid hex
	pub fn decode(s: &str) -> Result<Bytes> {
		let s = Self::strip_prefix(s);
		hex::decode(s)
			.map(Into::into)
			.map_err(|e| Error::InvalidHex(format!("{e}")))
	}

	/// Parse an address, accepting any checksum casing.
	pub fn to_address(s: &str) -> Result<Address> {
		s.trim()
			.parse::<Address>()
			.map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))
	}
}
