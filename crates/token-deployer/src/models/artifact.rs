//! Compiled contract artifact: typed ABI plus creation bytecode.

use crate::types::{
	error::{Error, Result},
	Hex,
};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ABI entry kinds that may appear in a compiler-produced ABI.
const KNOWN_ENTRY_KINDS: &[&str] = &[
	"function",
	"event",
	"constructor",
	"error",
	"fallback",
	"receive",
];

/// ABI and bytecode of one compiled contract.
///
/// Persisted as `{"abi": [...], "bin": "6080..."}`. The ABI is parsed into
/// typed entries whenever an artifact is built or loaded, so a file with an
/// unrecognized entry never reaches the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArtifact")]
pub struct CompiledArtifact {
	pub abi: JsonAbi,
	/// Creation bytecode as hex, without `0x`.
	pub bin: String,
}

#[derive(Deserialize)]
struct RawArtifact {
	abi: Value,
	bin: String,
}

impl TryFrom<RawArtifact> for CompiledArtifact {
	type Error = Error;

	fn try_from(raw: RawArtifact) -> Result<Self> {
		Self::from_parts(raw.abi, &raw.bin)
	}
}

impl CompiledArtifact {
	/// Builds an artifact from raw compiler output.
	///
	/// `abi` may be the ABI array itself or a string containing it, as older
	/// compilers emit in combined JSON output.
	pub fn from_parts(abi: Value, bin: &str) -> Result<Self> {
		let abi = parse_abi(abi)?;
		let bin = Hex::strip_prefix(bin).to_string();
		if hex::decode(&bin).is_err() {
			return Err(Error::InvalidHex("artifact bytecode is not valid hex".into()));
		}
		Ok(Self { abi, bin })
	}

	/// Creation bytecode as bytes.
	pub fn bytecode(&self) -> Result<Bytes> {
		Hex::decode(&self.bin)
	}
}

/// Parses and validates an ABI document.
pub fn parse_abi(abi: Value) -> Result<JsonAbi> {
	let abi = match abi {
		Value::String(text) => serde_json::from_str::<Value>(&text)
			.map_err(|e| Error::InvalidAbi(format!("ABI string is not JSON: {e}")))?,
		other => other,
	};

	let entries = abi
		.as_array()
		.ok_or_else(|| Error::InvalidAbi("ABI must be a JSON array".into()))?;
	for (index, entry) in entries.iter().enumerate() {
		// Solidity treats a missing `type` as "function".
		let kind = entry.get("type").and_then(Value::as_str).unwrap_or("function");
		if !KNOWN_ENTRY_KINDS.contains(&kind) {
			return Err(Error::InvalidAbi(format!(
				"entry {index} has unsupported type '{kind}'"
			)));
		}
	}

	serde_json::from_value(abi).map_err(|e| Error::InvalidAbi(e.to_string()))
}
