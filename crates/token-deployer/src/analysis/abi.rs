//! ERC20 surface check of a contract ABI.

use crate::constants::{REQUIRED_EVENTS, REQUIRED_FUNCTIONS};
use alloy_json_abi::JsonAbi;

/// ERC20 surface check of an ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiReport {
	/// Every function name in the ABI, sorted.
	pub functions: Vec<String>,
	/// Every event name in the ABI, sorted.
	pub events: Vec<String>,
	pub missing_functions: Vec<String>,
	pub missing_events: Vec<String>,
	pub has_constructor: bool,
}

impl AbiReport {
	pub fn is_complete(&self) -> bool {
		self.missing_functions.is_empty() && self.missing_events.is_empty()
	}
}

pub fn verify_token_abi(abi: &JsonAbi) -> AbiReport {
	let functions: Vec<String> = abi.functions.keys().cloned().collect();
	let events: Vec<String> = abi.events.keys().cloned().collect();

	let missing_functions = REQUIRED_FUNCTIONS
		.iter()
		.filter(|name| !abi.functions.contains_key(**name))
		.map(|name| name.to_string())
		.collect();
	let missing_events = REQUIRED_EVENTS
		.iter()
		.filter(|name| !abi.events.contains_key(**name))
		.map(|name| name.to_string())
		.collect();

	AbiReport {
		functions,
		events,
		missing_functions,
		missing_events,
		has_constructor: abi.constructor.is_some(),
	}
}

/// Full signatures of all functions, e.g. `transfer(address,uint256)`.
pub fn function_signatures(abi: &JsonAbi) -> Vec<String> {
	abi.functions().map(|f| f.signature()).collect()
}

/// Full signatures of all events, e.g. `Transfer(address,address,uint256)`.
pub fn event_signatures(abi: &JsonAbi) -> Vec<String> {
	abi.events().map(|e| e.signature()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::parse_abi;
	use crate::testing::token_abi_value;
	use serde_json::json;

	#[test]
	fn test_complete_token_abi() {
		let abi = parse_abi(token_abi_value()).unwrap();
		let report = verify_token_abi(&abi);

		assert!(report.is_complete());
		assert!(report.has_constructor);
		assert_eq!(report.functions.len(), 9);
		assert_eq!(report.events, vec!["Approval", "Transfer"]);
	}

	#[test]
	fn test_missing_entries_are_reported() {
		let abi = parse_abi(json!([
			{
				"type": "function",
				"name": "name",
				"inputs": [],
				"outputs": [{ "name": "", "type": "string" }],
				"stateMutability": "view"
			}
		]))
		.unwrap();
		let report = verify_token_abi(&abi);

		assert!(!report.is_complete());
		assert!(!report.has_constructor);
		assert_eq!(report.missing_functions.len(), REQUIRED_FUNCTIONS.len() - 1);
		assert!(!report.missing_functions.contains(&"name".to_string()));
		assert_eq!(report.missing_events, vec!["Transfer", "Approval"]);
	}

	#[test]
	fn test_signatures() {
		let abi = parse_abi(token_abi_value()).unwrap();
		assert!(function_signatures(&abi).contains(&"transfer(address,uint256)".to_string()));
		assert!(event_signatures(&abi).contains(&"Transfer(address,address,uint256)".to_string()));
	}
}
