//! Fixtures shared by unit tests.

use crate::models::CompiledArtifact;
use deployer_config::Config;
use serde_json::{json, Value};
use std::path::Path;

/// Truncated creation code; enough for encoding and size checks.
pub const TOKEN_BIN: &str = "608060405234801561001057600080fd5b50604051610c38380380610c38833981016040819052";

pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn param(name: &str, ty: &str) -> Value {
	json!({ "internalType": ty, "name": name, "type": ty })
}

fn indexed(name: &str, ty: &str, indexed: bool) -> Value {
	json!({ "indexed": indexed, "internalType": ty, "name": name, "type": ty })
}

fn view(name: &str, inputs: Vec<Value>, output: &str) -> Value {
	json!({
		"inputs": inputs,
		"name": name,
		"outputs": [param("", output)],
		"stateMutability": "view",
		"type": "function"
	})
}

fn mutating(name: &str, inputs: Vec<Value>) -> Value {
	json!({
		"inputs": inputs,
		"name": name,
		"outputs": [param("", "bool")],
		"stateMutability": "nonpayable",
		"type": "function"
	})
}

/// ABI of the ERC20-style token as emitted by `solc --combined-json abi`.
pub fn token_abi_value() -> Value {
	json!([
		{
			"inputs": [
				param("_name", "string"),
				param("_symbol", "string"),
				param("_decimals", "uint8"),
				param("_initialSupply", "uint256")
			],
			"stateMutability": "nonpayable",
			"type": "constructor"
		},
		{
			"anonymous": false,
			"inputs": [
				indexed("owner", "address", true),
				indexed("spender", "address", true),
				indexed("value", "uint256", false)
			],
			"name": "Approval",
			"type": "event"
		},
		{
			"anonymous": false,
			"inputs": [
				indexed("from", "address", true),
				indexed("to", "address", true),
				indexed("value", "uint256", false)
			],
			"name": "Transfer",
			"type": "event"
		},
		view("allowance", vec![param("", "address"), param("", "address")], "uint256"),
		mutating("approve", vec![param("spender", "address"), param("value", "uint256")]),
		view("balanceOf", vec![param("", "address")], "uint256"),
		view("decimals", vec![], "uint8"),
		view("name", vec![], "string"),
		view("symbol", vec![], "string"),
		view("totalSupply", vec![], "uint256"),
		mutating("transfer", vec![param("to", "address"), param("value", "uint256")]),
		mutating(
			"transferFrom",
			vec![
				param("from", "address"),
				param("to", "address"),
				param("value", "uint256")
			]
		)
	])
}

pub fn token_artifact() -> CompiledArtifact {
	CompiledArtifact::from_parts(token_abi_value(), TOKEN_BIN).unwrap()
}

/// Default configuration with state rooted at `root` and fast polling.
pub fn test_config(root: &Path) -> Config {
	let mut config: Config = "[network]\nrpc_url = \"http://localhost:8545\""
		.parse()
		.unwrap();
	config.build.dir = root.join("build");
	config.compiler.source = root.join("SimpleToken.sol");
	config.transaction.poll_interval_ms = 1;
	config.transaction.confirmation_timeout_seconds = 1;
	config
}

/// Answers `name`, `symbol`, `decimals` and `totalSupply` calls on any address.
pub fn answer_token_calls(
	chain: &mut deployer_delivery::MockChainInterface,
	name: &str,
	symbol: &str,
	decimals: u8,
	total_supply: alloy_primitives::U256,
) {
	use alloy_dyn_abi::DynSolValue;
	use alloy_primitives::{Bytes, U256};

	let abi = token_artifact().abi;
	let encode = |value: DynSolValue| Bytes::from(DynSolValue::Tuple(vec![value]).abi_encode_params());
	let answers = [
		("name", encode(DynSolValue::String(name.to_string()))),
		("symbol", encode(DynSolValue::String(symbol.to_string()))),
		("decimals", encode(DynSolValue::Uint(U256::from(decimals), 8))),
		("totalSupply", encode(DynSolValue::Uint(total_supply, 256))),
	]
	.map(|(method, data)| (abi.function(method).unwrap()[0].selector(), data));

	chain.expect_call().returning(move |_, data| {
		let answer = answers
			.iter()
			.find(|(selector, _)| data[..4] == selector[..])
			.map(|(_, answer)| answer.clone());
		Box::pin(async move {
			answer.ok_or_else(|| deployer_delivery::DeliveryError::Network("unexpected call".into()))
		})
	});
}
