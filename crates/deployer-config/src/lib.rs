//! Configuration for the token deployer.
//!
//! Configuration is read from a TOML file. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`; references are
//! substituted before the TOML is parsed. Every section except `[network]`
//! can be omitted, in which case the defaults below apply.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// File name of the persisted account inside the build directory.
pub const ACCOUNT_FILE: &str = "account_info.json";

/// File name of the persisted contract address inside the build directory.
pub const ADDRESS_FILE: &str = "contract_address.txt";

/// Directory under the build dir holding keys of generated transfer recipients.
pub const RECIPIENTS_DIR: &str = "recipients";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level deployer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	pub network: NetworkConfig,
	#[serde(default)]
	pub build: BuildConfig,
	#[serde(default)]
	pub compiler: CompilerConfig,
	#[serde(default)]
	pub token: TokenConfig,
	#[serde(default)]
	pub transaction: TransactionConfig,
}

/// JSON-RPC endpoint of the target network.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
	/// When set, the connected node must report this chain id.
	#[serde(default)]
	pub chain_id: Option<u64>,
}

/// Where persisted state (account, artifact, deployed address) lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
	#[serde(default = "default_build_dir")]
	pub dir: PathBuf,
}

/// Solidity compiler pin and inputs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompilerConfig {
	#[serde(default = "default_source")]
	pub source: PathBuf,
	#[serde(default = "default_contract_name")]
	pub contract_name: String,
	#[serde(default = "default_compiler_version")]
	pub version: String,
	#[serde(default = "default_true")]
	pub optimize: bool,
	#[serde(default = "default_optimize_runs")]
	pub optimize_runs: u32,
	/// Explicit path to a `solc` binary. Looked up on `PATH` when absent.
	#[serde(default)]
	pub solc_path: Option<PathBuf>,
}

/// Constructor arguments of the deployed token.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
	#[serde(default = "default_token_name")]
	pub name: String,
	#[serde(default = "default_token_symbol")]
	pub symbol: String,
	#[serde(default = "default_token_decimals")]
	pub decimals: u8,
	/// Supply in whole tokens; the contract scales it by `10^decimals`.
	#[serde(default = "default_initial_supply")]
	pub initial_supply: u64,
}

/// Gas limits and confirmation polling.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionConfig {
	#[serde(default = "default_deploy_gas_limit")]
	pub deploy_gas_limit: u64,
	#[serde(default = "default_call_gas_limit")]
	pub call_gas_limit: u64,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	#[serde(default = "default_confirmation_timeout_seconds")]
	pub confirmation_timeout_seconds: u64,
}

fn default_build_dir() -> PathBuf {
	PathBuf::from("build")
}

fn default_source() -> PathBuf {
	PathBuf::from("contracts/SimpleToken.sol")
}

fn default_contract_name() -> String {
	"SimpleToken".to_string()
}

fn default_compiler_version() -> String {
	"0.8.19".to_string()
}

fn default_true() -> bool {
	true
}

fn default_optimize_runs() -> u32 {
	200
}

fn default_token_name() -> String {
	"MyToken".to_string()
}

fn default_token_symbol() -> String {
	"MTK".to_string()
}

fn default_token_decimals() -> u8 {
	18
}

fn default_initial_supply() -> u64 {
	1_000_000
}

fn default_deploy_gas_limit() -> u64 {
	3_000_000
}

fn default_call_gas_limit() -> u64 {
	200_000
}

fn default_poll_interval_ms() -> u64 {
	1_000
}

/// Five minutes; testnet blocks can lag well behind the 12s target.
fn default_confirmation_timeout_seconds() -> u64 {
	300
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			dir: default_build_dir(),
		}
	}
}

impl Default for CompilerConfig {
	fn default() -> Self {
		Self {
			source: default_source(),
			contract_name: default_contract_name(),
			version: default_compiler_version(),
			optimize: true,
			optimize_runs: default_optimize_runs(),
			solc_path: None,
		}
	}
}

impl Default for TokenConfig {
	fn default() -> Self {
		Self {
			name: default_token_name(),
			symbol: default_token_symbol(),
			decimals: default_token_decimals(),
			initial_supply: default_initial_supply(),
		}
	}
}

impl Default for TransactionConfig {
	fn default() -> Self {
		Self {
			deploy_gas_limit: default_deploy_gas_limit(),
			call_gas_limit: default_call_gas_limit(),
			poll_interval_ms: default_poll_interval_ms(),
			confirmation_timeout_seconds: default_confirmation_timeout_seconds(),
		}
	}
}

impl TransactionConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn confirmation_timeout(&self) -> Duration {
		Duration::from_secs(self.confirmation_timeout_seconds)
	}
}

impl Config {
	/// Loads, resolves and validates the configuration at `path`.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("{}: {e}", path.display()),
			))
		})?;
		tracing::debug!(path = %path.display(), "Loaded configuration file");
		content.parse()
	}

	/// Persisted account file.
	pub fn account_path(&self) -> PathBuf {
		self.build.dir.join(ACCOUNT_FILE)
	}

	/// Persisted deployed address.
	pub fn address_path(&self) -> PathBuf {
		self.build.dir.join(ADDRESS_FILE)
	}

	/// Key file of a generated transfer recipient, one per address.
	pub fn recipient_path(&self, address: &str) -> PathBuf {
		self.build
			.dir
			.join(RECIPIENTS_DIR)
			.join(format!("{address}.json"))
	}

	fn validate(&self) -> Result<(), ConfigError> {
		let rpc_url = self.network.rpc_url.trim();
		if rpc_url.is_empty() {
			return Err(ConfigError::Validation(
				"network.rpc_url cannot be empty".into(),
			));
		}
		let parsed = url::Url::parse(rpc_url).map_err(|e| {
			ConfigError::Validation(format!("network.rpc_url '{rpc_url}' is invalid: {e}"))
		})?;
		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(ConfigError::Validation(format!(
				"network.rpc_url must use http or https, got '{}'",
				parsed.scheme()
			)));
		}

		if self.compiler.contract_name.trim().is_empty() {
			return Err(ConfigError::Validation(
				"compiler.contract_name cannot be empty".into(),
			));
		}
		let version_re = Regex::new(r"^\d+\.\d+\.\d+$")
			.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;
		if !version_re.is_match(&self.compiler.version) {
			return Err(ConfigError::Validation(format!(
				"compiler.version '{}' must be an exact version such as 0.8.19",
				self.compiler.version
			)));
		}
		if self.compiler.optimize && self.compiler.optimize_runs == 0 {
			return Err(ConfigError::Validation(
				"compiler.optimize_runs must be greater than 0".into(),
			));
		}

		if self.token.name.is_empty() || self.token.symbol.is_empty() {
			return Err(ConfigError::Validation(
				"token.name and token.symbol cannot be empty".into(),
			));
		}
		if self.token.decimals > 77 {
			return Err(ConfigError::Validation(format!(
				"token.decimals {} exceeds the uint256 range",
				self.token.decimals
			)));
		}

		if self.transaction.deploy_gas_limit == 0 || self.transaction.call_gas_limit == 0 {
			return Err(ConfigError::Validation(
				"transaction gas limits must be greater than 0".into(),
			));
		}
		if self.transaction.poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"transaction.poll_interval_ms must be greater than 0".into(),
			));
		}
		if self.transaction.confirmation_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"transaction.confirmation_timeout_seconds must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Substitutes `${VAR}` and `${VAR:-default}` references.
///
/// A reference to an unset variable without a default is an error.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 256 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {MAX_INPUT_SIZE} bytes)",
			input.len()
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let mut resolved = String::with_capacity(input.len());
	let mut cursor = 0;
	for cap in re.captures_iter(input) {
		let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						name.as_str()
					)))
				},
			},
		};
		resolved.push_str(&input[cursor..whole.start()]);
		resolved.push_str(&value);
		cursor = whole.end();
	}
	resolved.push_str(&input[cursor..]);

	Ok(resolved)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const MINIMAL: &str = r#"
[network]
rpc_url = "http://localhost:8545"
"#;

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = MINIMAL.parse().unwrap();

		assert_eq!(config.network.chain_id, None);
		assert_eq!(config.compiler.version, "0.8.19");
		assert!(config.compiler.optimize);
		assert_eq!(config.compiler.optimize_runs, 200);
		assert_eq!(config.compiler.contract_name, "SimpleToken");
		assert_eq!(config.token.name, "MyToken");
		assert_eq!(config.token.symbol, "MTK");
		assert_eq!(config.token.decimals, 18);
		assert_eq!(config.token.initial_supply, 1_000_000);
		assert_eq!(config.transaction.deploy_gas_limit, 3_000_000);
		assert_eq!(config.transaction.call_gas_limit, 200_000);
		assert_eq!(config.transaction.poll_interval(), Duration::from_secs(1));
	}

	#[test]
	fn test_state_paths() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.account_path(), Path::new("build/account_info.json"));
		assert_eq!(config.address_path(), Path::new("build/contract_address.txt"));
		assert_eq!(
			config.recipient_path("0xAb"),
			Path::new("build/recipients/0xAb.json")
		);
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("DEPLOYER_TEST_HOST", "localhost");
		std::env::set_var("DEPLOYER_TEST_PORT", "8545");

		let input = "rpc_url = \"http://${DEPLOYER_TEST_HOST}:${DEPLOYER_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "rpc_url = \"http://localhost:8545\"");

		std::env::remove_var("DEPLOYER_TEST_HOST");
		std::env::remove_var("DEPLOYER_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${DEPLOYER_UNSET_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${DEPLOYER_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("DEPLOYER_MISSING_VAR"));
	}

	#[test]
	fn test_full_config_overrides() {
		let config: Config = r#"
[network]
rpc_url = "https://sepolia.example.org/v3/${DEPLOYER_ABSENT_KEY:-demo}"
chain_id = 11155111

[build]
dir = "out"

[compiler]
source = "src/Token.sol"
contract_name = "Token"
version = "0.8.24"
optimize = false
solc_path = "/opt/solc"

[token]
name = "Other"
symbol = "OTH"
decimals = 6
initial_supply = 42

[transaction]
deploy_gas_limit = 5000000
call_gas_limit = 100000
poll_interval_ms = 250
confirmation_timeout_seconds = 30
"#
		.parse()
		.unwrap();

		assert_eq!(config.network.rpc_url, "https://sepolia.example.org/v3/demo");
		assert_eq!(config.network.chain_id, Some(11155111));
		assert_eq!(config.build.dir, PathBuf::from("out"));
		assert_eq!(config.compiler.contract_name, "Token");
		assert!(!config.compiler.optimize);
		assert_eq!(config.compiler.solc_path, Some(PathBuf::from("/opt/solc")));
		assert_eq!(config.token.decimals, 6);
		assert_eq!(
			config.transaction.confirmation_timeout(),
			Duration::from_secs(30)
		);
	}

	#[test]
	fn test_validation_failures() {
		let cases = [
			"[network]\nrpc_url = \"\"",
			"[network]\nrpc_url = \"ws://localhost:8546\"",
			"[network]\nrpc_url = \"http://localhost:8545\"\n[compiler]\nversion = \"latest\"",
			"[network]\nrpc_url = \"http://localhost:8545\"\n[compiler]\ncontract_name = \"\"",
			"[network]\nrpc_url = \"http://localhost:8545\"\n[token]\ndecimals = 80",
			"[network]\nrpc_url = \"http://localhost:8545\"\n[transaction]\ncall_gas_limit = 0",
		];
		for case in cases {
			let result: Result<Config, _> = case.parse();
			assert!(
				matches!(result, Err(ConfigError::Validation(_))),
				"expected validation error for {case}"
			);
		}
	}

	#[test]
	fn test_missing_network_section() {
		let result: Result<Config, _> = "[token]\nname = \"X\"".parse();
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}

	#[test]
	fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(MINIMAL.as_bytes()).unwrap();

		let config = Config::from_file(file.path()).unwrap();
		assert_eq!(config.network.rpc_url, "http://localhost:8545");

		assert!(matches!(
			Config::from_file("/nonexistent/deployer.toml"),
			Err(ConfigError::Io(_))
		));
	}
}
