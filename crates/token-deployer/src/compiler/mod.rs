//! Contract compilation and artifact caching.
//!
//! [`CompilerInterface`] abstracts the external compiler; [`SolcToolchain`]
//! is the `solc` implementation. [`CompilationCache`] sits in front of it
//! and persists the selected contract's ABI and bytecode, so a populated
//! cache skips the toolchain entirely.

mod solc;

pub use solc::SolcToolchain;

use crate::core::Storage;
use crate::models::CompiledArtifact;
use crate::types::error::{Error, Result};
use async_trait::async_trait;
use deployer_config::CompilerConfig;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Inputs of a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
	pub source: PathBuf,
	pub contract_name: String,
	/// Exact compiler version, e.g. `0.8.19`.
	pub version: String,
	pub optimize: bool,
	pub optimize_runs: u32,
}

impl From<&CompilerConfig> for CompileRequest {
	fn from(config: &CompilerConfig) -> Self {
		Self {
			source: config.source.clone(),
			contract_name: config.contract_name.clone(),
			version: config.version.clone(),
			optimize: config.optimize,
			optimize_runs: config.optimize_runs,
		}
	}
}

/// One contract in the compiler output.
#[derive(Debug, Clone, Deserialize)]
pub struct CompiledUnit {
	pub abi: Value,
	#[serde(default)]
	pub bin: String,
}

/// Combined-JSON compiler output, keyed `<source path>:<contract name>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerOutput {
	#[serde(default)]
	pub contracts: BTreeMap<String, CompiledUnit>,
	#[serde(default)]
	pub version: Option<String>,
}

impl CompilerOutput {
	/// Selects the unit whose key ends with `:<contract_name>`.
	pub fn select(&self, contract_name: &str) -> Result<&CompiledUnit> {
		let suffix = format!(":{contract_name}");
		self.contracts
			.iter()
			.find(|(key, _)| key.ends_with(&suffix))
			.map(|(_, unit)| unit)
			.ok_or_else(|| Error::ContractNotFound {
				name: contract_name.to_string(),
				available: self
					.contracts
					.keys()
					.cloned()
					.collect::<Vec<_>>()
					.join(", "),
			})
	}
}

/// The external compiler.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait CompilerInterface: Send + Sync {
	/// Compiles `request.source` with the pinned compiler version.
	async fn compile(&self, request: &CompileRequest) -> Result<CompilerOutput>;
}

/// Whether [`CompilationCache::load_or_compile`] ran the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
	Hit,
	Compiled,
}

/// Persists the compiled artifact of one contract per file.
#[derive(Clone)]
pub struct CompilationCache {
	compiler: Arc<dyn CompilerInterface>,
	storage: Storage,
}

impl CompilationCache {
	pub fn new(compiler: Arc<dyn CompilerInterface>, storage: Storage) -> Self {
		Self { compiler, storage }
	}

	/// The cached artifact for `contract_name`, if any.
	///
	/// A cache file that exists but fails ABI validation is an error.
	pub fn cached(&self, contract_name: &str) -> Result<Option<CompiledArtifact>> {
		self.storage.load(contract_name)
	}

	/// Runs the compiler and persists the selected contract.
	///
	/// Nothing is written unless compilation and selection both succeed.
	pub async fn compile(&self, request: &CompileRequest) -> Result<CompiledArtifact> {
		if !request.source.exists() {
			return Err(Error::SourceNotFound(request.source.clone()));
		}

		info!(
			source = %request.source.display(),
			contract = %request.contract_name,
			version = %request.version,
			optimize = request.optimize,
			runs = request.optimize_runs,
			"Compiling contract"
		);
		let output = self.compiler.compile(request).await?;
		let unit = output.select(&request.contract_name)?;
		if unit.bin.is_empty() {
			return Err(Error::Toolchain(format!(
				"'{}' has no bytecode; is it abstract or an interface?",
				request.contract_name
			)));
		}

		let artifact = CompiledArtifact::from_parts(unit.abi.clone(), &unit.bin)?;
		self.storage.save(&request.contract_name, &artifact)?;
		debug!(
			path = %self.storage.json_path(&request.contract_name).display(),
			"Artifact persisted"
		);
		Ok(artifact)
	}

	/// Returns the cached artifact, compiling only on a miss.
	pub async fn load_or_compile(
		&self,
		request: &CompileRequest,
	) -> Result<(CompiledArtifact, CacheStatus)> {
		if let Some(artifact) = self.cached(&request.contract_name)? {
			debug!(contract = %request.contract_name, "Using cached artifact");
			return Ok((artifact, CacheStatus::Hit));
		}
		let artifact = self.compile(request).await?;
		Ok((artifact, CacheStatus::Compiled))
	}

	pub fn artifact_path(&self, contract_name: &str) -> PathBuf {
		self.storage.json_path(contract_name)
	}
}
