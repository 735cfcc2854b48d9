use super::{CompileRequest, CompilerInterface, CompilerOutput};
use crate::types::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Runs a locally installed `solc` binary.
///
/// The binary is the configured path when given, otherwise `solc-<version>`
/// and then `solc` on `PATH`. Whichever is found must report exactly the
/// requested version.
#[derive(Debug, Clone, Default)]
pub struct SolcToolchain {
	solc_path: Option<PathBuf>,
}

impl SolcToolchain {
	pub fn new(solc_path: Option<PathBuf>) -> Self {
		Self { solc_path }
	}

	/// Locates a candidate binary for `version`.
	pub fn resolve(&self, version: &str) -> Result<PathBuf> {
		if let Some(path) = &self.solc_path {
			if path.exists() {
				return Ok(path.clone());
			}
			return Err(Error::Toolchain(format!(
				"configured solc binary {} does not exist",
				path.display()
			)));
		}

		which::which(format!("solc-{version}"))
			.or_else(|_| which::which("solc"))
			.map_err(|_| {
				Error::Toolchain(format!(
					"solc {version} not found on PATH; install it (for example `svm install {version}`) or set compiler.solc_path"
				))
			})
	}

	/// Version reported by `solc --version`, e.g. `0.8.19`.
	pub async fn installed_version(&self, binary: &Path) -> Result<String> {
		let output = Command::new(binary)
			.arg("--version")
			.output()
			.await
			.map_err(|e| Error::Toolchain(format!("failed to run {}: {e}", binary.display())))?;
		if !output.status.success() {
			return Err(Error::Toolchain(format!(
				"{} --version exited with {}",
				binary.display(),
				output.status
			)));
		}
		parse_version(&String::from_utf8_lossy(&output.stdout))
	}
}

/// Extracts `X.Y.Z` from `solc --version` output.
pub(crate) fn parse_version(output: &str) -> Result<String> {
	let re = Regex::new(r"Version:\s*(\d+\.\d+\.\d+)")
		.map_err(|e| Error::Toolchain(format!("Regex error: {e}")))?;
	re.captures(output)
		.and_then(|cap| cap.get(1))
		.map(|m| m.as_str().to_string())
		.ok_or_else(|| Error::Toolchain(format!("unrecognized solc version output: {output}")))
}

/// Arguments for a combined-JSON compilation of `request`.
pub(crate) fn compile_args(request: &CompileRequest) -> Vec<String> {
	let mut args = vec!["--combined-json".to_string(), "abi,bin".to_string()];
	if request.optimize {
		args.push("--optimize".to_string());
		args.push("--optimize-runs".to_string());
		args.push(request.optimize_runs.to_string());
	}
	args.push(request.source.display().to_string());
	args
}

#[async_trait]
impl CompilerInterface for SolcToolchain {
	async fn compile(&self, request: &CompileRequest) -> Result<CompilerOutput> {
		let binary = self.resolve(&request.version)?;
		let installed = self.installed_version(&binary).await?;
		if installed != request.version {
			return Err(Error::Toolchain(format!(
				"{} is solc {installed}, but {} is required",
				binary.display(),
				request.version
			)));
		}

		let args = compile_args(request);
		debug!(solc = %binary.display(), args = ?args, "Invoking compiler");
		let output = Command::new(&binary)
			.args(&args)
			.output()
			.await
			.map_err(|e| Error::Toolchain(format!("failed to run {}: {e}", binary.display())))?;

		if !output.status.success() {
			return Err(Error::Toolchain(
				String::from_utf8_lossy(&output.stderr).trim().to_string(),
			));
		}

		serde_json::from_slice(&output.stdout)
			.map_err(|e| Error::Toolchain(format!("unreadable compiler output: {e}")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_version() {
		let output = "solc, the solidity compiler commandline interface\nVersion: 0.8.19+commit.7dd6d404.Linux.g++\n";
		assert_eq!(parse_version(output).unwrap(), "0.8.19");
		assert!(matches!(
			parse_version("garbage"),
			Err(Error::Toolchain(_))
		));
	}

	#[test]
	fn test_compile_args_with_optimizer() {
		let request = CompileRequest {
			source: PathBuf::from("contracts/SimpleToken.sol"),
			contract_name: "SimpleToken".into(),
			version: "0.8.19".into(),
			optimize: true,
			optimize_runs: 200,
		};
		assert_eq!(
			compile_args(&request),
			vec![
				"--combined-json",
				"abi,bin",
				"--optimize",
				"--optimize-runs",
				"200",
				"contracts/SimpleToken.sol"
			]
		);
	}

	#[test]
	fn test_compile_args_without_optimizer() {
		let request = CompileRequest {
			source: PathBuf::from("a.sol"),
			contract_name: "A".into(),
			version: "0.8.19".into(),
			optimize: false,
			optimize_runs: 200,
		};
		assert_eq!(compile_args(&request), vec!["--combined-json", "abi,bin", "a.sol"]);
	}

	#[test]
	fn test_missing_configured_binary() {
		let toolchain = SolcToolchain::new(Some(PathBuf::from("/nonexistent/solc")));
		assert!(matches!(
			toolchain.resolve("0.8.19"),
			Err(Error::Toolchain(_))
		));
	}
}
