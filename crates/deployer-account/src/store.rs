//! File-backed persistence for the deployer account.

use crate::{Account, AccountError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// On-disk shape of an account: `{"address": "0x..", "private_key": "0x.."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
	pub address: String,
	pub private_key: String,
}

impl From<&Account> for AccountRecord {
	fn from(account: &Account) -> Self {
		Self {
			address: account.address().to_checksum(None),
			private_key: account.private_key_hex(),
		}
	}
}

/// Stores a single account as a JSON file.
#[derive(Debug, Clone)]
pub struct AccountStore {
	path: PathBuf,
}

impl AccountStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn exists(&self) -> bool {
		self.path.exists()
	}

	/// Writes the account, creating parent directories as needed.
	///
	/// The record is written to a temporary file next to the target and
	/// renamed over it, so an interrupted save never leaves a truncated file.
	pub fn save(&self, account: &Account) -> Result<(), AccountError> {
		let failed = |e: std::io::Error| {
			AccountError::Persistence(format!("Failed to write {}: {e}", self.path.display()))
		};
		let parent = self
			.path
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or(Path::new("."));
		std::fs::create_dir_all(parent).map_err(|e| {
			AccountError::Persistence(format!("Failed to create {}: {e}", parent.display()))
		})?;

		let record = AccountRecord::from(account);
		let json = serde_json::to_string_pretty(&record)
			.map_err(|e| AccountError::Persistence(format!("Failed to encode account: {e}")))?;

		let mut file = NamedTempFile::new_in(parent).map_err(failed)?;
		file.write_all(json.as_bytes()).map_err(failed)?;
		file.as_file().sync_all().map_err(failed)?;
		file.persist(&self.path).map_err(|e| failed(e.error))?;

		debug!(path = %self.path.display(), address = %account.address(), "Account saved");
		Ok(())
	}

	/// Loads the persisted account.
	///
	/// Returns `Ok(None)` when no file exists. A file that cannot be parsed, or
	/// whose stored address does not belong to its key, is an error rather
	/// than a miss so that an existing funded key is never replaced.
	pub fn load(&self) -> Result<Option<Account>, AccountError> {
		if !self.path.exists() {
			return Ok(None);
		}

		let content = std::fs::read_to_string(&self.path).map_err(|e| {
			AccountError::Persistence(format!("Failed to read {}: {e}", self.path.display()))
		})?;
		let record: AccountRecord = serde_json::from_str(&content).map_err(|e| {
			AccountError::Persistence(format!("Malformed account file {}: {e}", self.path.display()))
		})?;

		let account = Account::from_private_key(&record.private_key)
			.map_err(|e| AccountError::Persistence(format!("Stored private key unusable: {e}")))?;

		let stored: alloy_primitives::Address = record.address.parse().map_err(|e| {
			AccountError::Persistence(format!("Stored address '{}' invalid: {e}", record.address))
		})?;
		if stored != account.address() {
			return Err(AccountError::Persistence(format!(
				"Stored address {stored} does not match key-derived address {}",
				account.address()
			)));
		}

		Ok(Some(account))
	}

	/// Loads the persisted account or creates and saves a new one.
	///
	/// The boolean is `true` when the account was created by this call.
	pub fn load_or_create(&self) -> Result<(Account, bool), AccountError> {
		if let Some(account) = self.load()? {
			debug!(address = %account.address(), "Loaded existing account");
			return Ok((account, false));
		}

		let account = Account::generate();
		self.save(&account)?;
		info!(
			address = %account.address(),
			private_key = %account.masked_private_key(),
			path = %self.path.display(),
			"Created new account"
		);
		Ok((account, true))
	}
}
