//! File storage for the build directory
//!
//! The deployer persists two things here besides the account: the compiled
//! artifact (a JSON file per contract) and the deployed contract address (a
//! plain text file). Each load distinguishes "absent", which callers treat
//! as a stage that still has to run, from "present but unreadable", which
//! is a hard error.

use crate::types::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// JSON and text files under a single root directory.
#[derive(Debug, Clone)]
pub struct Storage {
	root: Arc<PathBuf>,
}

impl Storage {
	/// The root directory is created on first write.
	pub fn new(root: &Path) -> Self {
		Self {
			root: Arc::new(root.to_path_buf()),
		}
	}

	/// Saves serializable data to `<root>/<key>.json`
	///
	/// # Errors
	/// Returns error if directory creation, file creation or serialization fails
	pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
		let path = self.json_path(key);
		let json = serde_json::to_string_pretty(value)
			.map_err(|e| Error::Persistence(format!("Failed to encode {key}: {e}")))?;
		self.write(&path, json.as_bytes())
	}

	/// Loads `<root>/<key>.json`
	///
	/// # Returns
	/// `None` when the file does not exist
	///
	/// # Errors
	/// Returns Error::Persistence if the file exists but cannot be read or decoded
	pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
		let path = self.json_path(key);
		if !path.exists() {
			return Ok(None);
		}

		let content = std::fs::read_to_string(&path)
			.map_err(|e| Error::Persistence(format!("Failed to read {}: {e}", path.display())))?;
		let value = serde_json::from_str(&content)
			.map_err(|e| Error::Persistence(format!("Malformed {}: {e}", path.display())))?;
		Ok(Some(value))
	}

	/// Saves a plain text file under the root.
	pub fn save_text(&self, file_name: &str, content: &str) -> Result<()> {
		let path = self.root.join(file_name);
		self.write(&path, content.as_bytes())
	}

	/// Loads a plain text file, trimmed. `None` when absent.
	pub fn load_text(&self, file_name: &str) -> Result<Option<String>> {
		let path = self.root.join(file_name);
		if !path.exists() {
			return Ok(None);
		}
		std::fs::read_to_string(&path)
			.map(|s| Some(s.trim().to_string()))
			.map_err(|e| Error::Persistence(format!("Failed to read {}: {e}", path.display())))
	}

	/// Path of the JSON file for `key`.
	pub fn json_path(&self, key: &str) -> PathBuf {
		self.root.join(format!("{key}.json"))
	}

	/// Writes through a temporary file in the same directory and renames it
	/// into place, so `path` holds either the old or the new content.
	fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
		let failed = |e: std::io::Error| {
			Error::Persistence(format!("Failed to write {}: {e}", path.display()))
		};
		let parent = path
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or(Path::new("."));
		std::fs::create_dir_all(parent).map_err(|e| {
			Error::Persistence(format!("Failed to create {}: {e}", parent.display()))
		})?;

		let mut file = NamedTempFile::new_in(parent).map_err(failed)?;
		file.write_all(bytes).map_err(failed)?;
		file.as_file().sync_all().map_err(failed)?;
		file.persist(path).map_err(|e| failed(e.error))?;
		Ok(())
	}
}
