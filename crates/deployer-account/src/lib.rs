//! Signing identity for the token deployer.
//!
//! An [`Account`] wraps a locally held secp256k1 key and the address derived
//! from it. Accounts are created once, persisted through an [`AccountStore`]
//! and reused on every later run; the key material is never rendered in full
//! by `Debug` or `Display`.

use alloy_consensus::TxLegacy;
use alloy_network::TxSigner;
use alloy_primitives::{Address, Signature};
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;

mod store;

pub use store::{AccountRecord, AccountStore};

/// Errors that can occur while creating, loading or using an account.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The private key is not 32 bytes of hex.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The signer rejected the transaction.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// The persisted account file could not be read, parsed or written.
	#[error("Persistence error: {0}")]
	Persistence(String),
}

/// A keypair together with its derived address.
#[derive(Clone)]
pub struct Account {
	signer: PrivateKeySigner,
}

impl Account {
	/// Generates a fresh random keypair.
	pub fn generate() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}

	/// Restores an account from a hex-encoded private key.
	///
	/// The key may carry a `0x` prefix and must decode to exactly 32 bytes.
	pub fn from_private_key(private_key_hex: &str) -> Result<Self, AccountError> {
		let trimmed = private_key_hex.trim();
		let without_prefix = trimmed.strip_prefix("0x").unwrap_or(trimmed);

		if without_prefix.len() != 64 {
			return Err(AccountError::InvalidKey(
				"Private key must be 64 hex characters (32 bytes)".to_string(),
			));
		}
		if hex::decode(without_prefix).is_err() {
			return Err(AccountError::InvalidKey(
				"Private key must be valid hexadecimal".to_string(),
			));
		}

		let signer = without_prefix
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {e}")))?;

		Ok(Self { signer })
	}

	/// Address derived from the private key.
	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Full private key as `0x`-prefixed hex. Only for persistence.
	pub fn private_key_hex(&self) -> String {
		format!("0x{}", hex::encode(self.signer.to_bytes()))
	}

	/// Private key reduced to its first 6 and last 4 characters.
	pub fn masked_private_key(&self) -> String {
		mask_secret(&self.private_key_hex())
	}

	/// Signs a legacy transaction in place, returning the signature.
	///
	/// The transaction's `chain_id` is honoured, producing an EIP-155 signature.
	pub async fn sign_transaction(&self, tx: &mut TxLegacy) -> Result<Signature, AccountError> {
		self.signer
			.sign_transaction(tx)
			.await
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign transaction: {e}")))
	}
}

impl std::fmt::Debug for Account {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Account")
			.field("address", &self.address())
			.field("private_key", &self.masked_private_key())
			.finish()
	}
}

impl std::fmt::Display for Account {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.address())
	}
}

/// Masks a secret string as `abcdef...wxyz`.
pub fn mask_secret(secret: &str) -> String {
	if secret.len() <= 10 {
		return "*".repeat(secret.len());
	}
	format!("{}...{}", &secret[..6], &secret[secret.len() - 4..])
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, Bytes, TxKind, U256};

	// First well-known anvil development key.
	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	#[test]
	fn test_from_private_key_derives_address() {
		let account = Account::from_private_key(DEV_KEY).unwrap();
		assert_eq!(
			account.address(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);

		let unprefixed = Account::from_private_key(&DEV_KEY[2..]).unwrap();
		assert_eq!(unprefixed.address(), account.address());
	}

	#[test]
	fn test_from_private_key_rejects_bad_input() {
		assert!(matches!(
			Account::from_private_key("0x1234"),
			Err(AccountError::InvalidKey(_))
		));
		let not_hex = format!("0x{}", "zz".repeat(32));
		assert!(matches!(
			Account::from_private_key(&not_hex),
			Err(AccountError::InvalidKey(_))
		));
	}

	#[test]
	fn test_generate_produces_distinct_accounts() {
		let a = Account::generate();
		let b = Account::generate();
		assert_ne!(a.address(), b.address());
		assert_eq!(a.private_key_hex().len(), 66);
	}

	#[test]
	fn test_private_key_never_in_debug() {
		let account = Account::from_private_key(DEV_KEY).unwrap();
		let rendered = format!("{account:?}");
		assert!(!rendered.contains(&DEV_KEY[2..]));
		assert!(rendered.contains("0xac09...ff80"));
		assert_eq!(account.masked_private_key(), "0xac09...ff80");
	}

	#[test]
	fn test_mask_short_secret() {
		assert_eq!(mask_secret("abc"), "***");
	}

	#[tokio::test]
	async fn test_sign_transaction() {
		let account = Account::from_private_key(DEV_KEY).unwrap();
		let mut tx = TxLegacy {
			chain_id: Some(11155111),
			nonce: 0,
			gas_price: 1_000_000_000,
			gas_limit: 21_000,
			to: TxKind::Call(address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")),
			value: U256::ZERO,
			input: Bytes::new(),
		};

		let signature = account.sign_transaction(&mut tx).await.unwrap();
		let again = account.sign_transaction(&mut tx).await.unwrap();
		assert_eq!(signature, again);
	}
}
