//! Token operations against the recorded deployment
//!
//! Transfers and account inspection. Both require the state left behind by
//! a successful pipeline run: a persisted account and a recorded contract
//! address.

use crate::constants::DEFAULT_TRANSFER_AMOUNT;
use crate::models::TransferReport;
use crate::types::error::{Error, Result};
use crate::Context;
use alloy_primitives::{Address, U256};
use deployer_account::{Account, AccountStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Summary of the deployer account.
#[derive(Debug, Clone)]
pub struct AccountSummary {
	pub address: Address,
	pub masked_private_key: String,
	/// Native balance in wei.
	pub balance: U256,
	/// Token balance in base units, when a deployment is recorded.
	pub token_balance: Option<TokenBalance>,
}

#[derive(Debug, Clone)]
pub struct TokenBalance {
	pub token: Address,
	pub symbol: String,
	pub decimals: u8,
	pub balance: U256,
}

/// Result of a transfer, including the generated recipient when one was created.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
	pub report: TransferReport,
	pub symbol: String,
	pub decimals: u8,
	/// Present when the recipient was generated for this transfer.
	pub generated_recipient: Option<GeneratedRecipient>,
}

/// A recipient keypair created for a transfer, saved so the tokens stay reachable.
#[derive(Debug, Clone)]
pub struct GeneratedRecipient {
	pub account: Account,
	pub path: PathBuf,
}

pub struct TokenOps {
	ctx: Arc<Context>,
}

impl TokenOps {
	pub fn new(ctx: Arc<Context>) -> Self {
		Self { ctx }
	}

	/// Transfers `amount` whole tokens from the deployer account.
	///
	/// Without a recipient a fresh keypair is generated, saved under the
	/// build directory before anything is sent, and used as the target.
	/// Without an amount, 100 tokens are sent.
	#[instrument(skip(self))]
	pub async fn transfer(
		&self,
		to: Option<Address>,
		amount: Option<&str>,
	) -> Result<TransferOutcome> {
		let account = self.ctx.load_account()?;
		let token = self.deployed_address()?;
		let artifact = self.ctx.artifact().await?;

		let (to, generated_recipient) = match to {
			Some(to) => (to, None),
			None => {
				let recipient = self.generate_recipient()?;
				(recipient.account.address(), Some(recipient))
			},
		};
		let amount = amount.unwrap_or(DEFAULT_TRANSFER_AMOUNT);

		let client = self.ctx.contract_client(token, &artifact);
		let report = client.transfer(to, amount, &account).await?;

		Ok(TransferOutcome {
			report,
			symbol: client.symbol().await?,
			decimals: client.decimals().await?,
			generated_recipient,
		})
	}

	/// Deployer account address, masked key and balances.
	#[instrument(skip(self))]
	pub async fn account(&self) -> Result<AccountSummary> {
		let account = self.ctx.load_account()?;
		let address = account.address();
		let balance = self.ctx.chain.balance(address).await?;

		let token_balance = match self.ctx.deployed_address()? {
			Some(token) => {
				let artifact = self.ctx.artifact().await?;
				let client = self.ctx.contract_client(token, &artifact);
				Some(TokenBalance {
					token,
					symbol: client.symbol().await?,
					decimals: client.decimals().await?,
					balance: client.balance_of(address).await?,
				})
			},
			None => None,
		};

		Ok(AccountSummary {
			address,
			masked_private_key: account.masked_private_key(),
			balance,
			token_balance,
		})
	}

	fn generate_recipient(&self) -> Result<GeneratedRecipient> {
		let account = Account::generate();
		let path = self
			.ctx
			.config
			.recipient_path(&account.address().to_checksum(None));
		AccountStore::new(&path).save(&account)?;
		info!(
			recipient = %account.address(),
			path = %path.display(),
			"Generated transfer recipient"
		);
		Ok(GeneratedRecipient { account, path })
	}

	fn deployed_address(&self) -> Result<Address> {
		self.ctx
			.deployed_address()?
			.ok_or_else(|| Error::ContractNotDeployed(self.ctx.config.address_path()))
	}
}
