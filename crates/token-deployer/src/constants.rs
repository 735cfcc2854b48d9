//! Fixed values shared across the deployer.

/// EIP-170 contract code size limit, in bytes.
pub const BYTECODE_SIZE_LIMIT: usize = 24 * 1024;

/// Heuristic deployment gas per byte of creation code.
pub const GAS_PER_BYTE: u64 = 200;

/// Intrinsic gas of any transaction.
pub const BASE_TX_GAS: u64 = 21_000;

/// Number of bytecode hex characters shown by the analyzer.
pub const BYTECODE_PREVIEW_CHARS: usize = 100;

/// Amount transferred when the CLI is not given one, in whole tokens.
pub const DEFAULT_TRANSFER_AMOUNT: &str = "100";

/// Suggested minimum native balance before deploying, in ether.
pub const RECOMMENDED_BALANCE_ETH: &str = "0.1";

/// Placeholder address reported by deployment simulation.
pub const SIMULATED_CONTRACT_ADDRESS: &str = "0x1234567890123456789012345678901234567890";

/// Functions an ERC20-style token must expose.
pub const REQUIRED_FUNCTIONS: &[&str] = &[
	"name",
	"symbol",
	"decimals",
	"totalSupply",
	"balanceOf",
	"transfer",
	"transferFrom",
	"approve",
	"allowance",
];

/// Events an ERC20-style token must declare.
pub const REQUIRED_EVENTS: &[&str] = &["Transfer", "Approval"];

/// Public Sepolia faucets shown when the deployer account is empty.
pub const FAUCETS: &[&str] = &[
	"https://sepoliafaucet.com/",
	"https://sepolia-faucet.pk910.de/",
	"https://faucet.sepolia.dev/",
];
