//! Pre-deployment checks: code size, cost heuristic and ABI surface.

pub mod abi;
pub mod bytecode;

pub use abi::{event_signatures, function_signatures, verify_token_abi, AbiReport};
pub use bytecode::{check_size, estimate_deploy_cost, size_bytes, CostEstimate, SizeReport};
