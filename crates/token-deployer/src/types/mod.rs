//! Shared types: the error enum and hex helpers.

pub mod error;
pub mod hex;

pub use error::{Error, Result};
pub use hex::Hex;
