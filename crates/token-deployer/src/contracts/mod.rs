//! Clients for deployed contracts.

mod client;

pub use client::ContractClient;
