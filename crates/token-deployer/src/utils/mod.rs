pub mod amount;

pub use amount::{format_ether, format_gwei, format_units, to_base_units};
