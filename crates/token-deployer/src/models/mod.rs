//! Data carried between the compiler, pipeline and contract client.

pub mod artifact;
pub mod token;

pub use artifact::{parse_abi, CompiledArtifact};
pub use token::{TokenInfo, TransferReport};
