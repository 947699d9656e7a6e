mod hash;

pub mod error;
pub mod random;

pub use error::ProofFormatError;
pub use hash::*;
