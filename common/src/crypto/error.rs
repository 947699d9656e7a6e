use thiserror::Error;

/// Errors raised while parsing a seed, block hash or commit hash
///
/// Every proof value is rendered as `0x` followed by 64 hexadecimal digits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofFormatError {
    /// Value does not start with the `0x` prefix
    #[error("Missing 0x prefix")]
    MissingPrefix,

    /// Wrong number of hex digits after the prefix
    #[error("Invalid proof hash length: {len} hex digits, expected: {expected} hex digits")]
    InvalidLength { len: usize, expected: usize },

    /// Hex decode error
    #[error("Failed to decode hex: {0}")]
    DecodeError(String),
}
