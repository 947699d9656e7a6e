use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    crypto::{hash_str, to_proof_hex, ProofFormatError, ProofHash},
    time::TimestampSeconds,
};

/// Public material needed to re-run a distribution
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RandomnessProof {
    /// Seed derived from the round state at distribution time
    pub seed: String,
    /// External entropy supplied by the ledger
    pub block_hash: String,
    /// Height of the block `block_hash` was taken from
    pub block_height: u64,
    /// Commitment to the seed, see `commit_hash`
    pub commit_hash: String,
    /// When the seed was revealed (distribution time)
    pub reveal_timestamp: TimestampSeconds,
}

// Parse a seed or block hash, rejecting anything but 0x + 64 hex digits
pub fn parse_proof_hex(value: &str) -> Result<ProofHash, ProofFormatError> {
    ProofHash::from_str(value)
}

pub fn is_valid_seed(seed: &str) -> bool {
    parse_proof_hex(seed).is_ok()
}

pub fn is_valid_block_hash(block_hash: &str) -> bool {
    parse_proof_hex(block_hash).is_ok()
}

// Commitment to a seed: hash(seed ++ salt) in the proof format
pub fn commit_hash(seed: &str, salt: &str) -> String {
    to_proof_hex(hash_str(&format!("{}{}", seed, salt)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

    #[test]
    fn test_validate_seed() {
        assert!(is_valid_seed(SEED));
        assert!(is_valid_seed(&SEED.to_uppercase().replacen("0X", "0x", 1)));
        assert!(!is_valid_seed("0x123"));
        assert!(!is_valid_seed("invalid"));
        assert!(!is_valid_seed(&SEED[2..]));
        assert!(!is_valid_seed(&format!("{}00", SEED)));
    }

    #[test]
    fn test_validate_block_hash() {
        assert!(is_valid_block_hash(
            "0xfedcba0987654321fedcba0987654321fedcba0987654321fedcba0987654321"
        ));
        assert!(!is_valid_block_hash("0x123"));
        assert!(!is_valid_block_hash("block-1a2b3c4d"));
    }

    #[test]
    fn test_commit_hash() {
        let commit = commit_hash(SEED, "salt123");
        assert_eq!(
            commit,
            "0x0000000000000000000000000000000000000000000000000000000090b914dc"
        );
        assert!(is_valid_seed(&commit));
        assert_eq!(commit, commit_hash(SEED, "salt123"));
        assert_ne!(commit, commit_hash(SEED, "salt456"));
    }

    #[test]
    fn test_proof_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let proof = RandomnessProof {
            seed: SEED.to_string(),
            block_hash: SEED.to_string(),
            block_height: 7,
            commit_hash: commit_hash(SEED, "1"),
            reveal_timestamp: 1_700_000_000,
        };
        let value = serde_json::to_value(&proof)?;
        assert_eq!(value["blockHeight"], 7);
        assert_eq!(value["revealTimestamp"], 1_700_000_000u64);
        let decoded: RandomnessProof = serde_json::from_value(value)?;
        assert_eq!(decoded, proof);
        Ok(())
    }
}
