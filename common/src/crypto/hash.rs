use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error, Formatter},
    str::FromStr,
};

use crate::config::{PROOF_HEX_DIGITS, PROOF_HEX_PREFIX};

use super::ProofFormatError;

pub const HASH_SIZE: usize = 32; // 32 bytes / 256 bits

// Multiplier of the rolling hash, `(h << 5) - h` is `h * 31`
pub const ROLLING_HASH_MULTIPLIER: u32 = 31;

// Hash a byte array with the 32-bit rolling hash used by the fairness proof
//
// h = h * 31 + byte, truncated to 32 bits after every step.
// This is NOT a cryptographic hash: it only has to be reproducible bit for bit
// by any third party re-running a distribution.
#[inline]
pub fn rolling_hash(value: &[u8]) -> u32 {
    value.iter().fold(0u32, |hash, byte| {
        hash.wrapping_mul(ROLLING_HASH_MULTIPLIER)
            .wrapping_add(*byte as u32)
    })
}

// Hash the UTF-8 encoding of a string
#[inline]
pub fn hash_str(value: &str) -> u32 {
    rolling_hash(value.as_bytes())
}

// Render a 32-bit hash in the proof format (0x + 64 hex digits, zero padded)
pub fn to_proof_hex(value: u32) -> String {
    ProofHash::from_u32(value).to_string()
}

/// 256-bit value carried by seeds, block hashes and commit hashes
///
/// Only the low 32 bits are produced by the rolling hash; the wider format
/// leaves room for a stronger hash without changing the record layout.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Debug, Hash)]
pub struct ProofHash([u8; HASH_SIZE]);

impl ProofHash {
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        ProofHash(bytes)
    }

    pub const fn zero() -> Self {
        ProofHash::new([0; HASH_SIZE])
    }

    // Big-endian, the value lands in the last 4 bytes
    pub fn from_u32(value: u32) -> Self {
        let mut bytes = [0u8; HASH_SIZE];
        bytes[HASH_SIZE - 4..].copy_from_slice(&value.to_be_bytes());
        ProofHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ProofHash {
    type Err = ProofFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(PROOF_HEX_PREFIX)
            .ok_or(ProofFormatError::MissingPrefix)?;
        if digits.len() != PROOF_HEX_DIGITS {
            return Err(ProofFormatError::InvalidLength {
                len: digits.len(),
                expected: PROOF_HEX_DIGITS,
            });
        }

        let decoded =
            hex::decode(digits).map_err(|e| ProofFormatError::DecodeError(e.to_string()))?;
        let bytes: [u8; HASH_SIZE] = decoded.try_into().map_err(|_| {
            ProofFormatError::InvalidLength {
                len: digits.len(),
                expected: PROOF_HEX_DIGITS,
            }
        })?;
        Ok(ProofHash::new(bytes))
    }
}

impl Display for ProofHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}{}", PROOF_HEX_PREFIX, self.to_hex())
    }
}

impl Serialize for ProofHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'a> Deserialize<'a> for ProofHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let value = String::deserialize(deserializer)?;
        ProofHash::from_str(&value).map_err(SerdeError::custom)
    }
}

impl AsRef<[u8]> for ProofHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
