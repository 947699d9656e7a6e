/// Cryptographically secure random number generation
///
/// Used by simulated entropy sources and demo tooling. The fairness
/// computation itself never draws randomness: it is a pure function of the
/// public seed and block hash.
use rand::rngs::OsRng;
use rand::RngCore;

use super::ProofHash;

/// Generate cryptographically secure random bytes
pub fn secure_random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a random 256-bit value in the proof format
pub fn secure_random_proof_hash() -> ProofHash {
    ProofHash::new(secure_random_bytes())
}
