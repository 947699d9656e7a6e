// Round seed derivation
//
// The seed only depends on public round metadata and a 10 seconds time
// bucket, then goes through the 32-bit rolling hash. Anyone knowing the
// participants can predict it for the next bucket: it is NOT a source of
// secrecy. Unpredictability comes from the block hash mixed in at
// distribution time.

use crate::{
    config::SEED_TIME_BUCKET_SECS,
    crypto::{hash_str, to_proof_hex},
    time::{time_bucket, TimestampSeconds},
};

use super::RoundId;

// Seed of a round closed at `now`
//
// Participants are sorted so the seed does not depend on join order.
// Two calls inside the same time bucket return the same seed, the round id
// keeps two rounds with the same participants apart.
pub fn derive_round_seed<S: AsRef<str>>(
    id: RoundId,
    created_at: TimestampSeconds,
    participants: &[S],
    now: TimestampSeconds,
) -> String {
    let mut sorted: Vec<&str> = participants.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let material = format!(
        "{}-{}-{}-{}",
        id,
        created_at,
        sorted.join(","),
        time_bucket(now, SEED_TIME_BUCKET_SECS)
    );
    to_proof_hex(hash_str(&material))
}

// Salt the seed commitment of a round is computed with
pub fn commit_salt(id: RoundId) -> String {
    format!("round-{}", id)
}
