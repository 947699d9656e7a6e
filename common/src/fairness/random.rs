use crate::crypto::hash_str;

// One weight per participant, never zero
pub type RandomValue = u32;

/// Derive one pseudo-random weight per participant
///
/// ```text
/// combined = seed ++ block_hash
/// base     = hash(combined)
/// value_i  = base + hash(combined ++ address_i ++ decimal(i))   (mod 2^32)
/// ```
///
/// A value of zero is replaced by one so every participant carries weight.
/// The result has the same length and order as `addresses`.
pub fn generate_random_values<S: AsRef<str>>(
    seed: &str,
    block_hash: &str,
    addresses: &[S],
) -> Vec<RandomValue> {
    let combined = format!("{}{}", seed, block_hash);
    let base = hash_str(&combined);

    addresses
        .iter()
        .enumerate()
        .map(|(index, address)| {
            let participant_seed = format!("{}{}{}", combined, address.as_ref(), index);
            let value = base.wrapping_add(hash_str(&participant_seed));
            if value == 0 {
                1
            } else {
                value
            }
        })
        .collect()
}
