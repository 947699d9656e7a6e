//! Property-based tests of the fairness engine
//!
//! Properties tested:
//! - Random values are deterministic, non-zero and sized like the input
//! - Every payout respects the guaranteed floor
//! - Payouts never exceed the pool and lose at most one unit per participant
//! - A honest distribution always verifies, a tampered one never does

#![allow(clippy::disallowed_methods)]

use proptest::prelude::*;
use prizepool_common::{
    config::{MAX_PLATFORM_FEE_BPS, MAX_STAKE, MIN_STAKE},
    fairness::{base_payout, calculate_distribution, generate_random_values, verify_payouts},
};

fn arb_proof_hex() -> impl Strategy<Value = String> {
    prop::array::uniform32(any::<u8>()).prop_map(|bytes| format!("0x{}", hex::encode(bytes)))
}

fn arb_addresses(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[A-Za-z0-9_-]{8,48}", 1..max)
        .prop_map(|addresses| addresses.into_iter().collect())
}

// Addresses with one stake each, stakes may differ
fn arb_participants() -> impl Strategy<Value = (Vec<String>, Vec<u64>)> {
    arb_addresses(40).prop_flat_map(|addresses| {
        let len = addresses.len();
        (
            Just(addresses),
            prop::collection::vec(MIN_STAKE..=MAX_STAKE, len),
        )
    })
}

// Property 1: random values are a pure function of their inputs
proptest! {
    #[test]
    fn test_random_values_deterministic(
        seed in arb_proof_hex(),
        block_hash in arb_proof_hex(),
        addresses in arb_addresses(40),
    ) {
        let first = generate_random_values(&seed, &block_hash, &addresses);
        let second = generate_random_values(&seed, &block_hash, &addresses);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), addresses.len());
        prop_assert!(first.iter().all(|value| *value != 0));
    }
}

// Property 2: floor and conservation
proptest! {
    #[test]
    fn test_distribution_floor_and_conservation(
        (addresses, stakes) in arb_participants(),
        seed in arb_proof_hex(),
        block_hash in arb_proof_hex(),
        fee_bps in 0u16..=MAX_PLATFORM_FEE_BPS,
    ) {
        let random_values = generate_random_values(&seed, &block_hash, &addresses);
        let distribution = calculate_distribution(&stakes, &random_values, fee_bps).unwrap();

        for (payout, stake) in distribution.payouts.iter().zip(stakes.iter()) {
            // INVARIANT: nobody receives less than half of its net stake
            prop_assert!(*payout >= base_payout(*stake, fee_bps));
        }

        let total_paid = distribution.total_paid();
        let count = stakes.len() as u64;
        prop_assert!(total_paid <= distribution.total_pool);
        prop_assert!(distribution.total_pool - total_paid <= count);
        prop_assert_eq!(
            distribution.total_pool + distribution.platform_fee,
            distribution.total_stakes
        );
    }
}

// Property 3: a lone participant gets the whole pool back
proptest! {
    #[test]
    fn test_single_participant_gets_pool(
        stake in MIN_STAKE..=MAX_STAKE,
        random_value in 1u32..,
        fee_bps in 0u16..=MAX_PLATFORM_FEE_BPS,
    ) {
        let distribution = calculate_distribution(&[stake], &[random_value], fee_bps).unwrap();
        prop_assert_eq!(distribution.payouts, vec![distribution.total_pool]);
    }
}

// Property 4: without any weight, payouts fall back to the floors
proptest! {
    #[test]
    fn test_zero_weights_pay_floors(
        stakes in prop::collection::vec(MIN_STAKE..=MAX_STAKE, 1..40),
        fee_bps in 0u16..=MAX_PLATFORM_FEE_BPS,
    ) {
        let zeros = vec![0; stakes.len()];
        let distribution = calculate_distribution(&stakes, &zeros, fee_bps).unwrap();
        prop_assert_eq!(&distribution.payouts, &distribution.base_payouts);
    }
}

// Property 5: verification accepts honest payouts and rejects tampered ones
proptest! {
    #[test]
    fn test_verification_round_trip(
        (addresses, stakes) in arb_participants(),
        seed in arb_proof_hex(),
        block_hash in arb_proof_hex(),
        fee_bps in 0u16..=MAX_PLATFORM_FEE_BPS,
        tampered_index in any::<prop::sample::Index>(),
        delta in 2u64..1_000_000_000,
    ) {
        let random_values = generate_random_values(&seed, &block_hash, &addresses);
        let distribution = calculate_distribution(&stakes, &random_values, fee_bps).unwrap();

        let result = verify_payouts(
            &seed,
            &block_hash,
            &addresses,
            &stakes,
            &distribution.payouts,
            fee_bps,
        );
        prop_assert!(result.is_valid, "{}", result.explanation);

        let mut tampered = distribution.payouts.clone();
        let index = tampered_index.index(tampered.len());
        tampered[index] += delta;

        let result = verify_payouts(&seed, &block_hash, &addresses, &stakes, &tampered, fee_bps);
        prop_assert!(!result.is_valid);
        prop_assert_eq!(result.differences[index], delta);
    }
}
