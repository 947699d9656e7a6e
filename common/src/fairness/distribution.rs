use serde::Serialize;

use crate::config::{BPS_DENOMINATOR, DISTRIBUTION_FORMULA, FLOOR_DIVISOR, MAX_PLATFORM_FEE_BPS};

use super::{DistributionError, DistributionResult, RandomValue};

/// Full accounting of a pool split
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// Final payout per participant, same order as the stakes
    pub payouts: Vec<u64>,
    pub total_stakes: u64,
    pub platform_fee: u64,
    /// Stakes minus the platform fee
    pub total_pool: u64,
    /// Guaranteed floor per participant
    pub base_payouts: Vec<u64>,
    /// Share of the bonus pool per participant
    pub bonus_shares: Vec<u64>,
    /// Part of the pool left after the floors, split by random weight
    pub bonus_pool: u64,
    pub formula: &'static str,
}

impl Distribution {
    // Sum of all payouts
    pub fn total_paid(&self) -> u64 {
        self.payouts.iter().sum()
    }

    // Units of the pool lost to integer division, at most one per participant
    pub fn rounding_loss(&self) -> u64 {
        self.total_pool.saturating_sub(self.total_paid())
    }
}

// floor(amount * bps / 10000), never larger than `amount` for a valid fee
#[inline]
pub fn fee_of(amount: u64, platform_fee_bps: u16) -> u64 {
    let fee = amount as u128 * platform_fee_bps as u128 / BPS_DENOMINATOR as u128;
    u64::try_from(fee).unwrap_or(u64::MAX)
}

// Stake left after the platform fee
#[inline]
pub fn net_stake(stake: u64, platform_fee_bps: u16) -> u64 {
    stake.saturating_sub(fee_of(stake, platform_fee_bps))
}

// Guaranteed floor payout: half of the participant's own net stake
#[inline]
pub fn base_payout(stake: u64, platform_fee_bps: u16) -> u64 {
    net_stake(stake, platform_fee_bps) / FLOOR_DIVISOR
}

/// Split a pool between participants
///
/// Every participant receives the floor computed from its own stake, then the
/// remaining bonus pool is shared proportionally to the random weights.
/// All arithmetic is integer (u128 intermediates), rounding always goes down
/// so the sum of payouts never exceeds the pool and misses it by at most one
/// unit per participant.
///
/// When every weight is zero no bonus is distributed and payouts equal the
/// floors.
pub fn calculate_distribution(
    stakes: &[u64],
    random_values: &[RandomValue],
    platform_fee_bps: u16,
) -> DistributionResult<Distribution> {
    if stakes.len() != random_values.len() {
        return Err(DistributionError::LengthMismatch {
            stakes: stakes.len(),
            random_values: random_values.len(),
        });
    }
    if stakes.is_empty() {
        return Err(DistributionError::NoParticipants);
    }
    if platform_fee_bps > MAX_PLATFORM_FEE_BPS {
        return Err(DistributionError::InvalidFeeBps {
            bps: platform_fee_bps,
            max: MAX_PLATFORM_FEE_BPS,
        });
    }

    let total_stakes = stakes.iter().try_fold(0u64, |total, stake| {
        total
            .checked_add(*stake)
            .ok_or(DistributionError::Overflow)
    })?;
    let platform_fee = fee_of(total_stakes, platform_fee_bps);
    let total_pool = total_stakes - platform_fee;

    let base_payouts: Vec<u64> = stakes
        .iter()
        .map(|stake| base_payout(*stake, platform_fee_bps))
        .collect();
    let total_base_payouts: u64 = base_payouts.iter().sum();

    // Per-participant fee rounding can only make the floors smaller than the
    // pool share, clamp anyway so a degenerate input never underflows
    let bonus_pool = total_pool.saturating_sub(total_base_payouts);

    let total_weight: u128 = random_values.iter().map(|v| *v as u128).sum();
    let bonus_shares: Vec<u64> = if total_weight == 0 {
        vec![0; stakes.len()]
    } else {
        random_values
            .iter()
            .map(|value| {
                let share = bonus_pool as u128 * *value as u128 / total_weight;
                // share <= bonus_pool as value <= total_weight
                u64::try_from(share).unwrap_or(bonus_pool)
            })
            .collect()
    };

    let payouts = base_payouts
        .iter()
        .zip(bonus_shares.iter())
        .map(|(base, bonus)| base + bonus)
        .collect();

    Ok(Distribution {
        payouts,
        total_stakes,
        platform_fee,
        total_pool,
        base_payouts,
        bonus_shares,
        bonus_pool,
        formula: DISTRIBUTION_FORMULA,
    })
}
