use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::{
    config::PAYOUT_TOLERANCE,
    round::{commit_salt, DistributedRound, RoundId},
};

use super::{
    base_payout, calculate_distribution, commit_hash, generate_random_values, parse_proof_hex,
    VerificationError,
};

/// Outcome of re-running a distribution against claimed payouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    pub recomputed_payouts: Vec<u64>,
    /// |claimed_i - recomputed_i| per participant
    pub differences: Vec<u64>,
    pub explanation: String,
}

impl VerificationResult {
    fn failed(err: VerificationError) -> Self {
        Self {
            is_valid: false,
            recomputed_payouts: Vec::new(),
            differences: Vec::new(),
            explanation: format!("Verification error: {}", err),
        }
    }
}

/// Recompute a distribution from public data and compare it with the claimed payouts
///
/// Meant to be run by third parties on records they do not trust: it never
/// panics nor returns an error. Malformed input (length mismatch, invalid fee)
/// produces `is_valid == false`, empty vectors and an explanation naming the
/// failure. Each payout may differ from the recomputed one by at most
/// `PAYOUT_TOLERANCE` units.
pub fn verify_payouts<S: AsRef<str>>(
    seed: &str,
    block_hash: &str,
    addresses: &[S],
    stakes: &[u64],
    claimed_payouts: &[u64],
    platform_fee_bps: u16,
) -> VerificationResult {
    let (recomputed_payouts, differences) = match recompute(
        seed,
        block_hash,
        addresses,
        stakes,
        claimed_payouts,
        platform_fee_bps,
    ) {
        Ok(result) => result,
        Err(err) => {
            debug!("Fairness verification aborted: {}", err);
            return VerificationResult::failed(err);
        }
    };

    let mismatches = differences
        .iter()
        .filter(|diff| **diff > PAYOUT_TOLERANCE)
        .count();
    let explanation = if mismatches == 0 {
        "Fairness proof verified: recomputed payouts match the recorded payouts".to_string()
    } else {
        let max_difference = differences.iter().copied().max().unwrap_or_default();
        format!(
            "Fairness proof failed: {} of {} payouts differ by more than {} (max difference {})",
            mismatches,
            differences.len(),
            PAYOUT_TOLERANCE,
            max_difference
        )
    };

    VerificationResult {
        is_valid: mismatches == 0,
        recomputed_payouts,
        differences,
        explanation,
    }
}

fn recompute<S: AsRef<str>>(
    seed: &str,
    block_hash: &str,
    addresses: &[S],
    stakes: &[u64],
    claimed_payouts: &[u64],
    platform_fee_bps: u16,
) -> Result<(Vec<u64>, Vec<u64>), VerificationError> {
    let random_values = generate_random_values(seed, block_hash, addresses);
    let distribution = calculate_distribution(stakes, &random_values, platform_fee_bps)?;

    if claimed_payouts.len() != distribution.payouts.len() {
        return Err(VerificationError::ClaimedLengthMismatch {
            claimed: claimed_payouts.len(),
            expected: distribution.payouts.len(),
        });
    }

    let differences = claimed_payouts
        .iter()
        .zip(distribution.payouts.iter())
        .map(|(claimed, recomputed)| claimed.abs_diff(*recomputed))
        .collect();

    Ok((distribution.payouts, differences))
}

/// One named check of a round audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStep {
    pub id: &'static str,
    pub description: &'static str,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl VerificationStep {
    fn check(id: &'static str, description: &'static str, failure: Option<String>) -> Self {
        Self {
            id,
            description,
            passed: failure.is_none(),
            details: failure,
        }
    }
}

/// Audit of a persisted distributed round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessReport {
    pub round_id: RoundId,
    pub is_valid: bool,
    pub message: String,
    pub steps: Vec<VerificationStep>,
    pub payouts: VerificationResult,
}

impl FairnessReport {
    pub fn failed_steps(&self) -> impl Iterator<Item = &VerificationStep> {
        self.steps.iter().filter(|step| !step.passed)
    }
}

/// Audit a distributed round record end to end
///
/// Checks the proof formats, the seed commitment, the accounting of the pool,
/// the floor guarantee and finally recomputes every payout. Like
/// `verify_payouts` it never fails: problems are reported as failed steps.
pub fn verify_round(round: &DistributedRound) -> FairnessReport {
    let proof = &round.proof;
    let entries = &round.payout_distribution;
    let count = entries.len() as u64;
    let mut steps = Vec::with_capacity(8);

    steps.push(VerificationStep::check(
        "seed-format",
        "Seed is 0x followed by 64 hex digits",
        parse_proof_hex(&proof.seed).err().map(|e| e.to_string()),
    ));

    steps.push(VerificationStep::check(
        "block-hash-format",
        "Block hash is 0x followed by 64 hex digits",
        parse_proof_hex(&proof.block_hash)
            .err()
            .map(|e| e.to_string()),
    ));

    let expected_commit = commit_hash(&proof.seed, &commit_salt(round.id));
    steps.push(VerificationStep::check(
        "commit-reveal",
        "Revealed seed matches its commitment",
        (expected_commit != proof.commit_hash).then(|| {
            format!(
                "expected commitment {}, recorded {}",
                expected_commit, proof.commit_hash
            )
        }),
    ));

    let unique: HashSet<&str> = entries.iter().map(|e| e.address.as_str()).collect();
    steps.push(VerificationStep::check(
        "participants",
        "Every participant appears exactly once",
        (unique.len() != entries.len() || entries.len() != round.participants).then(|| {
            format!(
                "{} entries, {} unique addresses, {} participants recorded",
                entries.len(),
                unique.len(),
                round.participants
            )
        }),
    ));

    let total_paid = entries
        .iter()
        .try_fold(0u64, |total, e| total.checked_add(e.amount));
    let conservation_failure = match total_paid {
        None => Some("sum of payouts overflows".to_string()),
        Some(paid) if paid.abs_diff(round.total_pool) > count => Some(format!(
            "paid {} out of a pool of {}",
            paid, round.total_pool
        )),
        Some(_) if round.bank.abs_diff(round.total_pool) > count => Some(format!(
            "bank {} does not match pool {}",
            round.bank, round.total_pool
        )),
        Some(_) => None,
    };
    steps.push(VerificationStep::check(
        "total-conservation",
        "Payouts add up to the pool within one unit per participant",
        conservation_failure,
    ));

    let floor = base_payout(round.stake, round.platform_fee_bps);
    let below_floor = entries.iter().filter(|e| e.amount < floor).count();
    steps.push(VerificationStep::check(
        "floor-guarantee",
        "Every payout is at least half of the net stake",
        (below_floor > 0).then(|| format!("{} payouts below the floor of {}", below_floor, floor)),
    ));

    let inconsistent = entries
        .iter()
        .filter(|e| !e.is_consistent_with(round.stake))
        .count();
    steps.push(VerificationStep::check(
        "profit-consistency",
        "Profit and winner flag match the payout",
        (inconsistent > 0).then(|| format!("{} entries are inconsistent", inconsistent)),
    ));

    let payouts = verify_payouts(
        &proof.seed,
        &proof.block_hash,
        &round.addresses(),
        &round.stakes(),
        &round.claimed_payouts(),
        round.platform_fee_bps,
    );
    steps.push(VerificationStep::check(
        "payouts",
        "Payouts match the recomputed distribution",
        (!payouts.is_valid).then(|| payouts.explanation.clone()),
    ));

    let failed: Vec<&str> = steps
        .iter()
        .filter(|step| !step.passed)
        .map(|step| step.id)
        .collect();
    let is_valid = failed.is_empty();
    let message = if is_valid {
        format!(
            "Round {} verified: all {} checks passed",
            round.id,
            steps.len()
        )
    } else {
        format!(
            "Round {} failed verification: {}",
            round.id,
            failed.join(", ")
        )
    };

    FairnessReport {
        round_id: round.id,
        is_valid,
        message,
        steps,
        payouts,
    }
}
