use crate::static_assert;

pub const VERSION: &str = env!("BUILD_VERSION");

// 9 decimals numbers, amounts are expressed in nanoton
pub const COIN_DECIMALS: u8 = 9;
// 1 000 000 000 to represent 1 TON
pub const COIN_VALUE: u64 = 10u64.pow(COIN_DECIMALS as u32);
pub const COIN_SYMBOL: &str = "TON";

// ===== PLATFORM FEE =====
// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;
pub const MAX_PLATFORM_FEE_BPS: u16 = 10_000;
// 5% of every stake goes to the platform
pub const DEFAULT_PLATFORM_FEE_BPS: u16 = 500;

// ===== ROUND LIMITS =====
// Minimum stake per participant (0.1 TON)
pub const MIN_STAKE: u64 = COIN_VALUE / 10;
// Maximum stake per participant (10 000 TON)
pub const MAX_STAKE: u64 = 10_000 * COIN_VALUE;
// A round below this size is cancelled instead of distributed
pub const MIN_PARTICIPANTS: usize = 2;
pub const MAX_PARTICIPANTS: usize = 1_000;
// Time-locked rounds must last between 10 minutes and 7 days
pub const MIN_ROUND_DURATION_SECS: u64 = 10 * 60;
pub const MAX_ROUND_DURATION_SECS: u64 = 7 * 24 * 60 * 60;
// Participants of a time-locked round are warned once when this much time is left
pub const EXPIRY_WARNING_SECS: u64 = 5 * 60;
// Completed rounds older than 30 days are pruned from history
pub const HISTORY_RETENTION_SECS: u64 = 30 * 24 * 60 * 60;

// ===== FAIRNESS =====
// Guaranteed floor is 1 / FLOOR_DIVISOR of the net stake (50%)
pub const FLOOR_DIVISOR: u64 = 2;
// Maximum difference, in nanoton, tolerated per payout during verification
pub const PAYOUT_TOLERANCE: u64 = 1;
// Width of the time bucket mixed into the round seed
// Retries inside the same bucket reproduce the same seed
pub const SEED_TIME_BUCKET_SECS: u64 = 10;
// Seeds, block hashes and commit hashes are rendered as 0x + 64 hex digits
pub const PROOF_HEX_PREFIX: &str = "0x";
pub const PROOF_HEX_DIGITS: usize = 64;
pub const DISTRIBUTION_FORMULA: &str =
    "payout_i = basePayout_i + bonusPool * (random_i / sum(all_randoms))";

// Static checks
static_assert!(
    MIN_STAKE <= MAX_STAKE,
    "Min stake must be less than or equal to max stake"
);
static_assert!(
    MIN_PARTICIPANTS >= 2 && MIN_PARTICIPANTS <= MAX_PARTICIPANTS,
    "Participant limits are inconsistent"
);
static_assert!(
    DEFAULT_PLATFORM_FEE_BPS <= MAX_PLATFORM_FEE_BPS,
    "Default platform fee exceeds 100%"
);
// A full round must fit in a signed profit value
static_assert!(
    (MAX_STAKE as u128) * (MAX_PARTICIPANTS as u128) <= i64::MAX as u128,
    "Maximum pool does not fit in i64"
);
