// Conversions between nanoton amounts and human readable strings
//
// Amounts are always carried as u64 nanoton; only these helpers deal with
// the decimal representation. No floating point is involved.

use thiserror::Error;

use crate::config::{COIN_DECIMALS, COIN_SYMBOL, COIN_VALUE};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,
    #[error("Invalid amount '{0}'")]
    Invalid(String),
    #[error("Amount has {decimals} decimals, maximum is {max}")]
    TooManyDecimals { decimals: usize, max: u8 },
    #[error("Amount overflows")]
    Overflow,
}

// Round `value` to `decimals` decimals and render it without trailing zeros
fn format_with_decimals(value: u64, decimals: u8) -> String {
    let decimals = decimals.min(COIN_DECIMALS);
    let unit = 10u128.pow((COIN_DECIMALS - decimals) as u32);
    let rounded = (value as u128 + unit / 2) / unit;
    let scale = 10u128.pow(decimals as u32);

    let whole = rounded / scale;
    let fraction = rounded % scale;
    if decimals == 0 || fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

// Fewer decimals for larger amounts: 4 from 1 coin, 6 from 0.01, 8 below
fn display_decimals(value: u64) -> u8 {
    if value >= COIN_VALUE {
        4
    } else if value >= COIN_VALUE / 100 {
        6
    } else {
        8
    }
}

// Format a nanoton amount in coins, ex: 1_500_000_000 => "1.5"
pub fn format_amount(value: u64) -> String {
    format_with_decimals(value, display_decimals(value))
}

// Same as format_amount with the coin symbol, ex: "1.5 TON"
pub fn format_coin(value: u64) -> String {
    format!("{} {}", format_amount(value), COIN_SYMBOL)
}

// Short form for small displays: "2.5K TON", "1.2M TON", "0.95 TON"
pub fn format_amount_compact(value: u64) -> String {
    let thousand = 1_000 * COIN_VALUE as u128;
    let million = 1_000 * thousand;
    let value_wide = value as u128;

    let (divisor, suffix) = if value_wide >= million {
        (million, "M")
    } else if value_wide >= thousand {
        (thousand, "K")
    } else {
        return format!("{} {}", format_with_decimals(value, 2), COIN_SYMBOL);
    };

    // One decimal, rounded
    let tenths = (value_wide * 10 + divisor / 2) / divisor;
    format!("{}.{}{} {}", tenths / 10, tenths % 10, suffix, COIN_SYMBOL)
}

// Parse a coin amount into nanoton
//
// Accepts an optional symbol suffix and '_' separators, ex: "1_000.5 TON".
// Parsing is exact: more than 9 decimals is an error, not a rounding.
pub fn parse_amount(input: &str) -> Result<u64, AmountError> {
    let trimmed = input.trim();
    let numeric = trimmed
        .strip_suffix(COIN_SYMBOL)
        .map(str::trim_end)
        .unwrap_or(trimmed);
    let cleaned: String = numeric.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match cleaned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Invalid(input.to_string()));
    }
    if fraction.len() > COIN_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals {
            decimals: fraction.len(),
            max: COIN_DECIMALS,
        });
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = COIN_DECIMALS as usize);
        padded.parse().map_err(|_| AmountError::Invalid(input.to_string()))?
    };

    whole
        .checked_mul(COIN_VALUE)
        .and_then(|value| value.checked_add(fraction))
        .ok_or(AmountError::Overflow)
}

// Human readable duration: "45s", "12m", "3h 20m", "2d 5h"
pub fn format_duration(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    if seconds < MINUTE {
        format!("{}s", seconds)
    } else if seconds < HOUR {
        format!("{}m", seconds / MINUTE)
    } else if seconds < DAY {
        let minutes = (seconds % HOUR) / MINUTE;
        if minutes > 0 {
            format!("{}h {}m", seconds / HOUR, minutes)
        } else {
            format!("{}h", seconds / HOUR)
        }
    } else {
        let hours = (seconds % DAY) / HOUR;
        if hours > 0 {
            format!("{}d {}h", seconds / DAY, hours)
        } else {
            format!("{}d", seconds / DAY)
        }
    }
}

// Basis points as a percentage with one decimal, ex: 500 => "5.0%"
pub fn format_percent_bps(bps: u64) -> String {
    let tenths = (bps + 5) / 10;
    format!("{}.{}%", tenths / 10, tenths % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(COIN_VALUE), "1");
        assert_eq!(format_amount(1_500_000_000), "1.5");
        assert_eq!(format_amount(950_000_000), "0.95");
        // 4 decimals from one coin
        assert_eq!(format_amount(1_745_519_381), "1.7455");
        // 6 decimals below one coin
        assert_eq!(format_amount(539_995_436), "0.539995");
        // 8 decimals below 0.01
        assert_eq!(format_amount(1_234_567), "0.00123457");
        assert_eq!(format_amount(1), "0");
        assert_eq!(format_coin(2_850_000_000), "2.85 TON");
    }

    #[test]
    fn test_format_amount_compact() {
        assert_eq!(format_amount_compact(950_000_000), "0.95 TON");
        assert_eq!(format_amount_compact(2_500 * COIN_VALUE), "2.5K TON");
        assert_eq!(format_amount_compact(1_250_000 * COIN_VALUE), "1.3M TON");
        assert_eq!(format_amount_compact(u64::MAX), "18446.7M TON");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1"), Ok(COIN_VALUE));
        assert_eq!(parse_amount("0.5"), Ok(500_000_000));
        assert_eq!(parse_amount(".1"), Ok(100_000_000));
        assert_eq!(parse_amount("2."), Ok(2 * COIN_VALUE));
        assert_eq!(parse_amount(" 1_000.5 TON "), Ok(1_000_500_000_000));
        assert_eq!(parse_amount("0.000000001"), Ok(1));
    }

    #[test]
    fn test_parse_amount_errors() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("TON"), Err(AmountError::Empty));
        assert!(matches!(parse_amount("1.2.3"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("-1"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("."), Err(AmountError::Invalid(_))));
        assert_eq!(
            parse_amount("0.0000000001"),
            Err(AmountError::TooManyDecimals {
                decimals: 10,
                max: 9
            })
        );
        assert_eq!(parse_amount("20000000000"), Err(AmountError::Overflow));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(12 * 60 + 5), "12m");
        assert_eq!(format_duration(3 * 3600), "3h");
        assert_eq!(format_duration(3 * 3600 + 20 * 60), "3h 20m");
        assert_eq!(format_duration(2 * 86400 + 5 * 3600), "2d 5h");
        assert_eq!(format_duration(7 * 86400), "7d");
    }

    #[test]
    fn test_format_percent_bps() {
        assert_eq!(format_percent_bps(500), "5.0%");
        assert_eq!(format_percent_bps(1_234), "12.3%");
        assert_eq!(format_percent_bps(10_000), "100.0%");
        assert_eq!(format_percent_bps(0), "0.0%");
    }
}
