use serde::Serialize;

use crate::{config::BPS_DENOMINATOR, round::RoundRecord};

/// Aggregated results of one address over its distributed rounds
///
/// Cancelled rounds are refunded and do not count as games.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_games: u64,
    pub total_won: u64,
    pub total_lost: u64,
    pub total_profit: i64,
    /// Share of games won, in basis points
    pub win_rate_bps: u64,
    pub average_profit: i64,
    /// Highest profit of a single game, 0 without any win
    pub best_win: i64,
    pub total_deposited: u64,
    pub total_withdrawn: u64,
}

impl UserStats {
    pub fn from_history<'a, I>(address: &str, history: I) -> Self
    where
        I: IntoIterator<Item = &'a RoundRecord>,
    {
        let mut stats = Self::default();

        let entries = history
            .into_iter()
            .filter_map(RoundRecord::as_distributed)
            .filter_map(|round| round.payout_for(address).map(|entry| (round.stake, entry)));

        for (stake, entry) in entries {
            stats.total_games += 1;
            stats.total_deposited = stats.total_deposited.saturating_add(stake);
            stats.total_withdrawn = stats.total_withdrawn.saturating_add(entry.amount);
            stats.total_profit = stats.total_profit.saturating_add(entry.profit);

            if entry.is_winner {
                stats.total_won += 1;
                stats.best_win = stats.best_win.max(entry.profit);
            } else {
                stats.total_lost += 1;
            }
        }

        if stats.total_games > 0 {
            stats.win_rate_bps = stats.total_won * BPS_DENOMINATOR / stats.total_games;
            stats.average_profit = stats.total_profit / stats.total_games as i64;
        }

        stats
    }
}
