//! Derived statistics models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Win/loss/games tally for a player or a team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLossRecord {
    pub wins: u32,
    pub losses: u32,
    pub games: u32,
}

impl WinLossRecord {
    pub fn record_win(&mut self) {
        self.wins += 1;
        self.games += 1;
    }

    pub fn record_loss(&mut self) {
        self.losses += 1;
        self.games += 1;
    }

    /// Win rate (0.0 to 1.0); 0.0 with no games.
    pub fn win_rate(&self) -> f64 {
        crate::calculate::calculate_win_rate(self.wins, self.games)
    }
}

/// A ranked row in the dashboard tables.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRecord {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub games: u32,
    pub win_rate: f64,
}

/// Aggregated records over the full match history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    /// Player name -> record
    pub players: BTreeMap<String, WinLossRecord>,

    /// Team label ("A & B") -> record
    pub teams: BTreeMap<String, WinLossRecord>,

    /// Number of matches aggregated
    pub matches: u32,
}

impl StatsReport {
    /// Player records, best win rate first.
    pub fn ranked_players(&self) -> Vec<RankedRecord> {
        rank(&self.players)
    }

    /// Team records, best win rate first.
    pub fn ranked_teams(&self) -> Vec<RankedRecord> {
        rank(&self.teams)
    }
}

fn rank(records: &BTreeMap<String, WinLossRecord>) -> Vec<RankedRecord> {
    let mut ranked: Vec<RankedRecord> = records
        .iter()
        .map(|(name, r)| RankedRecord {
            name: name.clone(),
            wins: r.wins,
            losses: r.losses,
            games: r.games,
            win_rate: r.win_rate(),
        })
        .collect();

    // BTreeMap iteration is already name-ordered, and the sort is stable.
    ranked.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then_with(|| b.wins.cmp(&a.wins))
    });
    ranked
}
