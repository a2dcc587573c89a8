use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{resolve_team, LedgerError};
use crate::calculate::{compute_stats, ResolvedTeam, RosterIndex};
use crate::models::{Match, MatchId, PlayerId, Side, StatsReport, TimeOfDay};
use crate::storage::RecordStore;

/// A match as entered: two pairs of players and the final score.
///
/// Scores are signed here; negative values are rejected by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEntry {
    pub team1: [PlayerId; 2],
    pub team2: [PlayerId; 2],
    pub score_team1: i64,
    pub score_team2: i64,
    pub location: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Checked fields of a [`MatchEntry`], ready to persist.
#[derive(Debug)]
struct ValidEntry {
    score_team1: u32,
    score_team2: u32,
    location: String,
    notes: Option<String>,
}

fn validate_score(label: &str, score: i64) -> Result<u32, LedgerError> {
    u32::try_from(score).map_err(|_| {
        LedgerError::Validation(format!("{} score must be between 0 and {}", label, u32::MAX))
    })
}

impl MatchEntry {
    /// Validate everything that does not need the store.
    ///
    /// `locations` is the configured court list; empty accepts any
    /// non-blank location.
    fn validate(&self, locations: &[String]) -> Result<ValidEntry, LedgerError> {
        let score_team1 = validate_score("team 1", self.score_team1)?;
        let score_team2 = validate_score("team 2", self.score_team2)?;

        let slots: HashSet<&PlayerId> = self.team1.iter().chain(self.team2.iter()).collect();
        if slots.len() != 4 {
            return Err(LedgerError::Validation(
                "a match needs four different players".to_string(),
            ));
        }

        let location = self.location.trim();
        if location.is_empty() {
            return Err(LedgerError::Validation(
                "location must not be empty".to_string(),
            ));
        }
        let location = if locations.is_empty() {
            location.to_string()
        } else {
            locations
                .iter()
                .find(|l| l.trim().eq_ignore_ascii_case(location))
                .map(|l| l.trim().to_string())
                .ok_or_else(|| {
                    LedgerError::Validation(format!(
                        "unknown location '{}' (expected one of: {})",
                        location,
                        locations.join(", ")
                    ))
                })?
        };

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(ValidEntry {
            score_team1,
            score_team2,
            location,
            notes,
        })
    }
}

/// Record a match, resolving (and if needed creating) both teams.
///
/// All checks run before anything is written, so a rejected entry leaves the
/// store untouched.
pub fn record_match(
    store: &dyn RecordStore,
    entry: &MatchEntry,
    locations: &[String],
) -> Result<Match, LedgerError> {
    let valid = entry.validate(locations)?;

    let players = store.players()?;
    for id in entry.team1.iter().chain(entry.team2.iter()) {
        if !players.iter().any(|p| &p.id == id) {
            return Err(LedgerError::NotFound(format!("player {}", id)));
        }
    }

    let team1_id = resolve_team(store, &entry.team1[0], &entry.team1[1])?;
    let team2_id = resolve_team(store, &entry.team2[0], &entry.team2[1])?;

    let m = Match::new(
        team1_id,
        team2_id,
        valid.score_team1,
        valid.score_team2,
        valid.location,
        entry.date,
        entry.time,
        valid.notes,
    );
    store.insert(m.clone().into())?;

    info!(
        "Recorded match {} ({}-{}) at {} on {}",
        m.id, m.score_team1, m.score_team2, m.location, m.date
    );
    Ok(m)
}

/// Filters for browsing match results. All set filters must match.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    /// Player name, case-insensitive, on either team
    pub player: Option<String>,
    /// Location, case-insensitive
    pub location: Option<String>,
    /// Earliest date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive
    pub to: Option<NaiveDate>,
    pub time: Option<TimeOfDay>,
}

impl MatchFilter {
    fn accepts(&self, m: &Match, team1: &ResolvedTeam<'_>, team2: &ResolvedTeam<'_>) -> bool {
        if let Some(from) = self.from {
            if m.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if m.date > to {
                return false;
            }
        }
        if let Some(time) = self.time {
            if m.time != time {
                return false;
            }
        }
        if let Some(location) = self.location.as_deref() {
            if !m.location.eq_ignore_ascii_case(location.trim()) {
                return false;
            }
        }
        if let Some(player) = self.player.as_deref() {
            let player = player.trim();
            let on_court = team1
                .members()
                .iter()
                .chain(team2.members().iter())
                .any(|p| p.name.eq_ignore_ascii_case(player));
            if !on_court {
                return false;
            }
        }
        true
    }
}

/// One row of the match results table.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRow {
    pub id: MatchId,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub team1: String,
    pub score_team1: u32,
    pub team2: String,
    pub score_team2: u32,
    pub winner: String,
    pub location: String,
    pub notes: Option<String>,
}

/// Matches passing `filter`, newest first.
pub fn list_matches(
    store: &dyn RecordStore,
    filter: &MatchFilter,
) -> Result<Vec<MatchRow>, LedgerError> {
    let players = store.players()?;
    let teams = store.teams()?;
    let mut matches = store.matches()?;
    let index = RosterIndex::new(&players, &teams);

    matches.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.time.cmp(&a.time))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    let mut rows = Vec::new();
    for m in &matches {
        let team1 = index.side(m, Side::Team1)?;
        let team2 = index.side(m, Side::Team2)?;
        if !filter.accepts(m, &team1, &team2) {
            continue;
        }

        let winner = match m.winner() {
            Side::Team1 => team1.label(),
            Side::Team2 => team2.label(),
        };
        rows.push(MatchRow {
            id: m.id.clone(),
            date: m.date,
            time: m.time,
            team1: team1.label(),
            score_team1: m.score_team1,
            team2: team2.label(),
            score_team2: m.score_team2,
            winner,
            location: m.location.clone(),
            notes: m.notes.clone(),
        });
    }

    Ok(rows)
}

/// Player and team records over the whole history.
pub fn dashboard(store: &dyn RecordStore) -> Result<StatsReport, LedgerError> {
    let players = store.players()?;
    let teams = store.teams()?;
    let matches = store.matches()?;

    Ok(compute_stats(&players, &teams, &matches)?)
}
