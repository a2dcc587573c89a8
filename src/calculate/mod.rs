//! Statistics calculation engine.
//!
//! Projects the full match history onto per-player and per-team
//! win/loss/game records. Nothing here touches storage; callers load the
//! three tables and pass them in, and every call recomputes from scratch.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{
    team_label, Match, MatchId, Player, PlayerId, Side, StatsReport, Team, TeamId,
};

/// A stored reference that points at nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("match {match_id} references unknown team {team_id}")]
    UnknownTeam { match_id: MatchId, team_id: TeamId },

    #[error("team {team_id} references unknown player {player_id}")]
    UnknownPlayer { team_id: TeamId, player_id: PlayerId },
}

/// Calculate win rate from wins and games played.
pub fn calculate_win_rate(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64
    }
}

/// A team with both members looked up.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTeam<'a> {
    pub team: &'a Team,
    pub player1: &'a Player,
    pub player2: &'a Player,
}

impl ResolvedTeam<'_> {
    pub fn label(&self) -> String {
        team_label(self.player1, self.player2)
    }

    pub fn members(&self) -> [&Player; 2] {
        [self.player1, self.player2]
    }
}

/// Id lookups over loaded player and team tables.
pub struct RosterIndex<'a> {
    players: HashMap<&'a PlayerId, &'a Player>,
    teams: HashMap<&'a TeamId, &'a Team>,
}

impl<'a> RosterIndex<'a> {
    pub fn new(players: &'a [Player], teams: &'a [Team]) -> Self {
        // First record wins when an id repeats.
        let mut player_map = HashMap::with_capacity(players.len());
        for p in players {
            player_map.entry(&p.id).or_insert(p);
        }
        let mut team_map = HashMap::with_capacity(teams.len());
        for t in teams {
            team_map.entry(&t.id).or_insert(t);
        }
        Self {
            players: player_map,
            teams: team_map,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&'a Player> {
        self.players.get(id).copied()
    }

    /// Look up a team and both of its players.
    pub fn resolve(&self, team: &'a Team) -> Result<ResolvedTeam<'a>, IntegrityError> {
        let member = |player_id: &PlayerId| {
            self.player(player_id)
                .ok_or_else(|| IntegrityError::UnknownPlayer {
                    team_id: team.id.clone(),
                    player_id: player_id.clone(),
                })
        };
        Ok(ResolvedTeam {
            team,
            player1: member(&team.player1_id)?,
            player2: member(&team.player2_id)?,
        })
    }

    /// Resolve one side of a match.
    pub fn side(&self, m: &Match, side: Side) -> Result<ResolvedTeam<'a>, IntegrityError> {
        let team_id = m.team_id(side);
        let team = self
            .teams
            .get(team_id)
            .copied()
            .ok_or_else(|| IntegrityError::UnknownTeam {
                match_id: m.id.clone(),
                team_id: team_id.clone(),
            })?;
        self.resolve(team)
    }
}

/// Compute per-player and per-team records over every match.
///
/// Every known player appears in the result, even with no games. Teams
/// appear once they have played. Team keys use the stored member order, so
/// two distinct team records for the same pair entered in opposite orders
/// stay separate rows. Player rows are keyed by name, so players sharing a
/// name share a row.
///
/// A tied match is a win for team2.
pub fn compute_stats(
    players: &[Player],
    teams: &[Team],
    matches: &[Match],
) -> Result<StatsReport, IntegrityError> {
    let index = RosterIndex::new(players, teams);
    let mut report = StatsReport::default();

    for p in players {
        report.players.entry(p.name.clone()).or_default();
    }

    for m in matches {
        // Resolve both sides before crediting anything.
        let team1 = index.side(m, Side::Team1)?;
        let team2 = index.side(m, Side::Team2)?;

        let (winner, loser) = match m.winner() {
            Side::Team1 => (team1, team2),
            Side::Team2 => (team2, team1),
        };

        report.teams.entry(winner.label()).or_default().record_win();
        report.teams.entry(loser.label()).or_default().record_loss();

        for p in winner.members() {
            report.players.entry(p.name.clone()).or_default().record_win();
        }
        for p in loser.members() {
            report.players.entry(p.name.clone()).or_default().record_loss();
        }

        report.matches += 1;
    }

    Ok(report)
}
