use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use volley_tracker::api::{build_router, state::AppState};
use volley_tracker::config::AppConfig;
use volley_tracker::ledger::{self, MatchEntry, MatchFilter};
use volley_tracker::models::{Player, PlayerId, RankedRecord, TimeOfDay};
use volley_tracker::storage::{JsonlStore, RecordStore, StorageConfig};

#[derive(Parser)]
#[command(name = "volley-tracker")]
#[command(about = "Beach volleyball match tracker with player and team records")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the roster
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },

    /// Inspect or create teams
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Record and browse matches
    Match {
        #[command(subcommand)]
        action: MatchAction,
    },

    /// Show player and team records
    Stats {
        /// Print the raw report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum PlayerAction {
    /// Add a player
    Add { name: String },

    /// List all players
    List,

    /// Remove a player (by id or unique name)
    Remove { player: String },
}

#[derive(Subcommand)]
enum TeamAction {
    /// Find or create the team for two players (ids or unique names)
    Resolve { player1: String, player2: String },

    /// List all teams
    List,
}

#[derive(Subcommand)]
enum MatchAction {
    /// Record a match
    Add {
        /// Team 1 players (ids or unique names), given once
        #[arg(long, num_args = 2, required = true)]
        team1: Vec<String>,

        /// Team 2 players (ids or unique names), given once
        #[arg(long, num_args = 2, required = true)]
        team2: Vec<String>,

        /// Team 1 score
        #[arg(long, allow_hyphen_values = true)]
        score1: i64,

        /// Team 2 score
        #[arg(long, allow_hyphen_values = true)]
        score2: i64,

        #[arg(long)]
        location: String,

        /// Date played (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Morning or Afternoon
        #[arg(long, default_value = "Morning")]
        time: TimeOfDay,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List recorded matches, newest first
    List {
        /// Only matches this player (name) played in
        #[arg(long)]
        player: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        #[arg(long)]
        time: Option<TimeOfDay>,

        /// Max rows to print
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::debug!("Using data directory {:?}", config.data_dir);

    let store = JsonlStore::new(StorageConfig::new(config.data_dir.clone()));

    match cli.command {
        Commands::Player { action } => run_player(&store, action)?,
        Commands::Team { action } => run_team(&store, action)?,
        Commands::Match { action } => run_match(&store, &config, action)?,
        Commands::Stats { json } => {
            let report = ledger::dashboard(&store)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{} match(es) recorded\n", report.matches);
                print_records("Player", &report.ranked_players());
                println!();
                print_records("Team", &report.ranked_teams());
            }
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState::new(Arc::new(store), config);
            let app = build_router(state);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Look a player up by exact id, then by unique case-insensitive name.
fn find_player(players: &[Player], key: &str) -> Result<PlayerId> {
    let key = key.trim();
    if let Some(p) = players.iter().find(|p| p.id.as_str() == key) {
        return Ok(p.id.clone());
    }

    let named: Vec<&Player> = players
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case(key))
        .collect();
    match named.as_slice() {
        [] => bail!("no player with id or name '{}'", key),
        [p] => Ok(p.id.clone()),
        many => bail!(
            "'{}' matches {} players; use an id instead ({})",
            key,
            many.len(),
            many.iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Resolve the two names given for one side of a match.
fn team_pair(players: &[Player], names: &[String]) -> Result<[PlayerId; 2]> {
    let [first, second] = names else {
        bail!(
            "a team is exactly two players, got {} ({})",
            names.len(),
            names.join(", ")
        );
    };
    Ok([find_player(players, first)?, find_player(players, second)?])
}

fn run_player(store: &dyn RecordStore, action: PlayerAction) -> Result<()> {
    match action {
        PlayerAction::Add { name } => {
            let player = ledger::add_player(store, &name)?;
            println!("Added {} ({})", player.name, player.id);
        }
        PlayerAction::List => {
            let players = ledger::list_players(store)?;
            if players.is_empty() {
                println!("No players yet.");
            }
            for p in players {
                println!("{}  {}", p.id, p.name);
            }
        }
        PlayerAction::Remove { player } => {
            let id = find_player(&store.players()?, &player)?;
            let removed = ledger::remove_player(store, &id)?;
            println!("Removed {} ({})", removed.name, removed.id);
        }
    }
    Ok(())
}

fn run_team(store: &dyn RecordStore, action: TeamAction) -> Result<()> {
    match action {
        TeamAction::Resolve { player1, player2 } => {
            let players = store.players()?;
            let p1 = find_player(&players, &player1)?;
            let p2 = find_player(&players, &player2)?;
            let team_id = ledger::resolve_team(store, &p1, &p2)?;
            println!("{}", team_id);
        }
        TeamAction::List => {
            for team in ledger::list_teams(store)? {
                println!("{}  {}", team.id, team.label);
            }
        }
    }
    Ok(())
}

fn run_match(store: &dyn RecordStore, config: &AppConfig, action: MatchAction) -> Result<()> {
    match action {
        MatchAction::Add {
            team1,
            team2,
            score1,
            score2,
            location,
            date,
            time,
            notes,
        } => {
            let players = store.players()?;
            let entry = MatchEntry {
                team1: team_pair(&players, &team1)?,
                team2: team_pair(&players, &team2)?,
                score_team1: score1,
                score_team2: score2,
                location,
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                time,
                notes,
            };
            let m = ledger::record_match(store, &entry, &config.locations)?;
            println!("Recorded match {}", m.id);
        }
        MatchAction::List {
            player,
            location,
            from,
            to,
            time,
            limit,
        } => {
            let filter = MatchFilter {
                player,
                location,
                from,
                to,
                time,
            };
            let rows = ledger::list_matches(store, &filter)?;
            if rows.is_empty() {
                println!("No matches recorded.");
            }
            for row in rows.iter().take(limit.unwrap_or(usize::MAX)) {
                println!(
                    "{} {:<9} {} {:>2}-{:<2} {}  @ {}{}",
                    row.date,
                    row.time.to_string(),
                    row.team1,
                    row.score_team1,
                    row.score_team2,
                    row.team2,
                    row.location,
                    row.notes
                        .as_deref()
                        .map(|n| format!("  ({})", n))
                        .unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

fn print_records(heading: &str, records: &[RankedRecord]) {
    println!(
        "{:<32} {:>5} {:>6} {:>5} {:>6}",
        heading, "Wins", "Losses", "Games", "Win%"
    );
    for r in records {
        println!(
            "{:<32} {:>5} {:>6} {:>5} {:>5.1}%",
            r.name,
            r.wins,
            r.losses,
            r.games,
            r.win_rate * 100.0
        );
    }
}
