//! The record store seam and its two implementations.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use tracing::{debug, info};

use super::{EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::{EntityId, Match, Player, PlayerId, Team};

/// One stored entity of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Player(Player),
    Team(Team),
    Match(Match),
}

impl Record {
    pub fn kind(&self) -> EntityType {
        match self {
            Record::Player(_) => EntityType::Player,
            Record::Team(_) => EntityType::Team,
            Record::Match(_) => EntityType::Match,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            Record::Player(p) => &p.id,
            Record::Team(t) => &t.id,
            Record::Match(m) => &m.id,
        }
    }

    pub fn into_player(self) -> Option<Player> {
        match self {
            Record::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_team(self) -> Option<Team> {
        match self {
            Record::Team(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_match(self) -> Option<Match> {
        match self {
            Record::Match(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Player> for Record {
    fn from(p: Player) -> Self {
        Record::Player(p)
    }
}

impl From<Team> for Record {
    fn from(t: Team) -> Self {
        Record::Team(t)
    }
}

impl From<Match> for Record {
    fn from(m: Match) -> Self {
        Record::Match(m)
    }
}

/// Durable storage of players, teams and matches.
///
/// Inserts are atomic per record and reject an id that already exists for
/// that kind. Removal exists only for players and never cascades.
pub trait RecordStore: Send + Sync {
    /// Persist a new record and return its id.
    fn insert(&self, record: Record) -> Result<EntityId, StorageError>;

    /// All records of one kind, in insertion order.
    fn list_all(&self, kind: EntityType) -> Result<Vec<Record>, StorageError>;

    /// Remove a player. Returns `false` when no such player exists.
    fn remove_player(&self, id: &PlayerId) -> Result<bool, StorageError>;

    fn get_by_id(&self, kind: EntityType, id: &EntityId) -> Result<Option<Record>, StorageError> {
        Ok(self.list_all(kind)?.into_iter().find(|r| r.id() == id))
    }

    fn players(&self) -> Result<Vec<Player>, StorageError> {
        Ok(self
            .list_all(EntityType::Player)?
            .into_iter()
            .filter_map(Record::into_player)
            .collect())
    }

    fn teams(&self) -> Result<Vec<Team>, StorageError> {
        Ok(self
            .list_all(EntityType::Team)?
            .into_iter()
            .filter_map(Record::into_team)
            .collect())
    }

    fn matches(&self) -> Result<Vec<Match>, StorageError> {
        Ok(self
            .list_all(EntityType::Match)?
            .into_iter()
            .filter_map(Record::into_match)
            .collect())
    }

    fn player(&self, id: &PlayerId) -> Result<Option<Player>, StorageError> {
        Ok(self
            .get_by_id(EntityType::Player, id)?
            .and_then(Record::into_player))
    }
}

/// File-backed store: one JSONL file per entity kind.
pub struct JsonlStore {
    config: StorageConfig,
    // Serialises check-then-write sequences within this process.
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    fn writer<T: serde::Serialize>(&self, kind: EntityType) -> JsonlWriter<T> {
        JsonlWriter::new(self.config.entity_path(kind))
    }

    fn reader<T: serde::de::DeserializeOwned>(&self, kind: EntityType) -> JsonlReader<T> {
        JsonlReader::new(self.config.entity_path(kind))
    }
}

impl RecordStore for JsonlStore {
    fn insert(&self, record: Record) -> Result<EntityId, StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let kind = record.kind();
        let id = record.id().clone();
        if self.list_all(kind)?.iter().any(|r| r.id() == &id) {
            return Err(StorageError::DuplicateId { kind, id });
        }

        match &record {
            Record::Player(p) => self.writer(kind).append(p)?,
            Record::Team(t) => self.writer(kind).append(t)?,
            Record::Match(m) => self.writer(kind).append(m)?,
        }

        debug!("Inserted {} {}", kind, id);
        Ok(id)
    }

    fn list_all(&self, kind: EntityType) -> Result<Vec<Record>, StorageError> {
        let records: Vec<Record> = match kind {
            EntityType::Player => self
                .reader::<Player>(kind)
                .read_all()?
                .into_iter()
                .map(Record::Player)
                .collect(),
            EntityType::Team => self
                .reader::<Team>(kind)
                .read_all()?
                .into_iter()
                .map(Record::Team)
                .collect(),
            EntityType::Match => self
                .reader::<Match>(kind)
                .read_all()?
                .into_iter()
                .map(Record::Match)
                .collect(),
        };
        Ok(records)
    }

    fn remove_player(&self, id: &PlayerId) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let players = self.reader::<Player>(EntityType::Player).read_all()?;
        let before = players.len();
        let remaining: Vec<Player> = players.into_iter().filter(|p| &p.id != id).collect();
        if remaining.len() == before {
            return Ok(false);
        }

        self.writer::<Player>(EntityType::Player)
            .write_all(&remaining)?;
        info!("Removed player {}", id);
        Ok(true)
    }
}

/// In-process store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<EntityType, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, record: Record) -> Result<EntityId, StorageError> {
        let mut tables = self.tables.write().map_err(|_| StorageError::Poisoned)?;
        let kind = record.kind();
        let id = record.id().clone();
        let table = tables.entry(kind).or_default();
        if table.iter().any(|r| r.id() == &id) {
            return Err(StorageError::DuplicateId { kind, id });
        }
        table.push(record);
        Ok(id)
    }

    fn list_all(&self, kind: EntityType) -> Result<Vec<Record>, StorageError> {
        let tables = self.tables.read().map_err(|_| StorageError::Poisoned)?;
        Ok(tables.get(&kind).cloned().unwrap_or_default())
    }

    fn remove_player(&self, id: &PlayerId) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().map_err(|_| StorageError::Poisoned)?;
        let Some(players) = tables.get_mut(&EntityType::Player) else {
            return Ok(false);
        };
        let before = players.len();
        players.retain(|r| r.id() != id);
        Ok(players.len() != before)
    }
}
