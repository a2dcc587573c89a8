use tracing::info;

use super::LedgerError;
use crate::models::{Player, PlayerId};
use crate::storage::RecordStore;

/// Add a player to the roster.
pub fn add_player(store: &dyn RecordStore, name: &str) -> Result<Player, LedgerError> {
    let player = Player::new(name);
    if player.name.is_empty() {
        return Err(LedgerError::Validation(
            "player name must not be empty".to_string(),
        ));
    }

    store.insert(player.clone().into())?;
    info!("Added player {} ({})", player.name, player.id);
    Ok(player)
}

pub fn list_players(store: &dyn RecordStore) -> Result<Vec<Player>, LedgerError> {
    Ok(store.players()?)
}

/// Remove a player from the roster.
///
/// Refused while any team still references the player, so removal can never
/// leave teams or matches pointing at nobody.
pub fn remove_player(store: &dyn RecordStore, id: &PlayerId) -> Result<Player, LedgerError> {
    let player = store
        .player(id)?
        .ok_or_else(|| LedgerError::NotFound(format!("player {}", id)))?;

    let teams = store.teams()?.iter().filter(|t| t.includes(id)).count();
    if teams > 0 {
        return Err(LedgerError::InUse {
            name: player.name,
            teams,
        });
    }

    if !store.remove_player(id)? {
        return Err(LedgerError::NotFound(format!("player {}", id)));
    }

    info!("Removed player {} ({})", player.name, player.id);
    Ok(player)
}
