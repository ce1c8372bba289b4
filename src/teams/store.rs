use std::{collections::HashMap, time::Duration};

use poise::serenity_prelude::UserId;
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, DbErr, EntityTrait, QueryOrder, TransactionTrait,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::{
    entities::{team, team_player},
    infrastructure::ids::{id_from_string, id_to_string},
};

use super::{BotPolicy, RegistrySnapshot, TeamError, TeamManager, TeamSnapshot};

/// Rows per INSERT, kept well under SQLite's bound parameter limit.
const INSERT_CHUNK: usize = 200;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Corrupt(#[from] TeamError),
}

/// Reads the stored teams without checking the registry invariants.
pub async fn load_snapshot<C>(db: &C) -> Result<RegistrySnapshot, StoreError>
where
    C: ConnectionTrait,
{
    let teams = team::Entity::find()
        .order_by_asc(team::Column::Name)
        .all(db)
        .await?;
    let players = team_player::Entity::find()
        .order_by_asc(team_player::Column::TeamName)
        .order_by_asc(team_player::Column::Position)
        .all(db)
        .await?;

    let mut members: HashMap<String, Vec<UserId>> = HashMap::new();
    for row in players {
        let player = parse_id(&row.player_id, "player")?;
        members.entry(row.team_name).or_default().push(player);
    }

    let mut snapshot = RegistrySnapshot::default();
    for row in teams {
        let points = u32::try_from(row.points).map_err(|_| {
            TeamError::corrupt(format!("team \"{}\" has {} points", row.name, row.points))
        })?;
        snapshot.teams.push(TeamSnapshot {
            players: members.remove(&row.name).unwrap_or_default(),
            owner_id: parse_id(&row.owner_id, "owner")?,
            guild_id: parse_id(&row.guild_id, "guild")?,
            points,
            name: row.name,
        });
    }
    if let Some(orphan) = members.keys().next() {
        return Err(TeamError::corrupt(format!("players stored for unknown team \"{}\"", orphan)).into());
    }

    Ok(snapshot)
}

/// Loads and validates the stored registry.
pub async fn load_registry<C>(db: &C, bot_policy: BotPolicy) -> Result<TeamManager, StoreError>
where
    C: ConnectionTrait,
{
    let snapshot = load_snapshot(db).await?;
    let manager = TeamManager::from_snapshot(snapshot, bot_policy)?;
    info!("Loaded {} team(s) from the database", manager.len());
    Ok(manager)
}

/// Replaces every stored team with `snapshot` in one transaction.
pub async fn save_snapshot<C>(db: &C, snapshot: &RegistrySnapshot) -> Result<(), StoreError>
where
    C: TransactionTrait,
{
    let team_rows: Vec<team::ActiveModel> = snapshot
        .teams
        .iter()
        .map(|entry| team::ActiveModel {
            name: Set(entry.name.clone()),
            guild_id: Set(id_to_string(entry.guild_id)),
            owner_id: Set(id_to_string(entry.owner_id)),
            points: Set(i64::from(entry.points)),
        })
        .collect();
    let player_rows: Vec<team_player::ActiveModel> = snapshot
        .teams
        .iter()
        .flat_map(|entry| {
            entry
                .players
                .iter()
                .enumerate()
                .map(|(position, player)| team_player::ActiveModel {
                    team_name: Set(entry.name.clone()),
                    player_id: Set(id_to_string(*player)),
                    position: Set(position as i32),
                })
        })
        .collect();

    let txn = db.begin().await?;
    team_player::Entity::delete_many().exec(&txn).await?;
    team::Entity::delete_many().exec(&txn).await?;
    for chunk in team_rows.chunks(INSERT_CHUNK) {
        team::Entity::insert_many(chunk.to_vec())
            .exec_without_returning(&txn)
            .await?;
    }
    for chunk in player_rows.chunks(INSERT_CHUNK) {
        team_player::Entity::insert_many(chunk.to_vec())
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;

    debug!(
        teams = snapshot.teams.len(),
        players = snapshot.player_count(),
        "Saved team snapshot"
    );
    Ok(())
}

/// Snapshots the shared registry and writes it out. The lock is released before any I/O.
pub async fn save_registry<C>(db: &C, teams: &RwLock<TeamManager>) -> Result<(), StoreError>
where
    C: TransactionTrait,
{
    let snapshot = teams.read().await.snapshot();
    save_snapshot(db, &snapshot).await
}

/// Writes the registry every `period` until the task is aborted.
pub async fn persist_periodically<C>(db: C, teams: super::SharedTeams, period: Duration)
where
    C: TransactionTrait,
{
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately, and there is nothing new to save at startup.
    interval.tick().await;
    loop {
        interval.tick().await;
        if let Err(e) = save_registry(&db, &teams).await {
            error!("Failed to save teams: {:?}", e);
        }
    }
}

fn parse_id<T>(value: &str, what: &str) -> Result<T, TeamError>
where
    T: From<std::num::NonZeroU64>,
{
    id_from_string(value)
        .map_err(|e| TeamError::corrupt(format!("invalid {} id {:?}: {}", what, value, e)))
}
