use poise::serenity_prelude::{GuildId, UserId};

use super::team::Team;

/// Full copy of one team, as handed to and received from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSnapshot {
    pub name: String,
    pub owner_id: UserId,
    pub guild_id: GuildId,
    pub players: Vec<UserId>,
    pub points: u32,
}

/// Every registered team, sorted by name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    pub teams: Vec<TeamSnapshot>,
}

impl RegistrySnapshot {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn player_count(&self) -> usize {
        self.teams.iter().map(|team| team.players.len()).sum()
    }
}

impl From<&Team> for TeamSnapshot {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name().to_string(),
            owner_id: team.owner_id(),
            guild_id: team.guild_id(),
            players: team.players().to_vec(),
            points: team.points(),
        }
    }
}
