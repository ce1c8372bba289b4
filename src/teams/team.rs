use poise::serenity_prelude::{GuildId, UserId};

use super::error::TeamError;

/// Whether bot accounts may be added to a team.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BotPolicy {
    #[default]
    Reject,
    Allow,
}

impl BotPolicy {
    pub fn from_allow_flag(allow: bool) -> Self {
        if allow { Self::Allow } else { Self::Reject }
    }
}

/// A user that is about to be added to a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub id: UserId,
    pub bot: bool,
}

impl Candidate {
    pub fn human(id: UserId) -> Self {
        Self { id, bot: false }
    }

    pub fn bot(id: UserId) -> Self {
        Self { id, bot: true }
    }
}

/// A named group of players with exactly one owner.
///
/// The owner is always one of `players`, and `players` never holds the same id twice.
/// Teams are only ever mutated through the [`TeamManager`](super::manager::TeamManager)
/// that owns them, which keeps its player index in step with these methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    name: String,
    owner_id: UserId,
    guild_id: GuildId,
    players: Vec<UserId>,
    points: u32,
}

impl Team {
    /// Creates a team whose only member is its owner.
    pub fn new(name: impl Into<String>, owner_id: UserId, guild_id: GuildId) -> Self {
        Self {
            name: name.into(),
            owner_id,
            guild_id,
            players: vec![owner_id],
            points: 0,
        }
    }

    /// Rebuilds a team from stored parts, checking the membership invariants.
    pub(crate) fn restore(
        name: String,
        owner_id: UserId,
        guild_id: GuildId,
        players: Vec<UserId>,
        points: u32,
    ) -> Result<Self, TeamError> {
        if !players.contains(&owner_id) {
            return Err(TeamError::corrupt(format!(
                "owner {} of team \"{}\" is not one of its players",
                owner_id, name
            )));
        }
        for (index, player) in players.iter().enumerate() {
            if players[..index].contains(player) {
                return Err(TeamError::corrupt(format!(
                    "player {} is listed twice on team \"{}\"",
                    player, name
                )));
            }
        }
        Ok(Self {
            name,
            owner_id,
            guild_id,
            players,
            points,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Members in the order they joined. The first entry is the team's founder.
    pub fn players(&self) -> &[UserId] {
        &self.players
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn is_owned_by(&self, id: UserId) -> bool {
        self.owner_id == id
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.players.contains(&id)
    }

    /// Adds a player to the end of the member list.
    pub fn add_player(&mut self, candidate: Candidate, policy: BotPolicy) -> Result<(), TeamError> {
        if self.contains(candidate.id) {
            return Err(TeamError::AlreadyOnTeam {
                player: candidate.id,
                team: self.name.clone(),
            });
        }
        if candidate.bot && policy == BotPolicy::Reject {
            return Err(TeamError::CannotAddBot {
                player: candidate.id,
                team: self.name.clone(),
            });
        }

        self.players.push(candidate.id);
        Ok(())
    }

    /// Removes a non-owner player. The owner has to hand over the team first.
    pub fn remove_player(&mut self, id: UserId) -> Result<(), TeamError> {
        let Some(index) = self.players.iter().position(|player| *player == id) else {
            return Err(TeamError::NotOnTeam {
                player: id,
                team: self.name.clone(),
            });
        };
        if self.is_owned_by(id) {
            return Err(TeamError::CannotRemoveOwner {
                player: id,
                team: self.name.clone(),
            });
        }

        self.players.remove(index);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, new_owner_id: UserId) -> Result<(), TeamError> {
        if !self.contains(new_owner_id) {
            return Err(TeamError::NotOnTeam {
                player: new_owner_id,
                team: self.name.clone(),
            });
        }
        if self.is_owned_by(new_owner_id) {
            return Err(TeamError::AlreadyOwner {
                player: new_owner_id,
                team: self.name.clone(),
            });
        }

        self.owner_id = new_owner_id;
        Ok(())
    }

    /// Members other than the owner, in join order.
    pub fn non_owners(&self) -> impl Iterator<Item = UserId> + '_ {
        self.players
            .iter()
            .copied()
            .filter(move |player| *player != self.owner_id)
    }
}
