use poise::serenity_prelude::UserId;
use thiserror::Error;

/// Expected failures of team operations.
///
/// Every variant is recoverable: the command layer renders it as a reply and
/// leaves the registry untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TeamError {
    #[error("player {player} is already on the team \"{team}\"")]
    PlayerAlreadyOnATeam { player: UserId, team: String },

    #[error("a team named \"{0}\" already exists")]
    TeamAlreadyExists(String),

    #[error("player {0} is not on a team")]
    PlayerNotOnATeam(UserId),

    #[error("player {player} is not the owner of the team \"{team}\"")]
    PlayerNotTeamOwner { player: UserId, team: String },

    #[error("player {player} is already in the team \"{team}\"")]
    AlreadyOnTeam { player: UserId, team: String },

    #[error("player {player} is not on the team \"{team}\"")]
    NotOnTeam { player: UserId, team: String },

    #[error("player {player} already is the owner of the team \"{team}\"")]
    AlreadyOwner { player: UserId, team: String },

    #[error("player {player} is a bot and cannot join the team \"{team}\"")]
    CannotAddBot { player: UserId, team: String },

    #[error("player {player} owns the team \"{team}\" and cannot be removed from it")]
    CannotRemoveOwner { player: UserId, team: String },

    #[error("team snapshot is corrupt: {reason}")]
    CorruptSnapshot { reason: String },
}

impl TeamError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptSnapshot {
            reason: reason.into(),
        }
    }
}
