/*!

Text and embeds for `/team` replies and direct-message notifications.

Everything here is a pure function of the registry results, so the wording can be checked
without a Discord connection.

*/

use poise::{
    CreateReply,
    serenity_prelude::{CreateEmbed, Mentionable, UserId},
};

use crate::{
    infrastructure::colors,
    teams::{LeaveOutcome, OwnershipTransfer, Team, TeamError},
};

/// Embed descriptions are capped at 4096 characters by Discord.
const LIST_LIMIT: usize = 3900;

fn who(player: UserId, acting: UserId) -> String {
    if player == acting {
        "You".to_string()
    } else {
        player.mention().to_string()
    }
}

/// Explains a failed team command from the point of view of `acting`.
pub fn describe_error(error: &TeamError, acting: UserId) -> String {
    match error {
        TeamError::PlayerAlreadyOnATeam { player, team } => {
            let verb = if *player == acting { "are" } else { "is" };
            format!(
                "{} {} already on the team **{}**. Leave it with `/team leave` first.",
                who(*player, acting),
                verb,
                team
            )
        }
        TeamError::TeamAlreadyExists(name) => {
            format!("A team named **{}** already exists.", name)
        }
        TeamError::PlayerNotOnATeam(_) => {
            "You are not on a team. Create one with `/team create`.".to_string()
        }
        TeamError::PlayerNotTeamOwner { team, .. } => {
            format!("Only the owner of **{}** can do that.", team)
        }
        TeamError::AlreadyOnTeam { player, team } => {
            format!("{} is already a member of **{}**.", player.mention(), team)
        }
        TeamError::NotOnTeam { player, team } => {
            format!("{} is not a member of **{}**.", player.mention(), team)
        }
        TeamError::AlreadyOwner { player, team } => {
            let verb = if *player == acting { "already own" } else { "already owns" };
            format!("{} {} **{}**.", who(*player, acting), verb, team)
        }
        TeamError::CannotAddBot { player, team } => {
            format!("{} is a bot and cannot join **{}**.", player.mention(), team)
        }
        TeamError::CannotRemoveOwner { team, .. } => format!(
            "The owner cannot be removed from **{}**. Use `/team transfer` first, or `/team leave`.",
            team
        ),
        TeamError::CorruptSnapshot { .. } => {
            "The team records are damaged. Please contact the bot owner.".to_string()
        }
    }
}

pub fn team_created(team: &Team) -> String {
    format!(
        "Created the team **{}**. Add players with `/team invite`.",
        team.name()
    )
}

pub fn team_disbanded(team: &Team) -> String {
    let others = team.players().len().saturating_sub(1);
    if others == 0 {
        format!("Disbanded the team **{}**.", team.name())
    } else {
        format!(
            "Disbanded the team **{}**. {} former member(s) will be notified.",
            team.name(),
            others
        )
    }
}

pub fn player_invited(team: &Team, player: UserId) -> String {
    format!("{} joined **{}**.", player.mention(), team.name())
}

pub fn player_removed(team: &Team, player: UserId) -> String {
    format!("{} was removed from **{}**.", player.mention(), team.name())
}

pub fn ownership_transferred(transfer: &OwnershipTransfer) -> String {
    format!(
        "{} is now the owner of **{}**.",
        transfer.new_owner.mention(),
        transfer.team.name()
    )
}

pub fn team_left(outcome: &LeaveOutcome) -> String {
    match outcome {
        LeaveOutcome::Left { team } => format!("You left **{}**.", team.name()),
        LeaveOutcome::OwnerReplaced {
            team, new_owner, ..
        } => format!(
            "You left **{}**. {} is the new owner.",
            team.name(),
            new_owner.mention()
        ),
        LeaveOutcome::Disbanded { team } => format!(
            "You left **{}**. It had no other members and has been disbanded.",
            team.name()
        ),
    }
}

pub fn invited_notice(team: &Team, owner: UserId) -> String {
    format!(
        "You have been added to the team **{}** by {}.",
        team.name(),
        owner.mention()
    )
}

pub fn removed_notice(team: &Team) -> String {
    format!("You have been removed from the team **{}**.", team.name())
}

pub fn new_owner_notice(transfer: &OwnershipTransfer) -> String {
    format!(
        "{} made you the owner of the team **{}**.",
        transfer.previous_owner.mention(),
        transfer.team.name()
    )
}

pub fn succession_notice(team: &Team, previous_owner: UserId) -> String {
    format!(
        "{} left **{}**, and you are its new owner.",
        previous_owner.mention(),
        team.name()
    )
}

pub fn disbanded_notice(team: &Team, owner: UserId) -> String {
    format!(
        "The team **{}** has been disbanded by {}.",
        team.name(),
        owner.mention()
    )
}

pub fn member_list(team: &Team) -> String {
    team.players()
        .iter()
        .map(|player| {
            if team.is_owned_by(*player) {
                format!("{} (owner)", player.mention())
            } else {
                player.mention().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per team, truncated to what fits in an embed.
pub fn team_list<'a>(teams: impl IntoIterator<Item = &'a Team>) -> String {
    let mut listing = String::new();
    let mut hidden = 0usize;
    for team in teams {
        let line = format!(
            "**{}** | owner {} | {} member(s) | {} point(s)\n",
            team.name(),
            team.owner_id().mention(),
            team.players().len(),
            team.points()
        );
        if hidden > 0 || listing.len() + line.len() > LIST_LIMIT {
            hidden += 1;
            continue;
        }
        listing.push_str(&line);
    }

    if listing.is_empty() && hidden == 0 {
        return "There are no teams yet. Create one with `/team create`.".to_string();
    }
    if hidden > 0 {
        listing.push_str(&format!("...and {} more", hidden));
    }
    listing
}

pub fn success(description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .description(description)
            .color(colors::lime()),
    )
}

pub fn failure(description: impl Into<String>) -> CreateReply {
    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .description(description)
                .color(colors::red()),
        )
        .ephemeral(true)
}

pub fn error(error: &TeamError, acting: UserId) -> CreateReply {
    failure(describe_error(error, acting))
}

pub fn team_info(team: &Team) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(team.name())
            .color(colors::royal_blue())
            .field("Owner", team.owner_id().mention().to_string(), true)
            .field("Points", team.points().to_string(), true)
            .field("Members", member_list(team), false),
    )
}

pub fn listing(description: String) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("Teams")
            .description(description)
            .color(colors::slate()),
    )
}
