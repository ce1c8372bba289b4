/*!

`/team` and `/teams` slash commands.

Each command takes the registry lock for exactly one registry call, renders the result with
[`replies`], answers the interaction and only then sends [`notify`] messages.

*/

use poise::{
    CreateReply,
    serenity_prelude::{
        self as serenity,
        futures::{self, Stream, StreamExt},
    },
};
use tracing::{debug, info, trace};

use crate::{
    Context, Error,
    infrastructure::{ids::require_guild_id, util::send_reply},
    lazy_regex,
    teams::{Candidate, LeaveOutcome, store},
};

pub mod notify;
pub mod replies;

lazy_regex! { TEAM_NAME_REGEX, r"^[^@#:`]{1,32}$" }

fn validate_team_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Team names cannot be blank.");
    }
    if !TEAM_NAME_REGEX.is_match(name) {
        return Err(
            "Team names are limited to 32 characters and cannot contain `@`, `#`, `:` or backticks.",
        );
    }
    Ok(())
}

async fn team_name_autocomplete<'a>(
    ctx: Context<'a>,
    partial: &'a str,
) -> impl Stream<Item = String> + 'a {
    debug!(partial = partial, "team_name_autocomplete executed with args");
    let guild_id = match require_guild_id(ctx) {
        Ok(id) => id,
        Err(_) => return futures::stream::empty().boxed(),
    };

    let partial = partial.to_lowercase();
    let names: Vec<String> = ctx
        .data()
        .teams
        .read()
        .await
        .teams_in_guild(guild_id)
        .map(|team| team.name().to_string())
        .filter(|name| name.to_lowercase().contains(&partial))
        .take(25)
        .collect();

    futures::stream::iter(names).boxed()
}

/// Team related commands
#[poise::command(
    slash_command,
    guild_only,
    category = "Teams",
    subcommands("create", "disband", "invite", "remove", "transfer", "leave", "info"),
    subcommand_required
)]
pub async fn team(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Creates a new team with you as its owner
#[poise::command(slash_command, guild_only, category = "Teams")]
async fn create(
    ctx: Context<'_>,
    #[description = "The name of the team"] name: String,
) -> Result<(), Error> {
    trace!(name = %name, "team create executed with args");
    let guild_id = require_guild_id(ctx)?;
    if let Err(reason) = validate_team_name(&name) {
        return send_reply(ctx, replies::failure(reason)).await;
    }

    let author = ctx.author().id;
    let result = ctx
        .data()
        .teams
        .write()
        .await
        .create_team(name, author, guild_id)
        .cloned();

    let reply = match result {
        Ok(team) => {
            info!(team = team.name(), owner = %author, "Team created");
            replies::success(replies::team_created(&team))
        }
        Err(e) => replies::error(&e, author),
    };
    send_reply(ctx, reply).await
}

/// Disbands the team you own
#[poise::command(slash_command, guild_only, category = "Teams")]
async fn disband(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author().id;
    let result = ctx.data().teams.write().await.disband_team(author);

    match result {
        Ok(team) => {
            info!(team = team.name(), owner = %author, "Team disbanded");
            send_reply(ctx, replies::success(replies::team_disbanded(&team))).await?;
            let notice = replies::disbanded_notice(&team, author);
            let former_members = team.players().iter().copied().filter(|p| *p != author);
            notify::notify_all(ctx.serenity_context(), former_members, &notice).await;
            Ok(())
        }
        Err(e) => send_reply(ctx, replies::error(&e, author)).await,
    }
}

/// Adds a player to the team you own
#[poise::command(slash_command, guild_only, category = "Teams")]
async fn invite(
    ctx: Context<'_>,
    #[description = "The player to add"] player: serenity::User,
) -> Result<(), Error> {
    trace!(player = %player.id, "team invite executed with args");
    let author = ctx.author().id;
    let candidate = Candidate {
        id: player.id,
        bot: player.bot,
    };
    let result = ctx
        .data()
        .teams
        .write()
        .await
        .invite_player(candidate, author)
        .cloned();

    match result {
        Ok(team) => {
            info!(team = team.name(), player = %player.id, "Player invited");
            send_reply(ctx, replies::success(replies::player_invited(&team, player.id))).await?;
            let notice = replies::invited_notice(&team, author);
            notify::notify(ctx.serenity_context(), player.id, &notice).await;
            Ok(())
        }
        Err(e) => send_reply(ctx, replies::error(&e, author)).await,
    }
}

/// Removes a player from the team you own
#[poise::command(slash_command, guild_only, category = "Teams")]
async fn remove(
    ctx: Context<'_>,
    #[description = "The player to remove"] player: serenity::User,
) -> Result<(), Error> {
    trace!(player = %player.id, "team remove executed with args");
    let author = ctx.author().id;
    let result = ctx
        .data()
        .teams
        .write()
        .await
        .remove_player_from_team(player.id, author)
        .cloned();

    match result {
        Ok(team) => {
            info!(team = team.name(), player = %player.id, "Player removed");
            send_reply(ctx, replies::success(replies::player_removed(&team, player.id))).await?;
            let notice = replies::removed_notice(&team);
            notify::notify(ctx.serenity_context(), player.id, &notice).await;
            Ok(())
        }
        Err(e) => send_reply(ctx, replies::error(&e, author)).await,
    }
}

/// Hands ownership of your team to another member
#[poise::command(slash_command, guild_only, category = "Teams")]
async fn transfer(
    ctx: Context<'_>,
    #[description = "The member who will own the team"] player: serenity::User,
) -> Result<(), Error> {
    trace!(player = %player.id, "team transfer executed with args");
    let author = ctx.author().id;
    let result = ctx
        .data()
        .teams
        .write()
        .await
        .transfer_ownership(author, player.id);

    match result {
        Ok(transfer) => {
            info!(
                team = transfer.team.name(),
                from = %transfer.previous_owner,
                to = %transfer.new_owner,
                "Ownership transferred"
            );
            send_reply(ctx, replies::success(replies::ownership_transferred(&transfer))).await?;
            let notice = replies::new_owner_notice(&transfer);
            notify::notify(ctx.serenity_context(), transfer.new_owner, &notice).await;
            Ok(())
        }
        Err(e) => send_reply(ctx, replies::error(&e, author)).await,
    }
}

/// Leaves your team. Owners hand the team to a random member
#[poise::command(slash_command, guild_only, category = "Teams")]
async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author().id;
    let result = {
        let mut teams = ctx.data().teams.write().await;
        let mut rng = rand::rng();
        teams.leave_team(author, &mut rng)
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => return send_reply(ctx, replies::error(&e, author)).await,
    };

    info!(team = outcome.team().name(), player = %author, "Player left team");
    send_reply(ctx, replies::success(replies::team_left(&outcome))).await?;
    if let LeaveOutcome::OwnerReplaced {
        team, new_owner, ..
    } = &outcome
    {
        let notice = replies::succession_notice(team, author);
        notify::notify(ctx.serenity_context(), *new_owner, &notice).await;
    }
    Ok(())
}

/// Shows a team's owner, members and points
#[poise::command(slash_command, guild_only, category = "Teams")]
async fn info(
    ctx: Context<'_>,
    #[description = "Team to show (default: your own team)"]
    #[autocomplete = "team_name_autocomplete"]
    name: Option<String>,
) -> Result<(), Error> {
    trace!(name = ?name, "team info executed with args");
    let guild_id = require_guild_id(ctx)?;
    let author = ctx.author().id;
    let team = {
        let teams = ctx.data().teams.read().await;
        match &name {
            Some(name) => teams.get_team(name).cloned(),
            None => teams.get_player_team(author).cloned(),
        }
    }
    .filter(|team| team.guild_id() == guild_id);

    let reply = match (team, name) {
        (Some(team), _) => replies::team_info(&team),
        (None, Some(name)) => replies::failure(format!("There is no team named **{}**.", name)),
        (None, None) => replies::failure("You are not on a team. Create one with `/team create`."),
    };
    send_reply(ctx, reply).await
}

/// Lists every team in this server
#[poise::command(slash_command, guild_only, category = "Teams")]
pub async fn teams(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild_id(ctx)?;
    let listing = {
        let teams = ctx.data().teams.read().await;
        replies::team_list(teams.teams_in_guild(guild_id))
    };
    send_reply(ctx, replies::listing(listing)).await
}

/// Writes every team to the database now instead of waiting for the next snapshot.
#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    hide_in_help,
    category = "Teams"
)]
pub async fn save_teams(ctx: Context<'_>) -> Result<(), Error> {
    store::save_registry(&ctx.data().db_pool, &ctx.data().teams).await?;
    info!("Teams saved on request");
    send_reply(
        ctx,
        CreateReply::default()
            .content("Saved all teams.")
            .ephemeral(true),
    )
    .await
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Red" ; "simple")]
    #[test_case("The Imposters 2" ; "spaces and digits")]
    #[test_case("équipe" ; "accented")]
    #[test_case("abcdefghijklmnopqrstuvwxyz012345" ; "exactly 32")]
    fn accepts_reasonable_names(name: &str) {
        assert_eq!(validate_team_name(name), Ok(()));
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("@everyone" ; "mention")]
    #[test_case("team#1" ; "hash")]
    #[test_case("a:b" ; "colon")]
    #[test_case("`code`" ; "backtick")]
    #[test_case("abcdefghijklmnopqrstuvwxyz0123456" ; "33 characters")]
    fn rejects_unusable_names(name: &str) {
        assert!(validate_team_name(name).is_err());
    }
}
