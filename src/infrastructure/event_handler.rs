use poise::serenity_prelude::{ActivityData, Context, FullEvent};
use tracing::info;

use crate::{Error, infrastructure::botdata::Data};

pub async fn event_handler(
    ctx: &Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            ctx.set_activity(Some(ActivityData::watching("/help")));
            info!("Bot is ready. Logged in as {}", data_about_bot.user.name);
        }
        FullEvent::CacheReady { guilds } => {
            let team_count = data.teams.read().await.len();
            info!(
                "Connected to {} server(s), tracking {} team(s)",
                guilds.len(),
                team_count
            );
            for guild_id in guilds {
                if let Some(guild) = ctx.cache.guild(*guild_id) {
                    info!(
                        "- {} ({}): {} members",
                        guild.name, guild_id, guild.member_count
                    );
                }
            }
        }
        _ => {}
    }
    Ok(())
}
