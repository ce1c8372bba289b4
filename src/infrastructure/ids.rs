use std::num::{NonZeroU64, ParseIntError};

use poise::serenity_prelude::GuildId;
use tracing::trace;

use crate::{Context, Error};

pub fn require_guild_id(ctx: Context<'_>) -> Result<GuildId, Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This function is only available in guilds")?;
    trace!("Found guild_id={:?}", guild_id);
    Ok(guild_id)
}

pub fn id_to_string<T>(value: T) -> String
where
    T: Into<u64>,
{
    let int: u64 = value.into();
    int.to_string()
}

/// Parses a stored snowflake. Zero is rejected rather than handed to serenity.
pub fn id_from_string<T>(value: &str) -> Result<T, ParseIntError>
where
    T: From<NonZeroU64>,
{
    value.parse::<NonZeroU64>().map(T::from)
}
