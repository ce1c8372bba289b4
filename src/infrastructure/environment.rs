use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use tracing::warn;

use crate::teams::BotPolicy;

macro_rules! const_str {
    ($name:ident) => {
        pub const $name: &str = stringify!($name);
    };
}

const_str!(DATA_DIRECTORY);
const_str!(DATABASE_URL);
const_str!(DISCORD_TOKEN);
const_str!(OWNERS);
const_str!(COMMAND_DISABLE_LIST);

const_str!(SNAPSHOT_INTERVAL_SECS);
const_str!(ALLOW_BOT_MEMBERS);

const_str!(LOG_LEVEL);
const_str!(LOG_STYLE);
const_str!(LOG_PATH);

const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 300;

pub fn env_var_with_context(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing environment variable {}", name))
}

pub fn get_data_directory() -> PathBuf {
    std::env::var(DATA_DIRECTORY)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

pub fn get_log_directory() -> PathBuf {
    get_data_directory().join("logs")
}

/// Parses `value`, falling back to `default` when it is unset or malformed.
pub fn parse_or<T>(name: &str, value: Option<&str>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Debug,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => match raw.parse::<T>() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to parse {}={:?}: {:?}", name, raw, e);
                default
            }
        },
        None => default,
    }
}

fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Debug,
{
    parse_or(name, std::env::var(name).ok().as_deref(), default)
}

pub fn snapshot_interval() -> Duration {
    let secs = env_or(SNAPSHOT_INTERVAL_SECS, DEFAULT_SNAPSHOT_INTERVAL_SECS);
    Duration::from_secs(secs.max(1))
}

pub fn bot_policy() -> BotPolicy {
    BotPolicy::from_allow_flag(env_or(ALLOW_BOT_MEMBERS, false))
}

pub fn log_source_path() -> bool {
    env_or(LOG_PATH, false)
}
