use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use poise::serenity_prelude::{self as serenity, GatewayIntents, UserId};
use sea_orm::DatabaseConnection;
use teambot::{
    infrastructure::{botdata::Data, environment, environment::env_var_with_context},
    teams::SharedTeams,
};
use tracing::{debug, error, info, warn};

pub async fn create_serenity_client(
    db: DatabaseConnection,
    teams: SharedTeams,
) -> anyhow::Result<serenity::Client> {
    let token = env_var_with_context(environment::DISCORD_TOKEN)?;
    info!("{} variable found.", environment::DISCORD_TOKEN);
    let intents = serenity::GatewayIntents::non_privileged()
        .union(GatewayIntents::MESSAGE_CONTENT)
        .union(GatewayIntents::GUILD_MEMBERS);
    let framework = create_poise_framework(Data::new(db, teams));

    serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Failed to create serenity client")
}

fn create_poise_framework(data: Data) -> poise::Framework<Data, teambot::Error> {
    let (initialize_owners, owners) = match try_get_owners_env() {
        Ok(owners) => (false, owners.into_iter().collect()),
        Err(error) => {
            if let OwnerParseError::UserIdParseError(e) = error {
                warn!("Invalid UserId in {}: {}", environment::OWNERS, e);
            }
            (true, HashSet::new())
        }
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_enabled_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                mention_as_prefix: true,
                edit_tracker: Some(Arc::new(poise::EditTracker::for_timespan(
                    Duration::from_secs(3600),
                ))),
                ..Default::default()
            },
            initialize_owners,
            owners,
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Executing Command: {:?} for {} ({})",
                        ctx.command().qualified_name,
                        ctx.author()
                            .clone()
                            .member
                            .and_then(|m| m.nick)
                            .unwrap_or(ctx.author().display_name().to_string()),
                        ctx.author().name,
                    );

                    if let Ok(mut invoc_time) = ctx.data().invoc_time.write() {
                        invoc_time.insert(ctx.id(), Instant::now());
                    }
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    if let Ok(mut invoc_time_map) = ctx.data().invoc_time.write() {
                        match invoc_time_map.remove(&ctx.id()) {
                            Some(start_time) => {
                                debug!(
                                    "Command {} finished in {:?}",
                                    ctx.command().qualified_name,
                                    start_time.elapsed()
                                );
                            }
                            None => {
                                error!(
                                    "Post-command hook called for command without a start-time set."
                                );
                            }
                        }
                    }
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    if let Err(e) = poise::builtins::on_error(error).await {
                        error!("{:?}", e);
                    }
                })
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(teambot::infrastructure::event_handler::event_handler(
                    ctx, event, framework, data,
                ))
            },
            ..Default::default()
        })
        .setup(|_ctx, _ready, _framework| Box::pin(async move { Ok(data) }))
        .build();

    for cmd in framework.options().commands.iter() {
        info!("Loaded command: {:#?}", cmd.name);
    }

    framework
}

fn get_enabled_commands() -> Vec<poise::Command<Data, teambot::Error>> {
    let default_commands = vec![
        teambot::commands::builtins::help(),
        teambot::commands::builtins::register(),
        teambot::commands::team::team(),
        teambot::commands::team::teams(),
        teambot::commands::team::save_teams(),
    ];

    // Get the list of commands disabled by environment variable
    let disable_commands_env =
        std::env::var(environment::COMMAND_DISABLE_LIST).unwrap_or_default();
    let disabled_commands: HashSet<String> = disable_commands_env
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    // Log the disabled commands
    let disabled_commands_info: Vec<&String> = disabled_commands
        .iter()
        .filter(|s| {
            default_commands
                .iter()
                .any(|cmd| cmd.name.to_lowercase() == **s)
        })
        .collect();
    if disabled_commands_info.is_empty() {
        info!("Loading default commands");
    } else {
        info!("Disabled commands: {:?}", disabled_commands_info);
    }

    // Return the enabled commands
    default_commands
        .into_iter()
        .filter(|cmd| !disabled_commands.contains(&cmd.name.to_lowercase()))
        .collect()
}

enum OwnerParseError {
    MissingEnvVar,
    UserIdParseError(String),
}

fn try_get_owners_env() -> Result<Vec<UserId>, OwnerParseError> {
    let env_var = std::env::var(environment::OWNERS).map_err(|_| OwnerParseError::MissingEnvVar)?;
    env_var
        .split(',')
        .map(|value| {
            teambot::infrastructure::ids::id_from_string::<UserId>(value.trim())
                .map_err(|e| OwnerParseError::UserIdParseError(e.to_string()))
        })
        .collect()
}
