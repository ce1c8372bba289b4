use std::path::PathBuf;

use anyhow::Context;
use teambot::infrastructure::environment;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn,teambot=info";
const LOG_FILE_PREFIX: &str = "teambot.log";

/// Sets up stdout and daily file logging. Keep the returned guard alive until exit,
/// dropping it flushes the file writer.
pub fn init_logger() -> anyhow::Result<WorkerGuard> {
    let env_file = load_env_file();
    let guard = init_tracing()?;
    info!("Starting teambot...");
    log_env_file_result(env_file);
    Ok(guard)
}

fn init_tracing() -> anyhow::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_env(environment::LOG_LEVEL)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let source_path = environment::log_source_path();
    let ansi = std::env::var(environment::LOG_STYLE)
        .map(|style| !style.eq_ignore_ascii_case("never"))
        .unwrap_or(true);

    let log_dir = environment::get_log_directory();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX));

    let stdout_layer = fmt::layer()
        .with_ansi(ansi)
        .with_file(source_path)
        .with_line_number(source_path);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_file(source_path)
        .with_line_number(source_path)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;
    Ok(guard)
}

fn load_env_file() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

fn log_env_file_result(env_file: Option<PathBuf>) {
    if let Some(path) = env_file {
        info!("Loaded environment variables from {}", path.display());
    } else {
        info!("No .env file found, proceeding with system environment variables.");
    }
}
