use anyhow::Context;
use poise::serenity_prelude as serenity;
use tracing::{error, info};

/// Drives the client until it stops or the process is asked to terminate, then runs `cleanup`.
pub async fn run_until_shutdown<T, F, Fut>(client_future: T, cleanup: F) -> anyhow::Result<()>
where
    T: Future<Output = Result<(), serenity::Error>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    tokio::select! {
        term_result = termination() => {
            info!("Bot is shutting down!");
            cleanup().await?;
            term_result.context("Received unexpected error from termination signal.")?;
        }
        client_result = client_future => {
            error!("Bot event loop closed. Shutting down.");
            cleanup().await?;
            client_result.context("Bot event loop closed unexpectedly.")?;
        }
    }
    Ok(())
}

#[cfg(windows)]
async fn termination() -> tokio::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(unix)]
async fn termination() -> tokio::io::Result<()> {
    let sigint = tokio::signal::ctrl_c();
    let sigterm = sigterm();
    tokio::select! {
        res = sigint => res,
        res = sigterm => res
    }
}

#[cfg(unix)]
async fn sigterm() -> tokio::io::Result<()> {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?
        .recv()
        .await;
    Ok(())
}
