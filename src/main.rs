use anyhow::Context;
use teambot::{infrastructure::environment, teams::store};
use tracing::info;

mod client;
mod database;
mod logging;
mod shutdown;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init_logger()?;
    let db = database::init_database().await?;
    let teams = database::load_teams(&db).await?;

    let snapshots = tokio::spawn(store::persist_periodically(
        db.clone(),
        teams.clone(),
        environment::snapshot_interval(),
    ));

    let mut client = client::create_serenity_client(db.clone(), teams.clone()).await?;
    let shard_manager = client.shard_manager.clone();

    shutdown::run_until_shutdown(client.start(), || async move {
        snapshots.abort();
        shard_manager.shutdown_all().await;
        store::save_registry(&db, &teams)
            .await
            .context("Failed to save teams on shutdown")?;
        info!("Teams saved. Goodbye.");
        Ok::<(), anyhow::Error>(())
    })
    .await
}
