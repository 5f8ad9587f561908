//! Seed the `seed_records` table in one transaction.
//!
//! Reads `SeederConfig` (see `bulk_seeder::config`), plans `total_count`
//! records in batches of `batch_size`, and loads them all or nothing. Ctrl-C
//! cancels the load and rolls it back.

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use bulk_seeder::database::{DatabaseConnection, DatabaseMigrations};
use bulk_seeder::logging::init_structured_logging;
use bulk_seeder::persistence::{InMemoryRecordStore, PgRecordStore};
use bulk_seeder::{plan, SeederConfig, TransactionalLoader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = SeederConfig::load().context("Error loading configuration")?;
    init_structured_logging();

    let batches = plan(config.total_count, config.batch_size)?;
    info!(
        total_count = config.total_count,
        batch_size = config.batch_size,
        batches = batches.batch_count(),
        dry_run = config.dry_run,
        "Starting seed run"
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let loader = TransactionalLoader::new()
        .with_cancellation(cancel)
        .with_progress_log_interval(config.progress_log_interval);

    let result = if config.dry_run {
        let store = InMemoryRecordStore::new();
        loader.load(&store, batches).await
    } else {
        let db = DatabaseConnection::connect(&config)
            .await
            .context("Failed to connect to database")?;
        if !db
            .health_check()
            .await
            .context("Database health check failed")?
        {
            anyhow::bail!("Database health check returned an unexpected result");
        }
        DatabaseMigrations::run_all(db.pool())
            .await
            .context("Error migrating database schema")?;

        let store = PgRecordStore::new(db.pool().clone());
        let result = loader.load(&store, batches).await;
        db.close().await;
        result
    };

    match result {
        Ok(report) => {
            info!(
                batches = report.batches_committed,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "{report}"
            );
            Ok(())
        }
        Err(e) => {
            error!(stage = e.stage(), error = %e, "Error inserting data");
            Err(e).context("Seed run failed")
        }
    }
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling load");
            cancel.cancel();
        }
    });
}
