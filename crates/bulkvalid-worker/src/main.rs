use std::sync::Arc;
use std::time::Duration;

use bulkvalid_core::{Config, RunLock};
use bulkvalid_db::{FileValidationRepository, RecordStore, SchedulerLockRepository};
use bulkvalid_services::{FileTransferService, HttpFileTransferClient, RetryPolicy};
use bulkvalid_storage::create_storage;
use bulkvalid_worker::{telemetry, ValidationScheduler, ValidationSchedulerConfig};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    telemetry::init_telemetry();

    let pool = bulkvalid_worker::setup::setup_database(&config).await?;
    let storage = create_storage(&config).await?;

    let records: Arc<dyn RecordStore> = Arc::new(FileValidationRepository::new(pool.clone()));
    let lock: Arc<dyn RunLock> = Arc::new(SchedulerLockRepository::new(pool));

    let client = Arc::new(HttpFileTransferClient::new(
        config.transfer_api_url.clone(),
        config.transfer_api_key.clone(),
    ));
    let retry = RetryPolicy::new(
        Duration::from_secs(config.retry_base_delay_secs),
        Duration::from_secs(config.retry_delay_increment_secs),
        Duration::from_secs(config.retry_max_delay_secs),
        Duration::from_secs(config.retry_timeout_secs),
    );
    let transfers = Arc::new(FileTransferService::new(client, retry));

    let scheduler = ValidationScheduler::new(
        records,
        transfers,
        storage,
        lock,
        ValidationSchedulerConfig {
            poll_interval: config.poll_interval(),
            lock_min_hold: config.lock_min_hold(),
            lock_max_hold: config.lock_max_hold(),
        },
    );
    let shutdown_tx = scheduler.start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(()).await;

    Ok(())
}
