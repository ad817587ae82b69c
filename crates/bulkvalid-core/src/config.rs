//! Configuration module
//!
//! Environment-driven configuration for the validation worker: database,
//! storage backend, transfer service client, scheduler cadence, and the
//! scan-retry policy.

use std::env;
use std::time::Duration;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const POLL_INTERVAL_SECS: u64 = 30;
const LOCK_MIN_HOLD_SECS: u64 = 5;
const LOCK_MAX_HOLD_SECS: u64 = 300;
const RETRY_BASE_DELAY_SECS: u64 = 5;
const RETRY_DELAY_INCREMENT_SECS: u64 = 5;
const RETRY_MAX_DELAY_SECS: u64 = 30;
const RETRY_TIMEOUT_SECS: u64 = 300;

/// Where validated files are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

/// Application configuration for the validation worker.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    // File transfer service
    pub transfer_api_url: String,
    pub transfer_api_key: Option<String>,
    // Scheduler cadence and run lock holds
    pub poll_interval_secs: u64,
    pub lock_min_hold_secs: u64,
    pub lock_max_hold_secs: u64,
    // Scan-retry policy
    pub retry_base_delay_secs: u64,
    pub retry_delay_increment_secs: u64,
    pub retry_max_delay_secs: u64,
    pub retry_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend =
            env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|s| match s.to_lowercase().as_str() {
                    "s3" => Some(StorageBackend::S3),
                    "local" => Some(StorageBackend::Local),
                    _ => None,
                });

        let config = Config {
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            transfer_api_url: env::var("FILE_TRANSFER_API_URL")
                .map_err(|_| anyhow::anyhow!("FILE_TRANSFER_API_URL must be set"))?,
            transfer_api_key: env::var("FILE_TRANSFER_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| POLL_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(POLL_INTERVAL_SECS),
            lock_min_hold_secs: env::var("LOCK_MIN_HOLD_SECS")
                .unwrap_or_else(|_| LOCK_MIN_HOLD_SECS.to_string())
                .parse()
                .unwrap_or(LOCK_MIN_HOLD_SECS),
            lock_max_hold_secs: env::var("LOCK_MAX_HOLD_SECS")
                .unwrap_or_else(|_| LOCK_MAX_HOLD_SECS.to_string())
                .parse()
                .unwrap_or(LOCK_MAX_HOLD_SECS),
            retry_base_delay_secs: env::var("RETRY_BASE_DELAY_SECS")
                .unwrap_or_else(|_| RETRY_BASE_DELAY_SECS.to_string())
                .parse()
                .unwrap_or(RETRY_BASE_DELAY_SECS),
            retry_delay_increment_secs: env::var("RETRY_DELAY_INCREMENT_SECS")
                .unwrap_or_else(|_| RETRY_DELAY_INCREMENT_SECS.to_string())
                .parse()
                .unwrap_or(RETRY_DELAY_INCREMENT_SECS),
            retry_max_delay_secs: env::var("RETRY_MAX_DELAY_SECS")
                .unwrap_or_else(|_| RETRY_MAX_DELAY_SECS.to_string())
                .parse()
                .unwrap_or(RETRY_MAX_DELAY_SECS),
            retry_timeout_secs: env::var("RETRY_TIMEOUT_SECS")
                .unwrap_or_else(|_| RETRY_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(RETRY_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn lock_min_hold(&self) -> Duration {
        Duration::from_secs(self.lock_min_hold_secs)
    }

    pub fn lock_max_hold(&self) -> Duration {
        Duration::from_secs(self.lock_max_hold_secs)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        match self.storage_backend.unwrap_or(StorageBackend::S3) {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.retry_base_delay_secs > self.retry_max_delay_secs {
            return Err(anyhow::anyhow!(
                "RETRY_BASE_DELAY_SECS must not exceed RETRY_MAX_DELAY_SECS"
            ));
        }
        if self.lock_min_hold_secs > self.lock_max_hold_secs {
            return Err(anyhow::anyhow!(
                "LOCK_MIN_HOLD_SECS must not exceed LOCK_MAX_HOLD_SECS"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            environment: "development".to_string(),
            database_url: "postgresql://localhost/bulkvalid".to_string(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: Some(StorageBackend::Local),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: Some("/tmp/bulkvalid".to_string()),
            transfer_api_url: "http://localhost:8080/files".to_string(),
            transfer_api_key: None,
            poll_interval_secs: POLL_INTERVAL_SECS,
            lock_min_hold_secs: LOCK_MIN_HOLD_SECS,
            lock_max_hold_secs: LOCK_MAX_HOLD_SECS,
            retry_base_delay_secs: RETRY_BASE_DELAY_SECS,
            retry_delay_increment_secs: RETRY_DELAY_INCREMENT_SECS,
            retry_max_delay_secs: RETRY_MAX_DELAY_SECS,
            retry_timeout_secs: RETRY_TIMEOUT_SECS,
        }
    }

    #[test]
    fn local_backend_requires_path() {
        let mut config = base_config();
        assert!(config.validate().is_ok());
        config.local_storage_path = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_backend_requires_bucket_and_region() {
        let mut config = base_config();
        config.storage_backend = Some(StorageBackend::S3);
        assert!(config.validate().is_err());
        config.s3_bucket = Some("bulk-data".to_string());
        assert!(config.validate().is_err());
        config.s3_region = Some("eu-west-2".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_postgres_database_url() {
        let mut config = base_config();
        config.database_url = "mysql://localhost/x".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_retry_delays() {
        let mut config = base_config();
        config.retry_base_delay_secs = 60;
        config.retry_max_delay_secs = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_detection() {
        let mut config = base_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
    }
}
