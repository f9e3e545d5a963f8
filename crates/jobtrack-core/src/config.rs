//! Configuration module
//!
//! Environment-driven configuration, loaded once at startup and validated
//! before anything binds a socket or touches the bucket.

use std::env;

use crate::constants::{
    PRESIGNED_TTL_DEFAULT_SECS, PRESIGNED_TTL_MAX_SECS, PRESIGNED_TTL_MIN_SECS,
    RATE_LIMIT_DEFAULT_QUOTA, RATE_LIMIT_DEFAULT_WINDOW_SECS,
};
use crate::models::TransitionPolicy;
use crate::storage_types::StorageBackend;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_REQUEST_BODY_LIMIT_BYTES: usize = 256 * 1024;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Presigned transfer configuration
    pub presigned_url_expiry_secs: u64,
    // Public endpoint rate limiting (process-local, see the rate limiter docs)
    pub rate_limit_quota: u32,
    pub rate_limit_window_secs: u64,
    // Privileged access: bearer token compared in constant time. Admin routes
    // reject everything when unset.
    pub admin_api_token: Option<String>,
    // Status lifecycle policy
    pub transition_policy: TransitionPolicy,
    // Request handling
    pub request_body_limit_bytes: usize,
    pub trusted_proxy_count: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let transition_policy = match env::var("STATUS_TRANSITION_POLICY") {
            Ok(value) => value.parse::<TransitionPolicy>()?,
            Err(_) => TransitionPolicy::default(),
        };

        let config = Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            storage_backend,
            bucket_name: env::var("BUCKET_NAME").ok(),
            region: env::var("REGION").ok().or_else(|| env::var("AWS_REGION").ok()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            presigned_url_expiry_secs: env_parse(
                "PRESIGNED_URL_EXPIRY",
                PRESIGNED_TTL_DEFAULT_SECS,
            )?,
            rate_limit_quota: env_parse("RATE_LIMIT_QUOTA", RATE_LIMIT_DEFAULT_QUOTA)?,
            rate_limit_window_secs: env_parse(
                "RATE_LIMIT_WINDOW_SECS",
                RATE_LIMIT_DEFAULT_WINDOW_SECS,
            )?,
            admin_api_token: env::var("ADMIN_API_TOKEN").ok().filter(|t| !t.is_empty()),
            transition_policy,
            request_body_limit_bytes: env_parse(
                "REQUEST_BODY_LIMIT_BYTES",
                DEFAULT_REQUEST_BODY_LIMIT_BYTES,
            )?,
            trusted_proxy_count: env_parse("TRUSTED_PROXY_COUNT", 1)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.bucket_name.is_none() {
                    anyhow::bail!("BUCKET_NAME is required for the s3 storage backend");
                }
                if self.region.is_none() {
                    anyhow::bail!("REGION or AWS_REGION is required for the s3 storage backend");
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_PATH is required for the local storage backend");
                }
            }
        }

        if self.presigned_url_expiry_secs < PRESIGNED_TTL_MIN_SECS
            || self.presigned_url_expiry_secs > PRESIGNED_TTL_MAX_SECS
        {
            anyhow::bail!(
                "PRESIGNED_URL_EXPIRY must be between {} and {} seconds",
                PRESIGNED_TTL_MIN_SECS,
                PRESIGNED_TTL_MAX_SECS
            );
        }

        if self.rate_limit_quota == 0 {
            anyhow::bail!("RATE_LIMIT_QUOTA must be at least 1");
        }
        if self.rate_limit_window_secs == 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECS must be at least 1");
        }

        if self.admin_api_token.is_none() {
            tracing::warn!(
                "ADMIN_API_TOKEN is not set; privileged endpoints will reject all requests"
            );
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 3000,
            environment: "development".to_string(),
            cors_origins: Vec::new(),
            storage_backend: StorageBackend::Local,
            bucket_name: None,
            region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/jobtrack".to_string()),
            local_storage_base_url: Some("http://localhost:3000/files".to_string()),
            presigned_url_expiry_secs: 900,
            rate_limit_quota: 5,
            rate_limit_window_secs: 300,
            admin_api_token: Some("secret".to_string()),
            transition_policy: TransitionPolicy::Permissive,
            request_body_limit_bytes: 256 * 1024,
            trusted_proxy_count: 1,
        }
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.bucket_name = Some("jobtracker".to_string());
        config.region = Some("ap-southeast-5".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presign_ttl_bounds() {
        let mut config = base_config();
        config.presigned_url_expiry_secs = 30;
        assert!(config.validate().is_err());
        config.presigned_url_expiry_secs = 7200;
        assert!(config.validate().is_err());
        config.presigned_url_expiry_secs = 600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let mut config = base_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
    }
}
