use crate::services::upload_service::UploadError;
use std::env;
use std::path::PathBuf;

/// Hard upload limit: 10 MiB, checked against the size reported by the staging step.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Deployment environment name (default: "development")
    pub environment: String,

    /// HTTP port (default: 8080)
    pub port: u16,

    /// PostgreSQL connection string
    pub database_url: Option<String>,

    /// Directory where incoming multipart files are staged before upload
    pub upload_dir: PathBuf,

    /// Maximum accepted upload size in bytes (fixed at 10 MiB)
    pub max_file_size: u64,

    /// Cloudflare R2 settings
    pub r2: R2Config,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 8080,
            database_url: None,
            upload_dir: env::temp_dir().join("uploads"),
            max_file_size: MAX_FILE_SIZE,
            r2: R2Config::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            environment: non_empty_var("ENVIRONMENT").unwrap_or(default.environment),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            database_url: non_empty_var("DATABASE_URL"),

            upload_dir: non_empty_var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_file_size: default.max_file_size,

            r2: R2Config::from_env(),
        }
    }
}

/// Object store settings. Every field is optional so that a partially configured
/// deployment still starts and reports what is missing on first use.
#[derive(Debug, Clone)]
pub struct R2Config {
    pub account_id: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket_name: Option<String>,
    pub endpoint: Option<String>,
    /// Prefix for the links handed back to clients. Never checked against `endpoint`.
    pub public_url: Option<String>,
    pub region: String,
}

impl Default for R2Config {
    fn default() -> Self {
        Self {
            account_id: None,
            access_key_id: None,
            secret_access_key: None,
            bucket_name: None,
            endpoint: None,
            public_url: None,
            region: "auto".to_string(),
        }
    }
}

impl R2Config {
    pub fn from_env() -> Self {
        Self {
            account_id: non_empty_var("R2_ACCOUNT_ID"),
            access_key_id: non_empty_var("R2_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("R2_SECRET_ACCESS_KEY"),
            bucket_name: non_empty_var("R2_BUCKET_NAME"),
            endpoint: non_empty_var("R2_ENDPOINT"),
            public_url: non_empty_var("R2_PUBLIC_URL"),
            region: non_empty_var("R2_REGION").unwrap_or_else(|| "auto".to_string()),
        }
    }

    /// Names of every required setting that is absent, in declaration order.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        [
            ("R2_ACCOUNT_ID", &self.account_id),
            ("R2_ACCESS_KEY_ID", &self.access_key_id),
            ("R2_SECRET_ACCESS_KEY", &self.secret_access_key),
            ("R2_BUCKET_NAME", &self.bucket_name),
            ("R2_ENDPOINT", &self.endpoint),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        let missing = self.missing_settings();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(UploadError::Configuration { missing })
        }
    }

    /// `{R2_PUBLIC_URL}/{key}`
    pub fn public_url_for(&self, key: &str) -> String {
        let base = self.public_url.as_deref().unwrap_or_default();
        format!("{}/{}", base.trim_end_matches('/'), key)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
