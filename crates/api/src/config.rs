use std::path::PathBuf;

use magima_core::preset::Preset;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Generation itself runs
    /// in the background and is not bounded by this.
    pub request_timeout_secs: u64,
    /// Directory receiving `{job_id}.mp4` artifacts (default: `outputs`).
    pub output_dir: PathBuf,
    /// Preset used when a request names none or an unknown one
    /// (default: `api-standard`).
    pub default_preset: Preset,
    /// Load the model before accepting requests (default: `true`).
    pub preload_model: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `OUTPUT_DIR`           | `outputs`                  |
    /// | `DEFAULT_PRESET`       | `api-standard`             |
    /// | `PRELOAD_MODEL`        | `true`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let output_dir = std::env::var("OUTPUT_DIR")
            .unwrap_or_else(|_| "outputs".into())
            .into();

        let default_preset = std::env::var("DEFAULT_PRESET")
            .map(|name| {
                Preset::from_name(&name).unwrap_or_else(|| {
                    panic!("DEFAULT_PRESET must be one of {:?}", magima_core::preset::PRESET_NAMES)
                })
            })
            .unwrap_or(Preset::ApiStandard);

        let preload_model = std::env::var("PRELOAD_MODEL")
            .map(|v| parse_bool(&v).expect("PRELOAD_MODEL must be a boolean"))
            .unwrap_or(true);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            output_dir,
            default_preset,
            preload_model,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
