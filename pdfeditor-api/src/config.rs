//! Server configuration from the environment

use axum::http::HeaderValue;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_MB: usize = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid CORS origin: '{0}'")]
    InvalidCorsOrigin(String),
}

/// Runtime settings of the API server
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Allowed origins; empty means any origin
    pub cors_origins: Vec<HeaderValue>,
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from("./uploads"),
            output_dir: PathBuf::from("./output"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            cors_origins: Vec::new(),
            pdfium_lib_path: None,
        }
    }
}

impl Config {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults for
    /// unset or blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Config::default();

        let port = match get("SERVER_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "SERVER_PORT",
                value,
            })?,
            None => defaults.port,
        };

        let max_upload_bytes = match get("PDFEDITOR_MAX_UPLOAD_MB") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(mb) if mb > 0 => mb * 1024 * 1024,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "PDFEDITOR_MAX_UPLOAD_MB",
                        value,
                    })
                }
            },
            None => defaults.max_upload_bytes,
        };

        let cors_origins = match get("PDFEDITOR_CORS_ORIGINS") {
            Some(value) => parse_origins(&value)?,
            None => defaults.cors_origins,
        };

        Ok(Self {
            host: get("SERVER_HOST").unwrap_or(defaults.host),
            port,
            upload_dir: get("PDFEDITOR_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            output_dir: get("PDFEDITOR_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            max_upload_bytes,
            cors_origins,
            pdfium_lib_path: get("PDFIUM_LIB_PATH").map(PathBuf::from),
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let address = format!("{}:{}", self.host, self.port);
        address.parse().map_err(|_| ConfigError::InvalidValue {
            name: "SERVER_HOST",
            value: self.host.clone(),
        })
    }

    pub fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.is_empty() {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(self.cors_origins.clone()))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

// "*" anywhere in the list allows every origin
fn parse_origins(value: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    let origins: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .collect();
    if origins.contains(&"*") {
        return Ok(Vec::new());
    }
    origins
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ConfigError::InvalidCorsOrigin(origin.to_string()))
        })
        .collect()
}
