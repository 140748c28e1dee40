//! # pdfeditor-api
//!
//! REST API server for the pdfeditor library
//!

mod api;
mod config;
mod error;
mod form;

pub use api::{app, ApiResponse, FileResponse};
pub use config::{Config, ConfigError};
pub use error::AppError;
pub use form::FormData;
