pub mod api;
pub mod config;
pub mod error;
pub mod explore;
pub mod format;
pub mod models;

pub use api::DatapiClient;
pub use error::{ApiError, Result};
