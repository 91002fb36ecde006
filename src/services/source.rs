use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Location, SourceKind, WeatherRecord};

/// Errors a weather source can report for a single lookup
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Incomplete weather data, missing: {0}")]
    Incomplete(String),
}

/// Anything that can turn a location into a current weather record
#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self, location: &Location) -> Result<WeatherRecord, SourceError>;
}

/// Format a numeric reading the way the agent reports values, dropping a trailing `.0`
pub(crate) fn format_reading(value: f64, unit: &str) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    // -0.04 rounds to -0.0, which would print as "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}{}", rounded, unit)
}
