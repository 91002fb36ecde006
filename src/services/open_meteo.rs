use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{Location, SourceKind, WeatherRecord};
use crate::services::source::{format_reading, SourceError, WeatherSource};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const GEOCODING_CANDIDATES: &str = "10";
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";

/// Keyless fallback source: Open-Meteo geocoding followed by a current-conditions forecast call
pub struct OpenMeteoClient {
    geocoding_url: String,
    forecast_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Clone, Deserialize)]
struct Place {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

impl Place {
    fn in_country(&self, country: &str) -> bool {
        let country = country.trim();
        self.country
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(country))
            || self
                .country_code
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(country))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
}

impl OpenMeteoClient {
    /// Create a new client against the given endpoints
    pub fn new(
        geocoding_url: String,
        forecast_url: String,
        request_timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            geocoding_url,
            forecast_url,
            client,
        })
    }

    /// Resolve a town/country pair to coordinates
    ///
    /// Searches by town name and takes the best-ranked result in the
    /// requested country. A town that only exists elsewhere is not found.
    async fn geocode(&self, location: &Location) -> Result<Place, SourceError> {
        let response = self
            .client
            .get(&self.geocoding_url)
            .query(&[
                ("name", location.town.as_str()),
                ("count", GEOCODING_CANDIDATES),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::ApiError(format!(
                "Geocoding failed: {}",
                response.status()
            )));
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to parse geocoding: {}", e)))?;

        let place = body
            .results
            .iter()
            .find(|p| p.in_country(&location.country))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(location.query()))?;

        tracing::debug!(
            "Geocoded {} to {} ({}, {})",
            location,
            place.name,
            place.latitude,
            place.longitude
        );

        Ok(place)
    }

    async fn current_conditions(&self, place: &Place) -> Result<CurrentConditions, SourceError> {
        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("wind_speed_unit", "kmh"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::ApiError(format!(
                "Forecast failed: {}",
                response.status()
            )));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to parse forecast: {}", e)))?;

        body.current
            .ok_or_else(|| SourceError::InvalidResponse("Missing current conditions".into()))
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenMeteo
    }

    async fn fetch(&self, location: &Location) -> Result<WeatherRecord, SourceError> {
        let place = self.geocode(location).await?;
        let current = self.current_conditions(&place).await?;

        Ok(WeatherRecord::new(
            location,
            format_reading(current.temperature_2m, "°C"),
            format_reading(current.wind_speed_10m, " km/h"),
            format_reading(current.relative_humidity_2m, "%"),
            SourceKind::OpenMeteo,
        ))
    }
}
