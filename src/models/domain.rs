use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder some sources emit for a value they could not extract
pub const MISSING_VALUE: &str = "N/A";

/// Which path produced a weather record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Agent,
    OpenMeteo,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Agent => "agent",
            SourceKind::OpenMeteo => "open-meteo",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated town/country pair, both trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub town: String,
    pub country: String,
}

impl Location {
    /// Trim both parts; `None` when either is empty afterwards
    pub fn new(town: &str, country: &str) -> Option<Self> {
        let town = town.trim();
        let country = country.trim();

        if town.is_empty() || country.is_empty() {
            return None;
        }

        Some(Self {
            town: town.to_string(),
            country: country.to_string(),
        })
    }

    /// Free-text query used by geocoders, e.g. "Athens, Greece"
    pub fn query(&self) -> String {
        format!("{}, {}", self.town, self.country)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.town, self.country)
    }
}

/// Normalized current-weather observation for one location
///
/// Every source produces this shape. Values keep their units as text
/// (`22°C`, `10 km/h`, `60%`) because the agent reports them that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub town: String,
    pub country: String,
    pub temperature: String,
    pub wind: String,
    pub humidity: String,
    pub timestamp: DateTime<Utc>,
    pub source: SourceKind,
}

impl WeatherRecord {
    /// Build a record stamped with the current time
    pub fn new(
        location: &Location,
        temperature: impl Into<String>,
        wind: impl Into<String>,
        humidity: impl Into<String>,
        source: SourceKind,
    ) -> Self {
        Self {
            town: location.town.clone(),
            country: location.country.clone(),
            temperature: temperature.into(),
            wind: wind.into(),
            humidity: humidity.into(),
            timestamp: Utc::now(),
            source,
        }
    }

    /// Names of the measurement fields that are empty or placeholders
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("temperature", &self.temperature),
            ("wind", &self.wind),
            ("humidity", &self.humidity),
        ]
        .into_iter()
        .filter(|(_, value)| is_missing(value))
        .map(|(name, _)| name)
        .collect()
    }

    /// A record only counts as a successful lookup when all three values are present
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(MISSING_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athens() -> Location {
        Location::new("Athens", "Greece").unwrap()
    }

    #[test]
    fn test_location_trims_input() {
        let location = Location::new("  Athens ", "\tGreece\n").unwrap();
        assert_eq!(location.town, "Athens");
        assert_eq!(location.country, "Greece");
        assert_eq!(location.query(), "Athens, Greece");
    }

    #[test]
    fn test_location_rejects_blank_parts() {
        assert!(Location::new("", "Greece").is_none());
        assert!(Location::new("Athens", "   ").is_none());
    }

    #[test]
    fn test_complete_record() {
        let record = WeatherRecord::new(&athens(), "22°C", "10 km/h", "60%", SourceKind::Agent);
        assert!(record.is_complete());
        assert_eq!(record.town, "Athens");
    }

    #[test]
    fn test_partial_record_is_incomplete() {
        let record = WeatherRecord::new(&athens(), "22°C", "10 km/h", "N/A", SourceKind::Agent);
        assert!(!record.is_complete());
        assert_eq!(record.missing_fields(), vec!["humidity"]);

        let record = WeatherRecord::new(&athens(), " ", "", "55%", SourceKind::Agent);
        assert_eq!(record.missing_fields(), vec!["temperature", "wind"]);
    }

    #[test]
    fn test_source_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&SourceKind::OpenMeteo).unwrap();
        assert_eq!(json, "\"open-meteo\"");
        assert_eq!(SourceKind::Agent.to_string(), "agent");
    }
}
