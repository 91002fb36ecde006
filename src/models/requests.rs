use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::Location;

/// Body of a weather lookup
///
/// Both fields are optional on the wire so that a missing field is
/// reported as a validation failure rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl WeatherQuery {
    /// Lenient body parsing: anything that isn't a JSON object with string
    /// fields is treated as an empty query.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => Self {
                town: string_field(&value, "town"),
                country: string_field(&value, "country"),
            },
            Err(e) => {
                tracing::debug!("Unparseable weather request body: {}", e);
                Self::default()
            }
        }
    }

    /// Trim and validate into a [`Location`]
    pub fn into_location(self) -> Result<Location, validator::ValidationErrors> {
        let input = LocationInput {
            town: self.town.unwrap_or_default().trim().to_string(),
            country: self.country.unwrap_or_default().trim().to_string(),
        };
        input.validate()?;

        Location::new(&input.town, &input.country).ok_or_else(validator::ValidationErrors::new)
    }
}

fn string_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

#[derive(Debug, Validate)]
struct LocationInput {
    #[validate(length(min = 1, max = 100))]
    town: String,
    #[validate(length(min = 1, max = 100))]
    country: String,
}

/// Query string of the recent searches listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}
