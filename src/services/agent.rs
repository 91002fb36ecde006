use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use crate::core::extract::extract_readings;
use crate::models::{Location, SourceKind, WeatherRecord, MISSING_VALUE};
use crate::services::source::{SourceError, WeatherSource};

const MAX_INPUT_CHARS: usize = 50;
const MIN_INPUT_CHARS: usize = 2;

const SYSTEM_PROMPT: &str = "You are a web browsing agent. You visit weather websites, \
read the current conditions for the requested place and report them as strict JSON.";

/// Browsing agent backed by an OpenAI-compatible chat completions endpoint
///
/// The agent is given a browsing task for one location and asked to reply
/// with a single JSON object. Its reply is run through
/// [`extract_readings`], so prose answers still yield values when possible.
pub struct BrowsingAgent {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl BrowsingAgent {
    /// Create a new agent client
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        request_timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            model,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the browsing task and return the agent's raw answer
    async fn run_task(&self, task: &str) -> Result<String, SourceError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": task },
            ],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(SourceError::Unauthorized),
            status => {
                return Err(SourceError::ApiError(format!(
                    "Agent request failed: {}",
                    status
                )))
            }
        }

        let json: Value = response.json().await?;

        let content = json
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| SourceError::InvalidResponse("Missing message content".into()))?;

        Ok(content.to_string())
    }
}

#[async_trait]
impl WeatherSource for BrowsingAgent {
    fn kind(&self) -> SourceKind {
        SourceKind::Agent
    }

    async fn fetch(&self, location: &Location) -> Result<WeatherRecord, SourceError> {
        let town = sanitize_input(&location.town);
        let country = sanitize_input(&location.country);

        if town.chars().count() < MIN_INPUT_CHARS {
            return Err(SourceError::InvalidInput(
                "Town name must be at least 2 characters".into(),
            ));
        }
        if country.chars().count() < MIN_INPUT_CHARS {
            return Err(SourceError::InvalidInput(
                "Country name must be at least 2 characters".into(),
            ));
        }

        tracing::info!("Agent fetching weather for {}, {}", town, country);

        let answer = self.run_task(&build_task(&town, &country)).await?;

        if answer.trim().is_empty() {
            return Err(SourceError::InvalidResponse("Agent returned no result".into()));
        }

        tracing::debug!(
            "Raw agent result (truncated): {}",
            answer.chars().take(2000).collect::<String>()
        );

        let readings = extract_readings(&answer);
        if readings.is_empty() {
            return Err(SourceError::InvalidResponse(
                "No weather values found in agent result".into(),
            ));
        }

        let missing = || MISSING_VALUE.to_string();
        Ok(WeatherRecord::new(
            location,
            readings.temperature.unwrap_or_else(missing),
            readings.wind.unwrap_or_else(missing),
            readings.humidity.unwrap_or_else(missing),
            SourceKind::Agent,
        ))
    }
}

/// Keep letters, spaces, hyphens and apostrophes; cap the length
pub fn sanitize_input(text: &str) -> String {
    let kept: String = text
        .trim()
        .chars()
        .filter(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '\''))
        .take(MAX_INPUT_CHARS)
        .collect();

    kept.trim().to_string()
}

fn build_task(town: &str, country: &str) -> String {
    format!(
        "Go to weather.com or openweathermap.org and search for the current weather in {town}, {country}.\n\
         Extract exactly these fields and return only this JSON, no extra text:\n\
         {{\n\
         \x20 \"location\": \"<resolved location name>\",\n\
         \x20 \"temperature\": \"<number + unit, e.g. 22°C or 71°F>\",\n\
         \x20 \"wind\": \"<speed + unit (+ optional direction), e.g. 10 km/h N>\",\n\
         \x20 \"humidity\": \"<percent, e.g. 55%>\"\n\
         }}\n\
         Do not include explanations or markdown, only valid JSON."
    )
}
