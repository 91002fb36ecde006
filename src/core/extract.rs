//! Extraction of weather readings from free-form agent output.
//!
//! The agent is asked for strict JSON but does not always comply, so
//! extraction runs in three stages:
//! 1. JSON object (optionally wrapped in a markdown fence)
//! 2. Labelled regex matches (`22°C`, `wind: 10 km/h`, `humidity: 55%`)
//! 3. The first three numbers in the text, read as temperature, wind, humidity

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(-?\d+(?:\.\d+)?)\s*°?\s*([CF])\b").expect("temperature regex")
});

static WIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)wind[^\d]{0,20}?(\d+(?:\.\d+)?)\s*(mph|km/h|kmh|kph|m/s)").expect("wind regex")
});

static HUMIDITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)humidity[^\d]{0,20}?(\d+(?:\.\d+)?)\s*%").expect("humidity regex")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number regex"));

/// Readings pulled out of agent output; any of them may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Readings {
    pub temperature: Option<String>,
    pub wind: Option<String>,
    pub humidity: Option<String>,
}

impl Readings {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.wind.is_none() && self.humidity.is_none()
    }
}

/// Extract readings from raw agent output
pub fn extract_readings(raw: &str) -> Readings {
    let raw = raw.trim();
    if raw.is_empty() {
        return Readings::default();
    }

    if let Some(readings) = from_json(raw) {
        return readings;
    }

    let readings = from_labels(raw);
    if !readings.is_empty() {
        return readings;
    }

    from_bare_numbers(raw)
}

fn from_json(raw: &str) -> Option<Readings> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }

    let value: Value = serde_json::from_str(&raw[start..=end]).ok()?;
    let object = value.as_object()?;

    Some(Readings {
        temperature: object.get("temperature").and_then(|v| json_reading(v, "°C")),
        wind: object.get("wind").and_then(|v| json_reading(v, " km/h")),
        humidity: object.get("humidity").and_then(|v| json_reading(v, "%")),
    })
}

fn json_reading(value: &Value, default_unit: &str) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => n.as_f64().map(|n| format!("{}{}", n, default_unit)),
        _ => None,
    }
}

fn from_labels(raw: &str) -> Readings {
    let temperature = TEMPERATURE
        .captures(raw)
        .map(|c| format!("{}°{}", &c[1], c[2].to_uppercase()));

    let wind = WIND
        .captures(raw)
        .map(|c| format!("{} {}", &c[1], normalize_speed_unit(&c[2])));

    let humidity = HUMIDITY.captures(raw).map(|c| format!("{}%", &c[1]));

    Readings {
        temperature,
        wind,
        humidity,
    }
}

fn normalize_speed_unit(unit: &str) -> &'static str {
    match unit.to_lowercase().as_str() {
        "mph" => "mph",
        "m/s" => "m/s",
        _ => "km/h",
    }
}

fn from_bare_numbers(raw: &str) -> Readings {
    let numbers: Vec<&str> = NUMBER.find_iter(raw).map(|m| m.as_str()).take(3).collect();

    match numbers.as_slice() {
        [temperature, wind, humidity] => Readings {
            temperature: Some(format!("{}°C", temperature)),
            wind: Some(format!("{} km/h", wind)),
            humidity: Some(format!("{}%", humidity)),
        },
        _ => Readings::default(),
    }
}
