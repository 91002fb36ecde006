// Service exports
pub mod agent;
pub mod open_meteo;
pub mod source;

pub use agent::BrowsingAgent;
pub use open_meteo::OpenMeteoClient;
pub use source::{SourceError, WeatherSource};
