// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Location, SourceKind, WeatherRecord, MISSING_VALUE};
pub use requests::{RecentQuery, WeatherQuery};
pub use responses::{Envelope, HealthResponse};
