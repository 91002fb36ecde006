// Core lookup logic exports
pub mod bounded;
pub mod extract;
pub mod recent;
pub mod resolver;

pub use bounded::{run_bounded, AttemptError};
pub use extract::{extract_readings, Readings};
pub use recent::{RecentSearches, DEFAULT_CAPACITY, DEFAULT_DISPLAY_LIMIT};
pub use resolver::{ResolveError, ResolverTimeouts, WeatherResolver};
