use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::bounded::{run_bounded, AttemptError};
use crate::models::{Location, WeatherRecord};
use crate::services::{SourceError, WeatherSource};

pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Failure of a whole lookup, after every path was tried
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Could not fetch weather data for the specified location")]
    Unavailable,

    #[error("Internal server error")]
    Internal(String),
}

/// Per-path wait limits
#[derive(Debug, Clone, Copy)]
pub struct ResolverTimeouts {
    pub agent: Duration,
    pub fallback: Duration,
}

impl Default for ResolverTimeouts {
    fn default() -> Self {
        Self {
            agent: DEFAULT_AGENT_TIMEOUT,
            fallback: DEFAULT_FALLBACK_TIMEOUT,
        }
    }
}

/// Agent-first weather lookup with a deterministic fallback
///
/// # Policy
/// 1. Ask the agent (if configured), bounded by `timeouts.agent`
/// 2. On timeout, error or an incomplete record, ask the fallback source,
///    bounded by `timeouts.fallback`
/// 3. Fail with [`ResolveError::Unavailable`] if neither produced a record
///
/// The two paths run strictly one after the other, one try each.
#[derive(Clone)]
pub struct WeatherResolver {
    agent: Option<Arc<dyn WeatherSource>>,
    fallback: Arc<dyn WeatherSource>,
    timeouts: ResolverTimeouts,
}

impl WeatherResolver {
    pub fn new(
        agent: Option<Arc<dyn WeatherSource>>,
        fallback: Arc<dyn WeatherSource>,
        timeouts: ResolverTimeouts,
    ) -> Self {
        Self {
            agent,
            fallback,
            timeouts,
        }
    }

    pub fn agent_enabled(&self) -> bool {
        self.agent.is_some()
    }

    pub fn timeouts(&self) -> ResolverTimeouts {
        self.timeouts
    }

    /// Produce one complete weather record for `location`
    pub async fn resolve(&self, location: &Location) -> Result<WeatherRecord, ResolveError> {
        if let Some(agent) = &self.agent {
            match attempt(agent, location, self.timeouts.agent).await {
                Ok(record) => {
                    tracing::info!("Agent returned weather for {}", location);
                    return Ok(record);
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!("Agent timed out for {} ({}), falling back", location, e);
                }
                Err(e) => {
                    tracing::warn!("Agent failed for {}: {}, falling back", location, e);
                }
            }
        } else {
            tracing::debug!("Agent disabled, using fallback for {}", location);
        }

        match attempt(&self.fallback, location, self.timeouts.fallback).await {
            Ok(record) => {
                tracing::info!("Fallback {} returned weather for {}", record.source, location);
                Ok(record)
            }
            Err(AttemptError::Aborted(reason)) => {
                tracing::error!("Fallback worker aborted for {}: {}", location, reason);
                Err(ResolveError::Internal(reason))
            }
            Err(e) => {
                tracing::error!("Fallback failed for {}: {}", location, e);
                Err(ResolveError::Unavailable)
            }
        }
    }
}

/// One bounded try against a single source; incomplete records count as failures
async fn attempt(
    source: &Arc<dyn WeatherSource>,
    location: &Location,
    limit: Duration,
) -> Result<WeatherRecord, AttemptError> {
    let source = Arc::clone(source);
    let owned = location.clone();

    tracing::debug!("Trying {} for {} (limit {:?})", source.kind(), location, limit);

    let record = run_bounded(limit, async move { source.fetch(&owned).await }).await?;

    let missing = record.missing_fields();
    if !missing.is_empty() {
        return Err(SourceError::Incomplete(missing.join(", ")).into());
    }

    Ok(record)
}
