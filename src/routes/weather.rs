use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;

use crate::core::{RecentSearches, ResolveError, WeatherResolver};
use crate::models::{Envelope, HealthResponse, RecentQuery, WeatherQuery};

pub const MISSING_FIELDS_MESSAGE: &str = "Both town and country are required";

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<WeatherResolver>,
    pub recent: Arc<RecentSearches>,
    pub display_limit: usize,
}

impl AppState {
    pub fn new(resolver: WeatherResolver, recent: RecentSearches, display_limit: usize) -> Self {
        Self {
            resolver: Arc::new(resolver),
            recent: Arc::new(recent),
            display_limit,
        }
    }
}

/// Configure the page, lookup, listing and health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .route("/weather", web::post().to(get_weather))
        .route("/recent", web::get().to(get_recent));
}

/// Bundled single-page UI
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        agent_enabled: state.resolver.agent_enabled(),
        recent_count: state.recent.len(),
        timestamp: chrono::Utc::now(),
    })
}

/// Weather lookup endpoint
///
/// POST /weather
///
/// Request body:
/// ```json
/// {
///   "town": "Athens",
///   "country": "Greece"
/// }
/// ```
///
/// The body is read raw so that malformed JSON is reported the same way
/// as missing fields.
async fn get_weather(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let location = match WeatherQuery::from_body(&body).into_location() {
        Ok(location) => location,
        Err(errors) => {
            tracing::info!("Validation failed for weather request: {}", errors);
            return HttpResponse::BadRequest().json(Envelope::failure(MISSING_FIELDS_MESSAGE));
        }
    };

    let span = tracing::info_span!(
        "weather_search",
        search_id = %uuid::Uuid::new_v4(),
        town = %location.town,
        country = %location.country,
    );

    async move {
        tracing::info!("Looking up weather for {}", location);

        match state.resolver.resolve(&location).await {
            Ok(record) => {
                state.recent.append(record.clone());
                tracing::info!(
                    "Returning {} weather for {} ({} recent searches)",
                    record.source,
                    location,
                    state.recent.len()
                );
                HttpResponse::Ok().json(Envelope::ok(record))
            }
            Err(e @ ResolveError::Unavailable) => {
                tracing::warn!("No weather source answered for {}", location);
                HttpResponse::NotFound().json(Envelope::failure(e.to_string()))
            }
            Err(e @ ResolveError::Internal(_)) => {
                tracing::error!("Weather lookup for {} failed internally: {:?}", location, e);
                HttpResponse::InternalServerError().json(Envelope::failure(e.to_string()))
            }
        }
    }
    .instrument(span)
    .await
}

/// Recent searches endpoint
///
/// GET /recent?limit={n}
///
/// Most recent first. `limit` defaults to the configured display limit and
/// is clamped to the store's capacity.
async fn get_recent(state: web::Data<AppState>, query: web::Query<RecentQuery>) -> impl Responder {
    let limit = query
        .limit
        .unwrap_or(state.display_limit)
        .min(state.recent.capacity());

    HttpResponse::Ok().json(Envelope::ok(state.recent.list(limit)))
}
