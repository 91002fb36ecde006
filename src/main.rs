use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use weather_scout::config::{LoggingSettings, Settings};
use weather_scout::core::{RecentSearches, WeatherResolver};
use weather_scout::routes::{self, AppState};
use weather_scout::services::{BrowsingAgent, OpenMeteoClient, WeatherSource};

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn to_io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so the log settings apply
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        to_io_error(e)
    })?;

    init_logging(&settings.logging);

    info!("Starting Weather Scout...");

    let timeouts = settings.resolver_timeouts();

    // Fallback source is always available
    let fallback: Arc<dyn WeatherSource> = Arc::new(
        OpenMeteoClient::new(
            settings.fallback.geocoding_url.clone(),
            settings.fallback.forecast_url.clone(),
            timeouts.fallback,
        )
        .map_err(|e| {
            error!("Failed to create Open-Meteo client: {}", e);
            to_io_error(e)
        })?,
    );

    // Agent is optional - lookups go straight to the fallback without it
    let agent: Option<Arc<dyn WeatherSource>> = match settings.agent.api_key_if_active() {
        Some(api_key) => {
            let agent = BrowsingAgent::new(
                settings.agent.base_url.clone(),
                api_key.to_string(),
                settings.agent.model.clone(),
                timeouts.agent + Duration::from_secs(5),
            )
            .map_err(|e| {
                error!("Failed to create browsing agent: {}", e);
                to_io_error(e)
            })?;
            info!("Browsing agent enabled (model: {})", agent.model());
            Some(Arc::new(agent) as Arc<dyn WeatherSource>)
        }
        None if settings.agent.enabled => {
            warn!("Agent enabled but no API key configured, using Open-Meteo only");
            None
        }
        None => {
            info!("Browsing agent disabled, using Open-Meteo only");
            None
        }
    };

    let resolver = WeatherResolver::new(agent, fallback, timeouts);

    info!(
        "Resolver initialized (agent: {}, agent timeout: {:?}, fallback timeout: {:?})",
        if resolver.agent_enabled() { "on" } else { "off" },
        resolver.timeouts().agent,
        resolver.timeouts().fallback
    );

    // Build application state
    let app_state = AppState::new(
        resolver,
        RecentSearches::new(settings.recent.capacity),
        settings.recent.display_limit,
    );

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
