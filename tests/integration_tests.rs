// Integration tests for Weather Scout

use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use weather_scout::core::{RecentSearches, ResolverTimeouts, WeatherResolver};
use weather_scout::models::{Location, SourceKind, WeatherRecord};
use weather_scout::routes::{self, AppState};
use weather_scout::services::{SourceError, WeatherSource};

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed(&'static str, &'static str, &'static str),
    Fail,
    Hang,
}

struct MockSource {
    kind: SourceKind,
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl MockSource {
    fn new(kind: SourceKind, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for MockSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, location: &Location) -> Result<WeatherRecord, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed(t, w, h) => Ok(WeatherRecord::new(location, t, w, h, self.kind)),
            Behaviour::Fail => Err(SourceError::ApiError("upstream unavailable".into())),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(SourceError::ApiError("too late".into()))
            }
        }
    }
}

struct Harness {
    state: AppState,
    agent: Arc<MockSource>,
    fallback: Arc<MockSource>,
}

fn harness(agent: Behaviour, fallback: Behaviour) -> Harness {
    let agent = MockSource::new(SourceKind::Agent, agent);
    let fallback = MockSource::new(SourceKind::OpenMeteo, fallback);

    let resolver = WeatherResolver::new(
        Some(agent.clone() as Arc<dyn WeatherSource>),
        fallback.clone(),
        ResolverTimeouts {
            agent: Duration::from_millis(100),
            fallback: Duration::from_millis(100),
        },
    );

    Harness {
        state: AppState::new(resolver, RecentSearches::new(10), 5),
        agent,
        fallback,
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(routes::configure_routes),
        )
        .await
    };
}

macro_rules! post_weather {
    ($app:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/weather")
            .set_json($body)
            .to_request();
        let resp = test::call_service($app, req).await;
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

#[actix_web::test]
async fn test_agent_success_returns_trimmed_location() {
    let h = harness(Behaviour::Succeed("22°C", "10 km/h", "60%"), Behaviour::Fail);
    let app = app!(h.state);

    let (status, body) = post_weather!(&app, json!({"town": "  Athens ", "country": "Greece  "}));

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["town"], "Athens");
    assert_eq!(body["data"]["country"], "Greece");
    assert_eq!(body["data"]["source"], "agent");
    assert!(body.get("error").is_none());
    assert_eq!(h.agent.calls(), 1);
    assert_eq!(h.fallback.calls(), 0);
}

#[actix_web::test]
async fn test_agent_timeout_uses_fallback_and_records_search() {
    let h = harness(Behaviour::Hang, Behaviour::Succeed("22°C", "10 km/h", "60%"));
    let app = app!(h.state);

    let (status, body) = post_weather!(&app, json!({"town": "Athens", "country": "Greece"}));

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["town"], "Athens");
    assert_eq!(body["data"]["country"], "Greece");
    assert_eq!(body["data"]["temperature"], "22°C");
    assert_eq!(body["data"]["wind"], "10 km/h");
    assert_eq!(body["data"]["humidity"], "60%");
    assert!(body["data"]["timestamp"].is_string());
    assert_eq!(h.agent.calls(), 1);
    assert_eq!(h.fallback.calls(), 1);

    let req = test::TestRequest::get().uri("/recent").to_request();
    let recent: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(recent["success"], true);
    assert_eq!(recent["data"][0]["town"], "Athens");
    assert_eq!(recent["data"][0]["temperature"], "22°C");
}

#[actix_web::test]
async fn test_agent_error_invokes_fallback_exactly_once() {
    let h = harness(Behaviour::Fail, Behaviour::Succeed("3°C", "25 km/h", "90%"));
    let app = app!(h.state);

    let (status, body) = post_weather!(&app, json!({"town": "Oslo", "country": "Norway"}));

    assert_eq!(status, 200);
    assert_eq!(body["data"]["source"], "open-meteo");
    assert_eq!(h.agent.calls(), 1);
    assert_eq!(h.fallback.calls(), 1);
}

#[actix_web::test]
async fn test_both_paths_failing_returns_error_and_records_nothing() {
    let h = harness(Behaviour::Fail, Behaviour::Fail);
    let app = app!(h.state);

    let (status, body) = post_weather!(&app, json!({"town": "Atlantis", "country": "Nowhere"}));

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap_or_default().is_empty());
    assert!(body.get("data").is_none());
    assert_eq!(h.fallback.calls(), 1);
    assert!(h.state.recent.is_empty());
}

#[actix_web::test]
async fn test_blank_fields_make_no_external_calls() {
    let h = harness(Behaviour::Succeed("1°C", "1 km/h", "1%"), Behaviour::Fail);
    let app = app!(h.state);

    for body in [
        json!({"town": "   ", "country": "Greece"}),
        json!({"town": "Athens", "country": ""}),
        json!({"town": "Athens"}),
        json!({}),
    ] {
        let (status, body) = post_weather!(&app, body);
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Both town and country are required");
    }

    assert_eq!(h.agent.calls(), 0);
    assert_eq!(h.fallback.calls(), 0);
}

#[actix_web::test]
async fn test_malformed_body_is_treated_as_missing_fields() {
    let h = harness(Behaviour::Succeed("1°C", "1 km/h", "1%"), Behaviour::Fail);
    let app = app!(h.state);

    let req = test::TestRequest::post()
        .uri("/weather")
        .insert_header(("content-type", "text/plain"))
        .set_payload("town=Athens&country=Greece")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(h.agent.calls(), 0);
}

#[actix_web::test]
async fn test_recent_is_newest_first_and_capped() {
    let h = harness(Behaviour::Succeed("20°C", "5 km/h", "50%"), Behaviour::Fail);
    let app = app!(h.state);

    for i in 0..12 {
        let (status, _) = post_weather!(&app, json!({"town": format!("Town{}", i), "country": "Greece"}));
        assert_eq!(status, 200);
    }

    assert_eq!(h.state.recent.len(), 10);

    let req = test::TestRequest::get().uri("/recent").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let towns: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["town"].as_str().unwrap())
        .collect();
    assert_eq!(towns, vec!["Town11", "Town10", "Town9", "Town8", "Town7"]);

    let req = test::TestRequest::get().uri("/recent?limit=50").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"][9]["town"], "Town2");
}

#[actix_web::test]
async fn test_invalid_recent_limit_is_an_envelope() {
    let h = harness(Behaviour::Fail, Behaviour::Fail);
    let app = app!(h.state);

    let req = test::TestRequest::get().uri("/recent?limit=lots").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));
}

#[actix_web::test]
async fn test_empty_recent_listing() {
    let h = harness(Behaviour::Fail, Behaviour::Fail);
    let app = app!(h.state);

    let req = test::TestRequest::get().uri("/recent").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"success": true, "data": []}));
}

#[actix_web::test]
async fn test_health_and_unknown_routes() {
    let h = harness(Behaviour::Fail, Behaviour::Fail);
    let app = app!(h.state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["agent_enabled"], true);
    assert_eq!(body["recent_count"], 0);

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Endpoint not found");
}

#[actix_web::test]
async fn test_index_page_is_served() {
    let h = harness(Behaviour::Fail, Behaviour::Fail);
    let app = app!(h.state);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Weather Scout"));
}
