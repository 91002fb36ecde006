// Route exports
pub mod weather;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};

use crate::models::Envelope;

pub use weather::AppState;

/// Error returned by extractors, rendered as a failure envelope
#[derive(Debug)]
pub struct EnvelopeError {
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code, self.message)
    }
}

impl std::error::Error for EnvelopeError {}

impl error::ResponseError for EnvelopeError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(Envelope::failure(self.message.clone()))
    }
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    EnvelopeError {
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(Envelope::failure("Endpoint not found"))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .configure(weather::configure)
        .default_service(web::route().to(not_found));
}
