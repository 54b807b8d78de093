use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use validator::Validate;

use crate::core::{CacheAside, ResolutionStats};
use crate::models::{CheckBlacklistRequest, CheckBlacklistResponse, ErrorResponse, HealthResponse};
use crate::services::{BlacklistStore, CacheManager};

/// Coordinator wired to the production backends
pub type Coordinator = CacheAside<Arc<CacheManager>, Arc<BlacklistStore>, Arc<BlacklistStore>>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub store: Arc<BlacklistStore>,
    pub cache: Arc<CacheManager>,
    pub stats: Arc<ResolutionStats>,
    pub request_timeout: Duration,
}

/// Configure blacklist routes under /api/v1
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/blacklist", web::post().to(check_blacklist));
}

/// Health check endpoint
///
/// GET /healthz
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = state.store.health_check().await.unwrap_or(false);
    let cache = state.cache.health_check().await;

    let status = match (database, cache) {
        (true, true) => "healthy",
        (true, false) => "degraded",
        _ => "unhealthy",
    };

    let response = HealthResponse {
        status: status.to_string(),
        database,
        cache,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    };

    if database {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Blacklist check endpoint
///
/// POST /api/v1/blacklist
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "nik": "16 digits, optional",
///   "birth_place": "string, optional",
///   "birth_date": "YYYY-MM-DD, optional"
/// }
/// ```
async fn check_blacklist(
    state: web::Data<AppState>,
    req: web::Json<CheckBlacklistRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for blacklist check: {}", errors);
        return bad_request(errors.to_string());
    }

    if !req.nik_is_numeric() {
        tracing::info!("Invalid NIK format");
        return bad_request("NIK must be a 16-digit number".to_string());
    }

    let request = match req.into_inner().into_check_request() {
        Ok(request) => request,
        Err(e) => return bad_request(e.to_string()),
    };

    let span = tracing::info_span!("blacklist_check", request_id = %uuid::Uuid::new_v4());
    let resolution = tokio::time::timeout(state.request_timeout, state.coordinator.resolve(&request))
        .instrument(span)
        .await;

    match resolution {
        Ok(Ok(outcome)) => HttpResponse::Ok().json(CheckBlacklistResponse::from(outcome)),
        Ok(Err(e)) => {
            tracing::error!("Error checking blacklist: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Internal server error".to_string(),
                message: "Failed to check blacklist".to_string(),
                status_code: 500,
            })
        }
        Err(_) => {
            tracing::error!("Blacklist check exceeded {:?}", state.request_timeout);
            state.stats.record_resolution_failure();
            HttpResponse::GatewayTimeout().json(ErrorResponse {
                error: "Timeout".to_string(),
                message: "Blacklist check timed out".to_string(),
                status_code: 504,
            })
        }
    }
}

/// Prometheus scrape endpoint
///
/// GET /metrics
pub async fn metrics(state: web::Data<AppState>) -> impl Responder {
    render_metrics(&state.stats)
}

fn render_metrics(stats: &ResolutionStats) -> HttpResponse {
    match stats.encode() {
        Ok((content_type, body)) => HttpResponse::Ok().content_type(content_type).body(body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Internal server error".to_string(),
                message: "Failed to encode metrics".to_string(),
                status_code: 500,
            })
        }
    }
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchOutcome;
    use actix_web::http::header;

    #[test]
    fn test_no_match_response_omits_details() {
        let response = CheckBlacklistResponse::from(MatchOutcome::no_match());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["blacklisted"], false);
        assert_eq!(json["match_type"], "none");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_metrics_rendered_as_text() {
        let stats = ResolutionStats::new(prometheus::Registry::new()).unwrap();
        stats.record_outcome(&MatchOutcome::exact("court order"));
        stats.record_resolution_failure();

        let response = render_metrics(&stats);
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains(r#"blacklist_checks_total{match_type="exact",result="blacklisted"} 1"#));
        assert!(body.contains("blacklist_resolution_failures_total 1"));
    }
}
