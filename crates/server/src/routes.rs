//! HTTP surface over the audit library.

use std::sync::Arc;
use std::time::Duration;

use aeo_audit_core::{
    AnalysisRecord, AuditConfig, AuditError, Auditor, CitationChecker, CitationResult, CitationSummary, PageAnalysis,
    RecommendationInput, Recommender,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Upper bound for one request, provider calls included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared, read-only server state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub openai_key: Option<String>,
    pub perplexity_key: Option<String>,
    pub config: AuditConfig,
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppState {
    pub fn from_env() -> Self {
        Self {
            openai_key: non_empty_env("OPENAI_API_KEY"),
            perplexity_key: non_empty_env("PERPLEXITY_API_KEY"),
            config: AuditConfig::default(),
        }
    }

    pub fn has_openai_key(&self) -> bool {
        self.openai_key.is_some()
    }

    pub fn has_perplexity_key(&self) -> bool {
        self.perplexity_key.is_some()
    }

    fn auditor(&self) -> Auditor {
        Auditor::with_config(self.config.clone()).with_openai_key(self.openai_key.as_deref())
    }
}

/// Error body: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        let status = match &err {
            AuditError::MissingCredential(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuditError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            AuditError::ProviderTimeout
            | AuditError::InvalidApiKey
            | AuditError::RateLimited
            | AuditError::ApiStatus(_)
            | AuditError::RequestFailed(_)
            | AuditError::MalformedResponse(_)
            | AuditError::InsufficientQueries { .. }
            | AuditError::NoRecommendations => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CitationsRequest {
    pub url: String,
    pub queries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CitationsResponse {
    pub results: Vec<CitationResult>,
    pub summary: CitationSummary,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsRequest {
    pub analysis: PageAnalysis,
    #[serde(default)]
    pub citations: Option<Vec<CitationResult>>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<String>,
}

fn required_url(url: &str) -> Result<&str, ApiError> {
    let url = url.trim();
    if url.is_empty() { Err(ApiError::bad_request("url is required")) } else { Ok(url) }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Fetch failures come back as a `failure` record with status 200.
async fn analyze(
    State(state): State<Arc<AppState>>, Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let url = required_url(&request.url)?;
    let record = state.auditor().analyze(url).await;
    Ok(Json(record))
}

async fn citations(
    State(state): State<Arc<AppState>>, Json(request): Json<CitationsRequest>,
) -> Result<Json<CitationsResponse>, ApiError> {
    let url = required_url(&request.url)?;
    if request.queries.iter().all(|q| q.trim().is_empty()) {
        return Err(ApiError::bad_request("queries must contain at least one query"));
    }

    let checker = CitationChecker::new(state.perplexity_key.as_deref().unwrap_or_default())?;
    let results = checker.check_all(&request.queries, url).await;
    let summary = CitationSummary::from_results(&results);
    Ok(Json(CitationsResponse { results, summary }))
}

async fn recommendations(
    State(state): State<Arc<AppState>>, Json(request): Json<RecommendationsRequest>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let input = RecommendationInput::from_analysis(&request.analysis, request.citations.as_deref());
    let recommendations = Recommender::new(state.openai_key.clone()).recommend(&input).await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// Requests still running after `timeout` get a 408.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/citations", post(citations))
        .route("/api/recommendations", post(recommendations))
        .layer(TraceLayer::new_for_http())
        .layer(timeout_layer(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    const PAGE: &str = r#"<html><head><title>Sourdough Starter | Bake Club</title></head><body>
        <main><p>A sourdough starter is a live culture of flour and water that leavens bread, and it needs feeding every 24 hours.</p></main>
        </body></html>"#;

    fn app() -> Router {
        router(Arc::new(AppState::default()))
    }

    async fn send(app: Router, method: &str, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    /// Serves `PAGE` on an ephemeral port and returns its URL.
    async fn fixture_server() -> String {
        let app = Router::new().route(
            "/starter",
            get(|| async { ([(axum::http::header::CONTENT_TYPE, "text/html")], PAGE) }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/starter")
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_page() {
        let url = fixture_server().await;
        let (status, body) = send(app(), "POST", "/api/analyze", json!({ "url": url })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["page_title"], "Sourdough Starter | Bake Club");
        assert_eq!(body["answer"]["verdict"], true);
        assert_eq!(body["generated_queries"][0], "What is sourdough starter?");
    }

    #[tokio::test]
    async fn test_analyze_unreachable_is_failure_record() {
        let (status, body) = send(app(), "POST", "/api/analyze", json!({ "url": "http://127.0.0.1:9/" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "failure");
        assert_eq!(body["error_message"], "Could not connect to the URL. Please check if it's valid.");
    }

    #[tokio::test]
    async fn test_analyze_requires_url() {
        let (status, body) = send(app(), "POST", "/api/analyze", json!({ "url": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "url is required");
    }

    #[tokio::test]
    async fn test_citations_without_key() {
        let request = json!({ "url": "https://example.com", "queries": ["What is example?"] });
        let (status, body) = send(app(), "POST", "/api/citations", request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Missing credential: Perplexity API key not provided");
    }

    #[tokio::test]
    async fn test_citations_require_queries() {
        let request = json!({ "url": "https://example.com", "queries": [""] });
        let (status, _) = send(app(), "POST", "/api/citations", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recommendations_without_key() {
        let request = json!({
            "analysis": {
                "source_url": "https://example.com",
                "page_title": "Example",
                "total_word_count": 2,
                "leading_window_text": "Example text",
                "first_paragraph_text": "",
                "answer": { "verdict": false, "score": 0, "reasons": ["No first paragraph found"] },
                "generated_queries": ["a", "b", "c"],
                "queries_ai_generated": false
            }
        });
        let (status, body) = send(app(), "POST", "/api/recommendations", request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Missing credential: OpenAI API key not provided");
    }

    #[test]
    fn test_provider_errors_map_to_bad_gateway() {
        assert_eq!(ApiError::from(AuditError::RateLimited).status, StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::from(AuditError::ApiStatus(500)).status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::from(AuditError::MissingCredential("x".into())).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let slow = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(Duration::from_millis(50)));

        let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
        let response = slow.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
