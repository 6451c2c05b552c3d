//! HTTP API routes
//!
//! Defines all REST API endpoints for the session server.

use crate::dashboard::{ExportOutcome, Snapshot};
use crate::error::Error;
use crate::geo;
use crate::model::{available_kinds, AnalysisKind, Location};
use crate::server::state::AppState;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::info;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Static files: relative to cwd first, then next to the executable
    let static_path = if std::path::Path::new("static").exists() {
        "static".to_string()
    } else {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
            .filter(|path| path.exists())
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_else(|| "static".to_string())
    };

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/kinds", get(kinds_handler))
        .route("/api/state", get(state_handler))
        .route("/api/selection", put(select_handler).delete(clear_handler))
        .route("/api/selection/place", post(place_handler))
        .route("/api/stores", put(stores_handler))
        .route("/api/analysis/:kind", post(analysis_handler))
        .route("/api/signals/:kind/stocking_action", post(stocking_handler))
        .route("/api/export", get(export_handler))
        .nest_service("/", ServeDir::new(&static_path).append_index_html_on_directories(true))
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::NoActiveLocation => "NO_ACTIVE_LOCATION",
            Error::MissingGeometry(_) => "MISSING_GEOMETRY",
            Error::SignalNotFound(_) => "SIGNAL_NOT_FOUND",
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Geocoding(_) => "GEOCODING_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

fn parse_kind(kind: &str) -> Result<AnalysisKind, ApiError> {
    AnalysisKind::from_str(kind).map_err(|e| ApiError::new("INVALID_KIND", e))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub service_url: String,
    pub active: Option<String>,
    pub loading: bool,
}

/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let snapshot = state.dashboard.snapshot().await?;
    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        service_url: state.config.service.base_url.clone(),
        active: snapshot.active.as_ref().map(|loc| loc.id.clone()),
        loading: snapshot.is_loading(),
    }))
}

/// Kinds response
#[derive(Debug, Serialize, Deserialize)]
pub struct KindsResponse {
    pub kinds: Vec<AnalysisKind>,
}

/// GET /api/kinds
async fn kinds_handler() -> Json<KindsResponse> {
    Json(KindsResponse {
        kinds: available_kinds(),
    })
}

/// GET /api/state
async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(state.dashboard.snapshot().await?))
}

/// PUT /api/selection
async fn select_handler(
    State(state): State<Arc<AppState>>,
    Json(location): Json<Location>,
) -> Result<Json<Snapshot>, ApiError> {
    location.coordinates().validate()?;
    Ok(Json(state.dashboard.select_location(location).await?))
}

/// DELETE /api/selection
async fn clear_handler(State(state): State<Arc<AppState>>) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(state.dashboard.clear_selection().await?))
}

/// Place search request body
#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub query: String,
}

/// POST /api/selection/place
///
/// Looks the query up and selects the best match.
async fn place_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlaceRequest>,
) -> Result<Json<Snapshot>, ApiError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(ApiError::new("EMPTY_QUERY", "Search query is empty"));
    }

    let location = geo::locate(&state.geocoder, query).await?;
    info!("Place '{}' resolved to {}", query, location.address);
    Ok(Json(state.dashboard.select_location(location).await?))
}

/// PUT /api/stores
async fn stores_handler(
    State(state): State<Arc<AppState>>,
    Json(stores): Json<Vec<Location>>,
) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(state.dashboard.set_stores(stores).await?))
}

/// POST /api/analysis/:kind
async fn analysis_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<Snapshot>, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.dashboard.request_analysis(kind).await?))
}

/// POST /api/signals/:kind/stocking_action
async fn stocking_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<Snapshot>, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.dashboard.generate_stocking_action(kind).await?))
}

/// GET /api/export
///
/// Downloads the CSV export of the current signals.
async fn export_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let today = chrono::Local::now().date_naive();

    match state.dashboard.export(today).await? {
        ExportOutcome::Empty => Err(ApiError::new(
            "NOTHING_TO_EXPORT",
            "No data available to export.",
        )),
        ExportOutcome::Ready(export) => {
            let disposition = content_disposition(&export.file_name);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.content,
            )
                .into_response())
        }
    }
}

/// Attachment header for `file_name`
///
/// Location ids are free-form, so the quoted name keeps only safe ASCII and
/// the exact name travels percent-encoded in `filename*`.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' | ';' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dashboard;
    use crate::service::mock::{store, MockService};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState> {
        let session = dashboard::spawn(Arc::new(MockService::new()));
        Arc::new(AppState::new(Config::default(), session).unwrap())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(create_test_state());
        let response = send(&app, "GET", "/api/status", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let status: StatusResponse = json_body(response).await;
        assert_eq!(status.service_url, "http://127.0.0.1:8000/api");
        assert!(status.active.is_none());
    }

    #[tokio::test]
    async fn test_kinds_endpoint() {
        let app = create_router(create_test_state());
        let response = send(&app, "GET", "/api/kinds", None).await;

        let kinds: KindsResponse = json_body(response).await;
        assert_eq!(kinds.kinds, vec![AnalysisKind::Seasonal, AnalysisKind::Growth]);
    }

    #[tokio::test]
    async fn test_select_analyze_export() {
        let state = create_test_state();
        let app = create_router(Arc::clone(&state));

        let body = serde_json::to_value(store("2801")).unwrap();
        let response = send(&app, "PUT", "/api/selection", Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot: Snapshot = json_body(response).await;
        assert_eq!(snapshot.active.unwrap().id, "2801");

        let response = send(&app, "POST", "/api/analysis/growth", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        state.dashboard.wait_idle().await.unwrap();

        let response = send(&app, "GET", "/api/state", None).await;
        let snapshot: Snapshot = json_body(response).await;
        assert_eq!(snapshot.signals.len(), 1);
        assert!(snapshot.context.is_some());

        let response = send(&app, "GET", "/api/export", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains("GreenGrowth_Export_2801_"));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let csv = String::from_utf8(body.to_vec()).unwrap();
        assert!(csv.starts_with("\"Store Name\""));
    }

    #[tokio::test]
    async fn test_stocking_action_endpoint() {
        let state = create_test_state();
        let app = create_router(Arc::clone(&state));

        let body = serde_json::to_value(store("7")).unwrap();
        send(&app, "PUT", "/api/selection", Some(body)).await;

        let response = send(&app, "POST", "/api/signals/seasonal/stocking_action", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, "SIGNAL_NOT_FOUND");

        send(&app, "POST", "/api/analysis/seasonal", None).await;
        state.dashboard.wait_idle().await.unwrap();
        let response = send(&app, "POST", "/api/signals/seasonal/stocking_action", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = state.dashboard.wait_idle().await.unwrap();
        assert_eq!(
            snapshot.signal(AnalysisKind::Seasonal).unwrap().stocking_action.as_deref(),
            Some("Restock for Seasonal at Store 7")
        );
    }

    #[tokio::test]
    async fn test_clear_selection() {
        let state = create_test_state();
        let app = create_router(Arc::clone(&state));

        let stores = serde_json::to_value(vec![store("1"), store("2")]).unwrap();
        send(&app, "PUT", "/api/stores", Some(stores)).await;
        send(&app, "PUT", "/api/selection", Some(serde_json::to_value(store("1")).unwrap())).await;

        let response = send(&app, "DELETE", "/api/selection", None).await;
        let snapshot: Snapshot = json_body(response).await;

        assert!(snapshot.active.is_none());
        assert!(snapshot.stores.is_empty());
        assert!(snapshot.signals.is_empty());
    }

    #[tokio::test]
    async fn test_analysis_without_selection() {
        let app = create_router(create_test_state());
        let response = send(&app, "POST", "/api/analysis/seasonal", None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, "NO_ACTIVE_LOCATION");
    }

    #[tokio::test]
    async fn test_unknown_kind() {
        let app = create_router(create_test_state());
        let response = send(&app, "POST", "/api/analysis/history", None).await;

        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, "INVALID_KIND");
    }

    #[test]
    fn test_content_disposition_plain_name() {
        assert_eq!(
            content_disposition("GreenGrowth_Export_2801_2026-01-05.csv"),
            "attachment; filename=\"GreenGrowth_Export_2801_2026-01-05.csv\"; \
             filename*=UTF-8''GreenGrowth_Export_2801_2026-01-05.csv"
        );
    }

    #[tokio::test]
    async fn test_export_header_with_awkward_id() {
        let state = create_test_state();
        let app = create_router(Arc::clone(&state));

        let body = serde_json::to_value(store("a\"b;c")).unwrap();
        send(&app, "PUT", "/api/selection", Some(body)).await;
        send(&app, "POST", "/api/analysis/growth", None).await;
        state.dashboard.wait_idle().await.unwrap();

        let response = send(&app, "GET", "/api/export", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"GreenGrowth_Export_a_b_c_"));
        assert!(disposition.contains("filename*=UTF-8''GreenGrowth_Export_a%22b%3Bc_"));
        assert_eq!(disposition.matches('"').count(), 2);
    }

    #[tokio::test]
    async fn test_empty_export() {
        let app = create_router(create_test_state());
        let response = send(&app, "GET", "/api/export", None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, "NOTHING_TO_EXPORT");
    }

    #[tokio::test]
    async fn test_invalid_coordinates() {
        let app = create_router(create_test_state());
        let mut location = store("1");
        location.lat = 91.0;

        let response = send(&app, "PUT", "/api/selection", Some(serde_json::to_value(location).unwrap())).await;

        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_empty_place_query() {
        let app = create_router(create_test_state());
        let body = serde_json::json!({"query": "   "});
        let response = send(&app, "POST", "/api/selection/place", Some(body)).await;

        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, "EMPTY_QUERY");
    }
}
