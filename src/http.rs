use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use tracking::error::Error;
use tracking::ingest::{IngestGateway, IngestReceipt, PositionReport};
use tracking::models::VehiclePosition;
use tracking::provider::{AuthGate, TokenVerdict};
use tracking::query::{QueryService, VehicleLiveness};
use tracking::store::PositionStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<IngestGateway>,
    queries: Arc<QueryService>,
    store: Arc<PositionStore>,
    gate: Arc<dyn AuthGate>,
}

impl AppState {
    #[must_use]
    pub fn new(
        gateway: IngestGateway, queries: QueryService, store: Arc<PositionStore>,
        gate: Arc<dyn AuthGate>,
    ) -> Self {
        Self { gateway: Arc::new(gateway), queries: Arc::new(queries), store, gate }
    }
}

/// Builds the service router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ingest", post(ingest))
        .route("/api/positions", get(positions))
        .route("/api/positions/{id}", get(position))
        .route("/api/search", get(search))
        .route("/api/status/{id}", get(status))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Wire error body: stable code plus human message.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err {
            Error::MissingField(_) | Error::OutOfRange(_) | Error::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MissingToken => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::FORBIDDEN,
            Error::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = if err.is_client_fault() {
            ErrorBody { code: err.code().to_string(), message: err.to_string() }
        } else {
            // full detail goes to the log, never to the caller
            error!(detail = %err, "internal error");
            ErrorBody { code: err.code().to_string(), message: "internal error".to_string() }
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct Items {
    items: Vec<VehiclePosition>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthBody {
    status: &'static str,
    timestamp: DateTime<Utc>,
    active_vehicles: usize,
}

async fn require_token(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        return Err(Error::MissingToken.into());
    };
    match state.gate.verify(token).await {
        TokenVerdict::Valid => Ok(()),
        TokenVerdict::Invalid => Err(Error::InvalidToken.into()),
    }
}

// Device-facing: no capability check, the gateway's validation is the gate.
async fn ingest(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<IngestReceipt>> {
    let report: PositionReport = serde_json::from_slice(&body).map_err(Error::from)?;
    let receipt = state.gateway.submit(&report)?;
    Ok(Json(receipt))
}

async fn positions(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Items>> {
    require_token(&state, &headers).await?;
    Ok(Json(Items { items: state.queries.get_all() }))
}

async fn position(
    State(state): State<AppState>, headers: HeaderMap, Path(id): Path<String>,
) -> ApiResult<Json<VehiclePosition>> {
    require_token(&state, &headers).await?;
    Ok(Json(state.queries.get_one(&id)?))
}

async fn search(
    State(state): State<AppState>, headers: HeaderMap, Query(params): Query<SearchParams>,
) -> ApiResult<Json<Items>> {
    require_token(&state, &headers).await?;
    Ok(Json(Items { items: state.queries.search(&params.q)? }))
}

async fn status(
    State(state): State<AppState>, headers: HeaderMap, Path(id): Path<String>,
) -> ApiResult<Json<VehicleLiveness>> {
    require_token(&state, &headers).await?;
    Ok(Json(state.queries.status(&id)?))
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody { status: "OK", timestamp: Utc::now(), active_vehicles: state.store.len() })
}
