//! HTTP routes.
//!
//! Every core call touches the repository host and blocks, so handlers run
//! them on the blocking pool. Updates additionally hold the tier's lock.
//!
//! # Endpoints
//!
//! - `GET /health`
//! - `GET /api/new/:tier?skip=a,b` - what an update of `tier` would copy
//! - `GET /api/list/:tier?skip=a,b` - RPMs in `tier`
//! - `POST /api/update/:tier?skip=a,b` - promote into `tier`
//! - `GET /api/latest-dev-rpms`, `GET /api/latest-qa-rpms`

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use dingle_core::DingleError;
use dingle_core::promote::{PromotionReport, Promoter};
use dingle_core::skip::filter_rpms;
use dingle_core::types::Tier;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/new/:tier", get(new_rpms))
        .route("/api/list/:tier", get(list_rpms))
        .route("/api/update/:tier", post(update_repo))
        .route("/api/latest-dev-rpms", get(latest_dev_rpms))
        .route("/api/latest-qa-rpms", get(latest_qa_rpms))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

/// `?skip=foo,bar-1.0.0-1.noarch.rpm`
#[derive(Debug, Default, Deserialize)]
pub struct SkipQuery {
    #[serde(default)]
    pub skip: Option<String>,
}

impl SkipQuery {
    pub fn skips(&self) -> Vec<String> {
        self.skip
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NewResponse {
    pub new: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub list: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub update: PromotionReport,
}

#[derive(Debug, Serialize)]
pub struct LatestDevResponse {
    pub latest_dev_rpms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LatestQaResponse {
    pub latest_qa_rpms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    /// Steps a failed update had already run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PromotionReport>,
}

// ==================
// Errors
// ==================

/// A failed request, rendered as an [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: Option<Box<PromotionReport>>,
}

impl From<DingleError> for ApiError {
    fn from(err: DingleError) -> Self {
        let status = if err.is_caller_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = err.to_string();
        let report = match err {
            DingleError::PromotionFailed { report, .. } => Some(report),
            _ => None,
        };
        Self {
            status,
            message,
            report,
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("worker task failed: {}", err),
            report: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}", self.message);
        }
        let body = ErrorResponse {
            error: self.message,
            code: self.status.as_u16(),
            report: self.report.map(|report| *report),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Run `f` against the shared state on the blocking pool.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> dingle_core::Result<T> + Send + 'static,
{
    let state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || f(&state)).await?;
    Ok(result?)
}

fn parse_tier(raw: &str) -> Result<Tier, ApiError> {
    raw.parse::<Tier>().map_err(ApiError::from)
}

// ==================
// Handlers
// ==================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn new_rpms(
    State(state): State<Arc<AppState>>,
    Path(tier): Path<String>,
    Query(query): Query<SkipQuery>,
) -> ApiResult<NewResponse> {
    let tier = parse_tier(&tier)?;
    let skips = query.skips();
    let new = blocking(&state, move |st| {
        Promoter::new(&st.config, st.executor.as_ref()).latest_new_rpms(tier, &skips)
    })
    .await?;
    Ok(Json(NewResponse { new }))
}

async fn list_rpms(
    State(state): State<Arc<AppState>>,
    Path(tier): Path<String>,
    Query(query): Query<SkipQuery>,
) -> ApiResult<ListResponse> {
    let tier = parse_tier(&tier)?;
    let skips = query.skips();
    let list = blocking(&state, move |st| {
        let rpms = Promoter::new(&st.config, st.executor.as_ref()).artifacts(tier)?;
        let mut rpms = filter_rpms(&rpms, &skips);
        rpms.sort();
        Ok(rpms)
    })
    .await?;
    Ok(Json(ListResponse { list }))
}

async fn update_repo(
    State(state): State<Arc<AppState>>,
    Path(tier): Path<String>,
    Query(query): Query<SkipQuery>,
) -> ApiResult<UpdateResponse> {
    let tier = parse_tier(&tier)?;
    let skips = query.skips();
    let update = blocking(&state, move |st| {
        let _guard = st.locks.hold(tier);
        info!(%tier, "update requested over http");
        Promoter::new(&st.config, st.executor.as_ref()).promote(tier, &skips)
    })
    .await?;
    Ok(Json(UpdateResponse { update }))
}

async fn latest_dev_rpms(State(state): State<Arc<AppState>>) -> ApiResult<LatestDevResponse> {
    let latest_dev_rpms = blocking(&state, |st| {
        Promoter::new(&st.config, st.executor.as_ref()).latest_new_rpms::<&str>(Tier::Dev, &[])
    })
    .await?;
    Ok(Json(LatestDevResponse { latest_dev_rpms }))
}

async fn latest_qa_rpms(State(state): State<Arc<AppState>>) -> ApiResult<LatestQaResponse> {
    let latest_qa_rpms = blocking(&state, |st| {
        Promoter::new(&st.config, st.executor.as_ref()).latest_new_rpms::<&str>(Tier::Qa, &[])
    })
    .await?;
    Ok(Json(LatestQaResponse { latest_qa_rpms }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_query_splits_on_commas() {
        let query = SkipQuery {
            skip: Some("foo, bar-1.0.0-1.noarch.rpm,,".to_string()),
        };
        assert_eq!(query.skips(), vec!["foo", "bar-1.0.0-1.noarch.rpm"]);
        assert!(SkipQuery::default().skips().is_empty());
    }

    #[test]
    fn caller_errors_map_to_bad_request() {
        let err = ApiError::from(DingleError::UnknownTier("uat".to_string()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::from(DingleError::NoUpstreamTier(Tier::Dev));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::from(DingleError::RemoteCommandFailed {
            command: "ls /rpms/qa".to_string(),
            output: "denied".to_string(),
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.report.is_none());
    }
}
