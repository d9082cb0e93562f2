use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use super::desk::LotteryFrontDesk;
use super::domain::{StudentId, StudentStatus};
use super::registration::{RegistrationCandidate, RegistrationError};
use super::service::{LotteryService, LotteryServiceError};
use super::sessions::SessionId;

/// Header carrying the client's session key for the one-registration-per-session rule.
pub const SESSION_HEADER: &str = "x-session-id";

/// Registration form body. `gpa` may arrive as text or as a number.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_gpa_text")]
    pub gpa: String,
    #[serde(default)]
    pub status: StudentStatus,
}

impl From<RegistrationRequest> for RegistrationCandidate {
    fn from(request: RegistrationRequest) -> Self {
        RegistrationCandidate::new(request.name, request.gpa, request.status)
    }
}

fn deserialize_gpa_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GpaInput {
        Number(f64),
        Text(String),
    }

    Ok(match GpaInput::deserialize(deserializer)? {
        GpaInput::Number(value) => value.to_string(),
        GpaInput::Text(value) => value,
    })
}

/// Router for both pools, mounted under `/api/v1/pre-data` and `/api/v1/realtime`.
pub fn lottery_router<S>(
    pre_data: Arc<LotteryFrontDesk<S>>,
    realtime: Arc<LotteryFrontDesk<S>>,
) -> Router
where
    S: LotteryService + 'static,
{
    Router::new()
        .nest("/api/v1/pre-data", scope_router(pre_data))
        .nest("/api/v1/realtime", scope_router(realtime))
}

fn scope_router<S>(desk: Arc<LotteryFrontDesk<S>>) -> Router
where
    S: LotteryService + 'static,
{
    Router::new()
        .route("/students", get(roster_handler::<S>))
        .route("/students/:student_id", delete(remove_handler::<S>))
        .route("/registrations", post(register_handler::<S>))
        .route("/lottery", post(run_handler::<S>))
        .route("/results", get(results_handler::<S>))
        .route("/clear", post(clear_handler::<S>))
        .with_state(desk)
}

fn error_response(status: StatusCode, error: impl fmt::Display) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn service_failure(error: LotteryServiceError) -> Response {
    error_response(error.status_code(), error)
}

pub(crate) async fn roster_handler<S>(State(desk): State<Arc<LotteryFrontDesk<S>>>) -> Response
where
    S: LotteryService + 'static,
{
    match desk.roster().await {
        Ok(students) => {
            let payload = json!({
                "scope": desk.scope(),
                "count": students.len(),
                "students": students,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn remove_handler<S>(
    State(desk): State<Arc<LotteryFrontDesk<S>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: LotteryService + 'static,
{
    let id = StudentId(student_id);
    match desk.remove_student(&id).await {
        Ok(()) => {
            let payload = json!({ "deleted": id });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn register_handler<S>(
    State(desk): State<Arc<LotteryFrontDesk<S>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<RegistrationRequest>,
) -> Response
where
    S: LotteryService + 'static,
{
    let session = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(SessionId::parse);
    let candidate = RegistrationCandidate::from(request);

    match desk.register(session.as_ref(), &candidate).await {
        Ok(student) => {
            let payload = json!({
                "message": "registration accepted",
                "student": student,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(RegistrationError::Rejected(rejection)) => {
            let payload = json!({
                "error": rejection.to_string(),
                "reason": rejection.code(),
            });
            (rejection.status_code(), axum::Json(payload)).into_response()
        }
        Err(RegistrationError::Service(error)) => service_failure(error),
    }
}

pub(crate) async fn run_handler<S>(State(desk): State<Arc<LotteryFrontDesk<S>>>) -> Response
where
    S: LotteryService + 'static,
{
    match desk.run_lottery().await {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn results_handler<S>(State(desk): State<Arc<LotteryFrontDesk<S>>>) -> Response
where
    S: LotteryService + 'static,
{
    match desk.results().await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn clear_handler<S>(State(desk): State<Arc<LotteryFrontDesk<S>>>) -> Response
where
    S: LotteryService + 'static,
{
    match desk.clear().await {
        Ok(()) => {
            let payload = json!({ "scope": desk.scope(), "count": 0 });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}
