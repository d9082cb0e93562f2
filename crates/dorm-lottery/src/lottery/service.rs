use axum::async_trait;
use axum::http::StatusCode;

use super::domain::{Assignment, LotteryRunSummary, NewStudent, Student, StudentId};

/// Boundary to the backend that owns rosters, assignments and the lottery run itself.
///
/// Implementations must treat `create_student` as the authoritative guarded insert: the
/// one-disabled and one-corrupt caps are re-checked atomically there and refused with
/// [`LotteryServiceError::Capacity`].
#[async_trait]
pub trait LotteryService: Send + Sync {
    async fn list_students(&self) -> Result<Vec<Student>, LotteryServiceError>;
    async fn create_student(&self, student: &NewStudent) -> Result<Student, LotteryServiceError>;
    async fn delete_student(&self, id: &StudentId) -> Result<(), LotteryServiceError>;
    async fn run_lottery(&self) -> Result<LotteryRunSummary, LotteryServiceError>;
    async fn list_assignments(&self) -> Result<Vec<Assignment>, LotteryServiceError>;
    async fn clear_all(&self) -> Result<(), LotteryServiceError>;
}

/// Failures reported by, or while talking to, the lottery service.
#[derive(Debug, thiserror::Error)]
pub enum LotteryServiceError {
    #[error("request rejected: {0}")]
    Validation(String),
    #[error("pool is at capacity: {0}")]
    Capacity(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service unreachable: {0}")]
    Transport(String),
    #[error("service answered {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("unreadable service payload: {0}")]
    Decode(String),
}

impl LotteryServiceError {
    /// Status the front desk answers with when this error surfaces to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LotteryServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LotteryServiceError::Capacity(_) => StatusCode::CONFLICT,
            LotteryServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            LotteryServiceError::Transport(_)
            | LotteryServiceError::UnexpectedStatus { .. }
            | LotteryServiceError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
