use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::async_trait;
use bytes::Bytes;
use chrono::Utc;
use http_body_util::{BodyExt, Full};
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::debug;

use super::domain::{
    Assignment, LotteryRunSummary, LotteryScope, NewStudent, Student, StudentId,
};
use super::service::{LotteryService, LotteryServiceError};
use crate::config::LotteryServiceConfig;

/// [`LotteryService`] backed by the backend's REST API for one pool.
///
/// Each call opens its own HTTP/1.1 connection.
#[derive(Debug, Clone)]
pub struct HttpLotteryService {
    base_url: String,
    scope: LotteryScope,
    issued: Arc<AtomicU64>,
}

/// The backend stores whatever key the caller supplies, so new students are keyed here.
#[derive(Serialize)]
struct AddStudentBody<'a> {
    id: StudentId,
    #[serde(flatten)]
    student: &'a NewStudent,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RosterPayload {
    Wrapped { students: Vec<Student> },
    Bare(Vec<Student>),
}

#[derive(Deserialize)]
struct CreatedStudent {
    id: StudentId,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(alias = "message")]
    error: String,
}

impl HttpLotteryService {
    pub fn new(config: &LotteryServiceConfig, scope: LotteryScope) -> Self {
        Self {
            base_url: config.base_url.clone(),
            scope,
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_student_id(&self) -> StudentId {
        let sequence = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        let prefix = match self.scope {
            LotteryScope::PreData => "pd",
            LotteryScope::Realtime => "rt",
        };
        StudentId(format!(
            "{prefix}-{}-{sequence}",
            Utc::now().timestamp_millis()
        ))
    }

    pub fn scope(&self) -> LotteryScope {
        self.scope
    }

    fn endpoint(&self, path: &str) -> Result<Uri, LotteryServiceError> {
        let url = format!("{}/api/{}/{}", self.base_url, self.scope.api_segment(), path);
        url.parse::<Uri>()
            .map_err(|err| LotteryServiceError::Transport(format!("invalid url '{url}': {err}")))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, LotteryServiceError> {
        let uri = self.endpoint(path)?;
        let host = uri
            .host()
            .ok_or_else(|| LotteryServiceError::Transport(format!("no host in '{uri}'")))?
            .to_string();
        let port = uri.port_u16().unwrap_or(80);
        let authority = uri
            .authority()
            .map(|authority| authority.as_str().to_string())
            .unwrap_or_else(|| host.clone());
        let target = uri
            .path_and_query()
            .map(|path| path.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|err| LotteryServiceError::Transport(format!("{authority}: {err}")))?;
        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|err| LotteryServiceError::Transport(err.to_string()))?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                debug!(error = %err, "lottery service connection closed with error");
            }
        });

        let request = Request::builder()
            .method(method.clone())
            .uri(target)
            .header(HOST, authority)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|err| LotteryServiceError::Transport(err.to_string()))?;

        debug!(%method, %uri, "calling lottery service");
        let response = sender
            .send_request(request)
            .await
            .map_err(|err| LotteryServiceError::Transport(err.to_string()))?;
        let status = response.status();
        let payload = response
            .into_body()
            .collect()
            .await
            .map_err(|err| LotteryServiceError::Transport(err.to_string()))?
            .to_bytes();

        if status.is_success() {
            Ok(payload)
        } else {
            Err(failure_for(status, &payload))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LotteryServiceError> {
        let payload = self.send(Method::GET, path, None).await?;
        decode(&payload)
    }
}

fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, LotteryServiceError> {
    serde_json::from_slice(payload).map_err(|err| LotteryServiceError::Decode(err.to_string()))
}

/// Maps an error response onto the service taxonomy. The backend answers a full pool with a
/// plain 400 whose message names the maximum, so that case is read as capacity.
fn failure_for(status: StatusCode, payload: &[u8]) -> LotteryServiceError {
    let message = serde_json::from_slice::<ErrorPayload>(payload)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            let text = String::from_utf8_lossy(payload).trim().to_string();
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                text
            }
        });

    match status {
        StatusCode::NOT_FOUND => LotteryServiceError::NotFound(message),
        StatusCode::CONFLICT => LotteryServiceError::Capacity(message),
        StatusCode::BAD_REQUEST if message.to_ascii_lowercase().contains("maximum") => {
            LotteryServiceError::Capacity(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            LotteryServiceError::Validation(message)
        }
        other => LotteryServiceError::UnexpectedStatus {
            status: other.as_u16(),
            message,
        },
    }
}

fn is_path_safe(id: &StudentId) -> bool {
    !id.0.is_empty()
        && id
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[async_trait]
impl LotteryService for HttpLotteryService {
    async fn list_students(&self) -> Result<Vec<Student>, LotteryServiceError> {
        let roster: RosterPayload = self.get_json("students").await?;
        Ok(match roster {
            RosterPayload::Wrapped { students } | RosterPayload::Bare(students) => students,
        })
    }

    async fn create_student(&self, student: &NewStudent) -> Result<Student, LotteryServiceError> {
        let request = AddStudentBody {
            id: self.next_student_id(),
            student,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|err| LotteryServiceError::Decode(err.to_string()))?;
        let payload = self.send(Method::POST, "addStudent", Some(body)).await?;
        let created: CreatedStudent = decode(&payload)?;
        Ok(student.clone().into_student(created.id))
    }

    async fn delete_student(&self, id: &StudentId) -> Result<(), LotteryServiceError> {
        if !is_path_safe(id) {
            return Err(LotteryServiceError::Validation(format!(
                "invalid student id '{id}'"
            )));
        }
        self.send(Method::DELETE, &format!("deleteStudent/{id}"), None)
            .await?;
        Ok(())
    }

    async fn run_lottery(&self) -> Result<LotteryRunSummary, LotteryServiceError> {
        let payload = self.send(Method::POST, "runTheLottery", None).await?;
        decode(&payload)
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, LotteryServiceError> {
        self.get_json("assignments").await
    }

    async fn clear_all(&self) -> Result<(), LotteryServiceError> {
        self.send(Method::POST, "clear", None).await?;
        Ok(())
    }
}
