use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{NewStudent, Student, StudentStatus};
use super::service::{LotteryService, LotteryServiceError};

pub const MIN_GPA: f64 = 0.0;
pub const MAX_GPA: f64 = 5.0;

/// Students per flag a roster may hold.
pub const FLAG_CAP: usize = 1;

/// Registration as typed into the form. `gpa` stays raw text until validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCandidate {
    pub name: String,
    pub gpa: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub corruption: bool,
}

impl RegistrationCandidate {
    pub fn new(name: impl Into<String>, gpa: impl Into<String>, status: StudentStatus) -> Self {
        Self {
            name: name.into(),
            gpa: gpa.into(),
            disabled: status.disabled(),
            corruption: status.corruption(),
        }
    }

    /// Only flagged candidates are subject to the roster caps.
    pub const fn needs_roster(&self) -> bool {
        self.disabled || self.corruption
    }
}

/// Reason a registration was turned away. Only the first failed rule is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationRejection {
    #[error("this session has already registered for the lottery")]
    AlreadyRegistered,
    #[error("a student name is required")]
    MissingName,
    #[error("GPA must be a number between 0 and 5")]
    InvalidGpa,
    #[error("only one disabled student may be registered")]
    DisabledCapReached,
    #[error("only one corrupt student may be registered")]
    CorruptionCapReached,
    #[error("the current roster could not be loaded, please try again")]
    RosterUnavailable,
}

impl RegistrationRejection {
    pub const fn code(self) -> &'static str {
        match self {
            RegistrationRejection::AlreadyRegistered => "already_registered",
            RegistrationRejection::MissingName => "missing_name",
            RegistrationRejection::InvalidGpa => "invalid_gpa",
            RegistrationRejection::DisabledCapReached => "disabled_cap_reached",
            RegistrationRejection::CorruptionCapReached => "corruption_cap_reached",
            RegistrationRejection::RosterUnavailable => "roster_unavailable",
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            RegistrationRejection::AlreadyRegistered
            | RegistrationRejection::DisabledCapReached
            | RegistrationRejection::CorruptionCapReached => StatusCode::CONFLICT,
            RegistrationRejection::MissingName | RegistrationRejection::InvalidGpa => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RegistrationRejection::RosterUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Session and field rules that need no roster. Returns the normalized student on success.
pub fn precheck(
    candidate: &RegistrationCandidate,
    session_has_registered: bool,
) -> Result<NewStudent, RegistrationRejection> {
    if session_has_registered {
        return Err(RegistrationRejection::AlreadyRegistered);
    }
    validate_fields(candidate)
}

/// Name and GPA rules alone, shared by gated and ungated admission.
pub fn validate_fields(
    candidate: &RegistrationCandidate,
) -> Result<NewStudent, RegistrationRejection> {
    let name = candidate.name.trim();
    if name.is_empty() {
        return Err(RegistrationRejection::MissingName);
    }

    let gpa = parse_gpa(&candidate.gpa).ok_or(RegistrationRejection::InvalidGpa)?;

    Ok(NewStudent {
        name: name.to_string(),
        gpa,
        disabled: candidate.disabled,
        corruption: candidate.corruption,
    })
}

/// Roster caps for the flagged statuses, disabled first.
pub fn check_caps(student: &NewStudent, roster: &[Student]) -> Result<(), RegistrationRejection> {
    if student.disabled && roster.iter().filter(|s| s.disabled).count() >= FLAG_CAP {
        return Err(RegistrationRejection::DisabledCapReached);
    }
    if student.corruption && roster.iter().filter(|s| s.corruption).count() >= FLAG_CAP {
        return Err(RegistrationRejection::CorruptionCapReached);
    }
    Ok(())
}

/// Pure admission decision over a roster snapshot.
pub fn evaluate_registration(
    candidate: &RegistrationCandidate,
    roster: &[Student],
    session_has_registered: bool,
) -> Result<NewStudent, RegistrationRejection> {
    let student = precheck(candidate, session_has_registered)?;
    check_caps(&student, roster)?;
    Ok(student)
}

fn parse_gpa(raw: &str) -> Option<f64> {
    let gpa = raw.trim().parse::<f64>().ok()?;
    (gpa.is_finite() && (MIN_GPA..=MAX_GPA).contains(&gpa)).then_some(gpa)
}

/// Failure of a full registration attempt against the lottery service.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Rejected(#[from] RegistrationRejection),
    #[error(transparent)]
    Service(#[from] LotteryServiceError),
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistrationError::Rejected(rejection) => rejection.status_code(),
            RegistrationError::Service(error) => error.status_code(),
        }
    }
}

/// Runs the gate and, on admission, creates the student.
///
/// The roster is only read for flagged candidates, and a failed read rejects rather than
/// admits. The cap check here is an early answer for the user; `create_student` re-checks
/// it authoritatively. Marking the session afterwards is up to the caller.
pub async fn register<S>(
    service: &S,
    candidate: &RegistrationCandidate,
    session_has_registered: bool,
) -> Result<Student, RegistrationError>
where
    S: LotteryService + ?Sized,
{
    let admitted = precheck(candidate, session_has_registered).map_err(|rejection| {
        info!(reason = rejection.code(), "registration rejected");
        rejection
    })?;

    if candidate.needs_roster() {
        let roster = service.list_students().await.map_err(|err| {
            warn!(error = %err, "roster read failed during registration");
            RegistrationRejection::RosterUnavailable
        })?;
        check_caps(&admitted, &roster).map_err(|rejection| {
            info!(reason = rejection.code(), "registration rejected");
            rejection
        })?;
    }

    create(service, &admitted).await
}

/// Adds a student to an ungated pool: field validation only, no session rule and no caps.
pub async fn add_student<S>(
    service: &S,
    candidate: &RegistrationCandidate,
) -> Result<Student, RegistrationError>
where
    S: LotteryService + ?Sized,
{
    let admitted = validate_fields(candidate).map_err(|rejection| {
        info!(reason = rejection.code(), "student rejected");
        rejection
    })?;
    create(service, &admitted).await
}

async fn create<S>(service: &S, admitted: &NewStudent) -> Result<Student, RegistrationError>
where
    S: LotteryService + ?Sized,
{
    let student = service.create_student(admitted).await.map_err(|err| {
        warn!(error = %err, "lottery service refused registration");
        err
    })?;
    info!(student_id = %student.id, status = student.status().label(), "student registered");
    Ok(student)
}
