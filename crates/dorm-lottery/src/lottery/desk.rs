use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{LotteryRunSummary, LotteryScope, Student, StudentId};
use super::ranking::order_roster;
use super::registration::{
    self, RegistrationCandidate, RegistrationError, RegistrationRejection,
};
use super::results::ResultsView;
use super::service::{LotteryService, LotteryServiceError};
use super::sessions::{SessionId, SessionRegistry};

/// Front desk for one lottery pool: the service, the gate and the session memory together.
pub struct LotteryFrontDesk<S> {
    scope: LotteryScope,
    service: Arc<S>,
    sessions: SessionRegistry,
}

impl<S> LotteryFrontDesk<S>
where
    S: LotteryService + 'static,
{
    pub fn new(scope: LotteryScope, service: Arc<S>) -> Self {
        Self::with_sessions(scope, service, SessionRegistry::default())
    }

    pub fn with_sessions(scope: LotteryScope, service: Arc<S>, sessions: SessionRegistry) -> Self {
        Self {
            scope,
            service,
            sessions,
        }
    }

    pub fn scope(&self) -> LotteryScope {
        self.scope
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Roster in display order (see [`order_roster`]).
    pub async fn roster(&self) -> Result<Vec<Student>, LotteryServiceError> {
        let students = self.service.list_students().await?;
        Ok(order_roster(&students))
    }

    /// Register a candidate on behalf of `session`.
    ///
    /// In a gated pool the session's one registration is reserved before the service is
    /// called and handed back if the attempt fails or is abandoned. Without a session key nothing is
    /// remembered, so the one-per-session rule cannot apply. Ungated pools only validate
    /// the fields.
    pub async fn register(
        &self,
        session: Option<&SessionId>,
        candidate: &RegistrationCandidate,
    ) -> Result<Student, RegistrationError> {
        if !self.scope.gated() {
            return registration::add_student(self.service.as_ref(), candidate).await;
        }

        let reservation = match session {
            Some(session) => match self.sessions.reserve(session) {
                Some(reservation) => Some(reservation),
                None => {
                    let rejection = RegistrationRejection::AlreadyRegistered;
                    info!(scope = %self.scope, reason = rejection.code(), "registration rejected");
                    return Err(rejection.into());
                }
            },
            None => None,
        };

        let student = registration::register(self.service.as_ref(), candidate, false).await?;
        if let Some(reservation) = reservation {
            reservation.commit();
        }
        Ok(student)
    }

    pub async fn remove_student(&self, id: &StudentId) -> Result<(), LotteryServiceError> {
        self.service.delete_student(id).await?;
        info!(scope = %self.scope, student_id = %id, "student removed");
        Ok(())
    }

    pub async fn run_lottery(&self) -> Result<LotteryRunSummary, LotteryServiceError> {
        let summary = self.service.run_lottery().await?;
        info!(
            scope = %self.scope,
            total_students = summary.total_students,
            "lottery run completed"
        );
        Ok(summary)
    }

    pub async fn results(&self) -> Result<ResultsView, LotteryServiceError> {
        let assignments = self.service.list_assignments().await?;
        Ok(ResultsView::build(self.scope, &assignments, Utc::now()))
    }

    pub async fn clear(&self) -> Result<(), LotteryServiceError> {
        self.service.clear_all().await?;
        info!(scope = %self.scope, "lottery pool cleared");
        Ok(())
    }
}
