use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Opaque client session key, typically from the `x-session-id` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    /// Blank keys are treated as no session at all.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| SessionId(trimmed.to_string()))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-side memory of which sessions already registered.
///
/// The gate itself only ever sees the resulting bool.
#[derive(Debug, Default, Clone)]
pub struct SessionRegistry {
    registered: Arc<Mutex<HashSet<SessionId>>>,
}

impl SessionRegistry {
    pub fn has_registered(&self, session: &SessionId) -> bool {
        self.registered
            .lock()
            .map(|guard| guard.contains(session))
            .unwrap_or_else(|poisoned| poisoned.into_inner().contains(session))
    }

    pub fn mark_registered(&self, session: SessionId) {
        self.try_reserve(&session);
    }

    /// Claims the session's single registration. Returns false when it was already claimed,
    /// so two concurrent attempts from one session cannot both proceed.
    pub fn try_reserve(&self, session: &SessionId) -> bool {
        match self.registered.lock() {
            Ok(mut guard) => guard.insert(session.clone()),
            Err(poisoned) => poisoned.into_inner().insert(session.clone()),
        }
    }

    /// Gives a claim back after the attempt it guarded failed.
    pub fn release(&self, session: &SessionId) {
        match self.registered.lock() {
            Ok(mut guard) => {
                guard.remove(session);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(session);
            }
        }
    }

    /// Scoped form of [`try_reserve`](Self::try_reserve): the claim is released on drop
    /// unless [`SessionReservation::commit`] is called.
    pub fn reserve<'a>(&'a self, session: &'a SessionId) -> Option<SessionReservation<'a>> {
        self.try_reserve(session).then_some(SessionReservation {
            registry: self,
            session,
            committed: false,
        })
    }

    pub fn len(&self) -> usize {
        self.registered
            .lock()
            .map(|guard| guard.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A held registration claim for one session.
#[must_use = "dropping a reservation releases it"]
pub struct SessionReservation<'a> {
    registry: &'a SessionRegistry,
    session: &'a SessionId,
    committed: bool,
}

impl SessionReservation<'_> {
    /// Keeps the claim for good.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for SessionReservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.registry.release(self.session);
        }
    }
}
