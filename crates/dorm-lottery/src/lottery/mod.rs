//! Room lottery front desk: result ranking, registration gating and the service boundary.
//!
//! Who gets which room and where rosters are stored is decided by the backend behind
//! [`LotteryService`]; this module only orders what comes back and screens what goes in.

pub mod client;
pub mod desk;
pub mod domain;
pub mod ranking;
pub mod registration;
pub mod results;
pub mod router;
pub mod service;
pub mod sessions;

#[cfg(test)]
mod tests;

pub use client::HttpLotteryService;
pub use desk::LotteryFrontDesk;
pub use domain::{
    Assignment, LotteryRunSummary, LotteryScope, NewStudent, RoomType, Student, StudentId,
    StudentStatus,
};
pub use ranking::{classify, order_roster, rank, RankingPolicy, RoomBadge, Tier};
pub use registration::{
    evaluate_registration, RegistrationCandidate, RegistrationError, RegistrationRejection,
};
pub use results::{RankedEntry, ResultsView};
pub use router::{lottery_router, RegistrationRequest, SESSION_HEADER};
pub use service::{LotteryService, LotteryServiceError};
pub use sessions::{SessionId, SessionRegistry, SessionReservation};
