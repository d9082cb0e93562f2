//! Display ordering for lottery results.
//!
//! Two policies exist: plain room order for the pre-data pool and a five tier priority
//! order for the live pool. Both are stable sorts over a copy of the input, as is the
//! status order used for roster listings.

mod badge;
mod tier;

pub use badge::RoomBadge;
pub use tier::{classify, Tier, HIGH_ACHIEVER_GPA};

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{Assignment, Student, StudentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// `room_number` ascending.
    RoomOrder,
    /// Tier first, then the tier's own secondary key.
    Priority,
}

impl RankingPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            RankingPolicy::RoomOrder => "room",
            RankingPolicy::Priority => "priority",
        }
    }

    pub fn compare(self, a: &Assignment, b: &Assignment) -> Ordering {
        match self {
            RankingPolicy::RoomOrder => a.room_number.cmp(&b.room_number),
            RankingPolicy::Priority => {
                let (tier_a, tier_b) = (classify(a), classify(b));
                tier_a
                    .cmp(&tier_b)
                    .then_with(|| tier_a.compare_within(a, b))
            }
        }
    }
}

/// Returns the assignments reordered for display. The input is left untouched.
pub fn rank(policy: RankingPolicy, assignments: &[Assignment]) -> Vec<Assignment> {
    let mut ranked = assignments.to_vec();
    ranked.sort_by(|a, b| policy.compare(a, b));
    ranked
}

/// Roster display order: corrupt students first, then disabled, then everyone else.
/// Students of the same status keep the order the service returned them in.
pub fn order_roster(students: &[Student]) -> Vec<Student> {
    let mut ordered = students.to_vec();
    ordered.sort_by_key(|student| match student.status() {
        StudentStatus::Corrupt => 0,
        StudentStatus::Disabled => 1,
        StudentStatus::Regular => 2,
    });
    ordered
}
