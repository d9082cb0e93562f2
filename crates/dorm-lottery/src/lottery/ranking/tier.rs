use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::super::domain::{Assignment, RoomType};

/// GPA at or above which a student counts as a high achiever.
pub const HIGH_ACHIEVER_GPA: f64 = 3.5;

/// Priority class of an assignment. Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    SingleRoom,
    Flagged,
    HighAchiever,
    Disabled,
    Remaining,
}

impl Tier {
    pub const fn label(self) -> &'static str {
        match self {
            Tier::SingleRoom => "single room",
            Tier::Flagged => "flagged",
            Tier::HighAchiever => "high achiever",
            Tier::Disabled => "disabled",
            Tier::Remaining => "remaining",
        }
    }

    /// Secondary key for two assignments of this tier.
    pub fn compare_within(self, a: &Assignment, b: &Assignment) -> Ordering {
        match self {
            Tier::HighAchiever => b.gpa.total_cmp(&a.gpa),
            Tier::Remaining => a
                .room_number
                .cmp(&b.room_number)
                .then_with(|| a.display_name().cmp(b.display_name())),
            Tier::SingleRoom | Tier::Flagged | Tier::Disabled => {
                a.room_number.cmp(&b.room_number)
            }
        }
    }
}

/// Places an assignment in the first tier whose predicate holds.
pub fn classify(assignment: &Assignment) -> Tier {
    if assignment.room_type == RoomType::Single {
        return Tier::SingleRoom;
    }
    if assignment.corruption {
        return Tier::Flagged;
    }
    if !assignment.disabled && assignment.gpa >= HIGH_ACHIEVER_GPA {
        return Tier::HighAchiever;
    }
    if assignment.disabled {
        return Tier::Disabled;
    }
    Tier::Remaining
}
