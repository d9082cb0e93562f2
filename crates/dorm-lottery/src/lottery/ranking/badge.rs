use serde::{Deserialize, Serialize};

use super::super::domain::{Assignment, RoomType};
use super::tier::HIGH_ACHIEVER_GPA;

/// Label shown next to single and premium room occupants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomBadge {
    #[serde(rename = "Corrupt Premium Room")]
    CorruptPremiumRoom,
    #[serde(rename = "Scholarship Room")]
    ScholarshipRoom,
    #[serde(rename = "Disabled Room")]
    DisabledRoom,
    #[serde(rename = "Lotto Won Single Room")]
    LottoWonSingleRoom,
    #[serde(rename = "Corrupt Premium")]
    CorruptPremium,
    #[serde(rename = "Random Premium")]
    RandomPremium,
}

impl RoomBadge {
    pub fn for_assignment(assignment: &Assignment) -> Option<Self> {
        match assignment.room_type {
            RoomType::Single if assignment.corruption => Some(RoomBadge::CorruptPremiumRoom),
            RoomType::Single if assignment.gpa >= HIGH_ACHIEVER_GPA => {
                Some(RoomBadge::ScholarshipRoom)
            }
            RoomType::Single if assignment.disabled => Some(RoomBadge::DisabledRoom),
            RoomType::Single => Some(RoomBadge::LottoWonSingleRoom),
            RoomType::Premium if assignment.corruption => Some(RoomBadge::CorruptPremium),
            RoomType::Premium => Some(RoomBadge::RandomPremium),
            RoomType::Regular => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RoomBadge::CorruptPremiumRoom => "Corrupt Premium Room",
            RoomBadge::ScholarshipRoom => "Scholarship Room",
            RoomBadge::DisabledRoom => "Disabled Room",
            RoomBadge::LottoWonSingleRoom => "Lotto Won Single Room",
            RoomBadge::CorruptPremium => "Corrupt Premium",
            RoomBadge::RandomPremium => "Random Premium",
        }
    }
}
