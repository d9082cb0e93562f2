use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ranking::RankingPolicy;

/// Identifier assigned to a student by the lottery service (e.g. `stu-001`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two independent pools the backend runs side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LotteryScope {
    /// Bulk, pre-seeded roster.
    PreData,
    /// Live pool that students join through self-registration.
    Realtime,
}

impl LotteryScope {
    pub const fn label(self) -> &'static str {
        match self {
            LotteryScope::PreData => "pre-data",
            LotteryScope::Realtime => "realtime",
        }
    }

    /// Path segment the backend mounts the pool under.
    pub const fn api_segment(self) -> &'static str {
        match self {
            LotteryScope::PreData => "preData",
            LotteryScope::Realtime => "realtime",
        }
    }

    /// Results of the live pool are shown in priority order, everything else by room.
    pub const fn ranking_policy(self) -> RankingPolicy {
        match self {
            LotteryScope::PreData => RankingPolicy::RoomOrder,
            LotteryScope::Realtime => RankingPolicy::Priority,
        }
    }

    /// Whether self-registration passes the session and flag-cap rules. Pre-data is an
    /// administrator roster and only gets field validation.
    pub const fn gated(self) -> bool {
        matches!(self, LotteryScope::Realtime)
    }
}

impl fmt::Display for LotteryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LotteryScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pre-data" | "predata" | "pre_data" => Ok(LotteryScope::PreData),
            "realtime" | "real-time" => Ok(LotteryScope::Realtime),
            other => Err(format!(
                "unknown lottery '{other}', expected 'pre-data' or 'realtime'"
            )),
        }
    }
}

/// Three-way status offered by registration forms; the flags it maps to are exclusive there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Regular,
    Disabled,
    Corrupt,
}

impl StudentStatus {
    /// Collapses raw flags; `corruption` wins when both are set.
    pub const fn from_flags(disabled: bool, corruption: bool) -> Self {
        if corruption {
            StudentStatus::Corrupt
        } else if disabled {
            StudentStatus::Disabled
        } else {
            StudentStatus::Regular
        }
    }

    pub const fn disabled(self) -> bool {
        matches!(self, StudentStatus::Disabled)
    }

    pub const fn corruption(self) -> bool {
        matches!(self, StudentStatus::Corrupt)
    }

    pub const fn label(self) -> &'static str {
        match self {
            StudentStatus::Regular => "Regular",
            StudentStatus::Disabled => "Disabled",
            StudentStatus::Corrupt => "Corrupt",
        }
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(StudentStatus::Regular),
            "disabled" => Ok(StudentStatus::Disabled),
            "corrupt" | "corruption" => Ok(StudentStatus::Corrupt),
            other => Err(format!(
                "unknown status '{other}', expected regular, disabled or corrupt"
            )),
        }
    }
}

/// A registrant as stored by the lottery service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub gpa: f64,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub corruption: bool,
}

impl Student {
    pub const fn status(&self) -> StudentStatus {
        StudentStatus::from_flags(self.disabled, self.corruption)
    }
}

/// Admitted registration handed to the lottery service for creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub gpa: f64,
    pub disabled: bool,
    pub corruption: bool,
}

impl NewStudent {
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            gpa: self.gpa,
            disabled: self.disabled,
            corruption: self.corruption,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Premium,
    /// Shared room; the backend calls these `double`.
    #[serde(alias = "double")]
    Regular,
}

impl RoomType {
    pub const fn label(self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Premium => "premium",
            RoomType::Regular => "regular",
        }
    }
}

/// A student paired with a room by a lottery run. Student attributes are copied at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(alias = "assignment_id")]
    pub id: u64,
    pub student_id: StudentId,
    #[serde(default, alias = "student_name")]
    pub name: Option<String>,
    pub gpa: f64,
    #[serde(default)]
    pub corruption: bool,
    #[serde(default)]
    pub disabled: bool,
    pub room_number: u32,
    pub room_type: RoomType,
    #[serde(default)]
    pub roommate_id: Option<StudentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roommate_name: Option<String>,
}

impl Assignment {
    pub const fn status(&self) -> StudentStatus {
        StudentStatus::from_flags(self.disabled, self.corruption)
    }

    /// Name used for ordering and display; an absent name reads as empty.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Counters reported by the backend after a lottery run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryRunSummary {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total_students: u32,
    #[serde(default)]
    pub premium_rooms: u32,
    #[serde(default)]
    pub single_rooms: u32,
    #[serde(default)]
    pub double_rooms: u32,
}
