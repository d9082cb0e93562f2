use std::collections::BTreeSet;
use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Assignment, LotteryScope};
use super::ranking::{classify, rank, RankingPolicy, RoomBadge, Tier};

/// One row of the results board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub position: usize,
    #[serde(flatten)]
    pub assignment: Assignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    pub badge: Option<RoomBadge>,
    pub status: &'static str,
    pub gpa_display: String,
}

/// Ranked assignments plus the headline counters shown above them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub scope: LotteryScope,
    pub policy: RankingPolicy,
    pub generated_at: DateTime<Utc>,
    pub total_students: usize,
    pub rooms_assigned: usize,
    pub entries: Vec<RankedEntry>,
}

impl ResultsView {
    pub fn build(
        scope: LotteryScope,
        assignments: &[Assignment],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let policy = scope.ranking_policy();
        let rooms_assigned = assignments
            .iter()
            .map(|assignment| assignment.room_number)
            .collect::<BTreeSet<_>>()
            .len();

        let entries = rank(policy, assignments)
            .into_iter()
            .enumerate()
            .map(|(index, assignment)| RankedEntry {
                position: index + 1,
                tier: match policy {
                    RankingPolicy::Priority => Some(classify(&assignment)),
                    RankingPolicy::RoomOrder => None,
                },
                badge: RoomBadge::for_assignment(&assignment),
                status: assignment.status().label(),
                gpa_display: format!("{:.2}", assignment.gpa),
                assignment,
            })
            .collect();

        Self {
            scope,
            policy,
            generated_at,
            total_students: assignments.len(),
            rooms_assigned,
            entries,
        }
    }

    /// Writes the ranked rows as CSV with a header line.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "position",
            "room_number",
            "room_type",
            "student_id",
            "name",
            "gpa",
            "status",
            "badge",
            "roommate_id",
        ])?;

        for entry in &self.entries {
            let assignment = &entry.assignment;
            csv.write_record([
                entry.position.to_string(),
                assignment.room_number.to_string(),
                assignment.room_type.label().to_string(),
                assignment.student_id.to_string(),
                assignment.display_name().to_string(),
                entry.gpa_display.clone(),
                entry.status.to_string(),
                entry
                    .badge
                    .map(|badge| badge.label().to_string())
                    .unwrap_or_default(),
                assignment
                    .roommate_id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }
}
