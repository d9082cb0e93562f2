use std::sync::{Arc, Mutex};

use axum::async_trait;

use crate::lottery::domain::{
    Assignment, LotteryRunSummary, LotteryScope, NewStudent, RoomType, Student, StudentId,
    StudentStatus,
};
use crate::lottery::registration::FLAG_CAP;
use crate::lottery::service::{LotteryService, LotteryServiceError};
use crate::lottery::LotteryFrontDesk;

pub(super) fn student(id: &str, name: &str, gpa: f64, status: StudentStatus) -> Student {
    Student {
        id: StudentId(id.to_string()),
        name: name.to_string(),
        gpa,
        disabled: status.disabled(),
        corruption: status.corruption(),
    }
}

pub(super) fn assignment(
    id: u64,
    room_number: u32,
    room_type: RoomType,
    gpa: f64,
    status: StudentStatus,
) -> Assignment {
    Assignment {
        id,
        student_id: StudentId(format!("stu-{id:03}")),
        name: Some(format!("Student {id}")),
        gpa,
        corruption: status.corruption(),
        disabled: status.disabled(),
        room_number,
        room_type,
        roommate_id: None,
        roommate_name: None,
    }
}

pub(super) fn named(mut assignment: Assignment, name: Option<&str>) -> Assignment {
    assignment.name = name.map(str::to_string);
    assignment
}

/// Snapshot shaped like a finished ten student realtime run.
pub(super) fn realtime_board() -> Vec<Assignment> {
    vec![
        assignment(1, 1, RoomType::Premium, 2.4, StudentStatus::Corrupt),
        assignment(2, 2, RoomType::Single, 3.9, StudentStatus::Regular),
        assignment(3, 3, RoomType::Single, 2.1, StudentStatus::Disabled),
        assignment(4, 4, RoomType::Single, 1.7, StudentStatus::Regular),
        assignment(5, 5, RoomType::Regular, 3.6, StudentStatus::Regular),
        assignment(6, 5, RoomType::Regular, 2.2, StudentStatus::Regular),
        assignment(7, 6, RoomType::Regular, 3.8, StudentStatus::Regular),
        assignment(8, 6, RoomType::Regular, 3.0, StudentStatus::Regular),
        assignment(9, 7, RoomType::Regular, 1.2, StudentStatus::Regular),
        assignment(10, 7, RoomType::Regular, 0.8, StudentStatus::Regular),
    ]
}

#[derive(Default)]
struct MemoryState {
    students: Vec<Student>,
    assignments: Vec<Assignment>,
    next_id: u32,
    roster_reads: usize,
}

/// In-process lottery service. `create_student` re-checks the flag caps under the same lock
/// that performs the insert, unless built `uncapped` like the pre-data backend.
#[derive(Default)]
pub(super) struct MemoryLotteryService {
    state: Mutex<MemoryState>,
    max_students: Option<usize>,
    roster_unavailable: bool,
    uncapped: bool,
    yield_on_create: bool,
}

impl MemoryLotteryService {
    pub(super) fn with_students(students: Vec<Student>) -> Self {
        let next_id = students.len() as u32;
        Self {
            state: Mutex::new(MemoryState {
                students,
                next_id,
                ..MemoryState::default()
            }),
            ..Self::default()
        }
    }

    pub(super) fn with_assignments(assignments: Vec<Assignment>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                assignments,
                ..MemoryState::default()
            }),
            ..Self::default()
        }
    }

    pub(super) fn limited_to(mut self, max_students: usize) -> Self {
        self.max_students = Some(max_students);
        self
    }

    pub(super) fn without_roster(mut self) -> Self {
        self.roster_unavailable = true;
        self
    }

    pub(super) fn uncapped(mut self) -> Self {
        self.uncapped = true;
        self
    }

    /// Creates suspend once before touching state, letting concurrent calls interleave.
    pub(super) fn yielding(mut self) -> Self {
        self.yield_on_create = true;
        self
    }

    pub(super) fn students(&self) -> Vec<Student> {
        self.state.lock().expect("state mutex poisoned").students.clone()
    }

    pub(super) fn roster_reads(&self) -> usize {
        self.state.lock().expect("state mutex poisoned").roster_reads
    }
}

#[async_trait]
impl LotteryService for MemoryLotteryService {
    async fn list_students(&self) -> Result<Vec<Student>, LotteryServiceError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        state.roster_reads += 1;
        if self.roster_unavailable {
            return Err(LotteryServiceError::Transport(
                "connection refused".to_string(),
            ));
        }
        Ok(state.students.clone())
    }

    async fn create_student(&self, student: &NewStudent) -> Result<Student, LotteryServiceError> {
        if self.yield_on_create {
            tokio::task::yield_now().await;
        }
        let mut state = self.state.lock().expect("state mutex poisoned");
        if let Some(max) = self.max_students {
            if state.students.len() >= max {
                return Err(LotteryServiceError::Capacity(format!(
                    "Maximum {max} students allowed"
                )));
            }
        }
        let capped = !self.uncapped;
        if capped
            && student.disabled
            && state.students.iter().filter(|s| s.disabled).count() >= FLAG_CAP
        {
            return Err(LotteryServiceError::Capacity(
                "disabled seat already taken".to_string(),
            ));
        }
        if capped
            && student.corruption
            && state.students.iter().filter(|s| s.corruption).count() >= FLAG_CAP
        {
            return Err(LotteryServiceError::Capacity(
                "corrupt seat already taken".to_string(),
            ));
        }

        state.next_id += 1;
        let id = StudentId(format!("stu-{:03}", state.next_id));
        let created = student.clone().into_student(id);
        state.students.push(created.clone());
        Ok(created)
    }

    async fn delete_student(&self, id: &StudentId) -> Result<(), LotteryServiceError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        let before = state.students.len();
        state.students.retain(|student| &student.id != id);
        if state.students.len() == before {
            return Err(LotteryServiceError::NotFound(format!("student {id}")));
        }
        Ok(())
    }

    async fn run_lottery(&self) -> Result<LotteryRunSummary, LotteryServiceError> {
        let state = self.state.lock().expect("state mutex poisoned");
        let count_of =
            |kind: RoomType| state.assignments.iter().filter(|a| a.room_type == kind).count() as u32;
        Ok(LotteryRunSummary {
            message: "lottery completed".to_string(),
            total_students: state.assignments.len() as u32,
            premium_rooms: count_of(RoomType::Premium),
            single_rooms: count_of(RoomType::Single),
            double_rooms: count_of(RoomType::Regular) / 2,
        })
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, LotteryServiceError> {
        Ok(self.state.lock().expect("state mutex poisoned").assignments.clone())
    }

    async fn clear_all(&self) -> Result<(), LotteryServiceError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        state.students.clear();
        state.assignments.clear();
        Ok(())
    }
}

/// Service whose every call fails as if the backend were down.
pub(super) struct UnreachableService;

#[async_trait]
impl LotteryService for UnreachableService {
    async fn list_students(&self) -> Result<Vec<Student>, LotteryServiceError> {
        Err(unreachable())
    }

    async fn create_student(&self, _student: &NewStudent) -> Result<Student, LotteryServiceError> {
        Err(unreachable())
    }

    async fn delete_student(&self, _id: &StudentId) -> Result<(), LotteryServiceError> {
        Err(unreachable())
    }

    async fn run_lottery(&self) -> Result<LotteryRunSummary, LotteryServiceError> {
        Err(unreachable())
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, LotteryServiceError> {
        Err(unreachable())
    }

    async fn clear_all(&self) -> Result<(), LotteryServiceError> {
        Err(unreachable())
    }
}

fn unreachable() -> LotteryServiceError {
    LotteryServiceError::Transport("connection refused".to_string())
}

pub(super) fn desk_for<S>(scope: LotteryScope, service: S) -> (Arc<LotteryFrontDesk<S>>, Arc<S>)
where
    S: LotteryService + 'static,
{
    let service = Arc::new(service);
    let desk = Arc::new(LotteryFrontDesk::new(scope, service.clone()));
    (desk, service)
}
