use crate::infra::http_desk;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use dorm_lottery::config::AppConfig;
use dorm_lottery::error::AppError;
use dorm_lottery::lottery::{
    HttpLotteryService, LotteryFrontDesk, LotteryScope, RegistrationCandidate, ResultsView,
    SessionId, StudentId, StudentStatus,
};
use dorm_lottery::telemetry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScopeArgs {
    /// Lottery pool: pre-data or realtime
    pub(crate) scope: LotteryScope,
}

#[derive(Args, Debug)]
pub(crate) struct ResultsArgs {
    /// Lottery pool: pre-data or realtime
    pub(crate) scope: LotteryScope,
    /// Write the ranked board as CSV to stdout instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RegisterArgs {
    /// Lottery pool: pre-data or realtime
    pub(crate) scope: LotteryScope,
    /// Student name
    #[arg(long, default_value = "")]
    pub(crate) name: String,
    /// GPA as typed; validated by the registration gate
    #[arg(long, default_value = "")]
    pub(crate) gpa: String,
    /// regular, disabled or corrupt
    #[arg(long, default_value = "regular")]
    pub(crate) status: StudentStatus,
    /// File remembering that this session already registered (realtime only)
    #[arg(long)]
    pub(crate) session_file: Option<PathBuf>,
}

/// Registration marker kept between CLI invocations, one file per session.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    student_id: Option<StudentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registered_at: Option<DateTime<Utc>>,
}

impl SessionFile {
    fn load(path: &Path) -> Result<Self, AppError> {
        match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Self::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw).map_err(io::Error::from)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, path: &Path) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(self).map_err(io::Error::from)?;
        fs::write(path, raw)?;
        Ok(())
    }
}

fn desk(scope: LotteryScope) -> Result<LotteryFrontDesk<HttpLotteryService>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(http_desk(&config.lottery, scope))
}

pub(crate) async fn run_results(args: ResultsArgs) -> Result<(), AppError> {
    let view = desk(args.scope)?.results().await?;
    if args.csv {
        view.write_csv(io::stdout().lock())?;
    } else {
        render_results(&view);
    }
    Ok(())
}

pub(crate) async fn run_students(args: ScopeArgs) -> Result<(), AppError> {
    let students = desk(args.scope)?.roster().await?;

    println!("{} lottery roster ({} students)", args.scope, students.len());
    for student in &students {
        println!(
            "  {:<16} {:<24} {:>5.2}  {}",
            student.id,
            student.name,
            student.gpa,
            student.status().label()
        );
    }
    Ok(())
}

pub(crate) async fn run_register(args: RegisterArgs) -> Result<(), AppError> {
    let RegisterArgs {
        scope,
        name,
        gpa,
        status,
        session_file,
    } = args;

    let desk = desk(scope)?;
    let session = match &session_file {
        Some(path) => {
            let session = SessionId(path.display().to_string());
            if SessionFile::load(path)?.registered {
                desk.sessions().mark_registered(session.clone());
            }
            Some(session)
        }
        None => None,
    };
    let candidate = RegistrationCandidate::new(name, gpa, status);

    let student = desk.register(session.as_ref(), &candidate).await?;

    if let Some(path) = session_file.as_deref().filter(|_| scope.gated()) {
        SessionFile {
            registered: true,
            student_id: Some(student.id.clone()),
            registered_at: Some(Utc::now()),
        }
        .store(path)?;
    }

    println!(
        "Registered {} ({}) in the {} lottery as {}",
        student.name,
        student.id,
        scope,
        student.status().label()
    );
    Ok(())
}

pub(crate) async fn run_lottery(args: ScopeArgs) -> Result<(), AppError> {
    let summary = desk(args.scope)?.run_lottery().await?;

    println!("{} lottery run", args.scope);
    if !summary.message.is_empty() {
        println!("  {}", summary.message);
    }
    println!("  Students placed: {}", summary.total_students);
    println!("  Premium rooms:   {}", summary.premium_rooms);
    println!("  Single rooms:    {}", summary.single_rooms);
    println!("  Double rooms:    {}", summary.double_rooms);
    Ok(())
}

pub(crate) async fn run_clear(args: ScopeArgs) -> Result<(), AppError> {
    desk(args.scope)?.clear().await?;
    println!("{} lottery cleared", args.scope);
    Ok(())
}

fn render_results(view: &ResultsView) {
    println!(
        "{} lottery results ({} order), generated {}",
        view.scope,
        view.policy.label(),
        view.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    println!(
        "  Students: {}  Rooms assigned: {}",
        view.total_students, view.rooms_assigned
    );

    if view.entries.is_empty() {
        println!("  No assignments yet. Run the lottery first.");
        return;
    }

    for entry in &view.entries {
        let assignment = &entry.assignment;
        let roommate = assignment
            .roommate_name
            .as_deref()
            .map(str::to_string)
            .or_else(|| assignment.roommate_id.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>3}. {:<13} room {:<4} {:<8} {:<24} {:>5} {:<9} {:<22} roommate: {}",
            entry.position,
            entry.tier.map(|tier| tier.label()).unwrap_or("-"),
            assignment.room_number,
            assignment.room_type.label(),
            assignment.display_name(),
            entry.gpa_display,
            entry.status,
            entry.badge.map(|badge| badge.label()).unwrap_or(""),
            roommate
        );
    }
}
