use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod announcements;
mod config;
mod dashboard;
mod deadline;
mod error;
mod models;
mod parents;
mod record;
mod report;
mod snapshot;
mod summary;
mod teachers;

use config::{DashboardConfig, CONFIG_ENV};

#[derive(Parser)]
#[command(name = "metamorpet")]
#[command(
    about = "Student progress and classroom tools for the MetamorPET dashboard",
    long_about = None
)]
struct Cli {
    /// TOML file with display settings
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the latest weekly consistency for every student
    Summarize {
        #[arg(long)]
        students: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Split assignments into ongoing and past-deadline
    Assignments {
        #[arg(long)]
        input: PathBuf,
        /// Reference instant (RFC 3339); defaults to now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        #[arg(long)]
        json: bool,
    },
    /// Print chart series for the class or one student's routines
    Chart {
        #[arg(long)]
        students: PathBuf,
        /// Routine to compare across students; "All" for overall consistency
        #[arg(long)]
        routine: Option<String>,
        /// Student id whose routine breakdown to print instead
        #[arg(long, conflicts_with = "routine")]
        student: Option<String>,
    },
    /// Validate and print a new assignment document
    PostAssignment {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Validate a CSV of parents and build their registration documents
    RegisterParents {
        #[arg(long)]
        csv: PathBuf,
        /// JSON list of emails that already have an account
        #[arg(long)]
        registered: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate and print a new announcement document
    PostAnnouncement {
        /// Email of the signed-in teacher
        #[arg(long, env = "METAMORPET_TEACHER_EMAIL")]
        teacher_email: Option<String>,
        /// JSON account document of the posting teacher
        #[arg(long)]
        teacher: Option<PathBuf>,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        sub_desc: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "badge")]
        badges: Vec<String>,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Validate a teacher and print their account document
    RegisterTeacher {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = teachers::GRADE_LEVELS)]
        grade_level: String,
        #[arg(long, value_parser = teachers::SUBJECTS)]
        subject: String,
        /// JSON list of emails that already have a teacher account
        #[arg(long)]
        registered: Option<PathBuf>,
    },
    /// Generate a markdown progress report
    Report {
        #[arg(long)]
        students: PathBuf,
        #[arg(long)]
        assignments: PathBuf,
        #[arg(long)]
        routine: Option<String>,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_rows(path: &std::path::Path) -> anyhow::Result<Vec<models::StudentRow>> {
    let documents = snapshot::load_documents(path)
        .with_context(|| format!("failed to load students from {}", path.display()))?;
    Ok(documents
        .iter()
        .map(|(id, doc)| dashboard::build_student_row(id, doc))
        .collect())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = DashboardConfig::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Commands::Summarize { students, json } => {
            let rows = load_rows(&students)?;
            tracing::info!(students = rows.len(), "summarized student progress");

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            if rows.is_empty() {
                println!("No students found.");
                return Ok(());
            }
            for row in &rows {
                let date = row
                    .summary_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "- {} ({}) consistency {} [{}], {} completed / {} missed",
                    row.child_name,
                    row.grade_level,
                    summary::format_percent(row.weekly_consistency, config.clamp_display),
                    date,
                    row.daily_summary.total_completed,
                    row.daily_summary.total_missed
                );
            }
        }
        Commands::Assignments { input, now, json } => {
            let assignments = snapshot::load_assignments(&input)
                .with_context(|| format!("failed to load assignments from {}", input.display()))?;
            let partition = deadline::classify(assignments, now.unwrap_or_else(Utc::now));
            tracing::info!(
                ongoing = partition.ongoing.len(),
                past = partition.past.len(),
                "classified assignments"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&partition)?);
                return Ok(());
            }
            for (heading, list) in [
                ("Ongoing", &partition.ongoing),
                ("Past deadline", &partition.past),
            ] {
                println!("{heading}:");
                if list.is_empty() {
                    println!("  none");
                }
                for assignment in list {
                    println!(
                        "  - {} ({})",
                        assignment.title,
                        deadline::format_deadline(assignment.deadline.as_ref())
                    );
                }
            }
        }
        Commands::Chart {
            students,
            routine,
            student,
        } => {
            let rows = load_rows(&students)?;

            if let Some(id) = student {
                let row = rows
                    .iter()
                    .find(|row| row.id == id)
                    .with_context(|| format!("no student with id {id}"))?;
                let bars = dashboard::routine_chart(row);
                if bars.is_empty() {
                    println!("No routine data available for {}.", row.child_name);
                }
                for bar in bars {
                    println!("{}\t{}\t{}", bar.label, bar.value, bar.color);
                }
                return Ok(());
            }

            let selected = routine
                .or_else(|| config.default_routine.clone())
                .unwrap_or_else(|| dashboard::ALL_ROUTINES.to_string());
            println!("Routines: {}", dashboard::routine_options(&rows).join(", "));
            let series = dashboard::consistency_series(&rows, &selected);
            for (row, value) in rows.iter().zip(series) {
                println!("{}\t{}", row.child_name, value);
            }
        }
        Commands::PostAssignment {
            title,
            description,
            deadline: due,
            now,
        } => {
            let assignment = deadline::new_assignment(
                &title,
                &description,
                due.as_deref(),
                now.unwrap_or_else(Utc::now),
            )?;
            println!("{}", serde_json::to_string_pretty(&assignment)?);
        }
        Commands::RegisterParents {
            csv,
            registered,
            out,
        } => {
            let rows = parents::read_parent_csv(&csv)?;
            let existing = match registered {
                Some(path) => snapshot::load_email_list(&path)?,
                None => Vec::new(),
            };
            let report = parents::register_parents(&rows, existing.iter().map(String::as_str))?;

            for failure in &report.failures {
                println!("Row {}: {}", failure.row, failure.message);
            }
            println!("{}", report.summary_line());

            if let Some(out) = out {
                let documents: serde_json::Map<String, serde_json::Value> = report
                    .documents
                    .iter()
                    .map(|doc| Ok((doc.doc_id(), serde_json::to_value(doc)?)))
                    .collect::<serde_json::Result<_>>()?;
                std::fs::write(&out, serde_json::to_string_pretty(&documents)?)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("Parent documents written to {}.", out.display());
            }
        }
        Commands::PostAnnouncement {
            teacher_email,
            teacher,
            title,
            sub_desc,
            description,
            badges,
            now,
        } => {
            let profile = match teacher {
                Some(path) => {
                    let doc = snapshot::load_document(&path).with_context(|| {
                        format!("failed to load teacher from {}", path.display())
                    })?;
                    models::TeacherProfile::from_document(&doc)
                }
                None => models::TeacherProfile::default(),
            };
            let draft = announcements::AnnouncementDraft {
                title,
                sub_desc,
                description,
                badges,
            };
            let announcement = announcements::new_announcement(
                &draft,
                teacher_email.as_deref(),
                &profile,
                now.unwrap_or_else(Utc::now),
            )?;
            tracing::info!(id = %announcement.id, "announcement ready");
            println!("{}", serde_json::to_string_pretty(&announcement)?);
        }
        Commands::RegisterTeacher {
            email,
            name,
            grade_level,
            subject,
            registered,
        } => {
            let existing = match registered {
                Some(path) => snapshot::load_email_list(&path)?,
                None => Vec::new(),
            };
            let form = teachers::TeacherForm {
                email,
                name,
                grade_level,
                subject,
            };
            let document =
                teachers::register_teacher(&form, existing.iter().map(String::as_str))?;
            tracing::info!(email = %document.email, "teacher added");
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Report {
            students,
            assignments,
            routine,
            now,
            out,
        } => {
            let now = now.unwrap_or_else(Utc::now);
            let rows = load_rows(&students)?;
            let assignments = snapshot::load_assignments(&assignments).with_context(|| {
                format!("failed to load assignments from {}", assignments.display())
            })?;
            let partition = deadline::classify(assignments, now);
            let routine = routine.or_else(|| config.default_routine.clone());
            let report =
                report::build_report(&config, now, &rows, &partition, routine.as_deref());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
