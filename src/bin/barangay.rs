//! barangay CLI — operator interface to the complaints and projects records.
//!
//! Records are loaded from the seed file on every run and changes are
//! printed, not saved.

use barangay::config::Config;
use barangay::dashboard::{Dashboard, TransitionOutcome};
use barangay::lifecycle::{FormInput, InputKind, ProgressDeletion, ProgressInput};
use barangay::model::{Complaint, ComplaintStatus, Image, Project, ProjectStatus};
use barangay::seed::Seed;
use barangay::telemetry::{TelemetryConfig, init_telemetry};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "barangay", about = "Barangay complaints and projects dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Complaint operations
    Complaint {
        #[command(subcommand)]
        action: ComplaintAction,
    },
    /// Project operations
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
}

#[derive(Subcommand)]
enum ComplaintAction {
    /// List complaints
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
    },
    /// Show a complaint as JSON
    Show {
        /// Complaint ID (full UUID or prefix)
        id: String,
    },
    /// Change a complaint's status
    Status {
        /// Complaint ID (full UUID or prefix)
        id: String,
        /// Target status
        target: String,
        /// Date work is scheduled for (target `scheduled`)
        #[arg(long)]
        scheduled_date: Option<String>,
        /// How it was resolved (target `resolved`)
        #[arg(long)]
        description: Option<String>,
        /// Amount spent on the resolution, in pesos
        #[arg(long)]
        budget: Option<f64>,
        /// Resolution photo URL; repeatable
        #[arg(long = "image")]
        images: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List projects
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
    },
    /// Show a project as JSON
    Show {
        /// Project ID (full UUID or prefix)
        id: String,
    },
    /// Change a project's status
    Status {
        /// Project ID (full UUID or prefix)
        id: String,
        /// Target status
        target: String,
    },
    /// Append a progress update
    Progress {
        /// Project ID (full UUID or prefix)
        id: String,
        #[arg(long)]
        description: Option<String>,
        /// Photo URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove progress updates by index, all at once
    RemoveProgress {
        /// Project ID (full UUID or prefix)
        id: String,
        /// Index of an update to remove; repeatable
        #[arg(long = "index", required = true)]
        indices: Vec<usize>,
    },
    /// Set the progress percentage
    Percentage {
        /// Project ID (full UUID or prefix)
        id: String,
        /// 0 to 100
        percentage: u8,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "barangay".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let seed = Seed::load(&config.seed_path)?;
    let mut dashboard = Dashboard::from_seed(seed, config.policy)?;

    match cli.command {
        Command::Complaint { action } => match action {
            ComplaintAction::List { status } => cmd_complaint_list(&dashboard, status),
            ComplaintAction::Show { id } => print_json(&dashboard.find_complaint(&id)?),
            ComplaintAction::Status {
                id,
                target,
                scheduled_date,
                description,
                budget,
                images,
            } => {
                let form = FormInput {
                    scheduled_date,
                    description,
                    budget,
                    images,
                };
                cmd_complaint_status(&mut dashboard, &id, &target, form)
            }
        },
        Command::Project { action } => match action {
            ProjectAction::List { status } => cmd_project_list(&dashboard, status),
            ProjectAction::Show { id } => print_json(&dashboard.find_project(&id)?),
            ProjectAction::Status { id, target } => {
                let project = dashboard.find_project(&id)?;
                let outcome = dashboard.change_project_status_str(project.id, &target)?;
                report(outcome)
            }
            ProjectAction::Progress {
                id,
                description,
                image,
            } => {
                let project = dashboard.find_project(&id)?;
                let input = ProgressInput {
                    description,
                    image: image.map(Image::new),
                };
                print_json(&dashboard.append_progress(project.id, input)?)
            }
            ProjectAction::RemoveProgress { id, indices } => {
                let project = dashboard.find_project(&id)?;
                let deletion: ProgressDeletion = indices.into_iter().collect();
                let outcome = dashboard.remove_progress(project.id, &deletion)?;
                report(outcome)
            }
            ProjectAction::Percentage { id, percentage } => {
                let project = dashboard.find_project(&id)?;
                let outcome = dashboard.set_progress_percentage(project.id, percentage)?;
                report(outcome)
            }
        },
    }
}

fn cmd_complaint_list(dashboard: &Dashboard, status: Option<String>) -> anyhow::Result<()> {
    let filter: Option<ComplaintStatus> = status.map(|s| s.parse()).transpose()?;
    let complaints = dashboard.complaints(filter);

    if complaints.is_empty() {
        println!("No complaints found.");
        return Ok(());
    }

    println!(
        "{:<8}  {:<12}  {:<12}  {:<36}  FILED",
        "ID", "STATUS", "CATEGORY", "TITLE"
    );
    println!("{}", "-".repeat(90));
    for complaint in &complaints {
        print_complaint_row(complaint);
    }
    println!("\n{} complaint(s)", complaints.len());
    Ok(())
}

fn print_complaint_row(complaint: &Complaint) {
    println!(
        "{:<8}  {:<12}  {:<12}  {:<36}  {}",
        complaint.id,
        complaint.status,
        truncate(&complaint.category, 12),
        truncate(&complaint.title, 36),
        complaint.created_at.format("%Y-%m-%d %H:%M")
    );
}

fn cmd_complaint_status(
    dashboard: &mut Dashboard,
    id: &str,
    target: &str,
    form: FormInput,
) -> anyhow::Result<()> {
    let complaint = dashboard.find_complaint(id)?;
    let outcome = dashboard.submit_complaint_form(complaint.id, target, form)?;
    report(outcome)
}

fn cmd_project_list(dashboard: &Dashboard, status: Option<String>) -> anyhow::Result<()> {
    let filter: Option<ProjectStatus> = status.map(|s| s.parse()).transpose()?;
    let projects = dashboard.projects(filter);

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    println!(
        "{:<8}  {:<10}  {:>4}  {:<36}  BUDGET",
        "ID", "STATUS", "PCT", "TITLE"
    );
    println!("{}", "-".repeat(90));
    for project in &projects {
        print_project_row(project);
    }
    println!("\n{} project(s)", projects.len());
    Ok(())
}

fn print_project_row(project: &Project) {
    println!(
        "{:<8}  {:<10}  {:>3}%  {:<36}  {:.2}",
        project.id,
        project.status,
        project.progress_percentage,
        truncate(&project.title, 36),
        project.budget
    );
}

/// Print an applied change, or explain why nothing changed.
fn report<E: Serialize>(outcome: TransitionOutcome<E>) -> anyhow::Result<()> {
    match outcome {
        TransitionOutcome::Applied(entity) => print_json(&entity),
        TransitionOutcome::NeedsInput(kind) => {
            let hint = match kind {
                InputKind::ScheduledDate => "--scheduled-date",
                InputKind::ResolutionDetails => "--description",
            };
            anyhow::bail!("this transition needs {kind}; pass {hint}")
        }
        TransitionOutcome::Rejected(rejection) => anyhow::bail!("rejected: {rejection}"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
