mod dates;
mod db;
mod intake;
mod models;
mod sprint;

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use db::Database;
use intake::{IntakeInput, RawIntake};
use models::{ApplicationStatus, RoleType, Sprint};

#[derive(Parser)]
#[command(name = "pursuit")]
#[command(about = "Job application tracking - pipeline, chat-style intake, and interview prep sprints")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Add applications from free text (e.g. "Applied for zee5 - sdet role")
    Add {
        /// One or more entries; comma lists split into separate applications
        #[arg(required = true)]
        entries: Vec<String>,

        /// Role to use for every entry
        #[arg(short, long)]
        role: Option<String>,

        /// Status (applied, shortlisted, interview, offer, rejected)
        #[arg(short, long)]
        status: Option<String>,

        /// Notes to attach to every entry
        #[arg(short, long)]
        notes: Option<String>,

        /// Application date ("2026-03-01", "yesterday", "last friday", ...)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List applications
    List {
        /// Filter by status (applied, shortlisted, interview, offer, rejected)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Show application details
    Show {
        /// Application ID
        id: i64,
    },

    /// Move an application across the pipeline
    Status {
        /// Application ID
        id: i64,

        /// New status (applied, shortlisted, interview, offer, rejected)
        status: String,
    },

    /// Show the pipeline board
    Board,

    /// Manage interview prep sprints
    Sprint {
        #[command(subcommand)]
        command: SprintCommands,
    },
}

#[derive(Subcommand)]
enum SprintCommands {
    /// Generate a prep sprint for an upcoming interview
    Start {
        /// Application ID
        application_id: i64,

        /// Interview date ("2026-03-15", "next friday", "in 10 days", ...)
        #[arg(short, long)]
        date: String,

        /// Role category override (SDE, SDET, Data, PM, DevOps, Frontend)
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Show a sprint's daily plans
    Show {
        /// Application ID
        application_id: i64,
    },

    /// List all sprints
    List,

    /// Toggle a task done/undone
    Check {
        /// Application ID
        application_id: i64,

        /// Task ID (shown by 'sprint show')
        task_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let db = Database::open()?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Init => {
            db.init()?;
            println!("Database initialized at {}", db.path().display());
        }

        Commands::Add {
            entries,
            role,
            status,
            notes,
            date,
        } => {
            db.ensure_initialized()?;

            let inputs: Vec<IntakeInput> = entries
                .iter()
                .map(|text| {
                    if role.is_none() && status.is_none() && notes.is_none() && date.is_none() {
                        IntakeInput::from(text.as_str())
                    } else {
                        IntakeInput::from(RawIntake {
                            company: Some(text.clone()),
                            role: role.clone(),
                            status: status.clone(),
                            notes: notes.clone(),
                            applied_on: date.clone(),
                        })
                    }
                })
                .collect();

            let apps = intake::normalize_applications_for_creation(&inputs, today);
            if apps.is_empty() {
                println!("Could not extract any company names. Nothing added.");
                return Ok(());
            }

            println!("{:<6} {:<24} {:<20} {:<12} {:<12}", "ID", "COMPANY", "ROLE", "STATUS", "APPLIED");
            println!("{}", "-".repeat(78));
            for app in &apps {
                let id = db.create_application(app)?;
                println!(
                    "{:<6} {:<24} {:<20} {:<12} {:<12}",
                    id,
                    truncate(&app.company, 22),
                    truncate(app.role.as_deref().unwrap_or("-"), 18),
                    app.status.unwrap_or(ApplicationStatus::Applied).as_str(),
                    app.applied_on.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("\nAdded {} application(s)", apps.len());
        }

        Commands::List { status } => {
            db.ensure_initialized()?;
            let status = match status.as_deref() {
                Some(s) => Some(
                    ApplicationStatus::parse(s).ok_or_else(|| anyhow!("Unknown status '{}'", s))?,
                ),
                None => None,
            };
            let apps = db.list_applications(status)?;
            if apps.is_empty() {
                println!("No applications found.");
            } else {
                println!("{:<6} {:<12} {:<24} {:<20} {:<12}", "ID", "STATUS", "COMPANY", "ROLE", "APPLIED");
                println!("{}", "-".repeat(78));
                for app in apps {
                    println!(
                        "{:<6} {:<12} {:<24} {:<20} {:<12}",
                        app.id,
                        app.status.as_str(),
                        truncate(&app.company, 22),
                        truncate(app.role.as_deref().unwrap_or("-"), 18),
                        app.applied_on.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                    );
                }
            }
        }

        Commands::Show { id } => {
            db.ensure_initialized()?;
            match db.get_application(id)? {
                Some(app) => {
                    println!("Application #{}", app.id);
                    println!("Company: {}", app.company);
                    if let Some(role) = &app.role {
                        println!("Role: {}", role);
                    }
                    println!("Status: {}", app.status.as_str());
                    if let Some(date) = app.applied_on {
                        println!("Applied: {}", date);
                    }
                    if let Some(notes) = &app.notes {
                        println!("Notes: {}", notes);
                    }
                    println!("Created: {}", app.created_at);
                    if let Some(sprint) = db.get_sprint_for_application(app.id)? {
                        let (done, total) = sprint.progress();
                        println!(
                            "\nSprint: {} days until {} ({}; {}/{} tasks done)",
                            sprint.total_days,
                            sprint.interview_date,
                            sprint.status.as_str(),
                            done,
                            total
                        );
                    }
                }
                None => {
                    println!("Application #{} not found.", id);
                }
            }
        }

        Commands::Status { id, status } => {
            db.ensure_initialized()?;
            let status = ApplicationStatus::parse(&status)
                .ok_or_else(|| anyhow!("Unknown status '{}'", status))?;
            db.set_application_status(id, status)?;
            println!("Application #{} moved to '{}'.", id, status.as_str());
            if status == ApplicationStatus::Interview {
                println!("Tip: 'pursuit sprint start {} --date <interview date>' to generate a prep plan.", id);
            }
        }

        Commands::Board => {
            db.ensure_initialized()?;
            let counts = db.board_counts()?;
            println!("{:<14} {:>6}", "COLUMN", "COUNT");
            println!("{}", "-".repeat(21));
            for (status, count) in counts {
                println!("{:<14} {:>6}", status.as_str(), count);
            }
        }

        Commands::Sprint { command } => {
            db.ensure_initialized()?;
            match command {
                SprintCommands::Start {
                    application_id,
                    date,
                    role,
                } => {
                    let app = db
                        .get_application(application_id)?
                        .ok_or_else(|| anyhow!("Application #{} not found", application_id))?;

                    let interview_date = dates::parse_date_expression(&date, today)
                        .ok_or_else(|| anyhow!("Could not understand date '{}'", date))?;

                    let role_type = match role.as_deref().or(app.role.as_deref()) {
                        Some(label) => {
                            RoleType::parse(label).unwrap_or_else(|| RoleType::from_role_label(label))
                        }
                        None => RoleType::Other,
                    };

                    let sprint =
                        sprint::generate_sprint(application_id, interview_date, role_type, today);
                    db.replace_sprint(&sprint)?;

                    println!(
                        "Sprint for {} ({}): {} day(s) until {}",
                        app.company,
                        role_type.as_str(),
                        sprint.total_days,
                        interview_date
                    );
                    print_sprint(&sprint);
                }

                SprintCommands::Show { application_id } => {
                    match db.get_sprint_for_application(application_id)? {
                        Some(sprint) => print_sprint(&sprint),
                        None => println!("No sprint for application #{}.", application_id),
                    }
                }

                SprintCommands::List => {
                    let sprints = db.list_sprints()?;
                    if sprints.is_empty() {
                        println!("No sprints found.");
                    } else {
                        println!("{:<6} {:<12} {:<10} {:<6} {:<10} {:>9}", "APP", "INTERVIEW", "ROLE", "DAYS", "STATUS", "PROGRESS");
                        println!("{}", "-".repeat(58));
                        for sprint in sprints {
                            let (done, total) = sprint.progress();
                            println!(
                                "{:<6} {:<12} {:<10} {:<6} {:<10} {:>4}/{:<4}",
                                sprint.application_id,
                                sprint.interview_date.to_string(),
                                sprint.role_type.as_str(),
                                sprint.total_days,
                                sprint.status.as_str(),
                                done,
                                total
                            );
                        }
                    }
                }

                SprintCommands::Check {
                    application_id,
                    task_id,
                } => {
                    let mut sprint = db
                        .get_sprint_for_application(application_id)?
                        .ok_or_else(|| anyhow!("No sprint for application #{}", application_id))?;

                    let full_id = resolve_task_id(&sprint, &task_id)?;
                    if !sprint::toggle_task(&mut sprint, &full_id) {
                        return Err(anyhow!("Task '{}' not found in this sprint", task_id));
                    }
                    sprint::recompute_status(&mut sprint, today);
                    db.replace_sprint(&sprint)?;

                    let (done, total) = sprint.progress();
                    println!(
                        "{}/{} tasks done - sprint is {}",
                        done,
                        total,
                        sprint.status.as_str()
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_sprint(sprint: &Sprint) {
    let (done, total) = sprint.progress();
    let pct = if total == 0 { 0 } else { done * 100 / total };
    println!(
        "Sprint {} - {} - {}% complete",
        truncate(&sprint.id, 8),
        sprint.status.as_str(),
        pct
    );
    for plan in &sprint.daily_plans {
        let mark = if plan.is_complete() { "x" } else { " " };
        println!(
            "\n[{}] Day {} ({}) - {}",
            mark,
            plan.day,
            plan.date,
            plan.focus.as_str()
        );
        for block in &plan.blocks {
            println!("  {} ({})", block.kind.as_str(), block.duration);
            for task in &block.tasks {
                let mark = if task.completed { "x" } else { " " };
                println!("    [{}] {}  ({})", mark, task.description, truncate(&task.id, 8));
            }
        }
    }
}

// Task ids print truncated, so accept any unambiguous prefix.
fn resolve_task_id(sprint: &Sprint, prefix: &str) -> Result<String> {
    let matches: Vec<&str> = sprint
        .daily_plans
        .iter()
        .flat_map(|d| d.blocks.iter())
        .flat_map(|b| b.tasks.iter())
        .map(|t| t.id.as_str())
        .filter(|id| id.starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok((*id).to_string()),
        [] => Err(anyhow!("Task '{}' not found in this sprint", prefix)),
        _ => Err(anyhow!("Task id '{}' is ambiguous ({} matches)", prefix, matches.len())),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
