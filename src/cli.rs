/// CLI argument parsing and command handling.
use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::auth::{self, Principal};
use crate::dashboard::{self, PageRequest, WeekDetail, WeekFilter, WeekPage};
use crate::db::SqliteStore;
use crate::engine::{Applied, WEEKLY_TARGET};
use crate::import;
use crate::service::Timesheets;
use crate::types::{EntryDraft, EntryPatch, Status};
use crate::TimesheetError;

#[derive(Parser)]
#[command(
    name = "timesheet",
    version,
    about = "Timesheet - weekly employee timesheets"
)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "TIMESHEET_DB", global = true)]
    pub db: Option<PathBuf>,
    #[arg(long, env = "TIMESHEET_EMAIL", global = true)]
    pub email: Option<String>,
    #[arg(long, env = "TIMESHEET_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Check the configured credentials
    Login,
    Week {
        #[command(subcommand)]
        command: WeekCommand,
    },
    Entry {
        #[command(subcommand)]
        command: EntryCommand,
    },
    /// Import the legacy JSON data files
    Import {
        weeks: PathBuf,
        entries: PathBuf,
        #[arg(short = 'u', long = "users")]
        users: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Add {
        #[arg(value_name = "EMAIL")]
        new_email: String,
        #[arg(value_name = "PASSWORD")]
        new_password: String,
        #[arg(short = 'n', long = "name")]
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum WeekCommand {
    /// Open a new week starting on the given Monday
    Add { start: NaiveDate },
    List {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(short = 's', long = "status")]
        status: Option<Status>,
        #[arg(short = 'p', long = "page", default_value_t = 1)]
        page: usize,
        #[arg(long = "per-page", default_value_t = dashboard::DEFAULT_PAGE_SIZE)]
        per_page: usize,
    },
    Show { id: String },
    /// Recompute stored totals and status from the week's entries
    Recompute { id: String },
}

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    Add {
        week: String,
        date: NaiveDate,
        project: String,
        hours: u32,
        description: String,
        #[arg(short = 'w', long = "work-type")]
        work_type: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short = 'w', long = "work-type")]
        work_type: Option<String>,
    },
    Delete { id: String },
}

/// Execute a CLI command against the store.
pub fn run(cli: Cli, store: SqliteStore) -> Result<()> {
    let service = Timesheets::new(store);
    let credentials = (cli.email, cli.password);
    match cli.command {
        Command::User {
            command:
                UserCommand::Add {
                    new_email,
                    new_password,
                    name,
                },
        } => {
            let user = auth::register_user(service.store(), &new_email, name, &new_password)?;
            println!("Registered {}", user.email);
        }
        Command::Login => {
            let principal = login(&service, credentials)?;
            println!("Logged in as {}", principal.name());
        }
        Command::Week { command } => handle_week(command, &service, credentials)?,
        Command::Entry { command } => {
            let principal = login(&service, credentials)?;
            handle_entry(command, &service, &principal)?;
        }
        Command::Import {
            weeks,
            entries,
            users,
        } => {
            let summary =
                import::import_files(service.store(), &weeks, &entries, users.as_deref())?;
            println!(
                "Imported {} weeks, {} entries, {} users",
                summary.weeks, summary.entries, summary.users
            );
            if summary.orphaned > 0 {
                println!("Skipped {} entries of unknown weeks", summary.orphaned);
            }
            if summary.invalid_hours > 0 {
                println!("Skipped {} entries with invalid hours", summary.invalid_hours);
            }
            if summary.over_cap_days > 0 {
                println!(
                    "{} imported days already exceed the daily cap",
                    summary.over_cap_days
                );
            }
        }
    }
    Ok(())
}

type Credentials = (Option<String>, Option<String>);

fn login(service: &Timesheets<SqliteStore>, credentials: Credentials) -> Result<Principal> {
    let (Some(email), Some(password)) = credentials else {
        bail!("credentials required: pass --email and --password or set TIMESHEET_EMAIL and TIMESHEET_PASSWORD");
    };
    match auth::authenticate(service.store(), &email, &password)? {
        Some(principal) => Ok(principal),
        None => Err(TimesheetError::Unauthorized.into()),
    }
}

fn handle_week(
    command: WeekCommand,
    service: &Timesheets<SqliteStore>,
    credentials: Credentials,
) -> Result<()> {
    let principal = login(service, credentials)?;
    match command {
        WeekCommand::Add { start } => {
            let week = service.create_week(&principal, start)?;
            println!(
                "Created week {} ({}) with id {}",
                week.week,
                dashboard::format_range(week.start_date, week.end_date),
                week.id
            );
        }
        WeekCommand::List {
            from,
            to,
            status,
            page,
            per_page,
        } => {
            let filter = WeekFilter { from, to, status };
            let page = service.list_weeks(&filter, PageRequest { page, per_page })?;
            print_week_page(&page);
        }
        WeekCommand::Show { id } => print_week_detail(&service.week_detail(&id)?),
        WeekCommand::Recompute { id } => {
            let week = service.recompute_week(&principal, &id)?;
            println!("Week {}: {}/{} hrs, {}", week.week, week.total_hours, WEEKLY_TARGET, week.status);
        }
    }
    Ok(())
}

fn handle_entry(
    command: EntryCommand,
    service: &Timesheets<SqliteStore>,
    principal: &Principal,
) -> Result<()> {
    match command {
        EntryCommand::Add {
            week,
            date,
            project,
            hours,
            description,
            work_type,
        } => {
            let draft = EntryDraft {
                date,
                project,
                work_type,
                description,
                hours,
            };
            let applied = service.add_entry(principal, &week, draft)?;
            print_applied("Added", &applied);
        }
        EntryCommand::Edit {
            id,
            date,
            project,
            hours,
            description,
            work_type,
        } => {
            let patch = EntryPatch {
                date,
                project,
                work_type,
                description,
                hours,
            };
            if patch.is_empty() {
                println!("Nothing to change for entry '{id}'");
                return Ok(());
            }
            let applied = service.edit_entry(principal, &id, patch)?;
            print_applied("Updated", &applied);
        }
        EntryCommand::Delete { id } => {
            let applied = service.delete_entry(principal, &id)?;
            println!("Deleted entry '{id}'");
            print_applied("Week", &applied);
        }
    }
    Ok(())
}

fn print_applied(verb: &str, applied: &Applied) {
    if let Some(entry) = &applied.entry {
        println!(
            "{verb} entry '{}' on {}: {} hrs {}",
            entry.id, entry.date, entry.hours, entry.project
        );
    }
    println!(
        "Week {} now at {}/{} hrs ({})",
        applied.week.week, applied.week.total_hours, WEEKLY_TARGET, applied.week.status
    );
}

fn print_week_page(page: &WeekPage) {
    if page.items.is_empty() {
        println!("No weeks found");
        return;
    }
    for week in &page.items {
        println!(
            "{:<38} week {:>2}  {:<24} {:>2}/{} hrs  {}",
            week.id,
            week.week,
            dashboard::format_range(week.start_date, week.end_date),
            week.total_hours,
            WEEKLY_TARGET,
            week.status
        );
    }
    if page.total_pages > 1 {
        println!(
            "Showing {}-{} of {} (page {}/{})",
            page.first_item, page.last_item, page.total_items, page.page, page.total_pages
        );
    }
}

fn print_week_detail(detail: &WeekDetail) {
    println!(
        "Week {} ({}): {}/{} hrs, {} [{:.0}%]",
        detail.week.week,
        dashboard::format_range(detail.week.start_date, detail.week.end_date),
        detail.total_hours,
        WEEKLY_TARGET,
        detail.status,
        detail.progress * 100.0
    );
    for day in &detail.days {
        let marker = if day.can_add_more { "" } else { "  (daily limit reached)" };
        println!("{:<7} {} hrs{marker}", dashboard::format_day(day.date), day.total);
        for entry in &day.entries {
            println!(
                "    {} hrs  {:<9} {}  [{}]",
                entry.hours, entry.project, entry.description, entry.id
            );
        }
    }
    for entry in &detail.off_grid {
        println!(
            "{:<7} {} hrs  {:<9} {}  [{}]",
            dashboard::format_day(entry.date),
            entry.hours,
            entry.project,
            entry.description,
            entry.id
        );
    }
}
