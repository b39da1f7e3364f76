use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use timesheet::{cli, db};

fn main() -> Result<()> {
    init_logging();

    let cli_opts = cli::Cli::parse();
    let db_path = cli_opts.db.clone().unwrap_or_else(db::default_db_path);
    let store = db::init(&db_path)?;
    cli::run(cli_opts, store)
}

/// Human-readable logs on stderr, or JSON lines when `LOG_FORMAT=json`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}
