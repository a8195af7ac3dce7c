//! Command-line entry point for one reconciliation run.
//!
//! # Responsibility
//! - Load configuration, bring up logging, verify page access and run
//!   the engine once.
//! - Map the failure taxonomy onto distinct exit statuses.

use clap::Parser;
use daycycle_core::config::{self, RunConfig};
use daycycle_core::{
    default_log_level, init_logging, DocumentGateway, EngineError, NotionGateway,
    ReconcileEngine,
};
use log::error;
use std::path::PathBuf;

const EXIT_CONFIG: i32 = 2;
const EXIT_ACCESS: i32 = 3;
const EXIT_STRUCTURE: i32 = 4;
const EXIT_TRANSPORT: i32 = 5;

/// Reconciles the sectioned to-do page through its daily cycle.
#[derive(Parser, Debug)]
#[command(name = "daycycle", version, about)]
struct Cli {
    /// Page id or page URL; overrides NOTION_PAGE_ID.
    #[arg(long)]
    page: Option<String>,

    /// Archived-item database id; overrides NOTION_DONE_DB_ID.
    #[arg(long)]
    done_db: Option<String>,

    /// Daily-completion database id; overrides NOTION_DAILY_COMP_DB_ID.
    #[arg(long)]
    completion_db: Option<String>,

    /// Log directory (absolute). Defaults to a per-user temp location.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    std::process::exit(run(Cli::parse()));
}

fn run(cli: Cli) -> i32 {
    config::load_env_files();
    let result = RunConfig::from_lookup(|key| {
        let override_value = match key {
            config::ENV_PAGE_ID => cli.page.clone(),
            config::ENV_DONE_STORE => cli.done_db.clone(),
            config::ENV_COMPLETION_STORE => cli.completion_db.clone(),
            _ => None,
        };
        override_value.or_else(|| std::env::var(key).ok())
    });
    let run_config = match result {
        Ok(run_config) => run_config,
        Err(err) => {
            eprintln!("daycycle: {err}");
            return EXIT_CONFIG;
        }
    };

    let log_dir = cli
        .log_dir
        .unwrap_or_else(|| std::env::temp_dir().join("daycycle-logs"));
    let level = cli
        .log_level
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&level, &log_dir.to_string_lossy()) {
        // A run without file logs is still worth more than no run.
        eprintln!("daycycle: logging disabled: {err}");
    }

    let gateway = match NotionGateway::new(run_config.token.clone()) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("daycycle: cannot build document client: {err}");
            return EXIT_TRANSPORT;
        }
    };

    if let Err(err) = gateway.verify_document(&run_config.page_id) {
        error!("event=verify_document module=cli status=error error={err}");
        eprintln!(
            "daycycle: cannot access page {}: {err}\n(a 404 can also mean the integration \
             is not invited to the page)",
            run_config.page_id
        );
        return EXIT_ACCESS;
    }

    let mut engine = ReconcileEngine::new(&gateway, run_config.page_id.clone());
    if let Some(store) = run_config.done_store {
        engine = engine.with_done_store(store);
    }
    if let Some(store) = run_config.completion_store {
        engine = engine.with_completion_store(store);
    }

    match engine.run() {
        Ok(report) => {
            println!("daycycle: done ({report})");
            0
        }
        Err(err @ EngineError::MissingSection(_))
        | Err(err @ EngineError::PlaceholderRepair(_)) => {
            error!("event=run module=cli status=structural error={err}");
            eprintln!("daycycle: {err}");
            EXIT_STRUCTURE
        }
        Err(err @ EngineError::Gateway(_)) => {
            error!("event=run module=cli status=transport error={err}");
            eprintln!("daycycle: {err}");
            EXIT_TRANSPORT
        }
    }
}
