mod activity;
mod audit;
mod cli;
mod config;
mod filter;
mod fixtures;
mod records;
mod stats;
mod view;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backoffice", about = "Admin console for users, creators, sellers and payouts")]
pub struct Args {
    #[arg(short, long, help = "Run ';'-separated console commands and exit")]
    pub command: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "BACKOFFICE_DATA", help = "JSON data file (overrides [data].file)")]
    pub data: Option<PathBuf>,

    #[arg(long, help = "Audit log directory")]
    pub audit_dir: Option<PathBuf>,

    #[arg(long, help = "Disable the audit log")]
    pub no_audit: bool,

    #[arg(long, env = "BACKOFFICE_CURRENCY", help = "Currency glyph for amounts")]
    pub currency: Option<String>,

    #[arg(long, help = "List saved views and exit")]
    pub list_views: bool,

    #[arg(long, help = "Verbose output (print commands as they run)")]
    pub verbose: bool,

    #[arg(long, help = "Debug output (print config and data sources)")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };

    // CLI flags override config
    if let Some(currency) = &args.currency {
        cfg.display.currency = currency.clone();
    }
    if let Some(data) = &args.data {
        cfg.data.file = Some(data.clone());
    }
    if let Some(dir) = &args.audit_dir {
        cfg.audit.dir = Some(dir.clone());
    }
    if args.no_audit {
        cfg.audit.enabled = false;
    }

    if let Err(errors) = cfg.validate() {
        for e in errors {
            eprintln!("Warning: config {}", e);
        }
    }

    if args.debug {
        eprintln!("[DEBUG] Config sources: {:?}", cfg.sources);
        eprintln!("[DEBUG] Currency: {}", cfg.display.currency);
        eprintln!("[DEBUG] Data file: {:?}", cfg.data.file);
        eprintln!("[DEBUG] Audit: enabled={} dir={:?}", cfg.audit.enabled, cfg.audit.dir);
        eprintln!("[DEBUG] Saved views: {:?}", cfg.views.keys().collect::<Vec<_>>());
    }

    if args.list_views {
        for (name, preset) in &cfg.views {
            match preset.to_filter() {
                Ok(filter) => println!("{}: {}", name, filter),
                Err(e) => println!("{}: invalid ({})", name, e),
            }
        }
        return Ok(());
    }

    let (data, data_source) = match &cfg.data.file {
        Some(path) => (
            fixtures::Dataset::load_from(path)?,
            path.display().to_string(),
        ),
        None => (fixtures::Dataset::builtin(), "builtin".to_string()),
    };

    if args.debug {
        eprintln!(
            "[DEBUG] Loaded {} people, {} withdrawals, {} tickets, {} calls from {}",
            data.people.len(),
            data.withdrawals.len(),
            data.tickets.len(),
            data.calls.len(),
            data_source
        );
    }

    let root = std::env::current_dir()?;
    let session_id = uuid::Uuid::new_v4().to_string();

    let audit = if cfg.audit.enabled {
        let mut log = audit::AuditLog::in_dir(&cfg.audit.dir_under(&root), &session_id)?;
        log.session_start(&data_source)?;
        if args.debug {
            eprintln!("[DEBUG] Audit log: {}", log.path.display());
        }
        Some(RefCell::new(log))
    } else {
        None
    };

    let ctx = cli::Context {
        root,
        session_id,
        config: cfg,
        data,
        data_source,
        view: RefCell::new(view::ViewState::new()),
        audit,
        verbose: args.verbose,
    };

    if let Some(commands) = &args.command {
        cli::run_once(&ctx, commands)
    } else {
        cli::run_repl(ctx)
    }
}
