use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Confirm, InquireError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tirta::config::{config_dir, init_config, load_config, load_config_or_default, Config};
use tirta::error::{BillingError, Result};
use tirta::render::{preview_panel, result_panel};
use tirta::{AuthContext, GenerationWorkflow, HttpBillingApi, UsageMonth};

#[derive(Parser)]
#[command(name = "tirta")]
#[command(version, about = "Bulk invoice generation client for TirtaSaaS", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.tirta or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Billing API base URL (overrides api.base_url in config.toml)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Bearer token for the billing API
    #[arg(long, global = true, env = "TIRTA_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show API settings and the default billing month
    Status,

    /// Preview the invoices a bulk run would generate (nothing is saved)
    Preview {
        /// Billing month (default: previous month)
        #[arg(short, long, value_name = "YYYY-MM")]
        month: Option<String>,

        /// Restrict to a customer id (can be repeated; default: all eligible)
        #[arg(short, long = "customer", value_name = "ID")]
        customer: Vec<String>,

        /// Print the raw preview result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview, confirm, and generate invoices for a month
    Generate {
        /// Billing month (default: previous month)
        #[arg(short, long, value_name = "YYYY-MM")]
        month: Option<String>,

        /// Restrict to a customer id (can be repeated; default: all eligible)
        #[arg(short, long = "customer", value_name = "ID")]
        customer: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Connection settings resolved from flags, environment and config.toml
struct Connection {
    api_url: Option<String>,
    token: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", e.alert());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };
    let conn = Connection {
        api_url: cli.api_url,
        token: cli.token,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir, &conn),
        Commands::Preview {
            month,
            customer,
            json,
        } => cmd_preview(&cfg_dir, &conn, month, customer, json),
        Commands::Generate {
            month,
            customer,
            yes,
        } => cmd_generate(&cfg_dir, &conn, month, customer, yes),
    }
}

/// Initialize config directory with the template file
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    let path = init_config(cfg_dir)?;

    println!("Initialized tirta config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Point base_url at your billing API:  $EDITOR {}", path.display());
    println!("  2. Export your access token:            export TIRTA_ACCESS_TOKEN=...");
    println!();
    println!("Then preview last month's invoices:");
    println!("  tirta preview");

    Ok(())
}

/// Show connection settings
fn cmd_status(cfg_dir: &Path, conn: &Connection) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let today = Local::now().date_naive();

    let api_url = resolve_api_url(conn, &config);
    let auth = resolve_auth(conn, &config);

    println!("TirtaSaaS Billing Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!(
        "API URL:          {}",
        api_url.as_deref().unwrap_or("(not configured)")
    );
    println!(
        "Access token:     {}",
        if auth.is_authenticated() {
            "configured"
        } else {
            "not set"
        }
    );
    match config.api.timeout_secs {
        Some(secs) => println!("Request timeout:  {secs}s"),
        None => println!("Request timeout:  none"),
    }
    println!("Default month:    {}", UsageMonth::previous(today));

    Ok(())
}

/// Run a dry-run generation and show the preview panel
fn cmd_preview(
    cfg_dir: &Path,
    conn: &Connection,
    month: Option<String>,
    customers: Vec<String>,
    json: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let mut workflow = start_workflow(month.as_deref(), customers, today)?;
    let api = build_api(cfg_dir, conn)?;

    let month = workflow.month();
    let preview = workflow.run_preview(&api)?;
    if json {
        println!("{}", serde_json::to_string_pretty(preview)?);
    } else {
        print!("{}", preview_panel(month, preview));
    }

    Ok(())
}

/// Preview, confirm, commit, and show the final result
fn cmd_generate(
    cfg_dir: &Path,
    conn: &Connection,
    month: Option<String>,
    customers: Vec<String>,
    assume_yes: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let mut workflow = start_workflow(month.as_deref(), customers, today)?;
    let api = build_api(cfg_dir, conn)?;

    let month = workflow.month();
    let preview = workflow.run_preview(&api)?;
    print!("{}", preview_panel(month, preview));
    println!();

    if !workflow.generate_enabled() {
        println!("Nothing to generate for {month}.");
        workflow.cancel()?;
        return Ok(());
    }

    let mut failure: Option<BillingError> = None;
    loop {
        let prompt = match &failure {
            Some(e) => workflow.request_retry(e)?,
            None => workflow.request_generate()?,
        };
        if !assume_yes && !confirm(&prompt, failure.is_some())? {
            workflow.decline()?;
            if let Some(e) = failure {
                return Err(e);
            }
            workflow.cancel()?;
            println!("Generation cancelled. No invoices were created.");
            return Ok(());
        }

        match workflow.confirm_and_commit(&api) {
            Ok(notice) => {
                println!("{notice}");
                break;
            }
            Err(e @ BillingError::Api(_)) if !assume_yes => failure = Some(e),
            Err(e) => return Err(e),
        }
    }

    if let Some(result) = workflow.final_result() {
        println!();
        print!("{}", result_panel(result));
    }

    Ok(())
}

fn start_workflow(
    month: Option<&str>,
    customers: Vec<String>,
    today: NaiveDate,
) -> Result<GenerationWorkflow> {
    let mut workflow = GenerationWorkflow::new(today);
    if let Some(input) = month {
        workflow.select_month(UsageMonth::parse_selectable(input, today)?, today)?;
    }
    workflow.select_customers(customers)?;
    Ok(workflow)
}

fn build_api(cfg_dir: &Path, conn: &Connection) -> Result<HttpBillingApi> {
    let config = load_config_or_default(cfg_dir)?;
    let api_url = resolve_api_url(conn, &config).ok_or(BillingError::MissingApiUrl)?;
    let timeout = config.api.timeout_secs.map(Duration::from_secs);

    Ok(HttpBillingApi::new(
        &api_url,
        resolve_auth(conn, &config),
        timeout,
    ))
}

fn resolve_api_url(conn: &Connection, config: &Config) -> Option<String> {
    conn.api_url
        .clone()
        .or_else(|| config.api.base_url.clone())
        .filter(|url| !url.trim().is_empty())
}

fn resolve_auth(conn: &Connection, config: &Config) -> AuthContext {
    let token = conn
        .token
        .clone()
        .or_else(|| config.auth.access_token.clone());
    AuthContext::new(token)
}

/// Ask a yes/no question on the terminal
fn confirm(prompt: &str, default: bool) -> Result<bool> {
    match Confirm::new(prompt).with_default(default).prompt() {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(false),
        Err(InquireError::NotTTY) => Err(BillingError::NotInteractive),
        Err(InquireError::IO(e)) => Err(BillingError::Io(e)),
        Err(e) => Err(BillingError::Io(std::io::Error::other(e.to_string()))),
    }
}
