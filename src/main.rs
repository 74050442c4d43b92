use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tanf::azure::auth::ServicePrincipal;
use tanf::azure::client::AzureClient;
use tanf::azure::http::error_hint;
use tanf::config::{ProjectConfig, DEFAULT_CONFIG_FILE};
use tanf::orchestrator::{run_all, RunSettings};
use tanf::resource::AzureNetAppApi;
use tanf::{output, AnfError, VERSION};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Azure NetApp Files lifecycle walkthrough
#[derive(Parser, Debug)]
#[command(name = "tanf", version, about, long_about = None)]
struct Args {
    /// Project configuration file (JSON, or YAML by extension)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Leave all resources in place after the updates
    #[arg(long)]
    skip_cleanup: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("tanf {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("tanf").join("tanf.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tanf").join("tanf.log");
    }
    PathBuf::from("tanf.log")
}

fn print_header() {
    output::info("----------------------------------------------------");
    output::info("Azure NetApp Files - resource lifecycle walkthrough");
    output::info("----------------------------------------------------");
}

async fn run(args: &Args) -> Result<()> {
    let config = ProjectConfig::load(&args.config).context("Unable to load project configuration")?;
    let principal = ServicePrincipal::from_env().context("Unable to load credentials")?;

    let subscription_id = config
        .general
        .subscription_id
        .clone()
        .or_else(|| principal.subscription_id.clone())
        .context("No subscriptionId in the configuration or the auth file")?;
    tracing::info!("Using subscription {}", subscription_id);

    let client = AzureClient::from_service_principal(principal, &subscription_id)?;
    let api = AzureNetAppApi::new(client);

    let settings = RunSettings {
        skip_cleanup: args.skip_cleanup,
        ..Default::default()
    };
    run_all(&api, &config, &settings).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level)?;

    print_header();

    if let Err(err) = run(&args).await {
        tracing::error!("Run failed: {:#}", err);
        output::error(&format!("{:#}", err));
        if let Some(hint) = err.downcast_ref::<AnfError>().and_then(error_hint) {
            output::error(hint);
        }
        drop(log_guard);
        std::process::exit(1);
    }

    output::success("ANF lifecycle walkthrough completed");
    drop(log_guard);
    Ok(())
}
