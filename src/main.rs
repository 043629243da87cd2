//! socials-sync
//!
//! Usage:
//!     socials-sync --user dave --platform flickr --dry-run

use anyhow::Context;
use bridge_traits::LogLevel;
use clap::Parser;
use core_runtime::config::{AppConfig, DEFAULT_CATALOG_PORT, DEFAULT_ROOT_CATEGORY};
use core_runtime::{init_logging, LogFormat, LoggingConfig};
use core_service::{CoreDependencies, CoreError, CoreService};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "socials-sync",
    version,
    about = "Publish categorized IMatch images to Flickr and Pixelfed"
)]
struct Args {
    /// Port of the local IMatch web service
    #[arg(long, env = "IMATCH_PORT", default_value_t = DEFAULT_CATALOG_PORT)]
    port: u16,

    /// Full catalog base URL; overrides --port
    #[arg(long, env = "IMATCH_URL")]
    url: Option<String>,

    /// Catalog user (defaults to the login name)
    #[arg(long, env = "IMATCH_USER")]
    user: Option<String>,

    #[arg(long, env = "IMATCH_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    #[arg(long, env = "IMATCH_APP_ID", default_value = "")]
    app_id: String,

    /// Root category holding the per-platform categories
    #[arg(long, default_value = DEFAULT_ROOT_CATEGORY)]
    root: String,

    /// Platforms to sync, in order (default: all)
    #[arg(short, long = "platform", value_delimiter = ',')]
    platforms: Vec<String>,

    /// Classify and report without touching any platform or the catalog
    #[arg(long)]
    dry_run: bool,

    /// Do not look for published images that left their platform category
    #[arg(long)]
    no_withdrawn: bool,

    /// Publish the master of each version file instead of the version
    #[arg(long)]
    resolve_masters: bool,

    /// Catalog request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[arg(long, env = "SOCIALS_SYNC_LOG", default_value = "info", value_parser = parse_level)]
    log_level: LogLevel,

    /// pretty, json or compact
    #[arg(long)]
    log_format: Option<LogFormat>,
}

fn parse_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{}'", value))
}

fn catalog_user(args: &Args) -> Option<String> {
    args.user
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok())
}

fn build_config(args: &Args) -> anyhow::Result<AppConfig> {
    let user = catalog_user(args).context("no catalog user: pass --user or set IMATCH_USER")?;

    let mut builder = AppConfig::builder()
        .catalog_port(args.port)
        .catalog_user(user)
        .catalog_password(args.password.as_str())
        .catalog_app_id(args.app_id.as_str())
        .root_category(args.root.as_str())
        .request_timeout(Duration::from_secs(args.timeout))
        .platforms(args.platforms.iter().cloned())
        .dry_run(args.dry_run)
        .detect_withdrawn(!args.no_withdrawn)
        .resolve_masters(args.resolve_masters);

    if let Some(url) = &args.url {
        builder = builder.catalog_url(url.as_str());
    }

    Ok(builder.build()?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut logging = LoggingConfig::default().with_level(args.log_level);
    if let Some(format) = args.log_format {
        logging = logging.with_format(format);
    }
    if let Err(err) = init_logging(logging) {
        eprintln!("socials-sync: {}", err);
        return ExitCode::from(2);
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {:#}", err);
            return ExitCode::from(2);
        }
    };

    if config.dry_run {
        info!("Dry run: no platform or catalog changes will be made");
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<CoreError>()
                .map(CoreError::exit_code)
                .unwrap_or(1);
            error!("{:#}", err);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let deps = CoreDependencies::desktop(config)?;
    let service = CoreService::new(deps);

    let summary = service.run(config).await?;

    for report in summary.reports.iter().filter(|r| r.failure.is_some()) {
        warn!(
            platform = report.platform.as_str(),
            failure = report.failure.as_deref().unwrap_or_default(),
            "Platform did not complete"
        );
    }
    if summary.has_failures() {
        warn!("Some images were not synced; see errors above");
    }

    Ok(())
}
