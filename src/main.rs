mod app;
mod context;
mod input;
mod pages;
mod toast;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use liftlog_core::AppConfig;

use context::AppContext;

#[derive(Parser)]
#[command(author, version, about = "Log strength workouts from the terminal")]
struct Args {
    /// Backend base URL, e.g. "http://localhost:3000". Overrides config and environment.
    #[arg(long)]
    backend_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log in with this name instead of the remembered user
    #[arg(long)]
    user: Option<String>,

    /// Open the workout for this date (YYYY-MM-DD) after login
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = args.config.or_else(AppConfig::default_path);
    let mut config = AppConfig::load(config_path.as_deref())?;
    if let Some(url) = &args.backend_url {
        config.apply_backend_override(url);
    }

    let ctx = AppContext::new(config)?;
    app::run(ctx, args.user, args.date).await
}
