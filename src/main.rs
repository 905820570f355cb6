mod cli;
use cli::{parse_cli_mode, run_report_mode, CliMode, USAGE};
mod tui;
use tui::{run_tui, SessionOptions};

use tracing_subscriber::EnvFilter;
use wfm_grid::storage::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli_mode = match parse_cli_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    match cli_mode {
        CliMode::Report { period, sample } => run_report_mode(period, sample).await?,
        CliMode::Interactive { period, sample } => {
            run_tui(SessionOptions { period, sample }).await?
        }
    }

    tracing::info!("wfm-grid exited");
    Ok(())
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "wfm-grid.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("wfm-grid started");
}
