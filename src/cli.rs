use std::{
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use wfm_grid::{
    schedule::{GridStore, RosterSnapshot, SchedulePeriod},
    storage::config::Config,
    sync::SyncEngine,
};

use crate::tui::{build_sample_roster, open_cache};

pub const DEFAULT_SAMPLE_SIZE: usize = 40;
pub const USAGE: &str = "Usage: wfm-grid [--sample [N]] [--month YYYY-MM] [--report]";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CliMode {
    Interactive { period: SchedulePeriod, sample: Option<usize> },
    Report { period: SchedulePeriod, sample: Option<usize> },
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1))
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliMode, String> {
    let mut sample = None;
    let mut period = None;
    let mut report = false;
    let mut args = args.into_iter().peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sample" => {
                let size = match args.peek() {
                    Some(next) if !next.starts_with("--") => {
                        let value = args.next().unwrap_or_default();
                        value
                            .parse::<usize>()
                            .ok()
                            .filter(|n| *n > 0)
                            .ok_or_else(|| format!("Invalid sample size '{}'.", value))?
                    }
                    _ => DEFAULT_SAMPLE_SIZE,
                };
                sample = Some(size);
            }
            "--month" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--month requires YYYY-MM".to_string())?;
                period = Some(
                    SchedulePeriod::parse_month(&value)
                        .ok_or_else(|| format!("Invalid month '{}'. Use YYYY-MM.", value))?,
                );
            }
            "--report" => {
                report = true;
            }
            "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    let period = period.unwrap_or_default();
    if report {
        Ok(CliMode::Report { period, sample })
    } else {
        Ok(CliMode::Interactive { period, sample })
    }
}

pub async fn run_report_mode(period: SchedulePeriod, sample: Option<usize>) -> Result<(), io::Error> {
    let config = Config::load_or_create()
        .map_err(|e| io::Error::other(e.to_string()))?;

    let snapshot = match sample {
        Some(size) => build_sample_roster(&period, size),
        None => load_for_report(&config, period).await,
    };

    let store = GridStore::from_snapshot(period, snapshot);
    display_with_pager(&format_report(&store))
}

async fn load_for_report(config: &Config, period: SchedulePeriod) -> RosterSnapshot {
    match SyncEngine::from_config(config) {
        Ok(engine) => match engine.load_period(period).await {
            Ok(snapshot) => return snapshot,
            Err(e) => eprintln!("Failed to load roster: {}", e),
        },
        Err(e) => eprintln!("{}", e),
    }

    open_cache(config)
        .and_then(|cache| cache.load_snapshot(&period).ok().flatten())
        .map(|cached| {
            eprintln!("Using roster cached at {}", cached.saved_at.format("%Y-%m-%d %H:%M"));
            cached.snapshot
        })
        .unwrap_or_default()
}

pub fn format_report(store: &GridStore) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Rule violations - {}", store.period().label()));
    lines.push(format!(
        "{} employees, {} shifts",
        store.roster().len(),
        store.grid().len()
    ));
    lines.push(String::new());

    if store.violations().is_empty() {
        lines.push("No rule violations.".to_string());
    } else {
        let mut current = None;
        for violation in store.violations() {
            if current != Some(&violation.employee_id) {
                if current.is_some() {
                    lines.push(String::new());
                }
                lines.push(violation.employee_name.clone());
                current = Some(&violation.employee_id);
            }
            lines.push(format!("  - {}", violation.message()));
        }
    }

    lines.join("\n")
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            print!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            print!("{text}");
        }
    }

    Ok(())
}
