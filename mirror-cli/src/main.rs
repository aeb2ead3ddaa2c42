//! mirrorctl — fan out one source tree to N destinations via an external
//! mirroring tool.
//!
//! # Usage
//!
//! ```text
//! mirrorctl --config <mirror.json> [--log-dir <dir>]
//! ```
//!
//! Exit code 0 once the real run completed, even if some destinations
//! exhausted their retries; exit code 1 on a configuration error, a failed
//! dry-run validation, or an unexpected fault.

mod logging;
mod notifier;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use mirror_core::config::load_config;
use mirror_engine::logger::RunLogger;
use mirror_engine::notify::Notifier;
use mirror_engine::orchestrator::{Orchestrator, RunReport, RunState};
use mirror_engine::runner::MirrorToolRunner;

use logging::FileLogs;
use notifier::NotifierChain;

#[derive(Parser, Debug)]
#[command(
    name = "mirrorctl",
    version,
    about = "Mirror a source tree into multiple destinations with a dry-run gate",
    long_about = None,
)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured log directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let log_dir = cli.log_dir.unwrap_or_else(|| config.log_dir.clone());
    let logs = FileLogs::create(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let logger: Arc<dyn RunLogger> = Arc::new(logs);
    let notifier: Arc<dyn Notifier> = Arc::new(NotifierChain::detect());
    let orchestrator = Orchestrator::new(Arc::new(MirrorToolRunner), logger, notifier);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let report = runtime.block_on(orchestrator.run(config.plan, config.retry));

    print_summary(&report);
    Ok(ExitCode::from(report.process_exit_code() as u8))
}

fn print_summary(report: &RunReport) {
    match report.state {
        RunState::Completed => {
            for result in &report.execution {
                let verdict = if result.verdict.is_failure() {
                    result.verdict.to_string().red().bold()
                } else {
                    result.verdict.to_string().green()
                };
                println!(
                    "{}  {} (exit code {}, {} attempt(s), {:.1}s)",
                    verdict,
                    result.destination.display(),
                    result.exit_code,
                    result.attempts,
                    result.duration.as_secs_f64(),
                );
            }
            let failed = report.failed_destinations().len();
            if failed == 0 {
                println!("{}", "mirror run completed".green().bold());
            } else {
                println!(
                    "{} ({failed} of {} destination(s) failed)",
                    "mirror run completed with failures".yellow().bold(),
                    report.execution.len(),
                );
            }
        }
        RunState::ValidationFailed => {
            for result in &report.validation {
                println!(
                    "[dry-run] {}  {} (exit code {})",
                    result.verdict,
                    result.destination.display(),
                    result.exit_code,
                );
            }
            println!(
                "{}",
                "validation failed; no destination was touched".red().bold()
            );
        }
        _ => {
            let detail = report.fault.as_deref().unwrap_or("unknown fault");
            println!("{} {detail}", "mirror run faulted:".red().bold());
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
