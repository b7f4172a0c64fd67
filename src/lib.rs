//! # h5audit
//!
//! Command-line host for an audit session: opens a page in the page
//! runtime, drives reload/report cycles through a [`panel::Panel`] and
//! prints each report.

mod config;
mod logging;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use panel::{ChannelBridge, Panel, ReloadOptions, ReportFormat};
use runtime_page::{FileLoader, start_page_runtime};

pub use config::{
    AuditConfig, ConfigError, DEFAULT_CONFIG, LogSection, ReloadSection, ReportSection,
    load_config,
};
pub use logging::init_logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Counts which HTML5 platform features a page uses", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./h5audit.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Report format; overrides `[report] format`
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

impl From<OutputFormat> for ReportFormat {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Text => ReportFormat::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs reload/report cycles and prints a report after each one
    Run {
        /// HTML page to audit
        page: PathBuf,
        /// Page script to use instead of the page's companion .toml
        #[arg(long)]
        script: Option<PathBuf>,
        /// Number of reload/report cycles
        #[arg(long, default_value_t = 1)]
        cycles: u32,
        /// Clears the session totals before this cycle's report (1-based)
        #[arg(long)]
        clear_before: Option<u32>,
    },
    /// Single instrumented load and report
    Probe {
        /// HTML page to audit
        page: PathBuf,
    },
}

struct Plan<'a> {
    page: &'a PathBuf,
    script: Option<&'a PathBuf>,
    cycles: u32,
    clear_before: Option<u32>,
}

impl<'a> Plan<'a> {
    fn from_command(command: &'a Commands) -> Self {
        match command {
            Commands::Run {
                page,
                script,
                cycles,
                clear_before,
            } => Self {
                page,
                script: script.as_ref(),
                cycles: *cycles,
                clear_before: *clear_before,
            },
            Commands::Probe { page } => Self {
                page,
                script: None,
                cycles: 1,
                clear_before: None,
            },
        }
    }
}

/// Runs the session described by `cli`, writing every report to `out`.
pub fn run(cli: &Cli, config: &AuditConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    let plan = Plan::from_command(&cli.command);
    let format = cli
        .format
        .map(ReportFormat::from)
        .unwrap_or(config.report.format);
    let source = plan
        .page
        .to_str()
        .ok_or_else(|| anyhow!("page path {} is not valid UTF-8", plan.page.display()))?;

    let mut loader = FileLoader::new();
    if let Some(script) = plan.script {
        loader = loader.with_script(script.clone());
    }
    let (bus, page_end) = bus::connect();
    let runtime = start_page_runtime(loader, page_end);

    let mut bridge = ChannelBridge::new(bus);
    let session = bridge
        .navigate(source)
        .with_context(|| format!("failed to open {}", plan.page.display()))
        .and_then(|_| {
            let mut panel = Panel::new(
                bridge,
                ReloadOptions {
                    ignore_cache: config.reload.ignore_cache,
                    inject: config.instrument.clone(),
                },
            );
            let result = run_cycles(&mut panel, &plan, format, out);
            panel.bridge().shutdown();
            result
        });

    runtime
        .join()
        .map_err(|_| anyhow!("page runtime panicked"))?;
    session
}

fn run_cycles(
    panel: &mut Panel<ChannelBridge>,
    plan: &Plan<'_>,
    format: ReportFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    for cycle in 1..=plan.cycles {
        let load_id = panel
            .reload()
            .with_context(|| format!("cycle {cycle}: reload failed"))?;
        log::info!(target: "h5audit", "cycle {cycle}: {load_id} instrumented");
        // After the reload, whose commit would otherwise refill the session.
        if plan.clear_before == Some(cycle) {
            panel.clear_session();
        }

        let report = panel.report();
        if let Some(error) = &report.error {
            log::warn!(target: "h5audit", "cycle {cycle}: {error}");
        }
        if plan.cycles > 1 && format == ReportFormat::Text {
            writeln!(out, "== cycle {cycle} ==")?;
        }
        writeln!(out, "{}", report.render(format))?;
    }
    Ok(())
}
