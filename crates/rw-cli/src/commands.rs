use std::path::Path;

use anyhow::{bail, Context};
use chrono::Utc;
use colored::Colorize;
use serde_json::json;
use tracing::debug;

use rw_sdk::{
    check_delay, CapturedSource, Credentials, Notifier, RunConfig, RunReport, RunTimestamp,
};

use crate::cli::{CheckDelayArgs, Cli, Command, ConfigArgs, OutputFormat, RunArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args, &cli.format),
        Command::CheckDelay(args) => cmd_check_delay(args, &cli.format),
        Command::Config(args) => cmd_config(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RunConfig> {
    match path {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn cmd_run(args: RunArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(start) = args.history_start {
        config.history_start = start;
    }
    if args.no_text_diff {
        config.features.enable_text_diff = false;
    }
    if let Some(root) = &args.root {
        config.paths = config.paths.rooted_at(root);
    }
    if let Some(out) = args.out {
        config.paths.out_dir = out;
    }
    config.validate()?;

    let source = CapturedSource::from_file(&args.capture)
        .with_context(|| format!("loading capture {}", args.capture.display()))?;
    debug!(responses = source.len(), "capture loaded");

    let credentials = Credentials::new(args.law_oc, args.assembly_key);
    let out_dir = config.paths.out_dir.clone();
    let report = Notifier::new(config, credentials, source).run(&RunTimestamp::now())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report_json(&report))?),
        OutputFormat::Text => print_report(&report, &out_dir),
    }
    Ok(())
}

fn report_json(report: &RunReport) -> serde_json::Value {
    json!({
        "run_id": report.run_id.to_string(),
        "count_by_kind": report.count_by_kind,
        "delta": report.delta,
        "history_total": report.history_total,
        "seeded_now": report.seeded_now,
        "fallback": report.fallback,
        "diffs": report.diffs.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
    })
}

fn print_report(report: &RunReport, out_dir: &Path) {
    println!(
        "{} Run {} published to {}",
        "✓".green().bold(),
        report.run_id.to_string().dimmed(),
        out_dir.display().to_string().bold()
    );
    for (kind, count) in &report.count_by_kind {
        println!("  {kind}: {}", count.to_string().bold());
    }
    let delta = if report.delta > 0 {
        report.delta.to_string().yellow().bold()
    } else {
        report.delta.to_string().green()
    };
    println!("  changes this run: {delta}");
    println!("  history total: {}", report.history_total.to_string().bold());
    if report.seeded_now {
        println!("  {}", "history seeded from backfill".cyan());
    }
    for (section, used) in &report.fallback {
        if *used {
            println!("  {} {section}: serving previous data", "!".yellow().bold());
        }
    }
    for path in &report.diffs {
        println!("  {} {}", "diff:".green(), path.display());
    }
}

fn cmd_check_delay(args: CheckDelayArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let report = check_delay(&args.out_dir, args.threshold_min, Utc::now())?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "last_success_kst": report.last_success_kst.to_rfc3339(),
                "now_kst": report.now_kst.to_rfc3339(),
                "elapsed_minutes": report.elapsed_minutes,
                "threshold_minutes": report.threshold_minutes,
                "exceeded": report.is_exceeded(),
            }))?
        ),
        OutputFormat::Text => {
            println!("last_success_kst={}", report.last_success_kst.to_rfc3339());
            println!("now_kst={}", report.now_kst.to_rfc3339());
            println!("diff_min={:.2}", report.elapsed_minutes);
        }
    }
    if report.is_exceeded() {
        bail!(
            "last successful run is {:.1} minutes old (threshold {} minutes)",
            report.elapsed_minutes,
            report.threshold_minutes
        );
    }
    if matches!(format, OutputFormat::Text) {
        println!("{} Delay within threshold.", "✓".green().bold());
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
