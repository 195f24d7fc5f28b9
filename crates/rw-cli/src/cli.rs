use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "regwatch",
    about = "Regulatory Watch: change detection for statutes, notices and bills",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch, classify, merge history and publish artifacts
    Run(RunArgs),
    /// Fail when the last successful run is too old
    CheckDelay(CheckDelayArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Captured upstream responses to replay
    #[arg(long)]
    pub capture: PathBuf,
    /// Directory relative paths are resolved against
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Override the artifact output directory
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Override the history cutoff (YYYYMMDD)
    #[arg(long, env = "HISTORY_START")]
    pub history_start: Option<String>,
    /// Skip rendering statute text diffs
    #[arg(long)]
    pub no_text_diff: bool,
    #[arg(long, env = "LAW_OC", default_value = "", hide_env_values = true)]
    pub law_oc: String,
    #[arg(long, env = "ASSEMBLY_KEY", default_value = "", hide_env_values = true)]
    pub assembly_key: String,
}

#[derive(Args)]
pub struct CheckDelayArgs {
    /// Directory holding health.json
    #[arg(long, env = "OUT_DIR", default_value = "public")]
    pub out_dir: PathBuf,
    /// Maximum age of the last success, in minutes
    #[arg(long, env = "DELAY_THRESHOLD_MIN", default_value_t = 75)]
    pub threshold_min: u64,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run() {
        let cli = Cli::try_parse_from([
            "regwatch",
            "run",
            "--capture",
            "capture.json",
            "--config",
            "regwatch.toml",
            "--out",
            "site",
            "--no-text-diff",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.capture, PathBuf::from("capture.json"));
            assert_eq!(args.config, Some(PathBuf::from("regwatch.toml")));
            assert_eq!(args.out, Some(PathBuf::from("site")));
            assert!(args.no_text_diff);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn run_requires_capture() {
        assert!(Cli::try_parse_from(["regwatch", "run"]).is_err());
    }

    #[test]
    fn parse_run_credentials() {
        let cli = Cli::try_parse_from([
            "regwatch",
            "run",
            "--capture",
            "c.json",
            "--law-oc",
            "abc",
            "--assembly-key",
            "xyz",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.law_oc, "abc");
            assert_eq!(args.assembly_key, "xyz");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_check_delay() {
        let cli = Cli::try_parse_from([
            "regwatch",
            "check-delay",
            "--out-dir",
            "/srv/public",
            "--threshold-min",
            "90",
        ])
        .unwrap();
        if let Command::CheckDelay(args) = cli.command {
            assert_eq!(args.out_dir, PathBuf::from("/srv/public"));
            assert_eq!(args.threshold_min, 90);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verbose_json() {
        let cli = Cli::try_parse_from(["regwatch", "--verbose", "--format", "json", "config"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Command::Config(_)));
    }
}
