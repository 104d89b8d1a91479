//! Dingle - RPM drop automation
//!
//! Usage:
//!   dingle -n qa                # Latest new RPMs for qa
//!   dingle -l prod              # RPMs in the prod repository
//!   dingle -u stage -s foo      # Promote qa into stage, skipping foo
//!   dingle -m repos -t v1.2.0   # Merge dev into master and tag

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dingle_core::config::{ConfigStore, DEFAULT_CONFIG_PATH};
use dingle_core::prelude::*;

#[derive(Parser)]
#[command(name = "dingle")]
#[command(about = "DE Drop Automation", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["new_rpms", "merge", "update_yum_repo", "list_fs"]),
))]
struct Cli {
    /// List new RPMs for the specified environment
    #[arg(short = 'n', long, value_name = "ENV")]
    new_rpms: Option<TierArg>,

    /// Set of repos to merge and tag
    #[arg(short = 'm', long, value_name = "SET", requires = "tag")]
    merge: Option<RepoSetArg>,

    /// Yum repo to update with new RPMs
    #[arg(short = 'u', long, value_name = "ENV")]
    update_yum_repo: Option<TierArg>,

    /// Directory to list; prints only RPMs
    #[arg(short = 'l', long, value_name = "ENV")]
    list_fs: Option<TierArg>,

    /// Path to the dingle configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Tag to apply to a merge
    #[arg(short = 't', long)]
    tag: Option<String>,

    /// Host to connect to ([user@]hostname[:port]); defaults to yum_repo_host
    #[arg(long)]
    host: Option<String>,

    /// RPM name or filename to skip (repeatable)
    #[arg(short = 's', long = "skip", value_name = "RPM")]
    skips: Vec<String>,

    /// Output format
    #[arg(short = 'o', long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Dev,
    Qa,
    Stage,
    Prod,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Dev => Tier::Dev,
            TierArg::Qa => Tier::Qa,
            TierArg::Stage => Tier::Stage,
            TierArg::Prod => Tier::Prod,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RepoSetArg {
    Prereqs,
    Repos,
}

impl From<RepoSetArg> for RepoSet {
    fn from(arg: RepoSetArg) -> Self {
        match arg {
            RepoSetArg::Prereqs => RepoSet::Prereqs,
            RepoSetArg::Repos => RepoSet::Repos,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Header line followed by one filename per line
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dingle=info,dingle_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let store = ConfigStore::from_path(&cli.config);
    let config = store
        .load()
        .with_context(|| format!("--config setting '{}' is not usable", store.config_path().display()))?;

    if let Some(set) = cli.merge {
        // `requires = "tag"` guarantees the tag is present.
        let tag = cli.tag.as_deref().unwrap_or_default();
        return run_merge(&config, set.into(), tag, cli.format);
    }

    let executor = build_executor(&config, cli.host.as_deref())?;

    match (cli.new_rpms, cli.update_yum_repo, cli.list_fs) {
        (Some(tier), _, _) => run_new_rpms(&config, &executor, tier.into(), &cli.skips, cli.format),
        (_, Some(tier), _) => run_update(&config, &executor, tier.into(), &cli.skips, cli.format),
        (_, _, Some(tier)) => run_list_fs(&config, &executor, tier.into(), &cli.skips, cli.format),
        _ => bail!("one of --new-rpms, --merge, --update-yum-repo or --list-fs is required"),
    }
}

fn build_executor(config: &DingleConfig, host: Option<&str>) -> Result<SshExecutor> {
    let host = host.unwrap_or(&config.yum_repo_host);
    let target: SshTarget = host
        .parse()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("invalid --host '{}'", host))?;
    let executor = SshExecutor::new(target);
    info!("using repository host {}", executor.target());
    Ok(executor)
}

fn run_new_rpms(
    config: &DingleConfig,
    executor: &SshExecutor,
    tier: Tier,
    skips: &[String],
    format: OutputFormat,
) -> Result<()> {
    let rpms = Promoter::new(config, executor).latest_new_rpms(tier, skips)?;

    match format {
        OutputFormat::Table => {
            println!("-- RPMs for the {} environment:", tier);
            print_sorted(&rpms);
        }
        OutputFormat::Json => print_json("new", &rpms)?,
    }
    Ok(())
}

fn run_list_fs(
    config: &DingleConfig,
    executor: &SshExecutor,
    tier: Tier,
    skips: &[String],
    format: OutputFormat,
) -> Result<()> {
    let rpms = Promoter::new(config, executor).artifacts(tier)?;
    let rpms = dingle_core::skip::filter_rpms(&rpms, skips);

    match format {
        OutputFormat::Table => {
            println!("-- RPM listing for the {} directory.", tier);
            print_sorted(&rpms);
        }
        OutputFormat::Json => print_json("list", &rpms)?,
    }
    Ok(())
}

fn run_update(
    config: &DingleConfig,
    executor: &SshExecutor,
    tier: Tier,
    skips: &[String],
    format: OutputFormat,
) -> Result<()> {
    let report = match Promoter::new(config, executor).promote(tier, skips) {
        Ok(report) => report,
        Err(err) => {
            if let Some(partial) = err.partial_report() {
                match format {
                    OutputFormat::Table => {
                        println!("-- Update of the {} yum repository stopped:", tier);
                        for line in step_lines(partial) {
                            println!("{}", line);
                        }
                    }
                    OutputFormat::Json => print_json("update", partial)?,
                }
            }
            return Err(err)
                .with_context(|| format!("updating the {} yum repository failed", tier));
        }
    };

    match format {
        OutputFormat::Table => {
            if tier.upstream().is_some() && report.is_noop() {
                println!("-- No new RPMs for the {} environment.", tier);
                return Ok(());
            }
            println!("-- Updated the {} yum repository:", tier);
            print_sorted(&report.promoted);
            for line in step_lines(&report) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => print_json("update", &report)?,
    }
    Ok(())
}

/// One line per step run, with the output of a failed step indented below it.
fn step_lines(report: &PromotionReport) -> Vec<String> {
    let mut lines = Vec::new();
    for step in &report.steps {
        if step.succeeded {
            lines.push(format!("  ✓ {}", step.command));
        } else {
            lines.push(format!("  ✗ {}", step.command));
            lines.extend(step.output.lines().map(|line| format!("      {}", line)));
        }
    }
    lines
}

fn run_merge(config: &DingleConfig, set: RepoSet, tag: &str, format: OutputFormat) -> Result<()> {
    let repos = config.repos(set);
    let done = GitOps::from_config(config)
        .merge_and_tag(tag, repos)
        .with_context(|| format!("merging {} for tag '{}' failed", set, tag))?;

    match format {
        OutputFormat::Table => {
            println!("-- Merged and tagged {} as {}:", set, tag);
            for repo in &done {
                println!("{}", repo);
            }
        }
        OutputFormat::Json => print_json("merge", &done)?,
    }
    Ok(())
}

fn print_sorted(filenames: &[String]) {
    let mut sorted: Vec<&String> = filenames.iter().collect();
    sorted.sort();
    for filename in sorted {
        println!("{}", filename);
    }
}

fn print_json<T: serde::Serialize + ?Sized>(key: &str, value: &T) -> Result<()> {
    let output = serde_json::json!({ key: value });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
