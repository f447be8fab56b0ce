mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use config::{ConfigMerger, SyncOverrides};
use depsync_core::{Ports, SyncSettings, ToolInfo, run_sync};
use depsync_domain::diff_registries;
use depsync_registry::scan_registry;
use depsync_render::{render_package_list, render_report};
use fs_err as fs;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "depsync",
    version,
    about = "Regenerate vendored Android dependencies and sync them into the source tree."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild dependencies in a staging tree and sync the changes back.
    Sync(SyncArgs),
    /// Compare the package descriptors of two trees without building.
    Diff(DiffArgs),
}

#[derive(Debug, Parser)]
struct SyncArgs {
    /// Repository root (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Persistent staging directory (default: a temporary one, removed on exit).
    #[arg(long)]
    build_dir: Option<Utf8PathBuf>,

    /// Neither require nor seed the licenses directory.
    #[arg(long, default_value_t = false)]
    ignore_licenses: bool,

    /// Run every stage but leave the tracked tree untouched.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Also write the run report as JSON to this path.
    #[arg(long)]
    json_report: Option<Utf8PathBuf>,

    /// Additional path substrings to exclude from rewriting.
    #[arg(long)]
    exclude: Vec<String>,

    /// Maximum number of concurrent remote existence checks.
    #[arg(long)]
    probe_concurrency: Option<usize>,
}

#[derive(Debug, Parser)]
struct DiffArgs {
    /// Root of the tree of record.
    #[arg(long)]
    existing: Utf8PathBuf,

    /// Root of the freshly built tree.
    #[arg(long)]
    build: Utf8PathBuf,

    /// Directory scanned for descriptors, relative to both roots.
    #[arg(long, default_value = "third_party/android_deps/libs")]
    subdir: Utf8PathBuf,

    /// Print the diff as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = real_main().await {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

async fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Sync(args) => cmd_sync(args, cli.verbose).await,
        Command::Diff(args) => cmd_diff(args),
    }
}

async fn cmd_sync(args: SyncArgs, verbose: u8) -> anyhow::Result<()> {
    let cwd = current_dir()?;
    let repo_root = absolutize(&cwd, &args.repo_root);
    let build_dir = args.build_dir.as_deref().map(|p| absolutize(&cwd, p));

    let config = config::load_or_default(&repo_root)?;
    debug!(?config, "loaded config");

    let settings: SyncSettings = ConfigMerger::new(config).merge_sync_args(
        repo_root,
        cwd,
        SyncOverrides {
            build_dir,
            ignore_licenses: args.ignore_licenses,
            dry_run: args.dry_run,
            debug: verbose >= 2,
            exclude: args.exclude,
            probe_concurrency: args.probe_concurrency,
        },
    );

    info!(repo_root = %settings.repo_root, dry_run = settings.dry_run, "starting sync");

    let ports = Ports::system(&settings);
    let outcome = run_sync(&settings, ports, tool_info()).await?;

    if let Some(path) = &args.json_report {
        write_json(path, &outcome.report)?;
        info!("wrote {}", path);
    }

    print!("{}", render_report(&outcome.report));
    Ok(())
}

fn cmd_diff(args: DiffArgs) -> anyhow::Result<()> {
    for root in [&args.existing, &args.build] {
        if !root.is_dir() {
            anyhow::bail!("not a directory: {}", root);
        }
    }

    let existing = scan_registry(&args.existing, &args.subdir)
        .with_context(|| format!("scan {}", args.existing))?;
    let build =
        scan_registry(&args.build, &args.subdir).with_context(|| format!("scan {}", args.build))?;

    let diff = diff_registries(&existing, &build);

    if args.json {
        let s = serde_json::to_string_pretty(&diff).context("serialize json")?;
        println!("{s}");
        return Ok(());
    }

    if diff.is_noop() {
        println!("No changes: {} packages unchanged", diff.unchanged.len());
        return Ok(());
    }
    for (names, label) in [
        (&diff.new, "new"),
        (&diff.updated, "updated"),
        (&diff.deleted, "deleted"),
    ] {
        if !names.is_empty() {
            print!("{}", render_package_list(names, label));
        }
    }
    Ok(())
}

fn current_dir() -> anyhow::Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("read current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("current directory is not UTF-8: {}", p.display()))
}

fn absolutize(cwd: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else if path == "." {
        cwd.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn write_json<T: serde::Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent))?;
    }
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "depsync".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        commit: None,
    }
}
