//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use taxsync_core::groups::FacultyGroup;
use taxsync_core::pipeline::{ProgressReporter, RunOptions, run_sync};
use taxsync_core::snapshot::load_taxonomies;
use taxsync_shared::{AppConfig, Course, init_config, load_config, resolve_token};
use taxsync_store::TermStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// taxsync — file course sections into remote term-store taxonomies.
#[derive(Parser)]
#[command(
    name = "taxsync",
    version,
    about = "Sync a semester's course data into hierarchical term-store taxonomies.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sync a semester's courses into the taxonomies.
    Sync {
        /// Course data JSON file (one semester's sections).
        file: PathBuf,

        /// Only populate course-list taxonomies, skipping the flat
        /// per-field ones.
        #[arg(long)]
        course_lists: bool,

        /// Do not delete the semester's existing terms first (for resuming
        /// a partial run).
        #[arg(long)]
        no_delete: bool,

        /// Delete the semester's existing terms, then stop.
        #[arg(long)]
        clear_only: bool,

        /// Refresh the taxonomy-list snapshot from the store before
        /// syncing.
        #[arg(long)]
        download_taxos: bool,
    },

    /// Add everyone teaching this semester to their department's faculty
    /// group.
    Groups {
        /// Course data JSON file.
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "taxsync=info",
        1 => "taxsync=debug",
        _ => "taxsync=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync {
            file,
            course_lists,
            no_delete,
            clear_only,
            download_taxos,
        } => cmd_sync(&file, course_lists, no_delete, clear_only, download_taxos).await,
        Command::Groups { file } => cmd_groups(&file).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn connect(config: &AppConfig) -> Result<TermStore> {
    let token = resolve_token(config)?;
    Ok(TermStore::new(&config.store.api_root, &token)?)
}

fn read_courses(file: &Path) -> Result<Vec<Course>> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read course data '{}': {e}", file.display()))?;
    let courses: Vec<Course> = serde_json::from_str(&raw)
        .map_err(|e| eyre!("invalid course data '{}': {e}", file.display()))?;
    if courses.is_empty() {
        return Err(eyre!("course data '{}' is empty", file.display()));
    }
    Ok(courses)
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn snapshot_path(config: &AppConfig) -> PathBuf {
    expand_home(&config.defaults.data_dir).join("taxonomies.json")
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_sync(
    file: &Path,
    course_lists: bool,
    no_delete: bool,
    clear_only: bool,
    download_taxos: bool,
) -> Result<()> {
    let config = load_config()?;
    let store = connect(&config)?;
    let courses = read_courses(file)?;
    let semester = courses[0].semester();

    let mut taxos = load_taxonomies(&store, &snapshot_path(&config), download_taxos).await?;
    info!(
        %semester,
        courses = courses.len(),
        taxonomies = taxos.len(),
        "starting sync"
    );

    let options = RunOptions {
        course_lists_only: course_lists,
        delete_semester: !no_delete,
        clear_only,
    };
    let reporter = CliProgress::new();
    let summary = run_sync(&store, &mut taxos, courses, &options, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Sync finished for {semester}");
    println!("  Synced:   {}", summary.synced);
    println!("  Skipped:  {}", summary.skipped);
    println!("  Cleared:  {} semester subtree(s)", summary.semesters_cleared);
    if summary.failures.is_empty() {
        println!("  Failures: none");
    } else {
        println!("  Failures: {}", summary.failures.len());
        for (course, taxo, err) in &summary.failures {
            println!("    - {course} in \"{taxo}\": {err}");
        }
    }
    println!();

    if summary.failures.is_empty() {
        Ok(())
    } else {
        Err(eyre!("{} target(s) failed", summary.failures.len()))
    }
}

async fn cmd_groups(file: &Path) -> Result<()> {
    let config = load_config()?;
    let store = connect(&config)?;
    let courses = read_courses(file)?;

    let remote = store.list_groups().await?;
    let mut groups: Vec<FacultyGroup> = remote.into_iter().map(FacultyGroup::from_remote).collect();
    info!(groups = groups.len(), "syncing faculty group membership");

    let report = taxsync_core::groups::sync_faculty_groups(&store, &mut groups, &courses).await?;

    println!();
    println!("  Faculty groups updated: {}", report.groups_updated);
    println!("  Users added:            {}", report.users_added);
    if !report.departments_skipped.is_empty() {
        println!(
            "  Departments skipped:    {}",
            report.departments_skipped.join(", ")
        );
    }
    println!();
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn course_done(&self, section_code: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Syncing [{current}/{total}] {section_code}"));
    }
}
