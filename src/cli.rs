//! The command line interface for the program.
use crate::aggregate::run_analysis;
use crate::config::AnalysisConfig;
use crate::input::read_results;
use crate::log;
use crate::output::chart::render_charts;
use crate::output::metadata::write_metadata;
use crate::output::{create_output_directory, get_output_dir, write_tables};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// The results file read if no other is specified
const DEFAULT_INPUT_FILE: &str = "ecm_results.json";

/// The command line interface for the program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Path to an analysis configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Only write tables, without rendering charts
    #[arg(long)]
    pub no_charts: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Summarise a results file, writing tables and charts.
    Run {
        /// Path to the ECM results file.
        #[arg(default_value = DEFAULT_INPUT_FILE)]
        input: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Check a results file against the analysis configuration.
    Validate {
        /// Path to the ECM results file.
        #[arg(default_value = DEFAULT_INPUT_FILE)]
        input: PathBuf,
        /// Path to an analysis configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Manage the analysis configuration.
    Config {
        /// The available subcommands for the analysis configuration.
        #[command(subcommand)]
        subcommand: ConfigSubcommands,
    },
    /// Manage program settings.
    Settings {
        /// The available subcommands for managing settings.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

/// Subcommands for the analysis configuration
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write the default analysis configuration to the console
    DumpDefault,
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { input, opts } => handle_run_command(&input, &opts, None),
            Self::Validate { input, config } => {
                handle_validate_command(&input, config.as_deref(), None)
            }
            Self::Config {
                subcommand: ConfigSubcommands::DumpDefault,
            } => {
                print!("{}", AnalysisConfig::default_file_contents()?);
                Ok(())
            }
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ ecm-summary --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Handle the `run` command.
///
/// # Arguments
///
/// * `input_path` - The results file to summarise
/// * `opts` - Options from the command line
/// * `settings` - Program settings, which are loaded from the settings file if `None`
pub fn handle_run_command(
    input_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let mut settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // These settings can be overridden by command-line arguments
    if opts.overwrite {
        settings.overwrite = true;
    }
    if opts.no_charts {
        settings.charts = false;
    }

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(input_path)?;
        &pathbuf
    };

    let overwrite =
        create_output_directory(output_path, settings.overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let config = AnalysisConfig::load(opts.config.as_deref())
        .context("Failed to load analysis configuration.")?;
    let results = read_results(input_path, &config).context("Failed to load results.")?;
    info!(
        "Loaded {} ECMs for {} states from {}",
        results.ecms.len(),
        results.states.len(),
        input_path.display()
    );
    info!("Output folder: {}", output_path.display());

    let analysis = run_analysis(&results, &config)?;

    let tables = write_tables(output_path, &analysis, &config.summary_label)?;
    info!("Wrote {} tables", tables.len());

    if settings.charts {
        let charts = render_charts(output_path, &analysis, &config.summary_label)?;
        info!("Rendered {} charts", charts.len());
    } else {
        info!("Skipping charts");
    }

    write_metadata(output_path, input_path, opts.config.as_deref())
        .context("Failed to save metadata.")?;
    info!("Summary complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(
    input_path: &Path,
    config_path: Option<&Path>,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let config =
        AnalysisConfig::load(config_path).context("Failed to load analysis configuration.")?;
    let results = read_results(input_path, &config).context("Failed to validate results.")?;
    info!(
        "Validation successful: {} ECMs for {} states",
        results.ecms.len(),
        results.states.len()
    );

    Ok(())
}
