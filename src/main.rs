use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tube_layout::config::{load_config_or_default, Config, ConfigFormat};
use tube_layout::logging::{init_logging, LoggingConfig};
use tube_layout::visualization::print_row_summary;
use tube_layout::*;

#[derive(Parser)]
#[command(name = "tubemap")]
#[command(about = "Detect heat-exchanger tubes in an end-view photo, correct them and export a row/tube table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for JSON log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect tubes and correct them interactively before exporting
    Run {
        /// Photograph of the tube sheet (PNG/JPEG)
        #[arg(short, long)]
        image: PathBuf,

        /// Table destination; prompted for when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the final overlay image here
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Detect, optionally replay scripted edits, and export without a window
    Detect {
        /// Photograph of the tube sheet (PNG/JPEG)
        #[arg(short, long)]
        image: PathBuf,

        /// JSON list of add/remove gestures to apply before numbering
        #[arg(short, long)]
        edits: Option<PathBuf>,

        /// Table destination; nothing is written when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the final overlay image here
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Print the assignments as JSON instead of the summary table
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        #[arg(short, long, default_value = "tubemap.toml")]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_config_or_default(cli.config.as_deref());
    config.logging = logging_for_cli(config.logging, cli.verbose, cli.log_dir.clone());
    let _log_guard = init_logging(&config.logging)?;

    match cli.command {
        Commands::Run { image, output, overlay } => handle_run(config, &image, output, overlay),
        Commands::Detect { image, edits, output, overlay, json } => {
            handle_detect(config, &image, edits, output, overlay, json)
        }
        Commands::InitConfig { output, format } => handle_init_config(&output, format),
    }
}

fn logging_for_cli(logging: LoggingConfig, verbose: u8, log_dir: Option<PathBuf>) -> LoggingConfig {
    let mut logging = match verbose {
        0 => logging,
        1 => logging.with_level("info"),
        2 => logging.with_level("debug"),
        _ => logging.with_level("trace"),
    };
    if log_dir.is_some() {
        logging.log_directory = log_dir;
    }
    logging
}

fn handle_run(config: Config, image: &Path, output: Option<PathBuf>, overlay: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let session_config = config.session.clone();
    let pipeline = TubeMapPipeline::new(config).with_overlay(overlay);
    let mut notifier = ConsoleNotifier;

    let open_window = |_: &EditSession| {
        HighGuiSurface::open(
            &session_config.window_title,
            session_config.quit_key,
            session_config.event_wait_ms,
        )
    };

    let result = match output {
        Some(path) => pipeline.run(image, open_window, &mut FixedDestination(Some(path)), &mut notifier),
        None => pipeline.run(image, open_window, &mut PromptDestination::stdio(), &mut notifier),
    };

    finish(result, false, &mut notifier)
}

fn handle_detect(
    config: Config,
    image: &Path,
    edits: Option<PathBuf>,
    output: Option<PathBuf>,
    overlay: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let pipeline = TubeMapPipeline::new(config).with_overlay(overlay);
    let mut notifier = ConsoleNotifier;

    let open_script = |_: &EditSession| match edits.as_deref() {
        Some(path) => ScriptedSurface::from_json_file(path),
        None => Ok(ScriptedSurface::default()),
    };

    let result = pipeline.run(image, open_script, &mut FixedDestination(output), &mut notifier);
    finish(result, json, &mut notifier)
}

/// Report the run to the user. Runs that end with nothing to export are not
/// failures; decode, write and backend errors are.
fn finish(result: PipelineResult<RunReport>, json: bool, notifier: &mut dyn Notifier) -> anyhow::Result<ExitCode> {
    match result {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report.assignments)?);
            } else {
                print_row_summary(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if !e.is_fatal() => {
            notifier.warn(&e.to_string());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            notifier.error(&format!("{:#}", anyhow::Error::from(e)));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn handle_init_config(output: &Path, format: ConfigFormat) -> anyhow::Result<ExitCode> {
    Config::default().save_to_file(output, format)?;
    println!("Default configuration written to {}", output.display());
    Ok(ExitCode::SUCCESS)
}
