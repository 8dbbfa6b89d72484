// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use indic_pdf_translator::app_config::{self, Config};
use indic_pdf_translator::app_controller::Controller;
use indic_pdf_translator::language_utils::menu_entries;
use indic_pdf_translator::ocr::tools_available;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a PDF or every PDF in a directory (default)
    Translate(TranslateArgs),

    /// List the selectable target languages
    Languages,

    /// Check that external tools and the translation server are reachable
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct TranslateArgs {
    /// Input PDF file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: TranslateOptions,
}

#[derive(Args, Debug, Clone)]
struct TranslateOptions {
    /// Output PDF path (single file only; default: translated_<name> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language name or code (e.g. 'Hindi', 'en', 'Auto-detect')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// pdftranslate - translate PDFs written in Indian regional scripts
///
/// Extracts the text of every page (OCR for scanned pages), detects the
/// document language and rebuilds the PDF with the translated text.
#[derive(Parser, Debug)]
#[command(name = "pdftranslate")]
#[command(version)]
#[command(about = "Translate PDFs written in Indian regional scripts")]
#[command(long_about = "pdftranslate extracts the text of each PDF page (running OCR on scanned pages),
detects the document language and writes a new PDF with the translated text.

EXAMPLES:
    pdftranslate report.pdf                     # Translate to English
    pdftranslate -t Hindi report.pdf            # Translate to Hindi
    pdftranslate -o out.pdf report.pdf          # Choose the output file
    pdftranslate -f /scans/                     # Every PDF in a directory, overwriting outputs
    pdftranslate languages                      # List the selectable languages
    pdftranslate check                          # Verify tools and the translation server
    pdftranslate completions bash > pdftranslate.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input PDF file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
// Filtering follows `log::max_level()`, which is adjusted after the config loads
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger);
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => " ",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Info by default, adjusted once the config is loaded
    if CustomLogger::init(LevelFilter::Info).is_err() {
        eprintln!("Failed to initialise logger");
    }

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pdftranslate", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Languages) => {
            for entry in menu_entries() {
                println!("{}", entry);
            }
            Ok(())
        }
        Some(Commands::Check { config_path }) => run_check(config_path).await,
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            run_translate(TranslateArgs {
                input_path,
                options: cli.options,
            })
            .await
        }
    }
}

/// Load the config and apply CLI overrides, CLI log level first
fn load_config(options: &TranslateOptions) -> Result<Config> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(target) = &options.target_language {
        config.target_language = Some(target.clone());
    }
    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let config = load_config(&args.options)?;
    let controller = Controller::with_config(config)?;
    let options = args.options;

    if args.input_path.is_file() {
        controller
            .run(args.input_path.clone(), options.output, options.force_overwrite)
            .await?;
    } else if args.input_path.is_dir() {
        if options.output.is_some() {
            warn!("--output is ignored for directories; outputs are written next to each input");
        }
        let report = controller.run_folder(args.input_path.clone(), options.force_overwrite).await?;
        if report.failed > 0 {
            return Err(anyhow!("{} file(s) failed to translate", report.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    Ok(())
}

async fn run_check(config_path: PathBuf) -> Result<()> {
    let config = Config::load_or_create(&config_path)?;
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let report = tools_available(
        &config.ocr.renderer_binary,
        &config.ocr.tesseract_binary,
        &config.language_model.fasttext_binary,
    )
    .await;

    let status = |ok: bool| if ok { "ok" } else { "missing" };
    info!("Renderer ({}): {}", config.ocr.renderer_binary, status(report.renderer));
    info!("OCR engine ({}): {}", config.ocr.tesseract_binary, status(report.ocr));
    info!("fastText ({}): {}", config.language_model.fasttext_binary, status(report.language_model));
    info!(
        "Tessdata directory {:?}: {}",
        config.ocr.tessdata_dir,
        status(config.ocr.tessdata_dir.is_dir())
    );
    info!(
        "Language model {:?}: {}",
        config.language_model.path,
        if config.language_model.path.is_file() { "cached" } else { "will be downloaded on first use" }
    );

    let controller = Controller::with_config(config)?;
    let backend = controller.pipeline().translator().backend();
    let connection = backend.test_connection().await;
    match &connection {
        Ok(()) => info!("{} at {}: ok", backend.name(), controller.config().translation.endpoint),
        Err(e) => warn!("{} at {}: {}", backend.name(), controller.config().translation.endpoint, e),
    }

    if report.all_available() && connection.is_ok() {
        Ok(())
    } else {
        Err(anyhow!("Some requirements are not available"))
    }
}
