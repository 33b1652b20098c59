// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use catalog_translator::app_config::{self, Config, TranslationProvider};
use catalog_translator::app_controller::Controller;
use catalog_translator::file_utils::FileManager;
use catalog_translator::language_config::suggest_code;
use catalog_translator::translation::examples::ExamplesTable;
use catalog_translator::translation::{AuxiliaryInputs, CancelFlag, Flow, RewritePrompts, RunRequest};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

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

/// CLI Wrapper for Flow to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFlow {
    Description,
    DisplayNames,
    Rewrite,
}

impl From<CliFlow> for Flow {
    fn from(cli_flow: CliFlow) -> Self {
        match cli_flow {
            CliFlow::Description => Flow::Description,
            CliFlow::DisplayNames => Flow::DisplayNames,
            CliFlow::Rewrite => Flow::Rewrite,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a product table into one or more languages
    Translate(TranslateArgs),

    /// Manage the language name/code table
    Languages {
        #[command(subcommand)]
        action: LanguageAction,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: PathBuf,
    },

    /// Generate shell completions for catalog-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum LanguageAction {
    /// Show every configured language
    List,

    /// Add or replace a language
    Add {
        /// Human-readable name, e.g. "German"
        name: String,

        /// Short code; derived from the ISO 639-1 code of the name when omitted
        #[arg(long)]
        code: Option<String>,
    },

    /// Remove a language by code
    Remove {
        /// Short code, e.g. "de"
        code: String,
    },

    /// List configured languages that have a column in an examples table
    Detect {
        /// Examples CSV with `Display name - <code>` columns
        examples: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input CSV table
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Target language name (repeatable)
    #[arg(short = 'L', long = "language", required = true)]
    languages: Vec<String>,

    /// Which column and prompt style to use
    #[arg(long, value_enum, default_value = "description")]
    flow: CliFlow,

    /// Examples table for the display-names flow
    #[arg(long)]
    examples: Option<PathBuf>,

    /// Terminology dictionary for the description flow
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Custom instructions added to every prompt
    #[arg(short, long)]
    instructions: Option<String>,

    /// JSON file with the two prompt pairs of the rewrite flow
    #[arg(long)]
    rewrite_prompts: Option<PathBuf>,

    /// Directory for output files (overrides the config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Hide progress bars
    #[arg(short, long)]
    quiet: bool,
}

/// catalog-translator - batch translation of product catalogs with AI
///
/// Translates the description or display-name column of a product table into
/// several languages and writes one file per language plus a combined file.
#[derive(Parser, Debug)]
#[command(name = "catalog-translator")]
#[command(version)]
#[command(about = "AI-powered product catalog translation tool")]
#[command(long_about = "catalog-translator translates product tables using AI providers.

EXAMPLES:
    catalog-translator translate products.csv -L German -L Swedish
    catalog-translator translate names.csv --flow display-names --examples examples.csv -L German
    catalog-translator translate products.csv -L Swedish -i \"Use a formal tone\" -q > events.ndjson
    catalog-translator languages add German
    catalog-translator completions bash > catalog-translator.bash

Progress events are printed to stdout as one JSON object per line; logs and
progress bars go to stderr. The exit code is non-zero unless the run completed.

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file does not exist
    a per-user config is used when present, otherwise a default conf.json is
    created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
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
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            // stdout carries the event stream, so logs always go to stderr
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with the most verbose level; the effective
    // level is lowered through set_max_level once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "catalog-translator", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages { action, config_path } => run_languages(action, config_path),
        Commands::Translate(args) => run_translate(args).await,
    }
}

fn load_config(config_path: &Path, log_level: Option<&CliLogLevel>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let path = Config::resolve_path(config_path);
    let mut config = Config::load_or_create(&path)?;

    match log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let mut config = load_config(&options.config_path, options.log_level.as_ref())?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        let provider_str = config.translation.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }

    config.validate().context("Configuration validation failed")?;

    if !FileManager::file_exists(&options.input_path) {
        return Err(anyhow!("Input file does not exist: {:?}", options.input_path));
    }

    let prompt_pairs = match &options.rewrite_prompts {
        Some(path) => {
            let content = FileManager::read_to_string(path)?;
            let prompts: RewritePrompts = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse rewrite prompts: {}", path.display()))?;
            Some(prompts)
        }
        None => None,
    };

    let request = RunRequest::new(&options.input_path, options.languages.clone(), &config.output_dir)
        .with_flow(options.flow.into())
        .with_auxiliary(AuxiliaryInputs {
            examples_path: options.examples.clone(),
            dictionary_path: options.dictionary.clone(),
            custom_instructions: options.instructions.clone(),
            prompt_pairs,
        });

    let output_dir = config.output_dir.clone();
    let controller = Controller::with_config(config)?;
    let orchestrator = controller.orchestrator()?;

    let cancel = CancelFlag::new();
    let ctrl_c_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current cell");
            ctrl_c_flag.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    let report = controller
        .run(&orchestrator, request, &mut stdout, !options.quiet, cancel)
        .await?;

    if let Some(fatal) = &report.fatal_error {
        error!("{}", fatal);
    }
    if !report.completed {
        return Err(anyhow!("Translation run did not complete"));
    }
    if let Some(path) = report
        .combined_file
        .as_deref()
        .and_then(|file| FileManager::artifact_path(&output_dir, file))
    {
        info!("Combined output written to {}", path.display());
    }
    Ok(())
}

fn run_languages(action: LanguageAction, config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path, None)?;
    let controller = Controller::with_config(config)?;
    let store = controller.languages();
    let mut table = store.snapshot();

    match action {
        LanguageAction::List => {
            let mut stdout = std::io::stdout();
            for (code, name) in table.entries() {
                writeln!(stdout, "{}\t{}", code, name)?;
            }
            return Ok(());
        }
        LanguageAction::Add { name, code } => {
            let code = code
                .or_else(|| suggest_code(&name))
                .ok_or_else(|| anyhow!("No ISO 639-1 code known for '{}'; pass --code", name))?;
            info!("Adding {} ({})", name, code);
            table.insert(code, name);
        }
        LanguageAction::Remove { code } => match table.remove(&code) {
            Some(name) => info!("Removed {} ({})", name, code),
            None => return Err(anyhow!("No language configured with code '{}'", code)),
        },
        LanguageAction::Detect { examples } => {
            let examples = ExamplesTable::load(&examples)
                .with_context(|| format!("Failed to read examples table: {}", examples.display()))?;
            let mut stdout = std::io::stdout();
            for name in table.available_languages(&examples.codes()) {
                writeln!(stdout, "{}", name)?;
            }
            return Ok(());
        }
    }

    store.save(table).context("Failed to save language config")?;
    Ok(())
}
