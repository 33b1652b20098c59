/*!
 * Batch orchestrator for catalog translation runs.
 *
 * A run goes through these phases:
 * 1. Loading: read the input table and the flow's auxiliary tables
 * 2. Column setup: create the target column of every requested language
 * 3. Per-language loop: translate every row, write the language artifact
 * 4. Finalizing: write the combined artifact covering completed languages
 *
 * Progress is reported as a stream of [`ProgressEvent`]s. The stream is the
 * error channel too: per-cell and per-language failures become events and the
 * run continues, while a fatal failure produces one terminal event.
 */

use futures::Stream;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::app_config::TranslationConfig;
use crate::errors::{LanguageConfigError, RunError, TableError};
use crate::file_utils::FileManager;
use crate::language_config::LanguageResolver;
use crate::providers::{ModelOptions, TextGenerator};
use crate::table::Table;

use super::cell::CellTranslator;
use super::dictionary::{Dictionary, TermEnforcer};
use super::events::{percent_done, CompletedFile, ProgressEvent};
use super::examples::ExamplesTable;
use super::pacing::{Pacer, PacingPolicy};
use super::prompts::{
    CellStrategy, DescriptionStrategy, DisplayNameStrategy, Flow, LanguageContext, LanguagePreparation,
    RewritePrompts, RewriteStrategy,
};
use super::retry::{RetryPolicy, RetryingGenerator};

/// Identifier columns copied into every artifact
pub const ID_COLUMNS: [&str; 2] = ["Product ID", "SKU"];

const EVENT_BUFFER: usize = 256;

/// Optional inputs that depend on the flow
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryInputs {
    /// Examples table, required by the display-name flow
    pub examples_path: Option<PathBuf>,
    /// Terminology dictionary for the description flow
    pub dictionary_path: Option<PathBuf>,
    /// Free-text instructions added to every prompt
    pub custom_instructions: Option<String>,
    /// Prompt pairs for the rewrite flow
    pub prompt_pairs: Option<RewritePrompts>,
}

/// Everything one run needs from its caller
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input_path: PathBuf,
    /// Language names in processing order; duplicates are ignored
    pub languages: Vec<String>,
    pub output_dir: PathBuf,
    pub flow: Flow,
    pub auxiliary: AuxiliaryInputs,
}

impl RunRequest {
    pub fn new(input_path: impl Into<PathBuf>, languages: Vec<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            languages,
            output_dir: output_dir.into(),
            flow: Flow::default(),
            auxiliary: AuxiliaryInputs::default(),
        }
    }

    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_auxiliary(mut self, auxiliary: AuxiliaryInputs) -> Self {
        self.auxiliary = auxiliary;
        self
    }
}

/// Tunables of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub retry: RetryPolicy,
    pub pacing: PacingPolicy,
    /// Rows per progress-reporting window
    pub batch_size: usize,
    /// Examples per display-name prompt
    pub max_examples: usize,
    /// Apply the dictionary when one is supplied
    pub enforce_dictionary: bool,
    /// Model settings sent with every prompt
    pub model: ModelOptions,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            pacing: PacingPolicy::default(),
            batch_size: 50,
            max_examples: 21,
            enforce_dictionary: true,
            model: ModelOptions::default(),
        }
    }
}

impl From<&TranslationConfig> for OrchestratorSettings {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            retry: config.retry_policy(),
            pacing: config.pacing_policy(),
            batch_size: config.common.batch_size,
            max_examples: config.common.max_examples,
            enforce_dictionary: config.common.enforce_dictionary,
            model: ModelOptions {
                model: config.get_model(),
                temperature: config.common.temperature,
                timeout: config.get_timeout(),
                ..ModelOptions::default()
            },
        }
    }
}

/// Cooperative cancellation checked between cells
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Live progress stream of one run
///
/// Dropping the stream stops the run at the next cell boundary.
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::Receiver<ProgressEvent>,
    cancel: CancelFlag,
}

impl EventStream {
    /// Handle that stops the run between cells
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Wait for the run to end and return every event
    pub async fn collect_all(mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            events.push(event);
        }
        events
    }
}

impl Stream for EventStream {
    type Item = ProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Sending half of the event stream
struct EventSink {
    sender: mpsc::Sender<ProgressEvent>,
    run_id: Uuid,
}

impl EventSink {
    async fn emit(&self, event: ProgressEvent) -> Result<(), RunError> {
        debug!("[{}] event: {:?}", self.run_id, event);
        // A closed receiver means nobody is listening any more
        self.sender.send(event).await.map_err(|_| RunError::Cancelled)
    }
}

/// A requested language with its resolved code
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLanguage {
    pub name: String,
    pub code: String,
}

/// Drives translation runs
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    generator: Arc<dyn TextGenerator>,
    resolver: Arc<dyn LanguageResolver>,
    settings: OrchestratorSettings,
}

impl BatchOrchestrator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        resolver: Arc<dyn LanguageResolver>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self { generator, resolver, settings }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Start a run in the background and return its event stream
    pub fn run(&self, request: RunRequest) -> EventStream {
        self.run_with_cancel(request, CancelFlag::new())
    }

    /// Start a run that stops when `cancel` is set
    pub fn run_with_cancel(&self, request: RunRequest, cancel: CancelFlag) -> EventStream {
        let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
        let orchestrator = self.clone();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let sink = EventSink { sender, run_id: Uuid::new_v4() };
            if let Err(e) = orchestrator.execute(request, &sink, &task_cancel).await {
                error!("[{}] Translation run failed: {}", sink.run_id, e);
                // The receiver may already be gone; nothing else to report to
                let _ = sink.sender.send(ProgressEvent::fatal(&e)).await;
            }
        });

        EventStream { receiver, cancel }
    }

    async fn execute(&self, request: RunRequest, sink: &EventSink, cancel: &CancelFlag) -> Result<(), RunError> {
        let run_id = sink.run_id;
        info!(
            "[{}] Starting {} run on {:?} for languages: {:?}",
            run_id, request.flow, request.input_path, request.languages
        );

        let mut table = Table::read_csv(&request.input_path).map_err(|source| RunError::Input {
            path: request.input_path.display().to_string(),
            source,
        })?;

        let (strategy, enforcer) = self.build_strategy(request.flow, &request.auxiliary)?;
        let source_column = strategy.source_column().to_string();
        table
            .require_columns(&[ID_COLUMNS[0], ID_COLUMNS[1], &source_column])
            .map_err(|source| RunError::Input {
                path: request.input_path.display().to_string(),
                source,
            })?;

        FileManager::ensure_dir(&request.output_dir).map_err(|e| RunError::Output(TableError::Io(e)))?;

        let languages = dedup_languages(&request.languages);
        let (resolved, unresolved) = prepare_columns(&mut table, &languages, self.resolver.as_ref(), strategy.as_ref());
        for error in unresolved {
            warn!("[{}] {}", run_id, error);
            if let LanguageConfigError::Unresolved(name) = &error {
                sink.emit(ProgressEvent::language_error(
                    name,
                    format!("Error processing language {}: {}", name, error),
                ))
                .await?;
            }
        }

        let pacer = Arc::new(Pacer::new(self.settings.pacing.clone()));
        let generator = RetryingGenerator::new(self.generator.clone(), self.settings.retry.clone())
            .with_pacer(pacer.clone());
        let mut translator = CellTranslator::new(generator, strategy.clone(), self.settings.model.clone());
        if let Some(enforcer) = enforcer {
            translator = translator.with_enforcer(enforcer);
        }

        let mut completed_languages: Vec<String> = Vec::new();
        let mut completed_columns: Vec<String> = Vec::new();
        let mut completed_files: Vec<CompletedFile> = Vec::new();

        for language in &resolved {
            if completed_languages.contains(&language.name) {
                continue;
            }

            let context = match strategy.prepare(&language.name, &language.code) {
                LanguagePreparation::Ready(context) => context,
                LanguagePreparation::NoExamples => {
                    warn!("[{}] No examples found for language: {}", run_id, language.name);
                    sink.emit(ProgressEvent::no_examples(&language.name)).await?;
                    continue;
                }
            };

            info!("[{}] Translating {} rows to {}", run_id, table.row_count(), language.name);
            let target_column = strategy.target_column(&language.code);
            self.translate_language(&mut table, &translator, &context, &target_column, &pacer, sink, cancel)
                .await?;

            let file_name = FileManager::language_artifact_name(strategy.kind(), &language.name);
            let columns = [ID_COLUMNS[0], ID_COLUMNS[1], source_column.as_str(), target_column.as_str()];
            match write_artifact(&table, &request.output_dir, &file_name, &columns) {
                Ok(()) => {
                    info!("[{}] Wrote {}", run_id, file_name);
                    completed_languages.push(language.name.clone());
                    completed_columns.push(target_column);
                    completed_files.push(CompletedFile { language: language.name.clone(), file: file_name.clone() });
                    sink.emit(ProgressEvent::language_complete(&language.name, &file_name, &completed_files))
                        .await?;
                }
                Err(e) => {
                    error!("[{}] Failed to write {}: {}", run_id, file_name, e);
                    sink.emit(ProgressEvent::language_error(
                        &language.name,
                        format!("Error processing language {}: {}", language.name, e),
                    ))
                    .await?;
                }
            }
        }

        let combined_name = FileManager::combined_artifact_name(strategy.kind());
        let mut columns: Vec<&str> = vec![ID_COLUMNS[0], ID_COLUMNS[1], source_column.as_str()];
        columns.extend(completed_columns.iter().map(String::as_str));
        write_artifact(&table, &request.output_dir, &combined_name, &columns).map_err(RunError::Output)?;

        info!(
            "[{}] Run complete: {} of {} language(s) translated",
            run_id,
            completed_languages.len(),
            languages.len()
        );
        sink.emit(ProgressEvent::run_complete(&combined_name, completed_files, completed_languages))
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn translate_language(
        &self,
        table: &mut Table,
        translator: &CellTranslator,
        context: &LanguageContext,
        target_column: &str,
        pacer: &Pacer,
        sink: &EventSink,
        cancel: &CancelFlag,
    ) -> Result<(), RunError> {
        let total = table.row_count();
        let batch_size = self.settings.batch_size.max(1);
        let source_column = translator.strategy().source_column().to_string();

        for batch_start in (0..total).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(total);
            let batch = format!("{}-{}", batch_start, batch_end);
            debug!("[{}] {} batch {}", sink.run_id, context.language, batch);

            for index in batch_start..batch_end {
                if cancel.is_cancelled() {
                    return Err(RunError::Cancelled);
                }

                let existing = table.get(index, target_column).unwrap_or_default();
                if existing.trim().is_empty() {
                    let source = table.get(index, &source_column).unwrap_or_default().to_string();
                    let outcome = match translator.translate_cell(&source, context).await {
                        Ok(text) => table.set(index, target_column, text).map_err(|e| e.to_string()),
                        Err(e) => Err(e.to_string()),
                    };
                    if !source.trim().is_empty() {
                        pacer.after_cell().await;
                    }
                    if let Err(message) = outcome {
                        error!("[{}] {} row {}: {}", sink.run_id, context.language, index, message);
                        sink.emit(ProgressEvent::cell_error(&context.language, index, message)).await?;
                        continue;
                    }
                }

                sink.emit(ProgressEvent::progress(&context.language, percent_done(index, total), batch.clone()))
                    .await?;
            }
        }

        Ok(())
    }

    fn build_strategy(
        &self,
        flow: Flow,
        auxiliary: &AuxiliaryInputs,
    ) -> Result<(Arc<dyn CellStrategy>, Option<TermEnforcer>), RunError> {
        let instructions = auxiliary.custom_instructions.clone().unwrap_or_default();

        match flow {
            Flow::Description => {
                let enforcer = match &auxiliary.dictionary_path {
                    Some(path) if self.settings.enforce_dictionary => {
                        let dictionary = Dictionary::load(path).map_err(|source| RunError::Auxiliary {
                            what: "dictionary",
                            path: path.display().to_string(),
                            source,
                        })?;
                        info!("Loaded {} dictionary term(s) from {:?}", dictionary.len(), path);
                        Some(TermEnforcer::new(dictionary, self.settings.model.clone()))
                    }
                    _ => None,
                };
                Ok((Arc::new(DescriptionStrategy::new(instructions)), enforcer))
            }
            Flow::DisplayNames => {
                let path = auxiliary
                    .examples_path
                    .as_ref()
                    .ok_or(RunError::MissingAuxiliary("examples"))?;
                let examples = ExamplesTable::load(path).map_err(|source| RunError::Auxiliary {
                    what: "examples",
                    path: path.display().to_string(),
                    source,
                })?;
                let strategy = DisplayNameStrategy::new(examples, self.settings.max_examples)
                    .with_instructions(instructions);
                Ok((Arc::new(strategy), None))
            }
            Flow::Rewrite => {
                let prompts = auxiliary.prompt_pairs.clone().unwrap_or_default();
                Ok((Arc::new(RewriteStrategy::new(prompts)), None))
            }
        }
    }
}

/// Requested languages in order, each once
pub fn dedup_languages(languages: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    languages
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && seen.insert(l.to_string()))
        .map(str::to_string)
        .collect()
}

/// Resolve every language and create its target column before any cell is translated
pub fn prepare_columns(
    table: &mut Table,
    languages: &[String],
    resolver: &dyn LanguageResolver,
    strategy: &dyn CellStrategy,
) -> (Vec<ResolvedLanguage>, Vec<LanguageConfigError>) {
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();

    for name in languages {
        match resolver.resolve(name) {
            Some(code) => {
                table.ensure_column(&strategy.target_column(&code));
                resolved.push(ResolvedLanguage { name: name.clone(), code });
            }
            None => unresolved.push(LanguageConfigError::Unresolved(name.clone())),
        }
    }

    (resolved, unresolved)
}

fn write_artifact(table: &Table, output_dir: &std::path::Path, file_name: &str, columns: &[&str]) -> Result<(), TableError> {
    let path = FileManager::output_path(output_dir, file_name).ok_or_else(|| {
        TableError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid artifact name '{}'", file_name),
        ))
    })?;
    table.write_columns(path, columns)
}
