use anyhow::{Context, Result};
use futures::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::language_config::LanguageConfigStore;
use crate::providers::{build_generator, TextGenerator};
use crate::translation::{
    BatchOrchestrator, CancelFlag, OrchestratorSettings, Progress, ProgressEvent, RunRequest,
};

// @module: Application controller for catalog translation runs

/// Outcome of a run as seen by the caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// A final `complete: true` event was received
    pub completed: bool,
    /// Languages that reached the complete state
    pub completed_languages: Vec<String>,
    /// Name of the combined artifact
    pub combined_file: Option<String>,
    /// Per-cell and per-language error events
    pub error_count: usize,
    /// Fatal error message, if the run aborted
    pub fatal_error: Option<String>,
    /// Wall time of the run
    pub duration: Duration,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared language name/code table
    languages: LanguageConfigStore,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let languages = LanguageConfigStore::open(&config.language_config_path).with_context(|| {
            format!("Failed to load language config: {}", config.language_config_path.display())
        })?;
        Ok(Self { config, languages })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The language table used to resolve names
    pub fn languages(&self) -> &LanguageConfigStore {
        &self.languages
    }

    /// Orchestrator backed by the configured provider
    pub fn orchestrator(&self) -> Result<BatchOrchestrator> {
        let generator = build_generator(&self.config.translation)
            .context("Failed to create translation provider")?;
        info!(
            "Using {} with model {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );
        Ok(self.orchestrator_with(generator))
    }

    /// Orchestrator backed by an explicit generator
    pub fn orchestrator_with(&self, generator: Arc<dyn TextGenerator>) -> BatchOrchestrator {
        BatchOrchestrator::new(
            generator,
            Arc::new(self.languages.clone()),
            OrchestratorSettings::from(&self.config.translation),
        )
    }

    /// Run a translation, writing every event as one JSON line to `out`
    pub async fn run<W: Write>(
        &self,
        orchestrator: &BatchOrchestrator,
        request: RunRequest,
        out: &mut W,
        show_progress: bool,
        cancel: CancelFlag,
    ) -> Result<RunReport> {
        let start_time = Instant::now();
        let mut display = ProgressDisplay::new(show_progress);
        let mut report = RunReport::default();

        let mut events = orchestrator.run_with_cancel(request, cancel);
        while let Some(event) = events.next().await {
            let line = event.to_ndjson().context("Failed to serialize progress event")?;
            out.write_all(line.as_bytes()).context("Failed to write progress event")?;
            out.flush().context("Failed to flush progress output")?;

            display.update(&event);
            record_event(&mut report, &event);
        }

        report.duration = start_time.elapsed();
        if report.completed {
            info!(
                "Translation completed in {}: {} language(s), {} error(s)",
                Self::format_duration(report.duration),
                report.completed_languages.len(),
                report.error_count
            );
        } else {
            warn!(
                "Translation ended without completing after {}",
                Self::format_duration(report.duration)
            );
        }
        Ok(report)
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

fn record_event(report: &mut RunReport, event: &ProgressEvent) {
    if event.is_final() {
        report.completed = true;
        report.completed_languages = event.completed_languages.clone().unwrap_or_default();
        report.combined_file = event.file.clone();
    } else if event.is_fatal() {
        report.fatal_error = event.error.clone();
    } else if event.error.is_some() {
        report.error_count += 1;
    }
}

/// One progress bar per language
struct ProgressDisplay {
    multi_progress: MultiProgress,
    bars: HashMap<String, ProgressBar>,
}

impl ProgressDisplay {
    fn new(visible: bool) -> Self {
        let target = if visible { ProgressDrawTarget::stderr() } else { ProgressDrawTarget::hidden() };
        Self {
            multi_progress: MultiProgress::with_draw_target(target),
            bars: HashMap::new(),
        }
    }

    fn bar(&mut self, language: &str) -> &ProgressBar {
        let multi_progress = &self.multi_progress;
        self.bars.entry(language.to_string()).or_insert_with(|| {
            let bar = multi_progress.add(ProgressBar::new(100));
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {prefix} {msg}")
                .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {percent}% {msg}"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style.progress_chars("█▓▒░"));
            bar.set_prefix(language.to_string());
            bar
        })
    }

    fn update(&mut self, event: &ProgressEvent) {
        let Some(language) = event.language.as_deref() else {
            return;
        };

        match (event.progress, event.status.as_deref(), event.error.as_deref()) {
            (_, _, Some(error)) => {
                debug!("{}: {}", language, error);
                self.bar(language).set_message("errors reported");
            }
            (Some(Progress::NoExamples), _, _) => {
                self.bar(language).abandon_with_message("skipped: no examples");
            }
            (_, Some("complete"), _) => {
                let bar = self.bar(language);
                bar.set_position(100);
                bar.finish_with_message(event.file.clone().unwrap_or_default());
            }
            (Some(Progress::Percent(percent)), _, _) => {
                let bar = self.bar(language);
                bar.set_position(percent as u64);
                if let Some(batch) = &event.batch {
                    bar.set_message(format!("rows {}", batch));
                }
            }
            _ => {}
        }
    }
}
