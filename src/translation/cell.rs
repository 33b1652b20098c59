/*!
 * Translation of a single (row, language) cell.
 */

use log::trace;
use std::sync::Arc;

use crate::errors::TranslationError;
use crate::providers::{GenerationRequest, ModelOptions};

use super::dictionary::TermEnforcer;
use super::prompts::{templates, CellPlan, CellStrategy, LanguageContext};
use super::retry::RetryingGenerator;

/// Turns one source text into one stored translation
#[derive(Debug, Clone)]
pub struct CellTranslator {
    generator: RetryingGenerator,
    strategy: Arc<dyn CellStrategy>,
    options: ModelOptions,
    enforcer: Option<TermEnforcer>,
}

impl CellTranslator {
    pub fn new(generator: RetryingGenerator, strategy: Arc<dyn CellStrategy>, options: ModelOptions) -> Self {
        Self { generator, strategy, options, enforcer: None }
    }

    /// Enforce dictionary terms after translation, for flows that use them
    pub fn with_enforcer(mut self, enforcer: TermEnforcer) -> Self {
        self.enforcer = Some(enforcer);
        self
    }

    pub fn strategy(&self) -> &Arc<dyn CellStrategy> {
        &self.strategy
    }

    /// Translate one cell
    ///
    /// Blank source text yields an empty result without calling the model.
    pub async fn translate_cell(&self, source: &str, context: &LanguageContext) -> Result<String, TranslationError> {
        if source.trim().is_empty() {
            return Ok(String::new());
        }

        let stages = match self.strategy.plan(source, context) {
            CellPlan::Fixed(text) => return Ok(text),
            CellPlan::Generate(stages) if stages.is_empty() => {
                return Err(TranslationError::Prompt(format!("{} flow produced no prompts", self.strategy.kind())));
            }
            CellPlan::Generate(stages) => stages,
        };

        let mut current = source.to_string();
        for (i, stage) in stages.iter().enumerate() {
            let mut options = self.options.clone();
            if let Some(temperature) = stage.temperature {
                options.temperature = temperature;
            }
            let user = templates::render(&stage.user, &[("text", &current)]);
            let request = GenerationRequest::new(stage.system.clone(), user, options);

            let generated = self.generator.generate(&request).await?;
            current = self.strategy.post_process(&generated);
            trace!("{} stage {} for {}: {}", self.strategy.kind(), i + 1, context.code, current);
        }

        if let Some(enforcer) = self.enforcer.as_ref().filter(|_| self.strategy.uses_dictionary()) {
            current = enforcer
                .enforce(&self.generator, source, current, &context.language, &context.code)
                .await;
            current = self.strategy.post_process(&current);
        }

        Ok(current)
    }
}
