/*!
 * Per-cell translation strategies.
 *
 * One orchestrator drives every flow; what differs between translating
 * descriptions, translating display names from curated examples, and the
 * two-stage rewrite lives behind [`CellStrategy`]:
 * - which column is read and which columns are written
 * - what per-language context is needed before any cell is translated
 * - which prompts are sent for a cell, and in how many stages
 * - how the model output is cleaned up
 */

pub mod templates;

use std::fmt::Debug;

use super::examples::{format_examples, ExamplesTable};
use super::formatting::OutputFormatter;

pub use templates::{PromptPair, RewritePrompts};

/// Returned for a display name when no examples exist for the language
pub const NO_EXAMPLES_SENTINEL: &str = "No examples available";

/// Default temperature of the display-name flow
pub const DISPLAY_NAME_TEMPERATURE: f32 = 0.2;

/// Which strategy a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Description,
    DisplayNames,
    Rewrite,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Description => "description",
            Flow::DisplayNames => "display-names",
            Flow::Rewrite => "rewrite",
        }
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Flow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "description" | "descriptions" => Ok(Flow::Description),
            "display-names" | "display-name" => Ok(Flow::DisplayNames),
            "rewrite" | "rewrites" => Ok(Flow::Rewrite),
            _ => Err(anyhow::anyhow!("Invalid flow: {}", s)),
        }
    }
}

/// Per-language data shared by every cell of that language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageContext {
    /// Human-readable name, as requested by the caller
    pub language: String,
    /// Short code from the language table
    pub code: String,
    /// Rendered example lines, if the flow uses them
    pub examples: Option<String>,
}

impl LanguageContext {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self { language: language.into(), code: code.into(), examples: None }
    }
}

/// Result of preparing a language before its rows are processed
#[derive(Debug, Clone, PartialEq)]
pub enum LanguagePreparation {
    Ready(LanguageContext),
    /// The flow needs examples and the language has none
    NoExamples,
}

/// One model call
#[derive(Debug, Clone, PartialEq)]
pub struct PromptStage {
    pub system: String,
    pub user: String,
    /// Overrides the configured temperature
    pub temperature: Option<f32>,
}

/// What to do for one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellPlan {
    /// Run the stages in order, each stage's output is the next stage's `{text}`
    Generate(Vec<PromptStage>),
    /// Store this text without calling the model
    Fixed(String),
}

/// Flow-specific behavior plugged into the cell translator and orchestrator
pub trait CellStrategy: Send + Sync + Debug {
    /// Artifact kind used in output filenames
    fn kind(&self) -> &str;

    /// Column holding the source text
    fn source_column(&self) -> &str;

    /// Column receiving the text for a language code
    fn target_column(&self, code: &str) -> String;

    /// Per-language setup; `NoExamples` skips the language
    fn prepare(&self, language: &str, code: &str) -> LanguagePreparation {
        LanguagePreparation::Ready(LanguageContext::new(language, code))
    }

    /// Prompts for one non-empty source text
    fn plan(&self, text: &str, context: &LanguageContext) -> CellPlan;

    /// Clean up one stage's output
    fn post_process(&self, text: &str) -> String {
        OutputFormatter::normalize(text)
    }

    /// Whether dictionary enforcement applies to this flow
    fn uses_dictionary(&self) -> bool {
        false
    }
}

/// Product description translation with caller instructions
#[derive(Debug, Clone, Default)]
pub struct DescriptionStrategy {
    instructions: String,
}

impl DescriptionStrategy {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self { instructions: instructions.into() }
    }
}

impl CellStrategy for DescriptionStrategy {
    fn kind(&self) -> &str {
        "descriptions"
    }

    fn source_column(&self) -> &str {
        "Description"
    }

    fn target_column(&self, code: &str) -> String {
        format!("Description - {}", code)
    }

    fn plan(&self, text: &str, context: &LanguageContext) -> CellPlan {
        let (system, user) = PromptPair::new(templates::DESCRIPTION_SYSTEM, templates::DESCRIPTION_USER).render(&[
            ("language", &context.language),
            ("instructions", self.instructions.trim()),
            ("text", text),
        ]);
        CellPlan::Generate(vec![PromptStage { system, user, temperature: None }])
    }

    fn uses_dictionary(&self) -> bool {
        true
    }
}

/// Display-name translation seeded with curated examples
#[derive(Debug, Clone)]
pub struct DisplayNameStrategy {
    examples: ExamplesTable,
    max_examples: usize,
    instructions: String,
}

impl DisplayNameStrategy {
    pub fn new(examples: ExamplesTable, max_examples: usize) -> Self {
        Self { examples, max_examples, instructions: String::new() }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

impl CellStrategy for DisplayNameStrategy {
    fn kind(&self) -> &str {
        "display_names"
    }

    fn source_column(&self) -> &str {
        "Display Name"
    }

    fn target_column(&self, code: &str) -> String {
        ExamplesTable::column_for(code)
    }

    fn prepare(&self, language: &str, code: &str) -> LanguagePreparation {
        let pairs = self.examples.examples_for(code, self.max_examples);
        if pairs.is_empty() {
            return LanguagePreparation::NoExamples;
        }
        LanguagePreparation::Ready(LanguageContext {
            language: language.to_string(),
            code: code.to_string(),
            examples: Some(format_examples(&pairs)),
        })
    }

    fn plan(&self, text: &str, context: &LanguageContext) -> CellPlan {
        let Some(examples) = context.examples.as_deref().filter(|e| !e.is_empty()) else {
            return CellPlan::Fixed(NO_EXAMPLES_SENTINEL.to_string());
        };

        let (system, mut user) = PromptPair::new(templates::DISPLAY_NAME_SYSTEM, templates::DISPLAY_NAME_USER)
            .render(&[("language", &context.language), ("examples", examples), ("text", text)]);
        if !self.instructions.trim().is_empty() {
            user.push_str("\n\nAdditional instructions:\n");
            user.push_str(self.instructions.trim());
        }

        CellPlan::Generate(vec![PromptStage { system, user, temperature: Some(DISPLAY_NAME_TEMPERATURE) }])
    }

    fn post_process(&self, text: &str) -> String {
        OutputFormatter::normalize(&OutputFormatter::strip_wrapping_quotes(text))
    }
}

/// Two sequential caller-defined rewrite passes
#[derive(Debug, Clone, Default)]
pub struct RewriteStrategy {
    prompts: RewritePrompts,
}

impl RewriteStrategy {
    pub fn new(prompts: RewritePrompts) -> Self {
        Self { prompts }
    }
}

impl CellStrategy for RewriteStrategy {
    fn kind(&self) -> &str {
        "rewrites"
    }

    fn source_column(&self) -> &str {
        "Description"
    }

    fn target_column(&self, code: &str) -> String {
        format!("Rewrite - {}", code)
    }

    fn plan(&self, _text: &str, context: &LanguageContext) -> CellPlan {
        // `{text}` stays in place; the cell translator fills it per stage
        let vars = [("language", context.language.as_str())];
        let stages = [&self.prompts.first, &self.prompts.second]
            .into_iter()
            .map(|pair| {
                let (system, user) = pair.render(&vars);
                PromptStage { system, user, temperature: None }
            })
            .collect();
        CellPlan::Generate(stages)
    }
}
