/*!
 * Catalog translation pipeline.
 *
 * This module contains everything between a caller's run request and the
 * external text generator. It is split into several submodules:
 *
 * - `orchestrator`: Runs over languages and rows, writes artifacts, emits events
 * - `cell`: Translation of a single (row, language) cell
 * - `prompts`: Per-flow strategies and prompt templates
 * - `retry`: Bounded retries with exponential backoff
 * - `pacing`: Rate limiting between cells and calls
 * - `examples`: Curated display-name examples
 * - `dictionary`: Terminology enforcement
 * - `formatting`: Output normalization
 * - `events`: Progress event model
 */

// Re-export main types for easier usage
pub use self::cell::CellTranslator;
pub use self::events::{CompletedFile, Progress, ProgressEvent};
pub use self::orchestrator::{
    AuxiliaryInputs, BatchOrchestrator, CancelFlag, EventStream, OrchestratorSettings, RunRequest,
};
pub use self::pacing::{Pacer, PacingPolicy};
pub use self::prompts::{CellStrategy, Flow, PromptPair, RewritePrompts};
pub use self::retry::{RetryPolicy, RetryingGenerator};

// Submodules
pub mod cell;
pub mod dictionary;
pub mod events;
pub mod examples;
pub mod formatting;
pub mod orchestrator;
pub mod pacing;
pub mod prompts;
pub mod retry;
