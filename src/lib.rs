/*!
 * # catalog-translator
 *
 * A Rust library for batch translation of product catalog tables using AI.
 *
 * ## Features
 *
 * - Translate product descriptions and display names into several languages
 * - Use various AI providers:
 *   - OpenAI API (and OpenAI-compatible servers such as LM Studio)
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Few-shot display-name translation from curated examples
 * - Two-stage rewriting with caller-defined prompts
 * - Best-effort terminology enforcement from a dictionary
 * - Retries with exponential backoff and explicit pacing
 * - Live progress as newline-delimited JSON events
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `language_config`: Language name/code table
 * - `table`: CSV input and output
 * - `translation`: The translation pipeline:
 *   - `translation::orchestrator`: Runs over languages and rows
 *   - `translation::cell`: Translation of a single cell
 *   - `translation::prompts`: Per-flow strategies
 *   - `translation::retry`: Retrying generator
 * - `file_utils`: Output directory and artifact names
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scripted generator for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_config;
pub mod providers;
pub mod table;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{ProviderError, RunError, TableError, TranslationError};
pub use language_config::{LanguageConfigStore, LanguageResolver, LanguageTable};
pub use providers::TextGenerator;
pub use table::Table;
pub use translation::{BatchOrchestrator, ProgressEvent, RunRequest};
