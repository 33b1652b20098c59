/*!
 * Output normalization for generated text.
 *
 * Every model output passes through here before it is stored in the table:
 * surrounding whitespace is trimmed and the first word of every sentence is
 * capitalized. Display names additionally lose wrapping quotes, which models
 * like to add around short answers.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Lowercase letter at start of text or after sentence-ending punctuation
static SENTENCE_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[.?!]\s+)(\p{Ll})").unwrap());

/// Text normalization applied to generated output
pub struct OutputFormatter;

impl OutputFormatter {
    /// Trim and fix sentence-initial capitalization
    pub fn normalize(text: &str) -> String {
        Self::capitalize_sentences(text.trim())
    }

    /// Capitalize the first letter following start of text or `. `, `? `, `! `
    pub fn capitalize_sentences(text: &str) -> String {
        SENTENCE_START_REGEX
            .replace_all(text, |caps: &Captures| {
                format!("{}{}", &caps[1], caps[2].to_uppercase())
            })
            .into_owned()
    }

    /// Remove quote characters wrapping the whole text
    pub fn strip_wrapping_quotes(text: &str) -> String {
        text.trim()
            .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '«' | '»'))
            .trim()
            .to_string()
    }
}
