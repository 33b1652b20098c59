/*!
 * Prompt templates for catalog translation.
 *
 * Templates use `{name}` placeholders that are substituted verbatim; unknown
 * placeholders are left untouched.
 */

use serde::{Deserialize, Serialize};

/// System prompt for description translation
pub const DESCRIPTION_SYSTEM: &str = "You are an expert product translator.";

/// User prompt for description translation
pub const DESCRIPTION_USER: &str = r#"You are a professional product description translator.
Translate this text to {language}, maintaining a natural and professional tone:

{text}

Custom user instructions:
{instructions}

Important:
- Keep product terminology consistent and accurate
- Maintain the same level of detail as the original
- Ensure proper grammar and natural flow in {language}
- Preserve the exact meaning of technical terms
"#;

/// System prompt for display-name translation
pub const DISPLAY_NAME_SYSTEM: &str = "You are a translator for an e-commerce store specializing in men's accessories like ties. \
Use the examples to translate the display names correctly to {language}.";

/// User prompt for display-name translation
pub const DISPLAY_NAME_USER: &str = "Here are examples of how display names have been translated to {language}:\n{examples}\n\n\
Original display name: '{text}'. Translate the display name to {language} according to the examples above. \
Only the translation, without extra information.";

/// A system prompt and user prompt template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self { system: system.into(), user: user.into() }
    }

    /// Render both templates with the same variables
    pub fn render(&self, vars: &[(&str, &str)]) -> (String, String) {
        (render(&self.system, vars), render(&self.user, vars))
    }
}

/// Caller-supplied prompts for the two-stage rewrite
///
/// The output of `first` is the `{text}` of `second`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewritePrompts {
    pub first: PromptPair,
    pub second: PromptPair,
}

impl Default for RewritePrompts {
    fn default() -> Self {
        Self {
            first: PromptPair::new(
                "You are an experienced e-commerce copywriter.",
                "Rewrite the following product text so it reads naturally and persuasively. \
                 Keep every fact. Reply with the rewritten text only.\n\n{text}",
            ),
            second: PromptPair::new(
                "You are a meticulous copy editor.",
                "Polish the following product text for grammar, clarity and consistent tone. \
                 Reply with the final text only.\n\n{text}",
            ),
        }
    }
}

/// Substitute `{key}` placeholders
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}
