use crate::config::PromptMode;
use crate::error::{Error, Result};
use tera::{Context, Tera};

/// Substring patterns that indicate the template carries a content slot.
///
/// Heuristic in the same spirit as checking required variables by substring:
/// it may accept a template that only mentions the variable in a comment,
/// but Tera rendering still produces the final word.
const SLOT_PATTERNS: &[&str] = &["{{ content", "{{content"];

/// Builds the request payload sent to the transformation service.
///
/// The template text is loaded once at startup and shared read-only across
/// every file in the batch; the builder itself is cheap to keep around.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
    mode: PromptMode,
}

impl PromptBuilder {
    /// Creates a builder over the given template.
    ///
    /// A malformed template is not rejected here: per the configuration
    /// contract it surfaces as a [`Error::Prompt`] on the first
    /// [`build`](Self::build) call.
    #[must_use]
    pub fn new(template: impl Into<String>, mode: PromptMode) -> Self {
        Self {
            template: template.into(),
            mode,
        }
    }

    /// Combines the template with file content into a prompt.
    ///
    /// In [`PromptMode::Substitute`] the template must contain a single
    /// `{{ content }}` slot; in [`PromptMode::Prepend`] the template is used
    /// verbatim as an instruction prefix, followed by a header naming the
    /// file type (when a label is given) and the content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prompt`] if the substitute template lacks the content
    /// slot or fails to render.
    pub fn build(&self, content: &str, file_type: Option<&str>) -> Result<String> {
        match self.mode {
            PromptMode::Substitute => self.render_substitute(content),
            PromptMode::Prepend => Ok(self.render_prepend(content, file_type)),
        }
    }

    fn render_substitute(&self, content: &str) -> Result<String> {
        if !SLOT_PATTERNS
            .iter()
            .any(|pattern| self.template.contains(pattern))
        {
            return Err(Error::prompt(
                "template has no {{ content }} slot for the file content",
            ));
        }

        let mut context = Context::new();
        context.insert("content", content);

        Tera::one_off(&self.template, &context, false)
            .map_err(|e| Error::prompt(format!("failed to render template: {e}")))
    }

    fn render_prepend(&self, content: &str, file_type: Option<&str>) -> String {
        let header = match file_type {
            Some(label) => format!("--- {label} FILE CONTENT ---"),
            None => "--- FILE CONTENT ---".to_string(),
        };

        format!("{}\n\n{header}\n{content}", self.template.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_renders_content() {
        let builder = PromptBuilder::new(
            "Clean up this mapper file:\n{{ content }}",
            PromptMode::Substitute,
        );

        let prompt = builder.build("<mapper/>", None).unwrap();
        assert_eq!(prompt, "Clean up this mapper file:\n<mapper/>");
    }

    #[test]
    fn test_substitute_missing_slot_fails_at_first_use() {
        // Construction succeeds; the malformed template is only rejected
        // when the first prompt is built.
        let builder = PromptBuilder::new("Clean up this file.", PromptMode::Substitute);

        let err = builder.build("<mapper/>", None).unwrap_err();
        assert!(matches!(err, Error::Prompt { .. }));
    }

    #[test]
    fn test_substitute_content_braces_are_literal() {
        let builder = PromptBuilder::new("{{ content }}", PromptMode::Substitute);

        let content = "SELECT '{{ not_a_variable }}' FROM t";
        let prompt = builder.build(content, None).unwrap();
        assert_eq!(prompt, content);
    }

    #[test]
    fn test_prepend_with_label() {
        let builder = PromptBuilder::new("Rewrite the queries.", PromptMode::Prepend);

        let prompt = builder.build("<mapper/>", Some("XML")).unwrap();
        assert_eq!(
            prompt,
            "Rewrite the queries.\n\n--- XML FILE CONTENT ---\n<mapper/>"
        );
    }

    #[test]
    fn test_prepend_without_label() {
        let builder = PromptBuilder::new("Rewrite the queries.\n", PromptMode::Prepend);

        let prompt = builder.build("body", None).unwrap();
        assert_eq!(prompt, "Rewrite the queries.\n\n--- FILE CONTENT ---\nbody");
    }

    #[test]
    fn test_substitute_slot_spacing_variants() {
        for template in ["{{ content }}", "{{content}}", "pre {{ content }} post"] {
            let builder = PromptBuilder::new(template, PromptMode::Substitute);
            assert!(builder.build("x", None).is_ok(), "rejected {template:?}");
        }
    }
}
