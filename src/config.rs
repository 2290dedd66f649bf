use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_THROTTLE_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_LATENCY_ESTIMATE: Duration = Duration::from_secs(3);
const DEFAULT_EXTENSION: &str = ".xml";

/// Policy selecting which side of a merge-conflict block is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStrategy {
    /// Keep the lines between the start marker and the separator.
    Ours,
    /// Keep the lines between the separator and the end marker.
    Theirs,
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ours => f.write_str("ours"),
            Self::Theirs => f.write_str("theirs"),
        }
    }
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ours" => Ok(Self::Ours),
            "theirs" => Ok(Self::Theirs),
            other => Err(Error::config(format!(
                "Unknown conflict strategy '{other}': expected 'ours' or 'theirs'"
            ))),
        }
    }
}

/// How the prompt template combines with file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// The template carries a single `{{ content }}` slot that receives the
    /// file content.
    Substitute,
    /// The template is a literal instruction prefix; a header naming the file
    /// type and the file content are appended after it.
    Prepend,
}

/// Configuration for a batch rewrite run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root paths (files or directories) to discover targets under
    pub roots: Vec<PathBuf>,

    /// Target extension, stored with its leading dot (e.g. `.xml`)
    pub extension: String,

    /// Prompt template text, loaded once before the batch starts
    pub template: String,

    /// Conflict resolution strategy
    pub strategy: ConflictStrategy,

    /// Prompt construction mode
    pub prompt_mode: PromptMode,

    /// Pause inserted between consecutive service calls
    pub throttle_delay: Duration,

    /// Assumed per-file service latency, used only for the upfront estimate
    pub latency_estimate: Duration,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use requery::{Config, ConflictStrategy};
    ///
    /// let config = Config::builder()
    ///     .root("./mappers")
    ///     .template("Clean this file:\n{{ content }}")
    ///     .strategy(ConflictStrategy::Ours)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no root paths were given, the template is empty,
    /// or the extension is empty.
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(Error::config("No target paths given"));
        }

        if self.template.trim().is_empty() {
            return Err(Error::config("Prompt template is empty"));
        }

        if self.extension == "." || self.extension.is_empty() {
            return Err(Error::config("Target extension is empty"));
        }

        Ok(())
    }

    /// Returns the file-type label derived from the configured extension:
    /// the extension without its leading dot, upper-cased.
    #[must_use]
    pub fn file_type_label(&self) -> String {
        self.extension.trim_start_matches('.').to_uppercase()
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    roots: Vec<PathBuf>,
    extension: Option<String>,
    template: Option<String>,
    template_file: Option<PathBuf>,
    strategy: Option<ConflictStrategy>,
    prompt_mode: Option<PromptMode>,
    throttle_delay: Option<Duration>,
    latency_estimate: Option<Duration>,
}

impl ConfigBuilder {
    /// Adds a root path (file or directory) to discover targets under.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Sets all root paths at once.
    #[must_use]
    pub fn roots(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.roots = paths.into_iter().collect();
        self
    }

    /// Sets the target extension. A missing leading dot is normalized, so
    /// both `xml` and `.xml` are accepted.
    #[must_use]
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = Some(ext.into());
        self
    }

    /// Sets the prompt template text directly.
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Loads the prompt template from a file when the configuration is built.
    ///
    /// Takes precedence over [`template`](Self::template) if both are set.
    #[must_use]
    pub fn template_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_file = Some(path.into());
        self
    }

    /// Sets the conflict resolution strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Sets the prompt construction mode.
    #[must_use]
    pub fn prompt_mode(mut self, mode: PromptMode) -> Self {
        self.prompt_mode = Some(mode);
        self
    }

    /// Sets the pause between consecutive service calls.
    #[must_use]
    pub fn throttle_delay(mut self, delay: Duration) -> Self {
        self.throttle_delay = Some(delay);
        self
    }

    /// Sets the assumed per-file service latency used for the upfront
    /// duration estimate.
    #[must_use]
    pub fn latency_estimate(mut self, estimate: Duration) -> Self {
        self.latency_estimate = Some(estimate);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the template file cannot be read or validation
    /// fails.
    pub fn build(self) -> Result<Config> {
        let template = match self.template_file {
            Some(path) => {
                std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?
            }
            None => self.template.unwrap_or_default(),
        };

        let config = Config {
            roots: self.roots,
            extension: normalize_extension(
                self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION),
            ),
            template,
            strategy: self.strategy.unwrap_or(ConflictStrategy::Ours),
            prompt_mode: self.prompt_mode.unwrap_or(PromptMode::Substitute),
            throttle_delay: self.throttle_delay.unwrap_or(DEFAULT_THROTTLE_DELAY),
            latency_estimate: self.latency_estimate.unwrap_or(DEFAULT_LATENCY_ESTIMATE),
        };

        config.validate()?;
        Ok(config)
    }
}

fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim();
    if trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::builder()
            .root(".")
            .template("{{ content }}")
            .build()
            .unwrap();

        assert_eq!(config.extension, ".xml");
        assert_eq!(config.strategy, ConflictStrategy::Ours);
        assert_eq!(config.prompt_mode, PromptMode::Substitute);
        assert_eq!(config.throttle_delay, DEFAULT_THROTTLE_DELAY);
        assert_eq!(config.latency_estimate, DEFAULT_LATENCY_ESTIMATE);
    }

    #[test]
    fn test_extension_normalization() {
        let config = Config::builder()
            .root(".")
            .template("{{ content }}")
            .extension("sql")
            .build()
            .unwrap();
        assert_eq!(config.extension, ".sql");

        let config = Config::builder()
            .root(".")
            .template("{{ content }}")
            .extension(".sql")
            .build()
            .unwrap();
        assert_eq!(config.extension, ".sql");
    }

    #[test]
    fn test_no_roots_rejected() {
        let result = Config::builder().template("{{ content }}").build();
        assert!(result.is_err());
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_empty_template_rejected() {
        let result = Config::builder().root(".").template("   \n").build();
        assert!(result.is_err());
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_template_loaded_from_file() {
        use assert_fs::prelude::*;

        let temp = assert_fs::TempDir::new().unwrap();
        let prompt = temp.child("prompt.txt");
        prompt.write_str("Rewrite:\n{{ content }}").unwrap();

        let config = Config::builder()
            .root(temp.path())
            .template_file(prompt.path())
            .build()
            .unwrap();

        assert!(config.template.starts_with("Rewrite:"));
    }

    #[test]
    fn test_missing_template_file_is_io_error() {
        let result = Config::builder()
            .root(".")
            .template_file("/nonexistent/prompt.txt")
            .build();

        assert!(result.is_err());
        assert!(result.unwrap_err().is_io());
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "ours".parse::<ConflictStrategy>().unwrap(),
            ConflictStrategy::Ours
        );
        assert_eq!(
            "theirs".parse::<ConflictStrategy>().unwrap(),
            ConflictStrategy::Theirs
        );

        let err = "union".parse::<ConflictStrategy>().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("union"));
    }

    #[test]
    fn test_strategy_display_round_trips() {
        for strategy in [ConflictStrategy::Ours, ConflictStrategy::Theirs] {
            let parsed: ConflictStrategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
    }

    #[test]
    fn test_file_type_label() {
        let config = Config::builder()
            .root(".")
            .template("{{ content }}")
            .extension(".xml")
            .build()
            .unwrap();

        assert_eq!(config.file_type_label(), "XML");
    }
}
