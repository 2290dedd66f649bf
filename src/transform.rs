use crate::{
    config::Config,
    conflict,
    error::Error,
    prompt::PromptBuilder,
    sanitize,
    service::TransformService,
};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

/// What kind of per-file failure occurred. Failures never abort the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The file could not be read.
    Read,
    /// The prompt template could not produce a request payload.
    Prompt,
    /// The transformation service call failed or returned an unusable
    /// response.
    Service,
    /// The cleaned result could not be written back.
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read error"),
            Self::Prompt => f.write_str("prompt error"),
            Self::Service => f.write_str("service error"),
            Self::Write => f.write_str("write error"),
        }
    }
}

/// Result of transforming one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was rewritten in place with the cleaned result.
    Rewritten,
    /// The file was empty; no service call and no write happened.
    Skipped,
    /// The file failed; the original content is untouched on disk.
    Failed(FailureKind),
}

/// Runs the per-file pipeline: read, resolve conflicts, build the prompt,
/// invoke the service, sanitize, write back.
pub struct FileTransformer<'a> {
    service: &'a dyn TransformService,
    prompt: PromptBuilder,
    config: &'a Config,
}

impl<'a> FileTransformer<'a> {
    /// Creates a transformer sharing the batch configuration and service.
    #[must_use]
    pub fn new(config: &'a Config, service: &'a dyn TransformService) -> Self {
        Self {
            service,
            prompt: PromptBuilder::new(config.template.clone(), config.prompt_mode),
            config,
        }
    }

    /// Transforms a single file in place.
    ///
    /// Exactly one write happens on full success; every failure and the
    /// empty-file skip leave the file untouched. Failures are logged here
    /// with the file path and reported through the returned [`Outcome`].
    pub fn transform(&self, path: &Path) -> Outcome {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                return Outcome::Failed(FailureKind::Read);
            }
        };

        if content.is_empty() {
            debug!("Skipping empty file {}", path.display());
            return Outcome::Skipped;
        }

        let resolution = conflict::resolve(&content, self.config.strategy);
        if resolution.was_conflicted {
            info!(
                "Resolved merge conflict in {} keeping the '{}' side",
                path.display(),
                self.config.strategy
            );
        }

        let file_type = self.config.file_type_label();
        let prompt = match self
            .prompt
            .build(&resolution.content, Some(&file_type))
        {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("Cannot build prompt for {}: {}", path.display(), e);
                return Outcome::Failed(FailureKind::Prompt);
            }
        };

        let raw = match self.service.transform(&prompt) {
            Ok(raw) => raw,
            Err(Error::EmptyResponse) => {
                error!(
                    "Service returned no candidate output for {}",
                    path.display()
                );
                return Outcome::Failed(FailureKind::Service);
            }
            Err(Error::NonText) => {
                error!("Service returned a non-text payload for {}", path.display());
                return Outcome::Failed(FailureKind::Service);
            }
            Err(e) => {
                error!("Service call failed for {}: {}", path.display(), e);
                return Outcome::Failed(FailureKind::Service);
            }
        };

        let cleaned = sanitize::clean(&raw);

        if let Err(e) = fs::write(path, &cleaned) {
            error!("Failed to write {}: {}", path.display(), e);
            return Outcome::Failed(FailureKind::Write);
        }

        debug!("Rewrote {}", path.display());
        Outcome::Rewritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConflictStrategy, PromptMode};
    use crate::error::Result;
    use assert_fs::prelude::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Scripted service: returns queued responses and records every prompt.
    struct MockService {
        responses: RefCell<VecDeque<Result<String>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl MockService {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.borrow().len()
        }
    }

    impl TransformService for MockService {
        fn transform(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(Error::EmptyResponse))
        }
    }

    fn test_config(root: &std::path::Path) -> Config {
        Config::builder()
            .root(root)
            .template("Clean this file:\n{{ content }}")
            .strategy(ConflictStrategy::Ours)
            .build()
            .unwrap()
    }

    #[test]
    fn test_successful_rewrite_strips_fence() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.xml");
        file.write_str("<mapper>old</mapper>").unwrap();

        let config = test_config(temp.path());
        let service = MockService::new(vec![Ok("```xml\n<mapper>new</mapper>\n```".into())]);

        let outcome = FileTransformer::new(&config, &service).transform(file.path());

        assert_eq!(outcome, Outcome::Rewritten);
        assert_eq!(service.calls(), 1);
        file.assert("<mapper>new</mapper>");
    }

    #[test]
    fn test_empty_file_skipped_without_side_effects() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("empty.xml");
        file.touch().unwrap();

        let config = test_config(temp.path());
        let service = MockService::new(vec![Ok("should never be used".into())]);

        let outcome = FileTransformer::new(&config, &service).transform(file.path());

        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(service.calls(), 0);
        file.assert("");
    }

    #[test]
    fn test_service_error_leaves_file_untouched() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.xml");
        let original = "<mapper>original</mapper>";
        file.write_str(original).unwrap();

        let config = test_config(temp.path());
        let service = MockService::new(vec![Err(Error::service("boom"))]);

        let outcome = FileTransformer::new(&config, &service).transform(file.path());

        assert_eq!(outcome, Outcome::Failed(FailureKind::Service));
        file.assert(original);
    }

    #[test]
    fn test_empty_and_non_text_responses_fail() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = test_config(temp.path());

        for err in [Error::EmptyResponse, Error::NonText] {
            let file = temp.child("user.xml");
            file.write_str("<mapper/>").unwrap();

            let service = MockService::new(vec![Err(err)]);
            let outcome = FileTransformer::new(&config, &service).transform(file.path());

            assert_eq!(outcome, Outcome::Failed(FailureKind::Service));
            file.assert("<mapper/>");
        }
    }

    #[test]
    fn test_read_failure() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = test_config(temp.path());
        let service = MockService::new(vec![]);

        let outcome = FileTransformer::new(&config, &service)
            .transform(&temp.path().join("missing.xml"));

        assert_eq!(outcome, Outcome::Failed(FailureKind::Read));
        assert_eq!(service.calls(), 0);
    }

    #[test]
    fn test_conflict_resolved_before_prompting() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.xml");
        file.write_str("a\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>>\nb")
            .unwrap();

        let config = test_config(temp.path());
        let service = MockService::new(vec![Ok("cleaned".into())]);

        let outcome = FileTransformer::new(&config, &service).transform(file.path());
        assert_eq!(outcome, Outcome::Rewritten);

        let prompts = service.prompts.borrow();
        assert!(prompts[0].contains("a\nmine\nb"));
        assert!(!prompts[0].contains("theirs"));
        assert!(!prompts[0].contains("<<<<<<<"));
    }

    #[test]
    fn test_malformed_template_fails_before_service_call() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.xml");
        file.write_str("<mapper/>").unwrap();

        let config = Config::builder()
            .root(temp.path())
            .template("no slot here")
            .prompt_mode(PromptMode::Substitute)
            .build()
            .unwrap();
        let service = MockService::new(vec![Ok("never".into())]);

        let outcome = FileTransformer::new(&config, &service).transform(file.path());

        assert_eq!(outcome, Outcome::Failed(FailureKind::Prompt));
        assert_eq!(service.calls(), 0);
        file.assert("<mapper/>");
    }

    #[test]
    fn test_prepend_mode_header_uses_extension() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.xml");
        file.write_str("<mapper/>").unwrap();

        let config = Config::builder()
            .root(temp.path())
            .template("Rewrite the queries.")
            .prompt_mode(PromptMode::Prepend)
            .build()
            .unwrap();
        let service = MockService::new(vec![Ok("done".into())]);

        FileTransformer::new(&config, &service).transform(file.path());

        let prompts = service.prompts.borrow();
        assert!(prompts[0].contains("--- XML FILE CONTENT ---"));
    }
}
