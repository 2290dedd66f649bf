//! # requery
//!
//! Batch-cleans database-query mapping files through an LLM.
//!
//! ## Features
//!
//! - Merge-conflict marker resolution (`ours`/`theirs`) before prompting
//! - Prompt construction from a one-slot template or a literal prefix
//! - Code-fence sanitization of service responses
//! - Strictly sequential processing with a client-side throttle
//! - Live progress line with elapsed/remaining time
//!
//! ## Quick Start
//!
//! ```no_run
//! use requery::{BatchRunner, Config, ConflictStrategy, GeminiClient};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root("./mappers")
//!     .extension(".xml")
//!     .template_file("prompt.txt")
//!     .strategy(ConflictStrategy::Ours)
//!     .build()?;
//!
//! let service = GeminiClient::new(
//!     requery::DEFAULT_ENDPOINT,
//!     std::env::var("GEMINI_API_KEY")?,
//!     requery::DEFAULT_MODEL,
//! );
//!
//! let summary = BatchRunner::new(&config, &service).run();
//! println!("{} file(s) rewritten", summary.rewritten);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a per-file pipeline driven by a sequential batch loop:
//! 1. **BatchRunner**: discovers targets, estimates duration, paces the loop
//! 2. **FileTransformer**: read → resolve conflicts → prompt → service → write
//! 3. **conflict / prompt / sanitize**: the pure steps of the pipeline

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod batch;
mod config;
pub mod conflict;
mod error;
mod progress;
mod prompt;
pub mod sanitize;
mod service;
mod throttle;
mod transform;

pub use batch::{BatchRunner, BatchSummary, CancellationToken};
pub use config::{Config, ConfigBuilder, ConflictStrategy, PromptMode};
pub use error::{Error, Result};
pub use prompt::PromptBuilder;
pub use service::{GeminiClient, TransformService, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use throttle::{FixedDelayGate, NoThrottle, Throttle};
pub use transform::{FailureKind, FileTransformer, Outcome};

/// Runs a complete batch with the given configuration and service.
///
/// This is the main entry point for the library; it is equivalent to
/// constructing a [`BatchRunner`] with defaults and calling
/// [`run`](BatchRunner::run).
///
/// # Examples
///
/// ```no_run
/// use requery::{Config, GeminiClient};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root(".")
///     .template("{{ content }}")
///     .build()?;
/// let service = GeminiClient::new(
///     requery::DEFAULT_ENDPOINT,
///     "api-key",
///     requery::DEFAULT_MODEL,
/// );
///
/// let summary = requery::run(&config, &service);
/// # Ok(())
/// # }
/// ```
pub fn run(config: &Config, service: &dyn TransformService) -> BatchSummary {
    BatchRunner::new(config, service).run()
}
