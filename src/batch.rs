use crate::{
    config::Config,
    progress,
    service::TransformService,
    throttle::{FixedDelayGate, Throttle},
    transform::{FileTransformer, Outcome},
};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Cooperative cancellation flag checked between files.
///
/// Cloning shares the underlying flag, so a token handed out before the run
/// can stop the batch from another thread. Cancellation never interrupts a
/// file mid-flight; the batch finishes the current file and stops before the
/// next one.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a fresh, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Counters for one batch invocation. Owned by the runner, single writer.
struct BatchState {
    total: usize,
    processed: usize,
    started: Instant,
}

impl BatchState {
    fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            started: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn remaining(&self) -> Option<Duration> {
        progress::estimate_remaining(self.elapsed(), self.processed, self.total)
    }
}

/// Final report of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Files found by discovery after deduplication
    pub discovered: usize,

    /// Files handed to the transformer
    pub attempted: usize,

    /// Files successfully rewritten in place
    pub rewritten: usize,

    /// Empty files skipped without side effects
    pub skipped: usize,

    /// Files that failed; the batch continued past each
    pub failed: usize,

    /// Whether the run stopped early on a cancellation request
    pub cancelled: bool,

    /// Total wall-clock time of the run
    pub elapsed: Duration,
}

/// Discovers target files and drives the per-file transformer over them,
/// strictly sequentially, with throttling between service calls.
pub struct BatchRunner<'a> {
    config: &'a Config,
    service: &'a dyn TransformService,
    throttle: Box<dyn Throttle + 'a>,
    cancel: CancellationToken,
}

impl<'a> BatchRunner<'a> {
    /// Creates a runner over a validated configuration and a service.
    #[must_use]
    pub fn new(config: &'a Config, service: &'a dyn TransformService) -> Self {
        Self {
            config,
            service,
            throttle: Box::new(FixedDelayGate::new(config.throttle_delay)),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the pacing gate. The default is a fixed delay taken from the
    /// configuration.
    #[must_use]
    pub fn with_throttle(mut self, throttle: impl Throttle + 'a) -> Self {
        self.throttle = Box::new(throttle);
        self
    }

    /// Installs a cancellation token checked between files.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Runs the full batch: discover, estimate, process, summarize.
    ///
    /// Per-file failures are logged and counted but never abort the run; the
    /// summary reports how each file ended up.
    pub fn run(&self) -> BatchSummary {
        info!(
            "Collecting '{}' files under {} root(s)...",
            self.config.extension,
            self.config.roots.len()
        );

        let files = self.discover();
        let total = files.len();

        if total == 0 {
            info!(
                "Nothing to do: no '{}' files found under the given paths",
                self.config.extension
            );
            return BatchSummary {
                discovered: 0,
                attempted: 0,
                rewritten: 0,
                skipped: 0,
                failed: 0,
                cancelled: false,
                elapsed: Duration::ZERO,
            };
        }

        let per_file = self.config.latency_estimate + self.config.throttle_delay;
        info!("Found {} file(s) to process", total);
        info!(
            "Estimated duration: about {}",
            progress::format_duration(per_file * total as u32)
        );

        let transformer = FileTransformer::new(self.config, self.service);
        let mut state = BatchState::new(total);
        let mut summary = BatchSummary {
            discovered: total,
            attempted: 0,
            rewritten: 0,
            skipped: 0,
            failed: 0,
            cancelled: false,
            elapsed: Duration::ZERO,
        };

        for (index, path) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    "Cancellation requested, stopping after {} of {} file(s)",
                    index, total
                );
                summary.cancelled = true;
                break;
            }

            summary.attempted += 1;
            match transformer.transform(path) {
                Outcome::Rewritten => summary.rewritten += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Failed(_) => summary.failed += 1,
            }
            state.processed += 1;

            render_progress(&state, index + 1, &path.display().to_string());

            if index + 1 < total {
                self.throttle.pause();
            }
        }

        summary.elapsed = state.elapsed();
        finish_progress(&summary);
        summary
    }

    /// Collects target files under the configured roots.
    ///
    /// A root that is a file is included as-is; a directory is walked
    /// recursively for names that case-insensitively end with the target
    /// extension. Unreadable roots and entries are warned about and skipped.
    /// The result keeps first-seen order with duplicates removed.
    fn discover(&self) -> Vec<PathBuf> {
        let extension = self.config.extension.to_lowercase();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files: Vec<PathBuf> = Vec::new();

        let mut push_unique = |path: PathBuf| {
            // Canonical form as the dedup key so the same file reached
            // through two roots is processed once.
            let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if seen.insert(key) {
                files.push(path);
            }
        };

        for root in &self.config.roots {
            if root.is_file() {
                push_unique(root.clone());
                continue;
            }

            if !root.is_dir() {
                warn!(
                    "Skipping inaccessible root {}: not a readable file or directory",
                    root.display()
                );
                continue;
            }

            for entry in WalkDir::new(root).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        let name = entry.file_name().to_string_lossy();
                        if name.to_lowercase().ends_with(&extension) {
                            push_unique(entry.into_path());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Scan error under {}: {}", root.display(), e);
                    }
                }
            }
        }

        files
    }
}

/// Redraws the in-place progress line on stdout for the file just handled.
fn render_progress(state: &BatchState, index: usize, display_path: &str) {
    let line = progress::render_line(
        index,
        state.total,
        display_path,
        state.elapsed(),
        state.remaining(),
    );
    print!("\r{line}");
    let _ = std::io::stdout().flush();
}

/// Terminates the progress line and prints the final summary.
fn finish_progress(summary: &BatchSummary) {
    if summary.attempted > 0 {
        println!();
    }
    println!(
        "Processed {}/{} file(s) ({} rewritten, {} skipped, {} failed) in {}",
        summary.attempted,
        summary.discovered,
        summary.rewritten,
        summary.skipped,
        summary.failed,
        progress::format_duration(summary.elapsed)
    );
}
