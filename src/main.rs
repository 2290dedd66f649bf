use anyhow::Context;
use clap::Parser;
use requery::{Config, ConflictStrategy, GeminiClient, PromptMode};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "requery",
    version,
    author,
    about = "Batch-clean database-query mapping files through an LLM",
    long_about = "Batch-clean database-query mapping files through an LLM.\n\n\
    This tool discovers mapping files (MyBatis mapper XML and similar) under \
    the given paths, resolves leftover merge-conflict markers, sends each file \
    through the transformation service, and overwrites the file with the \
    cleaned result. Processing is strictly sequential with a fixed pause \
    between service calls.\n\n\
    USAGE EXAMPLES:\n  \
      # Clean every .xml mapper under a repository\n  \
      requery ./my-repo\n\n  \
      # Keep the incoming side of conflicts, slower pacing\n  \
      requery --strategy theirs --delay 10 ./my-repo\n\n  \
      # A different extension and prompt template\n  \
      requery --ext sql --prompt ./prompts/cleanup.txt ./queries"
)]
struct Cli {
    /// Paths (files or directories) to discover mapping files under
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Target file extension (leading dot optional)
    #[arg(short, long, default_value = ".xml", value_name = "EXT")]
    ext: String,

    /// Path to the prompt template file
    #[arg(short, long, default_value = "prompt.txt", value_name = "FILE")]
    prompt: PathBuf,

    /// Which side of a merge conflict to keep
    #[arg(short, long, value_enum, default_value = "ours")]
    strategy: CliStrategy,

    /// How the template combines with file content
    #[arg(long, value_enum, default_value = "substitute")]
    prompt_mode: CliPromptMode,

    /// Model name to request from the service
    #[arg(short, long, default_value = requery::DEFAULT_MODEL)]
    model: String,

    /// Service API endpoint
    #[arg(long, default_value = requery::DEFAULT_ENDPOINT, value_name = "URL")]
    endpoint: String,

    /// API key for the transformation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Pause between consecutive service calls, in seconds
    #[arg(long, default_value_t = 5, value_name = "SECONDS")]
    delay: u64,

    /// Assumed per-file service latency for the upfront estimate, in seconds
    #[arg(long, default_value_t = 3, value_name = "SECONDS")]
    latency_estimate: u64,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliStrategy {
    /// Keep the lines from the current branch
    Ours,
    /// Keep the lines from the incoming branch
    Theirs,
}

impl From<CliStrategy> for ConflictStrategy {
    fn from(s: CliStrategy) -> Self {
        match s {
            CliStrategy::Ours => Self::Ours,
            CliStrategy::Theirs => Self::Theirs,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliPromptMode {
    /// Template carries a {{ content }} slot
    Substitute,
    /// Template is a literal prefix before a file-type header and content
    Prepend,
}

impl From<CliPromptMode> for PromptMode {
    fn from(m: CliPromptMode) -> Self {
        match m {
            CliPromptMode::Substitute => Self::Substitute,
            CliPromptMode::Prepend => Self::Prepend,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let config = Config::builder()
        .roots(cli.paths)
        .extension(cli.ext)
        .template_file(&cli.prompt)
        .strategy(cli.strategy.into())
        .prompt_mode(cli.prompt_mode.into())
        .throttle_delay(Duration::from_secs(cli.delay))
        .latency_estimate(Duration::from_secs(cli.latency_estimate))
        .build()
        .context("Failed to build configuration")?;

    let service = GeminiClient::new(cli.endpoint, cli.api_key, cli.model);

    requery::run(&config, &service);

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("requery=info"),
        1 => EnvFilter::new("requery=debug"),
        _ => EnvFilter::new("requery=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false).with_writer(std::io::stderr))
        .init();

    Ok(())
}
