//! Ask the statesman a question from the terminal.
//!
//! Reads the optional API key from the `GEMINI_API_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # One-shot question
//! sage --query "What is meritocracy?"
//!
//! # Interactive session: one question per line, /quit to exit
//! sage
//!
//! # Print the augmented prompt without calling the service
//! sage --query "foreign policy" --dry-run
//!
//! # Custom knowledge base and endpoint
//! sage --corpus kb.json --endpoint http://localhost:8080/generate
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use sage_rag::config::parse_timeout_secs;
use sage_rag::prelude::*;
use sage_rag::{logging, prompt, retriever};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Ask a firm, direct, pragmatic statesman about a small fixed knowledge base.
#[derive(Parser)]
#[command(name = "sage")]
struct Cli {
    // ── Input ──────────────────────────────────────────────────
    /// Ask a single question and exit. Without this, reads questions from stdin.
    #[arg(long)]
    query: Option<String>,

    /// Print the augmented prompt for --query instead of sending it
    #[arg(long, requires = "query")]
    dry_run: bool,

    // ── Knowledge base ─────────────────────────────────────────
    /// JSON file with an array of {"topic", "text"} passages (default: built-in)
    #[arg(long)]
    corpus: Option<PathBuf>,

    // ── Generation service ─────────────────────────────────────
    /// Generation endpoint (overrides SAGE_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-request timeout in seconds (overrides SAGE_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<String>,

    // ── Diagnostics ────────────────────────────────────────────
    /// Log request details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn load_corpus(cli: &Cli) -> Result<Corpus, String> {
    match &cli.corpus {
        Some(path) => Corpus::load(path).map_err(|e| e.to_string()),
        None => Ok(Corpus::builtin()),
    }
}

fn build_config(cli: &Cli) -> Result<RagConfig, String> {
    let mut config = RagConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(endpoint) = &cli.endpoint {
        config = config
            .with_endpoint(endpoint.clone())
            .map_err(|e| e.to_string())?;
    }
    if let Some(raw) = &cli.timeout_secs {
        config = config.with_timeout(parse_timeout_secs(raw).map_err(|e| e.to_string())?);
    }
    Ok(config)
}

/// Print the outcome of one turn. Returns `false` when the turn failed.
fn report(outcome: &SubmitOutcome, controller: &ConversationController) -> bool {
    match outcome {
        SubmitOutcome::Answered(reply) => {
            println!("{reply}");
            true
        }
        SubmitOutcome::Failed(_) => {
            let message = controller
                .last_error()
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
            eprintln!("{message}");
            false
        }
        SubmitOutcome::Ignored | SubmitOutcome::Busy => true,
    }
}

async fn interactive(controller: &ConversationController) -> Result<(), String> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout()
            .flush()
            .map_err(|e| format!("failed to flush stdout: {e}"))?;

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("failed to read stdin: {e}"))?
        else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        controller.set_input(line);
        let outcome = controller.submit_input().await;
        report(&outcome, controller);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<(), String> {
    let corpus = Arc::new(load_corpus(cli)?);

    if cli.dry_run
        && let Some(query) = &cli.query
    {
        let passages = retriever::select(query, &corpus);
        println!("{}", prompt::build(query, &passages, &corpus));
        return Ok(());
    }

    let config = build_config(cli)?;
    let client = config.build_client().map_err(|e| e.to_string())?;
    let controller = ConversationController::new(corpus, Arc::new(client));

    match &cli.query {
        Some(query) => {
            let outcome = controller.submit_query(query).await;
            if matches!(outcome, SubmitOutcome::Ignored) {
                return Err("--query must not be blank".to_string());
            }
            if !report(&outcome, &controller) {
                process::exit(1);
            }
            Ok(())
        }
        None => interactive(&controller).await,
    }
}

/// Default filter; `--verbose` adds library debug output on top of `warn`.
fn log_directive(verbose: bool) -> &'static str {
    if verbose { "warn,sage_rag=debug" } else { "warn" }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(log_directive(cli.verbose)) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
