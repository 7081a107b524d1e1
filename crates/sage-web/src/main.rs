//! Chat with the statesman from a browser or curl.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p sage-web
//! GEMINI_API_KEY=... cargo run -p sage-web -- --port 8080
//! GEMINI_API_KEY=... cargo run -p sage-web -- --static-dir ./public
//! ```
//!
//! ## Sending messages
//!
//! **REST** (`POST /api/chat`):
//! ```json
//! {"message": "What is meritocracy?"}
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sage_rag::config::parse_timeout_secs;
use sage_rag::logging;
use sage_rag::prelude::*;
use sage_web::{WebConfig, spawn_web};

/// Serve the statesman chat over HTTP.
#[derive(Parser)]
#[command(about = "Statesman chat served over a small REST API")]
struct Args {
    /// Port for the web server.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Directory of static files to serve alongside the API.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// JSON file with an array of {"topic", "text"} passages (default: built-in).
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Generation endpoint (overrides SAGE_ENDPOINT).
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-request timeout in seconds (overrides SAGE_TIMEOUT_SECS).
    #[arg(long)]
    timeout_secs: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    logging::init("info")?;

    // 1. Knowledge base.
    let corpus = match &args.corpus {
        Some(path) => Corpus::load(path).map_err(|e| e.to_string())?,
        None => Corpus::builtin(),
    };

    // 2. Generation client: env first, then flags.
    let mut config = RagConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(endpoint) = args.endpoint {
        config = config.with_endpoint(endpoint).map_err(|e| e.to_string())?;
    }
    if let Some(raw) = &args.timeout_secs {
        config = config.with_timeout(parse_timeout_secs(raw).map_err(|e| e.to_string())?);
    }
    let client = config.build_client().map_err(|e| e.to_string())?;

    // 3. Controller shared by every request.
    let controller = ConversationController::new(Arc::new(corpus), Arc::new(client));

    // 4. Serve.
    let web_config = WebConfig {
        bind_addr: ([127, 0, 0, 1], args.port).into(),
        static_dir: args.static_dir,
    };
    let addr = spawn_web(controller, web_config)
        .await
        .map_err(|e| format!("failed to start web server: {e}"))?;
    println!("Chat API: http://{addr}/api/state");
    println!("Press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for Ctrl-C: {e}"))?;
    Ok(())
}
