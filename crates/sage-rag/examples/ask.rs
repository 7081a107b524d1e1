//! Minimal example: one question through the full pipeline.
//!
//! Builds a controller over the built-in knowledge base, asks a question,
//! and prints the resulting history.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --example ask
//! ```

use std::sync::Arc;

use sage_rag::prelude::*;

#[tokio::main]
async fn main() -> Result<(), String> {
    // 1. Configure the generation client from the environment.
    let config = RagConfig::from_env().map_err(|e| e.to_string())?;
    let client = config.build_client().map_err(|e| e.to_string())?;

    // 2. Wire the controller to the bundled knowledge base.
    let controller = ConversationController::new(Arc::new(Corpus::builtin()), Arc::new(client));

    // 3. Run one turn.
    let outcome = controller.submit_query("How should a small country survive?").await;
    if let SubmitOutcome::Failed(err) = &outcome {
        eprintln!("generation failed: {err}");
    }

    // 4. Print the conversation.
    for turn in controller.history() {
        println!("[{}] {}\n", turn.role, turn.text);
    }
    println!("--- state: {:?} ---", controller.state());

    Ok(())
}
