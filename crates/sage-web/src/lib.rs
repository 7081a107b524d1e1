//! HTTP chat front end for the `sage-rag` conversation controller.
//!
//! `sage-web` exposes the controller's single inbound operation and its
//! presentation snapshot over a small REST API. Any client (browser, curl)
//! can drive a conversation with it.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sage_rag::prelude::*;
//! use sage_web::{WebConfig, spawn_web};
//!
//! let client = RagConfig::from_env()?.build_client()?;
//! let controller = ConversationController::new(Arc::new(Corpus::builtin()), Arc::new(client));
//!
//! let addr = spawn_web(controller, WebConfig::default()).await?;
//! println!("Chat API: http://{addr}/api/state");
//! ```
//!
//! # Endpoints
//!
//! | Method | Path | Behavior |
//! |--------|------|----------|
//! | `GET` | `/api/state` | Current [`ConversationSnapshot`](sage_rag::conversation::ConversationSnapshot) |
//! | `POST` | `/api/chat` | Run one turn for `{"message": "..."}` and return the new snapshot |
//!
//! `POST /api/chat` answers `200` once an accepted turn settles (a failed turn
//! shows up as `"state": "errored"` in the snapshot), `204` for blank
//! messages, and `409` while another turn is still pending.

mod api;
mod server;

pub use api::ChatRequest;

use std::net::SocketAddr;
use std::path::PathBuf;

use sage_rag::conversation::ConversationController;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Directory of static files served for any path outside `/api`.
    ///
    /// If `None`, only the API is served.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            static_dir: None,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(
    controller: ConversationController,
    config: WebConfig,
) -> std::io::Result<SocketAddr> {
    let router = server::build_router(controller, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
