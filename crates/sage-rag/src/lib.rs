//! Minimal retrieval-augmented generation pipeline with a statesman persona.
//!
//! `sage-rag` answers questions in the voice of Lee Kuan Yew, grounded in a
//! small fixed knowledge base. Each turn runs the same four steps:
//!
//! 1. [`retriever::select`] picks the passages whose topic or text contains
//!    the question (case-insensitive substring match, corpus order).
//! 2. [`prompt::build`] wraps the question and the selected passages (or the
//!    whole corpus when nothing matched) in a fixed persona-and-policy
//!    template.
//! 3. A [`TextGenerator`](client::TextGenerator), normally the
//!    [`GenerationClient`](client::GenerationClient), sends the prompt to a
//!    `generateContent` endpoint and returns the reply.
//! 4. The [`ConversationController`](conversation::ConversationController)
//!    records both turns and moves between `Idle`, `Pending` and `Errored`.
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::Arc;
//! use sage_rag::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let config = RagConfig::from_env().map_err(|e| e.to_string())?;
//!     let client = config.build_client().map_err(|e| e.to_string())?;
//!
//!     let controller = ConversationController::new(
//!         Arc::new(Corpus::builtin()),
//!         Arc::new(client),
//!     );
//!
//!     match controller.submit_query("What is meritocracy?").await {
//!         SubmitOutcome::Answered(reply) => println!("{reply}"),
//!         other => eprintln!("{other:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`corpus`] | [`Passage`](corpus::Passage) and the immutable, non-empty [`Corpus`](corpus::Corpus) |
//! | [`retriever`] | Case-insensitive substring selection |
//! | [`prompt`] | Context block assembly and the persona prompt template |
//! | [`client`] | HTTP generation client and the [`TextGenerator`](client::TextGenerator) seam |
//! | [`conversation`] | Turn state machine, history, presentation snapshot |
//! | [`config`] | Endpoint, API key and timeout settings |
//! | [`error`] | Typed errors |
//! | [`logging`] | Tracing subscriber setup for binaries |

pub mod client;
pub mod config;
pub mod conversation;
pub mod corpus;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod prompt;
pub mod retriever;
