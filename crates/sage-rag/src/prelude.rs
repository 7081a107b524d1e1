//! Convenience re-exports for common `sage-rag` types.
//!
//! ```ignore
//! use sage_rag::prelude::*;
//! ```

pub use crate::client::{
    GenerationClient, GenerationFuture, NO_RESPONSE_FALLBACK, TextGenerator,
};
pub use crate::config::RagConfig;
pub use crate::conversation::{
    ConversationController, ConversationSnapshot, GENERIC_ERROR_MESSAGE, Role, SubmitOutcome,
    Turn, TurnState,
};
pub use crate::corpus::{Corpus, Passage};
pub use crate::error::{ConfigError, CorpusError, GenerationError};
