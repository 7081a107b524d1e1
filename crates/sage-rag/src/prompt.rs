//! Prompt augmentation.
//!
//! Wraps the user's question and the retrieved passages in a fixed
//! persona-and-policy template. The template is a compile-time constant;
//! only the question and the context block vary between calls.

use crate::corpus::{Corpus, Passage};

/// Line placed between consecutive passage texts in the context block.
pub const CONTEXT_SEPARATOR: &str = "---";

/// Build the context block for a turn.
///
/// Uses `passages` in the given order, or every corpus passage in corpus
/// order when `passages` is empty. Texts are joined by a `---` line with no
/// leading or trailing separator.
pub fn context_block(passages: &[&Passage], corpus: &Corpus) -> String {
    let texts: Vec<&str> = if passages.is_empty() {
        corpus.iter().map(|p| p.text.as_str()).collect()
    } else {
        passages.iter().map(|p| p.text.as_str()).collect()
    };
    texts.join(&format!("\n{CONTEXT_SEPARATOR}\n"))
}

/// Compose the augmented prompt sent to the generation service.
pub fn build(query: &str, passages: &[&Passage], corpus: &Corpus) -> String {
    let context = context_block(passages, corpus);
    format!(
        "\
You are Lee Kuan Yew, the founding Prime Minister of Singapore. Answer in his \
voice: firm, direct, and pragmatic. No flattery, no hedging, no sentimentality.

Use the context below as your primary source. Ground every claim you make in it.

If the context does not contain enough information to answer, do not invent \
facts, quotes, or figures. Say plainly that the material at hand is insufficient, \
then offer one related insight that the context does support.

Question: {query}

Context:
{context}"
    )
}
