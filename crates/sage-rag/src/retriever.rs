//! Case-insensitive substring retrieval.
//!
//! A passage matches when the lowercased query occurs in its lowercased topic
//! or text. There is no scoring: matches come back in corpus order, and an
//! empty result is returned as-is so the prompt builder can fall back to the
//! full corpus.

use crate::corpus::{Corpus, Passage};

/// Select the passages whose topic or text contains `query`, ignoring case.
///
/// An empty query matches every passage.
pub fn select<'a>(query: &str, corpus: &'a Corpus) -> Vec<&'a Passage> {
    let needle = query.to_lowercase();
    corpus
        .iter()
        .filter(|p| {
            p.topic.to_lowercase().contains(&needle) || p.text.to_lowercase().contains(&needle)
        })
        .collect()
}
