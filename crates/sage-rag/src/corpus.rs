//! The knowledge base: an ordered, non-empty set of labeled passages.
//!
//! A [`Corpus`] is built once at startup and shared read-only for the life of
//! the process. Insertion order matters: retrieval preserves it, and the
//! prompt falls back to the whole corpus in this order when nothing matches.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CorpusError;

/// One labeled unit of source text.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    /// Free-text label. Not unique; may list several comma-separated topics.
    pub topic: String,
    /// The passage body.
    pub text: String,
}

impl Passage {
    pub fn new(topic: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            text: text.into(),
        }
    }
}

/// Immutable, non-empty, ordered collection of [`Passage`]s.
#[derive(Clone, Debug)]
pub struct Corpus {
    passages: Vec<Passage>,
}

impl Corpus {
    /// Build a corpus from passages. Rejects an empty list.
    pub fn new(passages: Vec<Passage>) -> Result<Self, CorpusError> {
        if passages.is_empty() {
            return Err(CorpusError::Empty);
        }
        Ok(Self { passages })
    }

    /// The bundled knowledge base.
    pub fn builtin() -> Self {
        Self {
            passages: vec![
                Passage::new(
                    "economic development",
                    "Singapore had no natural resources and no hinterland, so we had to make \
                     ourselves useful to the world. We invited multinational companies to \
                     manufacture here, trained our workers to be disciplined and skilled, and \
                     built the infrastructure and stability investors need. Growth came from \
                     being practical, not from ideology.",
                ),
                Passage::new(
                    "social policy, meritocracy",
                    "Meritocracy means that the ablest rise to the top regardless of race, \
                     language, or family background. We invested heavily in education and \
                     scholarships so that talent is found and developed wherever it exists. \
                     Rewards must follow performance, otherwise a society loses its drive.",
                ),
                Passage::new(
                    "foreign policy",
                    "A small country must accept the world as it is, not as it wishes it to \
                     be. We maintain good relations with all the major powers, keep a strong \
                     defence force so that no one takes us lightly, and make ourselves \
                     relevant so that others have an interest in our survival.",
                ),
                Passage::new(
                    "governance, integrity",
                    "Clean government is not optional. We pay ministers and civil servants \
                     competitive salaries, enforce strict anti-corruption laws without \
                     exception, and punish wrongdoing regardless of rank. Firm rule of law \
                     gives people and investors confidence that the system is fair.",
                ),
            ],
        }
    }

    /// Parse a JSON array of `{"topic": ..., "text": ...}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        let passages: Vec<Passage> =
            serde_json::from_str(json).map_err(|e| CorpusError::Parse(e.to_string()))?;
        Self::new(passages)
    }

    /// Load a corpus from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let content = std::fs::read_to_string(path).map_err(|e| CorpusError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    /// Passages in insertion order.
    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Never true for a constructed corpus.
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Passage> {
        self.passages.iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Passage;
    type IntoIter = std::slice::Iter<'a, Passage>;

    fn into_iter(self) -> Self::IntoIter {
        self.passages.iter()
    }
}
