//! Lexicon data model.
//!
//! These types mirror the project-owned JSON files so the orchestrator stays
//! schema-driven: entries are created with a stable id and mutated only
//! through merge operations, never deleted here.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single lexicon entry.
///
/// `id` is the stable identity key and is immutable once created. Merges key
/// exclusively on it (word-form matching is a documented fallback for updates
/// that carry no id, see `op::merge`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Stable unique identity (UUID v4 string).
    pub id: String,

    /// The word form in the project's orthography.
    pub word: String,

    /// Phonetic transcription (IPA).
    #[serde(default)]
    pub ipa: String,

    /// Part of speech label.
    #[serde(default)]
    pub pos: String,

    /// Free-text definition.
    #[serde(default)]
    pub definition: String,

    /// Free-text etymology. Evolution appends to this field rather than
    /// overwriting it, accumulating a provenance trail.
    #[serde(default)]
    pub etymology: String,

    /// Non-owning reference to the id of the entry this one derives from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
}

impl LexiconEntry {
    /// Create a new entry with a fresh identity and only word/ipa populated.
    pub fn new_generated(word: String, ipa: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            word,
            ipa,
            pos: String::new(),
            definition: String::new(),
            etymology: String::new(),
            derived_from: None,
        }
    }
}

/// An ordered, human-authored sound change rule.
///
/// Ordering is meaningful: rules are presented to the service in sequence.
/// Application order is enforced by the service, not by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundChangeRule {
    /// Free-text rule description (e.g. `"k > t͡ʃ / _i"`).
    pub rule: String,
}
