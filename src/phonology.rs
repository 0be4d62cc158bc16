//! Phonology inventory types.
//!
//! Produced by the phonology-generate operation and persisted to
//! `phonology.json`; the orchestrator treats the inventory as opaque data and
//! makes no linguistic judgement about it.
use serde::{Deserialize, Serialize};

/// A generated phonology: inventories plus syllable-shape rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhonologyConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub consonants: Vec<Consonant>,

    #[serde(default)]
    pub vowels: Vec<Vowel>,

    /// CV-style syllable pattern, e.g. `"(C)V(C)"`.
    #[serde(default)]
    pub syllable_structure: String,

    /// Phoneme combinations the language disallows.
    #[serde(default)]
    pub banned_combinations: Vec<String>,
}

/// One consonant in the inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consonant {
    pub symbol: String,
    #[serde(default)]
    pub manner: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub voiced: bool,
}

/// One vowel in the inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vowel {
    pub symbol: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub backness: String,
    #[serde(default)]
    pub rounded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phonology_parses_from_service_shaped_json() {
        let json = r#"{
            "name": "Thalassic",
            "description": "A flowing coastal language",
            "consonants": [
                {"symbol": "p", "manner": "plosive", "place": "bilabial", "voiced": false}
            ],
            "vowels": [
                {"symbol": "a", "height": "open", "backness": "front", "rounded": false}
            ],
            "syllable_structure": "(C)V",
            "banned_combinations": ["pp"]
        }"#;
        let phonology: PhonologyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(phonology.consonants.len(), 1);
        assert_eq!(phonology.vowels[0].height, "open");
        assert_eq!(phonology.banned_combinations, vec!["pp".to_string()]);
    }
}
