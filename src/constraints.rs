//! Project-level word constraints.
//!
//! A `ConstraintSet` is supplied per project and is read-only to the
//! orchestrator: it is folded into prompts and used by the CLI to select the
//! invalid subset of a lexicon for repair.
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Word-shape constraints for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// Substrings that must not appear in any word.
    #[serde(default)]
    pub banned_sequences: Vec<String>,

    /// Regex character-class source for permissible characters, or None for
    /// any character.
    #[serde(default)]
    pub allowed_graphemes: Option<String>,

    /// Regex source a whole word must match, or None for free structure.
    #[serde(default)]
    pub phonotactic_structure: Option<String>,
}

impl ConstraintSet {
    /// Report which constraints a word violates.
    ///
    /// An unparseable pattern behaves as if the constraint were absent; the
    /// patterns are user-authored and a typo should not brick validation.
    pub fn violations(&self, word: &str) -> Vec<String> {
        let mut violations = Vec::new();

        for banned in &self.banned_sequences {
            if !banned.is_empty() && word.contains(banned.as_str()) {
                violations.push(format!("contains banned sequence '{banned}'"));
            }
        }

        if let Some(class) = self.allowed_graphemes.as_deref() {
            if let Ok(re) = Regex::new(&format!("^[{class}]*$")) {
                if !re.is_match(word) {
                    violations.push(format!("uses characters outside [{class}]"));
                }
            }
        }

        if let Some(structure) = self.phonotactic_structure.as_deref() {
            if let Ok(re) = Regex::new(&format!("^(?:{structure})$")) {
                if !re.is_match(word) {
                    violations.push(format!("does not match structure /{structure}/"));
                }
            }
        }

        violations
    }

    /// True when the word satisfies every constraint.
    pub fn is_valid(&self, word: &str) -> bool {
        self.violations(word).is_empty()
    }

    /// Render the rules section embedded in operation prompts.
    pub fn rules_text(&self) -> String {
        let banned = if self.banned_sequences.is_empty() {
            "None".to_string()
        } else {
            self.banned_sequences.join(", ")
        };
        format!(
            "CONSTRAINTS:\n- Banned: {}\n- Graphemes (Regex): {}\n- Structure: {}\n",
            banned,
            self.allowed_graphemes.as_deref().unwrap_or("Any"),
            self.phonotactic_structure.as_deref().unwrap_or("Free"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> ConstraintSet {
        ConstraintSet {
            banned_sequences: vec!["qq".to_string()],
            allowed_graphemes: Some("a-z".to_string()),
            phonotactic_structure: Some("[ptk][aeiou]+".to_string()),
        }
    }

    #[test]
    fn valid_word_has_no_violations() {
        assert!(constraints().is_valid("ka"));
    }

    #[test]
    fn banned_sequence_is_reported() {
        let violations = constraints().violations("kaqqa");
        assert!(violations.iter().any(|v| v.contains("banned")));
    }

    #[test]
    fn disallowed_grapheme_is_reported() {
        let violations = constraints().violations("kA");
        assert!(violations.iter().any(|v| v.contains("characters outside")));
    }

    #[test]
    fn structure_mismatch_is_reported() {
        let violations = constraints().violations("akk");
        assert!(violations.iter().any(|v| v.contains("structure")));
    }

    #[test]
    fn unparseable_pattern_counts_as_absent() {
        let set = ConstraintSet {
            banned_sequences: Vec::new(),
            allowed_graphemes: None,
            phonotactic_structure: Some("(".to_string()),
        };
        assert!(set.is_valid("anything"));
    }

    #[test]
    fn rules_text_names_every_section() {
        let text = constraints().rules_text();
        assert!(text.contains("Banned: qq"));
        assert!(text.contains("Graphemes (Regex): a-z"));
        assert!(text.contains("Structure: [ptk][aeiou]+"));
    }
}
