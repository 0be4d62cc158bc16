//! Per-operation instruction assembly.
//!
//! Each builder produces the full instruction text for one chunk. Entity
//! payloads are embedded as JSON so the service sees exactly the fields it is
//! allowed to echo back; the shared constraint rules section comes from
//! `ConstraintSet::rules_text`.
use crate::constraints::ConstraintSet;
use crate::lexicon::{LexiconEntry, SoundChangeRule};
use serde_json::json;

/// Generation requests are clamped to keep one response inside the service's
/// output ceiling.
pub const MAX_GENERATE_COUNT: usize = 50;

/// Instruction for repairing one chunk of constraint-violating entries.
pub fn repair_prompt(chunk: &[LexiconEntry], constraints: &ConstraintSet) -> String {
    let payload: Vec<_> = chunk
        .iter()
        .map(|e| json!({ "id": e.id, "word": e.word, "ipa": e.ipa }))
        .collect();
    format!(
        "You are a linguistic repair engineer.\n\n\
         Task: Fix the following constructed words so they comply with the rules below.\n\
         Rules:\n{}\n\
         Keep the phonological soul of the word while fixing violations.\n\n\
         Input List (JSON):\n{}\n\n\
         Output: Return a valid JSON array of objects with \"id\", \"word\", and \"ipa\".",
        constraints.rules_text(),
        serde_json::Value::Array(payload),
    )
}

/// Instruction for generating `count` new words matching a vibe.
pub fn generate_prompt(count: usize, vibe: &str, constraints: &ConstraintSet) -> String {
    let safe_count = count.min(MAX_GENERATE_COUNT);
    format!(
        "Generate {safe_count} unique constructed words. Vibe: {vibe}.\n{}\n\
         Return a JSON array of objects with \"word\" and \"ipa\".",
        constraints.rules_text(),
    )
}

/// Instruction for applying sound changes to one chunk of words.
pub fn evolve_prompt(chunk: &[LexiconEntry], rules: &[SoundChangeRule]) -> String {
    let rule_list = rules
        .iter()
        .map(|r| r.rule.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let words = chunk
        .iter()
        .map(|e| e.word.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Apply these sound changes in order:\n{rule_list}\n\n\
         Words: {words}\n\n\
         Return a JSON array of objects with \"original_word\", \"new_word\", \
         \"new_ipa\", and \"change_log\".",
    )
}

/// Instruction for an instruction-driven bulk edit over one chunk.
pub fn edit_prompt(
    chunk: &[LexiconEntry],
    instruction: &str,
    constraints: &ConstraintSet,
) -> String {
    let payload: Vec<_> = chunk
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "word": e.word,
                "ipa": e.ipa,
                "definition": e.definition,
            })
        })
        .collect();
    format!(
        "Apply bulk changes to this lexicon.\n\
         Instruction: \"{instruction}\"\n{}\n\
         Lexicon (JSON):\n{}\n\n\
         Return a JSON object with a \"modifications\" array containing objects \
         with \"id\" and only the changed fields (\"word\", \"ipa\", \"definition\").",
        constraints.rules_text(),
        serde_json::Value::Array(payload),
    )
}

/// Instruction for suggesting one word's transcription under a phonology.
pub fn ipa_prompt(word: &str, phonology: &str) -> String {
    format!(
        "Given the following phonological rules/description: \"{phonology}\", \
         provide the most likely IPA transcription for the word \"{word}\". \
         Return ONLY the IPA string, enclosed in forward slashes.",
    )
}

/// Instruction for glossing one sentence against grammar notes.
pub fn gloss_prompt(sentence: &str, grammar: &str) -> String {
    format!(
        "Analyze sentence \"{sentence}\" using Grammar: {grammar}. \
         Provide gloss and AST.",
    )
}

/// Instruction for generating a full phonology from a description.
pub fn phonology_prompt(description: &str) -> String {
    format!(
        "Create a phonology for a constructed language from this description: \
         \"{description}\".\n\
         Return a JSON object with \"name\", \"description\", \"consonants\" \
         (objects with \"symbol\", \"manner\", \"place\", \"voiced\"), \"vowels\" \
         (objects with \"symbol\", \"height\", \"backness\", \"rounded\"), \
         \"syllable_structure\", and \"banned_combinations\".",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconEntry;

    fn entry(id: &str, word: &str) -> LexiconEntry {
        LexiconEntry {
            id: id.to_string(),
            word: word.to_string(),
            ipa: format!("/{word}/"),
            pos: String::new(),
            definition: String::new(),
            etymology: String::new(),
            derived_from: None,
        }
    }

    #[test]
    fn repair_prompt_embeds_ids_and_rules() {
        let constraints = ConstraintSet {
            banned_sequences: vec!["qq".to_string()],
            ..Default::default()
        };
        let prompt = repair_prompt(&[entry("a1", "kaqqa")], &constraints);
        assert!(prompt.contains("\"a1\""));
        assert!(prompt.contains("Banned: qq"));
    }

    #[test]
    fn generate_prompt_clamps_count() {
        let prompt = generate_prompt(500, "oceanic", &ConstraintSet::default());
        assert!(prompt.contains("Generate 50 unique"));
        assert!(prompt.contains("oceanic"));
    }

    #[test]
    fn evolve_prompt_preserves_rule_order() {
        let rules = vec![
            SoundChangeRule {
                rule: "first rule".to_string(),
            },
            SoundChangeRule {
                rule: "second rule".to_string(),
            },
        ];
        let prompt = evolve_prompt(&[entry("a1", "kava")], &rules);
        let first = prompt.find("first rule").unwrap();
        let second = prompt.find("second rule").unwrap();
        assert!(first < second);
    }

    #[test]
    fn ipa_prompt_embeds_word_and_phonology() {
        let prompt = ipa_prompt("kava", "open syllables only");
        assert!(prompt.contains("\"kava\""));
        assert!(prompt.contains("open syllables only"));
        assert!(prompt.contains("forward slashes"));
    }

    #[test]
    fn edit_prompt_names_the_container() {
        let prompt = edit_prompt(
            &[entry("a1", "kava")],
            "add definitions",
            &ConstraintSet::default(),
        );
        assert!(prompt.contains("\"modifications\""));
        assert!(prompt.contains("add definitions"));
    }
}
