//! Reconciling decoded service results into the authoritative lexicon.
//!
//! Mutating operations overwrite exactly the fields present in each update on
//! the entity with matching identity; everything else is untouched and
//! unmatched updates are silently dropped, never inserted. Generation is the
//! asymmetric case: every decoded item is appended as a brand-new entry.
//! Overwrite merges are idempotent; the etymology append used by evolution is
//! the one documented exception, accumulating a provenance trail across
//! evolution steps.
use crate::lexicon::LexiconEntry;
use serde::Deserialize;

/// A partial per-entity update decoded from a service response.
///
/// Repair and edit updates carry an `id`; evolution updates carry no id and
/// key on `original_word` instead (serde aliases fold `new_word`/`new_ipa`
/// into the generic fields). Fields left `None` are not touched by the merge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntryUpdate {
    #[serde(default)]
    pub id: Option<String>,

    /// Fallback match key for updates without an id.
    #[serde(default)]
    pub original_word: Option<String>,

    #[serde(default, alias = "new_word")]
    pub word: Option<String>,

    #[serde(default, alias = "new_ipa")]
    pub ipa: Option<String>,

    #[serde(default)]
    pub definition: Option<String>,

    /// Evolution change description, appended to etymology.
    #[serde(default)]
    pub change_log: Option<String>,
}

/// A brand-new entry decoded from a generation response.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub word: String,
    #[serde(default)]
    pub ipa: String,
}

/// Apply partial updates to the lexicon, returning how many entities actually
/// changed. A matched update that carries no applicable field does not count.
///
/// Matching is by id when the update carries one, otherwise by exact word
/// form against `original_word`. The word-form fallback is best effort: two
/// entries sharing a word form can alias to the first match, and that
/// ambiguity is accepted rather than resolved.
///
/// With `append_etymology` the `change_log` text is appended to the matched
/// entry's etymology (`"; "`-joined) instead of being dropped.
pub fn apply_updates(
    lexicon: &mut [LexiconEntry],
    updates: &[EntryUpdate],
    append_etymology: bool,
) -> usize {
    let mut modified = 0;

    for update in updates {
        let matched = match (&update.id, &update.original_word) {
            (Some(id), _) => lexicon.iter_mut().find(|entry| &entry.id == id),
            (None, Some(word)) => lexicon.iter_mut().find(|entry| &entry.word == word),
            (None, None) => None,
        };
        let Some(entry) = matched else {
            continue;
        };

        let mut changed = false;
        if let Some(word) = &update.word {
            entry.word = word.clone();
            changed = true;
        }
        if let Some(ipa) = &update.ipa {
            entry.ipa = ipa.clone();
            changed = true;
        }
        if let Some(definition) = &update.definition {
            entry.definition = definition.clone();
            changed = true;
        }
        if append_etymology {
            if let Some(change_log) = update.change_log.as_deref().filter(|c| !c.is_empty()) {
                if entry.etymology.is_empty() {
                    entry.etymology = change_log.to_string();
                } else {
                    entry.etymology = format!("{}; {}", entry.etymology, change_log);
                }
                changed = true;
            }
        }
        if changed {
            modified += 1;
        }
    }

    modified
}

/// Append every decoded entry as a new lexicon entity with a fresh identity.
///
/// Only word and transcription are populated; all other fields start empty.
pub fn append_new(lexicon: &mut Vec<LexiconEntry>, entries: &[NewEntry]) -> usize {
    for entry in entries {
        lexicon.push(LexiconEntry::new_generated(
            entry.word.clone(),
            entry.ipa.clone(),
        ));
    }
    entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, word: &str) -> LexiconEntry {
        LexiconEntry {
            id: id.to_string(),
            word: word.to_string(),
            ipa: format!("/{word}/"),
            pos: "noun".to_string(),
            definition: format!("the {word}"),
            etymology: String::new(),
            derived_from: None,
        }
    }

    fn lexicon() -> Vec<LexiconEntry> {
        vec![entry("a1", "kava"), entry("a2", "moru")]
    }

    #[test]
    fn overwrite_touches_only_present_fields() {
        let mut lex = lexicon();
        let updates = vec![EntryUpdate {
            id: Some("a1".to_string()),
            ipa: Some("ˈka.va".to_string()),
            ..Default::default()
        }];

        let modified = apply_updates(&mut lex, &updates, false);
        assert_eq!(modified, 1);
        assert_eq!(lex[0].ipa, "ˈka.va");
        assert_eq!(lex[0].word, "kava");
        assert_eq!(lex[0].definition, "the kava");
        assert_eq!(lex[1], entry("a2", "moru"));
    }

    #[test]
    fn unmatched_id_is_ignored_never_inserted() {
        let mut lex = lexicon();
        let updates = vec![EntryUpdate {
            id: Some("missing".to_string()),
            word: Some("zzz".to_string()),
            ..Default::default()
        }];

        let modified = apply_updates(&mut lex, &updates, false);
        assert_eq!(modified, 0);
        assert_eq!(lex.len(), 2);
        assert_eq!(lex, lexicon());
    }

    #[test]
    fn overwrite_merge_is_idempotent() {
        let updates = vec![EntryUpdate {
            id: Some("a2".to_string()),
            word: Some("miru".to_string()),
            definition: Some("the sea".to_string()),
            ..Default::default()
        }];

        let mut once = lexicon();
        apply_updates(&mut once, &updates, false);
        let mut twice = once.clone();
        apply_updates(&mut twice, &updates, false);
        assert_eq!(once, twice);
    }

    #[test]
    fn mutation_merge_never_changes_length() {
        let mut lex = lexicon();
        let updates = vec![
            EntryUpdate {
                id: Some("a1".to_string()),
                word: Some("kama".to_string()),
                ..Default::default()
            },
            EntryUpdate {
                id: Some("nope".to_string()),
                ..Default::default()
            },
        ];
        apply_updates(&mut lex, &updates, false);
        assert_eq!(lex.len(), 2);
    }

    #[test]
    fn word_form_fallback_matches_without_id() {
        let mut lex = lexicon();
        let updates = vec![EntryUpdate {
            original_word: Some("moru".to_string()),
            word: Some("muru".to_string()),
            ipa: Some("ˈmu.ru".to_string()),
            change_log: Some("o > u before r".to_string()),
            ..Default::default()
        }];

        let modified = apply_updates(&mut lex, &updates, true);
        assert_eq!(modified, 1);
        assert_eq!(lex[1].word, "muru");
        assert_eq!(lex[1].etymology, "o > u before r");
    }

    #[test]
    fn etymology_appends_across_sequential_evolutions() {
        let mut lex = lexicon();
        let first = vec![EntryUpdate {
            original_word: Some("kava".to_string()),
            word: Some("hava".to_string()),
            change_log: Some("k > h initially".to_string()),
            ..Default::default()
        }];
        let second = vec![EntryUpdate {
            original_word: Some("hava".to_string()),
            word: Some("ava".to_string()),
            change_log: Some("h > 0".to_string()),
            ..Default::default()
        }];

        apply_updates(&mut lex, &first, true);
        apply_updates(&mut lex, &second, true);

        assert_eq!(lex[0].word, "ava");
        assert_eq!(lex[0].etymology, "k > h initially; h > 0");
    }

    #[test]
    fn matched_update_with_no_fields_does_not_count_as_modified() {
        let mut lex = lexicon();
        let updates = vec![EntryUpdate {
            id: Some("a1".to_string()),
            ..Default::default()
        }];

        assert_eq!(apply_updates(&mut lex, &updates, false), 0);
        assert_eq!(lex, lexicon());
    }

    #[test]
    fn change_log_without_etymology_mode_does_not_count_as_modified() {
        let mut lex = lexicon();
        let updates = vec![EntryUpdate {
            id: Some("a1".to_string()),
            change_log: Some("k > h".to_string()),
            ..Default::default()
        }];

        assert_eq!(apply_updates(&mut lex, &updates, false), 0);
        assert!(lex[0].etymology.is_empty());
    }

    #[test]
    fn update_with_no_key_is_dropped() {
        let mut lex = lexicon();
        let updates = vec![EntryUpdate {
            word: Some("loose".to_string()),
            ..Default::default()
        }];
        assert_eq!(apply_updates(&mut lex, &updates, false), 0);
        assert_eq!(lex, lexicon());
    }

    #[test]
    fn append_new_grows_by_exactly_the_decoded_count() {
        let mut lex = lexicon();
        let new_entries = vec![
            NewEntry {
                word: "sela".to_string(),
                ipa: "ˈse.la".to_string(),
            },
            NewEntry {
                word: "tiru".to_string(),
                ipa: "ˈti.ru".to_string(),
            },
            NewEntry {
                word: "vone".to_string(),
                ipa: "ˈvo.ne".to_string(),
            },
        ];

        let appended = append_new(&mut lex, &new_entries);
        assert_eq!(appended, 3);
        assert_eq!(lex.len(), 5);
        let added = &lex[2];
        assert_eq!(added.word, "sela");
        assert!(added.definition.is_empty());
        assert!(added.pos.is_empty());
        assert!(!added.id.is_empty());
    }

    #[test]
    fn evolve_aliases_deserialize_into_generic_fields() {
        let json = r#"{"original_word": "kava", "new_word": "hava", "new_ipa": "ˈha.va", "change_log": "k > h"}"#;
        let update: EntryUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.word.as_deref(), Some("hava"));
        assert_eq!(update.ipa.as_deref(), Some("ˈha.va"));
        assert!(update.id.is_none());
    }
}
