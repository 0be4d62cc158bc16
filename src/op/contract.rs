//! Structured-response contracts, one per operation kind.
//!
//! A contract declares the shape the decoder must enforce: field names, their
//! primitive kinds, required-ness, and whether the payload is a bare array of
//! items, an object wrapping an array under a container field, or a single
//! object. Contracts do not validate anything themselves; `op::decode`
//! consumes them. Each contract also renders a JSON-Schema-like hint that is
//! forwarded to the transport so conforming services can constrain their
//! output.
use serde_json::{json, Value};

/// Primitive kind of a contract field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Number,
    /// Array of strings.
    StringArray,
    /// Array of nested objects with their own field specs.
    ObjectArray(&'static [FieldSpec]),
}

/// One declared field of a response item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Top-level shape of a contract payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractShape {
    /// A bare JSON array of item objects.
    ItemArray,
    /// A JSON object wrapping an array of item objects under this field.
    WrappedArray(&'static str),
    /// A single JSON object described directly by the contract fields.
    SingleObject,
}

/// Declarative descriptor of the expected response for one operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseContract {
    pub name: &'static str,
    pub shape: ContractShape,
    /// Fields of each item (array shapes) or of the object itself
    /// (`SingleObject`).
    pub fields: &'static [FieldSpec],
}

/// Entity repair: per-entry fixed word and transcription, keyed by id.
pub const REPAIR: ResponseContract = ResponseContract {
    name: "repair",
    shape: ContractShape::ItemArray,
    fields: &[
        FieldSpec::required("id", FieldKind::String),
        FieldSpec::required("word", FieldKind::String),
        FieldSpec::required("ipa", FieldKind::String),
    ],
};

/// Free generation: brand-new word forms with transcriptions.
pub const GENERATE: ResponseContract = ResponseContract {
    name: "generate",
    shape: ContractShape::ItemArray,
    fields: &[
        FieldSpec::required("word", FieldKind::String),
        FieldSpec::required("ipa", FieldKind::String),
    ],
};

/// Evolution: keyed by original word form (the service does not see ids).
/// `change_log` is deliberately optional: an item without one still evolves
/// the word, it just leaves no etymology trail.
pub const EVOLVE: ResponseContract = ResponseContract {
    name: "evolve",
    shape: ContractShape::ItemArray,
    fields: &[
        FieldSpec::required("original_word", FieldKind::String),
        FieldSpec::required("new_word", FieldKind::String),
        FieldSpec::required("new_ipa", FieldKind::String),
        FieldSpec::optional("change_log", FieldKind::String),
    ],
};

/// Instruction-driven bulk edit: partial updates keyed by id, wrapped in a
/// `modifications` container.
pub const EDIT: ResponseContract = ResponseContract {
    name: "edit",
    shape: ContractShape::WrappedArray("modifications"),
    fields: &[
        FieldSpec::required("id", FieldKind::String),
        FieldSpec::optional("word", FieldKind::String),
        FieldSpec::optional("ipa", FieldKind::String),
        FieldSpec::optional("definition", FieldKind::String),
    ],
};

const CONSONANT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("symbol", FieldKind::String),
    FieldSpec::optional("manner", FieldKind::String),
    FieldSpec::optional("place", FieldKind::String),
    FieldSpec::optional("voiced", FieldKind::Boolean),
];

const VOWEL_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("symbol", FieldKind::String),
    FieldSpec::optional("height", FieldKind::String),
    FieldSpec::optional("backness", FieldKind::String),
    FieldSpec::optional("rounded", FieldKind::Boolean),
];

/// Full phonology generation: a single nested inventory object.
pub const PHONOLOGY: ResponseContract = ResponseContract {
    name: "phonology",
    shape: ContractShape::SingleObject,
    fields: &[
        FieldSpec::required("name", FieldKind::String),
        FieldSpec::optional("description", FieldKind::String),
        FieldSpec::required("consonants", FieldKind::ObjectArray(CONSONANT_FIELDS)),
        FieldSpec::required("vowels", FieldKind::ObjectArray(VOWEL_FIELDS)),
        FieldSpec::optional("syllable_structure", FieldKind::String),
        FieldSpec::optional("banned_combinations", FieldKind::StringArray),
    ],
};

impl ResponseContract {
    /// Render the schema hint forwarded to the transport.
    pub fn schema_hint(&self) -> Value {
        let item = object_schema(self.fields);
        match self.shape {
            ContractShape::ItemArray => json!({ "type": "array", "items": item }),
            ContractShape::WrappedArray(container) => {
                let mut properties = serde_json::Map::new();
                properties.insert(
                    container.to_string(),
                    json!({ "type": "array", "items": item }),
                );
                json!({
                    "type": "object",
                    "properties": Value::Object(properties),
                    "required": [container],
                })
            }
            ContractShape::SingleObject => item,
        }
    }
}

fn object_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for field in fields {
        properties.insert(field.name.to_string(), kind_schema(field.kind));
        if field.required {
            required.push(Value::String(field.name.to_string()));
        }
    }
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": Value::Array(required),
    })
}

fn kind_schema(kind: FieldKind) -> Value {
    match kind {
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::Number => json!({ "type": "number" }),
        FieldKind::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
        FieldKind::ObjectArray(fields) => {
            json!({ "type": "array", "items": object_schema(fields) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_hint_is_an_array_of_objects_with_required_fields() {
        let hint = REPAIR.schema_hint();
        assert_eq!(hint["type"], "array");
        assert_eq!(hint["items"]["type"], "object");
        let required = hint["items"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
    }

    #[test]
    fn edit_hint_wraps_modifications() {
        let hint = EDIT.schema_hint();
        assert_eq!(hint["type"], "object");
        assert_eq!(hint["properties"]["modifications"]["type"], "array");
        assert_eq!(hint["required"][0], "modifications");
    }

    #[test]
    fn phonology_hint_nests_consonant_items() {
        let hint = PHONOLOGY.schema_hint();
        assert_eq!(hint["type"], "object");
        let consonants = &hint["properties"]["consonants"];
        assert_eq!(consonants["type"], "array");
        assert_eq!(
            consonants["items"]["properties"]["voiced"]["type"],
            "boolean"
        );
    }
}
