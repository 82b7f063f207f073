//! Character definitions shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Origin of a character definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CharacterSource {
    /// Shipped with the package; replaced with the canonical definition on update.
    Builtin,
    /// User-supplied; persisted verbatim.
    Custom,
    /// Any unrecognized stored value; rendered with the fallback bundled image.
    #[serde(other)]
    Unknown,
}

/// A selectable persona: prompt fragments plus an image reference.
///
/// Serialized with camelCase keys to stay compatible with the stored
/// `availableCharacters` blobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDefinition {
    /// Unique identifier (e.g. "builtin-toad").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Origin of the definition.
    pub source: CharacterSource,
    /// Package-relative path for built-ins, inline data URL for custom entries.
    pub image_path: String,
    /// Personality instructions substituted into the prompt.
    pub persona: String,
    /// Output format and style rules.
    pub output_constraints: String,
    /// Few-shot examples, newline separated.
    pub examples: String,
    /// Optional full template overriding the base prompt template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt_template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{CharacterDefinition, CharacterSource};
    use pretty_assertions::assert_eq;

    #[test]
    fn character_round_trips_with_camel_case_keys() {
        let raw = r#"{
            "id": "custom-wizard",
            "name": "Wizzo",
            "source": "custom",
            "imagePath": "data:image/png;base64,AAAA",
            "persona": "A wizard.",
            "outputConstraints": "One sentence.",
            "examples": "Example: abracadabra."
        }"#;
        let character: CharacterDefinition = serde_json::from_str(raw).expect("parse");
        assert_eq!(character.source, CharacterSource::Custom);
        assert_eq!(character.image_path, "data:image/png;base64,AAAA");
        assert_eq!(character.custom_prompt_template, None);

        let value = serde_json::to_value(&character).expect("serialize");
        assert_eq!(value["imagePath"], "data:image/png;base64,AAAA");
        assert_eq!(value.get("customPromptTemplate"), None);
    }

    #[test]
    fn unrecognized_source_parses_as_unknown() {
        let source: CharacterSource = serde_json::from_str(r#""community""#).expect("parse");
        assert_eq!(source, CharacterSource::Unknown);
    }
}
