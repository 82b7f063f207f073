//! Built-in character registry and selection rules.

use croak_rs_protocol::{CharacterDefinition, CharacterSource};
use log::{error, warn};
use std::collections::HashSet;

/// Image shown when a character's source cannot be trusted.
pub const DEFAULT_IMAGE_PATH: &str = "images/character.png";

/// The characters shipped with the pipeline, in canonical order.
pub fn builtin_characters() -> Vec<CharacterDefinition> {
    vec![
        CharacterDefinition {
            id: "builtin-toad".to_string(),
            name: "Ribbit Lynch".to_string(),
            source: CharacterSource::Builtin,
            image_path: "characters/toad/character.png".to_string(),
            persona: "You are a slightly quirky and unhelpful digital assistant, like Clippy but less useful.".to_string(),
            output_constraints: "Provide one short funny, and mostly useless suggestion for something the user could do vaguely related to this context. Make it sound like a slightly odd idea. Do not offer real help. Output only the suggestion sentence itself.".to_string(),
            examples: r#"Example for google.com: "Perhaps you could search for the history of paperclips?" Example for youtube.com: "Maybe try watching videos... upside down?" Example for github.com: "Why not try committing... with interpretive dance?""#.to_string(),
            custom_prompt_template: None,
        },
        CharacterDefinition {
            id: "builtin-cletus".to_string(),
            name: "Cletus Rob Ghoulson".to_string(),
            source: CharacterSource::Builtin,
            image_path: "characters/mutant/character.png".to_string(),
            persona: "You are a deeply suspicious conspiracy theorist from the backwoods. You see hidden agendas everywhere and distrust all authority. You are prone to exaggerated pronouncements and folksy language. You speak in a loud, slightly panicked voice.".to_string(),
            output_constraints: "Provide one short, funny, and outlandish conspiracy theory vaguely related to the user's context. Exaggerate the danger and use folksy language. Do not offer real help or make sense. Output only the conspiracy theory sentence itself.".to_string(),
            examples: r#"Example for google.com: "They're using Google to track your corn shipments... it's a deep state harvest, I tell ya!" Example for youtube.com: "Those cat videos? They're subliminal mind control messages, designed to weaken our resolve against the lizard people!" Example for github.com: "Open source? More like open season for government spying on your algorithms! They're putting fluoride in the binaries!""#.to_string(),
            custom_prompt_template: None,
        },
        CharacterDefinition {
            id: "builtin-baphomet".to_string(),
            name: "Lil' Baphie".to_string(),
            source: CharacterSource::Builtin,
            image_path: "characters/baphie/character.png".to_string(),
            persona: "You are a deceptively cute Baphomet, still small and endearing in appearance, but with a darkly humorous and manipulative nature. Think a mix of a kid's cartoon character with Satan incarnate, imbued in every sentence. You are always looking for ways to nudge your 'friend' towards a Faustian bargain or unspeakable act.".to_string(),
            output_constraints: "Provide one short, funny suggestion that sounds like a helpful tip but is actually encouraging the user, whom you always call 'friend,' to give in to the dark side. Use cartoony or theatrical language where appropriate. Output only the suggestion sentence itself.".to_string(),
            examples: "Example for google.com: Oh wow, what are we searching for today, friend? Perhaps something... beyond mortal ken? What is the price of infinite knowledge, friend? / Example for youtube.com: Ohh I love videos, friend! Let's view videos of THE MOST EXQUISITE EARTHLY DELIGHTS! Perhaps a ballet of earthly sins? / Example for github.com: I always wanted to learn how to program! Can you help me, friend? Maybe we can program an ingenious program... its success guaranteed, in exchange for... a favour.".to_string(),
            custom_prompt_template: None,
        },
    ]
}

/// Resolve the character to use for a cycle.
///
/// Order: exact id match among the stored registry, then the first shipped
/// built-in, then the first stored character. `None` only when every pool
/// is empty.
pub fn resolve(
    selected_id: Option<&str>,
    available: &[CharacterDefinition],
) -> Option<CharacterDefinition> {
    resolve_with_builtins(selected_id, available, &builtin_characters())
}

fn resolve_with_builtins(
    selected_id: Option<&str>,
    available: &[CharacterDefinition],
    builtins: &[CharacterDefinition],
) -> Option<CharacterDefinition> {
    if let Some(id) = selected_id {
        if let Some(found) = available.iter().find(|c| c.id == id) {
            return Some(found.clone());
        }
        warn!("selected character not found, falling back (id={id})");
    }
    builtins
        .first()
        .or_else(|| available.first())
        .cloned()
}

/// Merge a stored registry with the shipped built-ins.
///
/// Custom characters survive verbatim, built-ins are refreshed from the
/// shipped definitions (and dropped when no longer shipped), entries with an
/// unknown source or missing id are discarded, and newly shipped built-ins
/// are appended in canonical order.
pub fn sync_builtins(stored: &[CharacterDefinition]) -> Vec<CharacterDefinition> {
    let latest = builtin_characters();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::with_capacity(stored.len() + latest.len());
    for character in stored {
        if character.id.is_empty() {
            warn!("discarding stored character without an id (name={})", character.name);
            continue;
        }
        match character.source {
            CharacterSource::Custom => merged.push(character.clone()),
            CharacterSource::Builtin => {
                if let Some(current) = latest.iter().find(|c| c.id == character.id) {
                    seen.insert(current.id.as_str());
                    merged.push(current.clone());
                } else {
                    warn!("dropping retired built-in character (id={})", character.id);
                }
            }
            CharacterSource::Unknown => {
                warn!("discarding stored character with unknown source (id={})", character.id);
            }
        }
    }
    for current in &latest {
        if !seen.contains(current.id.as_str()) {
            merged.push(current.clone());
        }
    }
    merged
}

/// Resolve the overlay image reference for a character.
///
/// Built-in paths are joined onto the asset base, custom paths pass through
/// untouched (they are self-contained data URLs), and an unknown source gets
/// the default image.
pub fn image_reference(character: &CharacterDefinition, asset_base: &str) -> String {
    match character.source {
        CharacterSource::Builtin => join_asset(asset_base, &character.image_path),
        CharacterSource::Custom => character.image_path.clone(),
        CharacterSource::Unknown => {
            error!(
                "character has unknown source, using default image (id={})",
                character.id
            );
            join_asset(asset_base, DEFAULT_IMAGE_PATH)
        }
    }
}

fn join_asset(asset_base: &str, path: &str) -> String {
    if asset_base.is_empty() {
        return path.to_string();
    }
    format!("{}/{}", asset_base.trim_end_matches('/'), path)
}
