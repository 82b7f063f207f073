//! Prompt assembly from character components and page context.
//!
//! Templates are expanded in a single pass: each recognized placeholder is
//! resolved once from the raw template, and replacement text is never
//! rescanned for further placeholders.

use croak_rs_protocol::{CharacterDefinition, PAGE_TEXT_ERROR, PAGE_TEXT_NOT_RECEIVED};
use log::debug;

/// Base template used when a character carries no custom template.
pub const PROMPT_BASE_TEMPLATE: &str = "{PERSONA_INSTRUCTIONS}
Look at this URL: {URL}
{HISTORY_SECTION}
{PAGE_TEXT_SECTION}
{OUTPUT_CONSTRAINTS}
{EXAMPLES}

OUTPUT:";

/// Section wrapper expanded in place of `{HISTORY_SECTION}`.
pub const HISTORY_SECTION_TEMPLATE: &str =
    "Here's what you've said before about this page:\n{HISTORY}";

/// Section wrapper expanded in place of `{PAGE_TEXT_SECTION}`.
pub const PAGE_TEXT_SECTION_TEMPLATE: &str =
    "And consider this page content snippet:\n---\n{PAGE_TEXT}\n---";

const NO_HISTORY_SECTION: &str = "\n[No previous quips for this page]\n";
const NO_HISTORY_BARE: &str = "None";
const NO_PAGE_TEXT: &str = "\n[Page content not available or not requested]\n";

/// The recognized placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Persona,
    OutputConstraints,
    Examples,
    Url,
    HistorySection,
    History,
    PageTextSection,
    PageText,
}

impl Token {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "PERSONA_INSTRUCTIONS" => Some(Token::Persona),
            "OUTPUT_CONSTRAINTS" => Some(Token::OutputConstraints),
            "EXAMPLES" => Some(Token::Examples),
            "URL" => Some(Token::Url),
            "HISTORY_SECTION" => Some(Token::HistorySection),
            "HISTORY" => Some(Token::History),
            "PAGE_TEXT_SECTION" => Some(Token::PageTextSection),
            "PAGE_TEXT" => Some(Token::PageText),
            _ => None,
        }
    }
}

/// The character's effective template: its custom template when present and
/// non-empty, the shared base template otherwise.
pub fn effective_template(character: &CharacterDefinition) -> &str {
    match character.custom_prompt_template.as_deref() {
        Some(template) if !template.is_empty() => template,
        _ => PROMPT_BASE_TEMPLATE,
    }
}

/// Whether a template asks for page text in any form.
pub fn references_page_text(template: &str) -> bool {
    template.contains("{PAGE_TEXT_SECTION}") || template.contains("{PAGE_TEXT}")
}

/// Assemble the final prompt for one generation cycle.
///
/// `history_digest` is the bullet list of previous quips for the page (empty
/// when there are none); `page_text` is the captured snippet, one of the
/// page-text sentinels, or `None` when no capture was attempted.
pub fn build(
    character: &CharacterDefinition,
    url: &str,
    history_digest: &str,
    page_text: Option<&str>,
) -> String {
    let template = effective_template(character);
    let has_history_section = template.contains("{HISTORY_SECTION}");
    let has_page_text_section = template.contains("{PAGE_TEXT_SECTION}");

    // When the wrapped section carries the data, the bare placeholder is
    // cleaned to nothing rather than duplicating it.
    let (history_section, history_bare) = if history_digest.is_empty() {
        (NO_HISTORY_SECTION.to_string(), NO_HISTORY_BARE.to_string())
    } else if has_history_section {
        (
            expand_section(HISTORY_SECTION_TEMPLATE, Token::History, history_digest),
            String::new(),
        )
    } else {
        (String::new(), history_digest.to_string())
    };

    let (page_text_section, page_text_bare) = match page_text {
        Some(text)
            if !text.is_empty() && text != PAGE_TEXT_ERROR && text != PAGE_TEXT_NOT_RECEIVED =>
        {
            let formatted = format!("\n---\n{text}\n---");
            if has_page_text_section {
                (
                    expand_section(PAGE_TEXT_SECTION_TEMPLATE, Token::PageText, &formatted),
                    String::new(),
                )
            } else {
                (String::new(), formatted)
            }
        }
        // Sentinels pass through so the backend sees what went wrong.
        Some(text) if text == PAGE_TEXT_ERROR || text == PAGE_TEXT_NOT_RECEIVED => {
            (text.to_string(), text.to_string())
        }
        _ => (NO_PAGE_TEXT.to_string(), NO_PAGE_TEXT.to_string()),
    };

    let prompt = substitute(template, |token| match token {
        Token::Persona => character.persona.as_str(),
        Token::OutputConstraints => character.output_constraints.as_str(),
        Token::Examples => character.examples.as_str(),
        Token::Url => url,
        Token::HistorySection => history_section.as_str(),
        Token::History => history_bare.as_str(),
        Token::PageTextSection => page_text_section.as_str(),
        Token::PageText => page_text_bare.as_str(),
    });
    debug!(
        "assembled prompt (character={}, len={})",
        character.id,
        prompt.len()
    );
    prompt
}

/// Expand a section wrapper, resolving `target` to `value` and any other
/// recognized placeholder to nothing.
fn expand_section(section: &str, target: Token, value: &str) -> String {
    substitute(section, |token| if token == target { value } else { "" })
}

/// Single left-to-right pass over `template`. Recognized placeholders are
/// resolved through `lookup`; unrecognized brace spans are kept verbatim.
fn substitute<'a>(template: &str, lookup: impl Fn(Token) -> &'a str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        match Token::parse(&tail[1..end]) {
            Some(token) => {
                out.push_str(lookup(token));
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
