//! Classification of backend output.

use regex::Regex;

/// Keywords marking a diagnostic sentence rather than character speech.
const DIAGNOSTIC_KEYWORDS: &str = "(?i)error|limit|fail|invalid|reach|blocked|speechless|confused|malfunctioning|missing api key|couldn't generate a quip|blocked the prompt|unexpected response";

/// Whether a generated quip is a diagnostic sentence.
///
/// Backends report failures in-band as quip text; anything matching the
/// diagnostic keywords (or blank output) is delivered to the overlay but
/// kept out of history. The match deliberately over-triggers on character
/// speech that happens to use a keyword.
pub fn is_error_quip(quip: &str) -> bool {
    if quip.trim().is_empty() {
        return true;
    }
    let Ok(pattern) = Regex::new(DIAGNOSTIC_KEYWORDS) else {
        return true;
    };
    pattern.is_match(quip)
}
