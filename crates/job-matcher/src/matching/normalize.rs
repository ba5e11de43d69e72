use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const SNIPPET_CHARS: usize = 260;

fn years_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").expect("valid years pattern")
    })
}

/// Lowercases, strips invisible characters, decodes entities, and collapses whitespace.
pub fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let decoded = decode_entities(&cleaned);
    collapse_whitespace(&decoded).to_lowercase()
}

/// Reduces an HTML fragment to readable plain text, preserving case.
pub fn html_to_text(value: &str) -> String {
    // ATS payloads often double-encode markup (`&lt;p&gt;`).
    let markup = if value.contains("&lt;") {
        decode_entities(value)
    } else {
        value.to_string()
    };
    collapse_whitespace(&render_html(&markup))
}

/// Plain text for a description that may or may not contain markup.
pub fn description_text(value: &str) -> String {
    if value.contains('<') || value.contains("&lt;") {
        html_to_text(value)
    } else {
        collapse_whitespace(&decode_entities(value))
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_html(markup: &str) -> String {
    match html2text::from_read(markup.as_bytes(), usize::MAX) {
        Ok(text) => text,
        Err(err) => {
            debug!(error = %err, "html conversion failed, keeping raw text");
            markup.to_string()
        }
    }
}

/// Decodes character references in text that is not markup.
///
/// Angle brackets are escaped first so the renderer keeps them as literal text.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    render_html(&value.replace('<', "&lt;").replace('>', "&gt;"))
}

/// True when `phrase` occurs in `haystack` on token boundaries.
///
/// Both inputs must already be normalised. A boundary is only enforced on a
/// side where the phrase itself ends in an alphanumeric character, so `go`
/// does not match `google` while `c++` and `.net` still match inside longer tokens.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }

    let check_left = phrase.chars().next().is_some_and(char::is_alphanumeric);
    let check_right = phrase.chars().next_back().is_some_and(char::is_alphanumeric);

    haystack.match_indices(phrase).any(|(start, matched)| {
        let end = start + matched.len();
        let left_ok = !check_left
            || haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
        let right_ok = !check_right
            || haystack[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
        left_ok && right_ok
    })
}

/// Largest "N years" / "N+ years" figure mentioned in normalised text.
pub fn extract_years(text: &str) -> Option<u32> {
    years_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
}

/// First 260 characters of `text`, with an ellipsis when truncated.
pub fn snippet(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
