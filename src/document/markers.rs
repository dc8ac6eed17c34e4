//! Conditional marker and variable token scanning.
//!
//! Markers look like `[[IF:condition]]` and `[[ENDIF]]`; variable tokens look
//! like `{{NAME}}`. Both live in plain text of the persisted form.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// An opening or closing conditional marker.
    static ref MARKER_PATTERN: Regex =
        Regex::new(r"(?s)\[\[IF:(.*?)\]\]|\[\[ENDIF\]\]").unwrap();

    /// A variable token, tolerating inner whitespace.
    static ref VARIABLE_PATTERN: Regex =
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap();
}

/// A piece of text split at marker boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// `[[IF:…]]`; `condition` is already entity-decoded and trimmed.
    Open { condition: String, raw: &'a str },
    /// `[[ENDIF]]`.
    Close { raw: &'a str },
}

/// Split `text` into plain runs and markers.
pub fn split_markers(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in MARKER_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::Text(&text[last..whole.start()]));
        }
        let raw = whole.as_str();
        segments.push(match caps.get(1) {
            Some(condition) => Segment::Open {
                condition: unescape_condition(condition.as_str()),
                raw,
            },
            None => Segment::Close { raw },
        });
        last = whole.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }
    segments
}

/// If `text` (ignoring surrounding whitespace) is exactly one marker, return it.
pub fn lone_marker(text: &str) -> Option<Segment<'_>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut segments = split_markers(trimmed);
    if segments.len() != 1 {
        return None;
    }
    match segments.pop() {
        Some(Segment::Text(_)) | None => None,
        Some(marker) => Some(marker),
    }
}

/// Entity-escape condition text for embedding in markup.
///
/// `<`, `>` and `&` are replaced so the condition cannot be read back as
/// tags by any HTML parser.
pub fn escape_condition(condition: &str) -> String {
    html_escape::encode_text(condition).into_owned()
}

/// Decode entities a previous save may have left in condition text
/// (`&lt; &gt; &amp; &quot; &#39; &nbsp;` and friends).
///
/// Input has already been decoded once by the HTML parser, so a condition
/// whose literal text is an entity (`"&lt;"`) comes back decoded (`"<"`).
pub fn unescape_condition(condition: &str) -> String {
    html_escape::decode_html_entities(condition)
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// True if the condition can be embedded in a marker and read back intact.
pub fn is_embeddable_condition(condition: &str) -> bool {
    !condition.contains("]]") && !condition.contains("[[")
}

/// Names of the `{{NAME}}` tokens found in `text`, in order of appearance.
pub fn variable_names(text: &str) -> impl Iterator<Item = &str> {
    VARIABLE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Strip braces, markup and surrounding whitespace from a variable tag,
/// leaving the bare token text (`<b>{{ RUT }}</b>` becomes `RUT`).
pub fn bare_variable(tag: &str) -> String {
    let mut text = String::with_capacity(tag.len());
    let mut in_tag = false;
    for ch in tag.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim()
        .to_string()
}

/// True if `text` is a whole variable token (`{{NAME}}`).
pub fn is_variable_token(text: &str) -> bool {
    let trimmed = text.trim();
    VARIABLE_PATTERN
        .find(trimmed)
        .is_some_and(|m| m.start() == 0 && m.end() == trimmed.len())
}
