//! Case transforms for selected text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::util::{title_case, title_case_with};

lazy_static! {
    /// A `{{…}}` token, including malformed or lowercase ones.
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\{\{([^{}]*)\}\}").unwrap();

    /// A bare snake case identifier with at least one underscore.
    static ref IDENTIFIER_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9]+(?:_[A-Za-z0-9]+)+$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Upper,
    Lower,
    #[serde(rename = "titlecase")]
    TitleCase,
}

impl CaseMode {
    /// Transform `text` according to this mode.
    pub fn apply(self, text: &str) -> String {
        match self {
            CaseMode::Upper => text.to_uppercase(),
            CaseMode::Lower => text.to_lowercase(),
            CaseMode::TitleCase => title_case_text(text),
        }
    }
}

/// Title case that keeps variable tags readable.
///
/// Tags capitalize each `_` or space separated word of their label and keep
/// braces and separators; the prose around them capitalizes each word.
fn title_case_text(text: &str) -> String {
    let trimmed = text.trim();
    if IDENTIFIER_PATTERN.is_match(trimmed) {
        return title_case_with(text, |c| c == '_' || c.is_whitespace());
    }

    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for caps in TOKEN_PATTERN.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        result.push_str(&title_case_prose(&text[last..whole.start()], last > 0));
        result.push_str("{{");
        result.push_str(&title_case_with(inner.as_str(), |c| {
            c == '_' || c.is_whitespace()
        }));
        result.push_str("}}");
        last = whole.end();
    }
    result.push_str(&title_case_prose(&text[last..], last > 0));
    result
}

/// Title case a prose run. After a tag, a run that starts mid-word continues
/// that word and keeps its first word lowercase.
fn title_case_prose(prose: &str, after_tag: bool) -> String {
    if !after_tag || prose.starts_with(char::is_whitespace) {
        return title_case(prose);
    }
    let split = prose.find(char::is_whitespace).unwrap_or(prose.len());
    let (head, rest) = prose.split_at(split);
    head.to_lowercase() + &title_case(rest)
}
