//! Shared utility functions.

/// Uppercase the first character of `word` and lowercase the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Convert text to title case, keeping the separators as they were.
///
/// Every run of non-separator characters is capitalized.
/// "hola  mundo" -> "Hola  Mundo"
/// "nombre_trabajador" with `_` as separator -> "Nombre_Trabajador"
pub fn title_case_with(s: &str, is_separator: impl Fn(char) -> bool) -> String {
    let mut result = String::with_capacity(s.len());
    let mut word = String::new();
    for ch in s.chars() {
        if is_separator(ch) {
            result.push_str(&capitalize(&word));
            word.clear();
            result.push(ch);
        } else {
            word.push(ch);
        }
    }
    result.push_str(&capitalize(&word));
    result
}

/// Title case for natural prose: words are whitespace-separated.
pub fn title_case(s: &str) -> String {
    title_case_with(s, char::is_whitespace)
}

/// Byte offset of the `char_idx`-th character, clamped to the end.
pub fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
