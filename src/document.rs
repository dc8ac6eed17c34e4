//! Document model translation.
//!
//! Converts between the persisted form of a template (HTML with
//! `[[IF:…]]`/`[[ENDIF]]` markers and `{{VAR}}` tokens) and the structured
//! form used while editing (a [`Document`] tree with explicit
//! [`ConditionalBlock`] nodes).

mod expand;
mod flatten;
pub mod html;
pub mod markers;
mod node;

pub use node::{ConditionalBlock, DEFAULT_BLOCK_COLOR, Document, Element, Node, new_block_id};
pub(crate) use node::merge_text_runs;

use expand::MarkerPairer;
use flatten::flatten_nodes;
use html::{Form, parse_nodes, write_nodes};

use crate::config::EditorConfig;

#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    #[error("condition '{0}' cannot be written as a marker (it contains '[[' or ']]')")]
    UnembeddableCondition(String),

    #[error("flattened output reads back with {found} conditional block(s), expected {expected}")]
    Unbalanced { expected: usize, found: usize },
}

/// Converts documents between persisted and structured form.
#[derive(Debug, Clone)]
pub struct Translator {
    /// Color assigned to blocks recognized from markers.
    default_color: String,
}

impl Translator {
    pub fn new(default_color: impl Into<String>) -> Self {
        Self {
            default_color: default_color.into(),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.default_block_color.clone())
    }

    /// Expand persisted HTML into a structured document.
    ///
    /// Never fails: markers that do not pair are kept as literal text.
    /// Editor HTML (with conditional block elements) is accepted as well.
    pub fn expand(&self, persisted: &str) -> Document {
        let nodes = parse_nodes(persisted, &self.default_color);
        let mut pairer = MarkerPairer::new(&self.default_color);
        let nodes = pairer.pair(nodes);

        if pairer.unmatched > 0 {
            tracing::warn!(
                unmatched = pairer.unmatched,
                "kept unmatched conditional markers as literal text"
            );
        }
        tracing::debug!(blocks = pairer.paired, "expanded conditional markers");

        Document::new(nodes)
    }

    /// Flatten a structured document into persisted HTML.
    pub fn flatten(&self, doc: &Document) -> Result<String, TranslateError> {
        flatten_nodes(&doc.nodes)
    }

    /// Render the structured document as editor HTML.
    pub fn to_editor_html(&self, doc: &Document) -> String {
        write_nodes(&doc.nodes, Form::Editor)
    }

    /// Flatten whatever the editor currently reports, checking that the
    /// result reads back with the same number of conditional blocks.
    pub fn flatten_editor_html(&self, editor_html: &str) -> Result<String, TranslateError> {
        let doc = self.expand(editor_html);
        let flattened = self.flatten(&doc)?;

        let expected = doc.conditionals().len();
        let found = self.expand(&flattened).conditionals().len();
        if expected != found {
            return Err(TranslateError::Unbalanced { expected, found });
        }
        Ok(flattened)
    }

    /// Like [`Translator::flatten_editor_html`], but a failure never blocks a
    /// save: the error is logged and the raw editor HTML is returned.
    pub fn flatten_or_fallback(&self, editor_html: &str) -> String {
        match self.flatten_editor_html(editor_html) {
            Ok(flattened) => flattened,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "failed to flatten document, saving raw editor content"
                );
                editor_html.to_string()
            }
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_COLOR)
    }
}

/// Expand persisted HTML with the default block color.
pub fn expand(persisted: &str) -> Document {
    Translator::default().expand(persisted)
}

/// Flatten a structured document into persisted HTML.
pub fn flatten(doc: &Document) -> Result<String, TranslateError> {
    Translator::default().flatten(doc)
}

/// Condition texts of every conditional block, in document order.
pub fn conditions(doc: &Document) -> Vec<String> {
    doc.conditionals()
        .into_iter()
        .map(|block| block.condition.clone())
        .collect()
}

/// Distinct variable names referenced by `{{…}}` tokens, in first-seen order.
pub fn variables(doc: &Document) -> Vec<String> {
    let text = doc.text_content();
    let mut names: Vec<String> = Vec::new();
    for name in markers::variable_names(&text) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_wrapped_paragraph_markers() {
        let doc = expand("<p>[[IF:TIENE_HIJOS]]</p><p>Hijos: {{NUMERO_HIJOS}}</p><p>[[ENDIF]]</p>");
        let expected = Document::new(vec![Node::conditional(
            "TIENE_HIJOS",
            vec![Node::paragraph("Hijos: {{NUMERO_HIJOS}}")],
        )]);
        assert!(doc.same_structure(&expected), "{doc:#?}");
    }

    #[test]
    fn test_expand_assigns_default_color_and_fresh_ids() {
        let translator = Translator::new("#ff0000");
        let doc = translator.expand("[[IF:A]]x[[ENDIF]][[IF:A]]x[[ENDIF]]");
        let blocks = doc.conditionals();

        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.color == "#ff0000"));
        assert_ne!(blocks[0].id, blocks[1].id);
    }

    #[test]
    fn test_round_trip() {
        let doc = Document::new(vec![
            Node::paragraph("Contrato de {{NOMBRE_TRABAJADOR}}"),
            Node::conditional(
                "TIPO_CONTRATO == \"Indefinido\"",
                vec![
                    Node::paragraph("Plazo indefinido."),
                    Node::element(
                        "p",
                        vec![
                            Node::text("Desde "),
                            Node::conditional("FECHA_INICIO", vec![Node::text("{{FECHA_INICIO}}")]),
                            Node::text("."),
                        ],
                    ),
                ],
            ),
            Node::element(
                "table",
                vec![Node::element(
                    "tbody",
                    vec![Node::element(
                        "tr",
                        vec![Node::element(
                            "td",
                            vec![Node::conditional("RUT", vec![Node::text("{{RUT}}")])],
                        )],
                    )],
                )],
            ),
        ]);

        let persisted = flatten(&doc).unwrap();
        let reparsed = expand(&persisted);

        assert_eq!(reparsed.normalized(), doc.normalized());
        assert_eq!(variables(&reparsed), variables(&doc));
    }

    #[test]
    fn test_escaping_round_trip() {
        let condition = r#"NOMBRE < "Juan" & EDAD > 18"#;
        let doc = Document::new(vec![Node::conditional(condition, vec![Node::paragraph("x")])]);

        let persisted = flatten(&doc).unwrap();
        let marker = persisted.split("]]").next().unwrap();
        assert!(!marker.contains('<'));
        assert!(!marker.contains('>'));

        assert_eq!(conditions(&expand(&persisted)), vec![condition.to_string()]);
    }

    #[test]
    fn test_double_encoded_condition_is_decoded() {
        let doc = expand("<p>[[IF:EDAD &amp;gt; 18]]</p><p>x</p><p>[[ENDIF]]</p>");
        assert_eq!(conditions(&doc), vec!["EDAD > 18".to_string()]);
    }

    #[test]
    fn test_entity_text_in_condition_is_decoded_on_expand() {
        let doc = Document::new(vec![Node::conditional(
            r#"SIMBOLO == "&lt;""#,
            vec![Node::paragraph("x")],
        )]);

        let persisted = flatten(&doc).unwrap();
        assert!(persisted.starts_with(r#"[[IF:SIMBOLO == "&amp;lt;"]]"#), "{persisted}");
        assert_eq!(conditions(&expand(&persisted)), vec![r#"SIMBOLO == "<""#.to_string()]);
    }

    #[test]
    fn test_unmatched_marker_is_literal() {
        let doc = expand("<p>[[IF:X]]</p><p>texto</p>");
        assert!(doc.conditionals().is_empty());
        assert!(doc.text_content().contains("[[IF:X]]"));
    }

    #[test]
    fn test_editor_html_round_trip() {
        let translator = Translator::default();
        let doc = translator.expand("<p>[[IF:A]]</p><p>uno</p><p>[[ENDIF]]</p><p>dos</p>");

        let editor_html = translator.to_editor_html(&doc);
        assert!(editor_html.contains(r#"data-type="conditional-block""#));
        assert_eq!(translator.expand(&editor_html), doc);

        assert_eq!(
            translator.flatten_editor_html(&editor_html).unwrap(),
            "[[IF:A]]<p>uno</p>[[ENDIF]]<p>dos</p>"
        );
    }

    #[test]
    fn test_flatten_or_fallback_returns_raw_html() {
        let raw = r#"<div data-type="conditional-block" data-condition="A ]] B"><p>x</p></div>"#;
        assert_eq!(Translator::default().flatten_or_fallback(raw), raw);
    }

    #[test]
    fn test_variables_are_distinct() {
        let doc = expand("<p>{{A}} {{B}}</p><p>{{A}}</p>");
        assert_eq!(variables(&doc), vec!["A".to_string(), "B".to_string()]);
    }
}
