//! Structured form → persisted form.

use super::TranslateError;
use super::html::{Form, write_nodes};
use super::markers::is_embeddable_condition;
use super::node::Node;

/// Write `nodes` with every conditional block replaced by its markers.
///
/// Fails if a condition would break marker syntax; the caller decides how to
/// recover.
pub(crate) fn flatten_nodes(nodes: &[Node]) -> Result<String, TranslateError> {
    check_conditions(nodes)?;
    Ok(write_nodes(nodes, Form::Persisted))
}

fn check_conditions(nodes: &[Node]) -> Result<(), TranslateError> {
    for node in nodes {
        if let Node::Conditional(block) = node
            && !is_embeddable_condition(&block.condition)
        {
            return Err(TranslateError::UnembeddableCondition(
                block.condition.clone(),
            ));
        }
        check_conditions(node.children())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_sibling_blocks_do_not_interleave() {
        let nodes = vec![
            Node::conditional("A", vec![Node::paragraph("uno")]),
            Node::conditional(
                "B",
                vec![
                    Node::paragraph("dos"),
                    Node::conditional("C", vec![Node::paragraph("tres")]),
                ],
            ),
        ];
        assert_eq!(
            flatten_nodes(&nodes).unwrap(),
            "[[IF:A]]<p>uno</p>[[ENDIF]][[IF:B]]<p>dos</p>[[IF:C]]<p>tres</p>[[ENDIF]][[ENDIF]]"
        );
    }

    #[test]
    fn test_flatten_rejects_marker_in_condition() {
        let nodes = vec![Node::element(
            "p",
            vec![Node::conditional("X]]", vec![Node::text("a")])],
        )];
        assert!(matches!(
            flatten_nodes(&nodes),
            Err(TranslateError::UnembeddableCondition(c)) if c == "X]]"
        ));
    }

    #[test]
    fn test_flatten_escapes_condition() {
        let nodes = vec![Node::conditional(r#"NOMBRE < "Ana""#, vec![Node::text("x")])];
        let out = flatten_nodes(&nodes).unwrap();
        assert_eq!(out, r#"[[IF:NOMBRE &lt; "Ana"]]x[[ENDIF]]"#);
    }
}
