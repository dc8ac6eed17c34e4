//! Building the record sent to the store on save.

use serde::{Deserialize, Serialize};

use super::model::{LogoConfig, Paragraph, Signature, Template};
use crate::document::Translator;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SaveError {
    #[error("select a base form before saving the template")]
    MissingForm,

    #[error("the template has no content to save")]
    EmptyTemplate,
}

/// The record written by `POST /plantillas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub document_title: String,
    pub document_content: String,
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
    #[serde(default)]
    pub logo_config: LogoConfig,
    pub form_id: String,
    pub status: String,
}

impl SavePayload {
    /// The template this payload reads back as.
    pub fn into_template(self) -> Template {
        Template {
            id: self.id,
            document_title: self.document_title,
            document_content: Some(self.document_content),
            paragraphs: self.paragraphs,
            signatures: self.signatures,
            logo_config: self.logo_config,
            form_id: Some(self.form_id),
            questions: Vec::new(),
            status: self.status,
        }
    }
}

/// Validate a template and build its save payload.
///
/// `editor_html` is what the editor currently shows, if an editor is open; it
/// is flattened with the raw-HTML fallback so a flatten failure never blocks
/// the save. Without it the template's own content is used.
pub fn prepare_save(
    template: &Template,
    editor_html: Option<&str>,
    translator: &Translator,
) -> Result<SavePayload, SaveError> {
    let form_id = template
        .form_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(SaveError::MissingForm)?;

    let document_content = match editor_html {
        Some(html) => translator.flatten_or_fallback(html),
        None => template.content_html(),
    };

    let has_text = !translator
        .expand(&document_content)
        .text_content()
        .trim()
        .is_empty();
    let has_signatures = template
        .signatures
        .iter()
        .any(|s| !s.title.trim().is_empty() || !s.text.trim().is_empty());
    let has_title = !template.document_title.trim().is_empty();
    if !has_text && !has_title && !has_signatures {
        return Err(SaveError::EmptyTemplate);
    }

    let document_title = match template.document_title.trim() {
        "" => {
            let preview = Template {
                document_content: Some(document_content.clone()),
                ..Template::default()
            };
            preview.effective_title()
        }
        title => title.to_string(),
    };

    tracing::debug!(
        form_id,
        content_len = document_content.len(),
        "prepared template for save"
    );

    Ok(SavePayload {
        id: template.id.clone(),
        document_title,
        document_content,
        paragraphs: template.paragraphs.clone(),
        signatures: template.signatures.clone(),
        logo_config: template.logo_config.clone(),
        form_id: form_id.to_string(),
        status: template.status.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template() -> Template {
        Template {
            form_id: Some("form-1".to_string()),
            document_content: Some("<p>Contrato</p>".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_form_is_rejected() {
        let mut t = template();
        t.form_id = None;
        assert_eq!(
            prepare_save(&t, None, &Translator::default()),
            Err(SaveError::MissingForm)
        );

        t.form_id = Some("  ".to_string());
        assert_eq!(
            prepare_save(&t, None, &Translator::default()),
            Err(SaveError::MissingForm)
        );
    }

    #[test]
    fn test_empty_template_is_rejected() {
        let t = Template {
            form_id: Some("form-1".to_string()),
            document_content: Some("<p> </p><p></p>".to_string()),
            ..Default::default()
        };
        assert_eq!(
            prepare_save(&t, None, &Translator::default()),
            Err(SaveError::EmptyTemplate)
        );
    }

    #[test]
    fn test_signatures_alone_are_content() {
        let t = Template {
            form_id: Some("form-1".to_string()),
            signatures: vec![Signature::new("Empleador", "")],
            ..Default::default()
        };
        assert!(prepare_save(&t, None, &Translator::default()).is_ok());
    }

    #[test]
    fn test_title_alone_is_content() {
        let t = Template {
            form_id: Some("form-1".to_string()),
            document_title: "Contrato de Arriendo".to_string(),
            document_content: Some(String::new()),
            ..Default::default()
        };
        let payload = prepare_save(&t, None, &Translator::default()).unwrap();
        assert_eq!(payload.document_title, "Contrato de Arriendo");
        assert_eq!(payload.document_content, "");
    }

    #[test]
    fn test_editor_html_is_flattened() {
        let editor = r#"<div data-type="conditional-block" data-condition="A &gt; 1" data-color="" data-id="x"><p>uno</p></div>"#;
        let payload = prepare_save(&template(), Some(editor), &Translator::default()).unwrap();

        assert_eq!(payload.document_content, "[[IF:A &gt; 1]]<p>uno</p>[[ENDIF]]");
        assert_eq!(payload.form_id, "form-1");
        assert_eq!(payload.document_title, "uno");
        assert_eq!(payload.status, "draft");
    }

    #[test]
    fn test_flatten_failure_saves_raw_html() {
        let editor = r#"<div data-type="conditional-block" data-condition="A ]] B"><p>x</p></div>"#;
        let payload = prepare_save(&template(), Some(editor), &Translator::default()).unwrap();
        assert_eq!(payload.document_content, editor);
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = prepare_save(&template(), None, &Translator::default()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["documentContent"], "<p>Contrato</p>");
        assert_eq!(json["formId"], "form-1");
        assert!(json.get("id").is_none());
        assert!(json.get("logoConfig").is_some());
    }
}
