//! The persisted Template entity and its legacy shapes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::document::html::{self, write_nodes};
use crate::document::{Document, Node, Translator, flatten};

/// Suffix appended to the title of a duplicated template.
const COPY_SUFFIX: &str = " (copia)";

/// Longest title derived from content.
const MAX_DERIVED_TITLE_CHARS: usize = 80;

// =============================================================================
// Template
// =============================================================================

/// A document template as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub document_title: String,
    /// Canonical persisted form (HTML with markers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_content: Option<String>,
    /// Legacy representation, used only when `document_content` is absent.
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
    #[serde(default)]
    pub logo_config: LogoConfig,
    /// Base form whose questions supply dynamic variables.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub form_id: Option<String>,
    /// Snapshot of the base form's questions. Not owned by the template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "draft".to_string()
}

impl Default for Template {
    fn default() -> Self {
        Self {
            id: None,
            document_title: String::new(),
            document_content: None,
            paragraphs: Vec::new(),
            signatures: Vec::new(),
            logo_config: LogoConfig::default(),
            form_id: None,
            questions: Vec::new(),
            status: default_status(),
        }
    }
}

/// A legacy paragraph record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(deserialize_with = "required_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    /// Variable or condition gating this paragraph, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_var: Option<String>,
}

impl Paragraph {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: new_paragraph_id(),
            content: content.into(),
            conditional_var: None,
        }
    }
}

fn new_paragraph_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A signature block at the foot of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Signature {
    pub title: String,
    pub text: String,
    pub title_bold: bool,
    pub title_italic: bool,
    pub title_underline: bool,
    pub text_bold: bool,
    pub text_italic: bool,
    pub text_underline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_font_family: Option<String>,
    #[serde(
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub title_font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_font_family: Option<String>,
    #[serde(
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_font_size: Option<String>,
}

impl Signature {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            title_bold: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoConfig {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    /// Data URI of the right-hand logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_logo_data: Option<String>,
}

// =============================================================================
// Base form questions
// =============================================================================

/// A base form, as far as variable derivation is concerned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subform_questions: Vec<Question>,
}

/// A choice of a question: either a bare label or an object that may open a
/// sub-form with further questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionOption {
    Label(String),
    Detailed {
        #[serde(default)]
        text: Option<String>,
        #[serde(default, rename = "subformQuestions")]
        subform_questions: Vec<Question>,
    },
}

impl QuestionOption {
    pub fn subform_questions(&self) -> &[Question] {
        match self {
            QuestionOption::Label(_) => &[],
            QuestionOption::Detailed {
                subform_questions, ..
            } => subform_questions,
        }
    }
}

// =============================================================================
// Legacy signature shape
// =============================================================================

/// Two fixed signature fields used before `signatures` existed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySignatures {
    #[serde(default)]
    pub signature1_title: Option<String>,
    #[serde(default)]
    pub signature1_text: Option<String>,
    #[serde(default)]
    pub signature2_title: Option<String>,
    #[serde(default)]
    pub signature2_text: Option<String>,
}

impl LegacySignatures {
    pub fn is_present(&self) -> bool {
        self.signature1_text.is_some()
            || self.signature2_text.is_some()
            || self.signature1_title.is_some()
            || self.signature2_title.is_some()
    }
}

/// Synthesize the `signatures` sequence from the legacy fields.
///
/// Both slots are always produced so signature indexes stay stable.
pub fn migrate_legacy_signatures(legacy: &LegacySignatures) -> Vec<Signature> {
    if !legacy.is_present() {
        return Vec::new();
    }
    let slot = |title: &Option<String>, text: &Option<String>, n: usize| {
        Signature::new(
            title.clone().unwrap_or_else(|| format!("Firma {n}")),
            text.clone().unwrap_or_default(),
        )
    };
    vec![
        slot(&legacy.signature1_title, &legacy.signature1_text, 1),
        slot(&legacy.signature2_title, &legacy.signature2_text, 2),
    ]
}

/// A stored record: the current shape plus whatever legacy fields remain.
#[derive(Deserialize)]
struct StoredTemplate {
    #[serde(flatten)]
    template: Template,
    #[serde(flatten)]
    legacy: LegacySignatures,
}

impl Template {
    /// Read a stored template, migrating the legacy signature shape.
    ///
    /// This is the only place legacy fields are looked at; once migrated,
    /// the template only ever carries `signatures`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let StoredTemplate {
            mut template,
            legacy,
        } = serde_json::from_str(json)?;

        if template.signatures.is_empty() && legacy.is_present() {
            tracing::debug!("migrating legacy signature fields");
            template.signatures = migrate_legacy_signatures(&legacy);
        }
        Ok(template)
    }

    /// Copy of this template for editing as a new one.
    ///
    /// Paragraphs get fresh ids so the copy never shares identities with the
    /// original.
    pub fn duplicate(&self) -> Template {
        let mut copy = self.clone();
        copy.id = None;
        copy.status = default_status();
        copy.document_title = format!("{}{}", self.effective_title(), COPY_SUFFIX);
        for paragraph in &mut copy.paragraphs {
            paragraph.id = new_paragraph_id();
        }
        copy
    }

    /// Persisted HTML for this template, synthesizing it from legacy
    /// paragraphs when `document_content` is absent.
    pub fn content_html(&self) -> String {
        match &self.document_content {
            Some(content) if !content.trim().is_empty() => content.clone(),
            _ => paragraphs_to_content(&self.paragraphs),
        }
    }

    /// The title, or the first line of content when no title is set.
    pub fn effective_title(&self) -> String {
        let title = self.document_title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
        let doc = Translator::default().expand(&self.content_html());
        first_line(&doc).unwrap_or_default()
    }
}

/// Build persisted content from legacy paragraphs.
///
/// Each paragraph becomes a `<p>`; a `conditionalVar` wraps it in markers.
pub fn paragraphs_to_content(paragraphs: &[Paragraph]) -> String {
    let nodes = paragraphs
        .iter()
        .map(|paragraph| {
            let mut lines = paragraph.content.lines();
            let mut children = vec![Node::text(lines.next().unwrap_or_default())];
            for line in lines {
                children.push(Node::element("br", Vec::new()));
                children.push(Node::text(line));
            }
            let p = Node::element("p", children);

            match paragraph.conditional_var.as_deref().map(str::trim) {
                Some(var) if !var.is_empty() => Node::conditional(var, vec![p]),
                _ => p,
            }
        })
        .collect();

    let doc = Document::new(nodes);
    match flatten(&doc) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(error = %e, "dropping paragraph conditions that cannot be flattened");
            let plain: Vec<Node> = doc
                .nodes
                .into_iter()
                .flat_map(|node| match node {
                    Node::Conditional(block) => block.children,
                    other => vec![other],
                })
                .collect();
            write_nodes(&plain, html::Form::Persisted)
        }
    }
}

fn first_line(doc: &Document) -> Option<String> {
    let line = doc.nodes.iter().map(Node::text_content).find_map(|text| {
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    })?;
    Some(line.chars().take(MAX_DERIVED_TITLE_CHARS).collect())
}

// =============================================================================
// Serde helpers
// =============================================================================

/// Ids come back from the backend as strings or as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}

fn required_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}
