//! Variable tags and the catalog of variables a template can use.
//!
//! A tag is `{{NAME}}` where `NAME` is derived from a human label:
//! accents folded to ASCII, uppercased, whitespace runs turned into `_`,
//! anything outside `[A-Z0-9_]` dropped.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::model::Question;
use crate::config::CatalogConfig;

/// Labels of the variables every template can use, whatever its form.
pub const STATIC_VARIABLES: &[&str] = &[
    "Fecha Actual",
    "Hora Actual",
    "Nombre Empresa",
    "RUT Empresa",
    "Dirección Empresa",
    "Teléfono Empresa",
    "Email Empresa",
    "Nombre Trabajador",
    "RUT Trabajador",
    "Cargo Trabajador",
];

/// Derive the bare variable name for a label.
///
/// "Nombre del Trabajador" -> "NOMBRE_DEL_TRABAJADOR"
/// "Dirección" -> "DIRECCION"
pub fn variable_name(label: &str) -> String {
    let folded: String = label.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let mut name = String::with_capacity(folded.len());
    let mut in_space = false;
    for ch in folded.trim().chars() {
        if ch.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        for upper in ch.to_uppercase() {
            if upper.is_ascii_uppercase() || upper.is_ascii_digit() || upper == '_' {
                name.push(upper);
            }
        }
    }
    name
}

/// Derive the `{{NAME}}` tag for a label.
///
/// Returns an empty string when the label has nothing to derive from; callers
/// skip the insertion in that case.
pub fn derive_variable_tag(label: &str) -> String {
    let name = variable_name(label);
    if name.is_empty() {
        String::new()
    } else {
        format!("{{{{{name}}}}}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableSource {
    /// Built in, or added through configuration.
    Static,
    /// Derived from a question of the base form.
    Form,
}

/// One insertable variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub label: String,
    pub tag: String,
    pub source: VariableSource,
}

/// The variables offered by the authoring toolbar.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VariableCatalog {
    variables: Vec<Variable>,
}

impl VariableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The static catalog plus any extra static labels from configuration.
    pub fn with_statics(config: &CatalogConfig) -> Self {
        let mut catalog = Self::new();
        for label in STATIC_VARIABLES
            .iter()
            .copied()
            .chain(config.extra_static.iter().map(String::as_str))
        {
            catalog.add(label, VariableSource::Static);
        }
        catalog
    }

    /// Static variables followed by those derived from the form's questions.
    pub fn for_questions(questions: &[Question], config: &CatalogConfig) -> Self {
        let mut catalog = Self::with_statics(config);
        catalog.add_questions(questions);
        tracing::debug!(variables = catalog.len(), "built variable catalog");
        catalog
    }

    /// Add a variable. Labels yielding an empty or already known tag are
    /// skipped; returns whether it was added.
    pub fn add(&mut self, label: &str, source: VariableSource) -> bool {
        let tag = derive_variable_tag(label);
        if tag.is_empty() || self.find(&tag).is_some() {
            return false;
        }
        self.variables.push(Variable {
            label: label.trim().to_string(),
            tag,
            source,
        });
        true
    }

    /// Add every question, descending into option sub-forms and nested
    /// sub-form questions.
    pub fn add_questions(&mut self, questions: &[Question]) {
        for question in questions {
            self.add(&question.title, VariableSource::Form);
            for option in &question.options {
                self.add_questions(option.subform_questions());
            }
            self.add_questions(&question.subform_questions);
        }
    }

    /// Look a variable up by tag (`{{NAME}}`) or bare name.
    pub fn find(&self, tag_or_name: &str) -> Option<&Variable> {
        let name = tag_or_name
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .trim();
        self.variables
            .iter()
            .find(|v| v.tag.trim_start_matches('{').trim_end_matches('}') == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::model::QuestionOption;

    #[test]
    fn test_derive_variable_tag() {
        assert_eq!(
            derive_variable_tag("Nombre del Trabajador"),
            "{{NOMBRE_DEL_TRABAJADOR}}"
        );
        assert_eq!(derive_variable_tag("Dirección"), "{{DIRECCION}}");
        assert_eq!(derive_variable_tag("  Año   de ingreso "), "{{ANO_DE_INGRESO}}");
        assert_eq!(derive_variable_tag("¿Tiene hijos?"), "{{TIENE_HIJOS}}");
        assert_eq!(derive_variable_tag("N° de cuenta (CLP)"), "{{N_DE_CUENTA_CLP}}");
    }

    #[test]
    fn test_derive_is_deterministic_and_idempotent() {
        let first = derive_variable_tag("Teléfono de Contacto");
        assert_eq!(first, derive_variable_tag("Teléfono de Contacto"));
        assert_eq!(variable_name(&variable_name("Teléfono de Contacto")), "TELEFONO_DE_CONTACTO");
    }

    #[test]
    fn test_empty_label_gives_empty_tag() {
        assert_eq!(derive_variable_tag(""), "");
        assert_eq!(derive_variable_tag("  ¿? "), "");
    }

    #[test]
    fn test_static_catalog() {
        let catalog = VariableCatalog::with_statics(&CatalogConfig::default());
        let tags: Vec<_> = catalog.iter().map(|v| v.tag.as_str()).collect();

        assert_eq!(tags.len(), STATIC_VARIABLES.len());
        assert!(tags.contains(&"{{FECHA_ACTUAL}}"));
        assert!(tags.contains(&"{{DIRECCION_EMPRESA}}"));
        assert!(catalog.iter().all(|v| v.source == VariableSource::Static));
    }

    #[test]
    fn test_extra_statics_from_config() {
        let config = CatalogConfig {
            extra_static: vec!["Giro Empresa".to_string(), "Fecha Actual".to_string()],
        };
        let catalog = VariableCatalog::with_statics(&config);

        assert_eq!(catalog.len(), STATIC_VARIABLES.len() + 1);
        assert!(catalog.find("GIRO_EMPRESA").is_some());
    }

    #[test]
    fn test_catalog_from_nested_questions() {
        let questions = vec![
            Question {
                title: "¿Tiene hijos?".to_string(),
                options: vec![
                    QuestionOption::Label("No".to_string()),
                    QuestionOption::Detailed {
                        text: Some("Sí".to_string()),
                        subform_questions: vec![Question {
                            title: "Número de hijos".to_string(),
                            ..Default::default()
                        }],
                    },
                ],
                ..Default::default()
            },
            Question {
                title: "Datos del vehículo".to_string(),
                subform_questions: vec![Question {
                    title: "Patente".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            },
            Question {
                title: "Nombre Trabajador".to_string(),
                ..Default::default()
            },
        ];
        let catalog = VariableCatalog::for_questions(&questions, &CatalogConfig::default());

        let form_tags: Vec<_> = catalog
            .iter()
            .filter(|v| v.source == VariableSource::Form)
            .map(|v| v.tag.as_str())
            .collect();
        assert_eq!(
            form_tags,
            vec![
                "{{TIENE_HIJOS}}",
                "{{NUMERO_DE_HIJOS}}",
                "{{DATOS_DEL_VEHICULO}}",
                "{{PATENTE}}",
            ]
        );
        // Already a static variable
        assert_eq!(
            catalog.find("{{NOMBRE_TRABAJADOR}}").map(|v| v.source),
            Some(VariableSource::Static)
        );
    }
}
