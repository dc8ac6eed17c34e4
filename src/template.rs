//! Templates: the persisted entity, its variables, and saving.

mod model;
mod save;
mod store;
mod variables;

pub use model::{
    Form, LegacySignatures, LogoConfig, Paragraph, Question, QuestionOption, Signature, Template,
    migrate_legacy_signatures, paragraphs_to_content,
};
pub use save::{SaveError, SavePayload, prepare_save};
pub use store::{FileStore, StoreError, TemplateStore};
pub use variables::{
    STATIC_VARIABLES, Variable, VariableCatalog, VariableSource, derive_variable_tag,
    variable_name,
};
