//! Conditional, variable-driven document templates.
//!
//! - [`document`]: translation between persisted HTML with `[[IF:…]]` markers
//!   and the structured tree used while editing
//! - [`authoring`]: focus tracking, variable insertion and case transforms
//! - [`template`]: the stored template, its variable catalog, saving
//! - [`config`]: `plantilla.yaml` settings

pub mod authoring;
pub mod config;
pub mod document;
pub mod template;
pub mod util;
