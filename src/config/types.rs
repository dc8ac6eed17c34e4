//! Configuration type definitions.
//!
//! This module contains the data structures read from `plantilla.yaml`.
//! These types are pure data - no I/O.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_BLOCK_COLOR;

// =============================================================================
// Top-level settings
// =============================================================================

/// Everything `plantilla.yaml` can configure. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

// =============================================================================
// Editor
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Insertions arriving within this many milliseconds of the previous
    /// accepted insertion are dropped.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Color for conditional blocks recognized from persisted markers.
    #[serde(default = "default_block_color")]
    pub default_block_color: String,
    /// Colors cycled through when authors create new conditional blocks.
    #[serde(default = "default_block_palette")]
    pub block_palette: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_block_color() -> String {
    DEFAULT_BLOCK_COLOR.to_string()
}

fn default_block_palette() -> Vec<String> {
    vec![
        "#3b82f6".to_string(),
        "#10b981".to_string(),
        "#f59e0b".to_string(),
        "#ef4444".to_string(),
        "#8b5cf6".to_string(),
        "#ec4899".to_string(),
    ]
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            default_block_color: default_block_color(),
            block_palette: default_block_palette(),
        }
    }
}

// =============================================================================
// Variable catalog
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Labels added to the built-in static variables (e.g. "Giro Empresa").
    #[serde(default)]
    pub extra_static: Vec<String>,
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one JSON file per template.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("plantillas")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}
