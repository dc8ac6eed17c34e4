//! Configuration loading from files and the environment.

use std::path::Path;

use super::{ConfigError, Settings};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "plantilla.yaml";

/// Prefix for environment overrides (`PLANTILLA_EDITOR__DEBOUNCE_MS=300`).
const ENV_PREFIX: &str = "PLANTILLA";

impl Settings {
    /// Load settings from the command line argument, defaulting to `plantilla.yaml`.
    ///
    /// A missing file is not an error: defaults apply, and environment
    /// overrides are still read.
    pub async fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file)
    }

    /// Load settings from a file path plus environment overrides.
    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let settings = config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Reject settings the editor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.editor.block_palette.is_empty() {
            return Err(ConfigError::Validation(
                "editor.block_palette must list at least one color".to_string(),
            ));
        }
        let colors =
            std::iter::once(&self.editor.default_block_color).chain(&self.editor.block_palette);
        for color in colors {
            if !is_css_hex_color(color) {
                return Err(ConfigError::Validation(format!(
                    "invalid block color '{color}': expected #rgb or #rrggbb"
                )));
            }
        }
        Ok(())
    }
}

fn is_css_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
