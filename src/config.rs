use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spacing and sizing knobs for the headless card-tree layout. All values
/// are in the same unit as the measured rectangles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width available for top-level columns before they wrap.
    pub viewport_width: f32,
    /// Padding between the container edge and the outermost cards.
    pub container_padding: f32,
    pub card_width: f32,
    pub card_height: f32,
    /// Vertical gap between stacked elements inside a column.
    pub card_gap: f32,
    /// Horizontal gap between adjacent top-level columns.
    pub column_gap: f32,
    /// Horizontal shift applied to each nesting level.
    pub indent_width: f32,
    pub child_action_width: f32,
    pub child_action_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            container_padding: 16.0,
            card_width: 240.0,
            card_height: 96.0,
            card_gap: 12.0,
            column_gap: 24.0,
            indent_width: 32.0,
            child_action_width: 40.0,
            child_action_height: 24.0,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&contents)
}

pub(crate) fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    match serde_json::from_str(contents) {
        Ok(config) => Ok(config),
        // Lenient fallback for configs with comments or unquoted keys.
        Err(json_err) => json5::from_str(contents).map_err(|_| {
            anyhow::Error::from(json_err).context("config file is not valid JSON or JSON5")
        }),
    }
}
