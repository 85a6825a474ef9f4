//! Editor configuration.
//!
//! All fields have defaults, so a host can pass `{}` or only the keys it
//! cares about. The grid itself is fixed and not configurable here.

use crate::error::{EngineError, Result};
use crate::geometry::Viewport;
use crate::grid::{CANVAS_HEIGHT, CANVAS_WIDTH};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// First z-index handed out to non-text elements.
    pub general_z_base: i32,
    /// First z-index handed out to text boxes. Non-text elements never
    /// reach it.
    pub text_z_base: i32,
    /// Cells a paste is shifted from the previous copy on each axis.
    pub paste_offset: i32,
    /// Cells an arrow key moves the selection.
    pub nudge_step: i32,
    /// Pixel radius around a resize handle that counts as a hit.
    pub handle_tolerance: f32,
    /// Whether the surface starts in editable mode.
    pub editable: bool,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            general_z_base: 100,
            text_z_base: 1000,
            paste_offset: 1,
            nudge_step: 1,
            handle_tolerance: 8.0,
            editable: true,
            viewport_width: CANVAS_WIDTH,
            viewport_height: CANVAS_HEIGHT,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.general_z_base < 1 {
            return Err(EngineError::InvalidConfig(format!(
                "generalZBase must be at least 1, got {}",
                self.general_z_base
            )));
        }
        if self.text_z_base <= self.general_z_base {
            return Err(EngineError::InvalidConfig(format!(
                "textZBase ({}) must be above generalZBase ({})",
                self.text_z_base, self.general_z_base
            )));
        }
        if self.paste_offset < 1 || self.nudge_step < 1 {
            return Err(EngineError::InvalidConfig(
                "pasteOffset and nudgeStep must be positive".into(),
            ));
        }
        if !self.viewport().is_usable() {
            return Err(EngineError::InvalidConfig("viewport must be non-empty".into()));
        }
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}
