//! Engine configuration, loaded once at startup from TOML.
//!
//! ```toml
//! screen_animations = true
//! padding_divisor = 60
//! pulse_decay = 10.0
//! font_scales = [52, 44, 26, 20, 13, 7]
//! default_font = "ttf/DejaVuSans-Bold.ttf"
//! theme = "classic"
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GuiError, GuiResult};
use crate::style::FontSize;

/// Tunables for a [`crate::Gui`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuiConfig {
    /// Play slide animations. `false` is reduced-motion mode.
    pub screen_animations: bool,
    /// Padding is `min(viewport w, h) / padding_divisor`.
    pub padding_divisor: i32,
    /// Pulse decay rate per second.
    pub pulse_decay: f32,
    /// Font pixel size divisors, one per [`FontSize`], smallest first.
    pub font_scales: [i32; FontSize::COUNT],
    /// Font used when a widget names none.
    pub default_font: String,
    /// Background theme name handed to the backend.
    pub theme: String,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            screen_animations: true,
            padding_divisor: 60,
            pulse_decay: 10.0,
            font_scales: [52, 44, 26, 20, 13, 7],
            default_font: "ttf/DejaVuSans-Bold.ttf".to_owned(),
            theme: "classic".to_owned(),
        }
    }
}

impl GuiConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`GuiError::Config`] on syntax errors, unknown keys or out-of-range values.
    pub fn from_toml_str(source: &str) -> GuiResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| GuiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`GuiError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> GuiResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| GuiError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`GuiError::Config`] naming the first bad field.
    pub fn validate(&self) -> GuiResult<()> {
        if self.padding_divisor <= 0 {
            return Err(GuiError::Config(format!(
                "padding_divisor must be positive, got {}",
                self.padding_divisor
            )));
        }
        if let Some(bad) = self.font_scales.iter().find(|&&s| s <= 0) {
            return Err(GuiError::Config(format!(
                "font_scales must be positive, got {bad}"
            )));
        }
        if !(self.pulse_decay.is_finite() && self.pulse_decay >= 0.0) {
            return Err(GuiError::Config(format!(
                "pulse_decay must be a non-negative number, got {}",
                self.pulse_decay
            )));
        }
        Ok(())
    }

    /// Font pixel size for a class at the given viewport.
    #[must_use]
    pub fn font_px(&self, size: FontSize, min_side: i32) -> i32 {
        min_side / self.font_scales[size.index()].max(1)
    }
}
