//! Light and dark palettes.

use serde::{Deserialize, Serialize};

/// A resolved color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light canvas, dark ink.
    #[default]
    Light,
    /// Dark canvas, light ink.
    Dark,
}

/// What the user asked for; `System` follows the host preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the host.
    #[default]
    System,
}

impl ThemePreference {
    /// Resolve against the host's preference.
    #[must_use]
    pub const fn resolve(self, system: Theme) -> Theme {
        match self {
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
            Self::System => system,
        }
    }
}

/// A named color with a shade per theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    /// Display name.
    pub name: &'static str,
    /// Shade on a light canvas.
    pub light: &'static str,
    /// Shade on a dark canvas.
    pub dark: &'static str,
}

impl Swatch {
    /// The shade for `theme`.
    #[must_use]
    pub const fn for_theme(&self, theme: Theme) -> &'static str {
        match theme {
            Theme::Light => self.light,
            Theme::Dark => self.dark,
        }
    }
}

/// Outline colors.
pub const STROKE_SWATCHES: [Swatch; 5] = [
    Swatch { name: "black", light: "#1e1e1e", dark: "#e5e5e5" },
    Swatch { name: "red", light: "#ec0025", dark: "#ff5571" },
    Swatch { name: "green", light: "#00ad3e", dark: "#4ade80" },
    Swatch { name: "blue", light: "#315dc6", dark: "#60a5fa" },
    Swatch { name: "orange", light: "#f68c00", dark: "#fdba74" },
];

// Same hues as the stroke palette, opposite shade.
/// Fill colors.
pub const BACKGROUND_SWATCHES: [Swatch; 5] = [
    Swatch { name: "black", light: "transparent", dark: "transparent" },
    Swatch { name: "red", light: "#ffc4c8", dark: "#612e32" },
    Swatch { name: "green", light: "#9efeb9", dark: "#003e03" },
    Swatch { name: "blue", light: "#a4d3ff", dark: "#1b4369" },
    Swatch { name: "orange", light: "#fbf692", dark: "#282400" },
];

/// Canvas backgrounds offered on a dark theme.
pub const CANVAS_DARK_BG: [&str; 4] = ["#020618", "#181604", "#1b1715", "#13171b"];

/// Canvas backgrounds offered on a light theme.
pub const CANVAS_LIGHT_BG: [&str; 4] = ["#ffffff", "#f5faff", "#f8f9fa", "#fffce8"];

/// Default dark canvas background.
pub const DEFAULT_DARK_BG: &str = CANVAS_DARK_BG[0];

/// Default light canvas background.
pub const DEFAULT_LIGHT_BG: &str = CANVAS_LIGHT_BG[0];

impl Theme {
    /// Default canvas background.
    #[must_use]
    pub const fn default_background(self) -> &'static str {
        match self {
            Self::Light => DEFAULT_LIGHT_BG,
            Self::Dark => DEFAULT_DARK_BG,
        }
    }

    /// Canvas background choices.
    #[must_use]
    pub const fn canvas_backgrounds(self) -> &'static [&'static str; 4] {
        match self {
            Self::Light => &CANVAS_LIGHT_BG,
            Self::Dark => &CANVAS_DARK_BG,
        }
    }

    /// Outline `(name, hex)` pairs.
    pub fn stroke_swatches(self) -> impl Iterator<Item = (&'static str, &'static str)> {
        STROKE_SWATCHES.iter().map(move |s| (s.name, s.for_theme(self)))
    }

    /// Fill `(name, hex)` pairs.
    pub fn background_swatches(self) -> impl Iterator<Item = (&'static str, &'static str)> {
        BACKGROUND_SWATCHES
            .iter()
            .map(move |s| (s.name, s.for_theme(self)))
    }
}
