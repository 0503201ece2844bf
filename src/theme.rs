use ratatui::style::Color;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THEME: &str = "nord";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub primary: Color,
    pub accent: Color,
    pub highlight: Color,
    pub background: Color,
    pub surface: Color,
    pub text: Color,
}

/// `#RRGGBB` overrides layered over a preset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColorOverrides {
    pub primary: Option<String>,
    pub accent: Option<String>,
    pub highlight: Option<String>,
    pub background: Option<String>,
    pub surface: Option<String>,
    pub text: Option<String>,
}

struct ThemeDefinition {
    name: &'static str,
    primary: &'static str,
    accent: &'static str,
    highlight: &'static str,
    background: &'static str,
    surface: &'static str,
    text: &'static str,
}

const THEME_PRESETS: &[(&str, ThemeDefinition)] = &[
    (
        "nord",
        ThemeDefinition {
            name: "Nord",
            primary: "#5E81AC",
            accent: "#D08770",
            highlight: "#76B3C5",
            background: "#3B4252",
            surface: "#4C566A",
            text: "#ECEFF4",
        },
    ),
    (
        "classic",
        ThemeDefinition {
            name: "Midnight Classic",
            primary: "#6FC6D4",
            accent: "#0F1A2B",
            highlight: "#9FE6EC",
            background: "#314A63",
            surface: "#416079",
            text: "#F2F8FF",
        },
    ),
    (
        "mist",
        ThemeDefinition {
            name: "Midnight Mist",
            primary: "#66C3CF",
            accent: "#0E1828",
            highlight: "#96DFE8",
            background: "#2C4156",
            surface: "#3B5A72",
            text: "#F4FBFF",
        },
    ),
    (
        "deep",
        ThemeDefinition {
            name: "Midnight Deep",
            primary: "#5FC0CD",
            accent: "#0D1725",
            highlight: "#92DDE7",
            background: "#243A50",
            surface: "#344F68",
            text: "#F6FCFF",
        },
    ),
];

impl Default for Theme {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

impl Theme {
    /// Unknown preset keys fall back to the default preset.
    pub fn resolve(key: Option<&str>, overrides: Option<&ThemeColorOverrides>) -> Self {
        let key = key.unwrap_or(DEFAULT_THEME);
        let def = THEME_PRESETS
            .iter()
            .find(|(preset_key, _)| preset_key.eq_ignore_ascii_case(key))
            .or_else(|| {
                log::warn!("Unknown theme {key:?}, using {DEFAULT_THEME}");
                THEME_PRESETS.first()
            })
            .map(|(_, def)| def);
        match def {
            Some(def) => Self::from_definition(def, overrides),
            None => Self::fallback(),
        }
    }

    fn from_definition(def: &ThemeDefinition, overrides: Option<&ThemeColorOverrides>) -> Self {
        let pick = |custom: Option<&String>, preset: &str, default: Color| {
            custom
                .and_then(|hex| color_from_hex(hex))
                .or_else(|| color_from_hex(preset))
                .unwrap_or(default)
        };
        let o = overrides.cloned().unwrap_or_default();
        Theme {
            name: def.name.to_string(),
            primary: pick(o.primary.as_ref(), def.primary, Color::Blue),
            accent: pick(o.accent.as_ref(), def.accent, Color::Cyan),
            highlight: pick(o.highlight.as_ref(), def.highlight, Color::Cyan),
            background: pick(o.background.as_ref(), def.background, Color::Black),
            surface: pick(o.surface.as_ref(), def.surface, Color::DarkGray),
            text: pick(o.text.as_ref(), def.text, Color::White),
        }
    }

    fn fallback() -> Self {
        Theme {
            name: "Terminal".into(),
            primary: Color::Blue,
            accent: Color::Cyan,
            highlight: Color::Cyan,
            background: Color::Black,
            surface: Color::DarkGray,
            text: Color::White,
        }
    }
}

pub fn color_from_hex(value: &str) -> Option<Color> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
