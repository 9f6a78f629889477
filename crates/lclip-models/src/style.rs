//! Caption style presets and aspect ratios.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Aspect ratio specification. Serialized as `"9:16"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Standard portrait (9:16) for Shorts/Reels
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Square (1:1)
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the aspect ratio as a decimal.
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl From<AspectRatio> for String {
    fn from(a: AspectRatio) -> Self {
        a.to_string()
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = AspectRatioParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| AspectRatioParseError::InvalidFormat(s.to_string()))?;

        let width: u32 = w
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(w.to_string()))?;
        let height: u32 = h
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(h.to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::InvalidFormat(s.to_string()));
        }

        Ok(Self { width, height })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}")]
    InvalidFormat(String),
    #[error("Invalid aspect ratio number: {0}")]
    InvalidNumber(String),
}

/// A caption style preset: palette applied to generated ASS subtitles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StylePreset {
    pub name: String,

    /// Primary text color (hex, `#rrggbb` or `#rgb`)
    pub primary: String,

    /// Outline color
    pub outline: String,

    /// Shadow color, if the preset uses one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<String>,
}

impl StylePreset {
    /// The built-in preset table, in presentation order.
    pub fn builtin() -> Vec<StylePreset> {
        fn preset(name: &str, primary: &str, outline: &str, shadow: Option<&str>) -> StylePreset {
            StylePreset {
                name: name.to_string(),
                primary: primary.to_string(),
                outline: outline.to_string(),
                shadow: shadow.map(str::to_string),
            }
        }

        vec![
            preset("clean", "#fff", "#000", None),
            preset("mrbeast", "#00f0ff", "#ff00ff", None),
            preset("karaoke", "#fff700", "#000", None),
            preset("bold-outline", "#fff", "#000", Some("#333")),
            preset("emoji-pop", "#fff", "#000", None),
            preset("minimal", "#fff", "#222", None),
            preset("high-contrast", "#fff", "#000", None),
            preset("shadowed", "#fff", "#000", Some("#000")),
        ]
    }

    /// Look up a preset by name; unknown names fall back to `clean`.
    pub fn resolve(name: Option<&str>) -> StylePreset {
        let table = Self::builtin();
        name.and_then(|n| table.iter().find(|p| p.name == n).cloned())
            .unwrap_or_else(|| table.into_iter().next().expect("builtin table is non-empty"))
    }

    /// Primary color in ASS `&HAABBGGRR` form.
    pub fn primary_ass(&self) -> String {
        hex_to_ass(&self.primary)
    }

    /// Outline color in ASS form.
    pub fn outline_ass(&self) -> String {
        hex_to_ass(&self.outline)
    }

    /// Shadow color in ASS form (black when the preset has none).
    pub fn shadow_ass(&self) -> String {
        hex_to_ass(self.shadow.as_deref().unwrap_or("#000"))
    }
}

/// Convert `#rgb` / `#rrggbb` to the ASS `&H00BBGGRR` color form.
/// Unparseable input falls back to white.
fn hex_to_ass(hex: &str) -> String {
    let digits = hex.trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => "ffffff".to_string(),
    };

    let parse = |range: std::ops::Range<usize>| u8::from_str_radix(&expanded[range], 16);
    match (parse(0..2), parse(2..4), parse(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => format!("&H00{:02X}{:02X}{:02X}", b, g, r),
        _ => "&H00FFFFFF".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::PORTRAIT);
        assert!("bogus".parse::<AspectRatio>().is_err());
        assert!("0:16".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_aspect_ratio_roundtrip() {
        let json = serde_json::to_string(&AspectRatio::PORTRAIT).unwrap();
        assert_eq!(json, "\"9:16\"");
        let parsed: AspectRatio = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, AspectRatio::PORTRAIT);
    }

    #[test]
    fn test_preset_resolution() {
        assert_eq!(StylePreset::resolve(Some("mrbeast")).primary, "#00f0ff");
        assert_eq!(StylePreset::resolve(Some("no-such")).name, "clean");
        assert_eq!(StylePreset::resolve(None).name, "clean");
    }

    #[test]
    fn test_hex_to_ass() {
        // ASS stores colors as blue-green-red
        assert_eq!(hex_to_ass("#00f0ff"), "&H00FFF000");
        assert_eq!(hex_to_ass("#fff"), "&H00FFFFFF");
        assert_eq!(hex_to_ass("not-a-color"), "&H00FFFFFF");
    }
}
