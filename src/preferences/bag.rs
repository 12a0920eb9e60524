use serde::{Deserialize, Deserializer, Serialize};

pub const MIN_FONT_SCALE: f64 = 0.8;
pub const MAX_FONT_SCALE: f64 = 1.5;
pub const DEFAULT_FONT_SCALE: f64 = 1.0;
const FONT_SCALE_STEP: f64 = 0.1;
const STEPS_PER_UNIT: f64 = 10.0;
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "claro", alias = "light")]
    Light,
    #[serde(rename = "escuro", alias = "dark")]
    Dark,
}

impl Theme {
    /// Theme reported by a `prefers-color-scheme: light` query
    pub fn from_prefers_light(prefers_light: bool) -> Self {
        if prefers_light {
            Theme::Light
        } else {
            Theme::Dark
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBlindFilter {
    #[default]
    None,
    Protanopia,
    Deuteranopia,
    Tritanopia,
}

impl ColorBlindFilter {
    /// Body class applying the SVG color matrix filter
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            ColorBlindFilter::None => None,
            ColorBlindFilter::Protanopia => Some("filtro-protanopia"),
            ColorBlindFilter::Deuteranopia => Some("filtro-deuteranopia"),
            ColorBlindFilter::Tritanopia => Some("filtro-tritanopia"),
        }
    }
}

/// Font size buttons of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStep {
    Increase,
    Decrease,
    Reset,
}

/// Persisted accessibility preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceBag {
    /// Explicit theme, `None` follows the OS color scheme
    #[serde(rename = "tema", default, deserialize_with = "lenient_theme")]
    pub theme: Option<Theme>,

    #[serde(rename = "contraste", default)]
    pub high_contrast: bool,

    /// Font scale factor, always within [0.8, 1.5] in steps of 0.1
    #[serde(rename = "scaleFactor", default = "default_font_scale")]
    pub font_scale: f64,

    #[serde(rename = "filtroDaltonismo", default)]
    pub color_blind_filter: ColorBlindFilter,
}

impl Default for PreferenceBag {
    fn default() -> Self {
        Self {
            theme: None,
            high_contrast: false,
            font_scale: DEFAULT_FONT_SCALE,
            color_blind_filter: ColorBlindFilter::None,
        }
    }
}

impl PreferenceBag {
    pub fn step_font(&mut self, step: FontStep) {
        self.font_scale = step_font_scale(self.font_scale, step);
    }
}

fn default_font_scale() -> f64 {
    DEFAULT_FONT_SCALE
}

/// Empty or unknown theme strings count as unset
fn lenient_theme<'de, D>(deserializer: D) -> Result<Option<Theme>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some("claro") | Some("light") => Some(Theme::Light),
        Some("escuro") | Some("dark") => Some(Theme::Dark),
        _ => None,
    })
}

fn round_to_step(value: f64) -> f64 {
    (value * STEPS_PER_UNIT).round() / STEPS_PER_UNIT
}

/// Snap to the 0.1 grid and clamp into the allowed range
pub(crate) fn clamp_font_scale(value: f64) -> f64 {
    if !value.is_finite() {
        return DEFAULT_FONT_SCALE;
    }
    round_to_step(value).clamp(MIN_FONT_SCALE, MAX_FONT_SCALE)
}

/// Next font scale; stepping past either end wraps back to normal size
pub(crate) fn step_font_scale(current: f64, step: FontStep) -> f64 {
    match step {
        FontStep::Increase => {
            if current >= MAX_FONT_SCALE - EPSILON {
                DEFAULT_FONT_SCALE
            } else {
                round_to_step(current + FONT_SCALE_STEP).min(MAX_FONT_SCALE)
            }
        }
        FontStep::Decrease => {
            if current <= MIN_FONT_SCALE + EPSILON {
                DEFAULT_FONT_SCALE
            } else {
                round_to_step(current - FONT_SCALE_STEP).max(MIN_FONT_SCALE)
            }
        }
        FontStep::Reset => DEFAULT_FONT_SCALE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_increase_walks_to_max_then_wraps() {
        let mut scale = DEFAULT_FONT_SCALE;
        for expected in [1.1, 1.2, 1.3, 1.4, 1.5] {
            scale = step_font_scale(scale, FontStep::Increase);
            assert!(approx(scale, expected), "expected {}, got {}", expected, scale);
        }

        scale = step_font_scale(scale, FontStep::Increase);
        assert!(approx(scale, DEFAULT_FONT_SCALE), "Should wrap back to normal size");
    }

    #[test]
    fn test_decrease_walks_to_min_then_wraps() {
        let mut scale = step_font_scale(DEFAULT_FONT_SCALE, FontStep::Decrease);
        assert!(approx(scale, 0.9));
        scale = step_font_scale(scale, FontStep::Decrease);
        assert!(approx(scale, 0.8));
        scale = step_font_scale(scale, FontStep::Decrease);
        assert!(approx(scale, DEFAULT_FONT_SCALE));
    }

    #[test]
    fn test_clamp_font_scale() {
        assert!(approx(clamp_font_scale(3.0), MAX_FONT_SCALE));
        assert!(approx(clamp_font_scale(0.1), MIN_FONT_SCALE));
        assert!(approx(clamp_font_scale(1.23), 1.2));
        assert!(approx(clamp_font_scale(f64::NAN), DEFAULT_FONT_SCALE));
    }

    #[test]
    fn test_bag_uses_storage_keys() {
        let bag = PreferenceBag {
            theme: Some(Theme::Light),
            high_contrast: true,
            font_scale: 1.2,
            color_blind_filter: ColorBlindFilter::Tritanopia,
        };

        let json = serde_json::to_string(&bag).unwrap();
        assert!(json.contains("\"tema\":\"claro\""));
        assert!(json.contains("\"contraste\":true"));
        assert!(json.contains("\"scaleFactor\":1.2"));
        assert!(json.contains("\"filtroDaltonismo\":\"tritanopia\""));
    }

    #[test]
    fn test_bag_tolerates_missing_and_empty_fields() {
        let bag: PreferenceBag = serde_json::from_str(r#"{"tema": ""}"#).unwrap();
        assert_eq!(bag, PreferenceBag::default());

        let bag: PreferenceBag = serde_json::from_str(r#"{"tema": "dark", "contraste": true}"#).unwrap();
        assert_eq!(bag.theme, Some(Theme::Dark));
        assert!(bag.high_contrast);
        assert!(approx(bag.font_scale, DEFAULT_FONT_SCALE));
    }
}
