use anyhow::Result;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use super::bag::{ColorBlindFilter, FontStep, PreferenceBag, Theme, DEFAULT_FONT_SCALE};
use super::store::PreferenceStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown accessibility option: {0}")]
pub struct UnknownOption(pub String);

/// One clickable option of the accessibility panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOption {
    Theme(Theme),
    ToggleHighContrast,
    Font(FontStep),
    ColorBlind(ColorBlindFilter),
    ResetAll,
}

impl FromStr for PanelOption {
    type Err = UnknownOption;

    /// Parses the `data-opcao` identifiers used by the panel markup
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let option = match s {
            "tema-escuro" => PanelOption::Theme(Theme::Dark),
            "tema-claro" => PanelOption::Theme(Theme::Light),
            "alto-contraste" => PanelOption::ToggleHighContrast,
            "fonte-aumentar" => PanelOption::Font(FontStep::Increase),
            "fonte-diminuir" => PanelOption::Font(FontStep::Decrease),
            "fonte-resetar" => PanelOption::Font(FontStep::Reset),
            "daltonismo-protanopia" => PanelOption::ColorBlind(ColorBlindFilter::Protanopia),
            "daltonismo-deuteranopia" => PanelOption::ColorBlind(ColorBlindFilter::Deuteranopia),
            "daltonismo-tritanopia" => PanelOption::ColorBlind(ColorBlindFilter::Tritanopia),
            "daltonismo-desativar" => PanelOption::ColorBlind(ColorBlindFilter::None),
            "resetar-tudo" => PanelOption::ResetAll,
            other => return Err(UnknownOption(other.to_string())),
        };
        Ok(option)
    }
}

/// What the page applies for the current preferences
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub preferences: PreferenceBag,
    pub theme: Theme,
    pub explicit_theme: bool,
    /// `data-theme` attribute of the root element
    pub data_theme: Option<&'static str>,
    pub body_classes: Vec<&'static str>,
    pub font_description: String,
}

/// Accessibility panel state, persisted after every change
pub struct AccessibilityPanel {
    store: PreferenceStore,
    current: PreferenceBag,
    system: Theme,
}

impl AccessibilityPanel {
    /// Load saved preferences, resolving an unset theme to `system`
    pub fn open(store: PreferenceStore, system: Theme) -> Self {
        let current = store.load(system);
        info!(
            "Accessibility preferences loaded (theme={:?}, scale={})",
            current.theme, current.font_scale
        );

        Self {
            store,
            current,
            system,
        }
    }

    pub fn preferences(&self) -> &PreferenceBag {
        &self.current
    }

    /// Effective theme
    pub fn theme(&self) -> Theme {
        self.current.theme.unwrap_or(self.system)
    }

    /// Apply one option and persist the whole bag, resolved theme included
    ///
    /// Once anything is saved the stored theme counts as explicit. The
    /// in-memory preferences only change when the save succeeded.
    pub fn apply(&mut self, option: PanelOption) -> Result<&PreferenceBag> {
        info!("Accessibility option: {:?}", option);

        let mut next = self.current.clone();
        match option {
            PanelOption::Theme(theme) => next.theme = Some(theme),
            PanelOption::ToggleHighContrast => next.high_contrast = !next.high_contrast,
            PanelOption::Font(step) => {
                next.step_font(step);
                info!("Font scale adjusted: {}", next.font_scale);
            }
            PanelOption::ColorBlind(filter) => next.color_blind_filter = filter,
            PanelOption::ResetAll => {
                next = PreferenceBag {
                    theme: Some(self.system),
                    ..PreferenceBag::default()
                };
            }
        }

        self.store.save(&next)?;
        self.current = next;

        Ok(&self.current)
    }

    /// OS color scheme changed
    ///
    /// Returns whether the effective theme followed it; an explicit saved theme wins.
    pub fn on_system_theme_change(&mut self, system: Theme) -> bool {
        self.system = system;

        if self.store.has_explicit_theme() {
            return false;
        }

        self.current.theme = Some(system);
        info!("Theme follows system color scheme: {:?}", system);
        true
    }

    pub fn data_theme(&self) -> Option<&'static str> {
        match self.theme() {
            Theme::Light => Some("light"),
            Theme::Dark => None,
        }
    }

    pub fn body_classes(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if self.current.high_contrast {
            classes.push("alto-contraste");
        }
        if let Some(filter) = self.current.color_blind_filter.css_class() {
            classes.push(filter);
        }
        classes
    }

    pub fn font_description(&self) -> String {
        font_description(self.current.font_scale)
    }

    pub fn view(&self) -> PanelView {
        PanelView {
            preferences: self.current.clone(),
            theme: self.theme(),
            explicit_theme: self.store.has_explicit_theme(),
            data_theme: self.data_theme(),
            body_classes: self.body_classes(),
            font_description: self.font_description(),
        }
    }
}

fn font_description(scale: f64) -> String {
    let percent = ((scale - DEFAULT_FONT_SCALE).abs() * 100.0).round() as u32;

    if percent == 0 {
        "Tamanho: Normal".to_string()
    } else if scale > DEFAULT_FONT_SCALE {
        format!("Tamanho: +{}%", percent)
    } else {
        format!("Tamanho: -{}%", percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_description() {
        assert_eq!(font_description(1.0), "Tamanho: Normal");
        assert_eq!(font_description(1.2), "Tamanho: +20%");
        assert_eq!(font_description(0.8), "Tamanho: -20%");
        assert_eq!(font_description(1.5), "Tamanho: +50%");
    }

    #[test]
    fn test_parse_panel_options() {
        assert_eq!(
            "tema-claro".parse::<PanelOption>().unwrap(),
            PanelOption::Theme(Theme::Light)
        );
        assert_eq!(
            "daltonismo-desativar".parse::<PanelOption>().unwrap(),
            PanelOption::ColorBlind(ColorBlindFilter::None)
        );
        assert_eq!(
            "fonte-diminuir".parse::<PanelOption>().unwrap(),
            PanelOption::Font(FontStep::Decrease)
        );

        let err = "tema-roxo".parse::<PanelOption>().unwrap_err();
        assert_eq!(err, UnknownOption("tema-roxo".to_string()));
    }
}
