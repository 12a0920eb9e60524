//! Accessibility preferences
//!
//! - `PreferenceBag`: the persisted JSON object (`tema`, `contraste`, `scaleFactor`, `filtroDaltonismo`)
//! - `PreferenceStore`: load/save against a key-value storage, resolving unset themes
//! - `AccessibilityPanel`: panel options, OS color-scheme changes and what the page applies

mod bag;
mod panel;
mod store;

pub use bag::{
    ColorBlindFilter, FontStep, PreferenceBag, Theme, DEFAULT_FONT_SCALE, MAX_FONT_SCALE,
    MIN_FONT_SCALE,
};
pub use panel::{AccessibilityPanel, PanelOption, PanelView, UnknownOption};
pub use store::{FileStorage, KeyValueStorage, MemoryStorage, PreferenceStore, STORAGE_KEY};
