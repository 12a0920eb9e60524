//! Voice page recording control
//!
//! This module provides the `RecordingController` that owns whether the
//! microphone is "on" from the page's point of view:
//! - serializes start/stop requests against the speech service
//! - discards responses to superseded requests
//! - relays speech status/error events to the `StatusPresenter`
//! - auto-reverts error display back to idle

mod controller;
mod presenter;
mod state;
mod timer;

pub use controller::RecordingController;
pub use presenter::{StatusLine, StatusPresenter, StatusTone, ViewState};
pub use state::{ControllerError, RecordingState};
pub use timer::RevertTimer;
