//! Settings file handling for the varidelay engine.
//!
//! A single TOML file configures the audio stream, MIDI control mapping,
//! delay engine and logging. [`Settings`] loads it, fills in defaults for
//! anything missing, and turns it into the values the engine is built from:
//!
//! - [`Settings::to_descriptor`] for the [`SessionDescriptor`](varidelay_core::SessionDescriptor)
//! - [`Settings::initial_params`] for the startup parameter values
//! - [`Settings::cc_map`] for the MIDI controller assignment
//!
//! # Example
//!
//! ```rust,no_run
//! use varidelay_config::{Settings, paths};
//! use varidelay_core::Session;
//!
//! let settings = Settings::load_or_default(None).unwrap();
//! let session = Session::with_params(
//!     settings.to_descriptor().unwrap(),
//!     settings.initial_params(),
//! )
//! .unwrap();
//!
//! settings.save(paths::default_config_path()).unwrap();
//! ```

mod error;
mod settings;

/// Platform-specific configuration paths.
pub mod paths;

pub use error::ConfigError;
pub use paths::{default_config_path, user_config_dir};
pub use settings::{
    AudioSettings, DelaySettings, LOG_LEVELS, LogSettings, MAX_ASSIGNABLE_CC, MidiSettings, Settings,
};
