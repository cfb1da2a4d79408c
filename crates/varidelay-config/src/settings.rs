//! The settings file.
//!
//! Every section and key is optional; missing values take the engine
//! defaults. Unknown keys are rejected so a typo does not silently fall back
//! to a default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use varidelay_core::{
    CcMap, DEFAULT_BLOCK_SIZE, DEFAULT_DELAY_CC, DEFAULT_FEEDBACK_CC, DEFAULT_FILTER_CC,
    DEFAULT_GLIDE_SECONDS, DEFAULT_INPUT_CHANNELS, DEFAULT_OUTPUT_CHANNELS,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_SAMPLE_RATE, DEFAULT_STAGES, ParamSnapshot,
    SessionDescriptor,
};

use crate::error::ConfigError;
use crate::paths;

/// Log levels accepted by `[log] level`.
pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Highest controller number that can drive a parameter.
pub const MAX_ASSIGNABLE_CC: u8 = 119;

/// Audio stream settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioSettings {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Frames per processing block.
    pub block_size: usize,
    /// Capture channels; 0 runs output only.
    pub input_channels: usize,
    /// Playback channels.
    pub output_channels: usize,
    /// Capture device name; system default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_device: Option<String>,
    /// Playback device name; system default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            input_channels: DEFAULT_INPUT_CHANNELS,
            output_channels: DEFAULT_OUTPUT_CHANNELS,
            input_device: None,
            output_device: None,
        }
    }
}

/// MIDI control settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MidiSettings {
    /// Open a MIDI input at all.
    pub enabled: bool,
    /// Input port name; first port when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_port: Option<String>,
    /// Control queue capacity in messages.
    pub queue_size: usize,
    /// Controller number for the delay target.
    pub delay_cc: u8,
    /// Controller number for feedback.
    pub feedback_cc: u8,
    /// Controller number for the filter coefficient.
    pub filter_cc: u8,
    /// Only listen on this 0-based channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            input_port: None,
            queue_size: DEFAULT_QUEUE_CAPACITY,
            delay_cc: DEFAULT_DELAY_CC,
            feedback_cc: DEFAULT_FEEDBACK_CC,
            filter_cc: DEFAULT_FILTER_CC,
            channel: None,
        }
    }
}

/// Delay engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelaySettings {
    /// Longest reachable delay in seconds; sets the line capacity.
    pub max_delay_seconds: f32,
    /// Number of one-pole stages in the filter cascade.
    pub filter_stages: usize,
    /// Time constant of the delay glide in seconds.
    pub glide_seconds: f32,
    /// Normalized startup delay; 100 ms worth when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay: Option<f32>,
    /// Startup feedback.
    pub initial_feedback: f32,
    /// Startup filter coefficient.
    pub initial_filter: f32,
}

impl Default for DelaySettings {
    fn default() -> Self {
        let defaults = ParamSnapshot::default();
        Self {
            max_delay_seconds: varidelay_core::params::DEFAULT_MAX_DELAY_SECONDS,
            filter_stages: DEFAULT_STAGES,
            glide_seconds: DEFAULT_GLIDE_SECONDS,
            initial_delay: None,
            initial_feedback: defaults.feedback,
            initial_filter: defaults.coefficient,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Default level when neither `RUST_LOG` nor a command-line flag is given.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete contents of a settings file.
///
/// # Example
///
/// ```rust
/// use varidelay_config::Settings;
///
/// let settings = Settings::from_toml("[delay]\nmax_delay_seconds = 1.0\n").unwrap();
/// let descriptor = settings.to_descriptor().unwrap();
/// assert_eq!(descriptor.capacity(), 44100);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// `[audio]`
    pub audio: AudioSettings,
    /// `[midi]`
    pub midi: MidiSettings,
    /// `[delay]`
    pub delay: DelaySettings,
    /// `[log]`
    pub log: LogSettings,
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Load `path` if given; otherwise the default file if it exists, else
    /// the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = paths::default_config_path();
        if default_path.is_file() {
            Self::load(default_path)
        } else {
            tracing::debug!(path = %default_path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check every value, including those only the engine validates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.descriptor().validate()?;

        let midi = &self.midi;
        if midi.queue_size == 0 {
            return Err(ConfigError::invalid("midi.queue_size", "must be at least 1"));
        }
        for (key, cc) in [
            ("midi.delay_cc", midi.delay_cc),
            ("midi.feedback_cc", midi.feedback_cc),
            ("midi.filter_cc", midi.filter_cc),
        ] {
            // 120-127 are channel mode messages, never plain controllers.
            if cc > MAX_ASSIGNABLE_CC {
                return Err(ConfigError::invalid(
                    key,
                    format!("must be 0-{MAX_ASSIGNABLE_CC}, got {cc}"),
                ));
            }
        }
        if midi.delay_cc == midi.feedback_cc
            || midi.delay_cc == midi.filter_cc
            || midi.feedback_cc == midi.filter_cc
        {
            return Err(ConfigError::invalid(
                "midi",
                "delay_cc, feedback_cc and filter_cc must differ",
            ));
        }
        if let Some(channel) = midi.channel
            && channel > 15
        {
            return Err(ConfigError::invalid(
                "midi.channel",
                format!("must be 0-15, got {channel}"),
            ));
        }

        let delay = &self.delay;
        if let Some(v) = delay.initial_delay {
            check_unit("delay.initial_delay", v)?;
        }
        check_unit("delay.initial_feedback", delay.initial_feedback)?;
        check_unit("delay.initial_filter", delay.initial_filter)?;

        let level = self.log.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid(
                "log.level",
                format!("expected one of {}, got '{}'", LOG_LEVELS.join(", "), self.log.level),
            ));
        }
        Ok(())
    }

    /// Validated session descriptor.
    pub fn to_descriptor(&self) -> Result<SessionDescriptor, ConfigError> {
        let descriptor = self.descriptor();
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Startup parameter values.
    pub fn initial_params(&self) -> ParamSnapshot {
        let defaults = ParamSnapshot::defaults_for(self.delay.max_delay_seconds);
        ParamSnapshot {
            delay: self.delay.initial_delay.unwrap_or(defaults.delay),
            feedback: self.delay.initial_feedback,
            coefficient: self.delay.initial_filter,
        }
    }

    /// Controller assignment for MIDI input.
    pub fn cc_map(&self) -> CcMap {
        CcMap {
            delay: self.midi.delay_cc,
            feedback: self.midi.feedback_cc,
            filter: self.midi.filter_cc,
            channel: self.midi.channel,
        }
    }

    fn descriptor(&self) -> SessionDescriptor {
        SessionDescriptor {
            sample_rate: self.audio.sample_rate,
            block_size: self.audio.block_size,
            input_channels: self.audio.input_channels,
            output_channels: self.audio.output_channels,
            max_delay_seconds: self.delay.max_delay_seconds,
            filter_stages: self.delay.filter_stages,
            glide_seconds: self.delay.glide_seconds,
        }
    }
}

fn check_unit(key: &'static str, v: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, format!("must be within [0, 1], got {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.to_descriptor().unwrap(), SessionDescriptor::default());
        assert_eq!(settings.initial_params(), ParamSnapshot::default());
        assert_eq!(settings.cc_map(), CcMap::default());
        assert!(settings.midi.enabled);
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let settings = Settings::from_toml(
            r#"
[audio]
sample_rate = 48000
output_channels = 1

[midi]
channel = 9
"#,
        )
        .unwrap();
        assert_eq!(settings.audio.sample_rate, 48000.0);
        assert_eq!(settings.audio.output_channels, 1);
        assert_eq!(settings.audio.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(settings.cc_map().channel, Some(9));
        assert_eq!(settings.midi.delay_cc, DEFAULT_DELAY_CC);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = Settings::from_toml("[audio]\nsample_rat = 48000\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
        let err = Settings::from_toml("[reverb]\nsize = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn initial_delay_defaults_to_100ms_of_line() {
        let settings = Settings::from_toml("[delay]\nmax_delay_seconds = 0.5\n").unwrap();
        assert!((settings.initial_params().delay - 0.2).abs() < 1e-6);

        let settings = Settings::from_toml("[delay]\ninitial_delay = 0.75\n").unwrap();
        assert_eq!(settings.initial_params().delay, 0.75);
    }

    #[test]
    fn engine_constraints_surface_as_session_errors() {
        let err = Settings::from_toml("[audio]\nblock_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Session(varidelay_core::SessionError::ZeroBlockSize)));

        let err = Settings::from_toml("[delay]\nfilter_stages = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Session(varidelay_core::SessionError::NoFilterStages)));
    }

    #[test]
    fn midi_values_checked() {
        let cases = [
            ("[midi]\ndelay_cc = 128\n", "midi.delay_cc"),
            ("[midi]\nfilter_cc = 120\n", "midi.filter_cc"),
            ("[midi]\nqueue_size = 0\n", "midi.queue_size"),
            ("[midi]\nchannel = 16\n", "midi.channel"),
            ("[midi]\nfeedback_cc = 48\n", "midi"),
        ];
        for (text, expected) in cases {
            match Settings::from_toml(text) {
                Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, expected, "{text}"),
                other => panic!("expected invalid {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn highest_plain_controller_is_assignable() {
        let settings = Settings::from_toml("[midi]\ndelay_cc = 119\n").unwrap();
        let msg = settings.cc_map().map_bytes(&[0xB0, 119, 127]).unwrap();
        assert_eq!(msg.value, 1.0);

        let err = Settings::from_toml("[midi]\ndelay_cc = 120\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid setting 'midi.delay_cc': must be 0-119, got 120"
        );
    }

    #[test]
    fn initial_values_must_be_normalized() {
        let err = Settings::from_toml("[delay]\ninitial_feedback = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("delay.initial_feedback"));
        let err = Settings::from_toml("[delay]\ninitial_filter = -0.1\n").unwrap_err();
        assert!(err.to_string().contains("delay.initial_filter"));
    }

    #[test]
    fn log_level_checked_case_insensitively() {
        assert!(Settings::from_toml("[log]\nlevel = \"DEBUG\"\n").is_ok());
        let err = Settings::from_toml("[log]\nlevel = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("log.level"));
    }

    #[test]
    fn to_toml_round_trips() {
        let mut settings = Settings::default();
        settings.audio.output_device = Some("USB Audio".into());
        settings.delay.initial_delay = Some(0.25);
        let text = settings.to_toml().unwrap();
        assert!(text.contains("[audio]"));
        assert!(text.contains("output_device = \"USB Audio\""));
        assert!(!text.contains("input_device"));
        assert_eq!(Settings::from_toml(&text).unwrap(), settings);
    }
}
