//! MIDI message decoding and controller mapping.
//!
//! [`MidiMessage::parse`] turns one complete message, as delivered by a MIDI
//! driver, into a typed value. [`CcMap`] turns Control Change messages into
//! [`ControlMessage`]s for the delay engine.
//!
//! # Default controller assignment
//!
//! | CC | Parameter |
//! |----|-----------|
//! | 48 | delay |
//! | 49 | feedback |
//! | 50 | filter |
//!
//! Controller values map to `(value + 1) / 128`, so 127 reaches exactly 1.0
//! and 0 gives 1/128.

use core::fmt;

use crate::control::{ControlMessage, ControlTarget};

/// Controller number for the delay target.
pub const DEFAULT_DELAY_CC: u8 = 48;
/// Controller number for feedback.
pub const DEFAULT_FEEDBACK_CC: u8 = 49;
/// Controller number for the filter coefficient.
pub const DEFAULT_FILTER_CC: u8 = 50;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Channel mode messages, sent as controllers 120 to 127.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// CC 120.
    AllSoundOff,
    /// CC 121.
    ResetAllControllers,
    /// CC 122, value 0 is off.
    LocalControl(bool),
    /// CC 123.
    AllNotesOff,
    /// CC 124.
    OmniOff,
    /// CC 125.
    OmniOn,
    /// CC 126; `0` means all received channels.
    MonoOn(u8),
    /// CC 127.
    PolyOn,
}

impl ChannelMode {
    fn from_controller(controller: u8, value: u8) -> Option<Self> {
        Some(match controller {
            120 => Self::AllSoundOff,
            121 => Self::ResetAllControllers,
            122 => Self::LocalControl(value != 0),
            123 => Self::AllNotesOff,
            124 => Self::OmniOff,
            125 => Self::OmniOn,
            126 => Self::MonoOn(value),
            127 => Self::PolyOn,
            _ => return None,
        })
    }
}

/// A decoded MIDI message. Channels are 0-based, as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note released. Also produced by a note-on with velocity 0.
    NoteOff {
        /// Channel 0..=15.
        channel: u8,
        /// Note number.
        note: u8,
        /// Release velocity.
        velocity: u8,
    },
    /// Note pressed.
    NoteOn {
        /// Channel 0..=15.
        channel: u8,
        /// Note number.
        note: u8,
        /// Velocity, never 0.
        velocity: u8,
    },
    /// Polyphonic key pressure.
    PolyPressure {
        /// Channel 0..=15.
        channel: u8,
        /// Note number.
        note: u8,
        /// Pressure.
        pressure: u8,
    },
    /// Controller 0..=119.
    ControlChange {
        /// Channel 0..=15.
        channel: u8,
        /// Controller number.
        controller: u8,
        /// Controller value.
        value: u8,
    },
    /// Controller 120..=127.
    ChannelMode {
        /// Channel 0..=15.
        channel: u8,
        /// Decoded mode message.
        mode: ChannelMode,
    },
    /// Program change; `program` is 0-based.
    ProgramChange {
        /// Channel 0..=15.
        channel: u8,
        /// Program number.
        program: u8,
    },
    /// Channel (aftertouch) pressure.
    ChannelPressure {
        /// Channel 0..=15.
        channel: u8,
        /// Pressure.
        pressure: u8,
    },
    /// 14-bit pitch bend, 8192 is centre.
    PitchBend {
        /// Channel 0..=15.
        channel: u8,
        /// Bend amount.
        value: u16,
    },
    /// System exclusive dump; only the length is kept.
    SysEx {
        /// Total bytes including the `F0`/`F7` framing.
        len: usize,
    },
    /// MIDI time code quarter frame.
    QuarterFrame {
        /// Piece number 0..=7.
        piece: u8,
        /// Piece value 0..=15.
        value: u8,
    },
    /// Song position pointer in MIDI beats.
    SongPosition(u16),
    /// Song select.
    SongSelect(u8),
    /// Tune request.
    TuneRequest,
    /// Timing clock.
    Clock,
    /// Start.
    Start,
    /// Continue.
    Continue,
    /// Stop.
    Stop,
    /// Active sensing.
    ActiveSensing,
    /// System reset.
    SystemReset,
}

impl MidiMessage {
    /// Decode a complete message starting with a status byte.
    ///
    /// Returns `None` for empty or truncated input, a leading data byte
    /// (running status is not supported), and undefined status bytes.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 {
            return None;
        }
        let d1 = || data.first().map(|b| b & 0x7F);
        let d2 = || data.get(1).map(|b| b & 0x7F);
        let channel = status & 0x0F;

        let msg = match status & 0xF0 {
            0x80 => Self::NoteOff {
                channel,
                note: d1()?,
                velocity: d2()?,
            },
            0x90 => {
                let (note, velocity) = (d1()?, d2()?);
                if velocity == 0 {
                    Self::NoteOff {
                        channel,
                        note,
                        velocity,
                    }
                } else {
                    Self::NoteOn {
                        channel,
                        note,
                        velocity,
                    }
                }
            }
            0xA0 => Self::PolyPressure {
                channel,
                note: d1()?,
                pressure: d2()?,
            },
            0xB0 => {
                let (controller, value) = (d1()?, d2()?);
                match ChannelMode::from_controller(controller, value) {
                    Some(mode) => Self::ChannelMode { channel, mode },
                    None => Self::ControlChange {
                        channel,
                        controller,
                        value,
                    },
                }
            }
            0xC0 => Self::ProgramChange {
                channel,
                program: d1()?,
            },
            0xD0 => Self::ChannelPressure {
                channel,
                pressure: d1()?,
            },
            0xE0 => Self::PitchBend {
                channel,
                value: u16::from(d1()?) | (u16::from(d2()?) << 7),
            },
            _ => match status {
                0xF0 => Self::SysEx { len: bytes.len() },
                0xF1 => {
                    let v = d1()?;
                    Self::QuarterFrame {
                        piece: (v & 0x70) >> 4,
                        value: v & 0x0F,
                    }
                }
                0xF2 => Self::SongPosition(u16::from(d1()?) | (u16::from(d2()?) << 7)),
                0xF3 => Self::SongSelect(d1()?),
                0xF6 => Self::TuneRequest,
                0xF8 => Self::Clock,
                0xFA => Self::Start,
                0xFB => Self::Continue,
                0xFC => Self::Stop,
                0xFE => Self::ActiveSensing,
                0xFF => Self::SystemReset,
                _ => return None,
            },
        };
        Some(msg)
    }

    /// Channel of a channel voice or mode message.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Self::NoteOff { channel, .. }
            | Self::NoteOn { channel, .. }
            | Self::PolyPressure { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::ChannelMode { channel, .. }
            | Self::ProgramChange { channel, .. }
            | Self::ChannelPressure { channel, .. }
            | Self::PitchBend { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

/// Scientific pitch name of a MIDI note, e.g. 60 is `C4`.
pub fn note_name(note: u8) -> String {
    format!(
        "{}{}",
        NOTE_NAMES[usize::from(note % 12)],
        i32::from(note / 12) - 1
    )
}

/// One line per message, channels shown 1-based.
impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => write!(
                f,
                "note on    ch {:>2}  key {:>3} {:<4} vel {}",
                channel + 1,
                note,
                note_name(note),
                velocity
            ),
            Self::NoteOff {
                channel,
                note,
                velocity,
            } => write!(
                f,
                "note off   ch {:>2}  key {:>3} {:<4} vel {}",
                channel + 1,
                note,
                note_name(note),
                velocity
            ),
            Self::PolyPressure {
                channel,
                note,
                pressure,
            } => write!(
                f,
                "poly touch ch {:>2}  key {:>3} {:<4} val {}",
                channel + 1,
                note,
                note_name(note),
                pressure
            ),
            Self::ControlChange {
                channel,
                controller,
                value,
            } => write!(
                f,
                "control    ch {:>2}  cc {:>3} val {}",
                channel + 1,
                controller,
                value
            ),
            Self::ChannelMode { channel, mode } => {
                write!(f, "mode       ch {:>2}  ", channel + 1)?;
                match mode {
                    ChannelMode::AllSoundOff => f.write_str("all sound off"),
                    ChannelMode::ResetAllControllers => f.write_str("reset all controllers"),
                    ChannelMode::LocalControl(on) => {
                        write!(f, "local control {}", if on { "on" } else { "off" })
                    }
                    ChannelMode::AllNotesOff => f.write_str("all notes off"),
                    ChannelMode::OmniOff => f.write_str("omni off"),
                    ChannelMode::OmniOn => f.write_str("omni on"),
                    ChannelMode::MonoOn(0) => f.write_str("mono on, all received channels"),
                    ChannelMode::MonoOn(n) => write!(f, "mono on, {n} received channels"),
                    ChannelMode::PolyOn => f.write_str("poly on"),
                }
            }
            Self::ProgramChange { channel, program } => write!(
                f,
                "program    ch {:>2}  prog {}",
                channel + 1,
                u16::from(program) + 1
            ),
            Self::ChannelPressure { channel, pressure } => {
                write!(f, "pressure   ch {:>2}  val {}", channel + 1, pressure)
            }
            Self::PitchBend { channel, value } => {
                write!(f, "pitch bend ch {:>2}  val {}", channel + 1, value)
            }
            Self::SysEx { len } => write!(f, "system exclusive, {len} bytes"),
            Self::QuarterFrame { piece, value } => {
                write!(f, "time code quarter frame type {piece} value {value}")
            }
            Self::SongPosition(pos) => write!(f, "song position {pos}"),
            Self::SongSelect(song) => write!(f, "song select {song}"),
            Self::TuneRequest => f.write_str("tune request"),
            Self::Clock => f.write_str("clock"),
            Self::Start => f.write_str("start"),
            Self::Continue => f.write_str("continue"),
            Self::Stop => f.write_str("stop"),
            Self::ActiveSensing => f.write_str("active sensing"),
            Self::SystemReset => f.write_str("system reset"),
        }
    }
}

/// Normalize a 7-bit controller value: `(value + 1) / 128`.
#[inline]
pub fn cc_to_unit(value: u8) -> f32 {
    (f32::from(value & 0x7F) + 1.0) / 128.0
}

/// Assignment of controller numbers to engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcMap {
    /// Controller driving the delay target.
    pub delay: u8,
    /// Controller driving feedback.
    pub feedback: u8,
    /// Controller driving the filter coefficient.
    pub filter: u8,
    /// Only accept this 0-based channel; `None` accepts all.
    pub channel: Option<u8>,
}

impl Default for CcMap {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY_CC,
            feedback: DEFAULT_FEEDBACK_CC,
            filter: DEFAULT_FILTER_CC,
            channel: None,
        }
    }
}

impl CcMap {
    /// Parameter assigned to `controller`, if any.
    pub fn target(&self, controller: u8) -> Option<ControlTarget> {
        if controller == self.delay {
            Some(ControlTarget::Delay)
        } else if controller == self.feedback {
            Some(ControlTarget::Feedback)
        } else if controller == self.filter {
            Some(ControlTarget::Filter)
        } else {
            None
        }
    }

    /// Map a decoded message; everything but an assigned Control Change on
    /// an accepted channel yields `None`.
    pub fn map(&self, msg: &MidiMessage) -> Option<ControlMessage> {
        let MidiMessage::ControlChange {
            channel,
            controller,
            value,
        } = *msg
        else {
            return None;
        };
        if self.channel.is_some_and(|c| c != channel) {
            return None;
        }
        let target = self.target(controller)?;
        Some(ControlMessage::new(target, cc_to_unit(value)))
    }

    /// Decode raw bytes and map them in one step.
    pub fn map_bytes(&self, bytes: &[u8]) -> Option<ControlMessage> {
        self.map(&MidiMessage::parse(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_with_zero_velocity_is_note_off() {
        assert_eq!(
            MidiMessage::parse(&[0x93, 60, 0]),
            Some(MidiMessage::NoteOff {
                channel: 3,
                note: 60,
                velocity: 0,
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 100]),
            Some(MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100,
            })
        );
    }

    #[test]
    fn controllers_above_119_are_channel_mode() {
        assert_eq!(
            MidiMessage::parse(&[0xB1, 119, 5]),
            Some(MidiMessage::ControlChange {
                channel: 1,
                controller: 119,
                value: 5,
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0xB1, 122, 0]),
            Some(MidiMessage::ChannelMode {
                channel: 1,
                mode: ChannelMode::LocalControl(false),
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0xB0, 126, 4]),
            Some(MidiMessage::ChannelMode {
                channel: 0,
                mode: ChannelMode::MonoOn(4),
            })
        );
    }

    #[test]
    fn fourteen_bit_values() {
        assert_eq!(
            MidiMessage::parse(&[0xE2, 0x00, 0x40]),
            Some(MidiMessage::PitchBend {
                channel: 2,
                value: 8192,
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0xF2, 0x7F, 0x7F]),
            Some(MidiMessage::SongPosition(16383))
        );
    }

    #[test]
    fn quarter_frame_splits_nibbles() {
        assert_eq!(
            MidiMessage::parse(&[0xF1, 0x53]),
            Some(MidiMessage::QuarterFrame { piece: 5, value: 3 })
        );
    }

    #[test]
    fn system_messages() {
        assert_eq!(
            MidiMessage::parse(&[0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7]),
            Some(MidiMessage::SysEx { len: 6 })
        );
        assert_eq!(MidiMessage::parse(&[0xF8]), Some(MidiMessage::Clock));
        assert_eq!(MidiMessage::parse(&[0xFA]), Some(MidiMessage::Start));
        assert_eq!(MidiMessage::parse(&[0xFF]), Some(MidiMessage::SystemReset));
        assert_eq!(MidiMessage::parse(&[0xF6]), Some(MidiMessage::TuneRequest));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0x40, 0x40]), None);
        assert_eq!(MidiMessage::parse(&[0x90, 60]), None);
        assert_eq!(MidiMessage::parse(&[0xF4]), None);
        assert_eq!(MidiMessage::parse(&[0xFD]), None);
    }

    #[test]
    fn display_lines() {
        let on = MidiMessage::parse(&[0x90, 61, 90]).unwrap();
        assert_eq!(on.to_string(), "note on    ch  1  key  61 C#4  vel 90");
        let prog = MidiMessage::parse(&[0xC9, 0]).unwrap();
        assert_eq!(prog.to_string(), "program    ch 10  prog 1");
        let mono = MidiMessage::parse(&[0xB0, 126, 0]).unwrap();
        assert!(mono.to_string().ends_with("mono on, all received channels"));
    }

    #[test]
    fn note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(127), "G9");
    }

    #[test]
    fn cc_scaling() {
        assert_eq!(cc_to_unit(127), 1.0);
        assert_eq!(cc_to_unit(63), 0.5);
        assert_eq!(cc_to_unit(0), 1.0 / 128.0);
    }

    #[test]
    fn default_map_routes_48_to_50() {
        let map = CcMap::default();
        assert_eq!(
            map.map_bytes(&[0xB0, 48, 127]),
            Some(ControlMessage::new(ControlTarget::Delay, 1.0))
        );
        assert_eq!(
            map.map_bytes(&[0xB5, 49, 63]),
            Some(ControlMessage::new(ControlTarget::Feedback, 0.5))
        );
        assert_eq!(
            map.map_bytes(&[0xBF, 50, 31]).map(|m| m.target),
            Some(ControlTarget::Filter)
        );
        assert_eq!(map.map_bytes(&[0xB0, 7, 100]), None);
        assert_eq!(map.map_bytes(&[0x90, 48, 100]), None);
    }

    #[test]
    fn channel_filter() {
        let map = CcMap {
            channel: Some(2),
            ..CcMap::default()
        };
        assert!(map.map_bytes(&[0xB2, 48, 10]).is_some());
        assert!(map.map_bytes(&[0xB3, 48, 10]).is_none());
    }
}
