//! Audio cues
//!
//! Each [`Cue`] expands into a short sequence of oscillator tones. Sinks
//! are fire-and-forget: a sink that cannot play simply drops the cue.

use serde::Serialize;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Pure tone
    Sine,
    /// Hollow, buzzy tone
    Square,
    /// Harsh tone
    Sawtooth,
    /// Soft tone
    Triangle,
}

impl Waveform {
    /// Oscillator type name used by the Web Audio API
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Sawtooth => "sawtooth",
            Self::Triangle => "triangle",
        }
    }
}

/// One oscillator note
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    /// Pitch in Hz
    pub frequency: f32,
    /// Length in seconds
    pub duration: f32,
    /// Oscillator shape
    pub waveform: Waveform,
    /// Peak gain
    pub volume: f32,
    /// Delay from the start of the cue, in milliseconds
    pub offset_ms: u32,
}

impl Tone {
    const fn new(frequency: f32, duration: f32, waveform: Waveform, volume: f32, offset_ms: u32) -> Self {
        Self {
            frequency,
            duration,
            waveform,
            volume,
            offset_ms,
        }
    }
}

/// Named sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cue {
    /// Button press
    Click,
    /// Rising major arpeggio
    Correct,
    /// Low buzz
    Wrong,
    /// Countdown tick
    Tick,
    /// Countdown tick in the last seconds
    UrgentTick,
    /// Falling sawtooth phrase
    GameOver,
    /// Level complete fanfare
    Celebration,
    /// New badge jingle
    BadgeEarned,
}

impl Cue {
    /// Tones making up the cue, in playback order
    #[must_use]
    pub fn tones(&self) -> Vec<Tone> {
        use Waveform::{Sawtooth, Sine, Square};
        match self {
            Self::Click => vec![Tone::new(800.0, 0.05, Square, 0.1, 0)],
            Self::Correct => vec![
                Tone::new(523.0, 0.15, Sine, 0.3, 0),
                Tone::new(659.0, 0.15, Sine, 0.3, 100),
                Tone::new(784.0, 0.2, Sine, 0.3, 200),
            ],
            Self::Wrong => vec![Tone::new(300.0, 0.3, Sawtooth, 0.2, 0)],
            Self::Tick => vec![Tone::new(600.0, 0.03, Square, 0.05, 0)],
            Self::UrgentTick => vec![Tone::new(800.0, 0.05, Square, 0.15, 0)],
            Self::GameOver => vec![
                Tone::new(400.0, 0.2, Sawtooth, 0.2, 0),
                Tone::new(300.0, 0.2, Sawtooth, 0.2, 150),
                Tone::new(200.0, 0.4, Sawtooth, 0.2, 300),
            ],
            Self::Celebration => arpeggio(&[523.0, 659.0, 784.0, 1047.0, 784.0, 1047.0], 0.2, 0.3, 100),
            Self::BadgeEarned => arpeggio(&[880.0, 1109.0, 1319.0, 1760.0], 0.15, 0.25, 80),
        }
    }

    /// Milliseconds from the first tone starting to the last tone ending
    #[must_use]
    pub fn total_duration_ms(&self) -> u32 {
        self.tones()
            .iter()
            .map(|t| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let len = (t.duration * 1000.0).round() as u32;
                t.offset_ms + len
            })
            .max()
            .unwrap_or(0)
    }
}

fn arpeggio(notes: &[f32], duration: f32, volume: f32, step_ms: u32) -> Vec<Tone> {
    (0u32..)
        .zip(notes)
        .map(|(i, &freq)| Tone::new(freq, duration, Waveform::Sine, volume, i * step_ms))
        .collect()
}

/// Destination for audio cues
pub trait AudioSink {
    /// Plays a cue; never fails
    fn play(&mut self, cue: Cue);
}

/// Sink that discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: Cue) {}
}

/// Sink that remembers what was played
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    played: Vec<Cue>,
}

impl RecordingAudio {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues in the order they were played
    #[must_use]
    pub fn played(&self) -> &[Cue] {
        &self.played
    }

    /// Number of times `cue` was played
    #[must_use]
    pub fn count(&self, cue: Cue) -> usize {
        self.played.iter().filter(|&&c| c == cue).count()
    }

    /// Forgets recorded cues
    pub fn clear(&mut self) {
        self.played.clear();
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }
}

/// Sink wrapper that can be muted
#[derive(Debug, Clone)]
pub struct Mutable<A> {
    inner: A,
    enabled: bool,
}

impl<A: AudioSink> Mutable<A> {
    /// Wraps a sink
    pub const fn new(inner: A, enabled: bool) -> Self {
        Self { inner, enabled }
    }

    /// Turns sound on or off
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if cues reach the inner sink
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The wrapped sink
    pub const fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: AudioSink> AudioSink for Mutable<A> {
    fn play(&mut self, cue: Cue) {
        if self.enabled {
            self.inner.play(cue);
        }
    }
}
