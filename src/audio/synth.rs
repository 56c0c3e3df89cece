//! Patch descriptions for one-shot sounds
//!
//! A patch is a single source, optionally filtered, into a gain envelope.

use super::SoundEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Sound source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Oscillator(Waveform),
    /// Looped white-noise buffer
    Noise,
}

/// Automation curve between a sweep's endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Stay at the start value
    Hold,
    Linear,
    Exponential,
}

/// Parameter automation from `from` to `to` over `time` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub from: f32,
    pub to: f32,
    pub ramp: Ramp,
    pub time: f64,
}

impl Sweep {
    pub const fn hold(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            ramp: Ramp::Hold,
            time: 0.0,
        }
    }

    pub const fn linear(from: f32, to: f32, time: f64) -> Self {
        Self {
            from,
            to,
            ramp: Ramp::Linear,
            time,
        }
    }

    pub const fn exponential(from: f32, to: f32, time: f64) -> Self {
        Self {
            from,
            to,
            ramp: Ramp::Exponential,
            time,
        }
    }

    /// Value `t` seconds after the sweep starts
    pub fn value_at(&self, t: f64) -> f32 {
        if self.ramp == Ramp::Hold || self.time <= 0.0 {
            return self.from;
        }
        let k = (t / self.time).clamp(0.0, 1.0) as f32;
        match self.ramp {
            Ramp::Hold => self.from,
            Ramp::Linear => self.from + (self.to - self.from) * k,
            // Exponential ramps require both endpoints to share a sign
            Ramp::Exponential => self.from * (self.to / self.from).powf(k),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub cutoff: Sweep,
}

/// A complete one-shot voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub source: Source,
    /// Oscillator frequency (ignored for noise)
    pub pitch: Sweep,
    pub gain: Sweep,
    pub filter: Option<FilterSpec>,
    /// Seconds until the source is stopped
    pub duration: f64,
}

impl SoundEffect {
    /// Patch for this effect at the given effects volume
    pub fn patch(self, volume: f32) -> Patch {
        match self {
            // Bright rising chirp
            SoundEffect::Collect => Patch {
                source: Source::Oscillator(Waveform::Sine),
                pitch: Sweep::exponential(800.0, 1200.0, 0.1),
                gain: Sweep::exponential(0.1 * volume, 0.01, 0.1),
                filter: None,
                duration: 0.1,
            },
            // Low buzzing drop
            SoundEffect::Hit => Patch {
                source: Source::Oscillator(Waveform::Sawtooth),
                pitch: Sweep::exponential(150.0, 50.0, 0.2),
                gain: Sweep::exponential(0.2 * volume, 0.01, 0.2),
                filter: None,
                duration: 0.2,
            },
            SoundEffect::GameOver => Patch {
                source: Source::Oscillator(Waveform::Triangle),
                pitch: Sweep::linear(300.0, 100.0, 1.0),
                gain: Sweep::linear(0.3 * volume, 0.0, 1.0),
                filter: None,
                duration: 1.0,
            },
            SoundEffect::SpeedUp => Patch {
                source: Source::Oscillator(Waveform::Sine),
                pitch: Sweep::linear(440.0, 660.0, 0.4),
                gain: Sweep::linear(0.05 * volume, 0.0, 0.4),
                filter: None,
                duration: 0.4,
            },
        }
    }
}
