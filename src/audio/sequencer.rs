//! Lookahead step sequencer
//!
//! A 16-step loop whose tempo follows the truck's speed. Each call to
//! [`Sequencer::schedule`] returns the steps that start within the lookahead
//! window of the audio clock; the backend queues them ahead of time.

use super::synth::{FilterKind, FilterSpec, Patch, Source, Sweep, Waveform};
use crate::progress;
use crate::tuning::Tuning;

/// Steps per loop (one bar of sixteenth notes)
pub const STEPS: u32 = 16;
/// Seconds of audio scheduled ahead of the clock
pub const LOOKAHEAD: f64 = 0.1;
/// Music bus level at full music volume
pub const MASTER_GAIN: f32 = 0.3;

pub const BASE_BPM: f32 = 120.0;
/// Extra BPM at top speed
pub const BPM_RANGE: f32 = 50.0;

/// Bass line, one note per eighth
pub const BASS_NOTES: [f32; 8] = [98.0, 98.0, 116.5, 98.0, 130.8, 98.0, 116.5, 146.8];
pub const ARP_NOTES: [f32; 4] = [392.0, 466.1, 523.2, 587.3];

/// Tempo in BPM for the current speed
pub fn tempo_for_speed(speed: f32, tuning: &Tuning) -> f32 {
    BASE_BPM + BPM_RANGE * progress(speed, tuning.initial_speed, tuning.max_speed)
}

/// Length of one sixteenth step in seconds
pub fn step_duration(bpm: f32) -> f64 {
    60.0 / f64::from(bpm) / 4.0
}

/// Instrument triggered on a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Voice {
    Kick,
    HiHat,
    Bass(f32),
    Arp(f32),
}

impl Voice {
    /// Patch for this voice on a bus with the given master gain
    pub fn patch(self, master: f32) -> Patch {
        match self {
            Voice::Kick => Patch {
                source: Source::Oscillator(Waveform::Sine),
                pitch: Sweep::exponential(150.0, 0.01, 0.5),
                gain: Sweep::exponential(master, 0.01, 0.5),
                filter: None,
                duration: 0.5,
            },
            Voice::HiHat => Patch {
                source: Source::Noise,
                pitch: Sweep::hold(0.0),
                gain: Sweep::exponential(0.4 * master, 0.01, 0.05),
                filter: Some(FilterSpec {
                    kind: FilterKind::HighPass,
                    cutoff: Sweep::hold(8000.0),
                }),
                duration: 0.05,
            },
            Voice::Bass(freq) => Patch {
                source: Source::Oscillator(Waveform::Sawtooth),
                pitch: Sweep::hold(freq),
                gain: Sweep::linear(0.4 * master, 0.0, 0.2),
                filter: Some(FilterSpec {
                    kind: FilterKind::LowPass,
                    cutoff: Sweep::exponential(600.0, 100.0, 0.15),
                }),
                duration: 0.2,
            },
            Voice::Arp(freq) => Patch {
                source: Source::Oscillator(Waveform::Square),
                pitch: Sweep::hold(freq),
                gain: Sweep::exponential(0.08 * master, 0.01, 0.1),
                filter: None,
                duration: 0.1,
            },
        }
    }
}

/// Voices that fire on `step` (0..16)
pub fn step_voices(step: u32) -> Vec<Voice> {
    let mut voices = Vec::with_capacity(4);
    if step % 4 == 0 {
        voices.push(Voice::Kick);
    }
    if step % 4 == 2 {
        voices.push(Voice::HiHat);
    }
    if step % 2 == 0 {
        voices.push(Voice::Bass(BASS_NOTES[(step / 2) as usize % BASS_NOTES.len()]));
    }
    if step % 3 == 0 && step != 0 {
        voices.push(Voice::Arp(ARP_NOTES[(step / 3) as usize % ARP_NOTES.len()]));
    }
    voices
}

/// Music bus gain for a music volume, or `None` when effectively muted
pub fn master_gain(music_volume: f32) -> Option<f32> {
    (music_volume > super::SILENCE).then_some(MASTER_GAIN * music_volume)
}

/// A step due to start at `time` on the audio clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledStep {
    pub step: u32,
    pub time: f64,
}

/// Sequencer cursor: next step index and its start time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequencer {
    next_note_time: f64,
    step: u32,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart from step 0 (new run)
    pub fn reset(&mut self) {
        self.next_note_time = 0.0;
        self.step = 0;
    }

    /// Collect every step starting before `now + LOOKAHEAD`.
    ///
    /// A cursor that fell behind the clock (tab in background, audio resumed
    /// late) is moved just ahead of it instead of replaying a burst of steps.
    pub fn schedule(&mut self, now: f64, speed: f32, tuning: &Tuning) -> Vec<ScheduledStep> {
        let step_len = step_duration(tempo_for_speed(speed, tuning));

        if self.next_note_time < now - LOOKAHEAD {
            self.next_note_time = now + LOOKAHEAD;
        }

        let mut due = Vec::new();
        while self.next_note_time < now + LOOKAHEAD {
            due.push(ScheduledStep {
                step: self.step,
                time: self.next_note_time,
            });
            self.next_note_time += step_len;
            self.step = (self.step + 1) % STEPS;
        }
        due
    }
}
