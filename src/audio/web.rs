//! Web Audio backend
//!
//! Builds a short-lived node graph per patch. Every failure here is swallowed:
//! a sound that cannot be created is simply not heard.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use web_sys::{
    AudioBuffer, AudioContext, AudioNode, AudioParam, BiquadFilterType, OscillatorType,
};

use super::sequencer::{self, Sequencer, step_voices};
use super::synth::{FilterKind, Patch, Ramp, Source, Sweep, Waveform};
use super::{SILENCE, SoundEffect};
use crate::tuning::Tuning;

/// Seconds of white noise backing the hi-hat
const NOISE_SECONDS: f32 = 2.0;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    noise: Option<AudioBuffer>,
    sequencer: Sequencer,
    music_volume: f32,
    sfx_volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        let noise = ctx.as_ref().and_then(create_noise_buffer);
        Self {
            ctx,
            noise,
            sequencer: Sequencer::new(),
            music_volume: 0.5,
            sfx_volume: 0.5,
        }
    }

    pub fn is_available(&self) -> bool {
        self.ctx.is_some()
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Restart the music loop from its first step
    pub fn reset_music(&mut self) {
        self.sequencer.reset();
    }

    /// Play a sound effect immediately
    pub fn play(&self, effect: SoundEffect) {
        if self.sfx_volume <= SILENCE {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        self.start_patch(ctx, &effect.patch(self.sfx_volume), ctx.current_time());
    }

    /// Queue every music step inside the lookahead window. Call once per frame
    /// while a run is in progress.
    pub fn update_music(&mut self, speed: f32, tuning: &Tuning) {
        let Some(master) = sequencer::master_gain(self.music_volume) else {
            return;
        };
        let Some(ctx) = &self.ctx else { return };

        for scheduled in self.sequencer.schedule(ctx.current_time(), speed, tuning) {
            for voice in step_voices(scheduled.step) {
                self.start_patch(ctx, &voice.patch(master), scheduled.time);
            }
        }
    }

    // === Node graph ===

    fn start_patch(&self, ctx: &AudioContext, patch: &Patch, when: f64) {
        if self.try_start_patch(ctx, patch, when).is_none() {
            log::debug!("Dropped {:?} voice", patch.source);
        }
    }

    /// source -> [filter] -> gain -> destination
    fn try_start_patch(&self, ctx: &AudioContext, patch: &Patch, when: f64) -> Option<()> {
        let gain = ctx.create_gain().ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        apply_sweep(&gain.gain(), &patch.gain, when);

        let sink: AudioNode = match &patch.filter {
            Some(spec) => {
                let filter = ctx.create_biquad_filter().ok()?;
                filter.set_type(match spec.kind {
                    FilterKind::LowPass => BiquadFilterType::Lowpass,
                    FilterKind::HighPass => BiquadFilterType::Highpass,
                });
                apply_sweep(&filter.frequency(), &spec.cutoff, when);
                filter.connect_with_audio_node(&gain).ok()?;
                filter.into()
            }
            None => gain.into(),
        };

        match patch.source {
            Source::Oscillator(waveform) => {
                let osc = ctx.create_oscillator().ok()?;
                osc.set_type(oscillator_type(waveform));
                apply_sweep(&osc.frequency(), &patch.pitch, when);
                osc.connect_with_audio_node(&sink).ok()?;
                osc.start_with_when(when).ok()?;
                osc.stop_with_when(when + patch.duration).ok()?;
            }
            Source::Noise => {
                let buffer = self.noise.as_ref()?;
                let src = ctx.create_buffer_source().ok()?;
                src.set_buffer(Some(buffer));
                src.connect_with_audio_node(&sink).ok()?;
                src.start_with_when(when).ok()?;
                src.stop_with_when(when + patch.duration).ok()?;
            }
        }
        Some(())
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}

fn apply_sweep(param: &AudioParam, sweep: &Sweep, when: f64) {
    param.set_value_at_time(sweep.from, when).ok();
    let end = when + sweep.time;
    match sweep.ramp {
        Ramp::Hold => {}
        Ramp::Linear => {
            param.linear_ramp_to_value_at_time(sweep.to, end).ok();
        }
        Ramp::Exponential => {
            param.exponential_ramp_to_value_at_time(sweep.to, end).ok();
        }
    }
}

fn create_noise_buffer(ctx: &AudioContext) -> Option<AudioBuffer> {
    let rate = ctx.sample_rate();
    let len = (rate * NOISE_SECONDS) as u32;
    let buffer = ctx.create_buffer(1, len, rate).ok()?;

    let mut rng = Pcg32::seed_from_u64(0x6e6f_6973_65);
    let mut samples: Vec<f32> = (0..len).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect();
    if buffer.copy_to_channel(samples.as_mut_slice(), 0).is_err() {
        log::warn!("Could not fill noise buffer - hi-hat disabled");
        return None;
    }
    Some(buffer)
}
