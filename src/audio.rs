//! Completion cue: a short synthesized tone played when a timer expires.

use log::{debug, warn};
use once_cell::unsync::OnceCell;
use std::fmt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AudioContext, AudioContextState, OscillatorType};

/// Something that can announce a finished countdown.
pub trait CompletionCue {
    /// Prepare for playback. Called from a user gesture so browsers allow audio.
    fn prime(&self);
    /// Play the cue. Must never fail loudly.
    fn play(&self);
}

/// Sine tone with a linear attack and a linear decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub peak_gain: f32,
    /// Gain reaches `peak_gain` at this offset.
    pub attack_s: f64,
    /// Gain reaches `floor_gain` at this offset.
    pub decay_end_s: f64,
    pub floor_gain: f32,
    /// Oscillator stops at this offset.
    pub length_s: f64,
}

impl Tone {
    pub const COMPLETION: Tone = Tone {
        frequency_hz: 880.0,
        peak_gain: 0.2,
        attack_s: 0.02,
        decay_end_s: 0.4,
        floor_gain: 0.0001,
        length_s: 0.45,
    };

    /// Envelope gain `t` seconds after the tone starts.
    pub fn gain_at(&self, t: f64) -> f32 {
        if t <= 0.0 || t >= self.length_s {
            0.0
        } else if t < self.attack_s {
            (f64::from(self.peak_gain) * t / self.attack_s) as f32
        } else if t < self.decay_end_s {
            let frac = (t - self.attack_s) / (self.decay_end_s - self.attack_s);
            let peak = f64::from(self.peak_gain);
            let floor = f64::from(self.floor_gain);
            (peak + (floor - peak) * frac) as f32
        } else {
            self.floor_gain
        }
    }
}

/// Web Audio cue. The `AudioContext` is created on first use and kept for
/// the lifetime of the cue.
pub struct WebAudioCue {
    context: OnceCell<Option<AudioContext>>,
    tone: Tone,
}

impl Default for WebAudioCue {
    fn default() -> Self {
        Self::with_tone(Tone::COMPLETION)
    }
}

impl WebAudioCue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tone(tone: Tone) -> Self {
        Self {
            context: OnceCell::new(),
            tone,
        }
    }

    /// Get the shared context, creating it once and resuming it if suspended.
    fn context(&self) -> Option<&AudioContext> {
        let ctx = self
            .context
            .get_or_init(|| first_constructed(AudioContext::new, webkit_audio_context))
            .as_ref()?;

        if ctx.state() == AudioContextState::Suspended {
            resume(ctx);
        }
        Some(ctx)
    }
}

/// Try the standard constructor, then the prefixed one. `None` means the
/// platform has no usable audio output.
fn first_constructed<T, E: fmt::Debug>(
    standard: impl FnOnce() -> Result<T, E>,
    prefixed: impl FnOnce() -> Result<T, E>,
) -> Option<T> {
    let standard_err = match standard() {
        Ok(ctx) => {
            debug!("Audio context created");
            return Some(ctx);
        }
        Err(e) => e,
    };
    match prefixed() {
        Ok(ctx) => {
            debug!("Audio context created from `webkitAudioContext`");
            Some(ctx)
        }
        Err(e) => {
            warn!("Web Audio unavailable, cue disabled: {:?} / {:?}", standard_err, e);
            None
        }
    }
}

/// Build a context through `window.webkitAudioContext` on older WebKit.
fn webkit_audio_context() -> Result<AudioContext, JsValue> {
    let window = gloo_utils::window();
    let ctor = js_sys::Reflect::get(&window, &JsValue::from_str("webkitAudioContext"))?;
    let ctor = ctor
        .dyn_into::<js_sys::Function>()
        .map_err(|_| JsValue::from_str("webkitAudioContext is not a constructor"))?;
    let ctx = js_sys::Reflect::construct(&ctor, &js_sys::Array::new())?;
    Ok(ctx.unchecked_into::<AudioContext>())
}

fn resume(ctx: &AudioContext) {
    match ctx.resume() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                warn!("Audio context resume rejected: {:?}", e);
            }
        }),
        Err(e) => warn!("Audio context resume failed: {:?}", e),
    }
}

/// Build the oscillator and gain graph for `tone` and schedule it to start now.
fn schedule_tone(ctx: &AudioContext, tone: &Tone) -> Result<(), JsValue> {
    let now = ctx.current_time();
    let oscillator = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;

    oscillator.set_type(OscillatorType::Sine);
    oscillator.frequency().set_value_at_time(tone.frequency_hz, now)?;

    let envelope = gain.gain();
    envelope.set_value_at_time(0.0, now)?;
    envelope.linear_ramp_to_value_at_time(tone.peak_gain, now + tone.attack_s)?;
    envelope.linear_ramp_to_value_at_time(tone.floor_gain, now + tone.decay_end_s)?;

    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    // Release both nodes once playback ends.
    let release = {
        let oscillator = oscillator.clone();
        let gain = gain.clone();
        Closure::once_into_js(move || {
            let _ = oscillator.disconnect();
            let _ = gain.disconnect();
        })
    };
    oscillator.set_onended(Some(release.unchecked_ref()));

    oscillator.start_with_when(now)?;
    oscillator.stop_with_when(now + tone.length_s)?;
    Ok(())
}

impl CompletionCue for WebAudioCue {
    fn prime(&self) {
        self.context();
    }

    fn play(&self) {
        let Some(ctx) = self.context() else {
            return;
        };
        if let Err(e) = schedule_tone(ctx, &self.tone) {
            warn!("Failed to play completion tone: {:?}", e);
        }
    }
}
