//! Time-channel pulse animation for generated instances.
//!
//! Effectors are scalar sweeps that travel through the normalized `time`
//! channel of the instances. Instances near an effector bulge outward along
//! their normal and glow; the glow color slowly cycles.

use crate::instance_buffer::Instance;
use glam::Vec3;
use std::f32::consts::PI;

/// Half-width of the band around an effector that reacts to it.
pub const BAND_WIDTH: f32 = 0.15;

/// Distance over which the displacement fades in.
const TRANSITION_WIDTH: f32 = 0.25;

/// Starting value shared by every default effector.
const EFFECTOR_REST: f32 = -0.2;

/// Sinusoidal ease-in-out on `[0, 1]`.
#[inline]
pub fn ease_sinusoidal_in_out(amount: f32) -> f32 {
    0.5 * (1.0 - (PI * amount).cos())
}

/// A repeating scalar sweep from `from` to `to`.
///
/// The value holds `from` during the initial `delay`, sweeps over
/// `duration` seconds, then holds `to` for another `delay` before the next
/// sweep starts back at `from`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectorTrack {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub delay: f32,
}

impl EffectorTrack {
    pub fn new(from: f32, to: f32, duration: f32, delay: f32) -> Self {
        Self {
            from,
            to,
            duration,
            delay,
        }
    }

    /// Value of the track `t` seconds after it was started.
    pub fn value_at(&self, t: f32) -> f32 {
        if t < self.delay {
            return self.from;
        }
        if self.duration <= 0.0 {
            return self.to;
        }
        let period = self.duration + self.delay;
        let phase = (t - self.delay).rem_euclid(period);
        if phase >= self.duration {
            return self.to;
        }
        let eased = ease_sinusoidal_in_out(phase / self.duration);
        self.from + (self.to - self.from) * eased
    }
}

/// The three effectors driving the tree animation.
///
/// Only the first two feed [`pose`] and [`emissive`]; the third sweeps past
/// the top of the tree and is kept for callers that want a later accent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectorRig {
    pub tracks: [EffectorTrack; 3],
}

impl Default for EffectorRig {
    fn default() -> Self {
        Self {
            tracks: [
                EffectorTrack::new(EFFECTOR_REST, 1.1, 3.0, 0.0),
                EffectorTrack::new(EFFECTOR_REST, 1.2, 3.0, 3.0),
                EffectorTrack::new(EFFECTOR_REST, 1.3, 2.0, 6.0),
            ],
        }
    }
}

impl EffectorRig {
    pub fn values_at(&self, t: f32) -> [f32; 3] {
        self.tracks.map(|track| track.value_at(t))
    }
}

/// Band response of an instance at `time` to an effector at `effector`.
///
/// Strongest at the effector and toward the base of the tree; `None`
/// outside the band.
#[inline]
pub fn band(time: f32, effector: f32) -> Option<f32> {
    let dif = (time - effector).abs();
    (dif <= BAND_WIDTH).then(|| (BAND_WIDTH - dif) * ((1.7 - time) * 10.0))
}

#[inline]
fn transition(time: f32, effector: f32) -> f32 {
    (1.0 - (time - effector).abs() / TRANSITION_WIDTH).clamp(0.0, 1.0)
}

/// Animated placement of one instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstancePose {
    /// Displaced instance center.
    pub center: Vec3,
    /// Half-extent of the instance box.
    pub extent: f32,
}

/// Places an instance for the current effector values and clock.
///
/// The instance moves outward along its normal by the smoothed band
/// response plus a per-instance breathing term.
pub fn pose(instance: &Instance, e1: f32, e2: f32, clock: f32) -> InstancePose {
    let t = instance.time;
    let effect = band(t, e2).or_else(|| band(t, e1)).unwrap_or(0.0);
    let fade = ((transition(t, e1) + transition(t, e2)) / 2.0).clamp(0.0, 1.0);
    let smooth = effect * fade;
    let breathe = (clock + instance.seed * 2.0).sin().abs() * 1.5;

    InstancePose {
        center: instance.position + instance.normal * (smooth * 1.5 + breathe),
        extent: instance.size,
    }
}

/// Emissive glow of an instance, already tinted by its base color.
pub fn emissive(instance: &Instance, e1: f32, e2: f32, clock: f32) -> Vec3 {
    let t = instance.time;
    let effect1 = band(t, e1).unwrap_or(0.0);
    let effect2 = band(t, e2).unwrap_or(effect1);

    let top_fade = (1.0 - t * 0.7).clamp(0.0, 1.0);
    let f1 = effect1 * top_fade;
    let f2 = effect2 * top_fade;

    let c1 = Vec3::new(f1, f2, 0.0);
    let c2 = Vec3::new(0.0, f1, f2);
    let c3 = Vec3::new(f1, 0.0, f2);

    let phase = (clock * 0.3).rem_euclid(3.0);
    let mixed = if phase < 1.0 {
        c1.lerp(c2, phase)
    } else if phase < 2.0 {
        c2.lerp(c3, phase - 1.0)
    } else {
        c3.lerp(c1, phase - 2.0)
    };

    let glow = (clock * 1.5).sin() * 0.2 + 0.8;
    let combined = mixed + mixed * glow * 0.6;
    combined * combined * instance.color
}
