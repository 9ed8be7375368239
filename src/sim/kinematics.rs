//! Kinematic helpers for the fixed-step car update

use std::f32::consts::{FRAC_PI_2, TAU};

/// Stateless kinematics for car movement
pub struct Kinematics;

impl Kinematics {
    /// Exponential-approach speed update toward `max_speed`
    ///
    /// Same smoothing as a lerp with the interpolant clamped to [0, 1]; the
    /// car never overshoots its top speed and never reaches it instantly.
    pub fn accelerate(current: f32, max_speed: f32, acceleration_factor: f32, dt: f32) -> f32 {
        let t = (dt * acceleration_factor).clamp(0.0, 1.0);
        current + (max_speed - current) * t
    }

    /// Translate forward along the heading by `speed * dt`
    pub fn advance(x: f32, y: f32, heading: f32, speed: f32, dt: f32) -> (f32, f32) {
        (x + heading.cos() * speed * dt, y + heading.sin() * speed * dt)
    }

    /// Interpolate the heading toward a target 90 degrees to the given side
    ///
    /// The target is recomputed from the current heading every tick, so the
    /// car turns at a smooth, constant-feeling rate instead of snapping.
    /// `steer_sign` is -1 for left, +1 for right; right turns decrease the
    /// heading angle (clockwise on a y-up plane).
    pub fn steer(heading: f32, steer_sign: f32, rotation_factor: f32, dt: f32) -> f32 {
        let t = (dt * rotation_factor).clamp(0.0, 1.0);
        let target = heading - steer_sign * FRAC_PI_2;
        let next = heading + (target - heading) * t;
        next.rem_euclid(TAU)
    }
}
