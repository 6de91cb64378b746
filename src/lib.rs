//! Gravwell - simulation core of a 2D space-combat arcade game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (steering, fields, weapons, collisions, lifecycle)
//! - `tuning`: Data-driven game balance (static parameter table)
//!
//! Screen-space conventions: positions are pixels with the origin at the
//! top-left corner and y growing downward. Angles are degrees, 0 = up,
//! growing clockwise.

pub mod sim;
pub mod tuning;

pub use tuning::{SpawnLimits, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest timestep a single frame may integrate (stalled tab, debugger)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Frame rate that per-frame multiplicative factors are tuned against
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Distances below this are treated as degenerate (no normal can be built)
    pub const EPSILON: f32 = 1e-4;
}

/// Normalize an angle in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(mut angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Shortest signed rotation (degrees) that takes `from` onto `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_degrees(to - from)
}

/// Turn `current` toward `target` by at most `max_step` degrees
pub fn rotate_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = angle_delta(current, target);
    let max_step = max_step.max(0.0);
    normalize_degrees(current + delta.clamp(-max_step, max_step))
}

/// Unit vector for a screen-space heading (0 = up, clockwise)
#[inline]
pub fn heading_vec(angle: f32) -> Vec2 {
    let rad = angle.to_radians();
    Vec2::new(rad.sin(), -rad.cos())
}

/// Heading (degrees) of a direction vector: atan2(vy, vx) + 90
#[inline]
pub fn heading_of(v: Vec2) -> f32 {
    normalize_degrees(v.y.atan2(v.x).to_degrees() + 90.0)
}

/// Heading from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> Option<f32> {
    let offset = to - from;
    if offset.length_squared() < consts::EPSILON * consts::EPSILON {
        None
    } else {
        Some(heading_of(offset))
    }
}

/// Mirror a vector about a unit surface normal: v' = v - 2(v·n)n
#[inline]
pub fn reflect(v: Vec2, normal: Vec2) -> Vec2 {
    v - 2.0 * v.dot(normal) * normal
}

/// Rotate a vector by `degrees` (clockwise on screen)
#[inline]
pub fn rotate_vec(v: Vec2, degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::from_angle(rad).rotate(v)
}

/// Linear field falloff: `ceiling` at the center, `floor` at `radius`
///
/// Distances are clamped into [0, radius] so the result never leaves
/// [floor, ceiling].
#[inline]
pub fn falloff(dist: f32, radius: f32, floor: f32, ceiling: f32) -> f32 {
    if radius <= 0.0 {
        return floor;
    }
    let t = (dist / radius).clamp(0.0, 1.0);
    floor + (1.0 - t) * (ceiling - floor)
}

/// Clamp a velocity to a maximum magnitude, keeping its direction
#[inline]
pub fn cap_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    if !vel.is_finite() {
        return Vec2::ZERO;
    }
    let max_speed = max_speed.max(0.0);
    if vel.length_squared() > max_speed * max_speed {
        vel.normalize_or_zero() * max_speed
    } else {
        vel
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cosine ease-in-out on [0, 1]
#[inline]
pub fn cosine_ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    (1.0 - (t * std::f32::consts::PI).cos()) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(180.0), -180.0);
        assert_eq!(normalize_degrees(f32::NAN), 0.0);
    }

    #[test]
    fn test_heading_round_trip_axes() {
        // Up, right, down, left
        let up = heading_vec(0.0);
        assert!((up - Vec2::new(0.0, -1.0)).length() < 1e-5);
        let right = heading_vec(90.0);
        assert!((right - Vec2::new(1.0, 0.0)).length() < 1e-5);

        assert!(heading_of(Vec2::new(0.0, -5.0)).abs() < 1e-4);
        assert!((heading_of(Vec2::new(3.0, 0.0)) - 90.0).abs() < 1e-4);
        assert!((heading_of(Vec2::new(0.0, 2.0)).abs() - 180.0).abs() < 1e-4);
        assert!((heading_of(Vec2::new(-1.0, 0.0)) + 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_toward_wraps_short_way() {
        // 170 -> -170 is a 20 degree turn through 180, not 340 the other way
        let next = rotate_toward(170.0, -170.0, 5.0);
        assert!((next - 175.0).abs() < 1e-4);
        // Never overshoots
        assert!((rotate_toward(10.0, 12.0, 5.0) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_falloff_shape() {
        assert!((falloff(0.0, 100.0, 0.2, 1.0) - 1.0).abs() < 1e-6);
        assert!((falloff(100.0, 100.0, 0.2, 1.0) - 0.2).abs() < 1e-6);
        assert!((falloff(50.0, 100.0, 0.2, 1.0) - 0.6).abs() < 1e-6);
        // Outside the field stays at the floor
        assert!((falloff(500.0, 100.0, 0.2, 1.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_cap_speed() {
        let v = cap_speed(Vec2::new(300.0, 400.0), 100.0);
        assert!((v.length() - 100.0).abs() < 1e-3);
        let slow = cap_speed(Vec2::new(3.0, 4.0), 100.0);
        assert_eq!(slow, Vec2::new(3.0, 4.0));
        assert_eq!(cap_speed(Vec2::new(f32::NAN, 1.0), 10.0), Vec2::ZERO);
    }

    #[test]
    fn test_reflect() {
        let v = reflect(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((v.x + 100.0).abs() < 1e-4);
        assert!(v.y.abs() < 1e-4);
    }

    #[test]
    fn test_rotate_vec_clockwise_on_screen() {
        // Rotating "up" by +90 should give "right" in screen space
        let v = rotate_vec(heading_vec(0.0), 90.0);
        assert!((v - heading_vec(90.0)).length() < 1e-4);
    }

    #[test]
    fn test_cosine_ease() {
        assert_eq!(cosine_ease(0.0), 0.0);
        assert!((cosine_ease(1.0) - 1.0).abs() < 1e-6);
        assert!((cosine_ease(0.5) - 0.5).abs() < 1e-6);
    }
}
