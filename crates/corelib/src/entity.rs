//! Moving entity integrated over time and reflected off the world bounds.

use std::f32::consts::PI;

use glam::{Vec2, vec2};

/// Half-width of the square world, matching the ground plane extent.
pub const WORLD_HALF_WIDTH: f32 = 500.0;

/// Clamp lands one unit inside the crossed edge so the same edge does not
/// re-trigger on the next tick.
const EDGE_MARGIN: f32 = 1.0;

/// A single object driving around the ground plane.
///
/// Heading 0 points along +Y of the simulation plane; velocity is
/// `speed * (sin(heading), cos(heading))`. Deterministic: identical starting
/// state and delta-time sequence always produce the identical trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingEntity {
    pub position: Vec2,
    /// Radians; wrapped to (-PI, PI].
    pub heading: f32,
    /// World units per second.
    pub speed: f32,
    bound: f32,
}

impl MovingEntity {
    pub fn new(position: Vec2, heading: f32, speed: f32) -> Self {
        Self {
            position,
            heading: wrap_angle(heading),
            speed,
            bound: WORLD_HALF_WIDTH,
        }
    }

    /// Overrides the world half-width (demo-specific bounds).
    pub fn with_bound(mut self, bound: f32) -> Self {
        self.bound = bound;
        self
    }

    pub fn bound(&self) -> f32 {
        self.bound
    }

    /// Integrates one step and reflects off the world edge when crossed.
    ///
    /// Reflection mirrors the velocity about the crossed edge's normal:
    /// X edges negate the X component (`heading -> -heading`), Y edges
    /// negate the Y component (`heading -> PI - heading`). One edge is
    /// handled per step; the offending coordinate is clamped just inside.
    pub fn advance(&mut self, dt_secs: f32) {
        let mut x = self.position.x + self.speed * self.heading.sin() * dt_secs;
        let mut y = self.position.y + self.speed * self.heading.cos() * dt_secs;
        let inside = self.bound - EDGE_MARGIN;

        if x < -self.bound {
            x = -inside;
            self.heading = -self.heading;
        } else if x > self.bound {
            x = inside;
            self.heading = -self.heading;
        } else if y < -self.bound {
            y = -inside;
            self.heading = PI - self.heading;
        } else if y > self.bound {
            y = inside;
            self.heading = PI - self.heading;
        }

        self.heading = wrap_angle(self.heading);
        self.position = vec2(x, y);
    }
}

/// Wraps an angle to (-PI, PI].
fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn straight_motion_integrates_speed_times_dt() {
        let mut e = MovingEntity::new(Vec2::ZERO, 0.0, 100.0);
        e.advance(0.5);
        assert!((e.position.y - 50.0).abs() < 1e-4);
        assert!(e.position.x.abs() < 1e-4);
    }

    #[test]
    fn crossing_positive_x_clamps_and_reflects() {
        let mut e = MovingEntity::new(vec2(490.0, 0.0), FRAC_PI_2, 100.0);
        e.advance(1.0); // would land at x = 590
        assert!((e.position.x - 499.0).abs() < 1e-4);
        assert!((e.heading + FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn crossing_positive_y_clamps_and_changes_heading() {
        let mut e = MovingEntity::new(Vec2::ZERO, 0.0, 100.0);
        e.advance(10.0); // would land at y = 1000
        assert!(e.position.y.abs() <= 500.0);
        assert!((e.position.y - 499.0).abs() < 1e-4);
        assert!((e.heading - PI).abs() < 1e-4, "heading must change on bounce");
    }

    #[test]
    fn reflection_mirrors_velocity_component() {
        // Diagonal approach to the -Y edge: Y velocity flips, X keeps sign.
        let heading = PI - 0.3; // moving +X, -Y
        let mut e = MovingEntity::new(vec2(0.0, -495.0), heading, 100.0);
        let vx_before = e.heading.sin();
        e.advance(1.0);
        assert!((e.heading.sin() - vx_before).abs() < 1e-4);
        assert!(e.heading.cos() > 0.0, "Y velocity must point back inside");
    }

    #[test]
    fn bounces_stay_inside_custom_bound() {
        let mut e = MovingEntity::new(Vec2::ZERO, 0.7, 300.0).with_bound(50.0);
        for _ in 0..1000 {
            e.advance(0.016);
            assert!(e.position.x.abs() <= 50.0 && e.position.y.abs() <= 50.0);
            assert!(e.heading > -PI && e.heading <= PI);
        }
    }

    #[test]
    fn identical_inputs_give_identical_trajectories() {
        let mut a = MovingEntity::new(vec2(10.0, -20.0), 0.9, 250.0);
        let mut b = a;
        for i in 0..500 {
            let dt = 0.01 + (i % 7) as f32 * 0.003;
            a.advance(dt);
            b.advance(dt);
        }
        assert_eq!(a, b);
    }
}
