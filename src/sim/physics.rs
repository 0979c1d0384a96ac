//! Shared body state and velocity integration
//!
//! Every moving entity owns a [`Body`]. Behavior code only writes `target` and
//! `friction`; [`Body::integrate`] is the single place speed changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Rect};

/// Move `speed` toward `target` by at most `step`, never overshooting
#[inline]
pub fn approach(speed: f32, target: f32, step: f32) -> f32 {
    if speed < target {
        target.min(speed + step)
    } else {
        target.max(speed - step)
    }
}

/// Position, velocity and lifecycle flags common to all entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub speed: Vec2,
    pub target: Vec2,
    pub friction: Vec2,
    /// Terrain collision box, relative to `pos`
    pub collision_box: Rect,
    /// Hazard/attack overlap box, relative to `pos`
    pub hitbox: Rect,
    pub exists: bool,
    pub dying: bool,
    /// Landed on a floor during the current tick
    pub touch_floor: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            speed: Vec2::ZERO,
            target: Vec2::ZERO,
            friction: Vec2::ONE,
            collision_box: Rect::default(),
            hitbox: Rect::default(),
            exists: false,
            dying: false,
            touch_floor: false,
        }
    }
}

impl Body {
    pub fn new(pos: Vec2, collision_box: Rect, hitbox: Rect) -> Self {
        Self {
            pos,
            collision_box,
            hitbox,
            ..Default::default()
        }
    }

    /// Advance speed toward target per axis, then position by speed
    pub fn integrate(&mut self, dt: f32) {
        self.speed.x = approach(self.speed.x, self.target.x, self.friction.x * dt);
        self.speed.y = approach(self.speed.y, self.target.y, self.friction.y * dt);

        self.pos += self.speed * dt;
    }

    /// Reset motion for a fresh spawn at `pos`
    pub fn respawn(&mut self, pos: Vec2, speed: Vec2) {
        self.pos = pos;
        self.speed = speed;
        self.target = speed;
        self.exists = true;
        self.dying = false;
        self.touch_floor = false;
    }

    /// Live and not in a death procedure
    #[inline]
    pub fn is_active(&self) -> bool {
        self.exists && !self.dying
    }

    /// Enter the death procedure. Only valid for a live body.
    pub fn start_dying(&mut self) {
        if self.exists {
            self.dying = true;
        }
    }

    /// Death procedure complete: both flags change together
    pub fn finish_death(&mut self) {
        self.exists = false;
        self.dying = false;
    }

    pub fn force_kill(&mut self) {
        self.finish_death();
    }

    /// World-space terrain box
    pub fn collision_aabb(&self) -> Aabb {
        self.collision_box.at(self.pos)
    }

    /// World-space hazard box
    pub fn hitbox_aabb(&self) -> Aabb {
        self.hitbox.at(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_approach_clamps_at_target() {
        assert_eq!(approach(0.0, 1.0, 0.25), 0.25);
        assert_eq!(approach(0.9, 1.0, 0.25), 1.0);
        assert_eq!(approach(2.0, 1.0, 0.25), 1.75);
        assert_eq!(approach(1.1, 1.0, 0.25), 1.0);
    }

    #[test]
    fn test_integrate_moves_by_new_speed() {
        let mut body = Body {
            target: Vec2::new(1.5, 4.0),
            friction: Vec2::new(0.25, 0.15),
            ..Default::default()
        };
        body.integrate(1.0);
        assert!((body.speed.x - 0.25).abs() < 1e-6);
        assert!((body.speed.y - 0.15).abs() < 1e-6);
        assert!((body.pos.x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_finish_death_clears_both_flags() {
        let mut body = Body::default();
        body.respawn(Vec2::ZERO, Vec2::ZERO);
        body.start_dying();
        assert!(body.exists && body.dying);
        body.finish_death();
        assert!(!body.exists && !body.dying);

        // A dead body cannot start dying again
        body.start_dying();
        assert!(!body.dying);
    }

    proptest! {
        #[test]
        fn approach_never_overshoots(
            s in -50.0f32..50.0,
            t in -50.0f32..50.0,
            step in 0.0f32..20.0,
        ) {
            let r = approach(s, t, step);
            prop_assert!(r >= s.min(t) && r <= s.max(t));
        }
    }
}
