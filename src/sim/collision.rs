//! Axis-aligned collision primitives
//!
//! Terrain is a set of one-way floors plus vertical edges. Floors catch bodies
//! falling onto them; edges turn walkers around one tick before they would
//! cross. Both work purely on a body's world-space collision box.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::Body;
use crate::wrap_offsets;

/// Slack above a floor within which a falling body still lands
pub const FLOOR_TOP_MARGIN: f32 = 6.0;
/// Slack below a floor, extended by the fall distance of one tick
pub const FLOOR_BOTTOM_MARGIN: f32 = 12.0;
/// How far a leading edge may already be past an edge and still be caught
pub const EDGE_NEAR_MARGIN: f32 = 1.0;
/// Extra look-ahead in front of a leading edge, on top of one tick of travel
pub const EDGE_FAR_MARGIN: f32 = 1.0;

/// A box relative to an entity position (`offset` is the box center)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub offset: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            offset: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// World-space box for an entity at `pos`
    pub fn at(&self, pos: Vec2) -> Aabb {
        Aabb::from_center(pos + self.offset, self.size)
    }
}

/// World-space axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + w,
            bottom: y + h,
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            left: center.x - half.x,
            top: center.y - half.y,
            right: center.x + half.x,
            bottom: center.y + half.y,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }

    /// Overlap with `other` or with its copies shifted one arena width left or right
    pub fn overlaps_wrapped(&self, other: &Aabb, width: f32) -> bool {
        wrap_offsets(width)
            .iter()
            .any(|&dx| self.overlaps(&other.translated(dx, 0.0)))
    }
}

/// Land a falling body on the floor segment `[x, x + w]` at height `y`.
///
/// Returns true on a hit; the caller runs its own floor hook afterwards.
pub fn floor_collision(body: &mut Body, x: f32, y: f32, w: f32, dt: f32) -> bool {
    if !body.is_active() || body.speed.y < 0.0 {
        return false;
    }

    let b = body.collision_aabb();
    if b.right < x || b.left > x + w {
        return false;
    }

    let speed_mod = body.speed.y.abs() * dt;
    if b.bottom >= y - FLOOR_TOP_MARGIN && b.bottom < y + FLOOR_BOTTOM_MARGIN + speed_mod {
        body.pos.y = y - (body.collision_box.offset.y + body.collision_box.size.y / 2.0);
        body.speed.y = 0.0;
        body.touch_floor = true;
        return true;
    }
    false
}

/// Stop a body moving in direction `dir` (-1 or 1) at the vertical edge `x`
/// spanning `[y, y + h]`.
///
/// The leading side of the box is tested against a window reaching one tick of
/// travel ahead, so the body turns before it crosses. On a hit the leading side
/// is snapped onto the edge; the caller runs its edge hook afterwards.
pub fn edge_collision(body: &mut Body, x: f32, y: f32, h: f32, dir: f32, dt: f32) -> bool {
    if !body.is_active() || body.speed.x * dir <= 0.0 {
        return false;
    }

    let b = body.collision_aabb();
    if b.bottom <= y || b.top >= y + h {
        return false;
    }

    let lead = if dir > 0.0 { b.right } else { b.left };
    let distance = (x - lead) * dir;
    let reach = body.speed.x.abs() * dt + EDGE_FAR_MARGIN;

    if distance > reach || distance < -EDGE_NEAR_MARGIN {
        return false;
    }

    body.pos.x += x - lead;
    true
}
