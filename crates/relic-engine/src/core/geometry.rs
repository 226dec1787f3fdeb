//! Spatial primitives and the scene-geometry collaborator seam.
//!
//! Terrain and brick collision data belong to the host (it owns the parsed
//! scenery assets); the simulation only needs the two queries expressed by
//! [`SceneGeometry`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The length of half an outdoors section in meters.
pub const WORLD_SIZE: f32 = 20.0;
/// Conversion factor from raw game units to meters.
pub const WORLD_SCALE: f32 = WORLD_SIZE / 16384.0;
/// Number of game units equal to a single scenery brick.
pub const BRICK_SIZE: f32 = 512.0;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box of the given half-extent centered on the origin.
    pub fn centered(half: Vec3) -> Self {
        Self {
            min: -half,
            max: half,
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Overlap region of two intersecting boxes.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x > self.min.x
            && p.x < self.max.x
            && p.y > self.min.y
            && p.y < self.max.y
            && p.z > self.min.z
            && p.z < self.max.z
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Ground/wall contact flags a collision pass reports back to the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contact {
    pub is_colliding: bool,
    pub is_stuck: bool,
    pub is_sliding: bool,
    /// Floor material sound id, -1 when none applies.
    pub floor_sound: i32,
}

impl Contact {
    pub fn none() -> Self {
        Self {
            floor_sound: -1,
            ..Self::default()
        }
    }
}

/// Collision queries against the loaded scenery.
///
/// The host implements this on top of its heightmaps and brick grids. Both
/// methods must be cheap; they run for every moving body every tick.
pub trait SceneGeometry {
    /// Resolve `position` against the scenery, writing contact flags.
    /// Returns true when the body ends up standing on the ground.
    fn process_collisions(&self, position: &mut Vec3, bounds: &Aabb, contact: &mut Contact) -> bool;

    /// Surface normal near `position` if the box touches scenery, used for
    /// projectile bounces.
    fn normal_at(&self, position: Vec3, bounds: &Aabb) -> Option<Vec3>;
}

/// Infinite flat ground at y = 0. Used by tests and as a placeholder while
/// a scene's real scenery is still streaming in.
pub struct FlatGround;

impl SceneGeometry for FlatGround {
    fn process_collisions(&self, position: &mut Vec3, _bounds: &Aabb, contact: &mut Contact) -> bool {
        if position.y <= 0.0 {
            position.y = 0.0;
            contact.is_colliding = false;
            true
        } else {
            false
        }
    }

    fn normal_at(&self, position: Vec3, bounds: &Aabb) -> Option<Vec3> {
        if position.y + bounds.min.y <= 0.0 {
            Some(Vec3::Y)
        } else {
            None
        }
    }
}

/// Yaw from `from` toward `to` in the scene's angle convention
/// (zero faces +Z, increasing toward +X).
pub fn angle_to(from: Vec3, to: Vec3) -> f32 {
    (to.x - from.x).atan2(to.z - from.z)
}

/// Shortest angular distance between two angles, in [0, pi].
pub fn dist_angle(a: f32, b: f32) -> f32 {
    let clockwise = (a - b).abs() % (2.0 * std::f32::consts::PI);
    clockwise.min(2.0 * std::f32::consts::PI - clockwise)
}

/// Wrap an angle into [0, 2*pi).
pub fn wrap_angle(angle: f32) -> f32 {
    let two_pi = 2.0 * std::f32::consts::PI;
    let mut a = angle % two_pi;
    if a < 0.0 {
        a += two_pi;
    }
    a
}

pub fn distance_2d(from: Vec3, to: Vec3) -> f32 {
    let dx = from.x - to.x;
    let dz = from.z - to.z;
    (dx * dx + dz * dz).sqrt()
}

/// Convert a distance in meters to the raw game units script operands use.
pub fn to_script_distance(meters: f32) -> f32 {
    (meters * 500.0) / (WORLD_SIZE / 32.0)
}
