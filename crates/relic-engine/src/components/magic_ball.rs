//! The hero's magic ball projectile.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::game::behaviour;
use crate::core::geometry::Aabb;

pub const INITIAL_SPEED: f32 = 6.0;
pub const FETCH_KEY_SPEED: f32 = 8.0;
pub const SPEED_LIMIT: f32 = 10.0;
pub const GRAVITY_ACC: f32 = 0.002;

/// A magic ball in flight. At most one exists per scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicBall {
    pub position: Vec3,
    /// Direction scaled by speed; integrated as `position += direction * delta`.
    pub direction: Vec3,
    pub bounces: u32,
    pub max_bounces: u32,
    /// When set, the ball ignores physics and homes toward a key pickup.
    pub fetching_key: bool,
}

impl MagicBall {
    pub fn new(position: Vec3, direction: Vec3, max_bounces: u32, fetching_key: bool) -> Self {
        Self {
            position,
            direction,
            bounces: 0,
            max_bounces,
            fetching_key,
        }
    }

    /// Initial throw direction for the hero's stance, before yaw rotation.
    pub fn throw_direction(angle: f32, hero_behaviour: u8) -> Vec3 {
        let mut dir = Vec3::new(0.0, 0.1, 1.1);
        match hero_behaviour {
            behaviour::AGGRESSIVE => dir.z = 1.2,
            behaviour::DISCRETE => {
                dir.y = 0.5;
                dir.z = 0.3;
            }
            _ => {}
        }
        Quat::from_rotation_y(angle) * dir * INITIAL_SPEED
    }

    /// Offset from the hero's feet to the throwing hand.
    pub fn hand_offset(angle: f32) -> Vec3 {
        let forward = Quat::from_rotation_y(angle) * Vec3::new(0.0, 1.45, 1.0);
        let sideways = Quat::from_rotation_y(angle - std::f32::consts::FRAC_PI_2) * Vec3::new(0.0, 0.0, 0.25);
        forward + sideways * 0.5
    }

    pub fn apply_speed_limit(&mut self) {
        let speed = self.direction.length();
        if speed > SPEED_LIMIT {
            self.direction *= SPEED_LIMIT / speed;
        }
    }

    /// Reflect off a surface with the given normal, damping the speed.
    pub fn bounce(&mut self, normal: Vec3) {
        self.position += normal * 0.1;
        self.direction -= normal * (2.0 * normal.dot(self.direction));
        self.direction *= 0.8;
        self.bounces += 1;
    }

    pub fn bounce_budget_exceeded(&self) -> bool {
        self.bounces > self.max_bounces
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(Vec3::splat(0.1)).translated(self.position)
    }
}
