//! Extras: bonus pickups and thrown objects.

use bitflags::bitflags;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::geometry::Aabb;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExtraFlags: u32 {
        const TIME_OUT = 1 << 0;
        const FLY = 1 << 1;
        const END_OBJ = 1 << 2;
        const END_COL = 1 << 3;
        const STOP_COL = 1 << 4;
        const TAKABLE = 1 << 5;
        const FLASH = 1 << 6;
        const AIM = 1 << 7;
        const IMPACT = 1 << 8;
        const TIME_IN = 1 << 10;
        const WAIT_NO_COL = 1 << 13;
        const BONUS = 1 << 14;
        const DART = 1 << 16;
    }
}

/// Sprite ids for the bonus types the simulation reacts to.
pub mod sprite {
    pub const KASHES: i32 = 3;
    pub const LIFE: i32 = 4;
    pub const MAGIC: i32 = 5;
    pub const KEY: i32 = 6;
    pub const CLOVER: i32 = 7;
}

/// A transient pickup or thrown object living in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extra {
    pub index: usize,
    pub sprite_index: i32,
    /// Bonus amount (kashes count, life points, ...).
    pub info: i32,
    pub flags: ExtraFlags,
    pub position: Vec3,
    /// Yaw the ballistic arc is rotated into.
    pub angle: f32,
    /// `Time::elapsed` at spawn; lifetime and the trajectory clock both
    /// count from here.
    pub spawn_time: f32,
    pub life_time: f32,
    pub speed: f32,
    pub weight: f32,
    pub throw_angle: f32,
    pub hit_strength: i32,
    /// Actor that threw this extra; it cannot hit its own thrower.
    pub thrown_by: i32,
    pub is_dead: bool,
}

impl Extra {
    pub fn new(index: usize, position: Vec3, angle: f32, sprite_index: i32, info: i32, spawn_time: f32) -> Self {
        Self {
            index,
            sprite_index,
            info,
            flags: ExtraFlags::STOP_COL
                | ExtraFlags::WAIT_NO_COL
                | ExtraFlags::BONUS
                | ExtraFlags::TAKABLE
                | ExtraFlags::TIME_IN,
            position,
            angle,
            spawn_time,
            life_time: 20.0,
            speed: 0.0,
            weight: 0.0,
            throw_angle: 0.0,
            hit_strength: 0,
            thrown_by: -1,
            is_dead: false,
        }
    }

    /// A bonus popping out of a chest, corpse or search spot.
    pub fn bonus(index: usize, position: Vec3, angle: f32, sprite_index: i32, info: i32, spawn_time: f32) -> Self {
        let mut extra = Self::new(index, position, angle, sprite_index, info, spawn_time);
        extra.flags |= ExtraFlags::BONUS;
        // Interpreted as radians, not degrees.
        extra.launch(45.0, 40.0, 15.0);
        extra
    }

    /// A projectile thrown at someone.
    pub fn throw(
        index: usize,
        position: Vec3,
        angle: f32,
        throw_angle: f32,
        sprite_index: i32,
        info: i32,
        spawn_time: f32,
        speed: f32,
        weight: f32,
        strength: i32,
        thrown_by: i32,
    ) -> Self {
        let mut extra = Self::new(index, position, angle, sprite_index, info, spawn_time);
        extra.flags = ExtraFlags::END_OBJ | ExtraFlags::END_COL | ExtraFlags::IMPACT | ExtraFlags::TIME_IN;
        extra.hit_strength = strength;
        extra.thrown_by = thrown_by;
        extra.launch(throw_angle, speed, weight);
        extra
    }

    fn launch(&mut self, throw_angle: f32, speed: f32, weight: f32) {
        self.flags |= ExtraFlags::FLY;
        self.speed = speed;
        self.weight = weight;
        self.throw_angle = throw_angle;
    }

    pub fn is_flying(&self) -> bool {
        self.flags.contains(ExtraFlags::FLY)
    }

    /// Advance the ballistic arc.
    ///
    /// The closed-form displacement for the time since spawn is added to
    /// the position every frame, not assigned; the arc's shape depends on
    /// this accumulation and must not be "fixed" into an assignment.
    pub fn fly(&mut self, elapsed: f32) {
        let ts = (elapsed - self.spawn_time) * 0.002;
        let gravity = 0.9 * 1.275f32.powf(self.weight) * 1000.0;
        let x = self.speed * ts * self.throw_angle.cos();
        let y = self.speed * ts * self.throw_angle.sin() - 0.5 * gravity * ts * ts;
        let arc = Quat::from_rotation_y(self.angle) * Vec3::new(x, y, 0.0);
        self.position += arc;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(Vec3::splat(0.1)).translated(self.position)
    }
}

/// Pick a bonus sprite from an actor's bonus bitmask (bits 4..9 select the
/// candidate types). `roll` indexes into the candidates.
pub fn bonus_sprite(bonus_mask: i32, roll: usize) -> Option<i32> {
    let mut candidates = Vec::new();
    for b in 0..5 {
        if bonus_mask & (1 << (b + 4)) != 0 {
            candidates.push(b + 3);
        }
    }
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[roll % candidates.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_mark_a_takable_bonus() {
        let e = Extra::new(0, Vec3::ZERO, 0.0, sprite::KASHES, 5, 0.0);
        assert!(e.flags.contains(ExtraFlags::BONUS));
        assert!(e.flags.contains(ExtraFlags::TAKABLE));
        assert!(!e.flags.contains(ExtraFlags::FLY));
    }

    #[test]
    fn bonus_launches_with_radian_angle() {
        let e = Extra::bonus(0, Vec3::ZERO, 0.0, sprite::LIFE, 2, 0.0);
        assert!(e.is_flying());
        assert_eq!(e.throw_angle, 45.0);
        assert_eq!(e.speed, 40.0);
        assert_eq!(e.weight, 15.0);
    }

    #[test]
    fn fly_accumulates_displacement() {
        let mut e = Extra::bonus(0, Vec3::ZERO, 0.0, sprite::LIFE, 2, 0.0);
        e.fly(0.05);
        let first = e.position;
        e.fly(0.05);
        // Same instant twice still moves: the offset is added, not set.
        assert!((e.position - first * 2.0).length() < 1e-4);
    }

    #[test]
    fn throw_overrides_default_flags() {
        let e = Extra::throw(1, Vec3::ZERO, 0.0, 0.7, sprite::KEY, 0, 0.0, 10.0, 2.0, 15, 3);
        assert!(e.flags.contains(ExtraFlags::IMPACT));
        assert!(!e.flags.contains(ExtraFlags::BONUS));
        assert_eq!(e.hit_strength, 15);
        assert_eq!(e.thrown_by, 3);
    }

    #[test]
    fn bonus_sprite_reads_mask_bits() {
        // Bits 4 and 6 set: kashes (3) and magic (5).
        let mask = (1 << 4) | (1 << 6);
        assert_eq!(bonus_sprite(mask, 0), Some(sprite::KASHES));
        assert_eq!(bonus_sprite(mask, 1), Some(sprite::MAGIC));
        assert_eq!(bonus_sprite(0, 0), None);
    }
}
