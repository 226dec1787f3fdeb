//! Actors: every scripted entity in a scene, hero included.

use bitflags::bitflags;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::animation::{anim, AnimCompletion, AnimState};
use crate::components::skeleton::Skeleton;
use crate::core::game::HeroState;
use crate::core::geometry::{self, Aabb};

/// How an actor's movement is driven each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirMode {
    NoMove = 0,
    Manual = 1,
    Follow = 2,
    Track = 3,
    FollowFar = 4,
    TrackAttack = 5,
    SameXz = 6,
    Penguin = 7,
    Wagon = 8,
    MoveCircle = 9,
    MoveCircle2 = 10,
    SameXzBeta = 11,
    MoveBuggy = 12,
    MoveBuggyManual = 13,
}

bitflags! {
    /// Static per-actor configuration flags from the scene data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ActorFlags: u32 {
        const HAS_COLLISIONS = 1 << 0;
        const IS_VISIBLE = 1 << 1;
        const IS_SPRITE = 1 << 2;
        const CAN_FALL = 1 << 3;
        const CAN_CARRY = 1 << 4;
        const NO_SHADOW = 1 << 5;
    }
}

impl Default for ActorFlags {
    fn default() -> Self {
        ActorFlags::HAS_COLLISIONS | ActorFlags::IS_VISIBLE | ActorFlags::CAN_FALL
    }
}

/// Scene-data description of an actor. Runtime state lives on [`Actor`];
/// `props` is what `Actor::reset` restores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorProps {
    pub index: usize,
    pub position: Vec3,
    /// Initial yaw in radians.
    pub angle: f32,
    pub life: i32,
    pub flags: ActorFlags,
    pub entity_index: i32,
    pub body_index: i32,
    pub anim_index: usize,
    pub dir_mode: DirMode,
    pub speed: f32,
    /// Target actor for [`DirMode::Follow`] and [`DirMode::SameXz`].
    pub follow_actor: i32,
    /// Bonus drop bitmask; bits 4..9 pick the sprite, bit 0 marks a
    /// one-shot bonus as already granted.
    pub bonus_mask: i32,
    pub bonus_amount: i32,
    pub text_color: u8,
}

impl ActorProps {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            position: Vec3::ZERO,
            angle: 0.0,
            life: 50,
            flags: ActorFlags::default(),
            entity_index: 0,
            body_index: 0,
            anim_index: anim::STANDING,
            dir_mode: DirMode::NoMove,
            speed: 0.0,
            follow_actor: -1,
            bonus_mask: 0,
            bonus_amount: 0,
            text_color: 0,
        }
    }

    /// Props for an actor spawned by a script at runtime rather than
    /// loaded from scene data.
    pub fn dynamic(index: usize) -> Self {
        Self {
            life: 255,
            speed: 35.0,
            ..Self::new(index)
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_flags(mut self, flags: ActorFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn sprite(mut self) -> Self {
        self.flags |= ActorFlags::IS_SPRITE;
        self
    }
}

/// Volatile per-tick and per-life flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorState {
    pub is_dead: bool,
    pub is_visible: bool,
    pub is_walking: bool,
    pub is_turning: bool,
    pub is_falling: bool,
    pub is_jumping: bool,
    pub is_climbing: bool,
    pub is_topping_out: bool,
    pub is_colliding: bool,
    pub is_stuck: bool,
    pub is_sliding: bool,
    pub is_hit: bool,
    pub is_searching: bool,
    pub is_drowning: bool,
    pub is_using_jetpack: bool,
    pub has_gravity_by_anim: bool,
    /// Index of the actor that hit this one, -1 when none. Stays set for
    /// one extra frame so life scripts can observe it.
    pub was_hit_by: i32,
    /// Bookkeeping for the two-frame `was_hit_by` window.
    pub has_seen_hit: bool,
    /// Index of the actor collided with this frame, -1 when none.
    pub has_collided_with_actor: i32,
    /// Animation to switch to at the start of the next frame, set by
    /// completion handlers that fire mid-frame.
    pub next_anim: Option<usize>,
    pub floor_sound: i32,
}

impl ActorState {
    pub fn new() -> Self {
        Self {
            is_visible: true,
            was_hit_by: -1,
            has_collided_with_actor: -1,
            floor_sound: -1,
            ..Self::default()
        }
    }
}

/// Per-tick movement scratch. `position` accumulates this frame's
/// displacement; the physics commit adds it to the real position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhysicsTemp {
    pub position: Vec3,
    pub destination: Option<Vec3>,
    pub angle: f32,
    pub dest_angle: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorPhysics {
    pub position: Vec3,
    pub orientation: Quat,
    pub temp: PhysicsTemp,
}

impl ActorPhysics {
    fn from_props(props: &ActorProps) -> Self {
        Self {
            position: props.position,
            orientation: Quat::from_rotation_y(props.angle),
            temp: PhysicsTemp {
                angle: props.angle,
                dest_angle: props.angle,
                ..PhysicsTemp::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub props: ActorProps,
    pub state: ActorState,
    pub physics: ActorPhysics,
    pub anim_state: AnimState,
    #[serde(default)]
    pub skeleton: Skeleton,
    pub bounds: Aabb,
    /// Runtime copies of the model/animation selection; scripts change
    /// these without touching the reset baseline in `props`.
    pub entity_index: i32,
    pub body_index: i32,
    pub anim_index: usize,
    pub dir_mode: DirMode,
    pub speed: f32,
    pub follow_actor: i32,
    pub prev_entity_index: i32,
    pub prev_anim_index: usize,
    pub prev_angle: f32,
}

impl Actor {
    pub fn new(props: ActorProps) -> Self {
        let physics = ActorPhysics::from_props(&props);
        Self {
            state: ActorState::new(),
            physics,
            anim_state: AnimState::new(),
            skeleton: Skeleton::default(),
            bounds: Aabb::centered(Vec3::new(0.3, 0.45, 0.3)),
            entity_index: props.entity_index,
            body_index: props.body_index,
            anim_index: props.anim_index,
            dir_mode: props.dir_mode,
            speed: props.speed,
            follow_actor: props.follow_actor,
            prev_entity_index: -1,
            prev_anim_index: props.anim_index,
            prev_angle: props.angle,
            props,
        }
    }

    pub fn index(&self) -> usize {
        self.props.index
    }

    pub fn is_sprite(&self) -> bool {
        self.props.flags.contains(ActorFlags::IS_SPRITE)
    }

    pub fn has_collisions(&self) -> bool {
        self.props.flags.contains(ActorFlags::HAS_COLLISIONS)
    }

    pub fn can_fall(&self) -> bool {
        self.props.flags.contains(ActorFlags::CAN_FALL)
    }

    /// An actor is drawn while it still has life or a body to show.
    pub fn is_visible(&self) -> bool {
        self.props.flags.contains(ActorFlags::IS_VISIBLE)
            && (self.props.life > 0 || self.body_index >= 0)
    }

    pub fn world_bounds(&self) -> Aabb {
        self.bounds.translated(self.physics.position)
    }

    /// Walk toward `point`: face it and keep moving until told otherwise.
    /// Returns the remaining 2D distance.
    pub fn goto(&mut self, point: Vec3) -> f32 {
        self.physics.temp.destination = Some(point);
        let dist = geometry::distance_2d(self.physics.position, point);
        self.physics.temp.dest_angle = geometry::angle_to(self.physics.position, point);
        self.state.is_walking = true;
        self.state.is_turning = true;
        dist
    }

    /// Sprite variant of [`goto`](Self::goto): no walk animation drives the
    /// step, so the displacement is applied directly.
    pub fn goto_sprite(&mut self, point: Vec3, amount: f32) -> f32 {
        let delta = point - self.physics.position;
        let dist = delta.length();
        if dist > 0.0 {
            self.physics.position += delta * (amount / dist).min(1.0);
        }
        geometry::distance_2d(self.physics.position, point)
    }

    /// Turn in place toward `point`.
    pub fn face_point(&mut self, point: Vec3) {
        self.physics.temp.dest_angle = geometry::angle_to(self.physics.position, point);
        self.state.is_turning = true;
    }

    /// Turn in place to an absolute yaw (radians).
    pub fn set_angle(&mut self, angle: f32) {
        self.physics.temp.dest_angle = geometry::wrap_angle(angle);
        self.state.is_turning = true;
    }

    /// Snap yaw without turning.
    pub fn set_angle_now(&mut self, angle: f32) {
        let a = geometry::wrap_angle(angle);
        self.physics.temp.angle = a;
        self.physics.temp.dest_angle = a;
        self.physics.orientation = Quat::from_rotation_y(a);
        self.state.is_turning = false;
    }

    pub fn stop(&mut self) {
        self.state.is_walking = false;
        self.state.is_turning = false;
        self.physics.temp.destination = None;
    }

    /// Switch to another animation slot. No-op if already playing it.
    pub fn set_anim(&mut self, index: usize) {
        if self.anim_index == index {
            return;
        }
        self.prev_anim_index = self.anim_index;
        self.anim_index = index;
        self.anim_state.reset();
    }

    /// Like [`set_anim`](Self::set_anim) but tags the final keyframe with a
    /// follow-up action. The tag is dropped if another animation takes over
    /// before the clip finishes.
    pub fn set_anim_with_completion(&mut self, index: usize, completion: AnimCompletion) {
        self.set_anim(index);
        self.anim_state.pending = Some(completion);
    }

    pub fn set_body(&mut self, body: i32) {
        self.body_index = body;
    }

    /// Apply a hit from another actor (or -1 for environmental damage).
    ///
    /// The hero's life pool lives on [`HeroState`], so damaging actor 0
    /// requires it; all other actors carry their life in `props`.
    pub fn hit(&mut self, hit_by: i32, strength: i32, hero: Option<&mut HeroState>) {
        if self.is_sprite() {
            self.state.was_hit_by = hit_by;
            return;
        }
        let life = match hero {
            Some(hero) => {
                hero.life = (hero.life - strength).max(0);
                hero.life
            }
            None => {
                self.props.life = (self.props.life - strength).max(0);
                self.props.life
            }
        };
        if life <= 0 {
            self.state.is_dead = true;
            self.state.is_visible = false;
        } else if !(self.state.is_hit && self.anim_index == anim::HIT) {
            let resume = self.anim_index;
            self.set_anim(anim::HIT);
            // The hero's controls pick their own next animation; everyone
            // else returns to what they were doing.
            if self.props.index != 0 && self.anim_index == anim::HIT && resume != anim::HIT {
                self.anim_state.pending = Some(AnimCompletion::HitRecovery { resume_anim: resume });
            }
        }
        self.state.is_hit = true;
        self.state.was_hit_by = hit_by;
    }

    /// Restore the actor to its scene-data baseline.
    pub fn reset(&mut self) {
        self.physics = ActorPhysics::from_props(&self.props);
        self.state = ActorState::new();
        self.anim_state = AnimState::new();
        self.entity_index = self.props.entity_index;
        self.body_index = self.props.body_index;
        self.anim_index = self.props.anim_index;
        self.dir_mode = self.props.dir_mode;
        self.speed = self.props.speed;
        self.follow_actor = self.props.follow_actor;
        self.prev_entity_index = -1;
        self.prev_anim_index = self.props.anim_index;
        self.prev_angle = self.props.angle;
    }
}
