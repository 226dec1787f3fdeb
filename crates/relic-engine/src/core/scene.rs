//! A loaded scene: actors, zones, transient entities and their scripts.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::actor::{Actor, ActorProps};
use crate::components::extra::{sprite, Extra};
use crate::components::magic_ball::MagicBall;
use crate::components::zone::Zone;
use crate::scripting::{Command, LifeOp, MoveOp, Script, ScriptState};

const NUM_SCENE_VARIABLES: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub index: usize,
    pub actors: Vec<Actor>,
    pub zones: Vec<Zone>,
    /// Named waypoints move scripts walk actors to.
    pub points: Vec<Vec3>,
    pub extras: Vec<Extra>,
    pub magic_ball: Option<MagicBall>,
    /// Scene-local script variables.
    pub variables: Vec<i32>,
    /// Parallel to `actors`: each actor's two scripts.
    pub life_scripts: Vec<Script<LifeOp>>,
    pub move_scripts: Vec<Script<MoveOp>>,
    /// Inactive side scenes still simulate, but skip hero-only systems.
    pub is_active: bool,
    /// Island scenes eject the hero at their outer bounds.
    pub is_island: bool,
    /// True while a text zone has the hero parked in a conversation.
    pub zone_text_open: bool,
    extra_counter: usize,
}

impl Scene {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            actors: Vec::new(),
            zones: Vec::new(),
            points: Vec::new(),
            extras: Vec::new(),
            magic_ball: None,
            variables: vec![0; NUM_SCENE_VARIABLES],
            life_scripts: Vec::new(),
            move_scripts: Vec::new(),
            is_active: true,
            is_island: false,
            zone_text_open: false,
            extra_counter: 0,
        }
    }

    /// Add an actor with its scripts. Actors must be added in index order;
    /// the first one is the hero.
    pub fn add_actor(
        &mut self,
        props: ActorProps,
        life: Vec<Command<LifeOp>>,
        moves: Vec<Command<MoveOp>>,
    ) -> usize {
        let index = self.actors.len();
        debug_assert_eq!(props.index, index, "actors must be added in order");
        self.actors.push(Actor::new(props));
        self.life_scripts.push(Script::new(life, ScriptState::life()));
        self.move_scripts.push(Script::new(moves, ScriptState::moves()));
        index
    }

    pub fn hero(&self) -> &Actor {
        &self.actors[0]
    }

    pub fn hero_mut(&mut self) -> &mut Actor {
        &mut self.actors[0]
    }

    pub fn variable(&self, index: usize) -> i32 {
        self.variables.get(index).copied().unwrap_or(0)
    }

    pub fn set_variable(&mut self, index: usize, value: i32) {
        if let Some(var) = self.variables.get_mut(index) {
            *var = value;
        } else {
            log::warn!("scene variable {} out of range", index);
        }
    }

    /// Reserve an index for a new extra.
    pub fn next_extra_index(&mut self) -> usize {
        let index = self.extra_counter;
        self.extra_counter += 1;
        index
    }

    pub fn add_extra(&mut self, extra: Extra) {
        self.extras.push(extra);
    }

    /// First uncollected key pickup, if any. The magic ball homes to it.
    pub fn first_key(&self) -> Option<&Extra> {
        self.extras
            .iter()
            .find(|e| e.sprite_index == sprite::KEY && !e.is_dead)
    }

    /// Install the hero carried over from the previous scene at the
    /// teleport's landing spot.
    pub fn adopt_hero(&mut self, mut hero: Actor, position: Vec3, angle_delta: f32) {
        let angle = hero.physics.temp.angle + angle_delta;
        hero.physics.position = position;
        hero.physics.temp.position = Vec3::ZERO;
        hero.physics.temp.destination = None;
        hero.set_angle_now(angle);
        hero.state.is_colliding = false;
        hero.state.is_stuck = false;
        hero.state.has_collided_with_actor = -1;
        if self.actors.is_empty() {
            self.actors.push(hero);
            self.life_scripts.push(Script::empty(ScriptState::life()));
            self.move_scripts.push(Script::empty(ScriptState::moves()));
        } else {
            self.actors[0] = hero;
        }
    }

    /// Restore every actor to its scene-data baseline and re-arm all
    /// scripts, clearing transient entities. Used when the hero dies and
    /// the scene restarts.
    pub fn reset(&mut self) {
        for (index, actor) in self.actors.iter_mut().enumerate() {
            actor.reset();
            self.life_scripts[index].restart(false);
            self.move_scripts[index].restart(true);
            self.move_scripts[index].state.track_index = -1;
        }
        self.extras.clear();
        self.magic_ball = None;
        self.zone_text_open = false;
    }

    /// Bring a killed actor back: revive flags and re-arm both scripts.
    pub fn revive_actor(&mut self, index: usize) {
        let Some(actor) = self.actors.get_mut(index) else {
            return;
        };
        actor.state.is_dead = false;
        actor.state.is_visible = true;
        self.life_scripts[index].restart(false);
        self.move_scripts[index].restart(true);
        self.move_scripts[index].state.track_index = -1;
    }
}
