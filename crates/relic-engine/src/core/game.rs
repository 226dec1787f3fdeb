//! Game-wide state: the hero's stats, inventory counters, story flags and
//! the controls snapshot the host feeds in every frame.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::actor::Actor;
use crate::components::animation::AnimState;

pub const MAX_LIFE: i32 = 255;
const INITIAL_LIFE: i32 = 200;
const MAGICBALL_MAX_BOUNCES: u32 = 4;

const NUM_QUEST_FLAGS: usize = 256;
const NUM_HOLOMAP_FLAGS: usize = 512;

/// Hero stance ids. Scripts compare against these directly.
pub mod behaviour {
    pub const NORMAL: u8 = 0;
    pub const ATHLETIC: u8 = 1;
    pub const AGGRESSIVE: u8 = 2;
    pub const DISCRETE: u8 = 3;
    pub const PROTOPACK: u8 = 4;
    pub const JETPACK: u8 = 8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloverState {
    pub leafs: i32,
    pub boxes: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicBallState {
    pub level: u32,
    pub strength: i32,
    pub max_bounces: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroState {
    pub behaviour: u8,
    pub prev_behaviour: u8,
    pub life: i32,
    pub money: i32,
    pub magic: i32,
    pub keys: i32,
    pub fuel: i32,
    pub clover: CloverState,
    pub magicball: MagicBallState,
    pub hand_strength: i32,
    /// Mirrored from the hero actor on save.
    pub position: Vec3,
    /// Animation playback snapshot taken on save, merged back on load.
    pub anim_snapshot: Option<AnimState>,
}

impl HeroState {
    pub fn new() -> Self {
        Self {
            behaviour: behaviour::NORMAL,
            prev_behaviour: behaviour::NORMAL,
            life: INITIAL_LIFE,
            money: 0,
            magic: 0,
            keys: 0,
            fuel: 0,
            clover: CloverState { leafs: 1, boxes: 2 },
            magicball: MagicBallState::default(),
            hand_strength: 5,
            position: Vec3::ZERO,
            anim_snapshot: None,
        }
    }

    /// Magic points cap grows with the ball level.
    pub fn max_magic(&self) -> i32 {
        (self.magicball.level as i32 + 1) * 20
    }
}

impl Default for HeroState {
    fn default() -> Self {
        Self::new()
    }
}

/// The host's per-frame input snapshot. Never serialized: a loaded save
/// starts from whatever the controller currently reports.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlsState {
    /// Left-stick style movement vector, each axis in [-1, 1].
    pub control_vector: Vec2,
    pub action: bool,
    pub first_person: bool,
}

/// Deterministic xorshift generator for gameplay rolls.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9e3779b97f4a7c15 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Uniform pick in `0..n`. Returns 0 for n == 0.
    pub fn roll(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.next_u32() as usize % n
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub hero: HeroState,
    /// Index of the actor currently talking, -1 when nobody is.
    pub actor_talking: i32,
    pub chapter: i32,
    pub quest_flags: Vec<i32>,
    pub holomap_flags: Vec<i32>,
    #[serde(skip)]
    pub controls: ControlsState,
    #[serde(skip)]
    pub rng: Rng,
}

impl GameState {
    pub fn new() -> Self {
        let mut state = Self {
            hero: HeroState::new(),
            actor_talking: -1,
            chapter: 0,
            quest_flags: vec![0; NUM_QUEST_FLAGS],
            holomap_flags: vec![0; NUM_HOLOMAP_FLAGS],
            controls: ControlsState::default(),
            rng: Rng::default(),
        };
        state.set_magic_ball_level(1);
        state
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut state = Self::new();
        state.rng = Rng::new(seed);
        state
    }

    pub fn quest_flag(&self, index: usize) -> i32 {
        self.quest_flags.get(index).copied().unwrap_or(0)
    }

    pub fn set_quest_flag(&mut self, index: usize, value: i32) {
        if let Some(flag) = self.quest_flags.get_mut(index) {
            *flag = value;
        } else {
            log::warn!("quest flag {} out of range", index);
        }
    }

    /// Upgrade (or set) the magic ball, refreshing strength, bounce budget
    /// and the hero's bare-hand damage.
    pub fn set_magic_ball_level(&mut self, level: u32) {
        let (strength, max_bounces, hand_strength) = match level {
            0 => (10, 0, 8),
            1 => (10, MAGICBALL_MAX_BOUNCES, 8),
            2 => (20, MAGICBALL_MAX_BOUNCES, 18),
            3 => (30, MAGICBALL_MAX_BOUNCES, 28),
            _ => (40, MAGICBALL_MAX_BOUNCES, 38),
        };
        self.hero.magicball = MagicBallState {
            level,
            strength,
            max_bounces,
        };
        self.hero.hand_strength = hand_strength;
    }

    /// The host calls this when the player dismisses a text box.
    pub fn dismiss_text(&mut self) {
        self.actor_talking = -1;
    }

    /// Serialize the persistent state. The hero actor's position and
    /// animation playback ride along inside the hero block; with no hero
    /// present the last recorded snapshot is kept.
    pub fn save(&mut self, hero: Option<&Actor>) -> serde_json::Result<String> {
        if let Some(hero) = hero {
            self.hero.position = hero.physics.position;
            self.hero.anim_snapshot = Some(hero.anim_state.clone());
        }
        serde_json::to_string(self)
    }

    /// Restore a save produced by [`save`](Self::save). Controls and the
    /// random stream keep their current values; the hero block is applied
    /// to the actor when one is present.
    pub fn load(&mut self, data: &str, hero: Option<&mut Actor>) -> serde_json::Result<()> {
        let state: GameState = serde_json::from_str(data)?;
        if let Some(hero) = hero {
            hero.physics.position = state.hero.position;
            if let Some(snapshot) = &state.hero.anim_snapshot {
                hero.anim_state.apply_snapshot(snapshot);
            }
        }
        self.hero = state.hero;
        self.actor_talking = state.actor_talking;
        self.chapter = state.chapter;
        self.quest_flags = state.quest_flags;
        self.holomap_flags = state.holomap_flags;
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::actor::ActorProps;

    #[test]
    fn new_game_starts_at_ball_level_one() {
        let state = GameState::new();
        assert_eq!(state.hero.life, 200);
        assert_eq!(state.hero.magicball.level, 1);
        assert_eq!(state.hero.magicball.strength, 10);
        assert_eq!(state.hero.magicball.max_bounces, 4);
    }

    #[test]
    fn ball_level_table() {
        let mut state = GameState::new();
        state.set_magic_ball_level(0);
        assert_eq!(state.hero.magicball.max_bounces, 0);
        assert_eq!(state.hero.hand_strength, 8);
        state.set_magic_ball_level(3);
        assert_eq!(state.hero.magicball.strength, 30);
        assert_eq!(state.hero.hand_strength, 28);
        state.set_magic_ball_level(4);
        assert_eq!(state.hero.magicball.strength, 40);
        assert_eq!(state.hero.max_magic(), 100);
    }

    #[test]
    fn rng_is_deterministic_per_seed() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        assert!(Rng::new(7).roll(5) < 5);
        assert_eq!(Rng::new(7).roll(0), 0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut state = GameState::new();
        state.hero.keys = 3;
        state.hero.money = 150;
        state.set_quest_flag(63, 1);
        state.chapter = 2;

        let mut hero = Actor::new(ActorProps::new(0).at(glam::Vec3::new(4.0, 0.0, 2.0)));
        hero.anim_state.loop_count = 9;
        let save = state.save(Some(&hero)).unwrap();

        let mut restored = GameState::new();
        let mut hero2 = Actor::new(ActorProps::new(0));
        restored.load(&save, Some(&mut hero2)).unwrap();
        assert_eq!(restored.hero.keys, 3);
        assert_eq!(restored.hero.money, 150);
        assert_eq!(restored.quest_flag(63), 1);
        assert_eq!(restored.chapter, 2);
        assert_eq!(hero2.physics.position, glam::Vec3::new(4.0, 0.0, 2.0));
        assert_eq!(hero2.anim_state.loop_count, 9);
    }

    #[test]
    fn dismiss_text_clears_the_talking_actor() {
        let mut state = GameState::new();
        state.actor_talking = 2;
        state.dismiss_text();
        assert_eq!(state.actor_talking, -1);
    }
}
