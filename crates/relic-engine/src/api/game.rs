//! The host-facing facade: owns the game state, the active scene and the
//! fixed-step loop that drives the simulation.
//!
//! The host (renderer, audio, scene manager) feeds controls in, calls
//! [`Engine::advance`] once per rendered frame and drains the returned
//! [`FrameOutput`]. Everything the simulation wants from the outside world
//! comes back as events; the core never calls out.

use crate::api::types::FrameOutput;
use crate::components::animation::AnimationLibrary;
use crate::core::game::{ControlsState, GameState};
use crate::core::geometry::SceneGeometry;
use crate::core::scene::Scene;
use crate::core::time::{FixedTimestep, Time};
use crate::systems::{frame, magic_ball};

/// Engine configuration, provided by the host once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Seed for the gameplay random stream.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            seed: 0,
        }
    }
}

pub struct Engine {
    pub game: GameState,
    pub scene: Scene,
    pub library: AnimationLibrary,
    timestep: FixedTimestep,
    time: Time,
    output: FrameOutput,
    throw_queued: bool,
}

impl Engine {
    pub fn new(scene: Scene, library: AnimationLibrary) -> Self {
        Self::with_config(EngineConfig::default(), scene, library)
    }

    pub fn with_config(config: EngineConfig, scene: Scene, library: AnimationLibrary) -> Self {
        Self {
            game: GameState::with_seed(config.seed),
            scene,
            library,
            timestep: FixedTimestep::new(config.fixed_dt),
            time: Time::default(),
            output: FrameOutput::new(),
            throw_queued: false,
        }
    }

    /// Latest input snapshot; applies to every tick until replaced.
    pub fn set_controls(&mut self, controls: ControlsState) {
        self.game.controls = controls;
    }

    /// Ask the hero to throw the magic ball at the start of the next tick.
    pub fn queue_magic_ball_throw(&mut self) {
        self.throw_queued = true;
    }

    /// The player dismissed the open text box.
    pub fn dismiss_text(&mut self) {
        self.game.dismiss_text();
    }

    /// Run as many fixed ticks as `frame_dt` covers and return everything
    /// the host should play and react to. The output is only valid until
    /// the next call.
    pub fn advance(&mut self, frame_dt: f32, geometry: &dyn SceneGeometry) -> &FrameOutput {
        self.output.clear();
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.time.step(self.timestep.dt());
            if self.throw_queued {
                self.throw_queued = false;
                magic_ball::throw_magic_ball(&mut self.scene, &mut self.game, &mut self.output);
            }
            frame::update_scene(
                &mut self.scene,
                &mut self.game,
                &self.library,
                &mut self.output,
                geometry,
                self.time,
            );
        }
        &self.output
    }

    pub fn output(&self) -> &FrameOutput {
        &self.output
    }

    pub fn time(&self) -> Time {
        self.time
    }

    /// Render interpolation factor between the last two ticks.
    pub fn alpha(&self) -> f32 {
        self.timestep.alpha()
    }

    /// Serialize the persistent game state, including the hero's position
    /// and animation playback when the scene has one.
    pub fn save(&mut self) -> serde_json::Result<String> {
        self.game.save(self.scene.actors.first())
    }

    /// Restore a save produced by [`save`](Self::save) into the current
    /// scene's hero, if the scene has one.
    pub fn load(&mut self, data: &str) -> serde_json::Result<()> {
        self.game.load(data, self.scene.actors.first_mut())
    }
}
