use glam::Vec3;

/// Sample ids for the sound effects the simulation itself triggers.
/// Scene scripts refer to arbitrary sample ids beyond these.
pub mod sample {
    pub const MAGIC_BALL_THROW: u32 = 240;
    pub const MAGIC_BALL_BOUNCE: u32 = 241;
    pub const MAGIC_BALL_STOP: u32 = 242;
    pub const FIRE_BALL_THROW: u32 = 243;
    pub const BONUS_FOUND: u32 = 244;
    pub const BONUS_COLLECTED: u32 = 245;
    pub const HERO_LANDING: u32 = 246;
}

/// A sound event emitted by the game logic. The host's audio layer decides
/// how to mix and spatialize it; `actor` is -1 for non-positional sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundEvent {
    pub sample: u32,
    pub frequency: u16,
    pub loop_count: i32,
    pub actor: i32,
}

impl SoundEvent {
    pub fn new(sample: u32, actor: i32) -> Self {
        Self {
            sample,
            frequency: 0x1000,
            loop_count: 0,
            actor,
        }
    }

    pub fn with_frequency(mut self, frequency: u16) -> Self {
        self.frequency = frequency;
        self
    }
}

/// Events communicated from the simulation to the host (UI, scene manager,
/// camera). The core never acts on these itself.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The hero entered an enabled teleport zone. The host is expected to
    /// load the target scene and call `Scene::adopt_hero`.
    SceneTransition {
        scene: usize,
        position: Vec3,
        angle_delta: f32,
    },
    /// The hero walked off the edge of an island scene. The host decides
    /// which neighbouring scene (if any) the position falls into.
    LeftSceneBounds { position: Vec3 },
    /// A text box should be shown. Dismissal comes back through
    /// `GameState::dismiss_text`.
    Text { actor: usize, text: usize, color: u8 },
    /// Short floating label (bonus amounts). The UI removes it after
    /// `ttl_ms`; the core does no bookkeeping past emission.
    Interjection {
        id: String,
        value: i32,
        ttl_ms: u32,
    },
    /// The hero entered an enabled camera zone.
    CameraOverride { zone: usize, force: bool },
    /// The hero ran out of life.
    GameOver,
}

/// Everything one frame of simulation wants the host to do.
#[derive(Debug, Default)]
pub struct FrameOutput {
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
}

impl FrameOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play_sample(&mut self, sample: u32, actor: i32) {
        self.sounds.push(SoundEvent::new(sample, actor));
    }

    pub fn push_sound(&mut self, sound: SoundEvent) {
        self.sounds.push(sound);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }
}
