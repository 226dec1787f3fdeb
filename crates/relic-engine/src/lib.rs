pub mod api;
pub mod core;
pub mod components;
pub mod scripting;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::game::{Engine, EngineConfig};
pub use api::types::{sample, FrameOutput, GameEvent, SoundEvent};
pub use components::actor::{Actor, ActorFlags, ActorProps, ActorState, DirMode};
pub use components::animation::{
    anim, AnimCompletion, AnimState, Animation, AnimationLibrary, BoneFrame, Keyframe,
};
pub use components::extra::{Extra, ExtraFlags};
pub use components::magic_ball::MagicBall;
pub use components::skeleton::{Bone, BonePalette, Skeleton};
pub use components::zone::{CameraPose, RawZone, Zone, ZoneKind};
pub use core::game::{behaviour, ControlsState, GameState, HeroState, Rng};
pub use core::geometry::{Aabb, Contact, FlatGround, SceneGeometry, WORLD_SCALE, WORLD_SIZE};
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, Time};
pub use scripting::{Command, Condition, ConditionKind, LifeOp, MoveOp, Operator, Script, ScriptState};
pub use systems::frame::update_scene;
