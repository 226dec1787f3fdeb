pub mod game;
pub mod types;

pub use game::{Engine, EngineConfig};
pub use types::{FrameOutput, GameEvent, SoundEvent};
