pub mod animation;
pub mod extras;
pub mod frame;
pub mod magic_ball;
pub mod movement;
pub mod zones;

// Re-export the frame entry point for hosts driving the loop themselves.
pub use frame::update_scene;
