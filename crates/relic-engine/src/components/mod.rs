pub mod actor;
pub mod animation;
pub mod extra;
pub mod magic_ball;
pub mod skeleton;
pub mod zone;
