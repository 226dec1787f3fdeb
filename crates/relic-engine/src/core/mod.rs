pub mod game;
pub mod geometry;
pub mod scene;
pub mod time;
