//! Molehole: a turn-based roguelike about a young mole digging through
//! generated burrows.
//!
//! The crate is headless. A shell feeds input through [`input::InputSource`],
//! calls [`engine::GameSession::update`] every frame and draws whatever
//! [`engine::GameSession::render`] emits into a [`render::RenderSink`].

pub mod actions;
pub mod camera;
pub mod components;
pub mod config;
pub mod constants;
pub mod dialog;
pub mod dungeon_gen;
pub mod engine;
pub mod error;
pub mod events;
pub mod fov;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod items;
pub mod level;
pub mod pathfinding;
pub mod render;
pub mod rooms;
pub mod spawning;
pub mod systems;
pub mod tile;
pub mod time_system;
pub mod vfx;

pub use config::GameConfig;
pub use engine::{GamePhase, GameSession};
pub use error::{GameError, GameResult};
