//! Tuning numbers for the burrows, one submodule per concern. Everything is
//! re-exported flat so callers just `use crate::constants::*`.

mod animation;
mod camera;
mod combat;
mod dungeon;
mod gameplay;
mod time;

pub use animation::*;
pub use camera::*;
pub use combat::*;
pub use dungeon::*;
pub use gameplay::*;
pub use time::*;
