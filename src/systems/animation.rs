//! Animation systems for actor sprites.

use hecs::World;

use crate::components::{Animator, Position};
use crate::grid::Grid;

/// Advance the frame cycle of every actor the player can currently see.
/// Hidden actors keep their frame until they come back into view.
pub fn tick_animators(world: &mut World, grid: &Grid, dt: f32) {
    puffin::profile_function!();
    for (_id, (pos, animator)) in world.query_mut::<(&Position, &mut Animator)>() {
        if grid.is_visible(pos.x, pos.y) {
            animator.tick(dt);
        }
    }
}
