//! Animation and presentation constants.

/// Pixel size of one tile
pub const TILE_SIZE: f32 = 32.0;
/// Seconds per frame of the idle cycle
pub const IDLE_FRAME_TIME: f32 = 0.2;
/// Seconds per frame of the walk cycle
pub const MOVE_FRAME_TIME: f32 = 0.1;
/// Seconds per frame of the attack cycle
pub const ATTACK_FRAME_TIME: f32 = 0.2;
/// Per-frame lunge distance as a fraction of a tile
pub const LUNGE_STEP: f32 = TILE_SIZE / 10.0;
/// Degrees a falling sprite spins per frame
pub const FALL_SPIN_PER_FRAME: f32 = 12.0;
/// Darkness applied to revealed floor and wall tiles outside sight
pub const FOG_ALPHA: f32 = 0.5;
/// Darkness applied to revealed pits outside sight
pub const PIT_FOG_ALPHA: f32 = 0.7;
/// Damage number lifetime in seconds
pub const DAMAGE_NUMBER_DURATION: f32 = 0.8;
/// How high damage numbers rise (in tiles)
pub const DAMAGE_NUMBER_RISE: f32 = 1.0;
/// Wait particle lifetime in seconds
pub const WAIT_PARTICLE_DURATION: f32 = 0.4;
/// Death fade lifetime in seconds
pub const DEATH_FADE_DURATION: f32 = 0.6;
/// XP and skill point popup lifetime in seconds
pub const POPUP_DURATION: f32 = 1.2;
/// New level banner lifetime in seconds
pub const LEVEL_BANNER_DURATION: f32 = 2.5;
