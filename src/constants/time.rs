//! Turn and frame timing constants.

/// Real-time frame interval of the update loop (milliseconds)
pub const FRAME_MS: u64 = 16;
/// Frame delta in seconds, used to age animators and effects
pub const FRAME_DT: f32 = FRAME_MS as f32 / 1000.0;

/// Frames a movement animation lasts
pub const MOVE_FRAMES: u32 = 15;
/// Frames a melee animation lasts
pub const MELEE_FRAMES: u32 = 15;
/// Remaining-frame count at which melee damage lands
pub const MELEE_IMPACT_FRAME: u32 = 10;
/// Remaining-frame count at which the lunge has fully retreated
pub const MELEE_RECOVER_FRAME: u32 = 4;
/// Frames a shove animation lasts
pub const SHOVE_FRAMES: u32 = 15;
/// Remaining-frame count at which a shoved target commits or bounces
pub const SHOVE_DECISION_FRAME: u32 = 8;
/// Frames a wait lasts
pub const WAIT_FRAMES: u32 = 15;
/// Frames an NPC interaction lasts
pub const INTERACTION_FRAMES: u32 = 1;
/// Frames an item pickup or use lasts
pub const ITEM_FRAMES: u32 = 10;
/// Frames a chest takes to open
pub const CHEST_FRAMES: u32 = 15;
/// Remaining-frame count at which the chest lid pops
pub const CHEST_OPEN_FRAME: u32 = 8;
/// Frames of the shrink/spin/fade fall animation
pub const FALL_FRAMES: u32 = 30;

/// Turn cost of waiting
pub const WAIT_TURNS: f64 = 1.0;
/// Turn cost of talking to an NPC
pub const INTERACTION_TURNS: f64 = 0.0;
/// Turn cost of picking up an item
pub const ITEM_COLLECT_TURNS: f64 = 0.5;
/// Turn cost of using an inventory item
pub const ITEM_USE_TURNS: f64 = 1.0;
/// Turn cost of opening a chest
pub const CHEST_OPEN_TURNS: f64 = 1.0;
