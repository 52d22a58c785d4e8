//! Combat system constants.

/// Lower bound of the melee damage roll, as a fraction of base damage
pub const DAMAGE_MIN_MULT: f32 = 0.6;
/// Upper bound of the melee damage roll, as a fraction of base damage
pub const DAMAGE_MAX_MULT: f32 = 1.4;
/// Damage multiplier for a surprise attack
pub const SURPRISE_MULTIPLIER: f32 = 1.5;
/// One in this many slain enemies drops loot
pub const ENEMY_LOOT_ODDS: u32 = 6;
/// A spiderling shoves instead of biting one time in this many
pub const SPIDERLING_SHOVE_ODDS: u32 = 4;
