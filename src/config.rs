//! Session configuration.
//!
//! Every field has a default so a partial JSON document is enough to
//! override a single knob.

use serde::{Deserialize, Serialize};

use crate::constants::{FRAME_MS, PATH_MAX_EXPANSIONS, VISION_RANGE};
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Seed for level generation and runtime rolls
    pub seed: u64,
    /// Floor the session starts on
    pub starting_floor: u32,
    /// Sight radius in tiles
    pub vision_range: i32,
    /// Node expansion budget for live pathfinding
    pub path_max_expansions: usize,
    /// Frame interval of the update loop
    pub frame_ms: u64,
    /// Start with a free camera instead of following the player
    pub freecam: bool,
    /// Viewport size in pixels
    pub viewport: [f32; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x6d6f_6c65,
            starting_floor: 0,
            vision_range: VISION_RANGE,
            path_max_expansions: PATH_MAX_EXPANSIONS,
            frame_ms: FRAME_MS,
            freecam: false,
            viewport: [960.0, 640.0],
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config document
    pub fn from_json(text: &str) -> GameResult<Self> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> GameResult<()> {
        if self.vision_range < 1 {
            return Err(GameError::InvalidConfig(format!(
                "vision range must be at least 1, got {}",
                self.vision_range
            )));
        }
        if self.path_max_expansions == 0 {
            return Err(GameError::InvalidConfig(
                "path expansion budget must be positive".to_string(),
            ));
        }
        if self.frame_ms == 0 {
            return Err(GameError::InvalidConfig("frame interval must be positive".to_string()));
        }
        if self.viewport.iter().any(|side| *side <= 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "viewport must be positive, got {:?}",
                self.viewport
            )));
        }
        Ok(())
    }
}
