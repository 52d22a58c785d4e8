//! Visual effects system for one-shot animations (damage numbers, particles, etc.)
//!
//! These are separate from entity state - they're spawned from game events,
//! aged every frame, and removed without affecting game logic.

use glam::Vec2;

use crate::constants::*;
use crate::events::GameEvent;
use crate::items::ItemKind;
use crate::tile::SpriteRef;

/// A one-shot visual effect
#[derive(Debug, Clone)]
pub struct VisualEffect {
    /// World pixel position (ignored for screen-space effects)
    pub position: Vec2,
    pub effect_type: EffectType,
    pub timer: f32,    // Time remaining
    pub duration: f32, // Total duration (for progress calculation)
}

impl VisualEffect {
    pub fn new(position: Vec2, effect_type: EffectType) -> Self {
        let duration = effect_type.duration();
        Self {
            position,
            effect_type,
            timer: duration,
            duration,
        }
    }

    /// Progress from 0.0 (just started) to 1.0 (finished)
    pub fn progress(&self) -> f32 {
        1.0 - (self.timer / self.duration)
    }

    /// Returns true if effect is finished and should be removed
    pub fn is_finished(&self) -> bool {
        self.timer <= 0.0
    }

    /// Update the effect, returns true if still alive
    pub fn update(&mut self, dt: f32) -> bool {
        self.timer -= dt;
        !self.is_finished()
    }

    /// Where to draw this frame; rising text drifts upward as it ages
    pub fn draw_position(&self) -> Vec2 {
        match self.effect_type {
            EffectType::DamageNumber { .. }
            | EffectType::XpPopup { .. }
            | EffectType::SkillPointPopup { .. }
            | EffectType::PickupText { .. } => {
                self.position - Vec2::new(0.0, DAMAGE_NUMBER_RISE * TILE_SIZE * self.progress())
            }
            _ => self.position,
        }
    }

    /// Fades out over the effect's life
    pub fn alpha(&self) -> f32 {
        (1.0 - self.progress()).clamp(0.0, 1.0)
    }

    pub fn is_screen_space(&self) -> bool {
        matches!(self.effect_type, EffectType::LevelBanner { .. })
    }

    /// Text drawn for text effects
    pub fn label(&self) -> Option<String> {
        match &self.effect_type {
            EffectType::DamageNumber { amount, surprise: true } => Some(format!("{}!", amount)),
            EffectType::DamageNumber { amount, surprise: false } => Some(amount.to_string()),
            EffectType::XpPopup { amount } => Some(format!("+{} xp", amount)),
            EffectType::SkillPointPopup { points } => Some(format!("+{} skill", points)),
            EffectType::PickupText { kind } => Some(kind.name().to_string()),
            EffectType::LevelBanner { floor, zone } => Some(format!("{} - Floor {}", zone, floor)),
            EffectType::WaitParticle | EffectType::DeathFade { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum EffectType {
    /// Damage dealt, floating up from the target
    DamageNumber { amount: i32, surprise: bool },
    /// Little "z" puff over an entity passing its turn
    WaitParticle,
    /// Last sprite of a dead entity, fading out
    DeathFade { sprite: SpriteRef },
    XpPopup { amount: u32 },
    SkillPointPopup { points: u32 },
    PickupText { kind: ItemKind },
    /// Zone and floor name shown on entering a level
    LevelBanner { floor: u32, zone: &'static str },
}

impl EffectType {
    pub fn duration(&self) -> f32 {
        match self {
            EffectType::DamageNumber { .. } => DAMAGE_NUMBER_DURATION,
            EffectType::WaitParticle => WAIT_PARTICLE_DURATION,
            EffectType::DeathFade { .. } => DEATH_FADE_DURATION,
            EffectType::XpPopup { .. } | EffectType::SkillPointPopup { .. } | EffectType::PickupText { .. } => {
                POPUP_DURATION
            }
            EffectType::LevelBanner { .. } => LEVEL_BANNER_DURATION,
        }
    }
}

/// Manager for all active visual effects
#[derive(Debug, Default)]
pub struct VfxManager {
    pub effects: Vec<VisualEffect>,
}

impl VfxManager {
    pub fn new() -> Self {
        Self { effects: Vec::new() }
    }

    /// Spawn a new effect
    pub fn spawn(&mut self, position: Vec2, effect_type: EffectType) {
        self.effects.push(VisualEffect::new(position, effect_type));
    }

    /// Update all effects, removing finished ones
    pub fn update(&mut self, dt: f32) {
        self.effects.retain_mut(|effect| effect.update(dt));
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Handle a game event, spawning appropriate VFX. Player-centric popups
    /// (xp, skill points) are anchored at `player_position`.
    pub fn handle_event(&mut self, event: &GameEvent, player_position: Vec2) {
        match event {
            GameEvent::AttackHit { position, damage, surprise, .. } => {
                self.spawn(
                    *position,
                    EffectType::DamageNumber {
                        amount: *damage,
                        surprise: *surprise,
                    },
                );
            }
            GameEvent::Waited { position, .. } => {
                self.spawn(*position, EffectType::WaitParticle);
            }
            GameEvent::EntityDied { position, sprite, .. } => {
                self.spawn(*position, EffectType::DeathFade { sprite: *sprite });
            }
            GameEvent::XpGained { amount } => {
                self.spawn(player_position, EffectType::XpPopup { amount: *amount });
            }
            GameEvent::SkillPointsGained { points } => {
                self.spawn(player_position, EffectType::SkillPointPopup { points: *points });
            }
            GameEvent::ItemCollected { kind, position } => {
                self.spawn(*position, EffectType::PickupText { kind: *kind });
            }
            GameEvent::LevelEntered { floor, zone } => {
                self.spawn(Vec2::ZERO, EffectType::LevelBanner { floor: *floor, zone: *zone });
            }
            _ => {}
        }
    }
}
