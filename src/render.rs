//! Draw-call emission.
//!
//! The game never touches a graphics API. Each frame it walks the visible
//! state and emits image, rectangle and text calls in screen space against a
//! [`RenderSink`]; whatever sits behind the sink does the actual drawing.

use glam::Vec2;
use hecs::Entity;

use crate::camera::Camera;
use crate::components::{Animator, Chest, GroundItem, Health, PlayerData, Position, Transform};
use crate::constants::*;
use crate::dialog::DialogQueue;
use crate::level::Level;
use crate::tile::{SpriteRef, SpriteSheet};
use crate::vfx::VfxManager;

/// RGBA fill, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Fill {
    pub const BLACK: Fill = Fill::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Fill = Fill::rgba(1.0, 1.0, 1.0, 1.0);
    pub const RED: Fill = Fill::rgba(0.8, 0.1, 0.1, 1.0);
    pub const GREEN: Fill = Fill::rgba(0.2, 0.8, 0.2, 1.0);
    pub const GOLD: Fill = Fill::rgba(1.0, 0.85, 0.2, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Consumer of draw calls. Positions are screen pixels of the top-left corner
/// (images are centered on `position`).
pub trait RenderSink {
    fn draw_image(&mut self, position: Vec2, sprite: SpriteRef);
    fn draw_rect(&mut self, position: Vec2, size: Vec2, fill: Fill);
    fn draw_text(&mut self, position: Vec2, text: &str, fill: Fill);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Image { position: Vec2, sprite: SpriteRef },
    Rect { position: Vec2, size: Vec2, fill: Fill },
    Text { position: Vec2, text: String, fill: Fill },
}

/// Sink that keeps every call, for headless runs and tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<DrawCall>,
}

impl RecordingSink {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &SpriteRef> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Image { sprite, .. } => Some(sprite),
            _ => None,
        })
    }
}

impl RenderSink for RecordingSink {
    fn draw_image(&mut self, position: Vec2, sprite: SpriteRef) {
        self.calls.push(DrawCall::Image { position, sprite });
    }

    fn draw_rect(&mut self, position: Vec2, size: Vec2, fill: Fill) {
        self.calls.push(DrawCall::Rect { position, size, fill });
    }

    fn draw_text(&mut self, position: Vec2, text: &str, fill: Fill) {
        self.calls.push(DrawCall::Text {
            position,
            text: text.to_string(),
            fill,
        });
    }
}

/// Everything one frame needs to draw
pub struct FrameView<'a> {
    pub level: &'a Level,
    pub player: Entity,
    pub camera: &'a Camera,
    pub vfx: &'a VfxManager,
    pub dialogs: &'a DialogQueue,
    pub game_over: bool,
}

pub fn render_frame(view: &FrameView, sink: &mut dyn RenderSink) {
    puffin::profile_function!();

    render_tiles(view, sink);
    render_entities(view, sink);
    render_effects(view, sink);
    render_hud(view, sink);
}

fn tile_rect(camera: &Camera, center: Vec2) -> (Vec2, Vec2) {
    let size = Vec2::splat(TILE_SIZE * camera.zoom);
    (camera.world_to_screen(center) - size / 2.0, size)
}

fn render_tiles(view: &FrameView, sink: &mut dyn RenderSink) {
    let FrameView { level, camera, .. } = view;
    let (min_x, max_x, min_y, max_y) = camera.visible_tile_bounds();

    for y in min_y.max(0)..=max_y.min(level.grid.height - 1) {
        for x in min_x.max(0)..=max_x.min(level.grid.width - 1) {
            let Some(tile) = level.grid.get(x, y) else {
                continue;
            };
            if !tile.revealed {
                continue;
            }
            let center = crate::geometry::tile_to_pixel((x, y));
            let screen = camera.world_to_screen(center);
            if let Some(sprite) = tile.kind.sprite() {
                sink.draw_image(screen, sprite);
            }
            if let Some(overlay) = tile.overlay {
                sink.draw_image(screen, overlay.sprite());
            }
            if !tile.visible {
                let fog = if tile.kind.is_pit() { PIT_FOG_ALPHA } else { FOG_ALPHA };
                let (corner, size) = tile_rect(camera, center);
                sink.draw_rect(corner, size, Fill::BLACK.with_alpha(fog));
            }
        }
    }
}

fn render_entities(view: &FrameView, sink: &mut dyn RenderSink) {
    let FrameView { level, camera, player, .. } = view;
    let world = &level.world;

    for (_, (position, transform, item)) in world.query::<(&Position, &Transform, &GroundItem)>().iter() {
        if !item.collected && level.is_visible(position.coord()) {
            sink.draw_image(camera.world_to_screen(transform.position), item.kind.sprite());
        }
    }

    for (_, (position, transform, chest)) in world.query::<(&Position, &Transform, &Chest)>().iter() {
        if level.grid.get(position.x, position.y).is_some_and(|tile| tile.revealed) {
            let col = chest.tier.saturating_sub(1).min(1) as u8;
            let row = if chest.opened { 1 } else { 0 };
            let mut sprite = SpriteRef::new(SpriteSheet::Items, col, row);
            sprite.scale = transform.scale;
            sink.draw_image(camera.world_to_screen(transform.position), sprite);
        }
    }

    for (entity, (position, transform, animator, health)) in
        world.query::<(&Position, &Transform, &Animator, &Health)>().iter()
    {
        let is_player = entity == *player;
        if !is_player && !level.is_visible(position.coord()) {
            continue;
        }
        let screen = camera.world_to_screen(transform.position);
        sink.draw_image(screen, animator.sprite(transform));
        if health.current < health.max && !is_player {
            let width = TILE_SIZE * camera.zoom;
            let corner = screen - Vec2::new(width / 2.0, width / 2.0 + 4.0);
            sink.draw_rect(corner, Vec2::new(width, 3.0), Fill::RED);
            sink.draw_rect(corner, Vec2::new(width * health.percentage(), 3.0), Fill::GREEN);
        }
    }
}

fn render_effects(view: &FrameView, sink: &mut dyn RenderSink) {
    let FrameView { camera, vfx, .. } = view;
    for effect in &vfx.effects {
        let alpha = effect.alpha();
        if effect.is_screen_space() {
            if let Some(label) = effect.label() {
                let position = Vec2::new(camera.viewport_width / 2.0, camera.viewport_height / 4.0);
                sink.draw_text(position, &label, Fill::WHITE.with_alpha(alpha));
            }
            continue;
        }
        let screen = camera.world_to_screen(effect.draw_position());
        match (&effect.effect_type, effect.label()) {
            (crate::vfx::EffectType::DeathFade { sprite }, _) => {
                let mut sprite = *sprite;
                sprite.alpha *= alpha;
                sink.draw_image(screen, sprite);
            }
            (crate::vfx::EffectType::WaitParticle, _) => {
                let size = Vec2::splat(4.0 * camera.zoom);
                sink.draw_rect(screen - Vec2::new(0.0, TILE_SIZE * camera.zoom * 0.5), size, Fill::WHITE.with_alpha(alpha));
            }
            (crate::vfx::EffectType::DamageNumber { .. }, Some(label)) => {
                sink.draw_text(screen, &label, Fill::RED.with_alpha(alpha));
            }
            (_, Some(label)) => sink.draw_text(screen, &label, Fill::GOLD.with_alpha(alpha)),
            (_, None) => {}
        }
    }
}

fn render_hud(view: &FrameView, sink: &mut dyn RenderSink) {
    let FrameView {
        level,
        player,
        camera,
        dialogs,
        game_over,
        ..
    } = view;
    let world = &level.world;

    if let Ok(health) = world.get::<&Health>(*player) {
        let bar = Vec2::new(160.0, 12.0);
        sink.draw_rect(Vec2::new(8.0, 8.0), bar, Fill::RED);
        sink.draw_rect(Vec2::new(8.0, 8.0), Vec2::new(bar.x * health.percentage(), bar.y), Fill::GREEN);
        sink.draw_text(Vec2::new(8.0, 24.0), &format!("HP {}/{}", health.current, health.max), Fill::WHITE);
    }
    if let Ok(data) = world.get::<&PlayerData>(*player) {
        sink.draw_text(
            Vec2::new(8.0, 40.0),
            &format!("XP {}/{}  SP {}", data.xp, XP_PER_SKILL_POINT, data.skill_points),
            Fill::WHITE,
        );
    }
    sink.draw_text(
        Vec2::new(camera.viewport_width - 200.0, 8.0),
        &format!("{} {}", level.zone.name(), level.floor),
        Fill::WHITE,
    );

    if let Some(dialog) = dialogs.front() {
        let corner = Vec2::new(16.0, camera.viewport_height - 96.0);
        sink.draw_rect(corner, Vec2::new(camera.viewport_width - 32.0, 80.0), Fill::BLACK.with_alpha(0.8));
        let line = if dialog.thought {
            format!("{} ({})", dialog.speaker, dialog.text)
        } else {
            format!("{}: {}", dialog.speaker, dialog.text)
        };
        sink.draw_text(corner + Vec2::new(12.0, 16.0), &line, Fill::WHITE);
    }

    if *game_over {
        let center = Vec2::new(camera.viewport_width, camera.viewport_height) / 2.0;
        sink.draw_text(center, "Game Over", Fill::RED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::Dialog;
    use crate::geometry::tile_to_pixel;
    use crate::tile::TileKind;

    fn lit_level() -> (Level, Entity) {
        let mut level = Level::new(1, VISION_RANGE);
        for y in 1..12 {
            for x in 1..12 {
                level.grid.set_kind(x, y, TileKind::floor());
            }
        }
        let player = level.add_player((5, 5), None);
        level.reshade((5, 5));
        (level, player)
    }

    #[test]
    fn test_frame_draws_tiles_player_and_hud() {
        let (level, player) = lit_level();
        let mut camera = Camera::new(640.0, 480.0, false);
        camera.center_on(tile_to_pixel((5, 5)));
        let vfx = VfxManager::new();
        let mut dialogs = DialogQueue::new();
        dialogs.push(Dialog::say("Minnie", "Wake up!"));
        let view = FrameView {
            level: &level,
            player,
            camera: &camera,
            vfx: &vfx,
            dialogs: &dialogs,
            game_over: false,
        };
        let mut sink = RecordingSink::default();
        render_frame(&view, &mut sink);

        assert!(sink.images().any(|s| s.sheet == SpriteSheet::Dirt));
        assert!(sink.images().any(|s| s.sheet == SpriteSheet::Marshall));
        assert!(sink.texts().any(|t| t == "HP 20/20"));
        assert!(sink.texts().any(|t| t == "Minnie: Wake up!"));
    }

    #[test]
    fn test_unrevealed_tiles_are_not_drawn() {
        let level = Level::new(1, VISION_RANGE);
        let player = Entity::DANGLING;
        let camera = Camera::new(640.0, 480.0, false);
        let vfx = VfxManager::new();
        let dialogs = DialogQueue::new();
        let view = FrameView {
            level: &level,
            player,
            camera: &camera,
            vfx: &vfx,
            dialogs: &dialogs,
            game_over: true,
        };
        let mut sink = RecordingSink::default();
        render_frame(&view, &mut sink);
        assert_eq!(sink.images().count(), 0);
        assert!(sink.texts().any(|t| t == "Game Over"));
    }
}
