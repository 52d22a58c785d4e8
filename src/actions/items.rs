//! Loot handling: picking up, using and unboxing.

use hecs::Entity;

use super::{with_transform, Action, ActionKind, ActionTimer, TurnContext};
use crate::components::{Chest, GroundItem, PlayerData};
use crate::constants::*;
use crate::events::GameEvent;
use crate::items::ItemKind;
use crate::systems::combat;

/// Pick up everything lying under the actor
#[derive(Debug)]
pub struct ItemCollect {
    actor: Entity,
    items: Vec<Entity>,
    timer: ActionTimer,
    done: bool,
}

impl ItemCollect {
    pub fn new(actor: Entity, items: Vec<Entity>) -> Self {
        Self {
            actor,
            items,
            timer: ActionTimer::new(ITEM_FRAMES),
            done: false,
        }
    }

    fn collect(&mut self, ctx: &mut TurnContext) {
        if self.done {
            return;
        }
        self.done = true;
        let world = &mut ctx.level.world;
        for &item in &self.items {
            let kind = {
                let Ok(mut ground) = world.get::<&mut GroundItem>(item) else {
                    continue;
                };
                if ground.collected {
                    continue;
                }
                ground.collected = true;
                ground.kind
            };
            let position = crate::components::entity_coord(world, item)
                .map(crate::geometry::tile_to_pixel)
                .unwrap_or_default();
            if let Ok(mut data) = world.get::<&mut PlayerData>(self.actor) {
                data.inventory.push(kind);
            }
            ctx.events.push(GameEvent::ItemCollected { kind, position });
        }
    }
}

impl Action for ItemCollect {
    fn kind(&self) -> ActionKind {
        ActionKind::ItemCollect
    }

    fn actor(&self) -> Entity {
        self.actor
    }

    fn turn_increase(&self) -> f64 {
        ITEM_COLLECT_TURNS
    }

    fn timer(&self) -> &ActionTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut ActionTimer {
        &mut self.timer
    }

    fn animate_step(&mut self, ctx: &mut TurnContext) {
        if self.timer.is_last_frame() {
            self.collect(ctx);
        }
    }

    fn apply_immediately(&mut self, ctx: &mut TurnContext) {
        self.collect(ctx);
    }
}

/// Consume or equip an inventory item
#[derive(Debug)]
pub struct ItemUse {
    actor: Entity,
    item: ItemKind,
    timer: ActionTimer,
    done: bool,
}

impl ItemUse {
    pub fn new(actor: Entity, item: ItemKind) -> Self {
        Self {
            actor,
            item,
            timer: ActionTimer::new(ITEM_FRAMES),
            done: false,
        }
    }

    fn use_item(&mut self, ctx: &mut TurnContext) {
        if self.done {
            return;
        }
        self.done = true;
        let world = &mut ctx.level.world;
        let removed = match world.get::<&mut PlayerData>(self.actor) {
            Ok(mut data) => match data.inventory.iter().position(|&kind| kind == self.item) {
                Some(slot) => {
                    data.inventory.remove(slot);
                    true
                }
                None => false,
            },
            Err(_) => false,
        };
        if removed {
            combat::use_item(world, self.actor, self.item);
            ctx.events.push(GameEvent::ItemUsed { kind: self.item });
        }
    }
}

impl Action for ItemUse {
    fn kind(&self) -> ActionKind {
        ActionKind::ItemUse
    }

    fn actor(&self) -> Entity {
        self.actor
    }

    fn turn_increase(&self) -> f64 {
        ITEM_USE_TURNS
    }

    fn timer(&self) -> &ActionTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut ActionTimer {
        &mut self.timer
    }

    fn animate_step(&mut self, ctx: &mut TurnContext) {
        if self.timer.is_last_frame() {
            self.use_item(ctx);
        }
    }

    fn apply_immediately(&mut self, ctx: &mut TurnContext) {
        self.use_item(ctx);
    }
}

/// Open an adjacent chest. The lid pops partway through; the loot drops on
/// the chest's tile during cleanup.
#[derive(Debug)]
pub struct ChestOpen {
    actor: Entity,
    chest: Entity,
    timer: ActionTimer,
    opened: bool,
}

impl ChestOpen {
    pub fn new(actor: Entity, chest: Entity) -> Self {
        Self {
            actor,
            chest,
            timer: ActionTimer::new(CHEST_FRAMES),
            opened: false,
        }
    }

    fn open(&mut self, ctx: &mut TurnContext) {
        if self.opened {
            return;
        }
        self.opened = true;
        let opened_now = match ctx.level.world.get::<&mut Chest>(self.chest) {
            Ok(mut chest) if !chest.opened => {
                chest.opened = true;
                true
            }
            _ => false,
        };
        if opened_now {
            let position = ctx.level.pixel_of(self.chest).unwrap_or_default();
            ctx.events.push(GameEvent::ChestOpened { chest: self.chest, position });
        }
    }
}

impl Action for ChestOpen {
    fn kind(&self) -> ActionKind {
        ActionKind::ChestOpen
    }

    fn actor(&self) -> Entity {
        self.actor
    }

    fn turn_increase(&self) -> f64 {
        CHEST_OPEN_TURNS
    }

    fn timer(&self) -> &ActionTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut ActionTimer {
        &mut self.timer
    }

    fn animate_step(&mut self, ctx: &mut TurnContext) {
        let remaining = self.timer.remaining;
        if remaining == CHEST_OPEN_FRAME {
            self.open(ctx);
        }
        // Swell before the pop, settle after
        let scale = if remaining > CHEST_OPEN_FRAME {
            1.0 + 0.02 * (CHEST_FRAMES - remaining) as f32
        } else {
            1.0
        };
        with_transform(ctx.level, self.chest, |transform| transform.scale = scale);
    }

    fn apply_immediately(&mut self, ctx: &mut TurnContext) {
        self.open(ctx);
        with_transform(ctx.level, self.chest, |transform| transform.scale = 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::Harness;
    use crate::components::Health;

    #[test]
    fn test_collect_moves_items_to_inventory() {
        let mut h = Harness::new((4, 4));
        h.level.add_item((4, 4), ItemKind::BerryJuice);
        h.level.add_item((4, 4), ItemKind::GrubJerky);
        let items = h.level.items_at((4, 4));
        let mut pickup = ItemCollect::new(h.player, items);
        assert_eq!(pickup.turn_increase(), 0.5);
        h.animate_fully(&mut pickup);
        pickup.apply_immediately(&mut h.ctx());

        let inventory = h.level.world.get::<&PlayerData>(h.player).unwrap().inventory.clone();
        assert_eq!(inventory, vec![ItemKind::BerryJuice, ItemKind::GrubJerky]);
        assert!(h.level.items_at((4, 4)).is_empty());
        let pickups = h.events.iter().filter(|e| matches!(e, GameEvent::ItemCollected { .. })).count();
        assert_eq!(pickups, 2);
    }

    #[test]
    fn test_use_consumes_one_item() {
        let mut h = Harness::new((4, 4));
        let player = h.player;
        {
            let mut data = h.level.world.get::<&mut PlayerData>(player).unwrap();
            data.inventory = vec![ItemKind::BerryJuice, ItemKind::BerryJuice];
        }
        h.level.world.get::<&mut Health>(player).unwrap().current = 5;
        let mut drink = ItemUse::new(player, ItemKind::BerryJuice);
        drink.apply_immediately(&mut h.ctx());
        drink.apply_immediately(&mut h.ctx());
        assert_eq!(h.level.world.get::<&PlayerData>(player).unwrap().inventory.len(), 1);
        assert!(h.level.world.get::<&Health>(player).unwrap().current > 5);
    }

    #[test]
    fn test_chest_opens_at_pop_frame() {
        let mut h = Harness::new((4, 4));
        let chest = h.level.add_chest((5, 4), 1, ItemKind::SilverClaws);
        let mut open = ChestOpen::new(h.player, chest);
        while open.timer().remaining > CHEST_OPEN_FRAME {
            open.animate_step(&mut h.ctx());
            open.timer_mut().tick();
            assert!(!h.level.world.get::<&Chest>(chest).unwrap().opened);
        }
        h.animate_fully(&mut open);
        assert!(h.level.world.get::<&Chest>(chest).unwrap().opened);
        let pops = h.events.iter().filter(|e| matches!(e, GameEvent::ChestOpened { .. })).count();
        assert_eq!(pops, 1);
    }
}
