//! Item definitions - all item properties in one place.
//!
//! Items are data variants: one static table describes what each kind is
//! called, how it is drawn and what using it does.

use rand::Rng;

use crate::tile::{SpriteRef, SpriteSheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    BerryJuice,
    GrubJerky,
    StrengthTonic,
    RustyTrowel,
    SilverClaws,
}

/// What happens when an item is used from the inventory
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UseEffect {
    /// Restore health immediately
    Heal(i32),
    /// Restore health and bank regeneration turns
    Nourish { heal: i32, regen_points: i32 },
    /// Add to melee damage for a number of turns
    Strength { bonus: i32, turns: u32 },
    /// Swap into the weapon slot
    Equip { damage: i32 },
}

pub struct ItemDef {
    pub kind: ItemKind,
    pub name: &'static str,
    /// Lowest loot tier that can roll this item
    pub min_tier: u32,
    /// Relative roll weight within a tier
    pub weight: u32,
    pub sprite: (u8, u8),
    pub use_effect: UseEffect,
}

pub const ITEM_DEFS: [ItemDef; 5] = [
    ItemDef {
        kind: ItemKind::BerryJuice,
        name: "Berry Juice",
        min_tier: 0,
        weight: 6,
        sprite: (0, 1),
        use_effect: UseEffect::Heal(6),
    },
    ItemDef {
        kind: ItemKind::GrubJerky,
        name: "Grub Jerky",
        min_tier: 0,
        weight: 5,
        sprite: (1, 1),
        use_effect: UseEffect::Nourish { heal: 3, regen_points: 20 },
    },
    ItemDef {
        kind: ItemKind::StrengthTonic,
        name: "Strength Tonic",
        min_tier: 1,
        weight: 3,
        sprite: (0, 2),
        use_effect: UseEffect::Strength { bonus: 2, turns: 20 },
    },
    ItemDef {
        kind: ItemKind::RustyTrowel,
        name: "Rusty Trowel",
        min_tier: 1,
        weight: 2,
        sprite: (1, 2),
        use_effect: UseEffect::Equip { damage: 2 },
    },
    ItemDef {
        kind: ItemKind::SilverClaws,
        name: "Silver Claws",
        min_tier: 2,
        weight: 1,
        sprite: (0, 3),
        use_effect: UseEffect::Equip { damage: 4 },
    },
];

impl ItemKind {
    pub fn def(&self) -> &'static ItemDef {
        match self {
            ItemKind::BerryJuice => &ITEM_DEFS[0],
            ItemKind::GrubJerky => &ITEM_DEFS[1],
            ItemKind::StrengthTonic => &ITEM_DEFS[2],
            ItemKind::RustyTrowel => &ITEM_DEFS[3],
            ItemKind::SilverClaws => &ITEM_DEFS[4],
        }
    }

    pub fn name(&self) -> &'static str {
        self.def().name
    }

    pub fn sprite(&self) -> SpriteRef {
        let (col, row) = self.def().sprite;
        SpriteRef::new(SpriteSheet::Items, col, row)
    }

    pub fn is_weapon(&self) -> bool {
        matches!(self.def().use_effect, UseEffect::Equip { .. })
    }
}

/// Roll a random item available at `tier`. Higher tiers widen the table.
pub fn loot_roll<R: Rng>(rng: &mut R, tier: u32) -> ItemKind {
    let pool: Vec<&ItemDef> = ITEM_DEFS.iter().filter(|def| def.min_tier <= tier).collect();
    let total: u32 = pool.iter().map(|def| def.weight).sum();
    let mut roll = rng.gen_range(0..total);
    for def in &pool {
        if roll < def.weight {
            return def.kind;
        }
        roll -= def.weight;
    }
    ItemKind::BerryJuice
}
