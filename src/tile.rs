use hecs::Entity;
use serde::{Deserialize, Serialize};

/// Sprite sheet identifiers. Sheets are 32x32-cell grids addressed by (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteSheet {
    Dirt,          // tilesets/dirt.png - walls, floors, pits
    MoleHill,      // overlays/moleHole.png - home furniture
    BuggyBurrows,  // overlays/buggyBurrows.png - burrow decor, entrance/exit
    Marshall,
    Minnie,
    Michael,
    Maxwell,
    Magnolia,
    WigglyWorm,
    Spiderling,
    Items,         // items.png - chests and loot
    Hud,           // hud/miniIcons.png
    Missing,       // missingTexture.png
}

/// One cell of a sprite sheet, with presentation modifiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRef {
    pub sheet: SpriteSheet,
    pub col: u8,
    pub row: u8,
    pub flip_h: bool,
    /// Degrees, clockwise
    pub rotation: f32,
    pub scale: f32,
    pub alpha: f32,
}

impl SpriteRef {
    pub const fn new(sheet: SpriteSheet, col: u8, row: u8) -> Self {
        Self {
            sheet,
            col,
            row,
            flip_h: false,
            rotation: 0.0,
            scale: 1.0,
            alpha: 1.0,
        }
    }
}

// =============================================================================
// Tile kinds
// =============================================================================

/// Kind-specific tile data. `variant` picks one of two interchangeable sprite columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Wall {
        variant: u8,
        /// Borders at least one non-wall tile
        exposed: bool,
        /// The tile to the north is not a wall, so the wall shows its face
        faces_north: bool,
    },
    Floor {
        variant: u8,
        /// Quarter turns applied to the floor sprite
        rotation: u8,
    },
    Pit {
        variant: u8,
        /// The tile to the south is not a pit, so the rim is drawn
        rim_visible: bool,
    },
}

impl TileKind {
    pub fn wall() -> Self {
        TileKind::Wall {
            variant: 0,
            exposed: false,
            faces_north: false,
        }
    }

    pub fn floor() -> Self {
        TileKind::Floor { variant: 0, rotation: 0 }
    }

    pub fn pit() -> Self {
        TileKind::Pit {
            variant: 0,
            rim_visible: false,
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, TileKind::Wall { .. })
    }

    pub fn is_floor(&self) -> bool {
        matches!(self, TileKind::Floor { .. })
    }

    pub fn is_pit(&self) -> bool {
        matches!(self, TileKind::Pit { .. })
    }

    pub fn is_walkable(&self) -> bool {
        self.is_floor()
    }

    /// Flying entities may cross floors and pits
    pub fn is_flyable(&self) -> bool {
        !self.is_wall()
    }

    /// Sprite on the dirt tileset. `None` for pits whose rim is hidden.
    pub fn sprite(&self) -> Option<SpriteRef> {
        match *self {
            TileKind::Wall {
                variant, faces_north, ..
            } => Some(SpriteRef::new(
                SpriteSheet::Dirt,
                variant,
                if faces_north { 2 } else { 3 },
            )),
            TileKind::Floor { variant, rotation } => {
                let mut sprite = SpriteRef::new(SpriteSheet::Dirt, variant % 2, variant / 2);
                sprite.rotation = rotation as f32 * 90.0;
                Some(sprite)
            }
            TileKind::Pit { variant, rim_visible } => {
                rim_visible.then(|| SpriteRef::new(SpriteSheet::Dirt, variant, 4))
            }
        }
    }
}

// =============================================================================
// Overlays
// =============================================================================

/// Decorative tile overlays placed by room templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Overlay {
    Entrance,
    Exit,
    CouchLeft,
    CouchRight,
    Painting,
    GreenBedLeft,
    GreenBedRight,
    PinkBedLeft,
    PinkBedRight,
    OrangeBedLeft,
    OrangeBedRight,
    Dresser,
    Monitor,
    BallDresser,
    Teddy,
    Decor1,
    Decor2,
    Decor3,
    Decor4,
    Blocker1,
    Blocker2,
    Blocker3,
    Statue,
}

impl Overlay {
    /// Overlays default to blocking; only these can be stood on
    pub fn is_walkable(&self) -> bool {
        matches!(
            self,
            Overlay::Entrance
                | Overlay::Exit
                | Overlay::CouchLeft
                | Overlay::CouchRight
                | Overlay::GreenBedRight
                | Overlay::PinkBedRight
                | Overlay::OrangeBedRight
                | Overlay::Decor1
                | Overlay::Decor2
                | Overlay::Decor3
                | Overlay::Decor4
        )
    }

    /// Sprite cell for this overlay. Home furniture lives on the mole hill sheet,
    /// everything else on the burrow sheet.
    pub fn sprite(&self) -> SpriteRef {
        use Overlay::*;
        let (sheet, col, row) = match self {
            CouchLeft => (SpriteSheet::MoleHill, 0, 0),
            CouchRight => (SpriteSheet::MoleHill, 1, 0),
            GreenBedLeft => (SpriteSheet::MoleHill, 0, 1),
            GreenBedRight => (SpriteSheet::MoleHill, 1, 1),
            PinkBedLeft => (SpriteSheet::MoleHill, 0, 2),
            PinkBedRight => (SpriteSheet::MoleHill, 1, 2),
            OrangeBedLeft => (SpriteSheet::MoleHill, 0, 3),
            OrangeBedRight => (SpriteSheet::MoleHill, 1, 3),
            Dresser => (SpriteSheet::MoleHill, 0, 4),
            Monitor => (SpriteSheet::MoleHill, 1, 4),
            BallDresser => (SpriteSheet::MoleHill, 0, 5),
            Teddy => (SpriteSheet::MoleHill, 1, 5),
            Painting => (SpriteSheet::MoleHill, 0, 6),
            Entrance => (SpriteSheet::BuggyBurrows, 0, 0),
            Exit => (SpriteSheet::BuggyBurrows, 1, 0),
            Decor1 => (SpriteSheet::BuggyBurrows, 0, 1),
            Decor2 => (SpriteSheet::BuggyBurrows, 1, 1),
            Decor3 => (SpriteSheet::BuggyBurrows, 0, 2),
            Decor4 => (SpriteSheet::BuggyBurrows, 1, 2),
            Blocker1 => (SpriteSheet::BuggyBurrows, 0, 3),
            Blocker2 => (SpriteSheet::BuggyBurrows, 1, 3),
            Blocker3 => (SpriteSheet::BuggyBurrows, 0, 4),
            Statue => (SpriteSheet::BuggyBurrows, 1, 4),
        };
        SpriteRef::new(sheet, col, row)
    }
}

// =============================================================================
// Tile
// =============================================================================

#[derive(Debug, Clone)]
pub struct Tile {
    pub kind: TileKind,
    /// Ever seen by the player
    pub revealed: bool,
    /// Currently in the player's sight
    pub visible: bool,
    pub overlay: Option<Overlay>,
    /// Actor or chest standing here. Ground items are tracked separately.
    pub occupant: Option<Entity>,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            revealed: false,
            visible: false,
            overlay: None,
            occupant: None,
        }
    }

    pub fn wall() -> Self {
        Self::new(TileKind::wall())
    }

    pub fn floor() -> Self {
        Self::new(TileKind::floor())
    }

    pub fn pit() -> Self {
        Self::new(TileKind::pit())
    }

    /// Walkable when the kind allows it and any overlay permits standing on it
    pub fn is_walkable(&self) -> bool {
        self.kind.is_walkable() && self.overlay.map_or(true, |overlay| overlay.is_walkable())
    }

    pub fn is_flyable(&self) -> bool {
        self.kind.is_flyable()
    }
}
