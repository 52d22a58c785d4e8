//! Procedural floor generation from hand-authored room templates.
//!
//! The map is split into a 7x7 grid of 7-tile sections. The floor's entrance
//! room sits in the middle section; every other room claims one to four
//! sections next to an already placed room whose free connection it can
//! mirror. Rooms are stamped centered in their sections, corridors are carved
//! between entrances through the unclaimed rock, and the result is verified
//! and repaired until every entrance is reachable from every other.

use std::collections::HashSet;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::components::NpcKind;
use crate::constants::*;
use crate::error::{GameError, GameResult};
use crate::geometry::{tile_distance, TileCoord};
use crate::items::loot_roll;
use crate::level::{Level, PlacedRoom};
use crate::pathfinding::{Connectivity, Pathfinder};
use crate::rooms::{Cell, Direction, RoomLibrary, RoomTemplate};
use crate::tile::{Overlay, TileKind};

const ENTRANCE_ROOM_IDS: [&str; 3] = ["marshallsRoom", "webEntrance", "entranceRoom"];
const EXIT_ROOM_ID: &str = "exitRoom";
const HOME_ROOM_ID: &str = "marshallsRoom";
const PIT_ROOM_ID: &str = "pitRoom";

/// Template that starts each floor
pub fn entrance_room_id(floor: u32) -> &'static str {
    match floor {
        0 => "marshallsRoom",
        1 => "webEntrance",
        _ => "entranceRoom",
    }
}

/// Per-floor seed so the same session seed always rebuilds the same floor
pub fn floor_seed(seed: u64, floor: u32) -> u64 {
    seed.wrapping_add((floor as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// A template assigned to a block of sections
#[derive(Debug, Clone)]
struct Placement {
    template: usize,
    section: (i32, i32),
    span: (i32, i32),
    origin: TileCoord,
    /// Connections already spent on links
    used: Vec<Direction>,
}

pub struct DungeonGenerator<'a> {
    library: &'a RoomLibrary,
    floor: u32,
    rng: StdRng,
    claimed: HashSet<(i32, i32)>,
    placements: Vec<Placement>,
    /// Parent/child placement pairs joined through matching connections
    links: Vec<(usize, usize)>,
    tier_used: u32,
    level: Level,
    /// Every stamped non-entrance cell; corridors may not cross them
    interiors: HashSet<TileCoord>,
    /// Kept entrances, per placement
    room_entrances: Vec<Vec<TileCoord>>,
    /// Entrance cells dropped by trimming; they stay walls
    dropped: HashSet<TileCoord>,
    carver: Pathfinder,
    navigator: Pathfinder,
}

impl<'a> DungeonGenerator<'a> {
    pub fn new(library: &'a RoomLibrary, floor: u32, seed: u64, vision_range: i32) -> Self {
        Self {
            library,
            floor,
            rng: StdRng::seed_from_u64(floor_seed(seed, floor)),
            claimed: HashSet::new(),
            placements: Vec::new(),
            links: Vec::new(),
            tier_used: 0,
            level: Level::new(floor, vision_range),
            interiors: HashSet::new(),
            room_entrances: Vec::new(),
            dropped: HashSet::new(),
            carver: Pathfinder::new(LEVEL_SIZE, LEVEL_SIZE, Connectivity::Four),
            navigator: Pathfinder::new(LEVEL_SIZE, LEVEL_SIZE, Connectivity::Eight),
        }
    }

    /// Build one fully connected floor
    pub fn generate(library: &'a RoomLibrary, floor: u32, seed: u64, vision_range: i32) -> GameResult<Level> {
        puffin::profile_function!();

        let mut gen = Self::new(library, floor, seed, vision_range);
        gen.place_rooms()?;
        gen.stamp_rooms();
        gen.carve_corridors();
        gen.ensure_connected();
        gen.decorate_tiles();
        gen.populate()?;
        debug!(
            "Generated floor {} with {} rooms and {} entrances",
            floor,
            gen.level.rooms.len(),
            gen.level.entrances.len()
        );
        Ok(gen.level)
    }

    fn template(&self, index: usize) -> &'a RoomTemplate {
        &self.library.templates[index]
    }

    // =========================================================================
    // Placement
    // =========================================================================

    fn place_rooms(&mut self) -> GameResult<()> {
        let entrance_id = entrance_room_id(self.floor);
        let entrance = self
            .library
            .index_of(entrance_id)
            .ok_or_else(|| GameError::MissingTemplate(entrance_id.to_string()))?;
        if !self.claim(entrance, ENTRANCE_SECTION) {
            return Err(GameError::InvalidTemplate {
                id: entrance_id.to_string(),
                reason: "entrance room does not fit its section".to_string(),
            });
        }

        let floor = self.floor;
        let required: Vec<usize> = self
            .library
            .templates
            .iter()
            .enumerate()
            .filter(|(i, t)| {
                *i != entrance && (t.required_on(floor) || (t.id == EXIT_ROOM_ID && t.allowed_on(floor)))
            })
            .map(|(i, _)| i)
            .collect();
        for &template in &required {
            if !self.try_link(template) && !self.place_anywhere(template) {
                warn!("No room left for required room '{}'", self.template(template).id);
            }
        }

        let optional: Vec<usize> = self
            .library
            .templates
            .iter()
            .enumerate()
            .filter(|(i, t)| {
                !required.contains(i)
                    && !ENTRANCE_ROOM_IDS.contains(&t.id.as_str())
                    && t.id != EXIT_ROOM_ID
                    && t.allowed_on(floor)
            })
            .map(|(i, _)| i)
            .collect();
        let target = (required.len() + 1).max((BASE_ROOM_COUNT + floor as usize / 2).min(MAX_ROOM_COUNT));

        let mut attempts = 0;
        while self.placements.len() < target && !optional.is_empty() && attempts < target * LINK_ATTEMPTS as usize {
            attempts += 1;
            let Some(&candidate) = optional.choose(&mut self.rng) else {
                break;
            };
            if self.tier_used + self.template(candidate).tier > TIER_BUDGET {
                continue;
            }
            self.try_link(candidate);
        }
        debug!("Placed {} of {} rooms after {} attempts", self.placements.len(), target, attempts);
        Ok(())
    }

    /// Claim the sections for `template` at `section` if they are all free
    fn claim(&mut self, template: usize, section: (i32, i32)) -> bool {
        let room = self.template(template);
        let span = room.section_span();
        let cells: Vec<(i32, i32)> = (0..span.1)
            .flat_map(|dy| (0..span.0).map(move |dx| (section.0 + dx, section.1 + dy)))
            .collect();
        let fits = cells.iter().all(|&(sx, sy)| {
            sx >= 0 && sy >= 0 && sx < SECTION_COUNT && sy < SECTION_COUNT && !self.claimed.contains(&(sx, sy))
        });
        if !fits {
            return false;
        }
        self.claimed.extend(cells);

        let origin = (
            section.0 * SECTION_SIZE + (span.0 * SECTION_SIZE - room.width as i32) / 2,
            section.1 * SECTION_SIZE + (span.1 * SECTION_SIZE - room.height as i32) / 2,
        );
        self.tier_used += room.tier;
        self.placements.push(Placement {
            template,
            section,
            span,
            origin,
            used: Vec::new(),
        });
        true
    }

    /// Attach `template` to a random placed room through a free matching connection
    fn try_link(&mut self, template: usize) -> bool {
        let child = self.template(template);
        let child_span = child.section_span();
        for _ in 0..LINK_ATTEMPTS {
            let parent_index = self.rng.gen_range(0..self.placements.len());
            let parent = &self.placements[parent_index];
            let free: Vec<Direction> = self
                .template(parent.template)
                .matching_connections(child)
                .into_iter()
                .filter(|direction| !parent.used.contains(direction))
                .collect();
            let Some(&direction) = free.choose(&mut self.rng) else {
                continue;
            };
            let (px, py) = parent.section;
            let section = match direction {
                Direction::Left => (px - child_span.0, py),
                Direction::Right => (px + parent.span.0, py),
                Direction::Up => (px, py - child_span.1),
                Direction::Down => (px, py + parent.span.1),
            };
            if self.claim(template, section) {
                let child_index = self.placements.len() - 1;
                self.placements[parent_index].used.push(direction);
                self.placements[child_index].used.push(direction.inverse());
                self.links.push((parent_index, child_index));
                debug!(
                    "Linked '{}' {:?} of '{}'",
                    child.id,
                    direction,
                    self.template(self.placements[parent_index].template).id
                );
                return true;
            }
        }
        false
    }

    /// First free block of sections in row-major order
    fn place_anywhere(&mut self, template: usize) -> bool {
        for sy in 0..SECTION_COUNT {
            for sx in 0..SECTION_COUNT {
                if self.claim(template, (sx, sy)) {
                    debug!("Placed '{}' unlinked at section {:?}", self.template(template).id, (sx, sy));
                    return true;
                }
            }
        }
        false
    }

    // =========================================================================
    // Stamping
    // =========================================================================

    fn stamp_rooms(&mut self) {
        let placements = self.placements.clone();
        for placement in &placements {
            let room = self.template(placement.template);
            let (ox, oy) = placement.origin;
            let mut candidates = Vec::new();

            for (row, cells) in room.cells.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    let coord = (ox + col as i32, oy + row as i32);
                    let kind = match cell {
                        Cell::Floor => TileKind::floor(),
                        Cell::Pit => TileKind::pit(),
                        Cell::Wall | Cell::Entrance => TileKind::wall(),
                    };
                    self.level.grid.set_kind(coord.0, coord.1, kind);
                    if *cell == Cell::Entrance {
                        candidates.push(coord);
                    } else {
                        self.interiors.insert(coord);
                    }
                }
            }

            for &(overlay, (dx, dy)) in &room.overlays {
                let coord = (ox + dx, oy + dy);
                if let Some(tile) = self.level.grid.get_mut(coord.0, coord.1) {
                    tile.overlay = Some(overlay);
                }
                match overlay {
                    Overlay::Exit => self.level.exit = Some(coord),
                    Overlay::Entrance => self.level.entry = Some(coord),
                    _ => {}
                }
            }

            // Entrances on the map edge open onto nothing
            let (edge, mut kept): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|&c| on_border(c));
            self.dropped.extend(edge);
            while kept.len() > room.entrance_count {
                let farthest = kept
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        tile_distance(**a, TRIM_ANCHOR).total_cmp(&tile_distance(**b, TRIM_ANCHOR))
                    })
                    .map(|(i, _)| i);
                if let Some(i) = farthest {
                    self.dropped.insert(kept.remove(i));
                }
            }
            if kept.is_empty() {
                warn!("Room '{}' has no usable entrance at {:?}", room.id, placement.origin);
            }

            self.level.entrances.extend(kept.iter().copied());
            self.room_entrances.push(kept);
            self.level.rooms.push(PlacedRoom {
                id: room.id.clone(),
                origin: placement.origin,
                width: room.width as i32,
                height: room.height as i32,
            });
        }
    }

    // =========================================================================
    // Carving
    // =========================================================================

    fn carve_blocked(&self) -> HashSet<TileCoord> {
        let mut blocked: HashSet<TileCoord> = self.interiors.union(&self.dropped).copied().collect();
        for i in 0..LEVEL_SIZE {
            blocked.insert((i, 0));
            blocked.insert((i, LEVEL_SIZE - 1));
            blocked.insert((0, i));
            blocked.insert((LEVEL_SIZE - 1, i));
        }
        blocked
    }

    /// Dig a corridor through unclaimed rock. Returns false when no route exists.
    fn carve(&mut self, from: TileCoord, to: TileCoord, blocked: &HashSet<TileCoord>) -> bool {
        let Some(path) = self.carver.find_path(from, to, blocked, CARVE_MAX_EXPANSIONS) else {
            return false;
        };
        for (x, y) in path {
            if !self.level.grid.get(x, y).is_some_and(|tile| tile.kind.is_floor()) {
                self.level.grid.set_kind(x, y, TileKind::floor());
            }
        }
        true
    }

    fn carve_corridors(&mut self) {
        puffin::profile_function!();

        for &(x, y) in &self.level.entrances {
            self.level.grid.set_kind(x, y, TileKind::floor());
        }
        let blocked = self.carve_blocked();
        let mut matched: HashSet<TileCoord> = HashSet::new();

        for (parent, child) in self.links.clone() {
            let Some((a, b)) = nearest_pair(&self.room_entrances[parent], &self.room_entrances[child]) else {
                continue;
            };
            if self.carve(a, b, &blocked) {
                matched.insert(a);
                matched.insert(b);
            }
        }

        let owners: Vec<(usize, TileCoord)> = self
            .room_entrances
            .iter()
            .enumerate()
            .flat_map(|(room, entrances)| entrances.iter().map(move |&e| (room, e)))
            .collect();
        for &(room, entrance) in &owners {
            if matched.contains(&entrance) {
                continue;
            }
            let nearest = owners
                .iter()
                .filter(|(other, _)| *other != room)
                .map(|&(_, e)| e)
                .min_by(|a, b| tile_distance(entrance, *a).total_cmp(&tile_distance(entrance, *b)));
            if let Some(other) = nearest {
                if self.carve(entrance, other, &blocked) {
                    matched.insert(entrance);
                    matched.insert(other);
                }
            }
        }
    }

    /// Entrances the navigation pathfinder cannot reach from the first one
    fn unreachable_entrances(&self) -> Vec<TileCoord> {
        let Some(&hub) = self.level.entrances.first() else {
            return Vec::new();
        };
        let blocked: HashSet<TileCoord> = self.level.grid.find_all(|tile| !tile.is_walkable()).into_iter().collect();
        self.level
            .entrances
            .iter()
            .skip(1)
            .copied()
            .filter(|&e| self.navigator.find_path(hub, e, &blocked, CARVE_MAX_EXPANSIONS).is_none())
            .collect()
    }

    fn ensure_connected(&mut self) {
        puffin::profile_function!();

        let blocked = self.carve_blocked();
        for round in 0..CARVE_REPAIR_ROUNDS {
            let unreachable = self.unreachable_entrances();
            if unreachable.is_empty() {
                return;
            }
            debug!("Repair round {}: {} entrances unreachable", round, unreachable.len());
            let reachable: Vec<TileCoord> = self
                .level
                .entrances
                .iter()
                .copied()
                .filter(|e| !unreachable.contains(e))
                .collect();
            for &lost in &unreachable {
                let nearest = reachable
                    .iter()
                    .copied()
                    .min_by(|a, b| tile_distance(lost, *a).total_cmp(&tile_distance(lost, *b)));
                if let Some(target) = nearest {
                    self.carve(lost, target, &blocked);
                }
            }
        }

        let unreachable = self.unreachable_entrances();
        if unreachable.is_empty() {
            return;
        }
        let Some(&hub) = self.level.entrances.first() else {
            return;
        };
        warn!("Floor {}: falling back to hub-and-spoke carving", self.floor);
        for &lost in &unreachable {
            self.carve(hub, lost, &blocked);
        }

        let unreachable = self.unreachable_entrances();
        if unreachable.is_empty() {
            return;
        }
        warn!("Floor {}: brute-force carving {} entrances", self.floor, unreachable.len());
        for lost in unreachable {
            self.carve_straight(lost, hub);
        }
    }

    /// L-shaped tunnel that ignores rooms and overlays
    fn carve_straight(&mut self, from: TileCoord, to: TileCoord) {
        let (x0, y0) = from;
        let (x1, y1) = to;
        let horizontal = (x0.min(x1)..=x0.max(x1)).map(|x| (x, y0));
        let vertical = (y0.min(y1)..=y0.max(y1)).map(|y| (x1, y));
        let path: Vec<TileCoord> = horizontal.chain(vertical).collect();
        for (x, y) in path {
            if let Some(tile) = self.level.grid.get_mut(x, y) {
                tile.kind = TileKind::floor();
                tile.overlay = None;
            }
        }
    }

    // =========================================================================
    // Finishing
    // =========================================================================

    /// Directional wall and pit skins plus random variants. Runs once every
    /// tile is final.
    fn decorate_tiles(&mut self) {
        let grid = &self.level.grid;
        let non_wall = |x: i32, y: i32| grid.get(x, y).is_some_and(|tile| !tile.kind.is_wall());
        let non_pit = |x: i32, y: i32| grid.get(x, y).map_or(true, |tile| !tile.kind.is_pit());

        let mut kinds = Vec::with_capacity(grid.tiles.len());
        for (x, y) in grid.coords() {
            let Some(tile) = grid.get(x, y) else {
                continue;
            };
            let kind = match tile.kind {
                TileKind::Wall { .. } => {
                    let exposed = (-1..=1)
                        .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
                        .filter(|&d| d != (0, 0))
                        .any(|(dx, dy)| non_wall(x + dx, y + dy));
                    TileKind::Wall {
                        variant: self.rng.gen_range(0..2),
                        exposed,
                        faces_north: non_wall(x, y - 1),
                    }
                }
                TileKind::Floor { .. } => TileKind::Floor {
                    variant: self.rng.gen_range(0..4),
                    rotation: self.rng.gen_range(0..4),
                },
                TileKind::Pit { .. } => TileKind::Pit {
                    variant: self.rng.gen_range(0..2),
                    rim_visible: non_pit(x, y + 1),
                },
            };
            kinds.push(((x, y), kind));
        }
        for ((x, y), kind) in kinds {
            self.level.grid.set_kind(x, y, kind);
        }
    }

    /// Spawn point, family, chests, loose loot and the opening wave of enemies
    fn populate(&mut self) -> GameResult<()> {
        let entrance_id = entrance_room_id(self.floor);
        let entrance_room = self
            .level
            .room(entrance_id)
            .cloned()
            .ok_or_else(|| GameError::MissingTemplate(entrance_id.to_string()))?;

        if self.floor == 0 {
            self.level.player_spawn = entrance_room.at(HOME_PLAYER_OFFSET);
            if entrance_room.id == HOME_ROOM_ID {
                self.level.add_npc(NpcKind::Minnie, entrance_room.at((2, 1)));
            }
            if let Some(pit_room) = self.level.room(PIT_ROOM_ID).cloned() {
                self.level.add_npc(NpcKind::Michael, pit_room.at((4, 2)));
                self.level.add_npc(NpcKind::Maxwell, pit_room.at((2, 4)));
                self.level.add_npc(NpcKind::Magnolia, pit_room.at((3, 2)));
            }
        } else {
            self.level.player_spawn = entrance_room.at(ENTRANCE_PLAYER_OFFSET);
        }

        for placement in self.placements.clone() {
            for &(entity, (dx, dy)) in &self.template(placement.template).entities {
                let coord = (placement.origin.0 + dx, placement.origin.1 + dy);
                let tier = entity.chest_tier();
                let loot = loot_roll(&mut self.rng, tier);
                self.level.add_chest(coord, tier, loot);
            }
        }

        let loot_tier = (self.floor + 8) / 9;
        for _ in 0..(self.floor + 1) / 2 {
            let spot = (0..SPAWN_ATTEMPTS)
                .map(|_| (self.rng.gen_range(0..LEVEL_SIZE), self.rng.gen_range(0..LEVEL_SIZE)))
                .find(|&coord| self.level.is_free(coord) && coord != self.level.player_spawn);
            if let Some(coord) = spot {
                let loot = loot_roll(&mut self.rng, loot_tier);
                self.level.add_item(coord, loot);
            }
        }

        let spawn = self.level.player_spawn;
        let waves = (3 * self.floor + 1) / 2 + 5;
        for _ in 0..waves {
            self.level.spawn_random_enemy(&mut self.rng, spawn, 0.0);
        }
        Ok(())
    }
}

fn on_border((x, y): TileCoord) -> bool {
    x <= 0 || y <= 0 || x >= LEVEL_SIZE - 1 || y >= LEVEL_SIZE - 1
}

/// Closest pair of tiles across two sets
fn nearest_pair(a: &[TileCoord], b: &[TileCoord]) -> Option<(TileCoord, TileCoord)> {
    a.iter()
        .flat_map(|&x| b.iter().map(move |&y| (x, y)))
        .min_by(|(a1, b1), (a2, b2)| tile_distance(*a1, *b1).total_cmp(&tile_distance(*a2, *b2)))
}
