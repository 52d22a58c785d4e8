//! A* search over level-sized tile grids.
//!
//! The pathfinder knows only the grid bounds: everything impassable (walls,
//! other entities, unrevealed tiles, room interiors while carving) is supplied
//! by the caller as a blocked set. The goal is always enterable so callers can
//! path onto an enemy they want to hit or a pit they want to jump into.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::geometry::{tile_distance, TileCoord};

/// Which neighbours a step may reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Orthogonal steps only, used for carving corridors
    Four,
    /// Orthogonal and diagonal steps, used for entity navigation
    Eight,
}

const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

#[derive(Clone, Copy, PartialEq)]
struct ScoredNode {
    node: TileCoord,
    f_score: f32,
    seq: u64,
}

impl Eq for ScoredNode {}

// BinaryHeap is a max-heap, so we reverse the ordering for min-heap behavior.
// Equal scores pop in insertion order.
impl Ord for ScoredNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pathfinder {
    pub width: i32,
    pub height: i32,
    pub connectivity: Connectivity,
}

impl Pathfinder {
    pub fn new(width: i32, height: i32, connectivity: Connectivity) -> Self {
        Self {
            width,
            height,
            connectivity,
        }
    }

    /// Euclidean distance; admissible for both connectivities
    pub fn heuristic(&self, a: TileCoord, b: TileCoord) -> f32 {
        tile_distance(a, b)
    }

    fn in_bounds(&self, (x, y): TileCoord) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Find a path from start to goal.
    /// Returns the steps after `start` through `goal`, an empty path when
    /// already there, or `None` when the goal is unreachable or the search
    /// exceeds `max_expansions` expanded nodes.
    pub fn find_path(
        &self,
        start: TileCoord,
        goal: TileCoord,
        blocked: &HashSet<TileCoord>,
        max_expansions: usize,
    ) -> Option<Vec<TileCoord>> {
        puffin::profile_function!();

        if !self.in_bounds(start) || !self.in_bounds(goal) {
            return None;
        }
        if start == goal {
            return Some(Vec::new());
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<TileCoord, TileCoord> = HashMap::new();
        let mut g_score: HashMap<TileCoord, f32> = HashMap::new();
        let mut closed: HashSet<TileCoord> = HashSet::new();
        let mut seq = 0u64;
        let mut expansions = 0usize;

        g_score.insert(start, 0.0);
        open_set.push(ScoredNode {
            node: start,
            f_score: self.heuristic(start, goal),
            seq,
        });

        while let Some(current) = open_set.pop() {
            if current.node == goal {
                return Some(reconstruct_path(&came_from, goal));
            }
            if !closed.insert(current.node) {
                // Stale heap entry
                continue;
            }

            expansions += 1;
            if expansions > max_expansions {
                return None;
            }

            let current_g = g_score.get(&current.node).copied().unwrap_or(f32::INFINITY);

            for (dx, dy, cost) in self.steps() {
                let neighbor = (current.node.0 + dx, current.node.1 + dy);
                if !self.in_bounds(neighbor) || closed.contains(&neighbor) {
                    continue;
                }
                if blocked.contains(&neighbor) && neighbor != goal {
                    continue;
                }

                let tentative_g = current_g + cost;
                let neighbor_g = g_score.get(&neighbor).copied().unwrap_or(f32::INFINITY);
                if tentative_g < neighbor_g {
                    came_from.insert(neighbor, current.node);
                    g_score.insert(neighbor, tentative_g);
                    seq += 1;
                    open_set.push(ScoredNode {
                        node: neighbor,
                        f_score: tentative_g + self.heuristic(neighbor, goal),
                        seq,
                    });
                }
            }
        }

        None
    }

    /// Just the next step toward a goal
    pub fn next_step_toward(
        &self,
        start: TileCoord,
        goal: TileCoord,
        blocked: &HashSet<TileCoord>,
        max_expansions: usize,
    ) -> Option<TileCoord> {
        self.find_path(start, goal, blocked, max_expansions)
            .and_then(|path| path.first().copied())
    }

    fn steps(&self) -> impl Iterator<Item = (i32, i32, f32)> {
        let orthogonal = ORTHOGONAL.into_iter().map(|(dx, dy)| (dx, dy, 1.0));
        let diagonal = DIAGONAL
            .into_iter()
            .map(|(dx, dy)| (dx, dy, std::f32::consts::SQRT_2))
            .take(match self.connectivity {
                Connectivity::Four => 0,
                Connectivity::Eight => DIAGONAL.len(),
            });
        orthogonal.chain(diagonal)
    }
}

/// Walk `came_from` back from the goal. The start position is excluded.
fn reconstruct_path(came_from: &HashMap<TileCoord, TileCoord>, goal: TileCoord) -> Vec<TileCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path.remove(0);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walls_with_gap(x: i32, gap_y: i32, height: i32) -> HashSet<TileCoord> {
        (0..height).filter(|&y| y != gap_y).map(|y| (x, y)).collect()
    }

    #[test]
    fn test_straight_path_excludes_start() {
        let finder = Pathfinder::new(10, 10, Connectivity::Four);
        let path = finder.find_path((0, 0), (3, 0), &HashSet::new(), 100).unwrap();
        assert_eq!(path, vec![(1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn test_same_start_and_goal_is_empty() {
        let finder = Pathfinder::new(10, 10, Connectivity::Eight);
        assert_eq!(finder.find_path((4, 4), (4, 4), &HashSet::new(), 10), Some(vec![]));
    }

    #[test]
    fn test_diagonal_path_is_shorter_with_eight() {
        let eight = Pathfinder::new(10, 10, Connectivity::Eight);
        let four = Pathfinder::new(10, 10, Connectivity::Four);
        let blocked = HashSet::new();
        assert_eq!(eight.find_path((0, 0), (4, 4), &blocked, 500).unwrap().len(), 4);
        assert_eq!(four.find_path((0, 0), (4, 4), &blocked, 500).unwrap().len(), 8);
    }

    #[test]
    fn test_routes_through_gap() {
        let finder = Pathfinder::new(10, 10, Connectivity::Four);
        let blocked = walls_with_gap(5, 8, 10);
        let path = finder.find_path((0, 0), (9, 0), &blocked, 1000).unwrap();
        assert!(path.contains(&(5, 8)));
        assert!(path.iter().all(|p| !blocked.contains(p)));
        // Every step is orthogonally adjacent to the previous
        let mut prev = (0, 0);
        for step in path {
            assert_eq!((step.0 - prev.0).abs() + (step.1 - prev.1).abs(), 1);
            prev = step;
        }
    }

    #[test]
    fn test_fully_blocked_is_none() {
        let finder = Pathfinder::new(10, 10, Connectivity::Eight);
        let blocked: HashSet<_> = (0..10).map(|y| (5, y)).collect();
        assert!(finder.find_path((0, 0), (9, 9), &blocked, 10_000).is_none());
    }

    #[test]
    fn test_blocked_goal_is_still_enterable() {
        let finder = Pathfinder::new(10, 10, Connectivity::Eight);
        let blocked: HashSet<_> = [(3, 3)].into_iter().collect();
        let path = finder.find_path((1, 1), (3, 3), &blocked, 100).unwrap();
        assert_eq!(path.last(), Some(&(3, 3)));
    }

    #[test]
    fn test_expansion_cap_returns_none() {
        let finder = Pathfinder::new(50, 50, Connectivity::Four);
        let blocked = walls_with_gap(25, 49, 50);
        assert!(finder.find_path((0, 0), (49, 0), &blocked, 20).is_none());
        assert!(finder.find_path((0, 0), (49, 0), &blocked, 10_000).is_some());
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let finder = Pathfinder::new(10, 10, Connectivity::Eight);
        assert!(finder.find_path((0, 0), (10, 3), &HashSet::new(), 100).is_none());
        assert!(finder.next_step_toward((-1, 0), (3, 3), &HashSet::new(), 100).is_none());
    }

    #[test]
    fn test_next_step_toward() {
        let finder = Pathfinder::new(10, 10, Connectivity::Eight);
        assert_eq!(finder.next_step_toward((0, 0), (5, 0), &HashSet::new(), 100), Some((1, 0)));
        assert_eq!(finder.next_step_toward((2, 2), (2, 2), &HashSet::new(), 100), None);
    }
}
