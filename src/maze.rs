/// Maze grid: recursive-backtracking generation and wall probing.
///
/// The grid is the single source of truth for what is solid.  Everything
/// that moves — player, enemies, spark particles — asks it through the
/// `CollisionProbe` trait, so tests can substitute hand-built grids.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::entities::TILE_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Passage,
}

/// Rectangular tile grid, flat row-major storage.
///
/// Invariants (upheld by `generate`):
/// * the outer border is entirely Wall,
/// * every Passage cell is reachable from the seed cell (1, 1),
/// * the interior of the middle row is one long open corridor.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Tile>,
}

/// Traversability test for an axis-aligned box centered at (x, y) with the
/// given half-extent, in world pixels.  Out of bounds always reads as wall.
pub trait CollisionProbe {
    fn can_move_to(&self, x: f32, y: f32, half: f32) -> bool;
}

impl Grid {
    /// Build a grid from explicit tiles (row-major).  Meant for tests and
    /// hand-crafted layouts; `generate` is the gameplay path.
    pub fn from_tiles(cols: usize, rows: usize, cells: Vec<Tile>) -> Self {
        assert_eq!(cells.len(), cols * rows, "tile count must match dimensions");
        Self { cols, rows, cells }
    }

    /// Generate a maze by recursive backtracking from the seed cell (1, 1).
    ///
    /// Both dimensions must be odd and >= 3 — anything else is a programming
    /// error, not a runtime condition.  After carving, the interior of the
    /// middle row is forced open so there is always one straight corridor
    /// long enough to build up speed.
    pub fn generate(cols: usize, rows: usize, rng: &mut impl Rng) -> Self {
        assert!(
            cols >= 3 && rows >= 3 && cols % 2 == 1 && rows % 2 == 1,
            "maze dimensions must be odd and >= 3, got {cols}x{rows}"
        );

        let mut grid = Self {
            cols,
            rows,
            cells: vec![Tile::Wall; cols * rows],
        };
        grid.set(1, 1, Tile::Passage);
        grid.carve(1, 1, rng);

        // Force the middle row open.
        let mid = rows / 2;
        for x in 1..cols - 1 {
            grid.set(x, mid, Tile::Passage);
        }

        grid
    }

    /// Compute tile dimensions from a pixel playfield (decrementing even
    /// results to odd) and generate.
    pub fn for_screen(width_px: u32, height_px: u32, rng: &mut impl Rng) -> Self {
        let mut cols = (width_px as f32 / TILE_SIZE) as usize;
        let mut rows = (height_px as f32 / TILE_SIZE) as usize;
        if cols % 2 == 0 {
            cols -= 1;
        }
        if rows % 2 == 0 {
            rows -= 1;
        }
        Self::generate(cols, rows, rng)
    }

    /// Carve passages from (cx, cy): visit the four two-cell-distant
    /// neighbors in random order and tunnel into each one that is still
    /// wall and strictly interior.  Carving only enters unvisited cells,
    /// so connectivity back to the seed is guaranteed without any
    /// cycle bookkeeping.
    fn carve(&mut self, cx: usize, cy: usize, rng: &mut impl Rng) {
        let mut directions: [(isize, isize); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];
        directions.shuffle(rng);
        for (dx, dy) in directions {
            let nx = cx as isize + dx;
            let ny = cy as isize + dy;
            if nx <= 0 || ny <= 0 || nx >= self.cols as isize - 1 || ny >= self.rows as isize - 1 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if self.tile(nx, ny) == Tile::Wall {
                let (mx, my) = ((cx + nx) / 2, (cy + ny) / 2);
                self.set(mx, my, Tile::Passage);
                self.set(nx, ny, Tile::Passage);
                self.carve(nx, ny, rng);
            }
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Tile at grid coordinates; panics out of bounds (use `is_wall` for
    /// probing).
    pub fn tile(&self, gx: usize, gy: usize) -> Tile {
        self.cells[gy * self.cols + gx]
    }

    fn set(&mut self, gx: usize, gy: usize, tile: Tile) {
        self.cells[gy * self.cols + gx] = tile;
    }

    /// Wall test with out-of-bounds normalized to "is a wall".
    pub fn is_wall(&self, gx: i32, gy: i32) -> bool {
        if gx < 0 || gy < 0 || gx >= self.cols as i32 || gy >= self.rows as i32 {
            return true;
        }
        self.tile(gx as usize, gy as usize) == Tile::Wall
    }

    /// Center of a uniformly random Passage cell, in world pixels.
    ///
    /// The forced middle row guarantees the passage set is never empty;
    /// an empty set here means the grid was built by hand without one,
    /// which is a bug in the caller.
    pub fn random_passage_center(&self, rng: &mut impl Rng) -> (f32, f32) {
        let passages: Vec<(usize, usize)> = (0..self.rows)
            .flat_map(|y| (0..self.cols).map(move |x| (x, y)))
            .filter(|&(x, y)| self.tile(x, y) == Tile::Passage)
            .collect();
        assert!(!passages.is_empty(), "grid has no passage cells");
        let &(gx, gy) = passages.choose(rng).unwrap();
        (
            gx as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            gy as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }
}

impl CollisionProbe for Grid {
    /// Samples the four corners plus the four edge midpoints of the box.
    /// Midpoints matter: with corner-only sampling a fast diagonal move can
    /// tunnel through a thin wall corner between two sampled points.
    fn can_move_to(&self, x: f32, y: f32, half: f32) -> bool {
        let check_points = [
            (x - half, y - half),
            (x + half, y - half),
            (x - half, y + half),
            (x + half, y + half),
            (x, y - half),
            (x + half, y),
            (x, y + half),
            (x - half, y),
        ];
        check_points.iter().all(|&(px, py)| {
            !self.is_wall(
                (px / TILE_SIZE).floor() as i32,
                (py / TILE_SIZE).floor() as i32,
            )
        })
    }
}
