use maze_walk::entities::TILE_SIZE;
use maze_walk::maze::{CollisionProbe, Grid, Tile};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// 3x3 grid, all passage except a single wall tile at (1, 1).
fn single_wall_grid() -> Grid {
    let mut cells = vec![Tile::Passage; 9];
    cells[1 * 3 + 1] = Tile::Wall;
    Grid::from_tiles(3, 3, cells)
}

// ── Generation invariants ─────────────────────────────────────────────────────

#[test]
fn border_is_entirely_wall() {
    let mut rng = seeded_rng();
    let grid = Grid::generate(15, 21, &mut rng);
    for gx in 0..grid.cols() {
        assert_eq!(grid.tile(gx, 0), Tile::Wall);
        assert_eq!(grid.tile(gx, grid.rows() - 1), Tile::Wall);
    }
    for gy in 0..grid.rows() {
        assert_eq!(grid.tile(0, gy), Tile::Wall);
        assert_eq!(grid.tile(grid.cols() - 1, gy), Tile::Wall);
    }
}

#[test]
fn middle_row_is_open_corridor() {
    let mut rng = seeded_rng();
    let grid = Grid::generate(15, 21, &mut rng);
    let mid = grid.rows() / 2;
    for gx in 1..grid.cols() - 1 {
        assert_eq!(grid.tile(gx, mid), Tile::Passage);
    }
}

#[test]
fn every_passage_is_reachable_from_seed() {
    // Flood fill from (1, 1); the carve invariant promises it reaches
    // every passage cell.
    let mut rng = seeded_rng();
    let grid = Grid::generate(15, 21, &mut rng);

    let mut visited = vec![false; grid.cols() * grid.rows()];
    let mut stack = vec![(1usize, 1usize)];
    visited[grid.cols() + 1] = true;
    while let Some((x, y)) = stack.pop() {
        for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            let nx = (x as i32 + dx) as usize;
            let ny = (y as i32 + dy) as usize;
            let idx = ny * grid.cols() + nx;
            if !grid.is_wall(nx as i32, ny as i32) && !visited[idx] {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        }
    }

    for gy in 0..grid.rows() {
        for gx in 0..grid.cols() {
            if grid.tile(gx, gy) == Tile::Passage {
                assert!(visited[gy * grid.cols() + gx], "unreachable passage at ({gx}, {gy})");
            }
        }
    }
}

#[test]
fn for_screen_forces_odd_dimensions() {
    let mut rng = seeded_rng();
    // 256 px / 16 = 16 cols, 352 px / 16 = 22 rows — both even, both must drop to odd.
    let grid = Grid::for_screen(256, 352, &mut rng);
    assert_eq!(grid.cols(), 15);
    assert_eq!(grid.rows(), 21);
}

#[test]
fn generation_is_deterministic_per_seed() {
    let a = Grid::generate(15, 21, &mut seeded_rng());
    let b = Grid::generate(15, 21, &mut seeded_rng());
    assert_eq!(a, b);
}

#[test]
#[should_panic]
fn even_dimensions_panic() {
    let mut rng = seeded_rng();
    let _ = Grid::generate(14, 21, &mut rng);
}

#[test]
#[should_panic]
fn tiny_dimensions_panic() {
    let mut rng = seeded_rng();
    let _ = Grid::generate(1, 1, &mut rng);
}

// ── Collision probe ───────────────────────────────────────────────────────────

#[test]
fn probe_clear_of_the_wall() {
    let grid = single_wall_grid();
    // Centered in the top-left tile, box well inside it.
    assert!(grid.can_move_to(8.0, 8.0, 2.0));
}

#[test]
fn probe_edge_reaching_into_wall_tile() {
    let grid = single_wall_grid();
    // Box at (14, 14) half 2: corner (16, 16) lands in tile (1, 1) — the wall.
    assert!(!grid.can_move_to(14.0, 14.0, 2.0));
    // One pixel shy of the wall tile boundary is fine.
    assert!(grid.can_move_to(13.0, 13.0, 2.0));
}

#[test]
fn probe_midpoint_catches_thin_wall() {
    // Wall only at (1, 0).  A box centered at (24, 24) with half-extent 9
    // has all four corners in passage tiles — only the top edge midpoint
    // (24, 15) lands in the wall tile.  Corner-only sampling would tunnel.
    let mut cells = vec![Tile::Passage; 9];
    cells[1] = Tile::Wall;
    let grid = Grid::from_tiles(3, 3, cells);
    assert!(!grid.can_move_to(24.0, 24.0, 9.0));
    // The same box one tile lower clears everything.
    assert!(grid.can_move_to(24.0, 26.0, 9.0));
}

#[test]
fn out_of_bounds_reads_as_wall() {
    let grid = single_wall_grid();
    // Box straddling the grid's outer edge.
    assert!(!grid.can_move_to(1.0, 1.0, 2.0));
    assert!(!grid.can_move_to(47.0, 47.0, 2.0));
    assert!(grid.is_wall(-1, 0));
    assert!(grid.is_wall(0, 3));
}

// ── Spawn positions ───────────────────────────────────────────────────────────

#[test]
fn random_passage_center_lands_on_a_passage() {
    let mut rng = seeded_rng();
    let grid = Grid::generate(15, 21, &mut rng);
    for _ in 0..50 {
        let (x, y) = grid.random_passage_center(&mut rng);
        let gx = (x / TILE_SIZE).floor() as usize;
        let gy = (y / TILE_SIZE).floor() as usize;
        assert_eq!(grid.tile(gx, gy), Tile::Passage);
        // Centered in its tile.
        assert_eq!(x % TILE_SIZE, TILE_SIZE / 2.0);
        assert_eq!(y % TILE_SIZE, TILE_SIZE / 2.0);
    }
}
