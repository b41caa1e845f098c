/// Maze Walk — a maze-chase arcade game.
///
/// The library half holds everything that can run without a terminal:
/// entity data, maze generation / collision probing, and the pure
/// per-frame simulation.  Rendering and input live in the binary.

pub mod compute;
pub mod entities;
pub mod maze;
