/// All game entity types — pure data, no logic.

use crate::maze::Grid;

// ── Playfield constants ───────────────────────────────────────────────────────

/// Playfield size in world pixels.
pub const SCREEN_WIDTH: u32 = 240;
pub const SCREEN_HEIGHT: u32 = 340;

/// Side length of one maze tile in world pixels.
pub const TILE_SIZE: f32 = 16.0;

/// Logical frames per second (the host sleeps to hold this rate).
pub const FPS: f32 = 30.0;

/// Collision half-extent of the player and enemies (4 x 4 px box).
pub const CHARACTER_HALF: f32 = 2.0;

/// Collision half-extent of spark particles (2 x 2 px box).
pub const PARTICLE_HALF: f32 = 1.0;

// ── Player constants ──────────────────────────────────────────────────────────

/// Speed the player starts at and snaps back to when input stops.
pub const BASE_SPEED: f32 = 0.1;

/// Top speed after holding a direction for ACCELERATION_TIME seconds.
pub const MAX_SPEED: f32 = BASE_SPEED * 65.0;

/// Seconds of continuous movement needed to reach MAX_SPEED.
pub const ACCELERATION_TIME: f32 = 5.0;

/// Per-frame speed gain while a direction is held.
pub const ACCELERATION: f32 = (MAX_SPEED - BASE_SPEED) / (ACCELERATION_TIME * FPS);

/// Entering this zone of the speed continuum makes the player "powered".
/// Power is always derived from current_speed, never stored as a flag.
pub const POWERED_SPEED: f32 = MAX_SPEED * 0.3;

/// Wall hits a powered player survives before the power state collapses.
pub const MAX_WALL_HITS: u32 = 2;

/// Elastic bounce-back multiplier on a powered wall hit.
pub const WALL_BOUNCE: f32 = 4.0;

/// Frames of wall-hit immunity granted per enemy kill.
pub const KILL_BOOST_DURATION: u32 = 30;

/// Base amplitude of the powered movement wobble.
pub const WAVE_AMPLITUDE: f32 = 0.2;

/// How strongly the wobble amplitude grows past the power threshold.
pub const SPEED_WAVE_FACTOR: f32 = 1.5;

// ── Enemy constants ───────────────────────────────────────────────────────────

pub const ENEMY_SPEED: f32 = 0.8;
pub const ENEMY_WAVE_AMPLITUDE: f32 = 0.3;

/// Hard cap on the enemy population.
pub const MAX_ENEMIES: usize = 250;

/// Enemies placed when a stage starts.
pub const INITIAL_ENEMIES: usize = 30;

/// Frames of newborn flash after an enemy is created (cosmetic only).
pub const SPAWN_DURATION: u32 = 30;

/// Frames an enemy is locked out of reproducing after contributing offspring.
pub const MULTIPLY_COOLDOWN: u32 = 150;

/// Every this many frames, each off-cooldown enemy may reproduce.
pub const PROLIFERATION_INTERVAL: u32 = 5 * 30;
pub const PROLIFERATION_PROBABILITY: f64 = 0.1;
pub const PROLIFERATION_COUNT: usize = 1;

// ── Particle constants ────────────────────────────────────────────────────────

/// Lifetime of every particle, in frames.
pub const PARTICLE_LIFE: i32 = 50;

/// A spark is dropped once it has bounced this many times.
pub const SPARK_MAX_BOUNCES: u32 = 2;

/// Absolute safety limit on raw wall contacts for a spark.
pub const SPARK_HARD_LIMIT: u32 = 8;

// ── Stage constants ───────────────────────────────────────────────────────────

/// Frames between the last kill and the next stage appearing.
pub const STAGE_CLEAR_FRAMES: u32 = 60;

/// Frames the walls flash after a powered wall hit.
pub const WALL_FLASH_FRAMES: u32 = 5;

/// Frames the walls turn green after a multiply event (~0.7 s at 30 FPS).
pub const WALL_GREEN_FRAMES: u32 = 21;

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    /// Scalar speed; ramps from BASE_SPEED toward MAX_SPEED while moving.
    pub current_speed: f32,
    /// Last nonzero input vector, kept for the direction indicator.
    pub direction: (f32, f32),
    /// Wall hits since the last power reset.
    pub wall_hits: u32,
    /// Frames of kill-boost immunity remaining.
    pub kill_boost_timer: u32,
    /// Phase of the powered movement wobble.
    pub wave_time: f32,
    /// Phase of the powered ring pulse (render only).
    pub ring_time: f32,
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

/// Cardinal travel direction of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
    Up,
    Down,
}

impl Heading {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Heading::Left | Heading::Right)
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub direction: Heading,
    /// Frames until the next spontaneous direction change.
    pub direction_timer: i32,
    /// Random phase offset so enemies don't wobble in lockstep.
    pub wave_offset: f32,
    /// Wobble phase, advanced every frame.
    pub time: f32,
    /// Counts up to SPAWN_DURATION; below it the enemy renders as newborn.
    pub spawn_timer: u32,
    /// Counts down; while positive the enemy cannot multiply.
    pub multiply_cooldown: u32,
}

// ── Particle ──────────────────────────────────────────────────────────────────

/// Palette tag for a particle; the renderer picks the terminal color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleColor {
    /// Death-burst cyan (matches the enemy body color).
    Cyan,
    /// Wall-spark yellow (matches the powered player).
    Yellow,
}

/// One short-lived visual entity.  Death bursts and wall sparks share this
/// shape, discriminated by `is_spark`: bursts ignore walls and simply decay,
/// sparks reflect off walls and can kill enemies they touch.
#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub color: ParticleColor,
    /// Frames remaining.
    pub life: i32,
    pub is_spark: bool,
    /// Wall contacts so far (sparks only; bursts never touch walls).
    pub wall_hits: u32,
}

// ── Sounds ────────────────────────────────────────────────────────────────────

/// Fire-and-forget audio events emitted by the simulation.  The host decides
/// what (if anything) a terminal can do with them; nothing in the core waits
/// on playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    /// Continuous hum while powered, emitted once per second.
    PowerHum,
    /// Powered wall impact.
    WallHit,
    /// Spark crackle (also used for enemy kills).
    Spark,
    /// An enemy was born.
    Spawn,
    /// The last enemy died.
    StageClear,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state for one stage.  Cloneable so pure update functions
/// can return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct World {
    pub grid: Grid,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    /// 1-based stage number, bumped on every regeneration.
    pub stage: u32,
    /// Counts down to the next stage once the enemy set is empty.
    pub stage_clear_timer: u32,
    /// Counts up to PROLIFERATION_INTERVAL.
    pub proliferation_timer: u32,
    /// Walls flash while positive (powered wall hit).
    pub wall_flash_timer: u32,
    /// Walls turn green while positive (multiply event).
    pub wall_green_timer: u32,
    pub frame: u64,
    /// Audio events raised this frame; rebuilt on every tick.
    pub sounds: Vec<Sound>,
}
