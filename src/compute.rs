/// Pure game-logic functions.
///
/// Every public function takes immutable references to the current state
/// (and, where needed, an RNG handle) and returns brand-new values.  Side
/// effects are limited to the injected RNG, so a seeded RNG makes every
/// frame reproducible in tests.

use std::f32::consts::{FRAC_PI_4, TAU};

use rand::Rng;

use crate::entities::*;
use crate::maze::{CollisionProbe, Grid};

// ── Small predicates ─────────────────────────────────────────────────────────

/// Power is a zone of the speed continuum, never a stored flag.
pub fn is_powered(player: &Player) -> bool {
    player.current_speed >= POWERED_SPEED
}

/// 4 x 4 px box overlap shared by every entity-vs-entity test.
pub fn check_collision(x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
    (x1 - x2).abs() < 4.0 && (y1 - y2).abs() < 4.0
}

// ── Constructors ─────────────────────────────────────────────────────────────

fn new_player(x: f32, y: f32) -> Player {
    Player {
        x,
        y,
        current_speed: BASE_SPEED,
        direction: (0.0, 0.0),
        wall_hits: 0,
        kill_boost_timer: 0,
        wave_time: 0.0,
        ring_time: 0.0,
    }
}

fn random_heading(rng: &mut impl Rng) -> Heading {
    match rng.gen_range(0..4) {
        0 => Heading::Left,
        1 => Heading::Right,
        2 => Heading::Up,
        _ => Heading::Down,
    }
}

/// A freshly spawned enemy with randomized wander state.
pub fn spawn_enemy(x: f32, y: f32, rng: &mut impl Rng) -> Enemy {
    Enemy {
        x,
        y,
        direction: random_heading(rng),
        direction_timer: rng.gen_range(30..=90),
        wave_offset: rng.gen_range(0.0..TAU),
        time: 0.0,
        spawn_timer: 0,
        multiply_cooldown: 0,
    }
}

fn new_particle(
    x: f32,
    y: f32,
    angle: f32,
    speed: f32,
    color: ParticleColor,
    is_spark: bool,
) -> Particle {
    Particle {
        x,
        y,
        dx: angle.cos() * speed,
        dy: angle.sin() * speed,
        color,
        life: PARTICLE_LIFE,
        is_spark,
        wall_hits: 0,
    }
}

/// 8 burst particles at 45° steps — the enemy death effect.
pub fn spawn_death_effect(particles: &mut Vec<Particle>, x: f32, y: f32) {
    for i in 0..8 {
        let angle = i as f32 * FRAC_PI_4;
        particles.push(new_particle(x, y, angle, 2.0, ParticleColor::Cyan, false));
    }
}

/// 3 spark particles at random angles — the powered wall-impact effect.
/// Sparks inherit the player's current speed, so faster impacts spray
/// faster (and therefore farther-bouncing) sparks.
pub fn spawn_spark_effect(particles: &mut Vec<Particle>, x: f32, y: f32, speed: f32, rng: &mut impl Rng) {
    for _ in 0..3 {
        let angle = rng.gen_range(0.0..TAU);
        particles.push(new_particle(x, y, angle, speed, ParticleColor::Yellow, true));
    }
}

/// Build the initial world: fresh maze, player at a random passage cell,
/// INITIAL_ENEMIES enemies scattered over the passages.
pub fn init_world(rng: &mut impl Rng) -> World {
    let grid = Grid::for_screen(SCREEN_WIDTH, SCREEN_HEIGHT, rng);
    let (px, py) = grid.random_passage_center(rng);
    let mut enemies = Vec::with_capacity(INITIAL_ENEMIES);
    for _ in 0..INITIAL_ENEMIES {
        let (ex, ey) = grid.random_passage_center(rng);
        enemies.push(spawn_enemy(ex, ey, rng));
    }
    World {
        grid,
        player: new_player(px, py),
        enemies,
        particles: Vec::new(),
        stage: 1,
        stage_clear_timer: 0,
        proliferation_timer: 0,
        wall_flash_timer: 0,
        wall_green_timer: 0,
        frame: 0,
        sounds: Vec::new(),
    }
}

/// Regenerate the stage wholesale: new maze, player repositioned with its
/// power state reset, particles cleared, enemy set repopulated.  The frame
/// counter survives; the stage number is bumped.
pub fn reset_stage(state: &World, rng: &mut impl Rng) -> World {
    let grid = Grid::for_screen(SCREEN_WIDTH, SCREEN_HEIGHT, rng);
    let (px, py) = grid.random_passage_center(rng);
    let mut player = reset_power_state(&state.player);
    player.x = px;
    player.y = py;
    let mut enemies = Vec::with_capacity(INITIAL_ENEMIES);
    for _ in 0..INITIAL_ENEMIES {
        let (ex, ey) = grid.random_passage_center(rng);
        enemies.push(spawn_enemy(ex, ey, rng));
    }
    World {
        grid,
        player,
        enemies,
        particles: Vec::new(),
        stage: state.stage + 1,
        stage_clear_timer: 0,
        proliferation_timer: 0,
        wall_flash_timer: 0,
        wall_green_timer: 0,
        frame: state.frame,
        sounds: state.sounds.clone(),
    }
}

// ── Player state machine ─────────────────────────────────────────────────────

/// One frame of the acceleration state machine.  Returns the updated player
/// and the displacement to attempt this frame.
///
/// Zero input resets speed to BASE_SPEED on the spot — there is no coasting.
/// Nonzero input normalizes, scales by the current speed, then ramps the
/// speed by ACCELERATION toward MAX_SPEED.  While powered, a perpendicular
/// sinusoid is added to the non-dominant axis; its amplitude grows linearly
/// with how far past the threshold the speed is.
pub fn advance_player(player: &Player, dx: f32, dy: f32) -> (Player, (f32, f32)) {
    let mut p = player.clone();
    if p.kill_boost_timer > 0 {
        p.kill_boost_timer -= 1;
    }

    if dx == 0.0 && dy == 0.0 {
        p.direction = (0.0, 0.0);
        p.current_speed = BASE_SPEED;
        return (p, (0.0, 0.0));
    }

    p.direction = (dx, dy);
    let length = (dx * dx + dy * dy).sqrt();
    let mut out_x = dx / length * p.current_speed;
    let mut out_y = dy / length * p.current_speed;

    p.current_speed = (p.current_speed + ACCELERATION).min(MAX_SPEED);
    if is_powered(&p) {
        let speed_ratio = (p.current_speed - POWERED_SPEED) / (MAX_SPEED - POWERED_SPEED);
        let amplitude = WAVE_AMPLITUDE * (1.0 + speed_ratio * SPEED_WAVE_FACTOR);
        let wave = p.wave_time.sin() * amplitude;
        if out_x.abs() > out_y.abs() {
            out_y += wave;
        } else {
            out_x += wave;
        }
        p.wave_time += 0.2;
        p.ring_time += 0.2;
    }

    (p, (out_x, out_y))
}

/// The only exit from powered state besides unpowered wall damping: speed
/// back to base, wall-hit counter and kill boost cleared.
pub fn reset_power_state(player: &Player) -> Player {
    Player {
        current_speed: BASE_SPEED,
        wall_hits: 0,
        kill_boost_timer: 0,
        ..player.clone()
    }
}

// ── Enemy agent ──────────────────────────────────────────────────────────────

/// One frame of wandering: constant speed along the cardinal heading plus a
/// perpendicular sinusoidal wobble.  A blocked move re-rolls heading and
/// wobble phase immediately (waiting for the timer would leave the enemy
/// grinding against the wall); the countdown re-rolls on its own schedule.
pub fn update_enemy(enemy: &Enemy, probe: &impl CollisionProbe, rng: &mut impl Rng) -> Enemy {
    let mut e = enemy.clone();
    if e.spawn_timer < SPAWN_DURATION {
        e.spawn_timer += 1;
    }
    if e.multiply_cooldown > 0 {
        e.multiply_cooldown -= 1;
    }

    let (base_dx, base_dy) = match e.direction {
        Heading::Left => (-ENEMY_SPEED, 0.0),
        Heading::Right => (ENEMY_SPEED, 0.0),
        Heading::Up => (0.0, -ENEMY_SPEED),
        Heading::Down => (0.0, ENEMY_SPEED),
    };
    let wave = (e.time + e.wave_offset).sin() * ENEMY_WAVE_AMPLITUDE;
    let (dx, dy) = if e.direction.is_horizontal() {
        (base_dx, wave)
    } else {
        (wave, base_dy)
    };

    let new_x = e.x + dx;
    let new_y = e.y + dy;
    if probe.can_move_to(new_x, new_y, CHARACTER_HALF) {
        e.x = new_x;
        e.y = new_y;
    } else {
        e.direction = random_heading(rng);
        e.wave_offset = rng.gen_range(0.0..TAU);
    }

    e.time += 0.1;
    e.direction_timer -= 1;
    if e.direction_timer <= 0 {
        e.direction = random_heading(rng);
        e.direction_timer = rng.gen_range(30..=90);
        e.wave_offset = rng.gen_range(0.0..TAU);
    }
    e
}

// ── Particle system ──────────────────────────────────────────────────────────

/// One frame of particle physics; `None` means the particle expired.
///
/// Burst particles ignore walls and just decay.  Sparks probe the grid; on
/// contact each axis of the velocity is negated independently when that
/// axis's motion is blocked, so a corner hit reflects diagonally.  A spark
/// dies at SPARK_MAX_BOUNCES (checked after the move) or immediately at
/// SPARK_HARD_LIMIT raw contacts.
pub fn update_particle(particle: &Particle, probe: &impl CollisionProbe) -> Option<Particle> {
    let mut p = particle.clone();

    if !p.is_spark {
        p.x += p.dx;
        p.y += p.dy;
        p.life -= 1;
        return (p.life > 0).then_some(p);
    }

    let new_x = p.x + p.dx;
    let new_y = p.y + p.dy;
    if probe.can_move_to(new_x, new_y, PARTICLE_HALF) {
        p.x = new_x;
        p.y = new_y;
    } else {
        p.wall_hits += 1;
        if p.wall_hits >= SPARK_HARD_LIMIT {
            return None;
        }
        if !probe.can_move_to(new_x, p.y, PARTICLE_HALF) {
            p.dx = -p.dx;
        }
        if !probe.can_move_to(p.x, new_y, PARTICLE_HALF) {
            p.dy = -p.dy;
        }
    }

    p.life -= 1;
    (p.life > 0 && p.wall_hits < SPARK_MAX_BOUNCES).then_some(p)
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame.
///
/// `input` is the already-resolved direction vector (the host merges
/// keyboard and pointer drag; keyboard wins).  Ordering inside a frame is
/// load-bearing: player movement resolves before enemy updates, which
/// resolve before particle updates — a spark can kill an enemy in the same
/// frame the enemy pass kept it alive.
pub fn tick(state: &World, input: (f32, f32), rng: &mut impl Rng) -> World {
    let mut world = state.clone();
    world.frame += 1;
    world.sounds.clear();
    if world.wall_flash_timer > 0 {
        world.wall_flash_timer -= 1;
    }
    if world.wall_green_timer > 0 {
        world.wall_green_timer -= 1;
    }

    // ── 1. Stage-clear countdown swallows the whole frame ────────────────────
    if world.stage_clear_timer > 0 {
        world.stage_clear_timer -= 1;
        if world.stage_clear_timer == 0 {
            return reset_stage(&world, rng);
        }
        return world;
    }

    let probe = &state.grid;
    let old_x = world.player.x;
    let old_y = world.player.y;

    // ── 2. Player displacement ───────────────────────────────────────────────
    let (player, (dx, dy)) = advance_player(&world.player, input.0, input.1);
    world.player = player;
    if (dx != 0.0 || dy != 0.0) && is_powered(&world.player) && world.frame % 30 == 0 {
        world.sounds.push(Sound::PowerHum);
    }

    // ── 3. Movement resolution: full move, then wall-hugging slide ───────────
    let can_move_x = probe.can_move_to(world.player.x + dx, world.player.y, CHARACTER_HALF);
    let can_move_y = probe.can_move_to(world.player.x, world.player.y + dy, CHARACTER_HALF);

    if probe.can_move_to(world.player.x + dx, world.player.y + dy, CHARACTER_HALF) {
        world.player.x += dx;
        world.player.y += dy;
    } else {
        let mut moved = false;

        let strength = (dx * dx + dy * dy).sqrt();
        let (norm_dx, norm_dy) = if strength > 0.0 {
            (dx / strength, dy / strength)
        } else {
            (0.0, 0.0)
        };

        // Both single-axis moves pass: retry the diagonal at reduced speed.
        if can_move_x && can_move_y {
            let next_x = world.player.x + dx * 0.7;
            let next_y = world.player.y + dy * 0.7;
            if probe.can_move_to(next_x, next_y, CHARACTER_HALF) {
                world.player.x = next_x;
                world.player.y = next_y;
                moved = true;
            }
        }

        // Slide along the dominant axis, with a smaller secondary nudge.
        if !moved {
            if norm_dx.abs() > norm_dy.abs() {
                if can_move_x {
                    let next_x = world.player.x + dx * 0.85;
                    if probe.can_move_to(next_x, world.player.y, CHARACTER_HALF) {
                        world.player.x = next_x;
                        if can_move_y {
                            let next_y = world.player.y + dy * 0.5;
                            if probe.can_move_to(world.player.x, next_y, CHARACTER_HALF) {
                                world.player.y = next_y;
                            }
                        }
                        moved = true;
                    }
                }
            } else if can_move_y {
                let next_y = world.player.y + dy * 0.85;
                if probe.can_move_to(world.player.x, next_y, CHARACTER_HALF) {
                    world.player.y = next_y;
                    if can_move_x {
                        let next_x = world.player.x + dx * 0.5;
                        if probe.can_move_to(next_x, world.player.y, CHARACTER_HALF) {
                            world.player.x = next_x;
                        }
                    }
                    moved = true;
                }
            }
        }

        // ── 4. Dead stop: this is a wall hit ─────────────────────────────────
        if !moved {
            world.player.x = old_x;
            world.player.y = old_y;

            if is_powered(&world.player) {
                world.wall_flash_timer = WALL_FLASH_FRAMES;
                spawn_spark_effect(
                    &mut world.particles,
                    world.player.x,
                    world.player.y,
                    world.player.current_speed,
                    rng,
                );
                world.sounds.push(Sound::WallHit);
                world.sounds.push(Sound::Spark);
                if world.player.kill_boost_timer == 0 {
                    world.player.wall_hits += 1;
                }

                // Elastic bounce opposite the blocked input.
                let bounce_x = if dx != 0.0 { -dx * WALL_BOUNCE } else { 0.0 };
                let bounce_y = if dy != 0.0 { -dy * WALL_BOUNCE } else { 0.0 };
                if probe.can_move_to(
                    world.player.x + bounce_x,
                    world.player.y + bounce_y,
                    CHARACTER_HALF,
                ) {
                    world.player.x += bounce_x;
                    world.player.y += bounce_y;
                }

                if world.player.wall_hits >= MAX_WALL_HITS && world.player.kill_boost_timer == 0 {
                    world.player = reset_power_state(&world.player);
                }
            } else {
                // Unpowered impacts damp the ramp instead of killing it.
                let min_speed = BASE_SPEED * 3.0;
                world.player.current_speed = min_speed.max(world.player.current_speed * 0.9);
            }
        }
    }

    // ── 5. Enemy pass (rebuilt into a fresh list) ────────────────────────────
    let mut collision_occurred = false;
    let mut remaining: Vec<Enemy> = Vec::with_capacity(world.enemies.len());
    let mut population = world.enemies.len();

    for enemy in &world.enemies {
        let mut e = update_enemy(enemy, probe, rng);
        if check_collision(world.player.x, world.player.y, e.x, e.y) {
            if is_powered(&world.player) {
                spawn_death_effect(&mut world.particles, e.x, e.y);
                world.sounds.push(Sound::Spark);
                world.player.kill_boost_timer = KILL_BOOST_DURATION;
                population -= 1;
                continue;
            }
            collision_occurred = true;
            e.direction = random_heading(rng);
            if population < MAX_ENEMIES && e.multiply_cooldown == 0 {
                for _ in 0..2 {
                    if population < MAX_ENEMIES {
                        let (nx, ny) = state.grid.random_passage_center(rng);
                        remaining.push(spawn_enemy(nx, ny, rng));
                        population += 1;
                        world.sounds.push(Sound::Spawn);
                    }
                }
                e.multiply_cooldown = MULTIPLY_COOLDOWN;
                world.wall_green_timer = WALL_GREEN_FRAMES;
            }
        }
        remaining.push(e);
    }

    // ── 6. Particle pass (fresh list; sparks kill before they move) ──────────
    let particles = std::mem::take(&mut world.particles);
    let mut bursts: Vec<Particle> = Vec::new();
    for particle in &particles {
        if particle.is_spark {
            let mut killed: Vec<(f32, f32)> = Vec::new();
            remaining.retain(|e| {
                if check_collision(particle.x, particle.y, e.x, e.y) {
                    killed.push((e.x, e.y));
                    false
                } else {
                    true
                }
            });
            for (kx, ky) in killed {
                spawn_death_effect(&mut bursts, kx, ky);
                world.sounds.push(Sound::Spark);
            }
        }
        if let Some(p) = update_particle(particle, probe) {
            world.particles.push(p);
        }
    }
    world.particles.extend(bursts);

    // ── 7. Unpowered enemy contact: roll the frame back ──────────────────────
    if collision_occurred && !is_powered(&world.player) {
        world.player.x = old_x;
        world.player.y = old_y;
        world.player.current_speed = BASE_SPEED;
    }

    world.enemies = remaining;

    // ── 8. Periodic proliferation ────────────────────────────────────────────
    world.proliferation_timer += 1;
    if world.proliferation_timer >= PROLIFERATION_INTERVAL {
        world.proliferation_timer = 0;
        let mut newborn: Vec<Enemy> = Vec::new();
        let mut population = world.enemies.len();
        for enemy in world.enemies.iter_mut() {
            if enemy.multiply_cooldown == 0 && rng.gen_bool(PROLIFERATION_PROBABILITY) {
                for _ in 0..PROLIFERATION_COUNT {
                    if population < MAX_ENEMIES {
                        newborn.push(spawn_enemy(enemy.x, enemy.y, rng));
                        population += 1;
                        world.sounds.push(Sound::Spawn);
                    }
                }
                enemy.multiply_cooldown = MULTIPLY_COOLDOWN;
            }
        }
        world.enemies.extend(newborn);
    }

    // ── 9. Empty enemy set starts the stage-clear countdown ──────────────────
    if world.enemies.is_empty() {
        world.stage_clear_timer = STAGE_CLEAR_FRAMES;
        world.sounds.push(Sound::StageClear);
    }

    world
}
