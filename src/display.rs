/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands.
///
/// Mapping: one 16 px maze tile renders as 2 terminal cells wide and 1
/// tall, so a cell covers 8 x 16 world pixels and the 15 x 21 playfield
/// fits an 80 x 24 terminal with room for the HUD and hint rows.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use maze_walk::compute::is_powered;
use maze_walk::entities::{
    Enemy, Particle, ParticleColor, World, BASE_SPEED, MAX_ENEMIES, SPAWN_DURATION,
};
use maze_walk::maze::Tile;

/// World pixels per terminal cell, horizontally and vertically.
const CELL_PX_X: f32 = 8.0;
const CELL_PX_Y: f32 = 16.0;

/// Rows reserved above the playfield.
const HUD_ROWS: u16 = 1;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_WALL: Color = Color::White;
const C_WALL_FLASH: Color = Color::Yellow;
const C_WALL_GREEN: Color = Color::Green;
const C_PLAYER: Color = Color::Red;
const C_PLAYER_POWERED: Color = Color::Yellow;
const C_ENEMY: Color = Color::Cyan;
const C_ENEMY_NEWBORN: Color = Color::White;
const C_ENEMY_COOLDOWN: Color = Color::DarkBlue;
const C_PARTICLE_CYAN: Color = Color::Cyan;
const C_PARTICLE_YELLOW: Color = Color::Yellow;
const C_HUD_SPEED: Color = Color::Yellow;
const C_HUD_ENEMY: Color = Color::Cyan;
const C_HUD_STAGE: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;
const C_STAGE_CLEAR: Color = Color::Yellow;

/// Terminal cell for a world-pixel position.
fn cell_of(x: f32, y: f32) -> (u16, u16) {
    (
        (x / CELL_PX_X).floor().max(0.0) as u16,
        (y / CELL_PX_Y).floor().max(0.0) as u16 + HUD_ROWS,
    )
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &World) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_maze(out, state)?;
    draw_hud(out, state)?;

    for enemy in &state.enemies {
        draw_enemy(out, enemy, state.frame)?;
    }
    for particle in &state.particles {
        draw_particle(out, particle)?;
    }

    draw_player(out, state)?;
    draw_controls_hint(out, state)?;

    if state.stage_clear_timer > 0 {
        draw_stage_clear(out, state)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, playfield_bottom(state) + 1))?;
    out.flush()?;
    Ok(())
}

fn playfield_bottom(state: &World) -> u16 {
    HUD_ROWS + state.grid.rows() as u16 - 1
}

// ── Maze ──────────────────────────────────────────────────────────────────────

fn draw_maze<W: Write>(out: &mut W, state: &World) -> std::io::Result<()> {
    let color = if state.wall_green_timer > 0 {
        C_WALL_GREEN
    } else if state.wall_flash_timer > 0 {
        C_WALL_FLASH
    } else {
        C_WALL
    };
    out.queue(style::SetForegroundColor(color))?;

    for gy in 0..state.grid.rows() {
        for gx in 0..state.grid.cols() {
            if state.grid.tile(gx, gy) == Tile::Wall {
                out.queue(cursor::MoveTo(gx as u16 * 2, gy as u16 + HUD_ROWS))?;
                out.queue(Print("██"))?;
            }
        }
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &World) -> std::io::Result<()> {
    let speed_ratio = state.player.current_speed / BASE_SPEED;

    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SPEED))?;
    out.queue(Print(format!("SPEED: x{:>5.2}", speed_ratio)))?;

    out.queue(cursor::MoveTo(15, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_STAGE))?;
    out.queue(Print(format!("STAGE {}", state.stage)))?;

    let enemy_str = format!("ENEMY: {:>3}/{}", state.enemies.len(), MAX_ENEMIES);
    let col = (state.grid.cols() as u16 * 2).saturating_sub(enemy_str.chars().count() as u16);
    out.queue(cursor::MoveTo(col, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_ENEMY))?;
    out.queue(Print(enemy_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, frame: u64) -> std::io::Result<()> {
    let color = if enemy.spawn_timer < SPAWN_DURATION {
        C_ENEMY_NEWBORN
    } else if enemy.multiply_cooldown > 0 {
        // Cooldown blink, toggling every 10 frames
        if (frame / 10) % 2 == 0 {
            C_ENEMY_COOLDOWN
        } else {
            C_ENEMY
        }
    } else {
        C_ENEMY
    };

    let (col, row) = cell_of(enemy.x, enemy.y);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print("o"))?;
    Ok(())
}

fn draw_particle<W: Write>(out: &mut W, particle: &Particle) -> std::io::Result<()> {
    let (col, row) = cell_of(particle.x, particle.y);
    out.queue(cursor::MoveTo(col, row))?;
    match particle.color {
        ParticleColor::Cyan => {
            out.queue(style::SetForegroundColor(C_PARTICLE_CYAN))?;
            out.queue(Print("·"))?;
        }
        ParticleColor::Yellow => {
            out.queue(style::SetForegroundColor(C_PARTICLE_YELLOW))?;
            out.queue(Print("*"))?;
        }
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, state: &World) -> std::io::Result<()> {
    let player = &state.player;
    let (col, row) = cell_of(player.x, player.y);
    let powered = is_powered(player);

    if powered {
        // Pulsing ring driven by the ring phase
        if player.ring_time.sin() > 0.0 {
            out.queue(style::SetForegroundColor(C_PLAYER_POWERED))?;
            for (dc, dr) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
                let rc = col as i32 + dc;
                let rr = row as i32 + dr;
                if rc >= 0 && rr >= HUD_ROWS as i32 && rr <= playfield_bottom(state) as i32 {
                    out.queue(cursor::MoveTo(rc as u16, rr as u16))?;
                    out.queue(Print("·"))?;
                }
            }
        }
        out.queue(style::SetForegroundColor(C_PLAYER_POWERED))?;
    } else {
        out.queue(style::SetForegroundColor(C_PLAYER))?;
    }

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("@"))?;

    // Direction indicator one cell ahead
    let (dx, dy) = player.direction;
    if dx != 0.0 || dy != 0.0 {
        let step = |v: f32| {
            if v < 0.0 {
                -1i32
            } else if v > 0.0 {
                1
            } else {
                0
            }
        };
        let (sx, sy) = (step(dx), step(dy));
        let glyph = match (sx, sy) {
            (-1, 0) => "←",
            (1, 0) => "→",
            (0, -1) => "↑",
            (0, 1) => "↓",
            (-1, -1) => "↖",
            (1, -1) => "↗",
            (-1, 1) => "↙",
            (1, 1) => "↘",
            _ => return Ok(()),
        };
        let ac = col as i32 + sx;
        let ar = row as i32 + sy;
        if ac >= 0 && ar >= HUD_ROWS as i32 && ar <= playfield_bottom(state) as i32 {
            out.queue(cursor::MoveTo(ac as u16, ar as u16))?;
            out.queue(Print(glyph))?;
        }
    }

    Ok(())
}

// ── Controls hint (below the playfield) ───────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, state: &World) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, playfield_bottom(state) + 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("←↑↓→ / WASD : Move   Mouse drag : Steer   Q : Quit"))?;
    Ok(())
}

// ── Stage-clear banner ────────────────────────────────────────────────────────

fn draw_stage_clear<W: Write>(out: &mut W, state: &World) -> std::io::Result<()> {
    let text = "NEXT STAGE";
    let cx = state.grid.cols() as u16; // half of cols*2
    let col = cx.saturating_sub(text.len() as u16 / 2);
    let row = HUD_ROWS + state.grid.rows() as u16 / 2;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_STAGE_CLEAR))?;
    out.queue(Print(text))?;
    Ok(())
}
