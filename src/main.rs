mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::Print,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;

use maze_walk::compute::{init_world, tick};
use maze_walk::entities::{Sound, World};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Mouse-drag steering ───────────────────────────────────────────────────────

/// World pixels per terminal cell; drag vectors are measured in pixels so
/// the deadzone behaves the same horizontally and vertically despite the
/// 2:1 cell aspect.
const DRAG_PX_X: f32 = 8.0;
const DRAG_PX_Y: f32 = 16.0;

/// Minimum drag length in world pixels before steering kicks in.
const DRAG_DEADZONE: f32 = 5.0;

/// Tracks a press-and-drag gesture and turns it into a unit direction
/// vector.  Used only when the keyboard gives zero input.
#[derive(Default)]
struct DragSteering {
    origin: Option<(u16, u16)>,
    direction: (f32, f32),
}

impl DragSteering {
    fn handle(&mut self, ev: &MouseEvent) {
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.origin = Some((ev.column, ev.row));
                self.direction = (0.0, 0.0);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((ox, oy)) = self.origin {
                    let dx = (ev.column as f32 - ox as f32) * DRAG_PX_X;
                    let dy = (ev.row as f32 - oy as f32) * DRAG_PX_Y;
                    let length = (dx * dx + dy * dy).sqrt();
                    self.direction = if length >= DRAG_DEADZONE {
                        (dx / length, dy / length)
                    } else {
                        (0.0, 0.0)
                    };
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.origin = None;
                self.direction = (0.0, 0.0);
            }
            _ => {}
        }
    }
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// The simulation raises fire-and-forget sound events; a terminal only has
/// the bell, so the stage-clear fanfare rings it and everything else stays
/// visual (wall flash, newborn flash, spark particles).
fn play_sounds<W: Write>(out: &mut W, sounds: &[Sound]) -> std::io::Result<()> {
    if sounds.contains(&Sound::StageClear) {
        out.queue(Print("\u{0007}"))?;
    }
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we
/// maintain a `key_frame` map that records the frame number of the last
/// press/repeat event for every key.  Each frame we check which keys are
/// still "fresh" (within `HOLD_WINDOW` frames) and combine them into one
/// direction vector, so Up + Left diagonals work on terminals with no
/// key-release reporting.  When the keyboard vector is zero, the mouse
/// drag vector steers instead.
fn game_loop<W: Write>(
    out: &mut W,
    world: &mut World,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let mut rng = thread_rng();

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut drag = DragSteering::default();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    // Press: record key + handle one-shot actions
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(());
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(());
                            }
                            _ => {}
                        }
                    }
                    // Repeat: refresh timestamp so key stays "held"
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    // Release: remove key immediately (keyboard-enhancement path)
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(m) => drag.handle(&m),
                _ => {}
            }
        }

        // ── Resolve the direction vector for this frame ───────────────────────
        let left = is_held(&key_frame, &KeyCode::Left, frame)
            || is_held(&key_frame, &KeyCode::Char('a'), frame)
            || is_held(&key_frame, &KeyCode::Char('A'), frame);
        let right = is_held(&key_frame, &KeyCode::Right, frame)
            || is_held(&key_frame, &KeyCode::Char('d'), frame)
            || is_held(&key_frame, &KeyCode::Char('D'), frame);
        let up = is_held(&key_frame, &KeyCode::Up, frame)
            || is_held(&key_frame, &KeyCode::Char('w'), frame)
            || is_held(&key_frame, &KeyCode::Char('W'), frame);
        let down = is_held(&key_frame, &KeyCode::Down, frame)
            || is_held(&key_frame, &KeyCode::Char('s'), frame)
            || is_held(&key_frame, &KeyCode::Char('S'), frame);

        let mut input = (0.0f32, 0.0f32);
        if left {
            input.0 = -1.0;
        } else if right {
            input.0 = 1.0;
        }
        if up {
            input.1 = -1.0;
        } else if down {
            input.1 = 1.0;
        }
        // Keyboard has priority; drag steering fills in only when idle.
        if input == (0.0, 0.0) {
            input = drag.direction;
        }

        *world = tick(world, input, &mut rng);

        play_sounds(out, &world.sounds)?;
        display::render(out, world)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    crossterm::terminal::enable_raw_mode()?;
    out.execute(crossterm::terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back
    // gracefully to the HOLD_WINDOW expiry.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let mut world = init_world(&mut thread_rng());
    let result = game_loop(&mut out, &mut world, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();

    result
}
