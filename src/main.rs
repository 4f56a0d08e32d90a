/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};

use config::GameConfig;
use domain::board::BoardState;
use domain::motion::Axis;
use sim::event::GameEvent;
use sim::level::{self, LevelDef};
use sim::session::{GameState, Phase};
use ui::input::InputState;
use ui::renderer::{self, Renderer};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    let levels = level::load_levels(&config);

    let mut gs = GameState::new();
    gs.total_levels = levels.len();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut gs, &mut renderer, &levels, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Block Jam!");
}

fn game_loop(
    gs: &mut GameState,
    renderer: &mut Renderer,
    levels: &[LevelDef],
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    // Terminal position where the current pointer gesture started.
    // Lives here rather than in the gesture: it is a pixel-space detail
    // the session never needs.
    let mut pointer_start: Option<(i32, i32)> = None;

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(gs, &kb, levels, config) {
            break;
        }

        if gs.phase == Phase::Playing {
            let mouse: Vec<MouseEvent> = kb.mouse_events.drain(..).collect();
            for ev in mouse {
                handle_mouse(gs, &ev, &mut pointer_start, config);
            }
        } else {
            pointer_start = None;
        }

        if last_tick.elapsed() >= tick_rate {
            gs.anim_tick = gs.anim_tick.wrapping_add(1);
            if gs.message_timer > 0 {
                gs.message_timer -= 1;
                if gs.message_timer == 0 {
                    gs.message.clear();
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(gs, &config.display)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Pointer gestures ──

/// One pointer event against the live session. Down grabs a block, Drag
/// locks an axis once the pointer has travelled far enough and then
/// slides the block visually inside its precomputed bounds, Up resolves
/// the drop at the nearest grid cell.
fn handle_mouse(
    gs: &mut GameState,
    ev: &MouseEvent,
    pointer_start: &mut Option<(i32, i32)>,
    config: &GameConfig,
) {
    let cw = config.display.cell_width as i32;
    let ch = config.display.cell_height as i32;

    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let (gx, gy) = renderer::cell_under(&config.display, ev.column, ev.row);
            if let Some(id) = block_at(&gs.board, gx, gy) {
                if gs.start_drag(id) {
                    *pointer_start = Some((ev.column as i32, ev.row as i32));
                }
            }
        }

        MouseEventKind::Drag(MouseButton::Left) => {
            let (sx, sy) = match *pointer_start {
                Some(p) => p,
                None => return,
            };
            let gesture = match gs.drag {
                Some(g) => g,
                None => return,
            };

            let dx = ev.column as i32 - sx;
            let dy = ev.row as i32 - sy;
            // Rows are taller than columns are wide; scale row travel up
            // so the axis choice feels symmetric.
            let dy_scaled = dy * cw / ch.max(1);

            let axis = match gesture.axis {
                Some(a) => a,
                None => {
                    let threshold = config.input.drag_threshold as i32;
                    if dx.abs() < threshold && dy_scaled.abs() < threshold {
                        return;
                    }
                    let axis = if dx.abs() >= dy_scaled.abs() { Axis::X } else { Axis::Y };
                    if gs.lock_axis(axis).is_none() {
                        return;
                    }
                    axis
                }
            };

            // Clamp the visual offset to the gesture's bounds so the
            // block never draws where it cannot drop.
            let bounds = match gs.drag.and_then(|g| g.bounds) {
                Some(b) => b,
                None => return,
            };
            if let Some(g) = gs.drag.as_mut() {
                g.visual_off = match axis {
                    Axis::X => {
                        let lo = (bounds.min - g.origin.0) * cw;
                        let hi = (bounds.max - g.origin.0) * cw;
                        (dx.clamp(lo, hi), 0)
                    }
                    Axis::Y => {
                        let lo = (bounds.min - g.origin.1) * ch;
                        let hi = (bounds.max - g.origin.1) * ch;
                        (0, dy.clamp(lo, hi))
                    }
                };
            }
        }

        MouseEventKind::Up(MouseButton::Left) => {
            *pointer_start = None;
            let gesture = match gs.drag {
                Some(g) => g,
                None => return,
            };
            match gesture.axis {
                Some(axis) => {
                    let target = match axis {
                        Axis::X => gesture.origin.0 + round_to_cells(gesture.visual_off.0, cw),
                        Axis::Y => gesture.origin.1 + round_to_cells(gesture.visual_off.1, ch),
                    };
                    let events = gs.end_drag(target);
                    process_events(gs, &events, config);
                }
                None => gs.cancel_drag(), // a click: block stays selected
            }
        }

        _ => {}
    }
}

/// Nearest whole number of grid cells for a pixel offset.
fn round_to_cells(px: i32, cell: i32) -> i32 {
    let cell = cell.max(1);
    (px as f64 / cell as f64).round() as i32
}

fn block_at(board: &BoardState, gx: i32, gy: i32) -> Option<u32> {
    board
        .blocks()
        .iter()
        .find(|b| gx >= b.x && gx < b.right() && gy >= b.y && gy < b.bottom())
        .map(|b| b.id)
}

fn process_events(gs: &mut GameState, events: &[GameEvent], config: &GameConfig) {
    for event in events {
        match event {
            GameEvent::DropRejected { .. } => {
                gs.set_message("Can't drop there", config.speed.message_ticks / 2);
            }
            GameEvent::BlockExited { .. } => {
                gs.set_message("Block out!", config.speed.message_ticks / 2);
            }
            GameEvent::PuzzleSolved => {
                gs.message.clear();
                gs.message_timer = 0;
            }
            GameEvent::BlockMoved { .. } => {}
        }
    }
}

// ── Key Constants ──

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

fn detect_slide(kb: &InputState) -> Option<(Axis, i32)> {
    if kb.was_pressed(KeyCode::Left) {
        Some((Axis::X, -1))
    } else if kb.was_pressed(KeyCode::Right) {
        Some((Axis::X, 1))
    } else if kb.was_pressed(KeyCode::Up) {
        Some((Axis::Y, -1))
    } else if kb.was_pressed(KeyCode::Down) {
        Some((Axis::Y, 1))
    } else {
        None
    }
}

fn return_to_title(gs: &mut GameState) {
    let total = gs.total_levels;
    *gs = GameState::new();
    gs.total_levels = total;
}

fn start_level(gs: &mut GameState, levels: &[LevelDef], idx: usize) {
    if let Err(e) = gs.load_level(levels, idx) {
        // Levels were validated at load time; a failure here means the
        // file changed underneath us. Bail to the title with a message.
        return_to_title(gs);
        gs.set_message(&format!("Level failed to load: {e}"), 80);
    }
}

/// Phase-dependent key handling. Returns true to quit.
fn handle_meta(gs: &mut GameState, kb: &InputState, levels: &[LevelDef], config: &GameConfig) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM);
    let esc = kb.was_pressed(KeyCode::Esc);

    match gs.phase {
        // ── Title Screen ──
        Phase::Title => {
            if confirm {
                start_level(gs, levels, 0);
            } else if kb.any_pressed(KEYS_QUIT) || esc {
                return true;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            if esc {
                return_to_title(gs);
                return false;
            }
            if kb.any_pressed(KEYS_RESTART) {
                let idx = gs.current_level;
                start_level(gs, levels, idx);
                gs.set_message("Level restarted", config.speed.message_ticks);
                return false;
            }

            // Tab cycles the keyboard selection through remaining blocks
            if kb.was_pressed(KeyCode::Tab) {
                gs.selected = next_block(&gs.board, gs.selected);
            }

            if gs.drag.is_none() {
                if let (Some(id), Some((axis, delta))) = (gs.selected, detect_slide(kb)) {
                    let events = gs.try_move(id, axis, delta);
                    process_events(gs, &events, config);
                }
            }
        }

        // ── Solved ──
        Phase::Solved => {
            // Brief hold so the final flick can't skip the dialog
            if gs.anim_tick >= config.speed.solved_hold_ticks {
                if confirm {
                    let next = gs.current_level + 1;
                    start_level(gs, levels, next);
                } else if esc {
                    return_to_title(gs);
                }
            }
        }

        // ── Game Complete ──
        Phase::GameComplete => {
            if confirm || esc {
                return_to_title(gs);
            } else if kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }
    }

    false
}

fn next_block(board: &BoardState, selected: Option<u32>) -> Option<u32> {
    let blocks = board.blocks();
    if blocks.is_empty() {
        return None;
    }
    let idx = selected
        .and_then(|id| blocks.iter().position(|b| b.id == id))
        .map(|i| (i + 1) % blocks.len())
        .unwrap_or(0);
    Some(blocks[idx].id)
}
