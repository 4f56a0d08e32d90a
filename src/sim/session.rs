/// GameState: the complete state of a running puzzle session.
///
/// Owns the BoardState plus everything around it: the current drag
/// gesture, phase, level bookkeeping, and the transient message bar.
///
/// ## Drag protocol
///
/// One gesture at a time: `start_drag` while a gesture is live is
/// ignored. A gesture locks onto an axis once (`lock_axis`), which
/// computes the movement bounds exactly once — they stay valid for the
/// whole gesture because no other block can move meanwhile. `end_drag`
/// classifies the rounded target and is the single point where board
/// state mutates. A gesture that never locks an axis is abandoned by
/// `cancel_drag` with no state change.
///
/// ## Completion
///
/// Removal is immediate and synchronous on an `Exited` drop; any visual
/// delay is the renderer's business, sequenced after the state
/// transition. `PuzzleSolved` is latched: it fires exactly once.

use crate::domain::board::BoardState;
use crate::domain::motion::{self, Axis, DropOutcome, MoveBounds};
use crate::sim::event::GameEvent;
use crate::sim::level::{self, LevelDef, LevelError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Solved,
    GameComplete,
}

/// A live drag gesture. Grid-unit fields are the logic; `visual_off`
/// is the clamped pixel offset the renderer draws the block at.
#[derive(Clone, Copy, Debug)]
pub struct DragGesture {
    pub block_id: u32,
    pub origin: (i32, i32),
    pub axis: Option<Axis>,
    pub bounds: Option<MoveBounds>,
    pub visual_off: (i32, i32),
}

pub struct GameState {
    pub board: BoardState,
    pub drag: Option<DragGesture>,
    solved: bool,

    // ── Meta ──
    pub phase: Phase,
    pub current_level: usize,
    pub total_levels: usize,
    pub level_name: String,
    pub moves: u32,

    // ── UI ──
    pub selected: Option<u32>,
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            board: BoardState::new(0, 0, vec![], vec![]),
            drag: None,
            solved: false,
            phase: Phase::Title,
            current_level: 0,
            total_levels: 0,
            level_name: String::new(),
            moves: 0,
            selected: None,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
        }
    }

    /// Load a level into the session. Past the last level → GameComplete.
    pub fn load_level(&mut self, levels: &[LevelDef], idx: usize) -> Result<(), LevelError> {
        self.total_levels = levels.len();
        if idx >= levels.len() {
            self.phase = Phase::GameComplete;
            return Ok(());
        }

        let def = &levels[idx];
        self.board = level::build_board(def)?;
        self.drag = None;
        self.solved = false;
        self.current_level = idx;
        self.level_name = def.name.clone();
        self.moves = 0;
        self.selected = self.board.blocks().first().map(|b| b.id);
        self.phase = Phase::Playing;
        self.anim_tick = 0;
        self.set_message(&def.name, 40);
        Ok(())
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    // ── Drag protocol ──

    /// Begin a gesture on a block. Ignored (returns false) while another
    /// gesture is live, outside Playing, or for an unknown/exited id.
    pub fn start_drag(&mut self, id: u32) -> bool {
        if self.phase != Phase::Playing || self.drag.is_some() {
            return false;
        }
        let origin = match self.board.block(id) {
            Some(b) => (b.x, b.y),
            None => return false,
        };
        self.selected = Some(id);
        self.drag = Some(DragGesture {
            block_id: id,
            origin,
            axis: None,
            bounds: None,
            visual_off: (0, 0),
        });
        true
    }

    /// Lock the gesture onto an axis, computing bounds once. Returns the
    /// bounds for visual clamping; None when no gesture is live. Calling
    /// again with any axis returns the already-locked bounds.
    pub fn lock_axis(&mut self, axis: Axis) -> Option<MoveBounds> {
        let gesture = self.drag.as_mut()?;
        if let Some(bounds) = gesture.bounds {
            return Some(bounds);
        }
        let block = *self.board.block(gesture.block_id)?;
        let bounds = motion::move_bounds(&self.board, &block, axis);
        gesture.axis = Some(axis);
        gesture.bounds = Some(bounds);
        Some(bounds)
    }

    /// Abandon the gesture with no state change (drag never crossed the
    /// movement threshold, or the pointer left without a drop).
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Resolve the gesture at the rounded target coordinate along the
    /// locked axis. No-op (empty events) for an axis-less gesture.
    pub fn end_drag(&mut self, target: i32) -> Vec<GameEvent> {
        let gesture = match self.drag.take() {
            Some(g) => g,
            None => return vec![],
        };
        let axis = match gesture.axis {
            Some(a) => a,
            None => return vec![],
        };
        let (tx, ty) = match axis {
            Axis::X => (target, gesture.origin.1),
            Axis::Y => (gesture.origin.0, target),
        };
        self.apply_drop(gesture.block_id, tx, ty)
    }

    /// Keyboard path: slide a block one step along an axis, clamped to
    /// its movement bounds. Built on the same bounds/classify operations
    /// as the pointer path.
    pub fn try_move(&mut self, id: u32, axis: Axis, delta: i32) -> Vec<GameEvent> {
        if self.phase != Phase::Playing || self.drag.is_some() {
            return vec![];
        }
        let block = match self.board.block(id) {
            Some(b) => *b,
            None => return vec![],
        };
        let current = match axis {
            Axis::X => block.x,
            Axis::Y => block.y,
        };
        let bounds = motion::move_bounds(&self.board, &block, axis);
        let target = bounds.clamp(current + delta);
        if target == current {
            return vec![];
        }
        let (tx, ty) = match axis {
            Axis::X => (target, block.y),
            Axis::Y => (block.x, target),
        };
        self.apply_drop(id, tx, ty)
    }

    // ── Drop resolution: the single state-mutating point ──

    fn apply_drop(&mut self, id: u32, tx: i32, ty: i32) -> Vec<GameEvent> {
        let block = match self.board.block(id) {
            Some(b) => *b,
            None => return vec![],
        };

        let mut events = vec![];
        match motion::classify_drop(&self.board, &block, tx, ty) {
            DropOutcome::Rejected => {
                events.push(GameEvent::DropRejected { id });
            }
            DropOutcome::Moved => {
                self.board.commit_move(id, tx, ty);
                self.moves += 1;
                events.push(GameEvent::BlockMoved { id, x: tx, y: ty });
            }
            DropOutcome::Exited => {
                self.board.remove_block(id);
                self.moves += 1;
                if self.selected == Some(id) {
                    self.selected = self.board.blocks().first().map(|b| b.id);
                }
                events.push(GameEvent::BlockExited { id });
                if self.board.is_cleared() && !self.solved {
                    self.solved = true;
                    self.phase = Phase::Solved;
                    self.anim_tick = 0;
                    events.push(GameEvent::PuzzleSolved);
                }
            }
        }
        events
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
