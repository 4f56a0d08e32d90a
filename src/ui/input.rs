/// Input state tracker.
///
/// Drains all pending terminal events once per frame and sorts them into:
///   - Fresh key presses (edge-triggered: menu actions, block moves)
///   - Mouse events in arrival order (the drag gesture consumes these)
///   - Raw key events, for meta handling (Ctrl+C)
///
/// Key Release events are ignored: every action in this game is a
/// one-shot, and terminal key repeat provides hold-to-slide for free.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent, poll};

pub struct InputState {
    /// Keys pressed (or repeated) during the most recent drain.
    presses: Vec<KeyCode>,

    /// Mouse events during the most recent drain, in order.
    pub mouse_events: Vec<MouseEvent>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            mouse_events: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.mouse_events.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    self.raw_events.push(key);
                    if key.kind != KeyEventKind::Release {
                        self.presses.push(key.code);
                    }
                }
                Ok(Event::Mouse(mouse)) => {
                    self.mouse_events.push(mouse);
                }
                _ => {}
            }
        }
    }

    /// Was this key pressed (or repeated) this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        use crossterm::event::KeyModifiers;
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
