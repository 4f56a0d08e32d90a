/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws, which matters
/// here: a pointer drag redraws the board every frame.
///
/// ## Board layout
///
/// The grid is drawn at a fixed origin with a one-cell band around it
/// where the doors sit (doors live at grid coordinate -1 / extent, flush
/// against the wall, so the band maps them with the same cell transform
/// as the blocks). `board_origin` / `cell_under` expose the transform so
/// the input side can hit-test mouse positions.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::DisplayConfig;
use crate::domain::color::BlockColor;
use crate::domain::piece::{Block, Door};
use crate::sim::session::{GameState, Phase};

// ── Layout ──

const HUD_ROW: usize = 0;
const BOARD_ROW: usize = 2;
const MARGIN_X: usize = 2;

/// Terminal position of grid cell (0, 0). The door band occupies one
/// grid cell of space around the origin.
pub fn board_origin(display: &DisplayConfig) -> (i32, i32) {
    (
        (MARGIN_X + display.cell_width as usize) as i32,
        (BOARD_ROW + display.cell_height as usize) as i32,
    )
}

/// Grid cell under a terminal position. May be negative or past the
/// grid extent (the door band); the caller decides what that means.
pub fn cell_under(display: &DisplayConfig, col: u16, row: u16) -> (i32, i32) {
    let (ox, oy) = board_origin(display);
    (
        (col as i32 - ox).div_euclid(display.cell_width as i32),
        (row as i32 - oy).div_euclid(display.cell_height as i32),
    )
}

// ── Palette ──

fn block_fill(color: BlockColor) -> Color {
    match color {
        BlockColor::Red => Color::Rgb { r: 200, g: 70, b: 70 },
        BlockColor::Blue => Color::Rgb { r: 80, g: 120, b: 220 },
        BlockColor::Green => Color::Rgb { r: 80, g: 170, b: 95 },
        BlockColor::Yellow => Color::Rgb { r: 210, g: 180, b: 70 },
        BlockColor::Purple => Color::Rgb { r: 150, g: 95, b: 200 },
        BlockColor::Orange => Color::Rgb { r: 230, g: 140, b: 55 },
    }
}

/// Door tint: the block color at half intensity, so an open door reads
/// as a gap in the wall rather than another block.
fn door_fill(color: BlockColor) -> Color {
    match block_fill(color) {
        Color::Rgb { r, g, b } => Color::Rgb { r: r / 2, g: g / 2, b: b / 2 },
        other => other,
    }
}

fn lighten(color: Color) -> Color {
    match color {
        Color::Rgb { r, g, b } => Color::Rgb {
            r: r.saturating_add(45),
            g: g.saturating_add(45),
            b: b.saturating_add(45),
        },
        other => other,
    }
}

const GRID_BG: Color = Color::Rgb { r: 38, g: 38, b: 54 };
const WALL_BG: Color = Color::Rgb { r: 60, g: 60, b: 80 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, used for
    /// both Clear and cell backgrounds so inter-row gap pixels match.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors.
    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    /// Fill a rectangle of terminal cells.
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ch: char, fg: Color, bg: Color) {
        for ry in y..y + h {
            for rx in x..x + w {
                self.set(rx, ry, Cell::new(ch, fg, bg));
            }
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, gs: &GameState, display: &DisplayConfig) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        let phase_changed = self.last_phase != Some(gs.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(gs.phase);
        }

        self.front.clear();

        match gs.phase {
            Phase::Title => self.compose_title(gs),
            Phase::Playing => self.compose_game(gs, display),
            Phase::Solved => {
                self.compose_game(gs, display);
                self.compose_solved_dialog(gs);
            }
            Phase::GameComplete => self.compose_game_complete(gs),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame. Not ResetColor:
        // the terminal's native default may differ from BASE_BG and
        // cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, gs: &GameState, display: &DisplayConfig) {
        let buf_w = self.front.width as i32;
        let cw = display.cell_width as i32;
        let ch = display.cell_height as i32;
        let (ox, oy) = board_origin(display);

        // ── HUD row ──
        let hud = format!(
            " Level {}/{}  {}  Moves:{}  Blocks left:{} ",
            gs.current_level + 1,
            gs.total_levels,
            gs.level_name,
            gs.moves,
            gs.board.blocks().len(),
        );
        self.front.fill_rect(0, HUD_ROW as i32, buf_w, 1, ' ', Color::White, HUD_BG);
        self.front.put_str(0, HUD_ROW as i32, &hud, Color::White, HUD_BG);

        // ── Wall band (doors punch holes in it below) ──
        let band_x = ox - cw;
        let band_y = oy - ch;
        let band_w = (gs.board.width() + 2) * cw;
        let band_h = (gs.board.height() + 2) * ch;
        self.front.fill_rect(band_x, band_y, band_w, band_h, ' ', Color::White, WALL_BG);

        // ── Grid interior ──
        for gy in 0..gs.board.height() {
            for gx in 0..gs.board.width() {
                self.front.fill_rect(ox + gx * cw, oy + gy * ch, cw, ch, ' ', Color::White, GRID_BG);
            }
        }

        // ── Doors ──
        for door in gs.board.doors() {
            self.draw_door(door, display);
        }

        // ── Blocks (dragged one last, at its visual offset) ──
        let dragging = gs.drag.map(|g| g.block_id);
        for block in gs.board.blocks() {
            if Some(block.id) == dragging {
                continue;
            }
            let selected = gs.selected == Some(block.id) && dragging.is_none();
            self.draw_block(block, (0, 0), selected, display);
        }
        if let Some(gesture) = gs.drag {
            if let Some(block) = gs.board.block(gesture.block_id) {
                self.draw_block(block, gesture.visual_off, true, display);
            }
        }

        // ── Message bar ──
        let msg_row = oy + (gs.board.height() + 1) * ch + 1;
        if !gs.message.is_empty() && gs.message_timer > 0 {
            let msg = format!(" ◈ {} ", gs.message);
            self.front.put_str(MARGIN_X as i32, msg_row, &msg, Color::Yellow, Cell::BASE_BG);
        }

        // ── Help line ──
        let help = " drag a block · Tab select · ←↑↓→ slide · R restart · Esc quit ";
        self.front.put_str(
            MARGIN_X as i32,
            self.front.height as i32 - 1,
            help,
            Color::DarkGrey,
            Cell::BASE_BG,
        );
    }

    fn draw_door(&mut self, door: &Door, display: &DisplayConfig) {
        let cw = display.cell_width as i32;
        let ch = display.cell_height as i32;
        let (ox, oy) = board_origin(display);
        self.front.fill_rect(
            ox + door.x * cw,
            oy + door.y * ch,
            door.width * cw,
            door.height * ch,
            '░',
            lighten(door_fill(door.color)),
            door_fill(door.color),
        );
    }

    fn draw_block(&mut self, block: &Block, off: (i32, i32), selected: bool, display: &DisplayConfig) {
        let cw = display.cell_width as i32;
        let ch = display.cell_height as i32;
        let (ox, oy) = board_origin(display);

        let bg = if selected {
            lighten(block_fill(block.color))
        } else {
            block_fill(block.color)
        };
        let x = ox + block.x * cw + off.0;
        let y = oy + block.y * ch + off.1;
        let w = block.w * cw;
        let h = block.h * ch;
        self.front.fill_rect(x, y, w, h, ' ', Color::White, bg);

        // Thin outline so adjacent same-color blocks stay distinguishable
        for rx in x..x + w {
            self.front.set(rx, y, Cell::new('▔', Cell::BASE_BG, bg));
            self.front.set(rx, y + h - 1, Cell::new('▁', Cell::BASE_BG, bg));
        }
        for ry in y..y + h {
            self.front.set(x, ry, Cell::new('▏', Cell::BASE_BG, bg));
        }
    }

    fn compose_solved_dialog(&mut self, gs: &GameState) {
        let lines = [
            "┌──────────────────────────┐",
            "│      LEVEL CLEARED!      │",
            "│                          │",
            "│   [Enter] Next level     │",
            "└──────────────────────────┘",
        ];
        let moves_line = format!("│   Solved in {:>4} moves   │", gs.moves);
        let cx = (self.front.width as i32 - lines[0].chars().count() as i32) / 2;
        let cy = (self.front.height as i32 / 2) - 3;
        for (i, line) in lines.iter().enumerate() {
            let text = if i == 2 { moves_line.as_str() } else { *line };
            self.front.put_str(cx, cy + i as i32, text, Color::White, HUD_BG);
        }
    }

    fn compose_title(&mut self, gs: &GameState) {
        let cy = (self.front.height as i32 / 2) - 4;
        let lines = [
            ("B L O C K   J A M", Color::Yellow),
            ("", Color::White),
            ("Slide every block out through a door of its color.", Color::White),
            ("", Color::White),
            ("[Enter] Start    [Q] Quit", Color::DarkGrey),
        ];
        for (i, (text, fg)) in lines.iter().enumerate() {
            let cx = (self.front.width as i32 - text.chars().count() as i32) / 2;
            self.front.put_str(cx, cy + i as i32 * 2, text, *fg, Cell::BASE_BG);
        }
        if gs.total_levels > 0 {
            let info = format!("{} levels loaded", gs.total_levels);
            let cx = (self.front.width as i32 - info.chars().count() as i32) / 2;
            self.front.put_str(cx, cy + 10, &info, Color::DarkGrey, Cell::BASE_BG);
        }
    }

    fn compose_game_complete(&mut self, gs: &GameState) {
        let cy = (self.front.height as i32 / 2) - 2;
        let cleared = format!("All {} levels solved. Nicely done.", gs.total_levels);
        let lines = [
            ("A L L   C L E A R", Color::Green),
            ("", Color::White),
            (cleared.as_str(), Color::White),
            ("", Color::White),
            ("[Enter] Title    [Q] Quit", Color::DarkGrey),
        ];
        for (i, (text, fg)) in lines.iter().enumerate() {
            let cx = (self.front.width as i32 - text.chars().count() as i32) / 2;
            self.front.put_str(cx, cy + i as i32, text, *fg, Cell::BASE_BG);
        }
    }
}
