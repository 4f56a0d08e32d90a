/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.toml` files, sorted by filename)
///   2. Built-in embedded levels
///
/// ## Level format (TOML):
///   ```toml
///   name = "Crossing"
///   width = 6
///   height = 6
///
///   [[doors]]
///   side = "left"        # top | bottom | left | right
///   x = -1               # flush against the named side, one cell thick
///   y = 0
///   width = 1
///   height = 3
///   color = "red"
///
///   [[blocks]]
///   id = 1
///   x = 0
///   y = 0
///   w = 1
///   h = 3
///   color = "red"
///   ```
///
/// Malformed levels are a configuration error: `build_board` fails fast
/// with a descriptive `LevelError` instead of letting the engine
/// misbehave later. The directory scanner reports broken files to stderr
/// and skips them.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::config::GameConfig;
use crate::domain::board::BoardState;
use crate::domain::color::{BlockColor, Side};
use crate::domain::motion;
use crate::domain::piece::{Block, Door};

/// A level template as loaded. Never mutated: `build_board` deep-copies
/// blocks out of it, so restarting a level always starts from here.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelDef {
    #[serde(default = "default_name")]
    pub name: String,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub doors: Vec<DoorDef>,
    pub blocks: Vec<BlockDef>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct DoorDef {
    pub side: Side,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: BlockColor,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct BlockDef {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub color: BlockColor,
}

fn default_name() -> String {
    "Unnamed Level".to_string()
}

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum LevelError {
    Parse(toml::de::Error),
    BadGrid { width: i32, height: i32 },
    BadBlockSize { id: u32, w: i32, h: i32 },
    DuplicateBlockId { id: u32 },
    DoorNotFlush { side: Side, x: i32, y: i32 },
    EmptyDoorSpan { side: Side, x: i32, y: i32 },
    BadStartingPlacement { id: u32 },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Parse(e) => write!(f, "level parse error: {e}"),
            LevelError::BadGrid { width, height } => {
                write!(f, "grid dimensions must be positive, got {width}x{height}")
            }
            LevelError::BadBlockSize { id, w, h } => {
                write!(f, "block {id} has non-positive size {w}x{h}")
            }
            LevelError::DuplicateBlockId { id } => {
                write!(f, "block id {id} appears more than once")
            }
            LevelError::DoorNotFlush { side, x, y } => {
                write!(f, "door at ({x},{y}) is not flush against the {} wall", side.name())
            }
            LevelError::EmptyDoorSpan { side, x, y } => {
                write!(f, "door at ({x},{y}) on the {} wall has an empty span", side.name())
            }
            LevelError::BadStartingPlacement { id } => {
                write!(f, "block {id} starts overlapping another block or an unadmitted wall")
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse one level from TOML text.
pub fn parse_level(text: &str) -> Result<LevelDef, LevelError> {
    toml::from_str(text).map_err(LevelError::Parse)
}

/// Validate a level template and deep-copy it into a fresh BoardState.
pub fn build_board(def: &LevelDef) -> Result<BoardState, LevelError> {
    if def.width <= 0 || def.height <= 0 {
        return Err(LevelError::BadGrid { width: def.width, height: def.height });
    }

    for b in &def.blocks {
        if b.w < 1 || b.h < 1 {
            return Err(LevelError::BadBlockSize { id: b.id, w: b.w, h: b.h });
        }
        if def.blocks.iter().filter(|o| o.id == b.id).count() > 1 {
            return Err(LevelError::DuplicateBlockId { id: b.id });
        }
    }

    let mut doors = Vec::with_capacity(def.doors.len());
    for d in &def.doors {
        validate_door(def, d)?;
        doors.push(Door {
            side: d.side,
            x: d.x,
            y: d.y,
            width: d.width,
            height: d.height,
            color: d.color,
        });
    }

    let blocks: Vec<Block> = def
        .blocks
        .iter()
        .map(|b| Block { id: b.id, x: b.x, y: b.y, w: b.w, h: b.h, color: b.color })
        .collect();

    let board = BoardState::new(def.width, def.height, doors, blocks);

    // Re-validate every starting placement through the engine itself:
    // this catches overlapping blocks and blocks outside the grid (or
    // protruding where no matching door admits them) in one pass.
    for b in board.blocks() {
        if !motion::placement_valid(&board, b, b.x, b.y) {
            return Err(LevelError::BadStartingPlacement { id: b.id });
        }
    }

    Ok(board)
}

/// Doors are one cell thick and flush against their wall; the long span
/// must be at least one cell and lie within the wall segment.
fn validate_door(def: &LevelDef, d: &DoorDef) -> Result<(), LevelError> {
    let empty = LevelError::EmptyDoorSpan { side: d.side, x: d.x, y: d.y };
    let not_flush = LevelError::DoorNotFlush { side: d.side, x: d.x, y: d.y };

    match d.side {
        Side::Left | Side::Right => {
            if d.height < 1 {
                return Err(empty);
            }
            let wall_x = if d.side == Side::Left { -1 } else { def.width };
            if d.x != wall_x || d.width != 1 || d.y < 0 || d.y + d.height > def.height {
                return Err(not_flush);
            }
        }
        Side::Top | Side::Bottom => {
            if d.width < 1 {
                return Err(empty);
            }
            let wall_y = if d.side == Side::Top { -1 } else { def.height };
            if d.y != wall_y || d.height != 1 || d.x < 0 || d.x + d.width > def.width {
                return Err(not_flush);
            }
        }
    }
    Ok(())
}

/// Load the playable level list: `.toml` files from the configured
/// directory (sorted by filename), or the embedded set when the directory
/// yields nothing. Broken files are reported and skipped; every returned
/// level has already passed `build_board` validation.
pub fn load_levels(config: &GameConfig) -> Vec<LevelDef> {
    let mut levels = load_from_directory(&config.levels_dir);
    if levels.is_empty() {
        levels = embedded_levels();
    }
    levels
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    let mut files: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |x| x == "toml"))
        .collect();
    files.sort();

    let mut levels = vec![];
    for path in files {
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Warning: could not read {}: {e}", path.display());
                continue;
            }
        };
        match parse_level(&text).and_then(|def| build_board(&def).map(|_| def)) {
            Ok(def) => levels.push(def),
            Err(e) => {
                eprintln!("Warning: skipping {}: {e}", path.display());
            }
        }
    }
    levels
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

const LEVEL_WARMUP: &str = r#"
name = "Warmup"
width = 4
height = 4

[[doors]]
side = "right"
x = 4
y = 0
width = 1
height = 2
color = "red"

[[doors]]
side = "bottom"
x = 2
y = 4
width = 2
height = 1
color = "blue"

[[blocks]]
id = 1
x = 0
y = 0
w = 2
h = 1
color = "red"

[[blocks]]
id = 2
x = 2
y = 1
w = 1
h = 2
color = "blue"
"#;

const LEVEL_CROSSING: &str = r#"
name = "Crossing"
width = 6
height = 6

[[doors]]
side = "top"
x = 0
y = -1
width = 6
height = 1
color = "blue"

[[doors]]
side = "bottom"
x = 0
y = 6
width = 3
height = 1
color = "purple"

[[doors]]
side = "bottom"
x = 3
y = 6
width = 3
height = 1
color = "orange"

[[doors]]
side = "left"
x = -1
y = 0
width = 1
height = 3
color = "red"

[[doors]]
side = "left"
x = -1
y = 3
width = 1
height = 3
color = "yellow"

[[doors]]
side = "right"
x = 6
y = 0
width = 1
height = 3
color = "green"

[[doors]]
side = "right"
x = 6
y = 3
width = 1
height = 3
color = "blue"

[[blocks]]
id = 1
x = 0
y = 0
w = 2
h = 1
color = "green"

[[blocks]]
id = 2
x = 4
y = 0
w = 2
h = 1
color = "yellow"

[[blocks]]
id = 3
x = 2
y = 1
w = 2
h = 1
color = "blue"

[[blocks]]
id = 4
x = 0
y = 1
w = 2
h = 2
color = "purple"

[[blocks]]
id = 5
x = 4
y = 1
w = 2
h = 2
color = "purple"

[[blocks]]
id = 6
x = 2
y = 2
w = 2
h = 2
color = "yellow"

[[blocks]]
id = 7
x = 0
y = 3
w = 1
h = 3
color = "blue"

[[blocks]]
id = 8
x = 5
y = 3
w = 1
h = 3
color = "blue"

[[blocks]]
id = 9
x = 1
y = 5
w = 2
h = 1
color = "red"

[[blocks]]
id = 10
x = 3
y = 5
w = 2
h = 1
color = "orange"
"#;

pub fn embedded_levels() -> Vec<LevelDef> {
    [LEVEL_WARMUP, LEVEL_CROSSING]
        .iter()
        .filter_map(|src| parse_level(src).ok())
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_levels_parse_and_validate() {
        let levels = embedded_levels();
        assert_eq!(levels.len(), 2);
        for def in &levels {
            let board = build_board(def).expect("embedded level must validate");
            assert_eq!(board.blocks().len(), def.blocks.len());
            assert_eq!(board.doors().len(), def.doors.len());
        }
    }

    #[test]
    fn build_board_deep_copies_template() {
        let def = embedded_levels().into_iter().next().unwrap();
        let mut board = build_board(&def).unwrap();
        let first = board.blocks()[0].id;
        board.remove_block(first);
        // The template still has every block: restart works from it
        assert_eq!(def.blocks.len(), board.blocks().len() + 1);

        let fresh = build_board(&def).unwrap();
        assert_eq!(fresh.blocks().len(), def.blocks.len());
    }

    #[test]
    fn rejects_non_positive_grid() {
        let err = parse_and_build("width = 0\nheight = 4\nblocks = []");
        assert!(matches!(err, Err(LevelError::BadGrid { .. })));
    }

    #[test]
    fn rejects_zero_size_block() {
        let err = parse_and_build(
            "width = 4\nheight = 4\n\n[[blocks]]\nid = 1\nx = 0\ny = 0\nw = 0\nh = 1\ncolor = \"red\"",
        );
        assert!(matches!(err, Err(LevelError::BadBlockSize { id: 1, .. })));
    }

    #[test]
    fn rejects_duplicate_block_ids() {
        let err = parse_and_build(
            "width = 4\nheight = 4\n\n\
             [[blocks]]\nid = 1\nx = 0\ny = 0\nw = 1\nh = 1\ncolor = \"red\"\n\n\
             [[blocks]]\nid = 1\nx = 2\ny = 2\nw = 1\nh = 1\ncolor = \"blue\"",
        );
        assert!(matches!(err, Err(LevelError::DuplicateBlockId { id: 1 })));
    }

    #[test]
    fn rejects_door_off_the_wall() {
        let err = parse_and_build(
            "width = 4\nheight = 4\n\n\
             [[doors]]\nside = \"left\"\nx = 0\ny = 0\nwidth = 1\nheight = 2\ncolor = \"red\"\n\n\
             [[blocks]]\nid = 1\nx = 0\ny = 0\nw = 1\nh = 1\ncolor = \"red\"",
        );
        assert!(matches!(err, Err(LevelError::DoorNotFlush { .. })));
    }

    #[test]
    fn rejects_overlapping_starting_blocks() {
        let err = parse_and_build(
            "width = 4\nheight = 4\n\n\
             [[blocks]]\nid = 1\nx = 0\ny = 0\nw = 2\nh = 2\ncolor = \"red\"\n\n\
             [[blocks]]\nid = 2\nx = 1\ny = 1\nw = 2\nh = 2\ncolor = \"blue\"",
        );
        assert!(matches!(err, Err(LevelError::BadStartingPlacement { .. })));
    }

    #[test]
    fn rejects_block_outside_grid() {
        let err = parse_and_build(
            "width = 4\nheight = 4\n\n\
             [[blocks]]\nid = 1\nx = 3\ny = 0\nw = 2\nh = 1\ncolor = \"red\"",
        );
        assert!(matches!(err, Err(LevelError::BadStartingPlacement { id: 1 })));
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(matches!(parse_level("not toml at all ["), Err(LevelError::Parse(_))));
    }

    fn parse_and_build(text: &str) -> Result<BoardState, LevelError> {
        build_board(&parse_level(text)?)
    }
}
