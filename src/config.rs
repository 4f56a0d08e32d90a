/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub speed: SpeedConfig,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Terminal columns per grid cell.
    pub cell_width: u16,
    /// Terminal rows per grid cell.
    pub cell_height: u16,
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    /// Pointer travel (terminal columns, row travel scaled up to match)
    /// before a gesture locks onto an axis.
    pub drag_threshold: u16,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    /// Ticks the solved dialog waits before accepting input, so a final
    /// flick doesn't skip it.
    pub solved_hold_ticks: u32,
    pub message_ticks: u32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    input: TomlInput,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_cell_width")]
    cell_width: u16,
    #[serde(default = "default_cell_height")]
    cell_height: u16,
}

#[derive(Deserialize, Debug)]
struct TomlInput {
    #[serde(default = "default_drag_threshold")]
    drag_threshold: u16,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_solved_hold")]
    solved_hold_ticks: u32,
    #[serde(default = "default_message_ticks")]
    message_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_cell_width() -> u16 { 6 }
fn default_cell_height() -> u16 { 3 }
fn default_drag_threshold() -> u16 { 2 }
fn default_tick_rate() -> u64 { 50 }
fn default_solved_hold() -> u32 { 8 }    // ~0.4s before the dialog takes input
fn default_message_ticks() -> u32 { 40 }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
        }
    }
}

impl Default for TomlInput {
    fn default() -> Self {
        TomlInput { drag_threshold: default_drag_threshold() }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            solved_hold_ticks: default_solved_hold(),
            message_ticks: default_message_ticks(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { levels_dir: default_levels_dir() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            display: DisplayConfig {
                cell_width: toml_cfg.display.cell_width.max(2),
                cell_height: toml_cfg.display.cell_height.max(1),
            },
            input: InputConfig {
                drag_threshold: toml_cfg.input.drag_threshold.max(1),
            },
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms,
                solved_hold_ticks: toml_cfg.speed.solved_hold_ticks,
                message_ticks: toml_cfg.speed.message_ticks,
            },
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (resolve symlinks)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
