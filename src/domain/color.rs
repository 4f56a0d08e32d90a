/// Color palette and boundary sides.
/// Blocks and doors share the same closed palette; a block may only
/// leave through a door of its own color.

use serde::Deserialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

/// Which grid boundary a door sits on.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Does the door's long axis run horizontally (along x)?
    /// Top/bottom doors span x; left/right doors span y.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}
