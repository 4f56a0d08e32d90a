/// Pieces: Block (the draggable rectangles) and Door (boundary openings).
///
/// Coordinates are grid cells, origin (0,0) top-left, `i32` because a
/// block legitimately occupies `-1` (one cell past the wall) while it is
/// passing through a door.

use super::color::{BlockColor, Side};

/// A draggable rectangular block. `(x, y)` is the top-left cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Block {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub color: BlockColor,
}

impl Block {
    /// One past the rightmost occupied column.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// One past the bottommost occupied row.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Would this block, placed at `(tx, ty)`, overlap `other`?
    /// Standard half-open axis-aligned rectangle test.
    #[inline]
    pub fn overlaps_at(&self, tx: i32, ty: i32, other: &Block) -> bool {
        tx < other.right()
            && tx + self.w > other.x
            && ty < other.bottom()
            && ty + self.h > other.y
    }
}

/// A door: an opening in the grid boundary, one cell thick, flush against
/// its side. Doors are immutable for the lifetime of a puzzle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Door {
    pub side: Side,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: BlockColor,
}

impl Door {
    /// Half-open interval `[start, end)` the door covers along the boundary
    /// axis: x for top/bottom doors, y for left/right doors.
    #[inline]
    pub fn span(&self) -> (i32, i32) {
        if self.side.is_horizontal() {
            (self.x, self.x + self.width)
        } else {
            (self.y, self.y + self.height)
        }
    }

    /// Does this door fully cover the edge interval `[start, end)`?
    #[inline]
    pub fn covers(&self, start: i32, end: i32) -> bool {
        let (d_start, d_end) = self.span();
        d_start <= start && end <= d_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: u32, x: i32, y: i32, w: i32, h: i32) -> Block {
        Block { id, x, y, w, h, color: BlockColor::Red }
    }

    #[test]
    fn overlap_detects_intersection() {
        let a = block(1, 0, 0, 2, 2);
        let b = block(2, 1, 1, 2, 2);
        assert!(a.overlaps_at(a.x, a.y, &b));
    }

    #[test]
    fn overlap_edge_touch_is_not_overlap() {
        let a = block(1, 0, 0, 2, 1);
        let b = block(2, 2, 0, 2, 1);
        assert!(!a.overlaps_at(a.x, a.y, &b));
        // One cell closer and they collide
        assert!(a.overlaps_at(1, 0, &b));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = block(1, 0, 0, 2, 3);
        let b = block(2, 1, 2, 3, 1);
        assert_eq!(a.overlaps_at(a.x, a.y, &b), b.overlaps_at(b.x, b.y, &a));
    }

    #[test]
    fn door_span_follows_side_axis() {
        let left = Door { side: Side::Left, x: -1, y: 2, width: 1, height: 3, color: BlockColor::Red };
        assert_eq!(left.span(), (2, 5));

        let top = Door { side: Side::Top, x: 1, y: -1, width: 4, height: 1, color: BlockColor::Blue };
        assert_eq!(top.span(), (1, 5));
    }

    #[test]
    fn door_covers_exact_and_inner_spans() {
        let d = Door { side: Side::Left, x: -1, y: 1, width: 1, height: 3, color: BlockColor::Red };
        assert!(d.covers(1, 4)); // exact
        assert!(d.covers(2, 4)); // inner
        assert!(!d.covers(0, 4)); // sticks out above
        assert!(!d.covers(1, 5)); // sticks out below
    }
}
