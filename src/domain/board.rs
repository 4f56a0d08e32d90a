/// BoardState: the live puzzle state.
///
/// Owns the grid dimensions, the fixed door set, and the mutable set of
/// active blocks. The motion engine only ever reads it; position commits
/// and block removal go through the two mutating methods here, both called
/// from the single drop-handling point in the session layer.
///
/// Invariant (holds before and after every completed move): no two active
/// blocks overlap, and every block is either fully inside the grid or
/// protrudes past a boundary only where a matching door admits it.

use super::color::Side;
use super::piece::{Block, Door};

pub struct BoardState {
    width: i32,
    height: i32,
    doors: Vec<Door>,
    blocks: Vec<Block>,
}

impl BoardState {
    /// Build a board from already-validated parts. The level loader is
    /// responsible for deep-copying out of the level template and running
    /// validation before this is called.
    pub fn new(width: i32, height: i32, doors: Vec<Door>, blocks: Vec<Block>) -> Self {
        BoardState { width, height, doors, blocks }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// All currently active blocks. Insertion order carries no meaning.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The fixed doors of this level.
    #[inline]
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// Doors on one boundary side.
    pub fn doors_on(&self, side: Side) -> impl Iterator<Item = &Door> {
        self.doors.iter().filter(move |d| d.side == side)
    }

    /// Look up an active block by id.
    pub fn block(&self, id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Commit a new position for a block. No-op for an unknown id; the
    /// caller is expected to have validated the placement first.
    pub fn commit_move(&mut self, id: u32, x: i32, y: i32) {
        if let Some(b) = self.blocks.iter_mut().find(|b| b.id == id) {
            b.x = x;
            b.y = y;
        }
    }

    /// Remove a block that has exited. The sole destructor path.
    /// Removing an absent id is a no-op, not an error.
    pub fn remove_block(&mut self, id: u32) {
        self.blocks.retain(|b| b.id != id);
    }

    /// True once every block has exited.
    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::BlockColor;

    fn board_with(blocks: Vec<Block>) -> BoardState {
        BoardState::new(6, 6, vec![], blocks)
    }

    fn block(id: u32, x: i32, y: i32) -> Block {
        Block { id, x, y, w: 1, h: 1, color: BlockColor::Red }
    }

    #[test]
    fn remove_block_is_idempotent() {
        let mut b = board_with(vec![block(1, 0, 0), block(2, 3, 3)]);
        b.remove_block(1);
        assert_eq!(b.blocks().len(), 1);

        // Second removal of the same id leaves the board identical
        b.remove_block(1);
        assert_eq!(b.blocks().len(), 1);
        assert_eq!(b.block(2).map(|b| b.id), Some(2));
    }

    #[test]
    fn cleared_only_when_empty() {
        let mut b = board_with(vec![block(1, 0, 0)]);
        assert!(!b.is_cleared());
        b.remove_block(1);
        assert!(b.is_cleared());
    }

    #[test]
    fn commit_move_updates_position() {
        let mut b = board_with(vec![block(7, 0, 0)]);
        b.commit_move(7, 2, 4);
        let moved = b.block(7).copied();
        assert_eq!(moved.map(|b| (b.x, b.y)), Some((2, 4)));
    }

    #[test]
    fn commit_move_unknown_id_is_noop() {
        let mut b = board_with(vec![block(1, 0, 0)]);
        b.commit_move(99, 5, 5);
        assert_eq!(b.block(1).map(|b| (b.x, b.y)), Some((0, 0)));
    }
}
