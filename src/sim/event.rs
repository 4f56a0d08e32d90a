/// Events emitted when a drag gesture resolves.
/// The presentation layer consumes these for messages and animation;
/// state is already mutated by the time an event is observed.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    /// A block committed a new interior position.
    BlockMoved { id: u32, x: i32, y: i32 },
    /// A block left the grid through a matching door and was destroyed.
    BlockExited { id: u32 },
    /// The drop target was invalid; the block reverts to its origin.
    DropRejected { id: u32 },
    /// The last block exited. Emitted exactly once per puzzle.
    PuzzleSolved,
}
