use thiserror::Error;

use crate::grid_config::SlotKey;

pub type GridFillResult<T> = Result<T, GridFillError>;

/// Problems with the shape of a grid. These are precondition violations: a well-formed structure
/// file never produces them, so they are reported immediately instead of being searched around.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("The structure contains no cells")]
    EmptyStructure,
    #[error("Unexpected character {found:?} at row {row}, column {column}")]
    InvalidCell {
        row: usize,
        column: usize,
        found: char,
    },
    #[error("Slot {0} has zero length")]
    ZeroLengthSlot(SlotKey),
    #[error("Slot {0} extends past the edge of the grid")]
    SlotOutOfBounds(SlotKey),
    #[error("Slot {0} appears more than once")]
    DuplicateSlot(SlotKey),
    #[error("Slots {first} and {second} share {shared} cells instead of at most one")]
    MultipleOverlap {
        first: SlotKey,
        second: SlotKey,
        shared: usize,
    },
}

#[derive(Error, Debug)]
pub enum GridFillError {
    #[error("Invalid grid structure: {0}")]
    Structure(#[from] StructureError),
    #[error("Failed to read file {1}, more details: {0}")]
    FileReadingError(std::io::Error, String),
    #[error("Failed to write file {1}, more details: {0}")]
    FileWritingError(std::io::Error, String),
}
