//! Static geometry of a grid: the slots, the cells they cover, and which slots cross which. All of
//! this is computed once when the `GridConfig` is built and never changes during filling.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::error::StructureError;
use crate::{MAX_SLOT_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given slot, based on its index in the Grid's `slot_configs` field. Slot
/// ids follow the ordering of `SlotKey`, so a lower id always means an earlier slot identity.
pub type SlotId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// The identity of a slot: where it starts and which way it runs. Two slots are the same slot iff
/// their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub row: usize,
    pub column: usize,
    pub direction: Direction,
}

impl SlotKey {
    pub fn new(row: usize, column: usize, direction: Direction) -> SlotKey {
        SlotKey { row, column, direction }
    }

    /// The coords of the cell at `cell_idx` within a slot starting at this key.
    pub fn cell_at(&self, cell_idx: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.row, self.column + cell_idx),
            Direction::Down => (self.row + cell_idx, self.column),
        }
    }
}

impl Display for SlotKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        write!(f, "({}, {}) {}", self.row, self.column, direction)
    }
}

/// An across or down entry in the input to `GridConfig::new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridEntry {
    pub key: SlotKey,
    pub length: usize,
}

impl GridEntry {
    pub fn new(row: usize, column: usize, direction: Direction, length: usize) -> GridEntry {
        GridEntry {
            key: SlotKey::new(row, column, direction),
            length,
        }
    }
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the shared cell within each of the two slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub other_slot_id: SlotId,
    pub cell_idx: usize,
    pub other_cell_idx: usize,
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub key: SlotKey,
    pub length: usize,
    pub cells: SmallVec<[GridCoord; MAX_SLOT_LENGTH]>,

    /// One entry per crossing slot, in order of the shared cell's position within this slot.
    pub overlaps: SmallVec<[Overlap; MAX_SLOT_LENGTH]>,
}

impl SlotConfig {
    /// The ids of the slots crossing this one.
    pub fn neighbors(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.overlaps.iter().map(|overlap| overlap.other_slot_id)
    }

    /// The number of slots crossing this one.
    pub fn degree(&self) -> usize {
        self.overlaps.len()
    }
}

/// A struct representing the aspects of a grid that are static during filling.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// `letter_cells[row][column]` is true for cells that take a letter and false for blocks.
    pub letter_cells: Vec<Vec<bool>>,

    pub slot_configs: SmallVec<[SlotConfig; MAX_SLOT_COUNT]>,

    /// Dense `slot_count * slot_count` table of `(cell in first, cell in second)` offsets, so that
    /// looking up the overlap for an arc never requires a search.
    overlap_table: Vec<Option<(usize, usize)>>,
}

impl GridConfig {
    /// Build a grid with the given dimensions and slots. Every cell covered by a slot is a letter
    /// cell; every other cell is a block.
    pub fn new(
        width: usize,
        height: usize,
        entries: &[GridEntry],
    ) -> Result<GridConfig, StructureError> {
        let mut letter_cells = vec![vec![false; width]; height];

        for entry in entries {
            if entry.length == 0 {
                return Err(StructureError::ZeroLengthSlot(entry.key));
            }
            let (last_row, last_column) = entry.key.cell_at(entry.length - 1);
            if last_row >= height || last_column >= width {
                return Err(StructureError::SlotOutOfBounds(entry.key));
            }
            for cell_idx in 0..entry.length {
                let (row, column) = entry.key.cell_at(cell_idx);
                letter_cells[row][column] = true;
            }
        }

        Self::build(width, height, letter_cells, entries)
    }

    /// Build a grid from explicit slot entries, sizing it to fit them.
    pub fn from_entries(entries: &[GridEntry]) -> Result<GridConfig, StructureError> {
        let mut width = 0;
        let mut height = 0;

        for entry in entries {
            if entry.length == 0 {
                return Err(StructureError::ZeroLengthSlot(entry.key));
            }
            let (last_row, last_column) = entry.key.cell_at(entry.length - 1);
            height = height.max(last_row + 1);
            width = width.max(last_column + 1);
        }

        Self::new(width, height, entries)
    }

    /// Build a grid from per-cell "takes a letter" flags, deriving a slot for every maximal run of
    /// two or more letter cells in each direction. Rows shorter than the widest row are treated
    /// as if padded with blocks.
    pub fn from_letter_cells(letter_cells: Vec<Vec<bool>>) -> Result<GridConfig, StructureError> {
        let height = letter_cells.len();
        let width = letter_cells.iter().map(|row| row.len()).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(StructureError::EmptyStructure);
        }

        let letter_cells: Vec<Vec<bool>> = letter_cells
            .into_iter()
            .map(|mut row| {
                row.resize(width, false);
                row
            })
            .collect();

        let is_letter = |row: usize, column: usize| letter_cells[row][column];
        let mut entries: Vec<GridEntry> = vec![];

        // A run starts at a letter cell whose predecessor (in the run's direction) is a block or
        // the edge of the grid.
        for row in 0..height {
            for column in 0..width {
                if !is_letter(row, column) {
                    continue;
                }

                if column == 0 || !is_letter(row, column - 1) {
                    let length = (column..width).take_while(|&c| is_letter(row, c)).count();
                    if length > 1 {
                        entries.push(GridEntry::new(row, column, Direction::Across, length));
                    }
                }

                if row == 0 || !is_letter(row - 1, column) {
                    let length = (row..height).take_while(|&r| is_letter(r, column)).count();
                    if length > 1 {
                        entries.push(GridEntry::new(row, column, Direction::Down, length));
                    }
                }
            }
        }

        Self::build(width, height, letter_cells, &entries)
    }

    /// Build a fully open grid with `size` across and `size` down slots.
    pub fn square(size: usize) -> Result<GridConfig, StructureError> {
        Self::from_letter_cells(vec![vec![true; size]; size])
    }

    fn build(
        width: usize,
        height: usize,
        letter_cells: Vec<Vec<bool>>,
        entries: &[GridEntry],
    ) -> Result<GridConfig, StructureError> {
        let mut entries: Vec<GridEntry> = entries.to_vec();
        entries.sort_by_key(|entry| entry.key);

        for pair in entries.windows(2) {
            if pair[0].key == pair[1].key {
                return Err(StructureError::DuplicateSlot(pair[0].key));
            }
        }

        // Build a map from cell location to the slots covering it, which we can then use to
        // calculate overlaps.
        let mut entries_by_cell: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> =
            HashMap::new();
        for (slot_id, entry) in entries.iter().enumerate() {
            for cell_idx in 0..entry.length {
                entries_by_cell
                    .entry(entry.key.cell_at(cell_idx))
                    .or_default()
                    .push((slot_id, cell_idx));
            }
        }

        let slot_count = entries.len();
        let mut overlap_table: Vec<Option<(usize, usize)>> = vec![None; slot_count * slot_count];
        let mut shared_cell_counts: HashMap<(SlotId, SlotId), usize> = HashMap::new();

        for covering in entries_by_cell.values() {
            for (i, &(first_id, first_cell)) in covering.iter().enumerate() {
                for &(second_id, second_cell) in &covering[i + 1..] {
                    *shared_cell_counts
                        .entry((first_id.min(second_id), first_id.max(second_id)))
                        .or_insert(0) += 1;

                    overlap_table[first_id * slot_count + second_id] =
                        Some((first_cell, second_cell));
                    overlap_table[second_id * slot_count + first_id] =
                        Some((second_cell, first_cell));
                }
            }
        }

        // Report the earliest offending pair so the error doesn't depend on hash order.
        if let Some((&(first_id, second_id), &shared)) = shared_cell_counts
            .iter()
            .filter(|&(_, &shared)| shared > 1)
            .min_by_key(|&(&pair, _)| pair)
        {
            return Err(StructureError::MultipleOverlap {
                first: entries[first_id].key,
                second: entries[second_id].key,
                shared,
            });
        }

        let slot_configs = entries
            .iter()
            .enumerate()
            .map(|(slot_id, entry)| {
                let mut overlaps: SmallVec<[Overlap; MAX_SLOT_LENGTH]> = (0..slot_count)
                    .filter_map(|other_slot_id| {
                        overlap_table[slot_id * slot_count + other_slot_id].map(
                            |(cell_idx, other_cell_idx)| Overlap {
                                other_slot_id,
                                cell_idx,
                                other_cell_idx,
                            },
                        )
                    })
                    .collect();
                overlaps.sort_by_key(|overlap| (overlap.cell_idx, overlap.other_slot_id));

                SlotConfig {
                    id: slot_id,
                    key: entry.key,
                    length: entry.length,
                    cells: (0..entry.length).map(|idx| entry.key.cell_at(idx)).collect(),
                    overlaps,
                }
            })
            .collect();

        Ok(GridConfig {
            width,
            height,
            letter_cells,
            slot_configs,
            overlap_table,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// The `(offset in x, offset in y)` of the cell shared by slots `x` and `y`, if they cross.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        self.overlap_table[x * self.slot_count() + y]
    }

    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        self.slot_configs[slot_id].neighbors()
    }

    /// Find a slot by its identity.
    pub fn slot_id(&self, key: &SlotKey) -> Option<SlotId> {
        self.slot_configs
            .binary_search_by_key(key, |slot_config| slot_config.key)
            .ok()
    }

    pub fn is_letter_cell(&self, (row, column): GridCoord) -> bool {
        self.letter_cells
            .get(row)
            .and_then(|cells| cells.get(column))
            .copied()
            .unwrap_or(false)
    }
}
