//! Readers for the two input files: the grid structure and the word list.

use log::debug;
use std::fs;
use std::path::Path;

use crate::error::{GridFillError, GridFillResult, StructureError};
use crate::grid_config::GridConfig;
use crate::word_list::WordList;

/// Parse a structure template, with `_` or `.` representing letter cells and `#` representing
/// blocks. Trailing blank lines are ignored; short rows are padded with blocks.
pub fn parse_structure(template: &str) -> Result<GridConfig, StructureError> {
    let mut lines: Vec<&str> = template
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let letter_cells = lines
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.chars()
                .enumerate()
                .map(|(column, cell)| match cell {
                    '_' | '.' => Ok(true),
                    '#' | '█' => Ok(false),
                    found => Err(StructureError::InvalidCell { row, column, found }),
                })
                .collect::<Result<Vec<bool>, StructureError>>()
        })
        .collect::<Result<Vec<Vec<bool>>, StructureError>>()?;

    GridConfig::from_letter_cells(letter_cells)
}

/// Parse a word list with one word per line. Words are uppercased, and blank lines and repeats
/// are skipped.
pub fn parse_word_list(contents: &str) -> WordList {
    WordList::new(contents.lines())
}

pub fn load_structure(path: &Path) -> GridFillResult<GridConfig> {
    debug!("Reading structure file: {}", path.display());
    let contents = fs::read_to_string(path)
        .map_err(|err| GridFillError::FileReadingError(err, path.display().to_string()))?;

    let config = parse_structure(&contents)?;
    debug!(
        "Grid is {}x{} with {} slots",
        config.width,
        config.height,
        config.slot_count()
    );
    Ok(config)
}

pub fn load_word_list(path: &Path) -> GridFillResult<WordList> {
    debug!("Reading word list: {}", path.display());
    let contents = fs::read_to_string(path)
        .map_err(|err| GridFillError::FileReadingError(err, path.display().to_string()))?;

    let word_list = parse_word_list(&contents);
    debug!("Number of words: {}", word_list.len());
    Ok(word_list)
}
