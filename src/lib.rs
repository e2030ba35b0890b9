//! Fill crossword grids from a word list.
//!
//! Filling is treated as a constraint satisfaction problem with one variable per slot. Solving
//! runs in three stages: node consistency drops every word of the wrong length from each slot,
//! AC-3 prunes words that can't agree with any option of a crossing slot, and backtracking search
//! assigns the remaining slots one at a time.

use instant::Instant;
use log::{debug, info};

pub mod arc_consistency;
pub mod assignment;
pub mod backtracking_search;
pub mod domains;
pub mod error;
pub mod grid_config;
pub mod parse;
pub mod render;
pub mod word_list;

pub use crate::assignment::Assignment;
pub use crate::backtracking_search::{
    AbortCheck, Choice, FillFailure, FillOptions, FillSuccess, Propagation, Statistics,
    ValueOrdering,
};
pub use crate::error::{GridFillError, GridFillResult, StructureError};
pub use crate::grid_config::{Direction, GridConfig, GridEntry, SlotId, SlotKey};
pub use crate::word_list::{WordId, WordList};

use crate::arc_consistency::establish_arc_consistency;
use crate::backtracking_search::backtracking_search;
use crate::domains::Domains;

/// The expected maximum number of distinct characters appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Run node consistency and then AC-3 over every arc. Returns `None` if some slot ends up with
/// no options.
fn establish_initial_consistency<'a>(
    config: &'a GridConfig,
    word_list: &'a WordList,
    statistics: &mut Statistics,
) -> Option<Domains<'a>> {
    let mut domains = Domains::new(config, word_list);
    domains.enforce_node_consistency();

    if let Some(slot_id) = domains.first_empty_slot() {
        let slot_config = &config.slot_configs[slot_id];
        debug!(
            "Slot {} has no words of length {}",
            slot_config.key, slot_config.length
        );
        return None;
    }

    match establish_arc_consistency(&mut domains, None) {
        Ok(success) => {
            statistics.revisions += success.revisions;
            debug!(
                "Initial arc consistency: {} revisions, {} eliminations",
                success.revisions, success.eliminations
            );
            Some(domains)
        }
        Err(failure) => {
            statistics.revisions += failure.revisions;
            debug!(
                "Initial arc consistency left slot {} without options",
                config.slot_configs[failure.slot_id].key
            );
            None
        }
    }
}

/// Return the options each slot has left after node consistency and a global arc consistency
/// pass, in vocabulary order, or `None` if some slot has none left.
pub fn eliminate_options_for_static_grid(
    config: &GridConfig,
    word_list: &WordList,
) -> Option<Vec<Vec<WordId>>> {
    let domains = establish_initial_consistency(config, word_list, &mut Statistics::default())?;

    Some(
        (0..config.slot_count())
            .map(|slot_id| domains.iter(slot_id).collect())
            .collect(),
    )
}

/// Search for a fill for the given grid. `abort`, if given, is consulted before every candidate
/// word is tried.
pub fn find_fill(
    config: &GridConfig,
    word_list: &WordList,
    options: &FillOptions,
    abort: Option<AbortCheck<'_>>,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let Some(domains) = establish_initial_consistency(config, word_list, &mut statistics) else {
        info!("No fill: initial consistency failed after {:?}", start.elapsed());
        return Err(FillFailure::HardFailure);
    };

    let mut result = backtracking_search(domains, options, abort);

    match &mut result {
        Ok(success) => {
            success.statistics.revisions += statistics.revisions;
            success.statistics.duration = start.elapsed();
            info!("Found fill: {:?}", success.statistics);
        }
        Err(failure) => {
            info!("No fill ({:?}) after {:?}", failure, start.elapsed());
        }
    }

    result
}

/// Fill the grid with default options, returning `None` if there is no fill.
pub fn solve(config: &GridConfig, word_list: &WordList) -> Option<Assignment> {
    find_fill(config, word_list, &FillOptions::default(), None)
        .ok()
        .map(|success| Assignment::from_choices(config, word_list, &success.choices))
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::all_arcs;
    use crate::parse::{parse_structure, parse_word_list};
    use crate::{
        eliminate_options_for_static_grid, find_fill, solve, Assignment, Direction, FillFailure,
        FillOptions, GridConfig, GridEntry, Propagation, SlotKey, ValueOrdering, WordList,
    };
    use instant::Duration;

    /// _ _ _
    #[test]
    fn test_single_slot_fill() {
        let config = parse_structure("___").unwrap();
        let word_list = WordList::new(["run", "sun"]);

        let assignment = solve(&config, &word_list).expect("Failed to find a fill");

        let key = SlotKey::new(0, 0, Direction::Across);
        assert!(["RUN", "SUN"].contains(&assignment.get(&key).unwrap()));
        assert_eq!(assignment.get(&key), Some("RUN"), "lexicographic ordering picks RUN");
        assert_eq!(assignment.len(), 1);
    }

    #[test]
    fn test_trivial_grid_is_always_solved() {
        let config = GridConfig::from_entries(&[GridEntry::new(0, 0, Direction::Across, 3)])
            .unwrap();
        let word_list = WordList::new(["CAT", "DOG"]);

        for value_ordering in [
            ValueOrdering::VocabularyOrder,
            ValueOrdering::Lexicographic,
            ValueOrdering::LeastConstraining,
        ] {
            let options = FillOptions {
                value_ordering,
                ..FillOptions::default()
            };
            let result = find_fill(&config, &word_list, &options, None).unwrap();
            assert_eq!(result.choices.len(), 1);
        }
    }

    #[test]
    fn test_no_words_of_slot_length() {
        let config = GridConfig::from_entries(&[GridEntry::new(0, 0, Direction::Across, 5)])
            .unwrap();
        let word_list = WordList::new(["CAT", "DOG"]);

        assert_eq!(solve(&config, &word_list), None);
        assert_eq!(eliminate_options_for_static_grid(&config, &word_list), None);

        let result = find_fill(&config, &word_list, &FillOptions::default(), None);
        assert_eq!(result.unwrap_err(), FillFailure::HardFailure);
    }

    #[test]
    fn test_crossing_conflict_has_no_fill() {
        let config = GridConfig::from_entries(&[
            GridEntry::new(0, 0, Direction::Across, 3),
            GridEntry::new(0, 1, Direction::Down, 3),
        ])
        .unwrap();

        assert_eq!(solve(&config, &WordList::new(["CAT", "DOG"])), None);

        let assignment = solve(&config, &WordList::new(["CAT", "DOG", "ARM"])).unwrap();
        assert_eq!(assignment.get(&SlotKey::new(0, 0, Direction::Across)), Some("CAT"));
        assert_eq!(assignment.get(&SlotKey::new(0, 1, Direction::Down)), Some("ARM"));
    }

    #[test]
    fn test_empty_grid_has_empty_fill() {
        let config = GridConfig::from_entries(&[]).unwrap();

        assert_eq!(solve(&config, &WordList::new(["CAT"])), Some(Assignment::new()));
    }

    #[test]
    fn test_eliminate_options_for_static_grid() {
        let config = GridConfig::square(3).unwrap();
        let word_list = WordList::new(["bat", "ate", "tea", "zap", "qua", "horse"]);

        let options_by_slot = eliminate_options_for_static_grid(&config, &word_list).unwrap();
        let strings = |slot_id: usize| -> Vec<&str> {
            options_by_slot[slot_id]
                .iter()
                .map(|&w| word_list.get(w).string.as_str())
                .collect()
        };

        // Slots in identity order: top row, then the three columns, then the lower rows.
        assert_eq!(strings(0), vec!["BAT"]);
        assert_eq!(strings(1), vec!["BAT"]);
        assert_eq!(strings(2), vec!["ATE"]);
        assert_eq!(strings(3), vec!["TEA"]);
        assert_eq!(strings(4), vec!["ATE"]);
        assert_eq!(strings(5), vec!["TEA"]);

        // Every remaining option is supported across every arc.
        for arc in all_arcs(&config) {
            let (i, j) = config.overlap(arc.slot_id, arc.other_slot_id).unwrap();
            for &w in &options_by_slot[arc.slot_id] {
                let letter = word_list.get(w).glyphs[i];
                assert!(options_by_slot[arc.other_slot_id]
                    .iter()
                    .any(|&v| word_list.get(v).glyphs[j] == letter));
            }
        }
    }

    /// Fills a 5x5 structure under every combination of options.
    #[test]
    fn test_find_fill_for_template() {
        let config = parse_structure(
            "
#___#
#_##_
#_##_
#_###
#____
"
            .trim_start(),
        )
        .unwrap();
        let word_list = parse_word_list(
            "one\ntwo\nthree\nfour\nfive\nsix\nseven\neight\nnine\nten\n\
             ogre\nolive\nonion\nowl\nwe\nnet\noboe\nepic\n",
        );

        for propagation in [Propagation::CheckOnly, Propagation::MaintainArcConsistency] {
            for value_ordering in [
                ValueOrdering::VocabularyOrder,
                ValueOrdering::Lexicographic,
                ValueOrdering::LeastConstraining,
            ] {
                let options = FillOptions {
                    value_ordering,
                    propagation,
                    timeout: None,
                };
                let result = find_fill(&config, &word_list, &options, None)
                    .expect("Failed to find a fill");
                let assignment = Assignment::from_choices(&config, &word_list, &result.choices);

                assert!(assignment.is_complete(&config));
                assert!(assignment.is_consistent(&config));
            }
        }
    }

    #[test]
    fn test_solutions_are_valid_for_open_square() {
        // Rows ABC/DEF/GHI, columns ADG/BEH/CFI; the transposed fill is valid too.
        let config = GridConfig::square(3).unwrap();
        let word_list = WordList::new(["abc", "def", "ghi", "adg", "beh", "cfi", "aei", "ceg"]);

        let assignment = solve(&config, &word_list).unwrap();
        assert!(assignment.is_complete(&config));
        assert!(assignment.is_consistent(&config));
    }

    #[test]
    fn test_unbounded_timeout() {
        let config = GridConfig::square(3).unwrap();
        let word_list = WordList::new(["abc", "def", "ghi", "adg", "beh", "cfi"]);
        let options = FillOptions {
            timeout: Some(Duration::MAX),
            ..FillOptions::default()
        };

        let result = find_fill(&config, &word_list, &options, None).unwrap();
        let assignment = Assignment::from_choices(&config, &word_list, &result.choices);
        assert!(assignment.is_complete(&config));
        assert!(assignment.is_consistent(&config));
    }

    #[test]
    fn test_abort_before_first_trial() {
        let config = GridConfig::square(3).unwrap();
        let word_list = WordList::new(["abc", "def", "ghi", "adg", "beh", "cfi"]);

        let result = find_fill(&config, &word_list, &FillOptions::default(), Some(&|| true));
        assert_eq!(result.unwrap_err(), FillFailure::Abort);
    }
}
