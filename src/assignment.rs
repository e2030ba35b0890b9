use std::collections::{BTreeMap, HashSet};

use crate::backtracking_search::Choice;
use crate::grid_config::{GridConfig, SlotKey};
use crate::word_list::WordList;

/// A fill for a grid: the word placed in each slot, keyed by slot identity. Iteration follows
/// slot identity order (row, then column, then across before down).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words: BTreeMap<SlotKey, String>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Turn the choices made during search into an assignment.
    pub fn from_choices(
        config: &GridConfig,
        word_list: &WordList,
        choices: &[Choice],
    ) -> Assignment {
        Assignment {
            words: choices
                .iter()
                .map(|choice| {
                    (
                        config.slot_configs[choice.slot_id].key,
                        word_list.get(choice.word_id).string.clone(),
                    )
                })
                .collect(),
        }
    }

    /// Place a word in a slot, returning the word previously there.
    pub fn insert(&mut self, key: SlotKey, word: impl Into<String>) -> Option<String> {
        self.words.insert(key, word.into())
    }

    pub fn get(&self, key: &SlotKey) -> Option<&str> {
        self.words.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &str)> {
        self.words.iter().map(|(key, word)| (key, word.as_str()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Does this assignment fill exactly the slots of `config`?
    pub fn is_complete(&self, config: &GridConfig) -> bool {
        self.words.len() == config.slot_count()
            && self.words.keys().all(|key| config.slot_id(key).is_some())
    }

    /// Do the words in this assignment fit together in `config`? Words must be pairwise
    /// distinct, as long as their slots, and agree wherever two filled slots cross. Slots that
    /// aren't part of `config` make the assignment inconsistent.
    pub fn is_consistent(&self, config: &GridConfig) -> bool {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.words.len());

        for (key, word) in &self.words {
            let Some(slot_id) = config.slot_id(key) else {
                return false;
            };
            if !seen.insert(word.as_str()) {
                return false;
            }

            let slot_config = &config.slot_configs[slot_id];
            if word.chars().count() != slot_config.length {
                return false;
            }

            for overlap in &slot_config.overlaps {
                let other_key = &config.slot_configs[overlap.other_slot_id].key;
                if let Some(other_word) = self.words.get(other_key) {
                    if word.chars().nth(overlap.cell_idx)
                        != other_word.chars().nth(overlap.other_cell_idx)
                    {
                        return false;
                    }
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use crate::assignment::Assignment;
    use crate::grid_config::{Direction, GridConfig, GridEntry, SlotKey};

    #[test]
    fn test_consistency_of_crossing_words() {
        let config = GridConfig::from_entries(&[
            GridEntry::new(0, 0, Direction::Across, 3),
            GridEntry::new(0, 1, Direction::Down, 3),
        ])
        .unwrap();
        let across = SlotKey::new(0, 0, Direction::Across);
        let down = SlotKey::new(0, 1, Direction::Down);

        let mut assignment = Assignment::new();
        assignment.insert(across, "CAT");
        assert!(assignment.is_consistent(&config));
        assert!(!assignment.is_complete(&config));

        assignment.insert(down, "DOG");
        assert!(!assignment.is_consistent(&config));

        assert_eq!(assignment.insert(down, "ART").as_deref(), Some("DOG"));
        assert!(assignment.is_consistent(&config));
        assert!(assignment.is_complete(&config));
        assert_eq!(assignment.get(&down), Some("ART"));

        let keys: Vec<&SlotKey> = assignment.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![&across, &down]);
    }

    #[test]
    fn test_unknown_slot_is_inconsistent() {
        let config = GridConfig::from_entries(&[GridEntry::new(0, 0, Direction::Across, 3)])
            .unwrap();

        let mut assignment = Assignment::new();
        assignment.insert(SlotKey::new(5, 5, Direction::Down), "CAT");
        assert!(!assignment.is_consistent(&config));
        assert!(!assignment.is_complete(&config));
    }
}
