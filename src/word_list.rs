use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given letter or whatever, based on its index in the WordList's `glyphs`
/// field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the WordList's `words` field. Word ids
/// follow the order in which words were first added, which gives the vocabulary a stable
/// iteration order.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// Length in glyphs, which is what a slot's length is compared against.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The vocabulary available for filling. Words are uppercased on the way in and each distinct
/// word is stored once.
#[derive(Clone, Default)]
pub struct WordList {
    pub glyphs: SmallVec<[char; crate::MAX_GLYPH_COUNT]>,
    pub words: Vec<Word>,
    glyph_ids_by_char: HashMap<char, GlyphId>,
    word_ids_by_string: HashMap<String, WordId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    pub fn new<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut word_list = WordList::default();
        for word in words {
            word_list.add_word(word.as_ref());
        }
        word_list
    }

    /// Add a word, returning its id. Surrounding whitespace is ignored and blank strings are
    /// rejected; adding a word that is already present returns the existing id.
    pub fn add_word(&mut self, word: &str) -> Option<WordId> {
        let normalized = word.trim().to_uppercase();
        if normalized.is_empty() {
            return None;
        }
        if let Some(&word_id) = self.word_ids_by_string.get(&normalized) {
            return Some(word_id);
        }

        let glyphs = normalized.chars().map(|c| self.glyph_id(c)).collect();
        let word_id = self.words.len();
        self.words.push(Word {
            string: normalized.clone(),
            glyphs,
        });
        self.word_ids_by_string.insert(normalized, word_id);

        Some(word_id)
    }

    fn glyph_id(&mut self, c: char) -> GlyphId {
        if let Some(&glyph_id) = self.glyph_ids_by_char.get(&c) {
            return glyph_id;
        }
        let glyph_id = self.glyphs.len();
        self.glyphs.push(c);
        self.glyph_ids_by_char.insert(c, glyph_id);
        glyph_id
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.word_ids_by_string.get(&word.trim().to_uppercase()).copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::word_list::WordList;

    #[test]
    fn test_words_are_normalized_and_deduplicated() {
        let word_list = WordList::new(["cat", " Dog ", "CAT", "", "   ", "bird"]);

        let strings: Vec<&str> = word_list.words.iter().map(|w| w.string.as_str()).collect();
        assert_eq!(strings, vec!["CAT", "DOG", "BIRD"]);
        assert_eq!(word_list.word_id("dog"), Some(1));
        assert_eq!(word_list.word_id("fish"), None);
    }

    #[test]
    fn test_glyphs_are_shared_between_words() {
        let word_list = WordList::new(["tat", "at"]);

        assert_eq!(word_list.glyphs.len(), 2);
        assert_eq!(word_list.get(0).glyphs[0], word_list.get(0).glyphs[2]);
        assert_eq!(word_list.get(1).glyphs[1], word_list.get(0).glyphs[0]);
        assert_eq!(word_list.get(0).len(), 3);
        assert_eq!(word_list.get(1).len(), 2);
    }
}
