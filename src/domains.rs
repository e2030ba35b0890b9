//! The domain store: for each slot, the words still considered legal for it.
//!
//! Each slot keeps its option list in vocabulary order and a `BitSet` of eliminated word ids.
//! Until node consistency runs, every slot shares a single full-vocabulary option list.
//! Removals only ever set bits, and every removal is written to a trail so that search can take a
//! `Checkpoint` before a trial and roll all of the trial's pruning back afterwards. Node
//! consistency is the one exception: `restrict_to_length` drops options outright, and those are
//! never restored.

use bit_set::BitSet;
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};
use crate::MAX_SLOT_COUNT;

/// The live options for a single slot.
#[derive(Clone)]
struct SlotDomain {
    options: Rc<[WordId]>,
    members: BitSet,
    eliminated: BitSet,
    remaining: usize,
}

/// A position in the removal trail, returned by `Domains::checkpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Clone)]
pub struct Domains<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    slots: SmallVec<[SlotDomain; MAX_SLOT_COUNT]>,
    trail: Vec<(SlotId, WordId)>,
}

impl Debug for Domains<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domains")
            .field(
                "remaining",
                &self.slots.iter().map(|slot| slot.remaining).collect::<Vec<_>>(),
            )
            .field("trail_len", &self.trail.len())
            .finish()
    }
}

impl<'a> Domains<'a> {
    /// Start every slot off with the whole vocabulary.
    pub fn new(config: &'a GridConfig, word_list: &'a WordList) -> Domains<'a> {
        let vocabulary: Rc<[WordId]> = (0..word_list.len()).collect();
        let slots = config
            .slot_configs
            .iter()
            .map(|_| SlotDomain {
                options: Rc::clone(&vocabulary),
                members: (0..word_list.len()).collect(),
                eliminated: BitSet::with_capacity(word_list.len()),
                remaining: word_list.len(),
            })
            .collect();

        Domains {
            config,
            word_list,
            slots,
            trail: vec![],
        }
    }

    pub fn config(&self) -> &'a GridConfig {
        self.config
    }

    pub fn word_list(&self) -> &'a WordList {
        self.word_list
    }

    /// How many options are still available for this slot?
    pub fn len(&self, slot_id: SlotId) -> usize {
        self.slots[slot_id].remaining
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.slots[slot_id].remaining == 0
    }

    /// The remaining options for this slot, in vocabulary order.
    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        let slot = &self.slots[slot_id];
        slot.options
            .iter()
            .copied()
            .filter(move |&word_id| !slot.eliminated.contains(word_id))
    }

    /// The remaining options for this slot as strings, in vocabulary order.
    pub fn words(&self, slot_id: SlotId) -> Vec<&'a str> {
        let word_list = self.word_list;
        self.iter(slot_id)
            .map(|word_id| word_list.get(word_id).string.as_str())
            .collect()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        let slot = &self.slots[slot_id];
        slot.members.contains(word_id) && !slot.eliminated.contains(word_id)
    }

    /// The first slot (by id) with no options left, if any.
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        (0..self.slots.len()).find(|&slot_id| self.is_empty(slot_id))
    }

    /// Remove a word from a slot's options, returning whether it was there to remove.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.contains(slot_id, word_id) {
            return false;
        }
        let slot = &mut self.slots[slot_id];
        slot.eliminated.insert(word_id);
        slot.remaining -= 1;
        self.trail.push((slot_id, word_id));
        true
    }

    /// Remove every option except `word_id` from the slot. Returns false if `word_id` wasn't
    /// an option in the first place, in which case the domain ends up empty.
    pub fn reduce_to(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        let present = self.contains(slot_id, word_id);
        let others: Vec<WordId> = self.iter(slot_id).filter(|&w| w != word_id).collect();
        for other in others {
            self.remove(slot_id, other);
        }
        present
    }

    /// Node consistency for a single slot: drop every option whose length doesn't match the
    /// slot. Returns whether anything was dropped.
    pub fn restrict_to_length(&mut self, slot_id: SlotId) -> bool {
        let length = self.config.slot_configs[slot_id].length;
        let word_list = self.word_list;
        let slot = &mut self.slots[slot_id];

        let before = slot.options.len();
        let mut kept: Vec<WordId> = vec![];
        for &word_id in slot.options.iter() {
            if word_list.get(word_id).len() == length {
                kept.push(word_id);
            } else {
                // Keep `eliminated` a subset of `options` so the counts below stay exact and a
                // later rollback of this word's trail entry is a no-op.
                slot.members.remove(word_id);
                slot.eliminated.remove(word_id);
            }
        }
        if kept.len() == before {
            return false;
        }

        slot.options = kept.into();
        slot.remaining = slot.options.len() - slot.eliminated.len();
        true
    }

    /// Node consistency for every slot.
    pub fn enforce_node_consistency(&mut self) {
        for slot_id in 0..self.slots.len() {
            self.restrict_to_length(slot_id);
        }
    }

    /// Make `x` arc-consistent with `y`: remove every option for `x` whose letter at the shared
    /// cell doesn't appear at that cell in any of `y`'s current options. Returns whether any
    /// option was removed. Slots that don't cross impose no constraint, so this is a no-op for
    /// them.
    pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
        let Some((x_cell, y_cell)) = self.config.overlap(x, y) else {
            return false;
        };
        let word_list = self.word_list;

        let mut available = BitSet::with_capacity(word_list.glyphs.len());
        for word_id in self.iter(y) {
            if let Some(&glyph) = word_list.get(word_id).glyphs.get(y_cell) {
                available.insert(glyph);
            }
        }

        let unsupported: Vec<WordId> = self
            .iter(x)
            .filter(|&word_id| {
                word_list
                    .get(word_id)
                    .glyphs
                    .get(x_cell)
                    .map_or(true, |&glyph| !available.contains(glyph))
            })
            .collect();

        for &word_id in &unsupported {
            self.remove(x, word_id);
        }

        !unsupported.is_empty()
    }

    /// For each glyph, how many of the slot's remaining options place it at `cell_idx`.
    pub fn glyph_counts(&self, slot_id: SlotId, cell_idx: usize) -> Vec<usize> {
        let mut counts = vec![0; self.word_list.glyphs.len()];
        for word_id in self.iter(slot_id) {
            if let Some(&glyph) = self.word_list.get(word_id).glyphs.get(cell_idx) {
                counts[glyph] += 1;
            }
        }
        counts
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    /// Undo every removal made since `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.trail.len() > checkpoint.0 {
            if let Some((slot_id, word_id)) = self.trail.pop() {
                let slot = &mut self.slots[slot_id];
                if slot.eliminated.remove(word_id) {
                    slot.remaining += 1;
                }
            }
        }
    }
}
