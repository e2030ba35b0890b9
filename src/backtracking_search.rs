//! Chronological backtracking over partial assignments.
//!
//! Slots are picked by minimum remaining values, then by degree, then by id. Each candidate word
//! is tried inside a `Trial`, which owns the tentative assignment entry and the domain checkpoint
//! taken before it; dropping an uncommitted trial removes the entry and rolls the domains back,
//! so every way out of a trial (rejection, exhausted subtree, timeout, abort) leaves the state
//! exactly as it found it.

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::trace;
use std::cmp::Reverse;

use crate::arc_consistency::{arcs_into, establish_arc_consistency, DirectedArc};
use crate::domains::{Checkpoint, Domains};
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// Order in which a slot's options are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrdering {
    /// The order words appear in the vocabulary.
    VocabularyOrder,
    /// Alphabetical order, so the first fill found is the alphabetically-earliest one along the
    /// search path.
    #[default]
    Lexicographic,
    /// Words that rule out the fewest options in unfilled crossing slots first, ties broken
    /// alphabetically.
    LeastConstraining,
}

/// What happens to the other slots' domains after each tentative assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Only check the partial assignment itself; domains stay as they were before search.
    CheckOnly,
    /// Also re-run AC-3 from the arcs into the assigned slot, and remove the assigned word from
    /// every unfilled slot. All of it is undone when the assignment is.
    #[default]
    MaintainArcConsistency,
}

/// Settings for a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillOptions {
    pub value_ordering: ValueOrdering,
    pub propagation: Propagation,

    /// Give up with `FillFailure::Timeout` once this much time has passed.
    pub timeout: Option<Duration>,
}

/// A callback consulted before every candidate trial; returning true abandons the search with
/// `FillFailure::Abort`.
pub type AbortCheck<'f> = &'f dyn Fn() -> bool;

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Number of search states visited.
    pub states: u64,
    /// Number of tentative assignments that were undone.
    pub backtracks: u64,
    /// Number of arc revisions, including the initial AC-3 pass.
    pub revisions: u64,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    /// Every branch was exhausted: the grid has no fill with this vocabulary.
    HardFailure,
    Timeout,
    Abort,
}

/// A mapping from slot to word, built up one slot at a time during search.
#[derive(Debug, Clone)]
pub struct PartialAssignment {
    word_ids: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl PartialAssignment {
    pub fn new(slot_count: usize) -> PartialAssignment {
        PartialAssignment {
            word_ids: vec![None; slot_count],
            assigned_count: 0,
        }
    }

    /// Fill an empty slot. Filling a slot twice is a bug in the caller.
    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) {
        assert!(
            self.word_ids[slot_id].is_none(),
            "slot {} is already filled",
            slot_id
        );
        self.word_ids[slot_id] = Some(word_id);
        self.assigned_count += 1;
    }

    /// Clear a filled slot, returning the word it held. Clearing an empty slot is a bug in the
    /// caller.
    pub fn remove(&mut self, slot_id: SlotId) -> WordId {
        let word_id = self.word_ids[slot_id]
            .take()
            .unwrap_or_else(|| panic!("slot {} is not filled", slot_id));
        self.assigned_count -= 1;
        word_id
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids[slot_id]
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.word_ids[slot_id].is_some()
    }

    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.word_ids.len()
    }

    /// The filled slots in slot id order.
    pub fn choices(&self) -> Vec<Choice> {
        self.word_ids
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| Choice { slot_id, word_id }))
            .collect()
    }

    /// Is this partial assignment free of conflicts? Filled slots must hold pairwise distinct
    /// words of the right length, and every pair of filled, crossing slots must agree on the
    /// shared letter. Unfilled slots impose nothing.
    pub fn is_consistent(&self, config: &GridConfig, word_list: &WordList) -> bool {
        let mut seen = BitSet::with_capacity(word_list.len());

        for Choice { slot_id, word_id } in self.choices() {
            if !seen.insert(word_id) {
                return false;
            }

            let slot_config = &config.slot_configs[slot_id];
            let word = word_list.get(word_id);
            if word.len() != slot_config.length {
                return false;
            }

            for overlap in &slot_config.overlaps {
                if let Some(other_word_id) = self.get(overlap.other_slot_id) {
                    let other = word_list.get(other_word_id);
                    if other.glyphs.get(overlap.other_cell_idx)
                        != word.glyphs.get(overlap.cell_idx)
                    {
                        return false;
                    }
                }
            }
        }

        true
    }
}

/// Whether a subtree produced a complete assignment.
enum Step {
    Complete,
    Exhausted,
}

/// The live state of a search.
struct Search<'a, 'f> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    domains: Domains<'a>,
    assignment: PartialAssignment,
    options: &'f FillOptions,
    abort: Option<AbortCheck<'f>>,
    deadline: Option<Instant>,
    statistics: Statistics,
}

/// A tentative assignment. Unless `commit` is called, dropping it clears the slot again and
/// rolls back any domain pruning done on its behalf.
struct Trial<'s, 'a, 'f> {
    search: &'s mut Search<'a, 'f>,
    choice: Choice,
    checkpoint: Checkpoint,
    committed: bool,
}

impl<'s, 'a, 'f> Trial<'s, 'a, 'f> {
    fn begin(search: &'s mut Search<'a, 'f>, choice: Choice) -> Trial<'s, 'a, 'f> {
        let checkpoint = search.domains.checkpoint();
        search.assignment.insert(choice.slot_id, choice.word_id);
        trace!(
            "Trying {} in slot {}",
            search.word_list.get(choice.word_id).string,
            choice.slot_id
        );

        Trial {
            search,
            choice,
            checkpoint,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Trial<'_, '_, '_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        self.search.assignment.remove(self.choice.slot_id);
        self.search.domains.rollback(self.checkpoint);
        self.search.statistics.backtracks += 1;
        trace!(
            "Undid {} in slot {}",
            self.search.word_list.get(self.choice.word_id).string,
            self.choice.slot_id
        );
    }
}

impl<'a, 'f> Search<'a, 'f> {
    fn new(
        domains: Domains<'a>,
        options: &'f FillOptions,
        abort: Option<AbortCheck<'f>>,
        deadline: Option<Instant>,
    ) -> Search<'a, 'f> {
        let config = domains.config();
        Search {
            config,
            word_list: domains.word_list(),
            assignment: PartialAssignment::new(config.slot_count()),
            domains,
            options,
            abort,
            deadline,
            statistics: Statistics::default(),
        }
    }

    /// Pick the unfilled slot with the fewest remaining options, preferring the slot with the
    /// most crossings and then the lowest id. Returns `None` once every slot is filled.
    fn select_unassigned_slot(&self) -> Option<SlotId> {
        (0..self.config.slot_count())
            .filter(|&slot_id| !self.assignment.is_assigned(slot_id))
            .min_by_key(|&slot_id| {
                (
                    self.domains.len(slot_id),
                    Reverse(self.config.slot_configs[slot_id].degree()),
                    slot_id,
                )
            })
    }

    fn order_domain_values(&self, slot_id: SlotId) -> Vec<WordId> {
        let word_list = self.word_list;
        let mut values: Vec<WordId> = self.domains.iter(slot_id).collect();

        match self.options.value_ordering {
            ValueOrdering::VocabularyOrder => {}
            ValueOrdering::Lexicographic => {
                values.sort_by(|&a, &b| word_list.get(a).string.cmp(&word_list.get(b).string));
            }
            ValueOrdering::LeastConstraining => {
                values.sort_by(|&a, &b| word_list.get(a).string.cmp(&word_list.get(b).string));

                // For each unfilled crossing, how many of its options have each glyph at the
                // shared cell. A word rules out every option that doesn't share its glyph.
                let crossings: Vec<(usize, usize, Vec<usize>)> = self.config.slot_configs
                    [slot_id]
                    .overlaps
                    .iter()
                    .filter(|overlap| !self.assignment.is_assigned(overlap.other_slot_id))
                    .map(|overlap| {
                        (
                            overlap.cell_idx,
                            self.domains.len(overlap.other_slot_id),
                            self.domains
                                .glyph_counts(overlap.other_slot_id, overlap.other_cell_idx),
                        )
                    })
                    .collect();

                values.sort_by_key(|&word_id| {
                    let word = word_list.get(word_id);
                    crossings
                        .iter()
                        .map(|(cell_idx, option_count, glyph_counts)| {
                            let supported = word
                                .glyphs
                                .get(*cell_idx)
                                .map_or(0, |&glyph| glyph_counts[glyph]);
                            option_count - supported
                        })
                        .sum::<usize>()
                });
            }
        }

        values
    }

    fn check_interrupt(&self) -> Result<(), FillFailure> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(FillFailure::Timeout);
            }
        }
        if let Some(abort) = self.abort {
            if abort() {
                return Err(FillFailure::Abort);
            }
        }
        Ok(())
    }

    /// Is the assignment (which now includes `choice`) still viable? With maintained arc
    /// consistency this also prunes the other slots' domains to match.
    fn is_viable(&mut self, choice: Choice) -> bool {
        if !self.assignment.is_consistent(self.config, self.word_list) {
            return false;
        }

        match self.options.propagation {
            Propagation::CheckOnly => true,
            Propagation::MaintainArcConsistency => self.propagate(choice),
        }
    }

    fn propagate(&mut self, choice: Choice) -> bool {
        if !self.domains.reduce_to(choice.slot_id, choice.word_id) {
            return false;
        }
        let mut arcs: Vec<DirectedArc> = arcs_into(self.config, choice.slot_id).collect();

        // Words can't repeat, so the chosen word is gone from every slot still open.
        for other_slot_id in 0..self.config.slot_count() {
            if other_slot_id == choice.slot_id || self.assignment.is_assigned(other_slot_id) {
                continue;
            }
            if self.domains.remove(other_slot_id, choice.word_id) {
                if self.domains.is_empty(other_slot_id) {
                    return false;
                }
                arcs.extend(arcs_into(self.config, other_slot_id));
            }
        }

        match establish_arc_consistency(&mut self.domains, Some(&arcs)) {
            Ok(success) => {
                self.statistics.revisions += success.revisions;
                true
            }
            Err(failure) => {
                self.statistics.revisions += failure.revisions;
                false
            }
        }
    }

    fn backtrack(&mut self) -> Result<Step, FillFailure> {
        self.statistics.states += 1;

        let Some(slot_id) = self.select_unassigned_slot() else {
            return Ok(Step::Complete);
        };

        for word_id in self.order_domain_values(slot_id) {
            self.check_interrupt()?;

            let choice = Choice { slot_id, word_id };
            let mut trial = Trial::begin(self, choice);
            if !trial.search.is_viable(choice) {
                continue;
            }
            if let Step::Complete = trial.search.backtrack()? {
                trial.commit();
                return Ok(Step::Complete);
            }
        }

        Ok(Step::Exhausted)
    }
}

/// Search for a complete assignment starting from the given domains, which should already be
/// node- and arc-consistent. The domains are consumed; nothing done during search is visible to
/// the caller except through the result.
pub fn backtracking_search(
    domains: Domains<'_>,
    options: &FillOptions,
    abort: Option<AbortCheck<'_>>,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    // A timeout too large to represent as an instant is no deadline at all.
    let deadline = options
        .timeout
        .and_then(|timeout| start.checked_add(timeout));
    let mut search = Search::new(domains, options, abort, deadline);

    let step = search.backtrack();
    search.statistics.duration = start.elapsed();

    match step? {
        Step::Complete => {
            debug_assert!(search.assignment.is_complete());
            debug_assert!(search
                .assignment
                .is_consistent(search.config, search.word_list));
            Ok(FillSuccess {
                statistics: search.statistics,
                choices: search.assignment.choices(),
            })
        }
        Step::Exhausted => Err(FillFailure::HardFailure),
    }
}
