//! AC-3 over the crossing constraints of a grid. A grid is arc-consistent when every option for
//! every slot agrees, at each shared cell, with at least one remaining option of the crossing
//! slot. Revisions are applied directly to a `Domains`; callers that need them to be temporary
//! take a checkpoint first.

use bit_set::BitSet;
use log::trace;
use std::collections::VecDeque;

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};

/// A directed arc: `slot_id` needs to be revised against `other_slot_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectedArc {
    pub slot_id: SlotId,
    pub other_slot_id: SlotId,
}

impl DirectedArc {
    pub fn new(slot_id: SlotId, other_slot_id: SlotId) -> DirectedArc {
        DirectedArc {
            slot_id,
            other_slot_id,
        }
    }
}

/// Every arc in the grid: `(s, n)` for each slot `s` and each slot `n` crossing it.
pub fn all_arcs(config: &GridConfig) -> Vec<DirectedArc> {
    config
        .slot_configs
        .iter()
        .flat_map(|slot_config| {
            slot_config
                .neighbors()
                .map(move |neighbor| DirectedArc::new(slot_config.id, neighbor))
        })
        .collect()
}

/// The arcs pointing into `slot_id`, i.e. the ones whose revision could be affected by a change
/// to that slot's options.
pub fn arcs_into(config: &GridConfig, slot_id: SlotId) -> impl Iterator<Item = DirectedArc> + '_ {
    config
        .neighbors(slot_id)
        .map(move |neighbor| DirectedArc::new(neighbor, slot_id))
}

/// Work queue of arcs still to be revised. An arc that is already waiting isn't added a second
/// time.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<DirectedArc>,
    queued: BitSet,
    slot_count: usize,
}

impl ArcQueue {
    fn new(slot_count: usize) -> ArcQueue {
        ArcQueue {
            queue: VecDeque::new(),
            queued: BitSet::with_capacity(slot_count * slot_count),
            slot_count,
        }
    }

    fn index(&self, arc: DirectedArc) -> usize {
        arc.slot_id * self.slot_count + arc.other_slot_id
    }

    fn enqueue(&mut self, arc: DirectedArc) {
        let index = self.index(arc);
        if self.queued.insert(index) {
            self.queue.push_back(arc);
        }
    }

    fn pop_front(&mut self) -> Option<DirectedArc> {
        let arc = self.queue.pop_front()?;
        let index = self.index(arc);
        self.queued.remove(index);
        Some(arc)
    }
}

/// Counts from a successful call to `establish_arc_consistency`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many times `revise` was called.
    pub revisions: u64,

    /// How many options were removed across all slots.
    pub eliminations: u64,
}

/// Result from a failed call to `establish_arc_consistency`: this slot ran out of options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
    pub revisions: u64,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Run AC-3 until no revision can shrink any domain, or until some slot's domain is empty.
///
/// If `initial_arcs` is `None`, every arc in the grid is checked. Otherwise only the given arcs
/// are checked to begin with, which is enough after a change that only affected the slots those
/// arcs point into.
pub fn establish_arc_consistency(
    domains: &mut Domains,
    initial_arcs: Option<&[DirectedArc]>,
) -> ArcConsistencyResult {
    let config = domains.config();
    let mut queue = ArcQueue::new(config.slot_count());

    match initial_arcs {
        Some(arcs) => arcs.iter().for_each(|&arc| queue.enqueue(arc)),
        None => all_arcs(config).into_iter().for_each(|arc| queue.enqueue(arc)),
    }

    let mut success = ArcConsistencySuccess::default();

    while let Some(DirectedArc {
        slot_id: x,
        other_slot_id: y,
    }) = queue.pop_front()
    {
        let before = domains.len(x);
        success.revisions += 1;

        if !domains.revise(x, y) {
            continue;
        }
        success.eliminations += (before - domains.len(x)) as u64;

        if domains.is_empty(x) {
            trace!("Slot {} wiped out while revising against slot {}", x, y);
            return Err(ArcConsistencyFailure {
                slot_id: x,
                revisions: success.revisions,
            });
        }

        // Shrinking `x` may leave options in its other neighbors without support.
        for z in config.neighbors(x) {
            if z != y {
                queue.enqueue(DirectedArc::new(z, x));
            }
        }
    }

    Ok(success)
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::{all_arcs, establish_arc_consistency, DirectedArc};
    use crate::domains::Domains;
    use crate::grid_config::{Direction, GridConfig, GridEntry};
    use crate::word_list::WordList;

    fn assert_arc_consistent(domains: &Domains, config: &GridConfig, word_list: &WordList) {
        for DirectedArc {
            slot_id: x,
            other_slot_id: y,
        } in all_arcs(config)
        {
            let (i, j) = config.overlap(x, y).unwrap();
            for w in domains.iter(x) {
                let letter = word_list.get(w).glyphs[i];
                assert!(
                    domains.iter(y).any(|v| word_list.get(v).glyphs[j] == letter),
                    "{} in slot {} has no support in slot {}",
                    word_list.get(w).string,
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_all_arcs_cover_both_directions() {
        let config = GridConfig::square(2).unwrap();
        let arcs = all_arcs(&config);

        assert_eq!(arcs.len(), 8);
        for arc in &arcs {
            assert!(arcs.contains(&DirectedArc::new(arc.other_slot_id, arc.slot_id)));
        }
    }

    #[test]
    fn test_reaches_fixpoint() {
        let config = GridConfig::square(3).unwrap();
        let word_list = WordList::new([
            "bat", "ate", "tea", "bit", "eat", "tan", "ant", "zap", "qua", "oxo", "axe", "net",
        ]);
        let mut domains = Domains::new(&config, &word_list);
        domains.enforce_node_consistency();

        let result = establish_arc_consistency(&mut domains, None).unwrap();

        assert!(result.revisions >= all_arcs(&config).len() as u64);
        assert!(domains.words(0).iter().all(|&w| w != "ZAP"));
        assert_arc_consistent(&domains, &config, &word_list);
    }

    #[test]
    fn test_reports_wipeout() {
        let config = GridConfig::from_entries(&[
            GridEntry::new(0, 0, Direction::Across, 3),
            GridEntry::new(0, 1, Direction::Down, 3),
        ])
        .unwrap();
        // Across needs a middle letter that starts a down word; none of these do.
        let word_list = WordList::new(["cat", "dog"]);
        let mut domains = Domains::new(&config, &word_list);
        domains.enforce_node_consistency();

        let failure = establish_arc_consistency(&mut domains, None).unwrap_err();
        assert!(domains.is_empty(failure.slot_id));
    }

    #[test]
    fn test_seeded_arcs_only_touch_affected_slots() {
        // Two independent crossings; narrowing one should leave the other alone when only its
        // arcs are seeded.
        let config = GridConfig::from_entries(&[
            GridEntry::new(0, 0, Direction::Across, 3),
            GridEntry::new(0, 1, Direction::Down, 3),
            GridEntry::new(4, 0, Direction::Across, 3),
            GridEntry::new(4, 1, Direction::Down, 3),
        ])
        .unwrap();
        let word_list = WordList::new(["cat", "art", "dog", "ore"]);
        let mut domains = Domains::new(&config, &word_list);
        domains.enforce_node_consistency();

        let first_across = 0;
        let first_down = 1;
        assert!(domains.reduce_to(first_across, word_list.word_id("cat").unwrap()));
        let seed = [DirectedArc::new(first_down, first_across)];
        establish_arc_consistency(&mut domains, Some(&seed)).unwrap();

        assert_eq!(domains.words(first_down), vec!["ART"]);
        assert_eq!(domains.len(2), 4);
        assert_eq!(domains.len(3), 4);
    }
}
