use std::collections::HashSet;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::data::{Candidate, Slot};

// Minimum win rate a candidate must carry when the defense holds a
// Galactic Legend. Anything below is too risky to commit an attack team to.
pub const GL_WIN_RATE_FLOOR: f32 = 80.0;

/// One decided pair: the slot index and the candidate chosen for it. The
/// forfeit sentinel marks a slot with no viable counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub slot: usize,
    pub choice: Candidate,
}

/// The best complete assignment found: exactly one entry per slot, in
/// decision order, plus the summed win rate.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub assignments: Vec<Assignment>,
    pub total_win_rate: f32,
}

impl Solution {
    /// The chosen candidate for a slot index.
    pub fn choice_for(&self, slot: usize) -> Option<&Candidate> {
        self.assignments
            .iter()
            .find(|a| a.slot == slot)
            .map(|a| &a.choice)
    }
}

/// Records every accepted extension of the partial assignment, for
/// inspecting why the search picked what it picked.
#[derive(Debug, Default)]
pub struct SearchTrace {
    pub buf: String,
    iterations: u64,
}

impl SearchTrace {
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    fn record(&mut self, partial: &[Assignment], slots: &[Slot]) {
        self.iterations += 1;
        writeln!(self.buf, "=== iteration {} ===", self.iterations).unwrap();
        for assignment in partial {
            let slot = &slots[assignment.slot];
            let defense: Vec<&str> = slot.defense.iter().map(|c| c.base_id.as_str()).collect();
            let attack: Vec<&str> = assignment
                .choice
                .attack
                .iter()
                .map(|c| c.base_id.as_str())
                .collect();
            writeln!(
                self.buf,
                "({}) defense {:?} -> attack {:?} ({})",
                assignment.slot, defense, attack, assignment.choice.win_rate
            )
            .unwrap();
        }
    }
}

/// Find the assignment of candidates to slots that maximizes the summed
/// win rate, subject to two constraints: no character may attack twice
/// across the whole round, and a candidate facing a Galactic Legend
/// defense must clear the confidence floor. Always returns exactly one
/// choice per slot; slots with no legal candidate resolve to the forfeit
/// sentinel.
pub fn find_best_assignment(slots: &[Slot]) -> Solution {
    let stop = AtomicBool::new(false);
    find_best_assignment_traced(slots, &stop, None).unwrap_or_default()
}

/// Same search, but checks `stop` at every node. An interrupted search
/// returns the best complete assignment found before the flag was raised,
/// or `None` if it had not completed any yet.
pub fn find_best_assignment_interruptible(
    slots: &[Slot],
    stop: &AtomicBool,
) -> Option<Solution> {
    find_best_assignment_traced(slots, stop, None)
}

pub fn find_best_assignment_traced(
    slots: &[Slot],
    stop: &AtomicBool,
    trace: Option<&mut SearchTrace>,
) -> Option<Solution> {
    let mut searcher = Searcher::new(slots, stop, trace);
    let mut partial = Vec::with_capacity(slots.len());
    searcher.backtrack(&mut partial, 0.0);
    let total = searcher.best_total;
    searcher.best.map(|assignments| Solution {
        assignments,
        total_win_rate: total,
    })
}

struct Searcher<'a, 't> {
    slots: &'a [Slot],
    /// Per slot, its candidates in descending win-rate order. Trying the
    /// strongest candidates first tightens the pruning bound early.
    ordered: Vec<Vec<&'a Candidate>>,
    /// Per slot, the best win rate it could possibly contribute.
    slot_max: Vec<f32>,
    assigned: Vec<bool>,
    /// Character ids already committed in the current partial assignment.
    used: HashSet<&'a str>,
    best: Option<Vec<Assignment>>,
    best_total: f32,
    stop: &'t AtomicBool,
    trace: Option<&'t mut SearchTrace>,
}

impl<'a, 't> Searcher<'a, 't> {
    fn new(
        slots: &'a [Slot],
        stop: &'t AtomicBool,
        trace: Option<&'t mut SearchTrace>,
    ) -> Searcher<'a, 't> {
        let ordered: Vec<Vec<&'a Candidate>> = slots
            .iter()
            .map(|slot| {
                let mut candidates: Vec<&Candidate> = slot.candidates.iter().collect();
                candidates.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
                candidates
            })
            .collect();
        let slot_max: Vec<f32> = ordered
            .iter()
            .map(|candidates| candidates.first().map(|c| c.win_rate).unwrap_or(0.0))
            .collect();
        Searcher {
            slots,
            ordered,
            slot_max,
            assigned: vec![false; slots.len()],
            used: HashSet::new(),
            best: None,
            best_total: -1.0,
            stop,
            trace,
        }
    }

    fn backtrack(&mut self, partial: &mut Vec<Assignment>, committed: f32) {
        if self.stop.load(Ordering::Relaxed) {
            return;
        }

        if partial.len() == self.slots.len() {
            if committed > self.best_total {
                self.best_total = committed;
                self.best = Some(partial.clone());
            }
            return;
        }

        // Optimistic bound: even if every open slot lands its strongest
        // candidate, this branch cannot beat the best found so far.
        let potential: f32 = committed
            + self
                .slot_max
                .iter()
                .zip(&self.assigned)
                .filter(|(_, assigned)| !**assigned)
                .map(|(max, _)| *max)
                .sum::<f32>();
        if potential <= self.best_total {
            return;
        }

        let slot_index = match self.select_slot() {
            Some(index) => index,
            None => return,
        };

        self.assigned[slot_index] = true;
        let mut any_accepted = false;
        for candidate_index in 0..self.ordered[slot_index].len() {
            let candidate = self.ordered[slot_index][candidate_index];
            if !self.is_consistent(candidate) {
                continue;
            }
            any_accepted = true;
            for member in &candidate.attack {
                self.used.insert(member.base_id.as_str());
            }
            partial.push(Assignment {
                slot: slot_index,
                choice: candidate.clone(),
            });
            if let Some(trace) = self.trace.as_mut() {
                trace.record(partial, self.slots);
            }
            self.backtrack(partial, committed + candidate.win_rate);
            partial.pop();
            for member in &candidate.attack {
                self.used.remove(member.base_id.as_str());
            }
        }

        // A slot is never left open: with no acceptable candidate on this
        // branch it forfeits, contributing nothing to the total.
        if !any_accepted {
            partial.push(Assignment {
                slot: slot_index,
                choice: Candidate::forfeit(),
            });
            self.backtrack(partial, committed);
            partial.pop();
        }
        self.assigned[slot_index] = false;
    }

    /// Minimum-remaining-values ordering: resolve the slot with the fewest
    /// candidates still legal under the current partial assignment. Ties
    /// keep input order.
    fn select_slot(&self) -> Option<usize> {
        let mut pick: Option<(usize, usize)> = None;
        for (index, candidates) in self.ordered.iter().enumerate() {
            if self.assigned[index] {
                continue;
            }
            let legal = candidates.iter().filter(|c| self.is_consistent(c)).count();
            match pick {
                Some((best_legal, _)) if legal >= best_legal => {}
                _ => pick = Some((legal, index)),
            }
        }
        pick.map(|(_, index)| index)
    }

    fn is_consistent(&self, candidate: &Candidate) -> bool {
        if candidate.has_gl && candidate.win_rate < GL_WIN_RATE_FLOOR {
            return false;
        }
        !candidate
            .attack
            .iter()
            .any(|member| self.used.contains(member.base_id.as_str()))
    }
}
