use serde::Serialize;

use crate::data::{same_team, team_ids, Slot};
use crate::round::Round;
use crate::solver::Solution;

/// One recommendation: a defense team and the attack chosen against it.
/// An empty attack means no viable counter was found or affordable.
#[derive(Debug, Clone, Serialize)]
pub struct Pick {
    pub defense: Vec<String>,
    pub attack: Vec<String>,
    pub win_rate: f32,
}

impl Pick {
    pub fn has_counter(&self) -> bool {
        !self.attack.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneReport {
    pub zone: String,
    pub picks: Vec<Pick>,
}

/// Project the solved assignment back onto the round's per-zone defense
/// structure. Slots are matched to defense entries by zone and identifier
/// set, so member order never affects the projection.
pub fn project_solution(round: &Round, slots: &[Slot], solution: &Solution) -> Vec<ZoneReport> {
    let mut report = Vec::new();
    for zone in &round.opponent {
        let mut picks = Vec::new();
        for entry in &zone.entries {
            if entry.eliminated || entry.defense.is_empty() {
                continue;
            }
            let entry_ids = team_ids(&entry.defense);
            let matched = solution.assignments.iter().find(|assignment| {
                let slot = &slots[assignment.slot];
                slot.zone == zone.name && same_team(&team_ids(&slot.defense), &entry_ids)
            });
            if let Some(assignment) = matched {
                picks.push(Pick {
                    defense: entry.defense.iter().map(|c| c.name.clone()).collect(),
                    attack: assignment
                        .choice
                        .attack
                        .iter()
                        .map(|c| c.name.clone())
                        .collect(),
                    win_rate: assignment.choice.win_rate,
                });
            }
        }
        if !picks.is_empty() {
            report.push(ZoneReport {
                zone: zone.name.clone(),
                picks,
            });
        }
    }
    report
}
