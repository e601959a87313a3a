use std::collections::{HashMap, HashSet};

use crate::counters::{CounterRecord, CounterSet};
use crate::data::{same_team, team_has_galactic_legend, team_ids, Candidate, Character, Slot};
use crate::round::Round;

/// Build the solver's decision slots for a round: one slot per live defense
/// team in a focus zone, each carrying the candidate attacks the player can
/// still field against it.
///
/// The exact pass keeps only counters recorded against this precise defense
/// composition. Historical data is sparse per composition, so when the exact
/// pass yields `match_threshold` or fewer candidates the slot falls back to
/// every counter recorded against the same leader.
pub fn build_slots(
    round: &Round,
    counters: &CounterSet,
    roster: &[Character],
    focus: &[String],
    match_threshold: usize,
) -> Vec<Slot> {
    let committed = committed_ids(round);
    let available: HashMap<&str, &Character> = roster
        .iter()
        .filter(|c| !committed.contains(c.base_id.as_str()))
        .map(|c| (c.base_id.as_str(), c))
        .collect();

    let mut slots = Vec::new();
    for zone in &round.opponent {
        if !focus.iter().any(|name| name == &zone.name) {
            continue;
        }
        for entry in &zone.entries {
            if entry.eliminated || entry.defense.is_empty() {
                continue;
            }

            let has_gl = team_has_galactic_legend(&entry.defense);
            // The leader keys the counter table and is always first.
            let leader = entry.defense[0].base_id.as_str();
            let for_leader = counters.for_leader(leader);
            let defense_ids = team_ids(&entry.defense);

            let mut candidates: Vec<Candidate> = for_leader
                .iter()
                .filter(|record| same_team(&record.defense, &defense_ids))
                .filter_map(|record| fieldable(record, &available, has_gl))
                .collect();

            if candidates.len() <= match_threshold {
                candidates = for_leader
                    .iter()
                    .filter_map(|record| fieldable(record, &available, has_gl))
                    .collect();
            }

            slots.push(Slot {
                zone: zone.name.clone(),
                defense: entry.defense.clone(),
                candidates,
            });
        }
    }
    slots
}

/// Ids the player cannot attack with: characters locked into the player's
/// own defense zones plus attack teams already spent this round.
fn committed_ids(round: &Round) -> HashSet<&str> {
    let mut committed: HashSet<&str> = HashSet::new();
    for zone in &round.player {
        for entry in &zone.entries {
            for character in &entry.defense {
                committed.insert(character.base_id.as_str());
            }
        }
    }
    for team in &round.used_attack {
        for character in team {
            committed.insert(character.base_id.as_str());
        }
    }
    committed
}

/// A counter survives the affordability filter only if the player still
/// owns every character in its attack team.
fn fieldable(
    record: &CounterRecord,
    available: &HashMap<&str, &Character>,
    has_gl: bool,
) -> Option<Candidate> {
    let mut attack = Vec::with_capacity(record.attack.len());
    for base_id in &record.attack {
        let character = available.get(base_id.as_str()).copied()?;
        attack.push(character.clone());
    }
    Some(Candidate {
        attack,
        win_rate: record.win_rate,
        has_gl,
    })
}
