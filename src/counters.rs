use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// One historically recorded attack-vs-defense outcome. Attack and defense
/// are id sequences with the leader first. Season scrape files may omit
/// `seen` and `avg_banners`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub attack: Vec<String>,
    pub defense: Vec<String>,
    pub win_rate: f32,
    #[serde(default)]
    pub seen: u32,
    #[serde(default)]
    pub avg_banners: f32,
}

/// Historical counter statistics keyed by the defending leader's id. Each
/// leader's list is kept sorted by (win_rate, seen, avg_banners) descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterSet {
    #[serde(default)]
    pub generated_at: Option<String>,
    pub counters: BTreeMap<String, Vec<CounterRecord>>,
}

/// On disk a dataset is either the merged format with metadata or a bare
/// per-season map of leader -> records.
#[derive(Deserialize)]
#[serde(untagged)]
enum CounterFile {
    Tagged {
        generated_at: Option<String>,
        counters: BTreeMap<String, Vec<CounterRecord>>,
    },
    Bare(BTreeMap<String, Vec<CounterRecord>>),
}

impl CounterSet {
    pub fn new(counters: BTreeMap<String, Vec<CounterRecord>>) -> CounterSet {
        CounterSet {
            generated_at: None,
            counters,
        }
    }

    pub fn load(path: &Path) -> Result<CounterSet, EngineError> {
        let raw = fs::read_to_string(path)?;
        let file: CounterFile = serde_json::from_str(&raw)?;
        Ok(match file {
            CounterFile::Tagged {
                generated_at,
                counters,
            } => CounterSet {
                generated_at,
                counters,
            },
            CounterFile::Bare(counters) => CounterSet {
                generated_at: None,
                counters,
            },
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// All recorded counters against teams led by `leader`. A leader with
    /// no recorded history is a legitimate empty-knowledge case.
    pub fn for_leader(&self, leader: &str) -> &[CounterRecord] {
        self.counters.get(leader).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn leader_count(&self) -> usize {
        self.counters.len()
    }

    pub fn record_count(&self) -> usize {
        self.counters.values().map(Vec::len).sum()
    }
}

/// Merge per-season datasets into one. Identical fights (same attack and
/// defense id sequences) are collapsed: win rate and banners are averaged
/// weighted by sample size, sample sizes are summed, and every leader's
/// list is re-sorted. Leaders merge independently, so they run in parallel.
pub fn merge_seasons(seasons: &[CounterSet]) -> CounterSet {
    let leaders: BTreeSet<&String> = seasons
        .iter()
        .flat_map(|season| season.counters.keys())
        .collect();

    let counters: BTreeMap<String, Vec<CounterRecord>> = leaders
        .into_par_iter()
        .map(|leader| (leader.clone(), merge_leader(seasons, leader)))
        .collect();

    CounterSet {
        generated_at: Some(Utc::now().to_rfc3339()),
        counters,
    }
}

struct FightAccumulator {
    attack: Vec<String>,
    defense: Vec<String>,
    weighted_wins: f64,
    weighted_banners: f64,
    weight: f64,
    seen: u32,
}

fn merge_leader(seasons: &[CounterSet], leader: &str) -> Vec<CounterRecord> {
    let mut fights: Vec<FightAccumulator> = Vec::new();
    let mut index: HashMap<(Vec<String>, Vec<String>), usize> = HashMap::new();

    for season in seasons {
        for record in season.for_leader(leader) {
            let key = (record.attack.clone(), record.defense.clone());
            // A record without sample information still counts as one observation.
            let weight = f64::from(record.seen.max(1));
            let slot = *index.entry(key).or_insert_with(|| {
                fights.push(FightAccumulator {
                    attack: record.attack.clone(),
                    defense: record.defense.clone(),
                    weighted_wins: 0.0,
                    weighted_banners: 0.0,
                    weight: 0.0,
                    seen: 0,
                });
                fights.len() - 1
            });
            let fight = &mut fights[slot];
            fight.weighted_wins += weight * f64::from(record.win_rate);
            fight.weighted_banners += weight * f64::from(record.avg_banners);
            fight.weight += weight;
            fight.seen += record.seen;
        }
    }

    let mut merged: Vec<CounterRecord> = fights
        .into_iter()
        .map(|fight| CounterRecord {
            attack: fight.attack,
            defense: fight.defense,
            win_rate: round2(fight.weighted_wins / fight.weight),
            avg_banners: round2(fight.weighted_banners / fight.weight),
            seen: fight.seen,
        })
        .collect();

    merged.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then(b.seen.cmp(&a.seen))
            .then(b.avg_banners.total_cmp(&a.avg_banners))
    });
    merged
}

fn round2(value: f64) -> f32 {
    ((value * 100.0).round() / 100.0) as f32
}
