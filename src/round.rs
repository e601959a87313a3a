use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::{Catalog, NameResolver};
use crate::data::{Character, DefenseEntry};
use crate::errors::EngineError;

/// Raw round input as submitted by the caller: zones of teams given as
/// display-name lists. Nothing is validated until `resolve`.
#[derive(Debug, Deserialize)]
pub struct RoundDocument {
    pub opponent: Vec<ZoneDocument>,
    #[serde(default)]
    pub player: Vec<ZoneDocument>,
    #[serde(default)]
    pub used_attack: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneDocument {
    pub zone: String,
    pub teams: Vec<TeamDocument>,
}

#[derive(Debug, Deserialize)]
pub struct TeamDocument {
    pub defense: Vec<String>,
    #[serde(default)]
    pub eliminated: bool,
}

/// A round with every name resolved to a full catalog character.
#[derive(Debug, Clone)]
pub struct Round {
    pub opponent: Vec<Zone>,
    pub player: Vec<Zone>,
    pub used_attack: Vec<Vec<Character>>,
}

#[derive(Debug, Clone)]
pub struct Zone {
    pub name: String,
    pub entries: Vec<DefenseEntry>,
}

impl RoundDocument {
    pub fn load(path: &Path) -> Result<RoundDocument, EngineError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Resolve every team in the round against the catalog. A single pass
    /// collects all unresolved names; any unresolved name fails the whole
    /// round, since a team missing a member changes win-rate semantics.
    pub fn resolve(&self, catalog: &Catalog) -> Result<Round, EngineError> {
        let mut resolver = NameResolver::new(catalog);

        let opponent = resolve_zones(&self.opponent, &mut resolver);
        let player = resolve_zones(&self.player, &mut resolver);
        let used_attack = self
            .used_attack
            .iter()
            .map(|team| resolver.resolve_team(team))
            .collect();

        resolver.finish()?;
        Ok(Round {
            opponent,
            player,
            used_attack,
        })
    }
}

fn resolve_zones(zones: &[ZoneDocument], resolver: &mut NameResolver) -> Vec<Zone> {
    zones
        .iter()
        .map(|zone| Zone {
            name: zone.zone.clone(),
            entries: zone
                .teams
                .iter()
                .map(|team| DefenseEntry {
                    defense: resolver.resolve_team(&team.defense),
                    eliminated: team.eliminated,
                })
                .collect(),
        })
        .collect()
}
