use std::collections::HashMap;
use std::fs;
use std::path::Path;

use deunicode::deunicode;

use crate::data::{Character, RosterUnit};
use crate::errors::EngineError;

/// Fold accents and case so display names typed by hand still resolve
/// ("Padmé Amidala" == "padme amidala").
pub fn normalize_name(name: &str) -> String {
    deunicode(name.trim()).to_lowercase()
}

/// The game-wide character catalog: id -> character, plus a normalized
/// name index for resolving display names from round input.
pub struct Catalog {
    by_id: HashMap<String, Character>,
    by_name: HashMap<String, String>,
}

impl Catalog {
    pub fn new(characters: Vec<Character>) -> Catalog {
        let mut by_id = HashMap::with_capacity(characters.len());
        let mut by_name = HashMap::with_capacity(characters.len());
        for character in characters {
            by_name.insert(normalize_name(&character.name), character.base_id.clone());
            by_id.insert(character.base_id.clone(), character);
        }
        Catalog { by_id, by_name }
    }

    /// Load the catalog from a JSON array of character records.
    pub fn load(path: &Path) -> Result<Catalog, EngineError> {
        let raw = fs::read_to_string(path)?;
        let characters: Vec<Character> = serde_json::from_str(&raw)?;
        Ok(Catalog::new(characters))
    }

    pub fn get(&self, base_id: &str) -> Option<&Character> {
        self.by_id.get(base_id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Character> {
        let base_id = self.by_name.get(&normalize_name(name))?;
        self.by_id.get(base_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// The player's eligible units: roster entries at or above the minimum
    /// gear level, resolved to full catalog characters. Roster ids missing
    /// from the catalog are collected and reported together.
    pub fn eligible_units(
        &self,
        roster: &[RosterUnit],
        min_gear_level: u8,
    ) -> Result<Vec<Character>, EngineError> {
        let mut units = Vec::new();
        let mut missing = Vec::new();
        for unit in roster {
            if unit.gear_level < min_gear_level {
                continue;
            }
            match self.get(&unit.base_id) {
                Some(character) => units.push(character.clone()),
                None => missing.push(unit.base_id.clone()),
            }
        }
        if missing.is_empty() {
            Ok(units)
        } else {
            Err(EngineError::UnresolvedCharacters(missing))
        }
    }
}

/// Load a player roster dump: a JSON array of {base_id, gear_level}.
pub fn load_roster(path: &Path) -> Result<Vec<RosterUnit>, EngineError> {
    let raw = fs::read_to_string(path)?;
    let roster: Vec<RosterUnit> = serde_json::from_str(&raw)?;
    Ok(roster)
}

/// Resolves display names to characters while accumulating every name that
/// fails, so a whole round's unresolved names surface in one error. Scoped
/// to a single resolution pass; never shared between invocations.
pub struct NameResolver<'a> {
    catalog: &'a Catalog,
    missing: Vec<String>,
}

impl<'a> NameResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> NameResolver<'a> {
        NameResolver {
            catalog,
            missing: Vec::new(),
        }
    }

    /// Resolve a team of display names. Unresolved names are recorded and
    /// skipped; `finish` decides whether the pass as a whole failed.
    pub fn resolve_team(&mut self, names: &[String]) -> Vec<Character> {
        let mut team = Vec::with_capacity(names.len());
        for name in names {
            match self.catalog.find_by_name(name) {
                Some(character) => team.push(character.clone()),
                None => self.missing.push(name.clone()),
            }
        }
        team
    }

    pub fn finish(self) -> Result<(), EngineError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::UnresolvedCharacters(self.missing))
        }
    }
}
