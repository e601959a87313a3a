use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category tag that marks a character as a Galactic Legend.
pub const GALACTIC_LEGEND_TAG: &str = "Galactic Legend";

/// A playable character from the game catalog. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub base_id: String,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub image: String,
}

impl Character {
    pub fn is_galactic_legend(&self) -> bool {
        self.categories.iter().any(|c| c == GALACTIC_LEGEND_TAG)
    }
}

/// One unit from a player's roster dump. Gear level decides eligibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterUnit {
    pub base_id: String,
    pub gear_level: u8,
}

/// One opposing team slot inside a zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenseEntry {
    pub defense: Vec<Character>,
    #[serde(default)]
    pub eliminated: bool,
}

/// An attack team the player can actually field against a specific defense,
/// annotated with its historical win rate. `has_gl` carries whether the
/// *defense* team contains a Galactic Legend; it gates the solver's
/// confidence floor and says nothing about the attack team itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub attack: Vec<Character>,
    pub win_rate: f32,
    pub has_gl: bool,
}

impl Candidate {
    /// The empty-attack sentinel: chosen when a defense slot has no legal
    /// counter left. Win rate zero, never conflicts with anything.
    pub fn forfeit() -> Candidate {
        Candidate {
            attack: Vec::new(),
            win_rate: 0.0,
            has_gl: false,
        }
    }

    pub fn is_forfeit(&self) -> bool {
        self.attack.is_empty()
    }
}

/// One solver decision point: a defense team and the candidate attacks
/// that may be assigned to it.
#[derive(Debug, Clone)]
pub struct Slot {
    pub zone: String,
    pub defense: Vec<Character>,
    pub candidates: Vec<Candidate>,
}

/// Team identity is the set of member ids; order only matters for the
/// leader, which is always the first member.
pub fn team_ids(team: &[Character]) -> Vec<String> {
    team.iter().map(|c| c.base_id.clone()).collect()
}

pub fn same_team(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted = a.to_vec();
    let mut b_sorted = b.to_vec();
    a_sorted.sort();
    b_sorted.sort();
    a_sorted == b_sorted
}

pub fn team_has_galactic_legend(team: &[Character]) -> bool {
    team.iter().any(|c| c.is_galactic_legend())
}

/// Game mode. The two umbrella variants keep separate counter datasets
/// because team sizes and the meta differ between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    FiveVFive,
    ThreeVThree,
}

impl Mode {
    pub fn file_name(&self) -> &'static str {
        match self {
            Mode::FiveVFive => "5v5.json",
            Mode::ThreeVThree => "3v3.json",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::FiveVFive => write!(f, "5v5"),
            Mode::ThreeVThree => write!(f, "3v3"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Mode, String> {
        match s {
            "5v5" => Ok(Mode::FiveVFive),
            "3v3" => Ok(Mode::ThreeVThree),
            other => Err(format!("unknown mode '{}', expected 5v5 or 3v3", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::thread_rng;

    fn character(base_id: &str, categories: &[&str]) -> Character {
        Character {
            base_id: base_id.to_string(),
            name: base_id.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            image: String::new(),
        }
    }

    #[test]
    fn team_identity_ignores_member_order() {
        let a = vec!["LEADER".to_string(), "B".to_string(), "C".to_string()];
        let b = vec!["C".to_string(), "LEADER".to_string(), "B".to_string()];
        assert!(same_team(&a, &b));

        let mut shuffled = a.clone();
        let mut rng = thread_rng();
        for _ in 0..10 {
            shuffled.shuffle(&mut rng);
            assert!(same_team(&a, &shuffled));
        }
    }

    #[test]
    fn team_identity_respects_membership() {
        let a = vec!["A".to_string(), "B".to_string()];
        let b = vec!["A".to_string(), "C".to_string()];
        let c = vec!["A".to_string()];
        assert!(!same_team(&a, &b));
        assert!(!same_team(&a, &c));
    }

    #[test]
    fn leader_is_positional() {
        let team = vec![character("LEADER", &[]), character("MEMBER", &[])];
        assert_eq!(team[0].base_id, "LEADER");
        let ids = team_ids(&team);
        assert_eq!(ids[0], "LEADER");
    }

    #[test]
    fn galactic_legend_detection() {
        let plain = vec![character("A", &["Jedi"]), character("B", &[])];
        let with_gl = vec![
            character("A", &["Jedi"]),
            character("GLREY", &["Galactic Legend", "Resistance"]),
        ];
        assert!(!team_has_galactic_legend(&plain));
        assert!(team_has_galactic_legend(&with_gl));
    }

    #[test]
    fn forfeit_candidate_is_empty_and_worthless() {
        let sentinel = Candidate::forfeit();
        assert!(sentinel.is_forfeit());
        assert_eq!(sentinel.win_rate, 0.0);
        assert!(!sentinel.has_gl);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("5v5".parse::<Mode>().unwrap(), Mode::FiveVFive);
        assert_eq!("3v3".parse::<Mode>().unwrap(), Mode::ThreeVThree);
        assert!("4v4".parse::<Mode>().is_err());
        assert_eq!(Mode::ThreeVThree.file_name(), "3v3.json");
    }
}
