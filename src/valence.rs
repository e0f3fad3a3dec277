//! Valence orbital selection from electron configuration strings

use std::fmt;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{OrbitalError, Result};
use crate::physics::QuantumNumbers;

/// Noble gas core such as `[Ar]`, with trailing whitespace
static CORE_NOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[A-Za-z]+\]\s*").expect("core notation pattern"));

/// `<n><type><count>`, e.g. `3d6`
static SUBSHELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)([spdf])(\d+)").expect("subshell pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbitalType {
    S,
    P,
    D,
    F,
}

impl OrbitalType {
    pub fn from_l(l: u32) -> Option<Self> {
        match l {
            0 => Some(OrbitalType::S),
            1 => Some(OrbitalType::P),
            2 => Some(OrbitalType::D),
            3 => Some(OrbitalType::F),
            _ => None,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "s" => Some(OrbitalType::S),
            "p" => Some(OrbitalType::P),
            "d" => Some(OrbitalType::D),
            "f" => Some(OrbitalType::F),
            _ => None,
        }
    }

    pub fn l(self) -> u32 {
        match self {
            OrbitalType::S => 0,
            OrbitalType::P => 1,
            OrbitalType::D => 2,
            OrbitalType::F => 3,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            OrbitalType::S => 's',
            OrbitalType::P => 'p',
            OrbitalType::D => 'd',
            OrbitalType::F => 'f',
        }
    }

    pub fn shape(self) -> &'static str {
        match self {
            OrbitalType::S => "spherical",
            OrbitalType::P => "dumbbell",
            OrbitalType::D => "cloverleaf",
            OrbitalType::F => "complex",
        }
    }
}

/// The subshell to visualize for an element. Cache identity is (n, l, m).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrbitalDescriptor {
    pub n: u32,
    pub l: u32,
    pub m: i32,
    pub orbital_type: OrbitalType,
    pub electrons: u32,
}

impl OrbitalDescriptor {
    pub fn new(n: u32, l: u32, m: i32, electrons: u32) -> Result<Self> {
        let invalid = OrbitalError::InvalidQuantumNumbers { n, l, m };
        if QuantumNumbers::new(n, l, m).is_none() {
            return Err(invalid);
        }
        let orbital_type = OrbitalType::from_l(l).ok_or(invalid)?;
        Ok(OrbitalDescriptor {
            n,
            l,
            m,
            orbital_type,
            electrons,
        })
    }

    /// 1s¹, used whenever a configuration cannot be parsed
    pub fn fallback() -> Self {
        OrbitalDescriptor {
            n: 1,
            l: 0,
            m: 0,
            orbital_type: OrbitalType::S,
            electrons: 1,
        }
    }

    pub fn quantum_numbers(&self) -> QuantumNumbers {
        QuantumNumbers {
            n: self.n,
            l: self.l,
            m_l: self.m,
        }
    }

    /// Subshell name without occupancy, e.g. `3d`
    pub fn name(&self) -> String {
        format!("{}{}", self.n, self.orbital_type.symbol())
    }

    pub fn description(&self) -> String {
        orbital_description(self)
    }
}

impl Default for OrbitalDescriptor {
    fn default() -> Self {
        Self::fallback()
    }
}

impl fmt::Display for OrbitalDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.n, self.orbital_type.symbol(), self.electrons)
    }
}

/// Picks the valence subshell of a configuration like `[Ar] 3d6 4s2`.
///
/// The last subshell wins unless a d or f subshell is present, in which case
/// the first of those is taken: `[Ar] 3d6 4s2` gives 3d. Only m = 0 is
/// visualized. Anything unparseable yields [`OrbitalDescriptor::fallback`].
pub fn parse_valence_orbital(config: &str) -> OrbitalDescriptor {
    let without_core = CORE_NOTATION.replace_all(config, "");
    let subshells: Vec<&str> = without_core.split_whitespace().collect();

    let Some(&last) = subshells.last() else {
        return OrbitalDescriptor::fallback();
    };

    let valence = subshells
        .iter()
        .copied()
        .find(|token| {
            SUBSHELL
                .captures(token)
                .is_some_and(|cap| matches!(&cap[2], "d" | "f"))
        })
        .unwrap_or(last);

    parse_subshell(valence).unwrap_or_else(|| {
        debug!("no valence subshell in {config:?}, using 1s1");
        OrbitalDescriptor::fallback()
    })
}

fn parse_subshell(token: &str) -> Option<OrbitalDescriptor> {
    let cap = SUBSHELL.captures(token)?;
    let n = cap[1].parse::<u32>().ok()?;
    let orbital_type = OrbitalType::from_symbol(&cap[2])?;
    let electrons = cap[3].parse::<u32>().ok()?;
    OrbitalDescriptor::new(n, orbital_type.l(), 0, electrons).ok()
}

/// Human-readable label, e.g. `3d orbital (cloverleaf shape)`
pub fn orbital_description(orbital: &OrbitalDescriptor) -> String {
    format!(
        "{}{} orbital ({} shape)",
        orbital.n,
        orbital.orbital_type.symbol(),
        orbital.orbital_type.shape()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("[Ar] 3d6 4s2", 3, 2, 'd', 6)]
    #[case("1s1", 1, 0, 's', 1)]
    #[case("[He] 2s2 2p2", 2, 1, 'p', 2)]
    #[case("[Kr] 5s1", 5, 0, 's', 1)]
    #[case("  [Ne] 3s2 3p5  ", 3, 1, 'p', 5)]
    #[case("[Xe] 4f14 5d10 6s2", 4, 3, 'f', 14)]
    #[case("[Rn] 5f3 6d1 7s2", 5, 3, 'f', 3)]
    #[case("[Xe] 4f14 5d10 6s2 6p3", 4, 3, 'f', 14)]
    #[case("[Kr] 4d10", 4, 2, 'd', 10)]
    fn test_parse_valence_orbital(
        #[case] config: &str,
        #[case] n: u32,
        #[case] l: u32,
        #[case] symbol: char,
        #[case] electrons: u32,
    ) {
        let orbital = parse_valence_orbital(config);
        assert_eq!(orbital.n, n);
        assert_eq!(orbital.l, l);
        assert_eq!(orbital.m, 0);
        assert_eq!(orbital.orbital_type.symbol(), symbol);
        assert_eq!(orbital.electrons, electrons);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("[Ar]")]
    #[case("garbage")]
    #[case("0s1")]
    #[case("2d1")]
    #[case("99999999999s1")]
    fn test_unparseable_configs_fall_back_to_1s(#[case] config: &str) {
        assert_eq!(parse_valence_orbital(config), OrbitalDescriptor::fallback());
    }

    #[test]
    fn test_orbital_description() {
        let d = OrbitalDescriptor::new(3, 2, 0, 6).unwrap();
        assert_eq!(orbital_description(&d), "3d orbital (cloverleaf shape)");
        assert_eq!(
            OrbitalDescriptor::fallback().description(),
            "1s orbital (spherical shape)"
        );
        assert_eq!(
            parse_valence_orbital("[He] 2s2 2p4").description(),
            "2p orbital (dumbbell shape)"
        );
        assert_eq!(
            parse_valence_orbital("[Xe] 4f7 6s2").description(),
            "4f orbital (complex shape)"
        );
    }

    #[test]
    fn test_descriptor_validation() {
        assert!(OrbitalDescriptor::new(2, 2, 0, 1).is_err());
        assert!(OrbitalDescriptor::new(3, 1, 2, 1).is_err());
        assert!(OrbitalDescriptor::new(5, 4, 0, 1).is_err());
        assert!(OrbitalDescriptor::new(0, 0, 0, 1).is_err());
        let d = OrbitalDescriptor::new(4, 3, -2, 7).unwrap();
        assert_eq!(d.orbital_type, OrbitalType::F);
    }

    #[test]
    fn test_names_and_display() {
        let d = parse_valence_orbital("[Ar] 3d6 4s2");
        assert_eq!(d.name(), "3d");
        assert_eq!(d.to_string(), "3d6");
        assert_eq!(d.quantum_numbers(), QuantumNumbers::new(3, 2, 0).unwrap());
    }

    #[test]
    fn test_orbital_type_round_trip() {
        for l in 0..4 {
            let t = OrbitalType::from_l(l).unwrap();
            assert_eq!(t.l(), l);
            assert_eq!(OrbitalType::from_symbol(&t.symbol().to_string()), Some(t));
        }
        assert_eq!(OrbitalType::from_l(4), None);
    }
}
