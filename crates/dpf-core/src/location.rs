use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Where the values of a field or the ids of a scoping live on the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// One entry per node.
    Nodal,
    /// One entry per element.
    Elemental,
    /// One entry per element, with one block of components per connected node.
    ElementalNodal,
    /// One entry per time/frequency set.
    TimeFreq,
}

impl Location {
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Nodal => "Nodal",
            Location::Elemental => "Elemental",
            Location::ElementalNodal => "ElementalNodal",
            Location::TimeFreq => "TimeFreq_sets",
        }
    }

    /// True when the entity ids of this location are element ids.
    pub fn is_element_based(self) -> bool {
        matches!(self, Location::Elemental | Location::ElementalNodal)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nodal" => Ok(Location::Nodal),
            "elemental" => Ok(Location::Elemental),
            "elementalnodal" | "elemental_nodal" => Ok(Location::ElementalNodal),
            "timefreq_sets" | "timefreq" => Ok(Location::TimeFreq),
            _ => Err(CoreError::UnknownLocation(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("nodal".parse::<Location>().unwrap(), Location::Nodal);
        assert_eq!(
            "ElementalNodal".parse::<Location>().unwrap(),
            Location::ElementalNodal
        );
        assert_eq!(
            " elemental ".parse::<Location>().unwrap(),
            Location::Elemental
        );
        assert!("faces".parse::<Location>().is_err());
    }

    #[test]
    fn display_matches_serde_names() {
        for loc in [Location::Nodal, Location::Elemental, Location::ElementalNodal] {
            let json = serde_json::to_string(&loc).unwrap();
            assert_eq!(json, format!("\"{loc}\""));
        }
    }
}
