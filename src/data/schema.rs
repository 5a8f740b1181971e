//! Table Schema Module
//! Fixed enumerations and canonical column names of the normalized tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical column names of the long-form tables.
pub mod columns {
    pub const PLACE: &str = "place";
    pub const IS_REGION: &str = "is_region";
    pub const ISLAND_GROUP: &str = "island_group";
    pub const ICD_CODE: &str = "icd_code";
    pub const CAUSE: &str = "cause";
    pub const AGE_GROUP: &str = "age_group";
    pub const DEATHS: &str = "deaths";
}

/// One of the nine fixed age brackets used by both source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "Under 15")]
    Under15,
    #[serde(rename = "15-19")]
    From15To19,
    #[serde(rename = "20-24")]
    From20To24,
    #[serde(rename = "25-29")]
    From25To29,
    #[serde(rename = "30-34")]
    From30To34,
    #[serde(rename = "35-39")]
    From35To39,
    #[serde(rename = "40-44")]
    From40To44,
    #[serde(rename = "45-49")]
    From45To49,
    #[serde(rename = "50+")]
    From50,
}

impl AgeGroup {
    /// All brackets, in source column order.
    pub const ALL: [AgeGroup; 9] = [
        AgeGroup::Under15,
        AgeGroup::From15To19,
        AgeGroup::From20To24,
        AgeGroup::From25To29,
        AgeGroup::From30To34,
        AgeGroup::From35To39,
        AgeGroup::From40To44,
        AgeGroup::From45To49,
        AgeGroup::From50,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Under15 => "Under 15",
            AgeGroup::From15To19 => "15-19",
            AgeGroup::From20To24 => "20-24",
            AgeGroup::From25To29 => "25-29",
            AgeGroup::From30To34 => "30-34",
            AgeGroup::From35To39 => "35-39",
            AgeGroup::From40To44 => "40-44",
            AgeGroup::From45To49 => "45-49",
            AgeGroup::From50 => "50+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AgeGroup::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown age group '{}'", s))
    }
}

/// Major archipelagic division a place belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IslandGroup {
    Luzon,
    Visayas,
    Mindanao,
    Other,
}

impl IslandGroup {
    /// Options offered by the island filter. `Other` stays in the data only.
    pub const SELECTABLE: [IslandGroup; 3] =
        [IslandGroup::Luzon, IslandGroup::Visayas, IslandGroup::Mindanao];

    pub fn label(self) -> &'static str {
        match self {
            IslandGroup::Luzon => "Luzon",
            IslandGroup::Visayas => "Visayas",
            IslandGroup::Mindanao => "Mindanao",
            IslandGroup::Other => "Other",
        }
    }
}

impl fmt::Display for IslandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IslandGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [
            IslandGroup::Luzon,
            IslandGroup::Visayas,
            IslandGroup::Mindanao,
            IslandGroup::Other,
        ]
        .into_iter()
        .find(|g| g.label().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("Unknown island group '{}'", s))
    }
}

/// One (place, age group) row of the long-form geography table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographyRecord {
    pub place: String,
    pub is_region: bool,
    pub island_group: IslandGroup,
    pub age_group: AgeGroup,
    pub deaths: f64,
}

/// One (cause, age group) row of the long-form cause table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseRecord {
    pub icd_code: String,
    pub cause: Option<String>,
    pub age_group: AgeGroup,
    pub deaths: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_group_labels_round_trip_through_from_str() {
        for group in AgeGroup::ALL {
            assert_eq!(group.label().parse::<AgeGroup>().unwrap(), group);
        }
        assert_eq!("under 15".parse::<AgeGroup>().unwrap(), AgeGroup::Under15);
        assert!("60+".parse::<AgeGroup>().is_err());
    }

    #[test]
    fn test_selectable_islands_exclude_other() {
        assert!(!IslandGroup::SELECTABLE.contains(&IslandGroup::Other));
        assert_eq!("visayas".parse::<IslandGroup>().unwrap(), IslandGroup::Visayas);
    }

    #[test]
    fn test_age_group_serializes_as_label() {
        let json = serde_json::to_string(&AgeGroup::From50).unwrap();
        assert_eq!(json, "\"50+\"");
        let back: AgeGroup = serde_json::from_str("\"Under 15\"").unwrap();
        assert_eq!(back, AgeGroup::Under15);
    }
}
