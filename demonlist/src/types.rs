//! Core data types shared by the loader, cache and consumers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default data host for the TSL list.
pub const TSL_BASE_URL: &str = "https://tsl.pages.dev/data";

/// Default data host for the TSL+ list.
pub const TSL_PLUS_BASE_URL: &str = "https://tslplus.pages.dev/data";

/// One ranked entry of a demonlist.
///
/// `position` is 1-based and comes from the entry's index in the manifest,
/// not from the detail document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListItem {
    /// In-game level ID.
    pub id: i64,
    /// Level name as published by the list.
    pub name: String,
    /// Rank on the list, starting at 1.
    pub position: u32,
}

/// A named group of levels awarding bonus points.
///
/// Packs are consumed by the display layer; the loader never populates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemonPack {
    pub name: String,
    pub points: f64,
    pub levels: Vec<i64>,
}

/// Which of the two published lists a load targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSource {
    /// The Shitty List.
    Tsl,
    /// The Shitty List+, the extended list.
    TslPlus,
}

impl ListSource {
    /// Every supported source, in slot order.
    pub const ALL: [ListSource; 2] = [ListSource::Tsl, ListSource::TslPlus];

    /// Human-readable name used in logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            ListSource::Tsl => "TSL",
            ListSource::TslPlus => "TSL+",
        }
    }

    /// Key used for this source in configuration files and CLI arguments.
    pub fn key(&self) -> &'static str {
        match self {
            ListSource::Tsl => "tsl",
            ListSource::TslPlus => "tsl_plus",
        }
    }

    /// Data host used when no override is configured.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ListSource::Tsl => TSL_BASE_URL,
            ListSource::TslPlus => TSL_PLUS_BASE_URL,
        }
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            ListSource::Tsl => 0,
            ListSource::TslPlus => 1,
        }
    }
}

impl fmt::Display for ListSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tsl" => Ok(ListSource::Tsl),
            "tsl_plus" | "tsl-plus" | "tslplus" | "tsl+" => Ok(ListSource::TslPlus),
            _ => Err(ConfigError::InvalidValue {
                key: "source".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parsing_accepts_aliases() {
        assert_eq!("tsl".parse::<ListSource>().unwrap(), ListSource::Tsl);
        assert_eq!("TSL+".parse::<ListSource>().unwrap(), ListSource::TslPlus);
        assert_eq!("tsl-plus".parse::<ListSource>().unwrap(), ListSource::TslPlus);
        assert!("aredl".parse::<ListSource>().is_err());
    }

    #[test]
    fn test_sources_have_distinct_slots_and_hosts() {
        assert_ne!(ListSource::Tsl.slot(), ListSource::TslPlus.slot());
        assert_ne!(
            ListSource::Tsl.default_base_url(),
            ListSource::TslPlus.default_base_url()
        );
    }

    #[test]
    fn test_demon_pack_deserializes() {
        let pack: DemonPack =
            serde_json::from_str(r#"{"name":"Starter","points":12.5,"levels":[1,2,3]}"#)
                .unwrap();
        assert_eq!(pack.name, "Starter");
        assert_eq!(pack.levels, vec![1, 2, 3]);
    }
}
