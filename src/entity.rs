//! Entity Kinds
//!
//! Tag selecting the URL template and stat alias table for each kind of
//! wiki page. Replaces per-kind scraper types with one lookup table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stat name paired with the labels it appears under on the wiki.
pub type StatAliases = (&'static str, &'static [&'static str]);

const CHAMPION_STATS: &[StatAliases] = &[
    ("hp", &["Health", "HP"]),
    ("hp_regen", &["Health regen", "HP5", "Health regeneration"]),
    ("mana", &["Mana", "MP"]),
    ("mana_regen", &["Mana regen", "MP5", "Mana regeneration"]),
    ("armor", &["Armor"]),
    ("magic_resist", &["Magic resist", "Magic resistance", "MR"]),
    ("attack_damage", &["Attack damage", "AD"]),
    ("attack_speed", &["Attack speed", "Base AS"]),
    ("attack_range", &["Attack range", "Range"]),
    ("move_speed", &["Move speed", "Movement speed", "MS"]),
];

const ITEM_STATS: &[StatAliases] = &[
    ("hp", &["Health", "HP"]),
    ("mana", &["Mana"]),
    ("armor", &["Armor"]),
    ("magic_resist", &["Magic resist", "Magic resistance"]),
    ("attack_damage", &["Attack damage"]),
    ("ability_power", &["Ability power", "AP"]),
    ("attack_speed", &["Attack speed"]),
    ("critical_strike_chance", &["Critical strike chance", "Crit chance"]),
    ("ability_haste", &["Ability haste"]),
    ("lethality", &["Lethality"]),
    ("life_steal", &["Life steal"]),
    ("move_speed", &["Move speed", "Movement speed"]),
    ("cost", &["Cost", "Total cost"]),
];

const RUNE_STATS: &[StatAliases] = &[
    ("damage", &["Damage", "Bonus damage"]),
    ("shield", &["Shield", "Shield strength"]),
    ("heal", &["Heal", "Healing"]),
    ("adaptive_force", &["Adaptive force"]),
    ("cooldown", &["Cooldown"]),
    ("duration", &["Duration"]),
];

// == Entity Kind ==
/// Kind of wiki entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Champion,
    Item,
    Rune,
}

impl EntityKind {
    /// Lowercase tag used in cache keys and API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Champion => "champion",
            EntityKind::Item => "item",
            EntityKind::Rune => "rune",
        }
    }

    /// URL path (relative to the wiki base) for an already encoded identity.
    pub fn path_for(&self, identity: &str) -> String {
        match self {
            EntityKind::Champion => format!("{}/LoL", identity),
            EntityKind::Item | EntityKind::Rune => identity.to_string(),
        }
    }

    /// Stats extracted for this kind, with their label aliases in priority order.
    pub fn stat_aliases(&self) -> &'static [StatAliases] {
        match self {
            EntityKind::Champion => CHAMPION_STATS,
            EntityKind::Item => ITEM_STATS,
            EntityKind::Rune => RUNE_STATS,
        }
    }

    /// Aliases for one stat name, if this kind tracks it.
    pub fn aliases_for(&self, stat: &str) -> Option<&'static [&'static str]> {
        self.stat_aliases()
            .iter()
            .find(|(name, _)| *name == stat)
            .map(|(_, aliases)| *aliases)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "champion" | "champions" => Ok(EntityKind::Champion),
            "item" | "items" => Ok(EntityKind::Item),
            "rune" | "runes" => Ok(EntityKind::Rune),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_plural_and_case() {
        assert_eq!("Champions".parse::<EntityKind>().unwrap(), EntityKind::Champion);
        assert_eq!("item".parse::<EntityKind>().unwrap(), EntityKind::Item);
        assert!("spell".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_champion_path_has_lol_suffix() {
        assert_eq!(EntityKind::Champion.path_for("Kai%27Sa"), "Kai%27Sa/LoL");
        assert_eq!(EntityKind::Item.path_for("Infinity_Edge"), "Infinity_Edge");
    }

    #[test]
    fn test_aliases_for() {
        assert_eq!(EntityKind::Champion.aliases_for("hp"), Some(&["Health", "HP"][..]));
        assert!(EntityKind::Rune.aliases_for("hp").is_none());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&EntityKind::Rune).unwrap();
        assert_eq!(json, "\"rune\"");
    }
}
