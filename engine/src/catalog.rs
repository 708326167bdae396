use std::{fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::content;
use crate::currency::Coins;
use crate::rules::{ArmorCategory, ClassId, SpecialKind, SpellTier, WeaponCategory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub cost: Coins,
    pub damage: String,
    pub damage_type: String,
    pub weight: f32,
    #[serde(default)]
    pub properties: Vec<String>,
    /// Normal/long range in feet, e.g. "20/60".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versatile_damage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub name: String,
    #[serde(rename = "type")]
    pub category: ArmorCategory,
    pub cost: Coins,
    #[serde(rename = "ac")]
    pub base_ac: i32,
    pub add_dex: bool,
    /// `None` means the dexterity bonus is uncapped.
    #[serde(default)]
    pub max_dex: Option<i32>,
    #[serde(default)]
    pub stealth_disadvantage: bool,
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength_requirement: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub name: String,
    pub cost: Coins,
    pub ac_bonus: i32,
    pub weight: f32,
}

/// Adventuring gear and special items share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub name: String,
    pub cost: Coins,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub concentration: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellBook {
    pub cantrips: Vec<Spell>,
    pub first_level: Vec<Spell>,
}

impl SpellBook {
    pub fn tier(&self, tier: SpellTier) -> &[Spell] {
        match tier {
            SpellTier::Cantrip => &self.cantrips,
            SpellTier::FirstLevel => &self.first_level,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArmorSection {
    armor: Vec<Armor>,
    shields: Vec<Shield>,
}

#[derive(Debug, Deserialize)]
struct GearSection {
    gear: IndexMap<String, GearItem>,
    special: IndexMap<SpecialKind, IndexMap<String, GearItem>>,
}

/// Everything a character can buy or learn at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub weapons: IndexMap<WeaponCategory, Vec<Weapon>>,
    pub armor: Vec<Armor>,
    pub shields: Vec<Shield>,
    pub gear: IndexMap<String, GearItem>,
    /// Catalog-backed special items; spell scrolls are priced from the spell
    /// lists instead.
    pub special: IndexMap<SpecialKind, IndexMap<String, GearItem>>,
    pub spells: IndexMap<ClassId, SpellBook>,
}

impl Catalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self> {
        let weapons = serde_json::from_str(content::WEAPONS)
            .context("failed to parse built-in weapons JSON")?;
        let ArmorSection { armor, shields } = serde_json::from_str(content::ARMOR)
            .context("failed to parse built-in armor JSON")?;
        let GearSection { gear, special } = serde_json::from_str(content::GEAR)
            .context("failed to parse built-in gear JSON")?;
        let spells = serde_json::from_str(content::SPELLS)
            .context("failed to parse built-in spells JSON")?;
        Ok(Self {
            weapons,
            armor,
            shields,
            gear,
            special,
            spells,
        })
    }

    /// Load a complete catalog file; `.yaml`/`.yml` is read as YAML,
    /// anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        if is_yaml(path) {
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse catalog YAML: {}", path.display()))
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse catalog JSON: {}", path.display()))
        }
    }

    pub fn find_weapon(&self, category: WeaponCategory, name: &str) -> Option<&Weapon> {
        self.weapons
            .get(&category)?
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn find_armor(&self, name: &str) -> Option<&Armor> {
        self.armor
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn find_shield(&self, name: &str) -> Option<&Shield> {
        self.shields
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn gear(&self, id: &str) -> Option<&GearItem> {
        self.gear.get(id)
    }

    pub fn special(&self, kind: SpecialKind, id: &str) -> Option<&GearItem> {
        self.special.get(&kind)?.get(id)
    }

    pub fn spell_book(&self, class: ClassId) -> Option<&SpellBook> {
        self.spells.get(&class)
    }

    pub fn spell(&self, class: ClassId, tier: SpellTier, id: &str) -> Option<&Spell> {
        self.spell_book(class)?
            .tier(tier)
            .iter()
            .find(|s| s.id == id)
    }

    /// Display name for a spell id, falling back to the id itself.
    pub fn spell_name<'a>(&'a self, class: ClassId, tier: SpellTier, id: &'a str) -> &'a str {
        self.spell(class, tier, id).map_or(id, |s| s.name.as_str())
    }
}

/// `.yaml` and `.yml` files are YAML; anything else is read as JSON.
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}
