use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod build;
pub mod catalog;
pub mod config;
pub mod content;
pub mod currency;
pub mod equipment;
pub mod rules;
pub mod stats;
pub mod summary;

pub use build::{
    BuildError, BuildStage, Builder, CharacterBuildState, DerivedStats, EquipmentOutcome,
    ErrorKind, HitPoints, SkillLine, SpellcastingStats, Step, StepInput, StepOutcome,
};
pub use catalog::Catalog;
pub use config::BuildConfig;
pub use currency::{coins_to_currency, currency_to_coins, format_coins, Coins};
pub use equipment::{
    EquipmentError, EquipmentRequest, ProficiencyWarning, PurchaseAction, PurchasedEquipment,
    Resolution, SpecialItemRef, WeaponRef,
};
pub use rules::{ArmorCategory, ClassId, FightingStyle, Race, Skill, SpecialKind, SpellTier, WeaponCategory};
pub use stats::{
    ability_modifier, apply_racial_bonus, armor_class, max_hp, passive_perception,
    skill_modifier, spell_attack_bonus, spell_save_dc,
};

/// Identifier that did not match any entry of an enumerated table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownId {
    pub kind: &'static str,
    pub value: String,
}

/// Case-insensitive lookup that treats `_`, `-` and spaces alike, so
/// "sleight_of_hand" and "Sleight of Hand" name the same skill.
pub(crate) fn parse_named<T: Copy>(
    all: &[T],
    name: impl Fn(T) -> &'static str,
    kind: &'static str,
    input: &str,
) -> Result<T, UnknownId> {
    let wanted = normalize(input);
    all.iter()
        .copied()
        .find(|v| normalize(name(*v)) == wanted)
        .ok_or_else(|| UnknownId {
            kind,
            value: input.trim().to_string(),
        })
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "strength")]
    Str,
    #[serde(rename = "dexterity")]
    Dex,
    #[serde(rename = "constitution")]
    Con,
    #[serde(rename = "intelligence")]
    Int,
    #[serde(rename = "wisdom")]
    Wis,
    #[serde(rename = "charisma")]
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Ability::Str => "strength",
            Ability::Dex => "dexterity",
            Ability::Con => "constitution",
            Ability::Int => "intelligence",
            Ability::Wis => "wisdom",
            Ability::Cha => "charisma",
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Ability::Str => "STR",
            Ability::Dex => "DEX",
            Ability::Con => "CON",
            Ability::Int => "INT",
            Ability::Wis => "WIS",
            Ability::Cha => "CHA",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Ability {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Ability::ALL, Ability::name, "ability", s)
            .or_else(|_| parse_named(&Ability::ALL, Ability::abbrev, "ability", s))
    }
}

/// The six ability scores of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn uniform(score: i32) -> Self {
        Self {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    /// Roll all six scores in table order (STR, DEX, CON, INT, WIS, CHA).
    pub fn roll(dice: &mut Dice) -> Self {
        let mut scores = Self::uniform(0);
        for ability in Ability::ALL {
            scores.set(ability, dice.ability_score());
        }
        scores
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: i32) {
        match ability {
            Ability::Str => self.strength = value,
            Ability::Dex => self.dexterity = value,
            Ability::Con => self.constitution = value,
            Ability::Int => self.intelligence = value,
            Ability::Wis => self.wisdom = value,
            Ability::Cha => self.charisma = value,
        }
    }

    pub fn mod_of(&self, ability: Ability) -> i32 {
        stats::ability_modifier(self.get(ability))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::ALL.into_iter().map(move |a| (a, self.get(a)))
    }

    /// Build from a loosely-keyed map (e.g. a form payload). Keys may be full
    /// names or abbreviations; every ability must be present.
    pub fn try_from_map(map: &IndexMap<String, i32>) -> Result<Self, BuildError> {
        let mut scores = Self::uniform(0);
        for ability in Ability::ALL {
            let value = map
                .iter()
                .find(|(k, _)| k.parse::<Ability>().ok() == Some(ability))
                .map(|(_, v)| *v)
                .ok_or_else(|| BuildError::MissingAbility(ability.name().to_string()))?;
            scores.set(ability, value);
        }
        Ok(scores)
    }
}

enum DiceSource {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<u8>, cursor: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("dice script is empty")]
    Empty,
    #[error("scripted face {0} is outside 1..=6")]
    FaceOutOfRange(u8),
    #[error("dice script needs a face of 3 or more to end the re-roll")]
    NoKeepableFace,
}

/// The only source of randomness in the engine. Seeded for reproducible
/// builds, scripted for tests that need exact faces.
pub struct Dice {
    source: DiceSource,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: DiceSource::Seeded(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// d6 faces returned in order, wrapping around when exhausted.
    pub fn from_scripted(values: Vec<u8>) -> Result<Self, ScriptError> {
        if values.is_empty() {
            return Err(ScriptError::Empty);
        }
        if let Some(&face) = values.iter().find(|f| !(1..=6).contains(*f)) {
            return Err(ScriptError::FaceOutOfRange(face));
        }
        if values.iter().all(|&f| f <= 2) {
            return Err(ScriptError::NoKeepableFace);
        }
        Ok(Self {
            source: DiceSource::Scripted { values, cursor: 0 },
        })
    }

    /// Scripted faces are folded into `1..=sides`.
    pub fn roll(&mut self, sides: u8) -> u8 {
        let sides = sides.max(1);
        match &mut self.source {
            DiceSource::Seeded(rng) => rng.gen_range(1..=sides),
            DiceSource::Scripted { values, cursor } => {
                let face = values[*cursor % values.len()];
                *cursor += 1;
                (face - 1) % sides + 1
            }
        }
    }

    pub fn d6(&mut self) -> u8 {
        self.roll(6)
    }

    /// 4d6, each die re-rolled while it shows 1 or 2, lowest die dropped.
    pub fn ability_score(&mut self) -> i32 {
        let mut rolls = [0u8; 4];
        for slot in rolls.iter_mut() {
            let mut face = self.d6();
            while face <= 2 {
                face = self.d6();
            }
            *slot = face;
        }
        rolls.sort_unstable();
        rolls[1..].iter().map(|&r| r as i32).sum()
    }
}
