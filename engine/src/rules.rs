//! Static rule tables for level-1 character creation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{parse_named, Ability, UnknownId};

/// Flat proficiency bonus of a newly created character.
pub const PROFICIENCY_BONUS: i32 = 2;
/// Every spellcaster picks this many cantrips at creation.
pub const CREATION_CANTRIPS: usize = 3;
/// Wizards (spellbook) and Clerics (prepared) both pick six first-level
/// spells at creation.
pub const CREATION_FIRST_LEVEL_SPELLS: usize = 6;
/// Gold price of a spell scroll by tier.
pub const CANTRIP_SCROLL_GP: u64 = 30;
pub const FIRST_LEVEL_SCROLL_GP: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Elf,
    Dwarf,
    Halfling,
    Human,
}

impl Race {
    pub const ALL: [Race; 4] = [Race::Elf, Race::Dwarf, Race::Halfling, Race::Human];

    pub fn name(self) -> &'static str {
        match self {
            Race::Elf => "Elf",
            Race::Dwarf => "Dwarf",
            Race::Halfling => "Halfling",
            Race::Human => "Human",
        }
    }

    /// Ability score increases; abilities not listed get +0.
    pub fn bonuses(self) -> &'static [(Ability, i32)] {
        match self {
            Race::Elf => &[(Ability::Dex, 2), (Ability::Cha, 1)],
            Race::Dwarf => &[(Ability::Con, 2), (Ability::Str, 1)],
            Race::Halfling => &[(Ability::Dex, 2), (Ability::Con, 1)],
            Race::Human => &[],
        }
    }

    pub fn bonus(self, ability: Ability) -> i32 {
        self.bonuses()
            .iter()
            .find(|(a, _)| *a == ability)
            .map_or(0, |(_, b)| *b)
    }

    pub fn speed_ft(self) -> u32 {
        match self {
            Race::Dwarf | Race::Halfling => 25,
            Race::Elf | Race::Human => 30,
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Race {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Race::ALL, Race::name, "race", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    Acrobatics,
    #[serde(rename = "Animal Handling")]
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    #[serde(rename = "Sleight of Hand")]
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Skill::Acrobatics => "Acrobatics",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Arcana => "Arcana",
            Skill::Athletics => "Athletics",
            Skill::Deception => "Deception",
            Skill::History => "History",
            Skill::Insight => "Insight",
            Skill::Intimidation => "Intimidation",
            Skill::Investigation => "Investigation",
            Skill::Medicine => "Medicine",
            Skill::Nature => "Nature",
            Skill::Perception => "Perception",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
            Skill::Religion => "Religion",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Survival => "Survival",
        }
    }

    /// Governing ability.
    pub fn ability(self) -> Ability {
        use Skill::*;
        match self {
            Athletics => Ability::Str,
            Acrobatics | SleightOfHand | Stealth => Ability::Dex,
            Arcana | History | Investigation | Nature | Religion => Ability::Int,
            AnimalHandling | Insight | Medicine | Perception | Survival => Ability::Wis,
            Deception | Intimidation | Performance | Persuasion => Ability::Cha,
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Skill {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Skill::ALL, Skill::name, "skill", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FightingStyle {
    Archery,
    #[serde(rename = "Blind Fighting")]
    BlindFighting,
    Defense,
    Dueling,
    #[serde(rename = "Great Weapon Fighting")]
    GreatWeaponFighting,
    Interception,
    Protection,
    #[serde(rename = "Thrown Weapon Fighting")]
    ThrownWeaponFighting,
    #[serde(rename = "Two-Weapon Fighting")]
    TwoWeaponFighting,
    #[serde(rename = "Unarmed Fighting")]
    UnarmedFighting,
}

impl FightingStyle {
    pub const ALL: [FightingStyle; 10] = [
        FightingStyle::Archery,
        FightingStyle::BlindFighting,
        FightingStyle::Defense,
        FightingStyle::Dueling,
        FightingStyle::GreatWeaponFighting,
        FightingStyle::Interception,
        FightingStyle::Protection,
        FightingStyle::ThrownWeaponFighting,
        FightingStyle::TwoWeaponFighting,
        FightingStyle::UnarmedFighting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FightingStyle::Archery => "Archery",
            FightingStyle::BlindFighting => "Blind Fighting",
            FightingStyle::Defense => "Defense",
            FightingStyle::Dueling => "Dueling",
            FightingStyle::GreatWeaponFighting => "Great Weapon Fighting",
            FightingStyle::Interception => "Interception",
            FightingStyle::Protection => "Protection",
            FightingStyle::ThrownWeaponFighting => "Thrown Weapon Fighting",
            FightingStyle::TwoWeaponFighting => "Two-Weapon Fighting",
            FightingStyle::UnarmedFighting => "Unarmed Fighting",
        }
    }
}

impl fmt::Display for FightingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FightingStyle {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&FightingStyle::ALL, FightingStyle::name, "fighting style", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponCategory {
    SimpleMelee,
    SimpleRanged,
    MartialMelee,
    MartialRanged,
}

impl WeaponCategory {
    pub const ALL: [WeaponCategory; 4] = [
        WeaponCategory::SimpleMelee,
        WeaponCategory::SimpleRanged,
        WeaponCategory::MartialMelee,
        WeaponCategory::MartialRanged,
    ];

    pub fn id(self) -> &'static str {
        match self {
            WeaponCategory::SimpleMelee => "simple_melee",
            WeaponCategory::SimpleRanged => "simple_ranged",
            WeaponCategory::MartialMelee => "martial_melee",
            WeaponCategory::MartialRanged => "martial_ranged",
        }
    }
}

impl fmt::Display for WeaponCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for WeaponCategory {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&WeaponCategory::ALL, WeaponCategory::id, "weapon category", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorCategory {
    Light,
    Medium,
    Heavy,
}

impl ArmorCategory {
    pub fn id(self) -> &'static str {
        match self {
            ArmorCategory::Light => "light",
            ArmorCategory::Medium => "medium",
            ArmorCategory::Heavy => "heavy",
        }
    }
}

impl fmt::Display for ArmorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Armor training a class has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorTraining {
    Category(ArmorCategory),
    Shields,
}

/// Weapon training: a whole category, or one named weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponTraining {
    Category(WeaponCategory),
    Named(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    Ammunition,
    ArcaneFocus,
    HolySymbol,
    MusicalInstrument,
    Tools,
    SpellScroll,
}

impl SpecialKind {
    pub const ALL: [SpecialKind; 6] = [
        SpecialKind::Ammunition,
        SpecialKind::ArcaneFocus,
        SpecialKind::HolySymbol,
        SpecialKind::MusicalInstrument,
        SpecialKind::Tools,
        SpecialKind::SpellScroll,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SpecialKind::Ammunition => "ammunition",
            SpecialKind::ArcaneFocus => "arcane_focus",
            SpecialKind::HolySymbol => "holy_symbol",
            SpecialKind::MusicalInstrument => "musical_instrument",
            SpecialKind::Tools => "tools",
            SpecialKind::SpellScroll => "spell_scroll",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpecialKind::Ammunition => "Ammunition",
            SpecialKind::ArcaneFocus => "Arcane Focus",
            SpecialKind::HolySymbol => "Holy Symbol",
            SpecialKind::MusicalInstrument => "Musical Instrument",
            SpecialKind::Tools => "Tools",
            SpecialKind::SpellScroll => "Spell Scroll",
        }
    }
}

impl fmt::Display for SpecialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SpecialKind {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&SpecialKind::ALL, SpecialKind::id, "special item category", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellTier {
    Cantrip,
    FirstLevel,
}

impl SpellTier {
    pub fn id(self) -> &'static str {
        match self {
            SpellTier::Cantrip => "cantrip",
            SpellTier::FirstLevel => "first_level",
        }
    }

    /// How many spells of this tier a caster picks at creation.
    pub fn creation_count(self) -> usize {
        match self {
            SpellTier::Cantrip => CREATION_CANTRIPS,
            SpellTier::FirstLevel => CREATION_FIRST_LEVEL_SPELLS,
        }
    }

    pub fn scroll_price_gp(self) -> u64 {
        match self {
            SpellTier::Cantrip => CANTRIP_SCROLL_GP,
            SpellTier::FirstLevel => FIRST_LEVEL_SCROLL_GP,
        }
    }
}

impl fmt::Display for SpellTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpellTier::Cantrip => "cantrip",
            SpellTier::FirstLevel => "first-level spell",
        })
    }
}

impl FromStr for SpellTier {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&[SpellTier::Cantrip, SpellTier::FirstLevel], SpellTier::id, "spell tier", s)
    }
}

/// How a class gets its primary ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAbility {
    Fixed(Ability),
    Choice(&'static [Ability]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassId {
    Cleric,
    Fighter,
    Rogue,
    Wizard,
}

pub struct ClassRules {
    pub hit_die: i32,
    pub features: &'static [&'static str],
    pub primary: PrimaryAbility,
    pub skill_pool: &'static [Skill],
    pub skill_count: usize,
    /// Skills that get doubled proficiency; zero for classes without Expertise.
    pub expertise_count: usize,
    pub starting_gold: u32,
    pub spellcasting: Option<Ability>,
    pub armor: &'static [ArmorTraining],
    pub weapons: &'static [WeaponTraining],
    pub forbidden_special: &'static [SpecialKind],
}

const ALL_WEAPON_CATEGORIES: &[WeaponTraining] = &[
    WeaponTraining::Category(WeaponCategory::SimpleMelee),
    WeaponTraining::Category(WeaponCategory::SimpleRanged),
    WeaponTraining::Category(WeaponCategory::MartialMelee),
    WeaponTraining::Category(WeaponCategory::MartialRanged),
];

const CLERIC: ClassRules = ClassRules {
    hit_die: 8,
    features: &["Spellcasting", "Divine Order"],
    primary: PrimaryAbility::Fixed(Ability::Wis),
    skill_pool: &[
        Skill::History,
        Skill::Insight,
        Skill::Medicine,
        Skill::Persuasion,
        Skill::Religion,
    ],
    skill_count: 2,
    expertise_count: 0,
    starting_gold: 110,
    spellcasting: Some(Ability::Wis),
    armor: &[
        ArmorTraining::Category(ArmorCategory::Light),
        ArmorTraining::Category(ArmorCategory::Medium),
        ArmorTraining::Shields,
    ],
    weapons: &[
        WeaponTraining::Category(WeaponCategory::SimpleMelee),
        WeaponTraining::Category(WeaponCategory::SimpleRanged),
    ],
    forbidden_special: &[SpecialKind::ArcaneFocus],
};

const FIGHTER: ClassRules = ClassRules {
    hit_die: 10,
    features: &["Fighting Style", "Second Wind", "Weapon Mastery"],
    primary: PrimaryAbility::Choice(&[Ability::Str, Ability::Dex]),
    skill_pool: &[
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Athletics,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Perception,
        Skill::Persuasion,
        Skill::Survival,
    ],
    skill_count: 2,
    expertise_count: 0,
    starting_gold: 155,
    spellcasting: None,
    armor: &[
        ArmorTraining::Category(ArmorCategory::Light),
        ArmorTraining::Category(ArmorCategory::Medium),
        ArmorTraining::Category(ArmorCategory::Heavy),
        ArmorTraining::Shields,
    ],
    weapons: ALL_WEAPON_CATEGORIES,
    forbidden_special: &[],
};

const ROGUE: ClassRules = ClassRules {
    hit_die: 8,
    features: &["Expertise", "Sneak Attack", "Thieves' Cant", "Weapon Mastery"],
    primary: PrimaryAbility::Fixed(Ability::Dex),
    skill_pool: &[
        Skill::Acrobatics,
        Skill::Athletics,
        Skill::Deception,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::SleightOfHand,
        Skill::Stealth,
    ],
    skill_count: 4,
    expertise_count: 2,
    starting_gold: 100,
    spellcasting: None,
    armor: &[ArmorTraining::Category(ArmorCategory::Light)],
    weapons: &[
        WeaponTraining::Category(WeaponCategory::SimpleMelee),
        WeaponTraining::Category(WeaponCategory::SimpleRanged),
        WeaponTraining::Named("hand crossbow"),
        WeaponTraining::Named("longsword"),
        WeaponTraining::Named("rapier"),
        WeaponTraining::Named("shortsword"),
    ],
    forbidden_special: &[],
};

const WIZARD: ClassRules = ClassRules {
    hit_die: 6,
    features: &["Spellcasting", "Ritual Adept", "Arcane Recovery"],
    primary: PrimaryAbility::Fixed(Ability::Int),
    skill_pool: &[
        Skill::Arcana,
        Skill::History,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Religion,
    ],
    skill_count: 2,
    expertise_count: 0,
    starting_gold: 55,
    spellcasting: Some(Ability::Int),
    armor: &[],
    weapons: &[
        WeaponTraining::Named("dagger"),
        WeaponTraining::Named("dart"),
        WeaponTraining::Named("sling"),
        WeaponTraining::Named("quarterstaff"),
        WeaponTraining::Named("light crossbow"),
    ],
    forbidden_special: &[SpecialKind::HolySymbol],
};

impl ClassId {
    pub const ALL: [ClassId; 4] = [
        ClassId::Cleric,
        ClassId::Fighter,
        ClassId::Rogue,
        ClassId::Wizard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClassId::Cleric => "Cleric",
            ClassId::Fighter => "Fighter",
            ClassId::Rogue => "Rogue",
            ClassId::Wizard => "Wizard",
        }
    }

    pub fn rules(self) -> &'static ClassRules {
        match self {
            ClassId::Cleric => &CLERIC,
            ClassId::Fighter => &FIGHTER,
            ClassId::Rogue => &ROGUE,
            ClassId::Wizard => &WIZARD,
        }
    }

    pub fn is_spellcaster(self) -> bool {
        self.rules().spellcasting.is_some()
    }

    pub fn has_skill(self, skill: Skill) -> bool {
        self.rules().skill_pool.contains(&skill)
    }

    pub fn armor_proficient(self, category: ArmorCategory) -> bool {
        self.rules()
            .armor
            .contains(&ArmorTraining::Category(category))
    }

    pub fn shield_proficient(self) -> bool {
        self.rules().armor.contains(&ArmorTraining::Shields)
    }

    /// Proficient through the whole category, or through the weapon's name.
    pub fn weapon_proficient(self, category: WeaponCategory, weapon_name: &str) -> bool {
        self.rules().weapons.iter().any(|t| match t {
            WeaponTraining::Category(c) => *c == category,
            WeaponTraining::Named(n) => n.eq_ignore_ascii_case(weapon_name.trim()),
        })
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClassId {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&ClassId::ALL, ClassId::name, "class", s)
    }
}
