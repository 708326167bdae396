//! The character build state machine.
//!
//! Every transition takes the current [`CharacterBuildState`] by reference
//! and returns a new one; a failed transition leaves the caller's state as
//! it was. Resubmitting an earlier step is allowed and clears everything
//! owned by later steps.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::BuildConfig;
use crate::currency::Coins;
use crate::equipment::{
    self, EquipmentError, EquipmentRequest, ProficiencyWarning, PurchaseAction,
    PurchasedEquipment, Resolution,
};
use crate::rules::{ClassId, FightingStyle, PrimaryAbility, Race, Skill, SpellTier};
use crate::stats;
use crate::summary::{self, CharacterSummary};
use crate::{Ability, AbilityScores, Dice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    RollAbilities,
    ChooseRace,
    ChooseClass,
    FighterOptions,
    ChooseSkills,
    ChooseExpertise,
    ChooseSpells,
    PurchaseEquipment,
    NameCharacter,
    Finalize,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::RollAbilities => "roll abilities",
            Step::ChooseRace => "choose race",
            Step::ChooseClass => "choose class",
            Step::FighterOptions => "choose fighter options",
            Step::ChooseSkills => "choose skills",
            Step::ChooseExpertise => "choose expertise",
            Step::ChooseSpells => "choose spells",
            Step::PurchaseEquipment => "purchase equipment",
            Step::NameCharacter => "name character",
            Step::Finalize => "finalize",
        }
    }

    /// Stage reached once this step succeeds.
    pub fn completes(self) -> BuildStage {
        match self {
            Step::RollAbilities => BuildStage::AbilitiesRolled,
            Step::ChooseRace => BuildStage::RaceChosen,
            Step::ChooseClass => BuildStage::ClassChosen,
            Step::FighterOptions => BuildStage::FighterOptionsChosen,
            Step::ChooseSkills => BuildStage::SkillsChosen,
            Step::ChooseExpertise => BuildStage::ExpertiseChosen,
            Step::ChooseSpells => BuildStage::SpellsChosen,
            Step::PurchaseEquipment => BuildStage::EquipmentPurchased,
            Step::NameCharacter => BuildStage::Named,
            Step::Finalize => BuildStage::Finalized,
        }
    }

    /// Ordered steps for a class. Before a class is chosen only the common
    /// prefix is known.
    pub fn path(class: Option<ClassId>) -> Vec<Step> {
        let mut steps = vec![Step::RollAbilities, Step::ChooseRace, Step::ChooseClass];
        let Some(class) = class else {
            return steps;
        };
        if class == ClassId::Fighter {
            steps.push(Step::FighterOptions);
        } else {
            steps.push(Step::ChooseSkills);
            if class.rules().expertise_count > 0 {
                steps.push(Step::ChooseExpertise);
            }
            if class.is_spellcaster() {
                steps.push(Step::ChooseSpells);
            }
        }
        steps.extend([Step::PurchaseEquipment, Step::NameCharacter, Step::Finalize]);
        steps
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
    #[default]
    New,
    AbilitiesRolled,
    RaceChosen,
    ClassChosen,
    FighterOptionsChosen,
    SkillsChosen,
    ExpertiseChosen,
    SpellsChosen,
    EquipmentPurchased,
    Named,
    Finalized,
}

impl BuildStage {
    pub fn completed_step(self) -> Option<Step> {
        match self {
            BuildStage::New => None,
            BuildStage::AbilitiesRolled => Some(Step::RollAbilities),
            BuildStage::RaceChosen => Some(Step::ChooseRace),
            BuildStage::ClassChosen => Some(Step::ChooseClass),
            BuildStage::FighterOptionsChosen => Some(Step::FighterOptions),
            BuildStage::SkillsChosen => Some(Step::ChooseSkills),
            BuildStage::ExpertiseChosen => Some(Step::ChooseExpertise),
            BuildStage::SpellsChosen => Some(Step::ChooseSpells),
            BuildStage::EquipmentPurchased => Some(Step::PurchaseEquipment),
            BuildStage::Named => Some(Step::NameCharacter),
            BuildStage::Finalized => Some(Step::Finalize),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input for the current step; re-prompt it.
    Validation,
    /// A prerequisite step is missing; redirect to it.
    Sequencing,
    /// The selection costs more than the budget.
    Budget,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Sequencing => "sequencing",
            ErrorKind::Budget => "budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("missing ability score: {0}")]
    MissingAbility(String),
    #[error("{ability} score {score} is outside 3..=18")]
    AbilityOutOfRange { ability: Ability, score: i32 },
    #[error("unknown race '{0}'")]
    InvalidRace(String),
    #[error("unknown class '{0}'")]
    InvalidClass(String),
    #[error("{class} requires a primary ability choice")]
    MissingPrimaryAbility { class: ClassId },
    #[error("'{ability}' is not a primary ability option for {class}")]
    InvalidPrimaryAbility { class: ClassId, ability: String },
    #[error("a fighting style must be chosen")]
    MissingFightingStyle,
    #[error("unknown fighting style '{0}'")]
    InvalidFightingStyle(String),
    #[error("Fighters choose exactly {expected} skills, got {got}")]
    InvalidSkillCount { expected: usize, got: usize },
    #[error("{class}s choose exactly {expected} skills, got {got}")]
    WrongSkillCount {
        class: ClassId,
        expected: usize,
        got: usize,
    },
    #[error("'{skill}' is not a {class} skill choice")]
    InvalidSkill { class: ClassId, skill: String },
    #[error("'{0}' was selected more than once")]
    DuplicateSelection(String),
    #[error("invalid expertise: {0}")]
    InvalidExpertise(String),
    #[error("expected {expected} {tier}s, got {got}")]
    WrongSpellCount {
        tier: SpellTier,
        expected: usize,
        got: usize,
    },
    #[error("'{id}' is not a {class} {tier}")]
    UnknownSpell {
        class: ClassId,
        tier: SpellTier,
        id: String,
    },
    #[error("character name must not be empty")]
    EmptyName,
    #[error("cannot {attempted} yet; next step is {expected}")]
    OutOfOrder { attempted: Step, expected: Step },
    #[error("{step} does not apply to a {class}")]
    StepNotApplicable { step: Step, class: ClassId },
    #[error("the character has not been finalized")]
    NotFinalized,
    #[error(transparent)]
    Equipment(#[from] EquipmentError),
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::OutOfOrder { .. }
            | BuildError::StepNotApplicable { .. }
            | BuildError::NotFinalized => ErrorKind::Sequencing,
            BuildError::Equipment(EquipmentError::BudgetExceeded { .. }) => ErrorKind::Budget,
            _ => ErrorKind::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub max: i32,
    pub current: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLine {
    pub skill: Skill,
    pub ability: Ability,
    pub proficient: bool,
    pub expertise: bool,
    pub modifier: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellcastingStats {
    pub ability: Ability,
    pub modifier: i32,
    pub save_dc: i32,
    pub attack_bonus: i32,
    /// Clerics prepare from their whole list; Wizards use their spellbook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spells_preparable: Option<i32>,
}

/// Numbers computed by the finalize pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub proficiency_bonus: i32,
    pub ability_modifiers: IndexMap<Ability, i32>,
    pub skills: Vec<SkillLine>,
    pub passive_perception: i32,
    pub initiative: i32,
    pub spellcasting: Option<SpellcastingStats>,
    pub armor_class: i32,
    pub hit_points: HitPoints,
    pub speed_ft: u32,
}

/// Everything chosen so far. Persisted whole by the caller between steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBuildState {
    pub stage: BuildStage,
    pub base_scores: Option<AbilityScores>,
    pub race: Option<Race>,
    /// Base scores plus racial bonuses.
    pub scores: Option<AbilityScores>,
    pub constitution_modifier: Option<i32>,
    pub class: Option<ClassId>,
    pub primary_ability: Option<Ability>,
    pub fighting_style: Option<FightingStyle>,
    pub skills: BTreeSet<Skill>,
    pub expertise: BTreeSet<Skill>,
    pub cantrips: Vec<String>,
    pub first_level_spells: Vec<String>,
    pub hit_points: Option<HitPoints>,
    pub starting_funds: Option<Coins>,
    pub funds: Option<Coins>,
    pub equipment: Option<PurchasedEquipment>,
    pub proficiency_warnings: Vec<ProficiencyWarning>,
    pub armor_class: Option<i32>,
    pub name: Option<String>,
    pub derived: Option<DerivedStats>,
}

impl CharacterBuildState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finalized(&self) -> bool {
        self.stage == BuildStage::Finalized && self.derived.is_some()
    }

    /// `None` once finalized.
    pub fn next_step(&self) -> Option<Step> {
        let Some(done) = self.stage.completed_step() else {
            return Some(Step::RollAbilities);
        };
        let path = Step::path(self.class);
        match path.iter().position(|s| *s == done) {
            Some(i) => path.get(i + 1).copied(),
            // Stage and class disagree; start over.
            None => Some(Step::RollAbilities),
        }
    }

    /// Completed steps may be resubmitted; otherwise only the next step is
    /// accepted.
    pub fn ensure_reachable(&self, step: Step) -> Result<(), BuildError> {
        let path = Step::path(self.class);
        let next = self.next_step();
        let Some(pos) = path.iter().position(|s| *s == step) else {
            return Err(match self.class {
                Some(class) => BuildError::StepNotApplicable { step, class },
                None => BuildError::OutOfOrder {
                    attempted: step,
                    expected: next.unwrap_or(Step::RollAbilities),
                },
            });
        };
        if let Some(next) = next {
            let next_pos = path.iter().position(|s| *s == next).unwrap_or(0);
            if pos > next_pos {
                return Err(BuildError::OutOfOrder {
                    attempted: step,
                    expected: next,
                });
            }
        }
        Ok(())
    }

    /// Drop everything owned by steps after `step`.
    fn clear_after(&mut self, step: Step) {
        if step < Step::ChooseRace {
            self.race = None;
            self.scores = None;
            self.constitution_modifier = None;
        }
        if step < Step::ChooseClass {
            self.class = None;
            self.primary_ability = None;
            self.hit_points = None;
            self.starting_funds = None;
        }
        if step < Step::FighterOptions {
            self.fighting_style = None;
            self.skills.clear();
        }
        if step < Step::ChooseExpertise {
            self.expertise.clear();
        }
        if step < Step::ChooseSpells {
            self.cantrips.clear();
            self.first_level_spells.clear();
        }
        if step < Step::PurchaseEquipment {
            self.equipment = None;
            self.proficiency_warnings.clear();
            self.armor_class = None;
            self.funds = self.starting_funds;
        }
        if step < Step::NameCharacter {
            self.name = None;
        }
        if step < Step::Finalize {
            self.derived = None;
        }
    }

    fn modifier(&self, ability: Ability) -> Option<i32> {
        self.scores.map(|s| s.mod_of(ability))
    }
}

/// Result of the equipment step. On preview `state` is the input state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentOutcome {
    pub state: CharacterBuildState,
    pub resolution: Resolution,
    pub armor_class: i32,
}

/// One step's input, as submitted by a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepInput {
    RollAbilities {
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Scores entered by hand instead of rolled; keys are ability names or
    /// abbreviations.
    SetAbilities { scores: IndexMap<String, i32> },
    ChooseRace { race: String },
    ChooseClass {
        class: String,
        #[serde(default)]
        primary_ability: Option<String>,
    },
    FighterOptions {
        #[serde(default)]
        fighting_style: Option<String>,
        skills: Vec<String>,
    },
    ChooseSkills { skills: Vec<String> },
    ChooseExpertise { skills: Vec<String> },
    ChooseSpells {
        cantrips: Vec<String>,
        first_level: Vec<String>,
    },
    PurchaseEquipment {
        request: EquipmentRequest,
        #[serde(default)]
        action: PurchaseAction,
    },
    NameCharacter { name: String },
    Finalize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub state: CharacterBuildState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl From<CharacterBuildState> for StepOutcome {
    fn from(state: CharacterBuildState) -> Self {
        Self {
            state,
            resolution: None,
        }
    }
}

/// Runs transitions against a catalog and table configuration.
pub struct Builder {
    catalog: Catalog,
    config: BuildConfig,
}

impl Builder {
    /// Uses the configured catalog file, or the built-in catalog.
    pub fn new(config: BuildConfig) -> anyhow::Result<Self> {
        let catalog = config.catalog()?;
        Ok(Self { catalog, config })
    }

    pub fn with_catalog(catalog: Catalog, config: BuildConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    fn begin(
        &self,
        state: &CharacterBuildState,
        step: Step,
    ) -> Result<CharacterBuildState, BuildError> {
        state.ensure_reachable(step)?;
        let mut next = state.clone();
        next.clear_after(step);
        Ok(next)
    }

    pub fn roll_abilities(
        &self,
        state: &CharacterBuildState,
        dice: &mut Dice,
    ) -> Result<CharacterBuildState, BuildError> {
        let scores = AbilityScores::roll(dice);
        self.set_abilities(state, scores)
    }

    /// Completes the roll step with scores supplied by the caller.
    pub fn set_abilities(
        &self,
        state: &CharacterBuildState,
        scores: AbilityScores,
    ) -> Result<CharacterBuildState, BuildError> {
        if let Some((ability, score)) = scores.iter().find(|(_, s)| !(3..=18).contains(s)) {
            return Err(BuildError::AbilityOutOfRange { ability, score });
        }
        let mut next = self.begin(state, Step::RollAbilities)?;
        next.base_scores = Some(scores);
        next.stage = Step::RollAbilities.completes();
        debug!(?scores, "ability scores set");
        Ok(next)
    }

    pub fn choose_race(
        &self,
        state: &CharacterBuildState,
        race: &str,
    ) -> Result<CharacterBuildState, BuildError> {
        let mut next = self.begin(state, Step::ChooseRace)?;
        let race: Race = race
            .parse()
            .map_err(|_| BuildError::InvalidRace(race.trim().to_string()))?;
        let base = require(next.base_scores, Step::ChooseRace, Step::RollAbilities)?;
        let scores = stats::apply_racial_bonus(base, race);
        next.race = Some(race);
        next.scores = Some(scores);
        next.constitution_modifier = Some(scores.mod_of(Ability::Con));
        next.stage = Step::ChooseRace.completes();
        debug!(race = %race, "race chosen");
        Ok(next)
    }

    /// `primary` is required for Fighters and ignored when it matches a
    /// class's fixed primary ability.
    pub fn choose_class(
        &self,
        state: &CharacterBuildState,
        class: &str,
        primary: Option<&str>,
    ) -> Result<CharacterBuildState, BuildError> {
        let mut next = self.begin(state, Step::ChooseClass)?;
        let class: ClassId = class
            .parse()
            .map_err(|_| BuildError::InvalidClass(class.trim().to_string()))?;
        let primary = match (class.rules().primary, primary) {
            (PrimaryAbility::Choice(_), None) => {
                return Err(BuildError::MissingPrimaryAbility { class });
            }
            (PrimaryAbility::Choice(options), Some(raw)) => raw
                .parse::<Ability>()
                .ok()
                .filter(|a| options.contains(a))
                .ok_or_else(|| invalid_primary(class, raw))?,
            (PrimaryAbility::Fixed(fixed), None) => fixed,
            (PrimaryAbility::Fixed(fixed), Some(raw)) => match raw.parse::<Ability>() {
                Ok(a) if a == fixed => fixed,
                _ => return Err(invalid_primary(class, raw)),
            },
        };

        let con_mod = require(next.constitution_modifier, Step::ChooseClass, Step::ChooseRace)?;
        let max = stats::max_hp(class.rules().hit_die, con_mod);
        let funds = Coins::from_gold(u64::from(self.config.starting_gold_for(class)));
        next.class = Some(class);
        next.primary_ability = Some(primary);
        next.hit_points = Some(HitPoints { max, current: max });
        next.starting_funds = Some(funds);
        next.funds = Some(funds);
        next.stage = Step::ChooseClass.completes();
        debug!(class = %class, primary = %primary, max_hp = max, "class chosen");
        Ok(next)
    }

    pub fn fighter_options<S: AsRef<str>>(
        &self,
        state: &CharacterBuildState,
        fighting_style: Option<&str>,
        skills: &[S],
    ) -> Result<CharacterBuildState, BuildError> {
        let mut next = self.begin(state, Step::FighterOptions)?;
        let expected = ClassId::Fighter.rules().skill_count;
        if skills.len() != expected {
            return Err(BuildError::InvalidSkillCount {
                expected,
                got: skills.len(),
            });
        }
        let raw_style = fighting_style
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(BuildError::MissingFightingStyle)?;
        let style: FightingStyle = raw_style
            .parse()
            .map_err(|_| BuildError::InvalidFightingStyle(raw_style.to_string()))?;
        let chosen = parse_skills(ClassId::Fighter, skills)?;

        next.fighting_style = Some(style);
        next.skills = chosen;
        next.stage = Step::FighterOptions.completes();
        debug!(style = %style, skills = ?next.skills, "fighter options chosen");
        Ok(next)
    }

    pub fn choose_skills<S: AsRef<str>>(
        &self,
        state: &CharacterBuildState,
        skills: &[S],
    ) -> Result<CharacterBuildState, BuildError> {
        let mut next = self.begin(state, Step::ChooseSkills)?;
        let class = require(next.class, Step::ChooseSkills, Step::ChooseClass)?;
        let expected = class.rules().skill_count;
        if skills.len() != expected {
            return Err(BuildError::WrongSkillCount {
                class,
                expected,
                got: skills.len(),
            });
        }
        next.skills = parse_skills(class, skills)?;
        next.stage = Step::ChooseSkills.completes();
        debug!(class = %class, skills = ?next.skills, "skills chosen");
        Ok(next)
    }

    pub fn choose_expertise<S: AsRef<str>>(
        &self,
        state: &CharacterBuildState,
        skills: &[S],
    ) -> Result<CharacterBuildState, BuildError> {
        let mut next = self.begin(state, Step::ChooseExpertise)?;
        let class = require(next.class, Step::ChooseExpertise, Step::ChooseClass)?;
        let expected = class.rules().expertise_count;
        if skills.len() != expected {
            return Err(BuildError::InvalidExpertise(format!(
                "choose exactly {expected} skills, got {}",
                skills.len()
            )));
        }
        let mut chosen = BTreeSet::new();
        for raw in skills {
            let raw = raw.as_ref();
            let skill: Skill = raw
                .parse()
                .map_err(|_| BuildError::InvalidExpertise(format!("unknown skill '{}'", raw.trim())))?;
            if !next.skills.contains(&skill) {
                return Err(BuildError::InvalidExpertise(format!(
                    "{skill} is not one of the chosen skills"
                )));
            }
            if !chosen.insert(skill) {
                return Err(BuildError::DuplicateSelection(skill.to_string()));
            }
        }
        next.expertise = chosen;
        next.stage = Step::ChooseExpertise.completes();
        debug!(expertise = ?next.expertise, "expertise chosen");
        Ok(next)
    }

    pub fn choose_spells<S: AsRef<str>>(
        &self,
        state: &CharacterBuildState,
        cantrips: &[S],
        first_level: &[S],
    ) -> Result<CharacterBuildState, BuildError> {
        let mut next = self.begin(state, Step::ChooseSpells)?;
        let class = require(next.class, Step::ChooseSpells, Step::ChooseClass)?;
        for (tier, picked) in [(SpellTier::Cantrip, cantrips), (SpellTier::FirstLevel, first_level)] {
            let expected = tier.creation_count();
            if picked.len() != expected {
                return Err(BuildError::WrongSpellCount {
                    tier,
                    expected,
                    got: picked.len(),
                });
            }
        }
        next.cantrips = self.validate_spells(class, SpellTier::Cantrip, cantrips)?;
        next.first_level_spells = self.validate_spells(class, SpellTier::FirstLevel, first_level)?;
        next.stage = Step::ChooseSpells.completes();
        debug!(class = %class, cantrips = ?next.cantrips, first_level = ?next.first_level_spells, "spells chosen");
        Ok(next)
    }

    fn validate_spells<S: AsRef<str>>(
        &self,
        class: ClassId,
        tier: SpellTier,
        picked: &[S],
    ) -> Result<Vec<String>, BuildError> {
        let mut ids: Vec<String> = Vec::with_capacity(picked.len());
        for raw in picked {
            let id = raw.as_ref().trim();
            if self.catalog.spell(class, tier, id).is_none() {
                return Err(BuildError::UnknownSpell {
                    class,
                    tier,
                    id: id.to_string(),
                });
            }
            if ids.iter().any(|seen| seen == id) {
                return Err(BuildError::DuplicateSelection(id.to_string()));
            }
            ids.push(id.to_string());
        }
        Ok(ids)
    }

    /// Price `request` against the class budget. `Preview` never changes the
    /// state; `Purchase` commits only when the selection is affordable.
    pub fn purchase_equipment(
        &self,
        state: &CharacterBuildState,
        request: &EquipmentRequest,
        action: PurchaseAction,
    ) -> Result<EquipmentOutcome, BuildError> {
        state.ensure_reachable(Step::PurchaseEquipment)?;
        let class = require(state.class, Step::PurchaseEquipment, Step::ChooseClass)?;
        let budget = require(state.starting_funds, Step::PurchaseEquipment, Step::ChooseClass)?;
        let dex_mod = require(state.modifier(Ability::Dex), Step::PurchaseEquipment, Step::ChooseRace)?;

        let resolution = equipment::resolve(&self.catalog, class, budget.to_copper(), request)?;
        let armor_class = resolution.equipment.armor_class(dex_mod);

        if action == PurchaseAction::Preview {
            return Ok(EquipmentOutcome {
                state: state.clone(),
                resolution,
                armor_class,
            });
        }

        resolution.ensure_affordable()?;
        let mut next = self.begin(state, Step::PurchaseEquipment)?;
        next.funds = resolution.remaining();
        next.equipment = Some(resolution.equipment.clone());
        next.proficiency_warnings = resolution.warnings.clone();
        next.armor_class = Some(armor_class);
        next.stage = Step::PurchaseEquipment.completes();
        debug!(
            total_cp = resolution.total_cost_cp,
            remaining_cp = resolution.remaining_cp,
            armor_class,
            "equipment purchased"
        );
        Ok(EquipmentOutcome {
            state: next,
            resolution,
            armor_class,
        })
    }

    pub fn name_character(
        &self,
        state: &CharacterBuildState,
        name: &str,
    ) -> Result<CharacterBuildState, BuildError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BuildError::EmptyName);
        }
        let mut next = self.begin(state, Step::NameCharacter)?;
        next.name = Some(name.to_string());
        next.stage = Step::NameCharacter.completes();
        debug!(name, "character named");
        Ok(next)
    }

    /// Compute every derived number. Safe to re-run on a finalized state.
    pub fn finalize(&self, state: &CharacterBuildState) -> Result<CharacterBuildState, BuildError> {
        let mut next = self.begin(state, Step::Finalize)?;
        let scores = require(next.scores, Step::Finalize, Step::ChooseRace)?;
        let race = require(next.race, Step::Finalize, Step::ChooseRace)?;
        let class = require(next.class, Step::Finalize, Step::ChooseClass)?;
        let hit_points = require(next.hit_points, Step::Finalize, Step::ChooseClass)?;
        let prof = self.config.proficiency_bonus;

        let dex_mod = scores.mod_of(Ability::Dex);
        let armor_class = next
            .equipment
            .as_ref()
            .map_or(stats::armor_class(dex_mod, None, None), |e| e.armor_class(dex_mod));

        let skills: Vec<SkillLine> = Skill::ALL
            .into_iter()
            .map(|skill| {
                let ability = skill.ability();
                let proficient = next.skills.contains(&skill);
                let expertise = next.expertise.contains(&skill);
                SkillLine {
                    skill,
                    ability,
                    proficient,
                    expertise,
                    modifier: stats::skill_modifier(scores.mod_of(ability), proficient, expertise, prof),
                }
            })
            .collect();

        let spellcasting = class.rules().spellcasting.map(|ability| {
            let modifier = scores.mod_of(ability);
            SpellcastingStats {
                ability,
                modifier,
                save_dc: stats::spell_save_dc(modifier, prof),
                attack_bonus: stats::spell_attack_bonus(modifier, prof),
                spells_preparable: (class == ClassId::Cleric).then(|| (modifier + 1).max(1)),
            }
        });

        let derived = DerivedStats {
            proficiency_bonus: prof,
            ability_modifiers: scores.iter().map(|(a, s)| (a, stats::ability_modifier(s))).collect(),
            passive_perception: stats::passive_perception(
                scores.mod_of(Ability::Wis),
                next.skills.contains(&Skill::Perception),
                prof,
            ),
            skills,
            initiative: dex_mod,
            spellcasting,
            armor_class,
            hit_points,
            speed_ft: race.speed_ft(),
        };

        next.armor_class = Some(armor_class);
        next.derived = Some(derived);
        next.stage = Step::Finalize.completes();
        info!(
            name = next.name.as_deref().unwrap_or_default(),
            class = %class,
            race = %race,
            armor_class,
            max_hp = hit_points.max,
            "character finalized"
        );
        Ok(next)
    }

    /// Dispatch a serialized step. A roll without a seed draws one from the
    /// thread RNG.
    pub fn apply(
        &self,
        state: &CharacterBuildState,
        input: &StepInput,
    ) -> Result<StepOutcome, BuildError> {
        let state = match input {
            StepInput::RollAbilities { seed } => {
                let mut dice = Dice::from_seed(seed.unwrap_or_else(rand::random));
                self.roll_abilities(state, &mut dice)?
            }
            StepInput::SetAbilities { scores } => {
                self.set_abilities(state, AbilityScores::try_from_map(scores)?)?
            }
            StepInput::ChooseRace { race } => self.choose_race(state, race)?,
            StepInput::ChooseClass {
                class,
                primary_ability,
            } => self.choose_class(state, class, primary_ability.as_deref())?,
            StepInput::FighterOptions {
                fighting_style,
                skills,
            } => self.fighter_options(state, fighting_style.as_deref(), skills)?,
            StepInput::ChooseSkills { skills } => self.choose_skills(state, skills)?,
            StepInput::ChooseExpertise { skills } => self.choose_expertise(state, skills)?,
            StepInput::ChooseSpells {
                cantrips,
                first_level,
            } => self.choose_spells(state, cantrips, first_level)?,
            StepInput::PurchaseEquipment { request, action } => {
                let outcome = self.purchase_equipment(state, request, *action)?;
                return Ok(StepOutcome {
                    state: outcome.state,
                    resolution: Some(outcome.resolution),
                });
            }
            StepInput::NameCharacter { name } => self.name_character(state, name)?,
            StepInput::Finalize => self.finalize(state)?,
        };
        Ok(state.into())
    }

    pub fn summary(&self, state: &CharacterBuildState) -> Result<CharacterSummary, BuildError> {
        summary::summarize(state, &self.catalog)
    }
}

/// A field a completed earlier step should have filled. Missing means the
/// persisted state skipped that step.
fn require<T>(value: Option<T>, attempted: Step, owner: Step) -> Result<T, BuildError> {
    value.ok_or(BuildError::OutOfOrder {
        attempted,
        expected: owner,
    })
}

fn invalid_primary(class: ClassId, raw: &str) -> BuildError {
    BuildError::InvalidPrimaryAbility {
        class,
        ability: raw.trim().to_string(),
    }
}

fn parse_skills<S: AsRef<str>>(class: ClassId, raw: &[S]) -> Result<BTreeSet<Skill>, BuildError> {
    let mut chosen = BTreeSet::new();
    for raw in raw {
        let raw = raw.as_ref();
        let skill = raw
            .parse::<Skill>()
            .ok()
            .filter(|s| class.has_skill(*s))
            .ok_or_else(|| BuildError::InvalidSkill {
                class,
                skill: raw.trim().to_string(),
            })?;
        if !chosen.insert(skill) {
            return Err(BuildError::DuplicateSelection(skill.to_string()));
        }
    }
    Ok(chosen)
}
