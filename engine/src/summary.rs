//! Read-only view of a finalized build, and a plain-text character sheet.

use std::fmt::Write as _;

use serde::Serialize;

use crate::build::{BuildError, CharacterBuildState, HitPoints, SkillLine, SpellcastingStats};
use crate::catalog::Catalog;
use crate::currency::{format_coins, Coins};
use crate::rules::SpellTier;
use crate::Ability;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityLine {
    pub ability: Ability,
    pub score: i32,
    pub modifier: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellLine {
    pub id: String,
    pub name: String,
    pub concentration: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponLine {
    pub name: String,
    pub damage: String,
    pub damage_type: String,
    pub properties: Vec<String>,
    pub proficient: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterSummary {
    pub name: String,
    pub race: String,
    pub class: String,
    pub speed_ft: u32,
    pub primary_ability: Option<Ability>,
    pub fighting_style: Option<String>,
    pub features: Vec<String>,
    pub hit_points: HitPoints,
    pub armor_class: i32,
    pub initiative: i32,
    pub proficiency_bonus: i32,
    pub abilities: Vec<AbilityLine>,
    pub skills: Vec<SkillLine>,
    pub passive_perception: i32,
    pub spellcasting: Option<SpellcastingStats>,
    pub cantrips: Vec<SpellLine>,
    pub first_level_spells: Vec<SpellLine>,
    pub weapons: Vec<WeaponLine>,
    pub armor: Option<String>,
    pub shield: Option<String>,
    pub gear: Vec<String>,
    pub special: Vec<String>,
    pub funds: Coins,
    pub warnings: Vec<String>,
}

/// Only finalized states have a summary.
pub fn summarize(
    state: &CharacterBuildState,
    catalog: &Catalog,
) -> Result<CharacterSummary, BuildError> {
    let (Some(derived), Some(scores), Some(race), Some(class)) =
        (&state.derived, state.scores, state.race, state.class)
    else {
        return Err(BuildError::NotFinalized);
    };
    if !state.is_finalized() {
        return Err(BuildError::NotFinalized);
    }

    let spells = |tier: SpellTier, ids: &[String]| -> Vec<SpellLine> {
        ids.iter()
            .map(|id| {
                let found = catalog.spell(class, tier, id);
                SpellLine {
                    id: id.clone(),
                    name: found.map_or_else(|| id.clone(), |s| s.name.clone()),
                    concentration: found.is_some_and(|s| s.concentration),
                }
            })
            .collect()
    };

    let equipment = state.equipment.clone().unwrap_or_default();
    Ok(CharacterSummary {
        name: state.name.clone().unwrap_or_default(),
        race: race.to_string(),
        class: class.to_string(),
        speed_ft: derived.speed_ft,
        primary_ability: state.primary_ability,
        fighting_style: state.fighting_style.map(|s| s.to_string()),
        features: class.rules().features.iter().map(|f| f.to_string()).collect(),
        hit_points: derived.hit_points,
        armor_class: derived.armor_class,
        initiative: derived.initiative,
        proficiency_bonus: derived.proficiency_bonus,
        abilities: scores
            .iter()
            .map(|(ability, score)| AbilityLine {
                ability,
                score,
                modifier: scores.mod_of(ability),
            })
            .collect(),
        skills: derived.skills.clone(),
        passive_perception: derived.passive_perception,
        spellcasting: derived.spellcasting.clone(),
        cantrips: spells(SpellTier::Cantrip, &state.cantrips),
        first_level_spells: spells(SpellTier::FirstLevel, &state.first_level_spells),
        weapons: equipment
            .weapons
            .iter()
            .map(|w| WeaponLine {
                name: w.weapon.name.clone(),
                damage: w.weapon.damage.clone(),
                damage_type: w.weapon.damage_type.clone(),
                properties: w.weapon.properties.clone(),
                proficient: w.proficient,
            })
            .collect(),
        armor: equipment.armor.map(|a| a.name),
        shield: equipment.shield.map(|s| s.name),
        gear: equipment.gear.into_iter().map(|g| g.name).collect(),
        special: equipment.special.into_iter().map(|s| s.name).collect(),
        funds: state.funds.unwrap_or_default(),
        warnings: state
            .proficiency_warnings
            .iter()
            .map(|w| w.reason.clone())
            .collect(),
    })
}

fn signed(n: i32) -> String {
    format!("{n:+}")
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Plain-text character sheet.
pub fn render_text(summary: &CharacterSummary) -> String {
    let mut out = String::new();
    let heading = match &summary.fighting_style {
        Some(style) => format!("{} {} ({style})", summary.race, summary.class),
        None => format!("{} {}", summary.race, summary.class),
    };
    let _ = writeln!(out, "{}", summary.name);
    let _ = writeln!(out, "{heading}");
    let _ = writeln!(
        out,
        "HP {}/{}  AC {}  Speed {} ft  Initiative {}  Proficiency {}",
        summary.hit_points.current,
        summary.hit_points.max,
        summary.armor_class,
        summary.speed_ft,
        signed(summary.initiative),
        signed(summary.proficiency_bonus),
    );
    out.push('\n');

    for row in summary.abilities.chunks(3) {
        let cells: Vec<String> = row
            .iter()
            .map(|a| format!("{} {} ({})", a.ability.abbrev(), a.score, signed(a.modifier)))
            .collect();
        let _ = writeln!(out, "{}", cells.join("  "));
    }
    out.push('\n');

    let trained: Vec<String> = summary
        .skills
        .iter()
        .filter(|s| s.proficient || s.expertise)
        .map(|s| {
            let mark = if s.expertise { "*" } else { "" };
            format!("{}{mark} {}", s.skill, signed(s.modifier))
        })
        .collect();
    let _ = writeln!(out, "Skills: {}", list_or_dash(&trained));
    let _ = writeln!(out, "Passive Perception: {}", summary.passive_perception);
    let _ = writeln!(out, "Features: {}", summary.features.join(", "));

    if let Some(casting) = &summary.spellcasting {
        out.push('\n');
        let _ = writeln!(
            out,
            "Spellcasting: {} (save DC {}, attack {})",
            casting.ability,
            casting.save_dc,
            signed(casting.attack_bonus),
        );
        let spell_names = |spells: &[SpellLine]| -> Vec<String> {
            spells
                .iter()
                .map(|s| {
                    if s.concentration {
                        format!("{} (C)", s.name)
                    } else {
                        s.name.clone()
                    }
                })
                .collect()
        };
        let _ = writeln!(out, "Cantrips: {}", list_or_dash(&spell_names(&summary.cantrips)));
        let _ = writeln!(
            out,
            "First-level spells: {}",
            list_or_dash(&spell_names(&summary.first_level_spells))
        );
        if let Some(n) = casting.spells_preparable {
            let _ = writeln!(out, "Spells preparable: {n}");
        }
    }

    out.push('\n');
    let weapons: Vec<String> = summary
        .weapons
        .iter()
        .map(|w| {
            let flag = if w.proficient { "" } else { ", not proficient" };
            format!("{} ({} {}{flag})", w.name, w.damage, w.damage_type)
        })
        .collect();
    let _ = writeln!(out, "Weapons: {}", list_or_dash(&weapons));
    let _ = writeln!(out, "Armor: {}", summary.armor.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Shield: {}", summary.shield.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Gear: {}", list_or_dash(&summary.gear));
    if !summary.special.is_empty() {
        let _ = writeln!(out, "Special: {}", summary.special.join(", "));
    }
    let _ = writeln!(out, "Funds: {}", format_coins(summary.funds));
    for warning in &summary.warnings {
        let _ = writeln!(out, "Warning: {warning}");
    }
    out
}

impl CharacterSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
