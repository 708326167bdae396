//! Equipment budget resolution: price a requested selection against a
//! starting budget and annotate proficiency mismatches.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::{Armor, Catalog, Shield, Weapon};
use crate::currency::{coins_to_currency, Coins};
use crate::rules::{ClassId, SpecialKind, SpellTier, WeaponCategory};
use crate::stats;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipmentError {
    #[error("purchase costs {} but only {} is available (short {})", coins(.total), coins(.budget), coins(.shortfall))]
    BudgetExceeded {
        total: u64,
        budget: u64,
        shortfall: u64,
    },
    #[error("no {kind} named '{id}' in the catalog")]
    InvalidSelection { kind: &'static str, id: String },
    #[error("{class}s cannot use {item}")]
    ClassRestricted { item: String, class: ClassId },
}

fn coins(cp: &u64) -> Coins {
    Coins::from_copper(*cp)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponRef {
    pub category: WeaponCategory,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SpecialItemRef {
    Catalog { category: SpecialKind, id: String },
    /// A scroll of any spell on the Wizard or Cleric list.
    SpellScroll {
        list: ClassId,
        tier: SpellTier,
        spell: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRequest {
    #[serde(default)]
    pub armor: Option<String>,
    #[serde(default)]
    pub shield: Option<String>,
    #[serde(default)]
    pub weapons: Vec<WeaponRef>,
    /// Adventuring gear ids.
    #[serde(default)]
    pub gear: Vec<String>,
    #[serde(default)]
    pub special: Vec<SpecialItemRef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseAction {
    /// Compute totals without touching the build.
    Preview,
    #[default]
    Purchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Armor,
    Shield,
    Weapon,
}

/// Advisory: the purchase still goes through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencyWarning {
    pub item: String,
    pub kind: ItemKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedWeapon {
    pub category: WeaponCategory,
    pub proficient: bool,
    pub weapon: Weapon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedItem {
    pub id: String,
    pub name: String,
    pub cost: Coins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedSpecial {
    pub kind: SpecialKind,
    pub id: String,
    pub name: String,
    pub cost: Coins,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchasedEquipment {
    pub armor: Option<Armor>,
    pub shield: Option<Shield>,
    pub weapons: Vec<PurchasedWeapon>,
    pub gear: Vec<PurchasedItem>,
    pub special: Vec<PurchasedSpecial>,
}

impl PurchasedEquipment {
    pub fn armor_class(&self, dex_mod: i32) -> i32 {
        stats::armor_class(dex_mod, self.armor.as_ref(), self.shield.as_ref())
    }
}

/// Priced selection. All amounts are copper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub equipment: PurchasedEquipment,
    pub total_cost_cp: u64,
    pub budget_cp: u64,
    /// Negative when the selection is over budget.
    pub remaining_cp: i64,
    pub warnings: Vec<ProficiencyWarning>,
}

impl Resolution {
    pub fn total_cost(&self) -> Coins {
        Coins::from_copper(self.total_cost_cp)
    }

    /// `None` when over budget.
    pub fn remaining(&self) -> Option<Coins> {
        u64::try_from(self.remaining_cp).ok().map(Coins::from_copper)
    }

    pub fn ensure_affordable(&self) -> Result<(), EquipmentError> {
        if self.total_cost_cp > self.budget_cp {
            return Err(EquipmentError::BudgetExceeded {
                total: self.total_cost_cp,
                budget: self.budget_cp,
                shortfall: self.total_cost_cp - self.budget_cp,
            });
        }
        Ok(())
    }
}

/// Price `request` for `class` against `budget_cp`. Unknown ids and class
/// restrictions fail; going over budget does not (see
/// [`Resolution::ensure_affordable`]).
pub fn resolve(
    catalog: &Catalog,
    class: ClassId,
    budget_cp: u64,
    request: &EquipmentRequest,
) -> Result<Resolution, EquipmentError> {
    let mut equipment = PurchasedEquipment::default();
    let mut warnings = Vec::new();
    let mut total: u64 = 0;

    if let Some(name) = &request.armor {
        let armor = catalog
            .find_armor(name)
            .ok_or_else(|| invalid("armor", name))?;
        if !class.armor_proficient(armor.category) {
            warnings.push(ProficiencyWarning {
                item: armor.name.clone(),
                kind: ItemKind::Armor,
                reason: format!("{class}s are not proficient with {} armor", armor.category),
            });
        }
        total += coins_to_currency(armor.cost);
        equipment.armor = Some(armor.clone());
    }

    if let Some(name) = &request.shield {
        let shield = catalog
            .find_shield(name)
            .ok_or_else(|| invalid("shield", name))?;
        if !class.shield_proficient() {
            warnings.push(ProficiencyWarning {
                item: shield.name.clone(),
                kind: ItemKind::Shield,
                reason: format!("{class}s are not proficient with shields"),
            });
        }
        total += coins_to_currency(shield.cost);
        equipment.shield = Some(shield.clone());
    }

    for wanted in &request.weapons {
        let weapon = catalog
            .find_weapon(wanted.category, &wanted.name)
            .ok_or_else(|| invalid("weapon", &format!("{}:{}", wanted.category, wanted.name)))?;
        let proficient = class.weapon_proficient(wanted.category, &weapon.name);
        if !proficient {
            warnings.push(ProficiencyWarning {
                item: weapon.name.clone(),
                kind: ItemKind::Weapon,
                reason: format!("{class}s are not proficient with the {}", weapon.name),
            });
        }
        total += coins_to_currency(weapon.cost);
        equipment.weapons.push(PurchasedWeapon {
            category: wanted.category,
            proficient,
            weapon: weapon.clone(),
        });
    }

    for id in &request.gear {
        let item = catalog.gear(id).ok_or_else(|| invalid("gear", id))?;
        total += coins_to_currency(item.cost);
        equipment.gear.push(PurchasedItem {
            id: id.clone(),
            name: item.name.clone(),
            cost: item.cost,
        });
    }

    for wanted in &request.special {
        let bought = special_item(catalog, class, wanted)?;
        total += coins_to_currency(bought.cost);
        equipment.special.push(bought);
    }

    let remaining = budget_cp as i64 - total as i64;
    debug!(
        class = %class,
        total_cp = total,
        budget_cp,
        remaining_cp = remaining,
        warnings = warnings.len(),
        "resolved equipment selection"
    );

    Ok(Resolution {
        equipment,
        total_cost_cp: total,
        budget_cp,
        remaining_cp: remaining,
        warnings,
    })
}

fn special_item(
    catalog: &Catalog,
    class: ClassId,
    wanted: &SpecialItemRef,
) -> Result<PurchasedSpecial, EquipmentError> {
    match wanted {
        SpecialItemRef::Catalog { category, id } => {
            if class.rules().forbidden_special.contains(category) {
                return Err(EquipmentError::ClassRestricted {
                    item: category.label().to_string(),
                    class,
                });
            }
            // Scrolls are priced by tier, never looked up by id.
            let item = match category {
                SpecialKind::SpellScroll => None,
                _ => catalog.special(*category, id),
            }
            .ok_or_else(|| invalid(category.id(), id))?;
            Ok(PurchasedSpecial {
                kind: *category,
                id: id.clone(),
                name: item.name.clone(),
                cost: item.cost,
            })
        }
        SpecialItemRef::SpellScroll { list, tier, spell } => {
            let found = catalog
                .spell(*list, *tier, spell)
                .ok_or_else(|| invalid("spell scroll", spell))?;
            Ok(PurchasedSpecial {
                kind: SpecialKind::SpellScroll,
                id: found.id.clone(),
                name: format!("Spell Scroll ({})", found.name),
                cost: Coins::gold(tier.scroll_price_gp()),
            })
        }
    }
}

fn invalid(kind: &'static str, id: &str) -> EquipmentError {
    EquipmentError::InvalidSelection {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn named_weapon_training_counts_as_proficient() {
        let request = EquipmentRequest {
            weapons: vec![
                WeaponRef {
                    category: WeaponCategory::MartialMelee,
                    name: "Rapier".into(),
                },
                WeaponRef {
                    category: WeaponCategory::MartialMelee,
                    name: "Greataxe".into(),
                },
            ],
            ..Default::default()
        };
        let res = resolve(&catalog(), ClassId::Rogue, 10_000, &request).unwrap();
        assert!(res.equipment.weapons[0].proficient);
        assert!(!res.equipment.weapons[1].proficient);
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(res.warnings[0].item, "Greataxe");
    }

    #[test]
    fn wizard_in_armor_is_warned_not_rejected() {
        let request = EquipmentRequest {
            armor: Some("Leather".into()),
            shield: Some("Shield".into()),
            ..Default::default()
        };
        let res = resolve(&catalog(), ClassId::Wizard, 5_500, &request).unwrap();
        assert_eq!(res.total_cost_cp, 2_000);
        assert_eq!(res.remaining_cp, 3_500);
        let kinds: Vec<ItemKind> = res.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Armor, ItemKind::Shield]);
        assert_eq!(res.warnings[0].reason, "Wizards are not proficient with light armor");
    }

    #[test]
    fn class_restricted_special_items() {
        let holy = EquipmentRequest {
            special: vec![SpecialItemRef::Catalog {
                category: SpecialKind::HolySymbol,
                id: "amulet".into(),
            }],
            ..Default::default()
        };
        let err = resolve(&catalog(), ClassId::Wizard, 5_500, &holy).unwrap_err();
        assert!(matches!(err, EquipmentError::ClassRestricted { class: ClassId::Wizard, .. }));
        assert!(resolve(&catalog(), ClassId::Cleric, 11_000, &holy).is_ok());

        let focus = EquipmentRequest {
            special: vec![SpecialItemRef::Catalog {
                category: SpecialKind::ArcaneFocus,
                id: "wand".into(),
            }],
            ..Default::default()
        };
        assert!(matches!(
            resolve(&catalog(), ClassId::Cleric, 11_000, &focus),
            Err(EquipmentError::ClassRestricted { .. })
        ));
    }

    #[test]
    fn scrolls_are_priced_by_tier() {
        let request = EquipmentRequest {
            special: vec![
                SpecialItemRef::SpellScroll {
                    list: ClassId::Wizard,
                    tier: SpellTier::Cantrip,
                    spell: "fire_bolt".into(),
                },
                SpecialItemRef::SpellScroll {
                    list: ClassId::Cleric,
                    tier: SpellTier::FirstLevel,
                    spell: "bless".into(),
                },
            ],
            ..Default::default()
        };
        let res = resolve(&catalog(), ClassId::Fighter, 15_500, &request).unwrap();
        assert_eq!(res.total_cost(), Coins::from_gold(80));
        assert_eq!(res.equipment.special[0].name, "Spell Scroll (Fire Bolt)");
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let request = EquipmentRequest {
            gear: vec!["backpack".into(), "jetpack".into()],
            ..Default::default()
        };
        assert_eq!(
            resolve(&catalog(), ClassId::Fighter, 15_500, &request).unwrap_err(),
            EquipmentError::InvalidSelection {
                kind: "gear",
                id: "jetpack".into()
            }
        );
    }

    #[test]
    fn over_budget_reports_shortfall() {
        let request = EquipmentRequest {
            armor: Some("Plate".into()),
            ..Default::default()
        };
        let res = resolve(&catalog(), ClassId::Fighter, 15_500, &request).unwrap();
        assert_eq!(res.remaining_cp, -134_500);
        assert_eq!(res.remaining(), None);
        assert_eq!(
            res.ensure_affordable(),
            Err(EquipmentError::BudgetExceeded {
                total: 150_000,
                budget: 15_500,
                shortfall: 134_500
            })
        );
    }
}
