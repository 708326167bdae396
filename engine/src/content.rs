//! Built-in catalog content, compiled into the binary.

pub const WEAPONS: &str = include_str!("../content/weapons.json");
pub const ARMOR: &str = include_str!("../content/armor.json");
pub const GEAR: &str = include_str!("../content/gear.json");
pub const SPELLS: &str = include_str!("../content/spells.json");
