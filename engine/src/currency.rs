//! Four-denomination coins and the scalar copper value they convert to.
//!
//! 1 pp = 10 gp = 100 sp = 1000 cp.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const CP_PER_SP: u64 = 10;
pub const CP_PER_GP: u64 = 100;
pub const CP_PER_PP: u64 = 1000;

/// A coin breakdown. Catalog costs are sparse (`{"gp": 2}`), so every
/// denomination defaults to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coins {
    #[serde(default)]
    pub pp: u64,
    #[serde(default)]
    pub gp: u64,
    #[serde(default)]
    pub sp: u64,
    #[serde(default)]
    pub cp: u64,
}

impl Coins {
    pub fn platinum(pp: u64) -> Self {
        Self { pp, ..Self::default() }
    }

    pub fn gold(gp: u64) -> Self {
        Self { gp, ..Self::default() }
    }

    /// Normalized breakdown of a gold amount (e.g. 155 gp -> 15 pp 5 gp).
    pub fn from_gold(gp: u64) -> Self {
        currency_to_coins(gp * CP_PER_GP)
    }

    pub fn to_copper(self) -> u64 {
        coins_to_currency(self)
    }

    pub fn from_copper(total: u64) -> Self {
        currency_to_coins(total)
    }

    /// True when no lower denomination could be exchanged up.
    pub fn is_normalized(&self) -> bool {
        self.gp < 10 && self.sp < 10 && self.cp < 10
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_coins(*self))
    }
}

pub fn coins_to_currency(coins: Coins) -> u64 {
    coins.pp * CP_PER_PP + coins.gp * CP_PER_GP + coins.sp * CP_PER_SP + coins.cp
}

/// Greedy split from platinum down.
pub fn currency_to_coins(total: u64) -> Coins {
    let pp = total / CP_PER_PP;
    let rest = total % CP_PER_PP;
    let gp = rest / CP_PER_GP;
    let rest = rest % CP_PER_GP;
    Coins {
        pp,
        gp,
        sp: rest / CP_PER_SP,
        cp: rest % CP_PER_SP,
    }
}

/// "15 pp, 5 gp"; zero denominations are skipped and an empty purse is "0 cp".
pub fn format_coins(coins: Coins) -> String {
    let parts: Vec<String> = [
        (coins.pp, "pp"),
        (coins.gp, "gp"),
        (coins.sp, "sp"),
        (coins.cp, "cp"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, unit)| format!("{n} {unit}"))
    .collect();
    if parts.is_empty() {
        "0 cp".to_string()
    } else {
        parts.join(", ")
    }
}
