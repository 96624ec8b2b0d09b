//! Unit kinds, damage/repair tables and unit health

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::Side;

/// Maximum (and starting) unit health
pub const MAX_HEALTH: u8 = 9;

/// Unit kind (index into the damage and repair tables)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    AI = 0,
    Tech = 1,
    Virus = 2,
    Program = 3,
    Firewall = 4,
}

impl UnitKind {
    pub const ALL: [UnitKind; 5] = [
        UnitKind::AI,
        UnitKind::Tech,
        UnitKind::Virus,
        UnitKind::Program,
        UnitKind::Firewall,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Single-letter tag used in board renders
    pub fn initial(self) -> char {
        match self {
            UnitKind::AI => 'A',
            UnitKind::Tech => 'T',
            UnitKind::Virus => 'V',
            UnitKind::Program => 'P',
            UnitKind::Firewall => 'F',
        }
    }

    /// Tech and Virus may step in any direction and ignore engagement
    pub fn is_free_moving(self) -> bool {
        matches!(self, UnitKind::Tech | UnitKind::Virus)
    }
}

/// Damage dealt, indexed by [attacker kind][target kind]
pub static DAMAGE_TABLE: [[u8; 5]; 5] = [
    [3, 3, 3, 3, 1], // AI
    [1, 1, 6, 1, 1], // Tech
    [9, 6, 1, 6, 1], // Virus
    [3, 3, 3, 3, 1], // Program
    [1, 1, 1, 1, 1], // Firewall
];

/// Health restored, indexed by [healer kind][target kind]
pub static REPAIR_TABLE: [[u8; 5]; 5] = [
    [0, 1, 1, 0, 0], // AI
    [3, 0, 0, 3, 3], // Tech
    [0, 0, 0, 0, 0], // Virus
    [0, 0, 0, 0, 0], // Program
    [0, 0, 0, 0, 0], // Firewall
];

/// Raw table damage
pub fn damage(attacker: UnitKind, target: UnitKind) -> u8 {
    DAMAGE_TABLE[attacker.index()][target.index()]
}

/// Raw table repair
pub fn repair(healer: UnitKind, target: UnitKind) -> u8 {
    REPAIR_TABLE[healer.index()][target.index()]
}

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub side: Side,
    pub kind: UnitKind,
    pub health: u8,
}

impl Unit {
    /// Full-health unit
    pub const fn new(side: Side, kind: UnitKind) -> Self {
        Self {
            side,
            kind,
            health: MAX_HEALTH,
        }
    }

    pub fn with_health(side: Side, kind: UnitKind, health: u8) -> Self {
        Self {
            side,
            kind,
            health: health.min(MAX_HEALTH),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_ai(&self) -> bool {
        self.kind == UnitKind::AI
    }

    /// Damage this unit would inflict on `target`, never more than the target has left
    pub fn damage_amount(&self, target: &Unit) -> u8 {
        damage(self.kind, target.kind).min(target.health)
    }

    /// Repair this unit would give `target`, never past full health
    pub fn repair_amount(&self, target: &Unit) -> u8 {
        repair(self.kind, target.kind).min(MAX_HEALTH - target.health)
    }

    /// Lose health, saturating at 0
    pub fn apply_damage(&mut self, amount: u8) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Gain health, capped at MAX_HEALTH
    pub fn apply_repair(&mut self, amount: u8) {
        self.health = self.health.saturating_add(amount).min(MAX_HEALTH);
    }
}

impl fmt::Display for Unit {
    /// e.g. "dA9" for a full-health defender AI
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.side.initial(), self.kind.initial(), self.health)
    }
}
