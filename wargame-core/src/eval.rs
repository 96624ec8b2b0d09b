//! Position evaluation
//!
//! Three interchangeable scoring strategies of increasing sophistication, all
//! behind the [`Evaluator`] trait so the search never depends on a concrete one:
//! - `material` (e0): unit counts
//! - `health` (e1): health totals
//! - `multi` (e2): material, mobility, engagement and AI threat pressure

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::{GameState, Side};
use crate::units::UnitKind;

/// Upper bound for any heuristic score
pub const MAX_HEURISTIC_SCORE: i32 = 2_000_000_000;
/// Lower bound for any heuristic score
pub const MIN_HEURISTIC_SCORE: i32 = -2_000_000_000;

/// Scores a position from one side's point of view
pub trait Evaluator {
    /// Higher is better for `side`
    fn evaluate(&self, state: &GameState, side: Side) -> i32;

    fn name(&self) -> &'static str;
}

// ============================================================================
// STRATEGY SELECTION
// ============================================================================

/// Named evaluator choice, as found in options files and on the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicKind {
    Material,
    Health,
    #[default]
    Multi,
}

impl HeuristicKind {
    pub fn evaluator(self) -> Box<dyn Evaluator + Send + Sync> {
        match self {
            HeuristicKind::Material => Box::new(MaterialEval),
            HeuristicKind::Health => Box::new(HealthEval),
            HeuristicKind::Multi => Box::new(MultiFactorEval::default()),
        }
    }
}

impl FromStr for HeuristicKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "material" | "e0" => Ok(HeuristicKind::Material),
            "health" | "e1" => Ok(HeuristicKind::Health),
            "multi" | "e2" => Ok(HeuristicKind::Multi),
            other => Err(format!("unknown heuristic: {other} (expected material|health|multi)")),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicKind::Material => write!(f, "material"),
            HeuristicKind::Health => write!(f, "health"),
            HeuristicKind::Multi => write!(f, "multi"),
        }
    }
}

// ============================================================================
// e0 / e1
// ============================================================================

/// e0: 3 per surviving unit, 9999 per AI
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEval;

impl MaterialEval {
    fn side_score(state: &GameState, side: Side) -> i32 {
        state
            .side_units(side)
            .map(|(_, unit)| if unit.is_ai() { 9999 } else { 3 })
            .sum()
    }
}

impl Evaluator for MaterialEval {
    fn evaluate(&self, state: &GameState, side: Side) -> i32 {
        Self::side_score(state, side) - Self::side_score(state, side.opponent())
    }

    fn name(&self) -> &'static str {
        "material"
    }
}

/// e1: 9 per health point, 99 per AI health point
#[derive(Clone, Copy, Debug, Default)]
pub struct HealthEval;

impl HealthEval {
    fn side_score(state: &GameState, side: Side) -> i32 {
        state
            .side_units(side)
            .map(|(_, unit)| {
                let weight = if unit.is_ai() { 99 } else { 9 };
                weight * unit.health as i32
            })
            .sum()
    }
}

impl Evaluator for HealthEval {
    fn evaluate(&self, state: &GameState, side: Side) -> i32 {
        Self::side_score(state, side) - Self::side_score(state, side.opponent())
    }

    fn name(&self) -> &'static str {
        "health"
    }
}

// ============================================================================
// e2
// ============================================================================

/// e2 weights
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiFactorEval {
    /// Bonus while the side's AI survives
    pub ai_alive_bonus: i32,
    /// Weight per health point of Virus and Tech
    pub mobile_health_weight: i32,
    /// Weight per health point of Program and Firewall
    pub static_health_weight: i32,
    /// Weight per legal move
    pub mobility_weight: i32,
    /// Weight per unit adjacent to an enemy
    pub engagement_weight: i32,
    /// Penalty per enemy within distance 1 of the AI
    pub close_threat_penalty: i32,
    /// Penalty per enemy within distance 2 of the AI (distance 1 included)
    pub near_threat_penalty: i32,
}

impl Default for MultiFactorEval {
    fn default() -> Self {
        Self {
            ai_alive_bonus: 1000,
            mobile_health_weight: 2,
            static_health_weight: 1,
            mobility_weight: 1,
            engagement_weight: 1,
            close_threat_penalty: 2,
            near_threat_penalty: 1,
        }
    }
}

impl MultiFactorEval {
    fn material(&self, state: &GameState, side: Side) -> i32 {
        let health: i32 = state
            .side_units(side)
            .map(|(_, unit)| {
                let weight = match unit.kind {
                    UnitKind::AI => 0,
                    UnitKind::Virus | UnitKind::Tech => self.mobile_health_weight,
                    UnitKind::Program | UnitKind::Firewall => self.static_health_weight,
                };
                weight * unit.health as i32
            })
            .sum();
        let ai_bonus = if state.has_ai(side) { self.ai_alive_bonus } else { 0 };
        health + ai_bonus
    }

    fn engagement(&self, state: &GameState, side: Side) -> i32 {
        let engaged = state
            .side_units(side)
            .filter(|&(coord, _)| state.in_combat(coord))
            .count();
        self.engagement_weight * engaged as i32
    }

    fn threat_pressure(&self, state: &GameState, side: Side) -> i32 {
        let Some(ai) = state.ai_position(side) else {
            return 0;
        };
        let enemy = side.opponent();
        let enemies_within = |dist: i8| {
            ai.iter_range(dist)
                .filter_map(|c| state.get(c))
                .filter(|unit| unit.side == enemy)
                .count() as i32
        };
        self.close_threat_penalty * enemies_within(1) + self.near_threat_penalty * enemies_within(2)
    }

    fn aggregate(&self, state: &GameState, side: Side) -> i32 {
        self.material(state, side)
            + self.mobility_weight * state.mobility(side) as i32
            + self.engagement(state, side)
            - self.threat_pressure(state, side)
    }
}

impl Evaluator for MultiFactorEval {
    fn evaluate(&self, state: &GameState, side: Side) -> i32 {
        self.aggregate(state, side) - self.aggregate(state, side.opponent())
    }

    fn name(&self) -> &'static str {
        "multi"
    }
}
