//! Game options - board size, turn limit, players and search settings

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};

use crate::ai::{AlphaBetaAI, SearchConfig};
use crate::board::{DEFAULT_DIM, MAX_DIM};
use crate::eval::HeuristicKind;
use crate::game::{GameState, Side, DEFAULT_MAX_TURNS};

/// Smallest board the standard layout fits on without overlapping
pub const MIN_DIM: u8 = 4;

/// Which sides are played by a human (stdin or broker) and which by the computer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    /// Both sides human
    #[default]
    #[serde(rename = "manual")]
    Manual,
    /// Human attacker, computer defender
    #[serde(rename = "attacker")]
    AttackerVsComp,
    /// Computer attacker, human defender
    #[serde(rename = "defender")]
    CompVsDefender,
    /// Computer on both sides
    #[serde(rename = "auto")]
    CompVsComp,
}

impl GameType {
    pub fn is_human(self, side: Side) -> bool {
        match self {
            GameType::Manual => true,
            GameType::AttackerVsComp => side == Side::Attacker,
            GameType::CompVsDefender => side == Side::Defender,
            GameType::CompVsComp => false,
        }
    }

    pub fn is_computer(self, side: Side) -> bool {
        !self.is_human(side)
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(GameType::Manual),
            "attacker" => Ok(GameType::AttackerVsComp),
            "defender" => Ok(GameType::CompVsDefender),
            "auto" => Ok(GameType::CompVsComp),
            other => Err(format!(
                "unknown game type: {other} (expected manual|attacker|defender|auto)"
            )),
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameType::Manual => "manual",
            GameType::AttackerVsComp => "attacker",
            GameType::CompVsDefender => "defender",
            GameType::CompVsComp => "auto",
        };
        f.write_str(name)
    }
}

/// Everything needed to set up and run a game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub dim: u8,
    pub max_turns: Option<u32>,
    pub game_type: GameType,
    pub search: SearchConfig,
    pub heuristic: HeuristicKind,
    /// Base URL of the move relay broker
    pub broker: Option<String>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            max_turns: Some(DEFAULT_MAX_TURNS),
            game_type: GameType::default(),
            search: SearchConfig::default(),
            heuristic: HeuristicKind::default(),
            broker: None,
        }
    }
}

impl GameOptions {
    /// Load and validate options from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        let options: GameOptions = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse options file {}", path.display()))?;
        options.validate()?;
        Ok(options)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write options file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(MIN_DIM..=MAX_DIM).contains(&self.dim) {
            bail!("board dimension {} out of range {MIN_DIM}..={MAX_DIM}", self.dim);
        }
        ensure!(
            self.search.min_depth <= self.search.max_depth,
            "min depth {} exceeds max depth {}",
            self.search.min_depth,
            self.search.max_depth
        );
        ensure!(
            self.search.max_time_secs > 0.0 && self.search.max_time_secs.is_finite(),
            "max time must be positive and finite, got {}",
            self.search.max_time_secs
        );
        Ok(())
    }

    /// Fresh game with the standard layout
    pub fn new_game(&self) -> GameState {
        GameState::new(self.dim, self.max_turns)
    }

    /// Computer player configured from these options
    pub fn computer_player(&self) -> AlphaBetaAI {
        AlphaBetaAI::new(self.search.clone(), self.heuristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wargame-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let options = GameOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.dim, 5);
        assert_eq!(options.max_turns, Some(100));
        assert_eq!(options.game_type, GameType::Manual);
        assert!(options.search.alpha_beta);

        let game = options.new_game();
        assert_eq!(game.dim(), 5);
        assert_eq!(game.max_turns(), Some(100));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let options = GameOptions {
            dim: 8,
            max_turns: None,
            game_type: GameType::CompVsComp,
            search: SearchConfig::default().with_depth(6).with_time_limit(2.5),
            heuristic: HeuristicKind::Health,
            broker: Some("http://localhost:8001".to_string()),
        };
        options.save(&path).unwrap();
        let loaded = GameOptions::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, options);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = temp_path("partial");
        std::fs::write(&path, r#"{"game_type": "defender", "search": {"max_depth": 2}}"#).unwrap();
        let loaded = GameOptions::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.game_type, GameType::CompVsDefender);
        assert_eq!(loaded.search.max_depth, 2);
        assert_eq!(loaded.search.max_time_secs, 5.0);
        assert_eq!(loaded.dim, 5);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = GameOptions::load(&temp_path("missing")).unwrap_err();
        assert!(err.to_string().contains("Failed to read options file"));
    }

    #[test]
    fn test_validation() {
        let mut options = GameOptions::default();
        options.dim = 3;
        assert!(options.validate().is_err());
        options.dim = 17;
        assert!(options.validate().is_err());
        options.dim = 16;
        assert!(options.validate().is_ok());

        options.search.min_depth = 5;
        options.search.max_depth = 4;
        assert!(options.validate().is_err());
        options.search.min_depth = 0;

        options.search.max_time_secs = 0.0;
        assert!(options.validate().is_err());
        options.search.max_time_secs = f64::INFINITY;
        assert!(options.validate().is_err());
        options.search.max_time_secs = f64::NAN;
        assert!(options.validate().is_err());
        options.search.max_time_secs = 1e20;
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_game_type() {
        assert_eq!("AUTO".parse::<GameType>(), Ok(GameType::CompVsComp));
        assert_eq!("attacker".parse::<GameType>(), Ok(GameType::AttackerVsComp));
        assert!("both".parse::<GameType>().is_err());

        assert!(GameType::Manual.is_human(Side::Attacker));
        assert!(GameType::Manual.is_human(Side::Defender));
        assert!(GameType::AttackerVsComp.is_human(Side::Attacker));
        assert!(GameType::AttackerVsComp.is_computer(Side::Defender));
        assert!(GameType::CompVsDefender.is_computer(Side::Attacker));
        assert!(GameType::CompVsComp.is_computer(Side::Defender));
        assert_eq!(GameType::CompVsDefender.to_string(), "defender");
    }
}
