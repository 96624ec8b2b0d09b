//! Game state, move validation, move execution and move generation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Coord, Move, DEFAULT_DIM};
use crate::error::{GameError, Result};
use crate::units::{Unit, UnitKind, MAX_HEALTH};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Turn limit used by the default game
pub const DEFAULT_MAX_TURNS: u32 = 100;

/// Side declared winner when the turn limit runs out. Reaching the limit is
/// never a draw.
pub const TURN_LIMIT_WINNER: Side = Side::Defender;

/// Health lost by every unit next to a self-destruct
pub const SELF_DESTRUCT_DAMAGE: u8 = 2;

/// Empty-cell directions allowed for AI, Program and Firewall (dr, dc)
pub const ATTACKER_FORWARD: [(i8, i8); 2] = [(-1, 0), (0, -1)];
pub const DEFENDER_FORWARD: [(i8, i8); 2] = [(1, 0), (0, 1)];

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attacker = 0,
    Defender = 1,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    /// Lowercase initial used in board renders
    pub fn initial(self) -> char {
        match self {
            Side::Attacker => 'a',
            Side::Defender => 'd',
        }
    }

    /// Directions a restricted unit of this side may relocate in
    pub fn forward_directions(self) -> &'static [(i8, i8)] {
        match self {
            Side::Attacker => &ATTACKER_FORWARD,
            Side::Defender => &DEFENDER_FORWARD,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Attacker => write!(f, "Attacker"),
            Side::Defender => write!(f, "Defender"),
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    AttackerWins,
    DefenderWins,
}

impl GameResult {
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::Attacker => GameResult::AttackerWins,
            Side::Defender => GameResult::DefenderWins,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            GameResult::Ongoing => None,
            GameResult::AttackerWins => Some(Side::Attacker),
            GameResult::DefenderWins => Some(Side::Defender),
        }
    }
}

/// What a legal move does once executed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    SelfDestruct,
    Attack,
    Repair,
    Relocate,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone to search)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    /// Board dimension
    dim: u8,

    /// Row-major cells
    board: Vec<Option<Unit>>,

    /// Side to move
    next_side: Side,

    /// Completed turns
    pub turns_played: u32,

    /// Turn limit, if any
    max_turns: Option<u32>,

    /// AI survival flags, kept in step with the board
    attacker_has_ai: bool,
    defender_has_ai: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_DIM, Some(DEFAULT_MAX_TURNS))
    }
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create a new game with the standard opening layout.
    /// Defender holds the top-left corner, Attacker the bottom-right.
    pub fn new(dim: u8, max_turns: Option<u32>) -> Self {
        let md = dim as i8 - 1;
        let d = Side::Defender;
        let a = Side::Attacker;
        let layout = [
            (Coord::new(0, 0), Unit::new(d, UnitKind::AI)),
            (Coord::new(1, 0), Unit::new(d, UnitKind::Tech)),
            (Coord::new(0, 1), Unit::new(d, UnitKind::Tech)),
            (Coord::new(2, 0), Unit::new(d, UnitKind::Firewall)),
            (Coord::new(0, 2), Unit::new(d, UnitKind::Firewall)),
            (Coord::new(1, 1), Unit::new(d, UnitKind::Program)),
            (Coord::new(md, md), Unit::new(a, UnitKind::AI)),
            (Coord::new(md - 1, md), Unit::new(a, UnitKind::Virus)),
            (Coord::new(md, md - 1), Unit::new(a, UnitKind::Virus)),
            (Coord::new(md - 2, md), Unit::new(a, UnitKind::Program)),
            (Coord::new(md, md - 2), Unit::new(a, UnitKind::Program)),
            (Coord::new(md - 1, md - 1), Unit::new(a, UnitKind::Firewall)),
        ];
        Self::from_units(dim, &layout, Side::Attacker, max_turns)
    }

    /// Create a game from explicit placements. Off-board and dead placements are
    /// ignored; later placements overwrite earlier ones on the same cell.
    pub fn from_units(
        dim: u8,
        units: &[(Coord, Unit)],
        next_side: Side,
        max_turns: Option<u32>,
    ) -> Self {
        let mut state = Self {
            dim,
            board: vec![None; dim as usize * dim as usize],
            next_side,
            turns_played: 0,
            max_turns,
            attacker_has_ai: false,
            defender_has_ai: false,
        };
        for &(coord, unit) in units.iter().filter(|(_, u)| u.is_alive()) {
            state.set(coord, Some(unit));
        }
        let attacker_has_ai = state.side_units(Side::Attacker).any(|(_, u)| u.is_ai());
        let defender_has_ai = state.side_units(Side::Defender).any(|(_, u)| u.is_ai());
        state.attacker_has_ai = attacker_has_ai;
        state.defender_has_ai = defender_has_ai;
        state
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn dim(&self) -> u8 {
        self.dim
    }

    /// Side to move
    pub fn next_side(&self) -> Side {
        self.next_side
    }

    pub fn max_turns(&self) -> Option<u32> {
        self.max_turns
    }

    /// Does this side's AI survive
    pub fn has_ai(&self, side: Side) -> bool {
        match side {
            Side::Attacker => self.attacker_has_ai,
            Side::Defender => self.defender_has_ai,
        }
    }

    /// Unit at coord (None when empty or off-board)
    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.index(coord).and_then(|i| self.board[i].as_ref())
    }

    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    /// Iterate units in row-major order
    pub fn units(&self) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        let dim = self.dim as usize;
        self.board.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|unit| (Coord::new((i / dim) as i8, (i % dim) as i8), unit))
        })
    }

    /// Iterate one side's units in row-major order
    pub fn side_units(&self, side: Side) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        self.units().filter(move |(_, unit)| unit.side == side)
    }

    /// Position of a side's AI
    pub fn ai_position(&self, side: Side) -> Option<Coord> {
        self.side_units(side)
            .find(|(_, unit)| unit.is_ai())
            .map(|(coord, _)| coord)
    }

    /// Is the unit at coord orthogonally adjacent to an enemy unit
    pub fn in_combat(&self, coord: Coord) -> bool {
        let Some(unit) = self.get(coord) else {
            return false;
        };
        coord
            .iter_adjacent()
            .filter_map(|adj| self.get(adj))
            .any(|other| other.side != unit.side)
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.is_valid(self.dim) {
            Some(coord.row as usize * self.dim as usize + coord.col as usize)
        } else {
            None
        }
    }

    fn set(&mut self, coord: Coord, unit: Option<Unit>) {
        if let Some(i) = self.index(coord) {
            self.board[i] = unit;
        }
    }

    // ========================================================================
    // GAME OUTCOME
    // ========================================================================

    /// Game result. The turn limit takes precedence over AI survival.
    pub fn result(&self) -> GameResult {
        if let Some(max) = self.max_turns {
            if self.turns_played >= max {
                return GameResult::won_by(TURN_LIMIT_WINNER);
            }
        }
        match (self.attacker_has_ai, self.defender_has_ai) {
            (true, true) => GameResult::Ongoing,
            (true, false) => GameResult::AttackerWins,
            (false, _) => GameResult::DefenderWins,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        self.result().winner()
    }

    pub fn is_finished(&self) -> bool {
        self.result() != GameResult::Ongoing
    }

    // ========================================================================
    // MOVE VALIDATION
    // ========================================================================

    /// Is the move legal for the side to move
    pub fn is_valid_move(&self, mv: Move) -> bool {
        self.check_move(self.next_side, mv).is_ok()
    }

    /// Is the move legal for an arbitrary side
    pub fn is_valid_move_for(&self, side: Side, mv: Move) -> bool {
        self.check_move(side, mv).is_ok()
    }

    /// Validate a move for `side`, classifying it or giving the rejection reason
    pub fn check_move(&self, side: Side, mv: Move) -> Result<MoveKind> {
        if !mv.is_on_board(self.dim) {
            return Err(reject(mv, "coordinates off the board"));
        }
        let src = match self.get(mv.src) {
            Some(unit) if unit.side == side => unit,
            Some(_) => return Err(reject(mv, "source unit belongs to the opponent")),
            None => return Err(reject(mv, "no unit at source")),
        };

        if mv.is_self_destruct() {
            return Ok(MoveKind::SelfDestruct);
        }

        if !mv.is_orthogonal_step() {
            return Err(reject(mv, "destination is not an orthogonal neighbor"));
        }

        match self.get(mv.dst) {
            Some(target) if target.side == side => {
                if target.health < MAX_HEALTH && src.repair_amount(target) > 0 {
                    Ok(MoveKind::Repair)
                } else {
                    Err(reject(mv, "friendly unit cannot be repaired"))
                }
            }
            Some(_) => Ok(MoveKind::Attack),
            None => {
                if src.kind.is_free_moving() {
                    return Ok(MoveKind::Relocate);
                }
                let step = (mv.dst.row - mv.src.row, mv.dst.col - mv.src.col);
                if !side.forward_directions().contains(&step) {
                    return Err(reject(mv, "unit may only move forward"));
                }
                if self.in_combat(mv.src) {
                    return Err(reject(mv, "unit is engaged in combat"));
                }
                Ok(MoveKind::Relocate)
            }
        }
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<Move> {
        self.legal_moves_for(self.next_side)
    }

    /// Legal moves for `side`: per unit in row-major order, the four neighbors
    /// (up, left, down, right) then the self-destruct.
    pub fn legal_moves_for(&self, side: Side) -> Vec<Move> {
        let mut moves = Vec::new();
        for (src, _) in self.side_units(side) {
            for dst in src.iter_adjacent() {
                let mv = Move::new(src, dst);
                if self.is_valid_move_for(side, mv) {
                    moves.push(mv);
                }
            }
            let boom = Move::self_destruct(src);
            if self.is_valid_move_for(side, boom) {
                moves.push(boom);
            }
        }
        moves
    }

    /// Number of legal moves available to `side`
    pub fn mobility(&self, side: Side) -> usize {
        self.legal_moves_for(side).len()
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Validate and execute a move for the side to move. Returns a
    /// human-readable description; on rejection the state is untouched.
    pub fn perform_move(&mut self, mv: Move) -> Result<String> {
        let kind = self.check_move(self.next_side, mv)?;
        let description = match kind {
            MoveKind::SelfDestruct => self.apply_self_destruct(mv),
            MoveKind::Attack => self.apply_attack(mv),
            MoveKind::Repair => self.apply_repair(mv),
            MoveKind::Relocate => self.apply_relocation(mv),
        };
        Ok(description)
    }

    /// Hand the move to the other side
    pub fn next_turn(&mut self) {
        self.next_side = self.next_side.opponent();
        self.turns_played += 1;
    }

    /// Apply move and advance the turn, return new state
    pub fn play(&self, mv: Move) -> Result<Self> {
        let mut child = self.clone();
        child.perform_move(mv)?;
        child.next_turn();
        Ok(child)
    }

    fn apply_self_destruct(&mut self, mv: Move) -> String {
        let at = mv.src;
        let Some(unit) = self.get(at).copied() else {
            return format!("{mv}: nothing to self-destruct");
        };

        let mut hit = 0;
        for coord in at.iter_range(1).filter(|&c| c != at) {
            if self.get(coord).is_some() {
                self.damage_at(coord, SELF_DESTRUCT_DAMAGE);
                hit += 1;
            }
        }
        self.damage_at(at, unit.health);

        format!("{mv}: {unit} self-destructs, hitting {hit} unit(s)")
    }

    fn apply_attack(&mut self, mv: Move) -> String {
        // Both blows use the pre-exchange units
        let (Some(attacker), Some(defender)) = (self.get(mv.src).copied(), self.get(mv.dst).copied())
        else {
            return format!("{mv}: nothing to attack");
        };
        let dealt = attacker.damage_amount(&defender);
        let taken = defender.damage_amount(&attacker);

        self.damage_at(mv.dst, dealt);
        self.damage_at(mv.src, taken);

        format!("{mv}: {attacker} attacks {defender}, dealt {dealt}, took {taken}")
    }

    fn apply_repair(&mut self, mv: Move) -> String {
        let (Some(healer), Some(target)) = (self.get(mv.src).copied(), self.get(mv.dst).copied())
        else {
            return format!("{mv}: nothing to repair");
        };
        let amount = healer.repair_amount(&target);
        if let Some(i) = self.index(mv.dst) {
            if let Some(unit) = self.board[i].as_mut() {
                unit.apply_repair(amount);
            }
        }

        format!("{mv}: {healer} repairs {target} by {amount}")
    }

    fn apply_relocation(&mut self, mv: Move) -> String {
        let unit = self.get(mv.src).copied();
        self.set(mv.dst, unit);
        self.set(mv.src, None);

        match unit {
            Some(unit) => format!("{mv}: {unit} moves"),
            None => format!("{mv}: nothing to move"),
        }
    }

    /// Damage the unit at coord, removing it (and its AI flag) if it dies
    fn damage_at(&mut self, coord: Coord, amount: u8) {
        let Some(i) = self.index(coord) else {
            return;
        };
        let Some(unit) = self.board[i].as_mut() else {
            return;
        };
        unit.apply_damage(amount);
        if unit.is_alive() {
            return;
        }

        let dead = *unit;
        self.board[i] = None;
        if dead.is_ai() {
            match dead.side {
                Side::Attacker => self.attacker_has_ai = false,
                Side::Defender => self.defender_has_ai = false,
            }
        }
    }
}

fn reject(mv: Move, reason: &str) -> GameError {
    GameError::InvalidMove(format!("{mv}: {reason}"))
}

// ============================================================================
// RENDERING
// ============================================================================

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Next player: {}", self.next_side)?;
        writeln!(f, "Turns played: {}", self.turns_played)?;
        writeln!(f)?;

        write!(f, "   ")?;
        for col in 0..self.dim as i8 {
            write!(f, "{:^3} ", Coord::new(0, col).col_label())?;
        }
        writeln!(f)?;

        for row in 0..self.dim as i8 {
            write!(f, "{}: ", Coord::new(row, 0).row_label())?;
            for col in 0..self.dim as i8 {
                match self.get(Coord::new(row, col)) {
                    Some(unit) => write!(f, "{:^3} ", unit.to_string())?,
                    None => write!(f, "{:^3} ", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(side: Side, kind: UnitKind, health: u8) -> Unit {
        Unit::with_health(side, kind, health)
    }

    /// Both AIs tucked away in corners plus the given extra units
    fn skirmish(extra: &[(Coord, Unit)], next_side: Side) -> GameState {
        let mut units = vec![
            (Coord::new(0, 0), Unit::new(Side::Defender, UnitKind::AI)),
            (Coord::new(4, 4), Unit::new(Side::Attacker, UnitKind::AI)),
        ];
        units.extend_from_slice(extra);
        GameState::from_units(5, &units, next_side, None)
    }

    #[test]
    fn test_game_creation() {
        let game = GameState::default();
        assert_eq!(game.next_side(), Side::Attacker);
        assert_eq!(game.turns_played, 0);
        assert_eq!(game.result(), GameResult::Ongoing);
        assert!(game.has_ai(Side::Attacker));
        assert!(game.has_ai(Side::Defender));
        assert_eq!(game.side_units(Side::Attacker).count(), 6);
        assert_eq!(game.side_units(Side::Defender).count(), 6);
        assert_eq!(game.ai_position(Side::Attacker), Some(Coord::new(4, 4)));
        assert_eq!(
            game.get(Coord::new(3, 3)).map(|u| u.kind),
            Some(UnitKind::Firewall)
        );
    }

    #[test]
    fn test_from_units_skips_dead_placements() {
        let game = skirmish(
            &[
                (Coord::new(4, 4), unit(Side::Attacker, UnitKind::Virus, 0)),
                (Coord::new(2, 2), unit(Side::Defender, UnitKind::Tech, 0)),
                (Coord::new(1, 1), unit(Side::Attacker, UnitKind::AI, 0)),
            ],
            Side::Attacker,
        );
        assert!(game.get(Coord::new(2, 2)).is_none());
        assert!(game.get(Coord::new(1, 1)).is_none());
        assert_eq!(game.get(Coord::new(4, 4)).map(|u| u.kind), Some(UnitKind::AI));
        assert_eq!(game.side_units(Side::Attacker).count(), 1);

        let no_live_ai = GameState::from_units(
            5,
            &[
                (Coord::new(0, 0), unit(Side::Defender, UnitKind::AI, 0)),
                (Coord::new(4, 4), Unit::new(Side::Attacker, UnitKind::AI)),
            ],
            Side::Attacker,
            None,
        );
        assert!(!no_live_ai.has_ai(Side::Defender));
        assert_eq!(no_live_ai.winner(), Some(Side::Attacker));
    }

    #[test]
    fn test_turn_limit_favors_defender() {
        let mut game = GameState::new(5, Some(2));
        game.next_turn();
        assert_eq!(game.result(), GameResult::Ongoing);
        game.next_turn();
        assert_eq!(game.result(), GameResult::DefenderWins);
        assert_eq!(game.winner(), Some(TURN_LIMIT_WINNER));
    }

    #[test]
    fn test_turn_limit_beats_attacker_ai_win() {
        let game = GameState::from_units(
            5,
            &[(Coord::new(4, 4), Unit::new(Side::Attacker, UnitKind::AI))],
            Side::Attacker,
            Some(0),
        );
        assert_eq!(game.winner(), Some(Side::Defender));
    }

    #[test]
    fn test_ai_elimination_results() {
        let attacker_only = GameState::from_units(
            5,
            &[(Coord::new(4, 4), Unit::new(Side::Attacker, UnitKind::AI))],
            Side::Attacker,
            None,
        );
        assert_eq!(attacker_only.result(), GameResult::AttackerWins);

        let defender_only = GameState::from_units(
            5,
            &[(Coord::new(0, 0), Unit::new(Side::Defender, UnitKind::AI))],
            Side::Attacker,
            None,
        );
        assert_eq!(defender_only.result(), GameResult::DefenderWins);
        assert_eq!(skirmish(&[], Side::Attacker).result(), GameResult::Ongoing);
    }

    #[test]
    fn test_rejects_wrong_owner_and_empty_source() {
        let game = GameState::default();
        // Defender unit while attacker to move
        assert!(!game.is_valid_move(Move::from_quad(1, 1, 2, 1)));
        // Empty source
        assert!(!game.is_valid_move(Move::from_quad(2, 2, 2, 1)));
        // Off board
        assert!(!game.is_valid_move(Move::from_quad(4, 4, 5, 4)));
    }

    #[test]
    fn test_self_destruct_always_legal() {
        let game = GameState::default();
        assert!(game.is_valid_move(Move::self_destruct(Coord::new(4, 4))));
        assert!(game.is_valid_move(Move::self_destruct(Coord::new(3, 3))));
    }

    #[test]
    fn test_adjacency_is_true_four_neighbor() {
        let v = Coord::new(2, 2);
        let game = skirmish(&[(v, Unit::new(Side::Attacker, UnitKind::Virus))], Side::Attacker);
        // Same column, two rows away: the column delta is zero but the move is not adjacent
        assert!(!game.is_valid_move(Move::new(v, Coord::new(0, 2))));
        assert!(!game.is_valid_move(Move::new(v, Coord::new(4, 2))));
        // Same row, two columns away
        assert!(!game.is_valid_move(Move::new(v, Coord::new(2, 4))));
        // Diagonal
        assert!(!game.is_valid_move(Move::new(v, Coord::new(1, 1))));
        // All four orthogonal steps
        for dst in v.iter_adjacent() {
            assert!(game.is_valid_move(Move::new(v, dst)), "{dst} should be reachable");
        }
    }

    #[test]
    fn test_forward_direction_table() {
        let p = Coord::new(2, 2);
        let attacker = skirmish(&[(p, Unit::new(Side::Attacker, UnitKind::Program))], Side::Attacker);
        assert!(attacker.is_valid_move(Move::new(p, Coord::new(1, 2))));
        assert!(attacker.is_valid_move(Move::new(p, Coord::new(2, 1))));
        assert!(!attacker.is_valid_move(Move::new(p, Coord::new(3, 2))));
        assert!(!attacker.is_valid_move(Move::new(p, Coord::new(2, 3))));

        let defender = skirmish(&[(p, Unit::new(Side::Defender, UnitKind::Firewall))], Side::Defender);
        assert!(defender.is_valid_move(Move::new(p, Coord::new(3, 2))));
        assert!(defender.is_valid_move(Move::new(p, Coord::new(2, 3))));
        assert!(!defender.is_valid_move(Move::new(p, Coord::new(1, 2))));
        assert!(!defender.is_valid_move(Move::new(p, Coord::new(2, 1))));
    }

    #[test]
    fn test_engagement_locks_restricted_units() {
        let p = Coord::new(2, 2);
        let game = skirmish(
            &[
                (p, Unit::new(Side::Attacker, UnitKind::Program)),
                (Coord::new(3, 2), Unit::new(Side::Defender, UnitKind::Tech)),
            ],
            Side::Attacker,
        );
        assert!(game.in_combat(p));
        assert!(!game.is_valid_move(Move::new(p, Coord::new(1, 2))));
        // Still free to attack the engaging unit or self-destruct
        assert!(game.is_valid_move(Move::new(p, Coord::new(3, 2))));
        assert!(game.is_valid_move(Move::self_destruct(p)));

        // Tech is free-moving even while engaged
        let mut defender_turn = game.clone();
        defender_turn.next_turn();
        assert!(defender_turn.is_valid_move(Move::from_quad(3, 2, 4, 2)));
        assert!(defender_turn.is_valid_move(Move::from_quad(3, 2, 3, 1)));
    }

    #[test]
    fn test_repair_legality() {
        let tech = Coord::new(1, 1);
        let hurt = Coord::new(1, 2);
        let full = Coord::new(2, 1);
        let game = skirmish(
            &[
                (tech, Unit::new(Side::Defender, UnitKind::Tech)),
                (hurt, unit(Side::Defender, UnitKind::Program, 5)),
                (full, Unit::new(Side::Defender, UnitKind::Firewall)),
                (Coord::new(0, 1), unit(Side::Defender, UnitKind::Virus, 2)),
            ],
            Side::Defender,
        );
        assert_eq!(game.check_move(Side::Defender, Move::new(tech, hurt)), Ok(MoveKind::Repair));
        // Target at full health
        assert!(!game.is_valid_move(Move::new(tech, full)));
        // Tech cannot repair a Virus
        assert!(!game.is_valid_move(Move::new(tech, Coord::new(0, 1))));
    }

    #[test]
    fn test_repair_execution() {
        let game = skirmish(
            &[
                (Coord::new(1, 0), Unit::new(Side::Defender, UnitKind::Tech)),
                (Coord::new(2, 0), unit(Side::Defender, UnitKind::Firewall, 7)),
            ],
            Side::Defender,
        );
        let mut after = game.clone();
        let description = after.perform_move(Move::from_quad(1, 0, 2, 0)).unwrap();
        assert!(description.contains("repairs"));
        assert_eq!(after.get(Coord::new(2, 0)).unwrap().health, MAX_HEALTH);
        assert_eq!(after.get(Coord::new(1, 0)).unwrap().health, MAX_HEALTH);
    }

    #[test]
    fn test_self_destruct_effects() {
        let center = Coord::new(2, 2);
        let game = skirmish(
            &[
                (center, unit(Side::Attacker, UnitKind::Virus, 6)),
                (Coord::new(1, 1), unit(Side::Defender, UnitKind::Program, 9)),
                (Coord::new(1, 3), unit(Side::Attacker, UnitKind::Firewall, 1)),
                (Coord::new(3, 2), unit(Side::Defender, UnitKind::Tech, 2)),
                (Coord::new(0, 2), unit(Side::Defender, UnitKind::Firewall, 9)),
            ],
            Side::Attacker,
        );
        let mut after = game.clone();
        after.perform_move(Move::self_destruct(center)).unwrap();

        assert!(after.is_empty(center));
        assert_eq!(after.get(Coord::new(1, 1)).unwrap().health, 7);
        // Clamped at zero and removed
        assert!(after.is_empty(Coord::new(1, 3)));
        assert!(after.is_empty(Coord::new(3, 2)));
        // Distance two is untouched
        assert_eq!(after.get(Coord::new(0, 2)).unwrap().health, 9);
        assert_eq!(after.get(Coord::new(0, 0)).unwrap().health, 9);
    }

    #[test]
    fn test_self_destruct_kills_adjacent_ai() {
        let game = skirmish(
            &[(Coord::new(3, 3), unit(Side::Defender, UnitKind::Virus, 9))],
            Side::Defender,
        );
        let mut after = game.clone();
        // Drop the attacker AI low enough to die from the blast
        let i = after.index(Coord::new(4, 4)).unwrap();
        after.board[i] = Some(unit(Side::Attacker, UnitKind::AI, 2));

        after.perform_move(Move::self_destruct(Coord::new(3, 3))).unwrap();
        assert!(!after.has_ai(Side::Attacker));
        assert_eq!(after.result(), GameResult::DefenderWins);
    }

    #[test]
    fn test_combat_uses_pre_exchange_units() {
        let virus = Coord::new(2, 2);
        let tech = Coord::new(2, 1);
        let game = skirmish(
            &[
                (virus, unit(Side::Attacker, UnitKind::Virus, 1)),
                (tech, unit(Side::Defender, UnitKind::Tech, 9)),
            ],
            Side::Attacker,
        );
        let mut after = game.clone();
        after.perform_move(Move::new(virus, tech)).unwrap();
        // Virus deals 6 to the Tech, Tech still deals its 1 back
        assert_eq!(after.get(tech).unwrap().health, 3);
        assert!(after.is_empty(virus));

        // Defender blow is dealt even when the attacker's blow is lethal
        let program = Coord::new(3, 1);
        let lethal = skirmish(
            &[
                (Coord::new(3, 2), unit(Side::Attacker, UnitKind::Virus, 2)),
                (program, unit(Side::Defender, UnitKind::Program, 4)),
            ],
            Side::Attacker,
        );
        let mut after = lethal.clone();
        after.perform_move(Move::new(Coord::new(3, 2), program)).unwrap();
        assert!(after.is_empty(program));
        assert!(after.is_empty(Coord::new(3, 2)));
    }

    #[test]
    fn test_default_layout_virus_combat() {
        let mut game = GameState::default();
        // Bring the attacker Virus from D4 next to the defender Program at B1
        let i = game.index(Coord::new(3, 4)).unwrap();
        let virus = game.board[i].take().unwrap();
        let j = game.index(Coord::new(1, 2)).unwrap();
        game.board[j] = Some(virus);

        let program = *game.get(Coord::new(1, 1)).unwrap();
        assert_eq!(program.side, Side::Defender);
        let description = game.perform_move(Move::from_quad(1, 2, 1, 1)).unwrap();
        assert!(description.contains("attacks"));

        // Virus -> Program is 6, Program -> Virus is 3
        assert_eq!(game.get(Coord::new(1, 1)).unwrap().health, 3);
        assert_eq!(game.get(Coord::new(1, 2)).unwrap().health, 6);
    }

    #[test]
    fn test_ai_death_in_combat_clears_flag() {
        let game = skirmish(
            &[(Coord::new(1, 0), unit(Side::Attacker, UnitKind::Virus, 9))],
            Side::Attacker,
        );
        let mut after = game.clone();
        after.perform_move(Move::from_quad(1, 0, 0, 0)).unwrap();
        assert!(!after.has_ai(Side::Defender));
        assert_eq!(after.ai_position(Side::Defender), None);
        assert_eq!(after.result(), GameResult::AttackerWins);
        // AI hits back for 3 before dying
        assert_eq!(after.get(Coord::new(1, 0)).unwrap().health, 6);
    }

    #[test]
    fn test_rejected_move_leaves_state_untouched() {
        let game = GameState::default();
        let mut after = game.clone();
        let err = after.perform_move(Move::from_quad(4, 4, 2, 4)).unwrap_err();
        assert!(matches!(err, GameError::InvalidMove(_)));
        assert_eq!(after, game);
    }

    #[test]
    fn test_relocation() {
        let game = GameState::default();
        let after = game.play(Move::from_quad(2, 4, 1, 4)).unwrap();
        assert!(after.is_empty(Coord::new(2, 4)));
        assert_eq!(after.get(Coord::new(1, 4)).unwrap().kind, UnitKind::Program);
        assert_eq!(after.next_side(), Side::Defender);
        assert_eq!(after.turns_played, 1);
        // Parent state untouched
        assert_eq!(game.get(Coord::new(2, 4)).unwrap().kind, UnitKind::Program);
    }

    #[test]
    fn test_candidate_order() {
        let game = GameState::default();
        let moves = game.legal_moves();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|&mv| game.is_valid_move(mv)));

        // First attacker unit in row-major order is the Program at C4: up, then self-destruct
        assert_eq!(moves[0], Move::from_quad(2, 4, 1, 4));
        assert_eq!(moves[1], Move::from_quad(2, 4, 2, 3));
        assert_eq!(moves[2], Move::self_destruct(Coord::new(2, 4)));
        // Every unit contributes its self-destruct last
        let booms = moves.iter().filter(|m| m.is_self_destruct()).count();
        assert_eq!(booms, 6);
    }

    #[test]
    fn test_mobility_for_either_side() {
        let game = GameState::default();
        assert_eq!(game.mobility(Side::Attacker), game.legal_moves().len());
        assert!(game.mobility(Side::Defender) >= 6);
    }

    #[test]
    fn test_render() {
        let game = GameState::default();
        let text = game.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Next player: Attacker");
        assert_eq!(lines[1], "Turns played: 0");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "    0   1   2   3   4  ");
        assert_eq!(lines[4], "A: dA9 dT9 dF9  .   .  ");
        assert_eq!(lines[8], "E:  .   .  aP9 aV9 aA9 ");
    }
}
