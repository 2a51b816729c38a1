//! Single-player puzzles.
//!
//! One controller drives every preset. Each attempt moves it through
//! `AwaitingInput -> MoveValidating -> AwaitingInput | Won`; only
//! [`PuzzleController::reset`] leaves `Won`.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::board::{Color, Piece, PieceKind, Position, Square};
use crate::errors::PuzzleError;
use crate::fen;
use crate::log::debug;
use crate::oracle::{MoveRequest, PlayedMove, RulesOracle};
use crate::pgn::{GameMove, build_pgn};

/// The side the player controls in every preset.
const PLAYER: Color = Color::White;

const PAWN_RACE_FEN: &str = "4k3/pppppppp/8/8/8/8/PPPPPPPP/4K3 w - - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleState {
    AwaitingInput,
    MoveValidating,
    Won,
}

/// What counts as solving a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    /// A player piece of `kind` stands on `rank` (0 is the first rank).
    ReachRank { kind: PieceKind, rank: u8 },
    /// No opponent piece of this kind is left.
    CaptureAll(PieceKind),
    /// The player's last move was a promotion.
    Promote,
    AnyOf(Vec<Goal>),
}

impl Goal {
    fn is_met(&self, position: &Position, last: &PlayedMove) -> bool {
        match self {
            Goal::ReachRank { kind, rank } => position
                .pieces()
                .any(|(sq, piece)| piece == Piece::new(PLAYER, *kind) && sq.rank() == *rank),
            Goal::CaptureAll(kind) => position.count(Piece::new(PLAYER.opposite(), *kind)) == 0,
            Goal::Promote => last.san.contains('='),
            Goal::AnyOf(goals) => goals.iter().any(|g| g.is_met(position, last)),
        }
    }
}

/// How the other side answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opponent {
    /// Never moves; the turn goes straight back to the player.
    Static,
    /// Plays a random legal move.
    RandomMove,
}

/// Produces a fresh starting position.
pub type Generator = fn(&mut StdRng) -> Position;

#[derive(Debug, Clone)]
pub struct PuzzleRules {
    pub name: &'static str,
    /// Only this kind of piece may be moved; `None` allows any.
    pub allowed_piece: Option<PieceKind>,
    pub goal: Goal,
    pub generator: Generator,
    pub opponent: Opponent,
}

impl PuzzleRules {
    /// Walk the white king to the eighth rank past static black blockers.
    pub fn king_escape() -> Self {
        PuzzleRules {
            name: "King escape",
            allowed_piece: Some(PieceKind::King),
            goal: Goal::ReachRank {
                kind: PieceKind::King,
                rank: 7,
            },
            generator: king_escape_position,
            opponent: Opponent::Static,
        }
    }

    /// Capture every black pawn with a single knight.
    pub fn lone_knight() -> Self {
        PuzzleRules {
            name: "Lone knight",
            allowed_piece: Some(PieceKind::Knight),
            goal: Goal::CaptureAll(PieceKind::Pawn),
            generator: lone_knight_position,
            opponent: Opponent::Static,
        }
    }

    /// Pawns only: promote one, or capture all of the computer's pawns.
    pub fn pawn_race() -> Self {
        PuzzleRules {
            name: "Pawn race",
            allowed_piece: Some(PieceKind::Pawn),
            goal: Goal::AnyOf(vec![Goal::Promote, Goal::CaptureAll(PieceKind::Pawn)]),
            generator: pawn_race_position,
            opponent: Opponent::RandomMove,
        }
    }
}

/// Distinct random squares on ranks `ranks`, avoiding `taken`.
fn scatter(
    rng: &mut StdRng,
    count: usize,
    ranks: RangeInclusive<u8>,
    taken: &mut Vec<Square>,
) -> Vec<Square> {
    let mut squares = Vec::with_capacity(count);
    while squares.len() < count {
        let sq = Square::wrapping(rng.gen_range(0..8), rng.gen_range(ranks.clone()));
        if !taken.contains(&sq) {
            taken.push(sq);
            squares.push(sq);
        }
    }
    squares
}

/// Kings for both sides: white somewhere on the first rank, black in the
/// eighth-rank corner furthest from it. Returns the white king's square.
fn place_kings(rng: &mut StdRng, position: &mut Position, taken: &mut Vec<Square>) -> Square {
    let file = loop {
        let file = rng.gen_range(0..8);
        if !taken.contains(&Square::wrapping(file, 0)) {
            break file;
        }
    };
    let white = Square::wrapping(file, 0);
    let black = Square::wrapping(if file < 4 { 7 } else { 0 }, 7);
    position.set(white, Piece::new(Color::White, PieceKind::King));
    position.set(black, Piece::new(Color::Black, PieceKind::King));
    taken.extend([white, black]);
    white
}

fn king_escape_position(rng: &mut StdRng) -> Position {
    let mut position = Position::empty();
    let mut taken = Vec::new();
    place_kings(rng, &mut position, &mut taken);
    let blockers = rng.gen_range(4..=7);
    for sq in scatter(rng, blockers, 2..=6, &mut taken) {
        position.set(sq, Piece::new(Color::Black, PieceKind::Pawn));
    }
    position
}

fn lone_knight_position(rng: &mut StdRng) -> Position {
    let mut position = Position::empty();
    let knight = Square::wrapping(rng.gen_range(0..8), rng.gen_range(0..=1));
    position.set(knight, Piece::new(Color::White, PieceKind::Knight));
    let mut taken = vec![knight];
    place_kings(rng, &mut position, &mut taken);
    let pawns = rng.gen_range(3..=5);
    for sq in scatter(rng, pawns, 2..=6, &mut taken) {
        position.set(sq, Piece::new(Color::Black, PieceKind::Pawn));
    }
    position
}

fn pawn_race_position(_: &mut StdRng) -> Position {
    fen::parse(PAWN_RACE_FEN).unwrap_or_default()
}

/// The computer's side: a uniformly random legal move.
#[derive(Debug, Clone)]
pub struct RandomMover {
    rng: StdRng,
}

impl RandomMover {
    pub fn new(seed: u64) -> Self {
        RandomMover {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn choose<O: RulesOracle>(&mut self, oracle: &O, fen: &str) -> Option<PlayedMove> {
        let moves = oracle.legal_moves(fen, None);
        let mv = moves.choose(&mut self.rng)?;
        oracle.play(fen, *mv)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No player piece on the source square, or one the rules do not allow
    WrongPiece,
    /// The oracle refused the move
    Illegal,
    /// The move checks an opponent that never answers
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rejected(RejectReason),
    /// The move stands; `reply` is the opponent's answer, if it made one.
    Accepted {
        played: PlayedMove,
        reply: Option<PlayedMove>,
    },
    Won { played: PlayedMove },
}

pub struct PuzzleController<O: RulesOracle> {
    oracle: O,
    rules: PuzzleRules,
    rng: StdRng,
    opponent: RandomMover,
    state: PuzzleState,
    start_fen: String,
    fen: String,
    moves: Vec<GameMove>,
}

impl<O: RulesOracle> PuzzleController<O> {
    /// A controller with a freshly generated puzzle. The same seed always
    /// yields the same puzzles and opponent replies.
    pub fn new(oracle: O, rules: PuzzleRules, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let opponent = RandomMover::new(rng.r#gen());
        let fen = (rules.generator)(&mut rng).to_fen();
        PuzzleController {
            oracle,
            rules,
            rng,
            opponent,
            state: PuzzleState::AwaitingInput,
            start_fen: fen.clone(),
            fen,
            moves: Vec::new(),
        }
    }

    pub fn state(&self) -> PuzzleState {
        self.state
    }

    pub fn rules(&self) -> &PuzzleRules {
        &self.rules
    }

    /// Current position as FEN.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    /// Every accepted move so far, the opponent's included.
    pub fn moves(&self) -> &[GameMove] {
        &self.moves
    }

    /// Legal destinations for the piece on `from`, as the board would
    /// highlight them.
    pub fn hints(&self, from: Square) -> Vec<Square> {
        self.oracle
            .legal_moves(&self.fen, Some(from))
            .into_iter()
            .map(|mv| mv.to)
            .collect()
    }

    /// Start over with a new puzzle.
    pub fn reset(&mut self) {
        self.fen = (self.rules.generator)(&mut self.rng).to_fen();
        self.start_fen = self.fen.clone();
        self.moves.clear();
        self.state = PuzzleState::AwaitingInput;
        debug!(puzzle = self.rules.name, fen = %self.fen, "puzzle reset");
    }

    pub fn attempt(&mut self, mv: MoveRequest) -> Result<Outcome, PuzzleError> {
        if self.state == PuzzleState::Won {
            return Err(PuzzleError::AlreadyWon);
        }
        self.state = PuzzleState::MoveValidating;
        let outcome = self.validate(mv);
        self.state = match &outcome {
            Ok(Outcome::Won { .. }) => PuzzleState::Won,
            _ => PuzzleState::AwaitingInput,
        };
        outcome
    }

    fn validate(&mut self, mv: MoveRequest) -> Result<Outcome, PuzzleError> {
        let position = fen::parse(&self.fen)?;
        let allowed = position.get(mv.from).is_some_and(|piece| {
            piece.color == PLAYER && self.rules.allowed_piece.is_none_or(|kind| kind == piece.kind)
        });
        if !allowed {
            return Ok(Outcome::Rejected(RejectReason::WrongPiece));
        }
        let Some(played) = self.oracle.play(&self.fen, mv) else {
            return Ok(Outcome::Rejected(RejectReason::Illegal));
        };
        let status = self.oracle.status(&played.fen);
        if self.rules.opponent == Opponent::Static && status.check {
            return Ok(Outcome::Rejected(RejectReason::Check));
        }
        self.record(&position, &played);

        let mut after = fen::parse(&played.fen)?;
        if status.checkmate || self.rules.goal.is_met(&after, &played) {
            self.fen = played.fen.clone();
            debug!(puzzle = self.rules.name, moves = self.moves.len(), "puzzle solved");
            return Ok(Outcome::Won { played });
        }

        let reply = match self.rules.opponent {
            Opponent::Static => None,
            Opponent::RandomMove => self.opponent.choose(&self.oracle, &played.fen),
        };
        match &reply {
            Some(reply) => {
                self.record(&after, reply);
                self.fen = reply.fen.clone();
            }
            None => {
                // The opponent passes: hand the move back.
                after.active = PLAYER;
                after.en_passant = None;
                after.fullmove = after.fullmove.saturating_add(1);
                self.fen = after.to_fen();
            }
        }
        Ok(Outcome::Accepted { played, reply })
    }

    fn record(&mut self, before: &Position, played: &PlayedMove) {
        self.moves.push(GameMove {
            san: played.san.clone(),
            move_number: before.fullmove,
            color: before.active,
            comment: None,
        });
    }

    /// The session so far as PGN.
    pub fn to_pgn(&self) -> String {
        let result = if self.state == PuzzleState::Won { "1-0" } else { "*" };
        let headers = [("Event".to_string(), self.rules.name.to_string())];
        build_pgn(&self.moves, &headers, Some(&self.start_fen), Some(result))
    }
}
