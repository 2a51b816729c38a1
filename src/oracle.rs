//! The chess-rules seam.
//!
//! Move legality, SAN resolution and game status come from a rules engine
//! behind [`RulesOracle`]. Positions cross the seam as FEN strings.
//!
//! [`StandardRules`] is the implementation shipped here, backed by
//! `shakmaty`: castling, en passant, check, mate and stalemate included.

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position as _, PositionError, Role};

use crate::board::{Color, Piece, PieceKind, Square};
use crate::pgn::strip_annotations;

/// A move by coordinates, as a board widget would report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        MoveRequest {
            from,
            to,
            promotion: None,
        }
    }
}

/// The result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub san: String,
    /// Position after the move
    pub fen: String,
    pub captured: Option<Piece>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameStatus {
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
}

pub trait RulesOracle {
    /// Play a coordinate move. `None` if the move is not legal.
    fn play(&self, fen: &str, mv: MoveRequest) -> Option<PlayedMove>;

    /// Play a SAN move. `None` if it is illegal or ambiguous.
    fn play_san(&self, fen: &str, san: &str) -> Option<PlayedMove>;

    /// Legal moves for the side to move, optionally only those starting on `from`.
    fn legal_moves(&self, fen: &str, from: Option<Square>) -> Vec<MoveRequest>;

    fn status(&self, fen: &str) -> GameStatus;
}

impl<T: RulesOracle + ?Sized> RulesOracle for &T {
    fn play(&self, fen: &str, mv: MoveRequest) -> Option<PlayedMove> {
        (**self).play(fen, mv)
    }

    fn play_san(&self, fen: &str, san: &str) -> Option<PlayedMove> {
        (**self).play_san(fen, san)
    }

    fn legal_moves(&self, fen: &str, from: Option<Square>) -> Vec<MoveRequest> {
        (**self).legal_moves(fen, from)
    }

    fn status(&self, fen: &str) -> GameStatus {
        (**self).status(fen)
    }
}

/// The standard rules of chess.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    /// The position behind `fen`. Stale castling rights, a stale en passant
    /// square and surplus material are tolerated; both kings must be present.
    fn position(fen: &str) -> Option<Chess> {
        let fen: Fen = fen.parse().ok()?;
        fen.into_position(CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_invalid_ep_square)
            .or_else(PositionError::ignore_too_much_material)
            .ok()
    }
}

impl RulesOracle for StandardRules {
    fn play(&self, fen: &str, mv: MoveRequest) -> Option<PlayedMove> {
        let pos = Self::position(fen)?;
        let turn = pos.turn();
        let candidates: Vec<Move> = pos
            .legal_moves()
            .into_iter()
            .filter(|&m| {
                request_for(m, turn).is_some_and(|r| r.from == mv.from && r.to == mv.to)
                    // A castle may also be given as king takes rook.
                    || (m.is_castle() && m.from().map(board_square) == Some(mv.from) && board_square(m.to()) == mv.to)
            })
            .collect();
        let wanted = match mv.promotion {
            Some(kind) => Some(role_of(kind)),
            None if candidates.iter().any(|m| m.is_promotion()) => Some(Role::Queen),
            None => None,
        };
        let chosen = candidates.into_iter().find(|m| m.promotion() == wanted)?;
        Some(played(&pos, chosen))
    }

    fn play_san(&self, fen: &str, san: &str) -> Option<PlayedMove> {
        let pos = Self::position(fen)?;
        let san: San = strip_annotations(san.trim()).parse().ok()?;
        let mv = san.to_move(&pos).ok()?;
        Some(played(&pos, mv))
    }

    fn legal_moves(&self, fen: &str, from: Option<Square>) -> Vec<MoveRequest> {
        let Some(pos) = Self::position(fen) else {
            return Vec::new();
        };
        let turn = pos.turn();
        pos.legal_moves()
            .into_iter()
            .filter_map(|m| request_for(m, turn))
            .filter(|r| from.is_none_or(|f| r.from == f))
            .collect()
    }

    fn status(&self, fen: &str) -> GameStatus {
        match Self::position(fen) {
            Some(pos) => GameStatus {
                check: pos.is_check(),
                checkmate: pos.is_checkmate(),
                stalemate: pos.is_stalemate(),
            },
            None => GameStatus::default(),
        }
    }
}

fn played(pos: &Chess, mv: Move) -> PlayedMove {
    let victim = match pos.turn() {
        shakmaty::Color::White => Color::Black,
        shakmaty::Color::Black => Color::White,
    };
    let captured = mv.capture().map(|role| Piece::new(victim, kind_of(role)));
    let mut next = pos.clone();
    let san = SanPlus::from_move_and_play_unchecked(&mut next, mv);
    PlayedMove {
        san: san.to_string(),
        fen: Fen::from_position(&next, EnPassantMode::Legal).to_string(),
        captured,
    }
}

/// The coordinates a board widget would report for `mv`. Castling is the
/// king's two-square step.
fn request_for(mv: Move, turn: shakmaty::Color) -> Option<MoveRequest> {
    let from = board_square(mv.from()?);
    let to = match mv.castling_side() {
        Some(side) => side.king_to(turn),
        None => mv.to(),
    };
    Some(MoveRequest {
        from,
        to: board_square(to),
        promotion: mv.promotion().map(kind_of),
    })
}

fn board_square(sq: shakmaty::Square) -> Square {
    Square::wrapping(sq.file().to_u32() as u8, sq.rank().to_u32() as u8)
}

fn role_of(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

fn kind_of(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn opening_moves_by_san() {
        let oracle = StandardRules;
        let e4 = oracle.play_san(fen::START_FEN, "e4").unwrap();
        assert_eq!(e4.fen, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        let e5 = oracle.play_san(&e4.fen, "e5").unwrap();
        let nf3 = oracle.play_san(&e5.fen, "Nf3!?").unwrap();
        assert_eq!(nf3.san, "Nf3");
        assert_eq!(nf3.fen, "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2");
    }

    #[test]
    fn rejects_impossible_moves() {
        let oracle = StandardRules;
        assert!(oracle.play_san(fen::START_FEN, "e5").is_none());
        assert!(oracle.play_san(fen::START_FEN, "Nd4").is_none());
        assert!(oracle.play_san(fen::START_FEN, "O-O").is_none());
        assert!(oracle.play(fen::START_FEN, MoveRequest::new(sq("e7"), sq("e5"))).is_none());
    }

    #[test]
    fn ambiguous_san_is_refused() {
        let fen = "4k3/8/8/8/8/8/4K3/R6R w - - 0 1";
        let oracle = StandardRules;
        assert!(oracle.play_san(fen, "Rf1").is_none());
        let played = oracle.play_san(fen, "Rhf1").unwrap();
        assert_eq!(played.san, "Rhf1");
    }

    #[test]
    fn captures_and_promotions() {
        let oracle = StandardRules;
        let fen = "3r3k/4P3/8/8/8/8/8/K7 w - - 0 1";
        let played = oracle.play(fen, MoveRequest::new(sq("e7"), sq("d8"))).unwrap();
        assert_eq!(played.san, "exd8=Q+");
        assert_eq!(played.captured, Some(Piece::new(Color::Black, PieceKind::Rook)));
        assert_eq!(played.fen, "3Q3k/8/8/8/8/8/8/K7 b - - 0 1");

        let under = oracle.play_san(fen, "e8=N").unwrap();
        assert_eq!(under.fen, "3rN2k/8/8/8/8/8/8/K7 b - - 0 1");
    }

    #[test]
    fn king_moves_revoke_castling() {
        let oracle = StandardRules;
        let played = oracle
            .play("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", MoveRequest::new(sq("e1"), sq("e2")))
            .unwrap();
        assert_eq!(played.fen, "r3k2r/8/8/8/8/8/4K3/R6R b kq - 1 1");
    }

    #[test]
    fn castling_by_coordinates_and_san() {
        let oracle = StandardRules;
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let short = oracle.play(fen, MoveRequest::new(sq("e1"), sq("g1"))).unwrap();
        assert_eq!(short.san, "O-O");
        assert_eq!(short.fen, "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        assert_eq!(oracle.play(fen, MoveRequest::new(sq("e1"), sq("h1"))), Some(short));

        let long = oracle.play_san(fen, "0-0-0").unwrap();
        assert_eq!(long.fen, "r3k2r/8/8/8/8/8/8/2KR3R b kq - 1 1");

        let mut king: Vec<String> = oracle.legal_moves(fen, Some(sq("e1"))).iter().map(|m| m.to.to_string()).collect();
        king.sort();
        assert_eq!(king, ["c1", "d1", "d2", "e2", "f1", "f2", "g1"]);
    }

    #[test]
    fn en_passant_capture() {
        let oracle = StandardRules;
        let played = oracle.play_san("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "exd6").unwrap();
        assert_eq!(played.captured, Some(Piece::new(Color::Black, PieceKind::Pawn)));
        assert_eq!(played.fen, "4k3/8/3P4/8/8/8/8/4K3 b - - 0 2");
    }

    #[test]
    fn king_may_not_walk_into_check() {
        let oracle = StandardRules;
        let fen = "4k3/8/8/8/8/8/r7/4K3 w - - 0 1";
        assert!(oracle.play(fen, MoveRequest::new(sq("e1"), sq("e2"))).is_none());
        assert!(oracle.play_san(fen, "Kd2").is_none());
        let mut escapes: Vec<String> = oracle.legal_moves(fen, None).iter().map(|m| m.to.to_string()).collect();
        escapes.sort();
        assert_eq!(escapes, ["d1", "f1"]);
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let oracle = StandardRules;
        let mut fen = fen::START_FEN.to_string();
        let mut last = String::new();
        for san in ["f3", "e5", "g4", "Qh4#"] {
            let played = oracle.play_san(&fen, san).unwrap();
            fen = played.fen;
            last = played.san;
        }
        assert_eq!(last, "Qh4#");
        assert_eq!(
            oracle.status(&fen),
            GameStatus {
                check: true,
                checkmate: true,
                stalemate: false,
            }
        );
        assert!(oracle.legal_moves(&fen, None).is_empty());
    }

    #[test]
    fn legal_moves_filter_by_origin() {
        let oracle = StandardRules;
        let knight = oracle.legal_moves(fen::START_FEN, Some(sq("g1")));
        let mut targets: Vec<String> = knight.iter().map(|m| m.to.to_string()).collect();
        targets.sort();
        assert_eq!(targets, ["f3", "h3"]);
        assert_eq!(oracle.legal_moves(fen::START_FEN, None).len(), 20);
    }

    #[test]
    fn cornered_king_is_stalemated() {
        let oracle = StandardRules;
        let status = oracle.status("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(status.stalemate);
        assert!(!status.check);
        assert_eq!(oracle.status(fen::START_FEN), GameStatus::default());
    }

    #[test]
    fn kingless_positions_have_no_moves() {
        let oracle = StandardRules;
        assert!(oracle.legal_moves("8/8/8/8/8/8/4P3/8 w - - 0 1", None).is_empty());
        assert!(oracle.play_san("8/8/8/8/8/8/4P3/8 w - - 0 1", "e4").is_none());
    }
}
