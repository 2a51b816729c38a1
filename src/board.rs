//! Board data model: colors, pieces, squares and positions.
//!
//! No legality is enforced anywhere in this module. Any placement, including
//! ones no game could reach, is representable and round-trips through FEN.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Side to move / piece color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The FEN side-to-move letter
    pub fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Uppercase algebraic letter (`P` for pawns)
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }

    /// All twelve pieces, white first.
    pub fn all() -> impl Iterator<Item = Piece> {
        [Color::White, Color::Black]
            .into_iter()
            .flat_map(|color| PieceKind::ALL.into_iter().map(move |kind| Piece::new(color, kind)))
    }

    /// Uppercase letters are white, lowercase black.
    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { color, kind })
    }

    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.letter(),
            Color::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }

    /// Glyph file stem, e.g. `wK` or `bP`
    pub fn glyph_name(self) -> String {
        format!("{}{}", self.color.fen_char(), self.kind.letter())
    }

    /// Solid Unicode chess symbol. Both colors use the filled shapes; the
    /// renderer paints the fill in the piece color.
    pub fn symbol(self) -> char {
        match self.kind {
            PieceKind::King => '\u{265A}',
            PieceKind::Queen => '\u{265B}',
            PieceKind::Rook => '\u{265C}',
            PieceKind::Bishop => '\u{265D}',
            PieceKind::Knight => '\u{265E}',
            PieceKind::Pawn => '\u{265F}',
        }
    }
}

/// A board square, file and rank both in `0..8` (rank 0 is the first rank).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        (file < 8 && rank < 8).then_some(Square { file, rank })
    }

    /// Build from coordinates already known to be on the board; out-of-range
    /// values wrap.
    pub(crate) fn wrapping(file: u8, rank: u8) -> Square {
        Square {
            file: file & 7,
            rank: rank & 7,
        }
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.file
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file_char(self) -> char {
        char::from(b'a' + self.file)
    }

    /// Every square, a1 first, rank by rank.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { file, rank }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid square {0:?}")]
pub struct SquareParseError(pub String);

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(SquareParseError(s.to_string()));
        }
        match (bytes[0], bytes[1]) {
            (f @ b'a'..=b'h', r @ b'1'..=b'8') => Ok(Square {
                file: f - b'a',
                rank: r - b'1',
            }),
            _ => Err(SquareParseError(s.to_string())),
        }
    }
}

/// Piece placement indexed `[rank][file]`, rank 0 first.
pub type Board = [[Option<Piece>; 8]; 8];

/// A full position: placement plus the five auxiliary FEN fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    pub active: Color,
    /// Castling availability exactly as written (`-`, `KQkq`, ...)
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove: u32,
    pub fullmove: u32,
}

impl Default for Position {
    fn default() -> Self {
        Position::empty()
    }
}

impl Position {
    /// An empty board, white to move, no castling, move 1.
    pub fn empty() -> Self {
        Position::from_board([[None; 8]; 8], Color::White)
    }

    pub fn from_board(board: Board, active: Color) -> Self {
        Position {
            board,
            active,
            castling: "-".to_string(),
            en_passant: None,
            halfmove: 0,
            fullmove: 1,
        }
    }

    /// The standard initial position.
    pub fn starting() -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board: Board = [[None; 8]; 8];
        for file in 0..8 {
            board[0][file] = Some(Piece::new(Color::White, BACK_RANK[file]));
            board[1][file] = Some(Piece::new(Color::White, Pawn));
            board[6][file] = Some(Piece::new(Color::Black, Pawn));
            board[7][file] = Some(Piece::new(Color::Black, BACK_RANK[file]));
        }
        Position {
            castling: "KQkq".to_string(),
            ..Position::from_board(board, Color::White)
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.board[sq.rank() as usize][sq.file() as usize]
    }

    pub fn set(&mut self, sq: Square, piece: Piece) {
        self.board[sq.rank() as usize][sq.file() as usize] = Some(piece);
    }

    /// Empty a square, returning what stood there.
    pub fn clear(&mut self, sq: Square) -> Option<Piece> {
        self.board[sq.rank() as usize][sq.file() as usize].take()
    }

    /// Occupied squares in a1..h8 order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.pieces().filter(|(_, p)| *p == piece).count()
    }

    /// All six FEN fields.
    pub fn to_fen(&self) -> String {
        crate::fen::serialize_fields(
            &self.board,
            self.active,
            &self.castling,
            self.en_passant,
            self.halfmove,
            self.fullmove,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn squares_parse_and_print() {
        assert_eq!(sq("a1"), Square::new(0, 0).unwrap());
        assert_eq!(sq("h8"), Square::new(7, 7).unwrap());
        assert_eq!(sq("e4").to_string(), "e4");
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!(Square::new(8, 0).is_none());
    }

    #[test]
    fn fen_chars_encode_color() {
        let p = Piece::from_fen_char('n').unwrap();
        assert_eq!(p, Piece::new(Color::Black, PieceKind::Knight));
        assert_eq!(p.fen_char(), 'n');
        assert_eq!(Piece::from_fen_char('Q').unwrap().color, Color::White);
        assert!(Piece::from_fen_char('x').is_none());
    }

    #[test]
    fn glyph_names() {
        assert_eq!(Piece::new(Color::White, PieceKind::King).glyph_name(), "wK");
        assert_eq!(Piece::new(Color::Black, PieceKind::Pawn).glyph_name(), "bP");
        assert_eq!(Piece::all().count(), 12);
    }

    #[test]
    fn starting_position_layout() {
        let pos = Position::starting();
        assert_eq!(pos.get(sq("e1")), Some(Piece::new(Color::White, PieceKind::King)));
        assert_eq!(pos.get(sq("d8")), Some(Piece::new(Color::Black, PieceKind::Queen)));
        assert_eq!(pos.pieces().count(), 32);
        assert_eq!(pos.castling, "KQkq");
    }

    #[test]
    fn editing_squares() {
        let mut pos = Position::empty();
        let knight = Piece::new(Color::White, PieceKind::Knight);
        pos.set(sq("g1"), knight);
        assert_eq!(pos.get(sq("g1")), Some(knight));
        assert_eq!(pos.clear(sq("g1")), Some(knight));
        assert_eq!(pos.clear(sq("g1")), None);
    }
}
