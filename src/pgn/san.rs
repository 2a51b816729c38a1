//! Standard algebraic notation: syntactic validation and decomposition.
//!
//! Nothing here knows the position. `Nf3` is valid SAN whether or not a
//! knight can reach f3.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::board::{PieceKind, Square};

static CASTLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:O-O(-O)?|0-0(-0)?)([+#])?$").expect("castling pattern is a valid static regex")
});

static PIECE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([KQRBN])([a-h])?([1-8])?(x)?([a-h][1-8])([+#])?$")
        .expect("piece move pattern is a valid static regex")
});

static PAWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([a-h])(x))?([a-h][1-8])(?:=?([QRBN]))?([+#])?$")
        .expect("pawn move pattern is a valid static regex")
});

/// A SAN token split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanMove {
    Castle {
        long: bool,
    },
    Normal {
        piece: PieceKind,
        from_file: Option<u8>,
        from_rank: Option<u8>,
        capture: bool,
        to: Square,
        promotion: Option<PieceKind>,
    },
}

/// Whether `token` is syntactically valid SAN. Trailing `!`/`?` annotations
/// and a `+`/`#` suffix are accepted.
pub fn is_valid_san(token: &str) -> bool {
    parse_san(token).is_some()
}

/// Strip move-quality annotations (`!`, `?`, `!!`, `?!`, ...).
pub fn strip_annotations(token: &str) -> &str {
    token.trim_end_matches(['!', '?'])
}

pub fn parse_san(token: &str) -> Option<SanMove> {
    let token = strip_annotations(token.trim());
    if token.is_empty() {
        return None;
    }

    if let Some(caps) = CASTLE_RE.captures(token) {
        let long = caps.get(1).is_some() || caps.get(2).is_some();
        return Some(SanMove::Castle { long });
    }

    if let Some(caps) = PIECE_RE.captures(token) {
        let piece = caps.get(1).and_then(|m| m.as_str().chars().next()).and_then(PieceKind::from_letter)?;
        return Some(SanMove::Normal {
            piece,
            from_file: caps.get(2).map(|m| m.as_str().as_bytes()[0] - b'a'),
            from_rank: caps.get(3).map(|m| m.as_str().as_bytes()[0] - b'1'),
            capture: caps.get(4).is_some(),
            to: caps.get(5)?.as_str().parse().ok()?,
            promotion: None,
        });
    }

    let caps = PAWN_RE.captures(token)?;
    let to: Square = caps.get(3)?.as_str().parse().ok()?;
    let promotion = caps
        .get(4)
        .and_then(|m| m.as_str().chars().next())
        .and_then(PieceKind::from_letter);
    // Promotion only happens on the last rank, and only there.
    let last_rank = to.rank() == 0 || to.rank() == 7;
    if promotion.is_some() != last_rank {
        return None;
    }
    let from_file = caps.get(1).map(|m| m.as_str().as_bytes()[0] - b'a');
    if from_file.is_some_and(|file| file.abs_diff(to.file()) != 1) {
        return None;
    }

    Some(SanMove::Normal {
        piece: PieceKind::Pawn,
        from_file,
        from_rank: None,
        capture: caps.get(2).is_some(),
        to,
        promotion,
    })
}
