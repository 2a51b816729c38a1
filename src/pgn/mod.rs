//! Portable Game Notation.
//!
//! Games are read as a header block plus a flat move list; variations are
//! skipped. [`build_pgn`] goes the other way for recorded sessions.

mod build;
mod movetext;
pub mod san;

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

pub use build::build_pgn;
pub use san::{is_valid_san, parse_san, strip_annotations};

use crate::board::Color;
use crate::errors::{FormatError, SourceContext};
use crate::fen;
use crate::oracle::RulesOracle;
use crate::registry::{DiagramRequest, SourceKind};

use movetext::TokenKind;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[(\w+)\s+"((?:[^"\\]|\\.)*)"\]$"#).expect("header pattern is a valid static regex")
});

/// One half-move of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMove {
    /// As written, annotations included
    pub san: String,
    pub move_number: u32,
    pub color: Color,
    pub comment: Option<String>,
}

impl GameMove {
    /// "After 12. Nf3" or "After 12... Nf6".
    pub fn caption(&self) -> String {
        match self.color {
            Color::White => format!("After {}. {}", self.move_number, self.san),
            Color::Black => format!("After {}... {}", self.move_number, self.san),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Tag pairs in file order
    pub headers: Vec<(String, String)>,
    /// Comment before the first move
    pub comment: Option<String>,
    pub moves: Vec<GameMove>,
    pub result: Option<String>,
    /// From the `FEN` tag, otherwise the standard start
    pub start_fen: String,
}

/// How per-move diagram positions are derived from a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    /// Every diagram shows the starting position.
    #[default]
    Placeholder,
    /// Moves are replayed through a rules oracle.
    Replay,
}

impl Game {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The game as PGN text, result included.
    pub fn to_pgn(&self) -> String {
        build_pgn(&self.moves, &self.headers, Some(&self.start_fen), self.result.as_deref())
    }

    /// One diagram request per move, captioned with the move.
    ///
    /// In [`PositionMode::Placeholder`] the oracle is not consulted and every
    /// request carries the starting FEN. In [`PositionMode::Replay`] each
    /// move is played from the previous position; a move the oracle rejects
    /// fails the whole game.
    pub fn diagram_requests<O: RulesOracle>(
        &self,
        mode: PositionMode,
        oracle: &O,
    ) -> Result<Vec<DiagramRequest>, FormatError> {
        let mut requests = Vec::with_capacity(self.moves.len());
        let mut fen = self.start_fen.clone();
        for mv in &self.moves {
            if mode == PositionMode::Replay {
                let played = oracle
                    .play_san(&fen, &mv.san)
                    .ok_or_else(|| FormatError::IllegalMove {
                        san: mv.san.clone(),
                        fen: fen.clone(),
                    })?;
                fen = played.fen;
            }
            requests.push(DiagramRequest::from_fen(&fen, mv.caption(), SourceKind::Pgn)?);
        }
        Ok(requests)
    }
}

fn is_header_line(line: &str) -> bool {
    line.trim_start().starts_with('[')
}

/// Split multi-game text into per-game blocks. A header line that follows
/// move text starts a new game. Blocks with nothing but whitespace are
/// dropped.
pub fn split_games(text: &str) -> Vec<String> {
    let mut games = Vec::new();
    let mut current = String::new();
    let mut in_moves = false;

    for line in text.lines() {
        if is_header_line(line) {
            if in_moves {
                games.push(std::mem::take(&mut current));
                in_moves = false;
            }
        } else if !line.trim().is_empty() {
            in_moves = true;
        }
        current.push_str(line);
        current.push('\n');
    }
    games.push(current);

    games.retain(|game| !game.trim().is_empty());
    games
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse one game: header tags, then move text.
pub fn parse_game(text: &str) -> Result<Game, FormatError> {
    let ctx = SourceContext::new("<pgn>", text);
    let mut headers = Vec::new();

    // Header and escape lines are blanked rather than removed so token
    // offsets still index `text`.
    let mut moves_text = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            let caps = HEADER_RE.captures(trimmed).ok_or_else(|| FormatError::PgnHeader {
                src: ctx.named_source(),
                span: (moves_text.len() + (line.len() - line.trim_start().len()), trimmed.len()).into(),
            })?;
            headers.push((caps[1].to_string(), unescape(&caps[2])));
        }
        if trimmed.starts_with('[') || line.starts_with('%') {
            moves_text.extend(line.bytes().map(|b| if b == b'\n' { '\n' } else { ' ' }));
        } else {
            moves_text.push_str(line);
        }
    }

    let start = match headers.iter().find(|(k, _)| k == "FEN") {
        Some((_, value)) => fen::parse_lenient(value)?,
        None => fen::parse(fen::START_FEN)?,
    };

    let mut game = Game {
        headers,
        comment: None,
        moves: Vec::new(),
        result: None,
        start_fen: start.to_fen(),
    };
    let mut color = start.active;
    let mut number = start.fullmove.max(1);

    for token in movetext::tokenize(&ctx, &moves_text)? {
        match token.kind {
            TokenKind::Move(san) => {
                if !is_valid_san(&san) {
                    return Err(FormatError::InvalidMove {
                        token: san,
                        src: ctx.named_source(),
                        span: (token.offset, token.len).into(),
                    });
                }
                game.moves.push(GameMove {
                    san,
                    move_number: number,
                    color,
                    comment: None,
                });
                if color == Color::Black {
                    number = number.saturating_add(1);
                }
                color = color.opposite();
            }
            TokenKind::MoveNumber { number: n, black } => {
                number = n;
                if black {
                    color = Color::Black;
                }
            }
            TokenKind::Comment(text) => {
                let slot = match game.moves.last_mut() {
                    Some(mv) => &mut mv.comment,
                    None => &mut game.comment,
                };
                match slot.as_mut() {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(&text);
                    }
                    None => *slot = Some(text),
                }
            }
            TokenKind::Result(result) => game.result = Some(result),
        }
    }

    if game.result.is_none() {
        game.result = game.header("Result").map(str::to_string);
    }
    Ok(game)
}

/// Split and parse every game; each game succeeds or fails on its own.
pub fn parse_games(text: &str) -> Vec<Result<Game, FormatError>> {
    split_games(text).iter().map(|game| parse_game(game)).collect()
}
