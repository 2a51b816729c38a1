//! FEN codec: text to [`Position`] and back.

use pest::Parser;
use pest::error::{ErrorVariant, InputLocation};
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::board::{Board, Color, Piece, Position, Square};
use crate::errors::{FormatError, SourceContext};

#[derive(Parser)]
#[grammar = "fen.pest"]
struct FenParser;

/// The standard initial position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Fields substituted for the ones a lenient parse finds missing.
const DEFAULT_FIELDS: [&str; 5] = ["w", "-", "-", "0", "1"];

/// Parse a complete six-field FEN.
pub fn parse(fen: &str) -> Result<Position, FormatError> {
    parse_with(fen, true)
}

/// Parse a FEN whose trailing fields may be missing; they default to
/// `w - - 0 1`. The placement field is still required and validated.
pub fn parse_lenient(fen: &str) -> Result<Position, FormatError> {
    parse_with(fen, false)
}

/// Normalize a possibly partial FEN to its six-field form.
pub fn normalize(fen: &str) -> Result<String, FormatError> {
    parse_lenient(fen).map(|pos| pos.to_fen())
}

/// Side to move of a FEN: `b` in the second field means black, anything else
/// (including a missing field) means white.
pub fn active_color_of(fen: &str) -> Color {
    match fen.split_whitespace().nth(1) {
        Some("b") => Color::Black,
        _ => Color::White,
    }
}

/// Serialize a placement with default auxiliary fields (`- - 0 1`).
pub fn serialize(board: &Board, active: Color) -> String {
    serialize_fields(board, active, "-", None, 0, 1)
}

/// Serialize a placement and all five auxiliary fields.
pub fn serialize_fields(
    board: &Board,
    active: Color,
    castling: &str,
    en_passant: Option<Square>,
    halfmove: u32,
    fullmove: u32,
) -> String {
    let mut out = String::with_capacity(90);
    for (i, rank) in board.iter().rev().enumerate() {
        if i > 0 {
            out.push('/');
        }
        let mut run = 0u8;
        for cell in rank {
            match cell {
                Some(piece) => {
                    if run > 0 {
                        out.push(char::from(b'0' + run));
                        run = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => run += 1,
            }
        }
        if run > 0 {
            out.push(char::from(b'0' + run));
        }
    }

    let castling = if castling.is_empty() { "-" } else { castling };
    let en_passant = en_passant.map_or_else(|| "-".to_string(), |sq| sq.to_string());
    out.push_str(&format!(
        " {} {} {} {} {}",
        active.fen_char(),
        castling,
        en_passant,
        halfmove,
        fullmove
    ));
    out
}

fn parse_with(fen: &str, strict: bool) -> Result<Position, FormatError> {
    let ctx = SourceContext::new("<fen>", fen.trim());
    let text = ctx.source.as_str();

    let found = text.split_whitespace().count();
    if found > 6 || (strict && found != 6) {
        return Err(FormatError::FieldCount {
            found,
            src: ctx.named_source(),
            span: ctx.full_span(),
        });
    }

    let root = FenParser::parse(Rule::fen, text)
        .map_err(|e| syntax_error(&ctx, e))?
        .next()
        .ok_or_else(|| FormatError::FenSyntax {
            message: "empty input".to_string(),
            src: ctx.named_source(),
            span: ctx.full_span(),
        })?;

    let mut position = Position::empty();
    let mut fields = DEFAULT_FIELDS.map(str::to_string);
    let mut spans = [(0usize, 0usize); 5];

    for pair in root.into_inner() {
        let slot = match pair.as_rule() {
            Rule::board => {
                position = Position::from_board(parse_board(&ctx, pair)?, Color::White);
                continue;
            }
            Rule::side => 0,
            Rule::castling => 1,
            Rule::en_passant => 2,
            Rule::halfmove => 3,
            Rule::fullmove => 4,
            _ => continue,
        };
        let span = pair.as_span();
        spans[slot] = (span.start(), span.end() - span.start());
        fields[slot] = span.as_str().to_string();
    }

    position.active = if fields[0] == "b" {
        Color::Black
    } else {
        Color::White
    };
    position.castling = fields[1].clone();
    position.en_passant = match fields[2].as_str() {
        "-" => None,
        sq => Some(sq.parse().map_err(|_| FormatError::FenSyntax {
            message: format!("invalid en passant square {sq:?}"),
            src: ctx.named_source(),
            span: spans[2].into(),
        })?),
    };
    position.halfmove = parse_counter(&ctx, &fields[3], spans[3])?;
    position.fullmove = parse_counter(&ctx, &fields[4], spans[4])?;
    Ok(position)
}

fn parse_board(ctx: &SourceContext, pair: Pair<'_, Rule>) -> Result<Board, FormatError> {
    let board_span = pair.as_span();
    let ranks: Vec<Pair<'_, Rule>> = pair.into_inner().filter(|p| p.as_rule() == Rule::rank).collect();

    if ranks.len() != 8 {
        return Err(FormatError::RankCount {
            found: ranks.len(),
            src: ctx.named_source(),
            span: (board_span.start(), board_span.end() - board_span.start()).into(),
        });
    }

    let mut board: Board = [[None; 8]; 8];
    for (i, rank_pair) in ranks.into_iter().enumerate() {
        let rank_index = 7 - i;
        let span = rank_pair.as_span();
        let mut cells: Vec<Option<Piece>> = Vec::with_capacity(8);

        for square in rank_pair.into_inner() {
            let s = square.as_str();
            match square.as_rule() {
                Rule::piece => cells.push(s.chars().next().and_then(Piece::from_fen_char)),
                Rule::empty => {
                    let n = s.parse::<usize>().unwrap_or(0);
                    cells.extend(std::iter::repeat_n(None, n));
                }
                _ => {}
            }
        }

        if cells.len() != 8 {
            return Err(FormatError::RankWidth {
                rank: rank_index as u8 + 1,
                files: cells.len(),
                src: ctx.named_source(),
                span: (span.start(), span.end() - span.start()).into(),
            });
        }
        for (file, cell) in cells.into_iter().enumerate() {
            board[rank_index][file] = cell;
        }
    }
    Ok(board)
}

fn parse_counter(ctx: &SourceContext, field: &str, span: (usize, usize)) -> Result<u32, FormatError> {
    field.parse().map_err(|_| FormatError::FenSyntax {
        message: format!("move counter {field:?} is out of range"),
        src: ctx.named_source(),
        span: span.into(),
    })
}

fn syntax_error(ctx: &SourceContext, err: pest::error::Error<Rule>) -> FormatError {
    let len = ctx.source.len();
    let (offset, width) = match err.location {
        InputLocation::Pos(p) => (p, usize::from(p < len)),
        InputLocation::Span((start, end)) => (start, end.saturating_sub(start)),
    };

    let found = match ctx.source[offset.min(len)..].chars().next() {
        Some(c) => format!("unexpected {c:?}"),
        None => "unexpected end of input".to_string(),
    };
    let message = match &err.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let expected: Vec<&str> = positives.iter().map(describe).collect();
            format!("{found}, expected {}", expected.join(" or "))
        }
        ErrorVariant::ParsingError { .. } => found,
        ErrorVariant::CustomError { message } => message.clone(),
    };

    FormatError::FenSyntax {
        message,
        src: ctx.named_source(),
        span: (offset, width).into(),
    }
}

fn describe(rule: &Rule) -> &'static str {
    match rule {
        Rule::piece | Rule::empty | Rule::rank => "a piece letter or a digit 1-8",
        Rule::side => "side to move (w or b)",
        Rule::castling => "castling rights",
        Rule::en_passant => "an en passant square",
        Rule::halfmove | Rule::fullmove => "a move counter",
        Rule::board => "piece placement",
        Rule::EOI => "end of input",
        _ => "a field separator",
    }
}
