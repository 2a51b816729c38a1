//! Move text tokenizer.

use pest::Parser;
use pest::error::{ErrorVariant, InputLocation};
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::errors::{FormatError, SourceContext};

#[derive(Parser)]
#[grammar = "pgn.pest"]
struct MovetextParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// A SAN candidate, not yet validated
    Move(String),
    /// `12.` or `12...`
    MoveNumber { number: u32, black: bool },
    Comment(String),
    Result(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset into the text handed to [`tokenize`]
    pub offset: usize,
    pub len: usize,
}

/// Split move text into tokens. NAGs and variations are dropped.
pub(crate) fn tokenize(ctx: &SourceContext, text: &str) -> Result<Vec<Token>, FormatError> {
    let mut pairs =
        MovetextParser::parse(Rule::movetext, text).map_err(|e| syntax_error(ctx, e))?;
    let Some(root) = pairs.next() else {
        return Ok(Vec::new());
    };

    let mut tokens = Vec::new();
    for pair in root.into_inner() {
        if let Some(kind) = token_kind(&pair) {
            let span = pair.as_span();
            tokens.push(Token {
                kind,
                offset: span.start(),
                len: span.end() - span.start(),
            });
        }
    }
    Ok(tokens)
}

fn token_kind(pair: &Pair<'_, Rule>) -> Option<TokenKind> {
    match pair.as_rule() {
        Rule::san => Some(TokenKind::Move(pair.as_str().to_string())),
        Rule::move_number => {
            let s = pair.as_str();
            let digits = s.trim_end_matches('.');
            Some(TokenKind::MoveNumber {
                number: digits.parse().ok()?,
                black: s.len() - digits.len() >= 3,
            })
        }
        Rule::comment | Rule::line_comment => {
            let text = pair.clone().into_inner().next()?.as_str().trim();
            (!text.is_empty()).then(|| TokenKind::Comment(text.to_string()))
        }
        Rule::result => Some(TokenKind::Result(pair.as_str().to_string())),
        _ => None,
    }
}

fn syntax_error(ctx: &SourceContext, err: pest::error::Error<Rule>) -> FormatError {
    let len = ctx.source.len();
    let offset = match err.location {
        InputLocation::Pos(p) => p,
        InputLocation::Span((start, _)) => start,
    };
    let message = match ctx.source[offset.min(len)..].chars().next() {
        Some('}') => "unmatched '}'".to_string(),
        Some(')') => "unmatched ')'".to_string(),
        Some(c) => format!("unexpected {c:?}"),
        None => match &err.variant {
            ErrorVariant::CustomError { message } => message.clone(),
            ErrorVariant::ParsingError { .. } => "unterminated comment or variation".to_string(),
        },
    };
    FormatError::PgnSyntax {
        message,
        src: ctx.named_source(),
        span: (offset.min(len), usize::from(offset < len)).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        let ctx = SourceContext::new("<pgn>", text);
        tokenize(&ctx, text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn mv(s: &str) -> TokenKind {
        TokenKind::Move(s.to_string())
    }

    #[test]
    fn numbers_moves_and_result() {
        assert_eq!(
            kinds("1. e4 e5 2.Nf3 1-0"),
            vec![
                TokenKind::MoveNumber { number: 1, black: false },
                mv("e4"),
                mv("e5"),
                TokenKind::MoveNumber { number: 2, black: false },
                mv("Nf3"),
                TokenKind::Result("1-0".to_string()),
            ]
        );
    }

    #[test]
    fn comments_nags_and_variations() {
        assert_eq!(
            kinds("1. e4 $1 {best by test} (1. d4 d5 (1... Nf6)) 1... c5 ; Sicilian\n*"),
            vec![
                TokenKind::MoveNumber { number: 1, black: false },
                mv("e4"),
                TokenKind::Comment("best by test".to_string()),
                TokenKind::MoveNumber { number: 1, black: true },
                mv("c5"),
                TokenKind::Comment("Sicilian".to_string()),
                TokenKind::Result("*".to_string()),
            ]
        );
    }

    #[test]
    fn castling_with_zeros_is_a_move() {
        assert_eq!(kinds("0-0 0-1"), vec![mv("0-0"), TokenKind::Result("0-1".to_string())]);
    }

    #[test]
    fn spans_point_into_the_text() {
        let text = "1. e4   Nf3";
        let ctx = SourceContext::new("<pgn>", text);
        let tokens = tokenize(&ctx, text).unwrap();
        assert_eq!((tokens[2].offset, tokens[2].len), (8, 3));
    }

    #[test]
    fn unterminated_comment() {
        let text = "1. e4 {never closed";
        let ctx = SourceContext::new("<pgn>", text);
        assert!(matches!(tokenize(&ctx, text), Err(FormatError::PgnSyntax { .. })));
    }

    #[test]
    fn stray_bracket() {
        let text = "1. e4 ) e5";
        let ctx = SourceContext::new("<pgn>", text);
        match tokenize(&ctx, text) {
            Err(FormatError::PgnSyntax { message, .. }) => assert_eq!(message, "unmatched ')'"),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
