//! PGN text from a recorded move list.

use crate::board::Color;
use crate::fen::START_FEN;

use super::GameMove;

/// The seven tags every exported game carries, with their unknown values.
const ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

const LINE_WIDTH: usize = 80;

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build PGN text.
///
/// The seven-tag roster comes first (missing tags are filled with their
/// unknown values), then the remaining `headers` in the order given. A
/// `start` other than the standard position adds `SetUp` and `FEN` tags.
/// Move text is wrapped at 80 columns and ends with the result: `result`
/// if given, else the `Result` header, else `*`. The `Result` tag always
/// agrees with it.
pub fn build_pgn(
    moves: &[GameMove],
    headers: &[(String, String)],
    start: Option<&str>,
    result: Option<&str>,
) -> String {
    let lookup = |key: &str| {
        headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let result = result.or_else(|| lookup("Result")).unwrap_or("*");

    let mut tags: Vec<(&str, &str)> = ROSTER
        .iter()
        .map(|&(key, unknown)| match key {
            "Result" => (key, result),
            _ => (key, lookup(key).unwrap_or(unknown)),
        })
        .collect();
    if let Some(fen) = start.filter(|fen| *fen != START_FEN) {
        if lookup("SetUp").is_none() {
            tags.push(("SetUp", "1"));
        }
        if lookup("FEN").is_none() {
            tags.push(("FEN", fen));
        }
    }
    for (key, value) in headers {
        if !ROSTER.iter().any(|(k, _)| *k == key.as_str()) {
            tags.push((key.as_str(), value.as_str()));
        }
    }

    let mut out = String::new();
    for (key, value) in tags {
        out.push_str(&format!("[{key} \"{}\"]\n", escape(value)));
    }
    out.push('\n');

    let mut tokens: Vec<String> = Vec::new();
    let mut interrupted = true;
    for mv in moves {
        match mv.color {
            Color::White => tokens.push(format!("{}.", mv.move_number)),
            Color::Black if interrupted => tokens.push(format!("{}...", mv.move_number)),
            Color::Black => {}
        }
        tokens.push(mv.san.clone());
        interrupted = false;
        if let Some(comment) = mv.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            // A closing brace would end the comment early.
            let braced = format!("{{{}}}", comment.replace('}', ""));
            tokens.extend(braced.split_whitespace().map(str::to_string));
            interrupted = true;
        }
    }
    tokens.push(result.to_string());

    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&token);
    }
    out.push_str(&line);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::parse_game;

    fn mv(san: &str, move_number: u32, color: Color) -> GameMove {
        GameMove {
            san: san.to_string(),
            move_number,
            color,
            comment: None,
        }
    }

    fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn roster_then_extra_tags() {
        let game = parse_game("1. e4 {Best by test} e5 2. Nf3").unwrap();
        let pgn = build_pgn(
            &game.moves,
            &headers(&[("Event", "Casual"), ("White", "Ann"), ("Annotator", "Coach")]),
            None,
            None,
        );
        insta::assert_snapshot!(pgn, @r#"
        [Event "Casual"]
        [Site "?"]
        [Date "????.??.??"]
        [Round "?"]
        [White "Ann"]
        [Black "?"]
        [Result "*"]
        [Annotator "Coach"]

        1. e4 {Best by test} 1... e5 2. Nf3 *
        "#);
    }

    #[test]
    fn black_to_move_start() {
        let moves = vec![
            mv("Kd7", 20, Color::Black),
            mv("e4", 21, Color::White),
            mv("Ke6", 21, Color::Black),
        ];
        let pgn = build_pgn(
            &moves,
            &headers(&[("Result", "1-0")]),
            Some("4k3/8/8/8/8/8/4P3/4K3 b - - 0 20"),
            None,
        );
        insta::assert_snapshot!(pgn, @r#"
        [Event "?"]
        [Site "?"]
        [Date "????.??.??"]
        [Round "?"]
        [White "?"]
        [Black "?"]
        [Result "1-0"]
        [SetUp "1"]
        [FEN "4k3/8/8/8/8/8/4P3/4K3 b - - 0 20"]

        20... Kd7 21. e4 Ke6 1-0
        "#);
    }

    #[test]
    fn standard_start_has_no_fen_tag() {
        let pgn = build_pgn(&[mv("e4", 1, Color::White)], &[], Some(START_FEN), None);
        assert!(!pgn.contains("[FEN"));
        assert!(pgn.ends_with("1. e4 *\n"));
    }

    #[test]
    fn long_games_wrap_at_80_columns() {
        let mut moves = Vec::new();
        for n in 1..=40 {
            moves.push(mv("Nf3", n, Color::White));
            moves.push(mv("Nf6", n, Color::Black));
        }
        let pgn = build_pgn(&moves, &[], None, None);
        let movetext: Vec<&str> = pgn.split("\n\n").nth(1).unwrap().lines().collect();
        assert!(movetext.len() > 1);
        assert!(movetext.iter().all(|line| line.len() <= 80));
        assert!(movetext.join(" ").ends_with("40. Nf3 Nf6 *"));
    }

    #[test]
    fn tag_values_are_escaped() {
        let pgn = build_pgn(&[], &headers(&[("Event", r#"The "Immortal""#)]), None, None);
        assert!(pgn.starts_with(r#"[Event "The \"Immortal\""]"#));
    }

    #[test]
    fn output_parses_back() {
        let source = "1. d4 d5 2. c4 {Queen's Gambit} dxc4 3. e3 1/2-1/2";
        let game = parse_game(source).unwrap();
        let rebuilt = parse_game(&game.to_pgn()).unwrap();
        assert_eq!(rebuilt.moves, game.moves);
        assert_eq!(rebuilt.result.as_deref(), Some("1/2-1/2"));
        assert_eq!(rebuilt.header("Result"), Some("1/2-1/2"));
    }

    #[test]
    fn explicit_result_overrides_the_header() {
        let pgn = build_pgn(&[mv("e4", 1, Color::White)], &headers(&[("Result", "*")]), None, Some("1-0"));
        assert!(pgn.contains("[Result \"1-0\"]"));
        assert!(pgn.ends_with("1. e4 1-0\n"));
    }

    #[test]
    fn closing_braces_stay_inside_comments() {
        let mut moves = vec![mv("e4", 1, Color::White), mv("e5", 1, Color::Black)];
        moves[0].comment = Some("threatens } nothing".to_string());
        let pgn = build_pgn(&moves, &[], None, None);
        assert!(pgn.contains("{threatens nothing}"));
        let rebuilt = parse_game(&pgn).unwrap();
        assert_eq!(rebuilt.moves.len(), 2);
        assert_eq!(rebuilt.moves[1].san, "e5");
        assert_eq!(rebuilt.result.as_deref(), Some("*"));
    }
}
