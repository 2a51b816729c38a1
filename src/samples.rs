//! Built-in positions for quickly filling a worksheet.

use crate::registry::{DiagramRequest, PositionRegistry, RequestId, SourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub fen: &'static str,
    pub instruction: &'static str,
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        name: "Starting position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        instruction: "White to move. Develop a knight toward the center.",
    },
    Sample {
        name: "Italian Game",
        fen: "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3",
        instruction: "Black to move. Which piece should come out next?",
    },
    Sample {
        name: "Back-rank mate",
        fen: "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
        instruction: "White to move and mate in one.",
    },
    Sample {
        name: "Smothered mate",
        fen: "6rk/6pp/8/6N1/8/8/8/6K1 w - - 0 1",
        instruction: "White to move and mate in one.",
    },
    Sample {
        name: "Lucena position",
        fen: "1K1k4/1P6/8/8/8/8/r7/2R5 w - - 0 1",
        instruction: "White to move and win.",
    },
    Sample {
        name: "Philidor position",
        fen: "4k3/8/r7/4PK2/8/8/8/7R b - - 0 1",
        instruction: "Black to move and draw.",
    },
    Sample {
        name: "Pawn race",
        fen: "8/pppppppp/8/8/8/8/PPPPPPPP/8 w - - 0 1",
        instruction: "Promote a pawn before Black does.",
    },
];

/// One template request per sample, in order.
pub fn template_requests() -> Vec<DiagramRequest> {
    SAMPLES
        .iter()
        .filter_map(|sample| DiagramRequest::from_fen(sample.fen, sample.instruction, SourceKind::Template).ok())
        .collect()
}

/// Append every sample to `registry` in one step.
pub fn insert_samples(registry: &PositionRegistry) -> Vec<RequestId> {
    registry.add_many(template_requests())
}
