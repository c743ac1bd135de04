pub mod ai;
pub mod game;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use ai::{
    evaluate, evaluate_with, AiAgent, AiConfig, AiDecision, AiDifficulty, EvalWeights, SearchDepth,
    WIN_SCORE,
};
pub use game::{
    Board, Cell, GameKind, IntegrityError, Move, Player, RuleError, TerminalState,
};
