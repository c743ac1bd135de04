//! AI 模块（窗口评估、Minimax + Alpha-Beta 搜索、难度策略）。

pub mod evaluate;
pub mod minimax;

pub use evaluate::{evaluate, evaluate_with, EvalWeights, WIN_SCORE};
pub use minimax::{AiAgent, AiConfig, AiDecision, AiDifficulty, SearchDepth};
