//! 棋盘模型模块（格子状态、落子规则、终局判定）。

pub mod board;
pub mod windows;

pub use board::{
    Board,
    Cell,
    GameKind,
    IntegrityError,
    Move,
    Player,
    RuleError,
    TerminalState,
};
pub use windows::{build_windows, windows_for};
