//! 启发式评估：按赢面窗口给非终局局面打分。

use serde::{Deserialize, Serialize};

use crate::game::{windows_for, Board, Player};

/// 终局绝对分值；搜索会按层数折减，越快的胜利分值越高。
pub const WIN_SCORE: i32 = 1_000_000;

/// 窗口计分权重。
///
/// 不变量：己方窗口离完成越近权重越高，对方只差一步的窗口权重必须
/// 显著大于己方发展分，否则引擎不会优先堵截。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvalWeights {
    /// 己方仅差一空格的窗口。
    pub nearly_complete: i32,
    /// 己方差两空格的窗口。
    pub developing: i32,
    /// 对方仅差一空格的窗口（取负）。
    pub opponent_threat: i32,
    /// 对方差两空格的窗口（取负）。
    pub opponent_developing: i32,
    /// 中列每枚己方棋子的加成。
    pub center: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            nearly_complete: 50,
            developing: 10,
            opponent_threat: 80,
            opponent_developing: 8,
            center: 3,
        }
    }
}

impl EvalWeights {
    /// Easy 难度用的钝化权重：堵截意识弱，局面感平坦。
    pub fn flat() -> Self {
        Self {
            nearly_complete: 8,
            developing: 4,
            opponent_threat: 10,
            opponent_developing: 2,
            center: 1,
        }
    }
}

pub fn evaluate(board: &Board, player: Player) -> i32 {
    evaluate_with(board, player, &EvalWeights::default())
}

/// 从 `player` 视角给局面打分；完成的窗口直接短路成 ±WIN_SCORE。
pub fn evaluate_with(board: &Board, player: Player, weights: &EvalWeights) -> i32 {
    let mut score = 0;
    for window in windows_for(board).iter() {
        let mut mine = 0usize;
        let mut theirs = 0usize;
        for mv in window {
            match board.cell(mv.row, mv.col).and_then(|cell| cell.player()) {
                Some(owner) if owner == player => mine += 1,
                Some(_) => theirs += 1,
                None => {}
            }
        }
        if mine == board.win_len {
            return WIN_SCORE;
        }
        if theirs == board.win_len {
            return -WIN_SCORE;
        }
        // 混合窗口对双方都不再有赢面
        if mine > 0 && theirs > 0 {
            continue;
        }
        if mine > 0 {
            if mine == board.win_len - 1 {
                score += weights.nearly_complete;
            } else if mine + 2 == board.win_len {
                score += weights.developing;
            }
        } else if theirs > 0 {
            if theirs == board.win_len - 1 {
                score -= weights.opponent_threat;
            } else if theirs + 2 == board.win_len {
                score -= weights.opponent_developing;
            }
        }
    }

    if board.cols % 2 == 1 {
        let center = board.cols / 2;
        for row in 0..board.rows {
            match board.cell(row, center).and_then(|cell| cell.player()) {
                Some(owner) if owner == player => score += weights.center,
                Some(_) => score -= weights.center,
                None => {}
            }
        }
    }

    score
}
