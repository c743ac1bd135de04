//! 赢面窗口：棋盘上每段长度等于 `win_len` 的连续格子。
//!
//! 终局判定与启发式评估共用同一份窗口表。

use std::borrow::Cow;

use once_cell::sync::Lazy;

use super::board::{Board, Move};

/// 方向步进：横、竖、两条对角线。
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

static TIC_TAC_TOE_WINDOWS: Lazy<Vec<Vec<Move>>> = Lazy::new(|| build_windows(3, 3, 3));
static CONNECT_FOUR_WINDOWS: Lazy<Vec<Vec<Move>>> = Lazy::new(|| build_windows(6, 7, 4));

/// 枚举 rows×cols 棋盘上所有长度为 win_len 的窗口。
pub fn build_windows(rows: usize, cols: usize, win_len: usize) -> Vec<Vec<Move>> {
    let mut windows = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            for (dr, dc) in DIRECTIONS {
                let end_row = row as isize + dr * (win_len as isize - 1);
                let end_col = col as isize + dc * (win_len as isize - 1);
                if end_row < 0 || end_row >= rows as isize || end_col < 0 || end_col >= cols as isize
                {
                    continue;
                }
                let window = (0..win_len)
                    .map(|step| {
                        Move::new(
                            (row as isize + dr * step as isize) as usize,
                            (col as isize + dc * step as isize) as usize,
                        )
                    })
                    .collect();
                windows.push(window);
            }
        }
    }
    windows
}

/// 返回棋盘几何对应的窗口表；两种门户棋型走预计算的静态表。
pub fn windows_for(board: &Board) -> Cow<'static, [Vec<Move>]> {
    match (board.rows, board.cols, board.win_len) {
        (3, 3, 3) => Cow::Borrowed(TIC_TAC_TOE_WINDOWS.as_slice()),
        (6, 7, 4) => Cow::Borrowed(CONNECT_FOUR_WINDOWS.as_slice()),
        (rows, cols, win_len) => Cow::Owned(build_windows(rows, cols, win_len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tic_tac_toe_has_eight_windows() {
        // 3 rows + 3 columns + 2 diagonals
        assert_eq!(build_windows(3, 3, 3).len(), 8);
    }

    #[test]
    fn connect_four_has_sixty_nine_windows() {
        // 24 horizontal + 21 vertical + 12 + 12 diagonal
        assert_eq!(build_windows(6, 7, 4).len(), 69);
    }

    #[test]
    fn windows_stay_in_bounds() {
        for window in build_windows(6, 7, 4) {
            assert_eq!(window.len(), 4);
            for mv in window {
                assert!(mv.row < 6 && mv.col < 7);
            }
        }
    }

    #[test]
    fn custom_geometry_falls_back_to_fresh_table() {
        let board = Board::new(5, 5, 4, false).expect("geometry should be valid");
        let windows = windows_for(&board);
        // 5x5 win-4: 2*5*2 horizontal+vertical + 2*2*2 diagonals
        assert_eq!(windows.len(), 28);
    }
}
