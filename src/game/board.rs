use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::windows::windows_for;

/// 棋手标识（A 先行）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    A,
    B,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }
}

/// 单个格子的内容。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Empty,
    PlayerA,
    PlayerB,
}

impl Cell {
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::PlayerA => Some(Player::A),
            Cell::PlayerB => Some(Player::B),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::A => Cell::PlayerA,
            Player::B => Cell::PlayerB,
        }
    }
}

/// 一步落子的目标格（row 0 为顶行）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// 对局结束判定结果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TerminalState {
    InProgress,
    Win { player: Player, cells: Vec<Move> },
    Draw,
}

impl TerminalState {
    pub fn is_over(&self) -> bool {
        !matches!(self, TerminalState::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    CellCountSkew { player_a: usize, player_b: usize },
    FloatingPiece { row: usize, col: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    InvalidGeometry {
        rows: usize,
        cols: usize,
        win_len: usize,
    },
    OutOfBounds {
        row: usize,
        col: usize,
    },
    CellOccupied {
        row: usize,
        col: usize,
    },
    FloatingMove {
        row: usize,
        col: usize,
        landing_row: usize,
    },
    GameFinished,
    NoLegalMoves,
    IntegrityViolation {
        error: IntegrityError,
    },
}

/// 门户支持的棋类。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    TicTacToe,
    ConnectFour,
}

impl GameKind {
    pub fn board(self) -> Board {
        match self {
            GameKind::TicTacToe => Board::tic_tac_toe(),
            GameKind::ConnectFour => Board::connect_four(),
        }
    }
}

impl FromStr for GameKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tictactoe" | "tic-tac-toe" | "ttt" => Ok(GameKind::TicTacToe),
            "connectfour" | "connect-four" | "connect4" | "c4" => Ok(GameKind::ConnectFour),
            _ => Err(()),
        }
    }
}

/// 棋盘快照：行优先的平铺格子数组。
///
/// `gravity` 为真时落子沿列下坠（四连棋语义），合法落点是该列最低的空格。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub rows: usize,
    pub cols: usize,
    pub win_len: usize,
    pub gravity: bool,
    pub cells: Vec<Cell>,
}

impl Board {
    pub fn new(rows: usize, cols: usize, win_len: usize, gravity: bool) -> Result<Self, RuleError> {
        if rows == 0 || cols == 0 || win_len < 2 || (win_len > rows && win_len > cols) {
            return Err(RuleError::InvalidGeometry {
                rows,
                cols,
                win_len,
            });
        }
        Ok(Self {
            rows,
            cols,
            win_len,
            gravity,
            cells: vec![Cell::Empty; rows * cols],
        })
    }

    pub fn tic_tac_toe() -> Self {
        Self {
            rows: 3,
            cols: 3,
            win_len: 3,
            gravity: false,
            cells: vec![Cell::Empty; 9],
        }
    }

    pub fn connect_four() -> Self {
        Self {
            rows: 6,
            cols: 7,
            win_len: 4,
            gravity: true,
            cells: vec![Cell::Empty; 42],
        }
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if !self.in_bounds(row, col) {
            return None;
        }
        Some(self.cells[self.index(row, col)])
    }

    /// 每方已落子数 (A, B)。
    pub fn counts(&self) -> (usize, usize) {
        let mut a = 0;
        let mut b = 0;
        for cell in &self.cells {
            match cell {
                Cell::PlayerA => a += 1,
                Cell::PlayerB => b += 1,
                Cell::Empty => {}
            }
        }
        (a, b)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// 重力棋盘上该列的落点；列满或越界返回 None。
    pub fn drop_move(&self, col: usize) -> Option<Move> {
        if col >= self.cols {
            return None;
        }
        (0..self.rows)
            .rev()
            .find(|&row| self.cells[self.index(row, col)].is_empty())
            .map(|row| Move::new(row, col))
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        if !self.in_bounds(mv.row, mv.col) {
            return false;
        }
        if !self.cells[self.index(mv.row, mv.col)].is_empty() {
            return false;
        }
        if self.gravity {
            // 落点必须是该列最低的空格
            return self
                .drop_move(mv.col)
                .is_some_and(|landing| landing.row == mv.row);
        }
        true
    }

    /// 合法落点列表，顺序固定：平铺棋盘按行优先，重力棋盘按列从左到右。
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.gravity {
            (0..self.cols).filter_map(|col| self.drop_move(col)).collect()
        } else {
            let mut moves = Vec::new();
            for row in 0..self.rows {
                for col in 0..self.cols {
                    if self.cells[self.index(row, col)].is_empty() {
                        moves.push(Move::new(row, col));
                    }
                }
            }
            moves
        }
    }

    /// 校验后返回落子完成的新棋盘，原棋盘保持不变。
    pub fn apply(&self, mv: Move, player: Player) -> Result<Board, RuleError> {
        if !self.in_bounds(mv.row, mv.col) {
            return Err(RuleError::OutOfBounds {
                row: mv.row,
                col: mv.col,
            });
        }
        if !self.cells[self.index(mv.row, mv.col)].is_empty() {
            return Err(RuleError::CellOccupied {
                row: mv.row,
                col: mv.col,
            });
        }
        if self.gravity {
            if let Some(landing) = self.drop_move(mv.col) {
                if landing.row != mv.row {
                    return Err(RuleError::FloatingMove {
                        row: mv.row,
                        col: mv.col,
                        landing_row: landing.row,
                    });
                }
            }
        }
        let mut next = self.clone();
        next.place_unchecked(mv, player);
        Ok(next)
    }

    /// 搜索热路径用：调用方已确保 `mv` 合法。
    pub(crate) fn place_unchecked(&mut self, mv: Move, player: Player) {
        debug_assert!(self.is_legal(mv));
        let idx = self.index(mv.row, mv.col);
        self.cells[idx] = player.into();
    }

    /// 扫描全部赢面窗口判定对局状态。
    pub fn terminal(&self) -> TerminalState {
        for window in windows_for(self).iter() {
            let first = self.cells[self.index(window[0].row, window[0].col)];
            let Some(player) = first.player() else {
                continue;
            };
            if window
                .iter()
                .skip(1)
                .all(|mv| self.cells[self.index(mv.row, mv.col)] == first)
            {
                return TerminalState::Win {
                    player,
                    cells: window.clone(),
                };
            }
        }
        if self.is_full() {
            TerminalState::Draw
        } else {
            TerminalState::InProgress
        }
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let (a, b) = self.counts();
        // 双方轮流落子：A 比 B 多 0 或 1 子
        if a < b || a > b + 1 {
            return Err(IntegrityError::CellCountSkew {
                player_a: a,
                player_b: b,
            });
        }
        if self.gravity {
            for col in 0..self.cols {
                for row in 0..self.rows.saturating_sub(1) {
                    let above = self.cells[self.index(row, col)];
                    let below = self.cells[self.index(row + 1, col)];
                    if !above.is_empty() && below.is_empty() {
                        return Err(IntegrityError::FloatingPiece { row, col });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place_all(board: &mut Board, cells: &[(usize, usize, Player)]) {
        for &(row, col, player) in cells {
            *board = board
                .apply(Move::new(row, col), player)
                .expect("test placement should be legal");
        }
    }

    #[test]
    fn rejects_degenerate_geometry() {
        assert!(matches!(
            Board::new(0, 3, 3, false),
            Err(RuleError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            Board::new(2, 2, 5, false),
            Err(RuleError::InvalidGeometry { .. })
        ));
        assert!(Board::new(5, 5, 4, false).is_ok());
    }

    #[test]
    fn apply_rejects_out_of_bounds_and_occupied() {
        let board = Board::tic_tac_toe();
        assert!(matches!(
            board.apply(Move::new(3, 0), Player::A),
            Err(RuleError::OutOfBounds { row: 3, col: 0 })
        ));

        let board = board
            .apply(Move::new(1, 1), Player::A)
            .expect("center should be open");
        assert!(matches!(
            board.apply(Move::new(1, 1), Player::B),
            Err(RuleError::CellOccupied { row: 1, col: 1 })
        ));
    }

    #[test]
    fn apply_leaves_original_untouched() {
        let board = Board::tic_tac_toe();
        let snapshot = board.clone();
        let _next = board
            .apply(Move::new(0, 0), Player::A)
            .expect("corner should be open");
        assert_eq!(board, snapshot, "apply must not mutate the receiver");
    }

    #[test]
    fn gravity_moves_land_on_lowest_empty_row() {
        let board = Board::connect_four();
        assert_eq!(board.drop_move(3), Some(Move::new(5, 3)));
        assert!(board.is_legal(Move::new(5, 3)));
        assert!(!board.is_legal(Move::new(4, 3)), "floating move is illegal");

        let board = board
            .apply(Move::new(5, 3), Player::A)
            .expect("drop should land");
        assert_eq!(board.drop_move(3), Some(Move::new(4, 3)));
        assert!(matches!(
            board.apply(Move::new(3, 3), Player::B),
            Err(RuleError::FloatingMove {
                landing_row: 4,
                ..
            })
        ));
    }

    #[test]
    fn full_column_offers_no_drop() {
        let mut board = Board::connect_four();
        for i in 0..6 {
            let player = if i % 2 == 0 { Player::A } else { Player::B };
            let mv = board.drop_move(0).expect("column should still be open");
            board = board.apply(mv, player).expect("drop should succeed");
        }
        assert_eq!(board.drop_move(0), None);
        assert!(board.legal_moves().iter().all(|mv| mv.col != 0));
    }

    #[test]
    fn detects_wins_in_all_directions() {
        // Row
        let mut board = Board::tic_tac_toe();
        place_all(
            &mut board,
            &[
                (0, 0, Player::A),
                (1, 0, Player::B),
                (0, 1, Player::A),
                (1, 1, Player::B),
                (0, 2, Player::A),
            ],
        );
        assert!(matches!(
            board.terminal(),
            TerminalState::Win {
                player: Player::A,
                ..
            }
        ));

        // Column
        let mut board = Board::tic_tac_toe();
        place_all(
            &mut board,
            &[
                (0, 1, Player::A),
                (0, 0, Player::B),
                (1, 1, Player::A),
                (1, 0, Player::B),
                (2, 1, Player::A),
            ],
        );
        assert!(matches!(board.terminal(), TerminalState::Win { .. }));

        // Diagonal
        let mut board = Board::tic_tac_toe();
        place_all(
            &mut board,
            &[
                (0, 0, Player::A),
                (0, 1, Player::B),
                (1, 1, Player::A),
                (0, 2, Player::B),
                (2, 2, Player::A),
            ],
        );
        let TerminalState::Win { player, cells } = board.terminal() else {
            panic!("diagonal should win");
        };
        assert_eq!(player, Player::A);
        assert_eq!(
            cells,
            vec![Move::new(0, 0), Move::new(1, 1), Move::new(2, 2)]
        );

        // Anti-diagonal
        let mut board = Board::tic_tac_toe();
        place_all(
            &mut board,
            &[
                (0, 2, Player::A),
                (0, 0, Player::B),
                (1, 1, Player::A),
                (0, 1, Player::B),
                (2, 0, Player::A),
            ],
        );
        assert!(matches!(board.terminal(), TerminalState::Win { .. }));
    }

    #[test]
    fn full_board_without_win_is_draw() {
        let mut board = Board::tic_tac_toe();
        // X O X / X O O / O X X, no line anywhere
        place_all(
            &mut board,
            &[
                (0, 0, Player::A),
                (0, 1, Player::B),
                (0, 2, Player::A),
                (1, 1, Player::B),
                (1, 0, Player::A),
                (1, 2, Player::B),
                (2, 1, Player::A),
                (2, 0, Player::B),
                (2, 2, Player::A),
            ],
        );
        assert_eq!(board.terminal(), TerminalState::Draw);
    }

    #[test]
    fn integrity_check_flags_count_skew_and_floating_pieces() {
        let mut board = Board::tic_tac_toe();
        board.place_unchecked(Move::new(0, 0), Player::A);
        board.place_unchecked(Move::new(0, 1), Player::A);
        board.place_unchecked(Move::new(0, 2), Player::A);
        assert_eq!(
            board.integrity_check(),
            Err(IntegrityError::CellCountSkew {
                player_a: 3,
                player_b: 0
            })
        );

        let mut board = Board::connect_four();
        board.cells[3] = Cell::PlayerA; // top row, column 3, nothing below
        assert_eq!(
            board.integrity_check(),
            Err(IntegrityError::FloatingPiece { row: 0, col: 3 })
        );

        let board = Board::connect_four()
            .apply(Move::new(5, 3), Player::A)
            .expect("drop should land");
        assert_eq!(board.integrity_check(), Ok(()));
    }

    #[test]
    fn errors_serialize_with_a_type_tag() {
        let error = RuleError::CellOccupied { row: 1, col: 1 };
        let json = serde_json::to_string(&error).expect("error should serialize");
        assert!(json.contains("\"type\":\"CellOccupied\""), "got {json}");

        let board: Board =
            serde_json::from_str(&serde_json::to_string(&Board::connect_four()).expect("serialize"))
                .expect("board json should round-trip");
        assert_eq!(board, Board::connect_four());
    }

    #[test]
    fn game_kind_parses_portal_names() {
        assert_eq!("tictactoe".parse(), Ok(GameKind::TicTacToe));
        assert_eq!("Connect4".parse(), Ok(GameKind::ConnectFour));
        assert_eq!("connect-four".parse(), Ok(GameKind::ConnectFour));
        assert!("chess".parse::<GameKind>().is_err());
    }
}
