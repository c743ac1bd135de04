//! Alpha-Beta 搜索引擎与难度策略。

use std::str::FromStr;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ai::evaluate::{evaluate_with, EvalWeights, WIN_SCORE};
use crate::game::{Board, Move, Player, RuleError, TerminalState};

const INFINITY: i32 = WIN_SCORE + 1_000;

/// 搜索计时：原生环境走单调时钟，wasm 环境走 `Date.now()`。
#[derive(Debug, Clone, Copy)]
struct SearchClock {
    #[cfg(target_arch = "wasm32")]
    started_at: f64,
    #[cfg(not(target_arch = "wasm32"))]
    started_at: std::time::Instant,
}

impl SearchClock {
    #[cfg(target_arch = "wasm32")]
    fn now() -> Self {
        Self {
            started_at: web_sys::js_sys::Date::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now() -> Self {
        Self {
            started_at: std::time::Instant::now(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn elapsed(&self) -> Duration {
        let elapsed_ms = web_sys::js_sys::Date::now() - self.started_at;
        Duration::from_millis(elapsed_ms.max(0.0) as u64)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// 搜索深度：受限层数或完全展开。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Limited(u8),
    Unbounded,
}

impl SearchDepth {
    fn limit(self) -> Option<u8> {
        match self {
            SearchDepth::Limited(depth) => Some(depth),
            SearchDepth::Unbounded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "medium" | "normal" => Ok(AiDifficulty::Medium),
            "hard" | "expert" => Ok(AiDifficulty::Hard),
            _ => Err(()),
        }
    }
}

/// 一次决策期间不变的搜索参数。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub depth: SearchDepth,
    pub random_move_probability: f64,
    /// 零表示不设截止时间。
    pub time_limit: Duration,
    pub weights: EvalWeights,
}

impl AiConfig {
    /// 难度到搜索参数的无状态映射，每回合重新取值。
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Easy => Self {
                depth: SearchDepth::Limited(2),
                random_move_probability: 0.6,
                time_limit: Duration::from_millis(40),
                weights: EvalWeights::flat(),
            },
            AiDifficulty::Medium => Self {
                depth: SearchDepth::Limited(4),
                random_move_probability: 0.15,
                time_limit: Duration::from_millis(120),
                weights: EvalWeights::default(),
            },
            AiDifficulty::Hard => Self {
                depth: SearchDepth::Unbounded,
                random_move_probability: 0.0,
                time_limit: Duration::from_millis(250),
                weights: EvalWeights::default(),
            },
        }
    }

    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_random_move_probability(mut self, probability: f64) -> Self {
        self.random_move_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::Medium)
    }
}

/// 决策结果与搜索遥测。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    #[serde(rename = "move")]
    pub mv: Move,
    pub score: i32,
    pub nodes: u64,
    pub depth_reached: u8,
    pub timed_out: bool,
    pub duration_ms: u64,
    pub randomized: bool,
}

struct SearchStats {
    nodes: u64,
    depth_reached: u8,
    timed_out: bool,
}

impl SearchStats {
    fn new() -> Self {
        Self {
            nodes: 0,
            depth_reached: 0,
            timed_out: false,
        }
    }
}

/// Minimax + Alpha-Beta 决策代理。
///
/// 同分走法取静态评估排序后最先命中的那一个；随机性只来自
/// `random_move_probability` 的前置掷骰，概率为零时决策完全确定。
pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    /// 注入固定种子，测试用。
    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 为 `to_move` 计算一步棋。
    ///
    /// 已终局的棋盘属于调用方错误，直接返回 `GameFinished`；
    /// 传入的棋盘绝不被修改。
    pub fn decide_move(&mut self, board: &Board, to_move: Player) -> Result<AiDecision, RuleError> {
        let clock = SearchClock::now();

        if board.terminal().is_over() {
            return Err(RuleError::GameFinished);
        }
        let moves = board.legal_moves();
        if moves.is_empty() {
            return Err(RuleError::NoLegalMoves);
        }

        // 先掷随机骰：命中则直接走一步均匀随机的合法棋
        if self.config.random_move_probability > 0.0
            && self.rng.gen::<f64>() < self.config.random_move_probability
        {
            let mv = *moves
                .choose(&mut self.rng)
                .unwrap_or(&moves[0]);
            let mut child = board.clone();
            child.place_unchecked(mv, to_move);
            return Ok(AiDecision {
                mv,
                score: evaluate_with(&child, to_move, &self.config.weights),
                nodes: 1,
                depth_reached: 1,
                timed_out: false,
                duration_ms: clock.elapsed().as_millis() as u64,
                randomized: true,
            });
        }

        let mut stats = SearchStats::new();
        let deadline = (!self.config.time_limit.is_zero()).then_some(self.config.time_limit);
        let depth = self.config.depth.limit();

        let children = self.ordered_children(board, to_move, to_move);
        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best_mv = children[0].0;
        let mut best_score = -INFINITY;

        for (mv, child) in &children {
            let score = self.search(
                child,
                to_move.opponent(),
                to_move,
                depth.map(|d| d.saturating_sub(1)),
                alpha,
                beta,
                1,
                clock,
                deadline,
                &mut stats,
            );
            // 超时截断的子树只带回半截分数，不能拿来更新最优着法
            if stats.timed_out {
                break;
            }
            if score > best_score {
                best_score = score;
                best_mv = *mv;
            }
            alpha = alpha.max(best_score);
        }

        // 第一个孩子就被截断时退回静态最优的 children[0]
        if best_score == -INFINITY {
            best_score = evaluate_with(&children[0].1, to_move, &self.config.weights);
        }

        Ok(AiDecision {
            mv: best_mv,
            score: best_score,
            nodes: stats.nodes,
            depth_reached: stats.depth_reached,
            timed_out: stats.timed_out,
            duration_ms: clock.elapsed().as_millis() as u64,
            randomized: false,
        })
    }

    /// 子节点按静态评估排序：极大方降序、极小方升序，既加速剪枝，
    /// 也让同分局面优先选静态上更稳的走法。
    fn ordered_children(&self, board: &Board, to_move: Player, root: Player) -> Vec<(Move, Board)> {
        let mut children: Vec<(Move, Board, i32)> = board
            .legal_moves()
            .into_iter()
            .map(|mv| {
                let mut child = board.clone();
                child.place_unchecked(mv, to_move);
                let eval = evaluate_with(&child, root, &self.config.weights);
                (mv, child, eval)
            })
            .collect();
        if to_move == root {
            children.sort_by_key(|(_, _, eval)| std::cmp::Reverse(*eval));
        } else {
            children.sort_by_key(|(_, _, eval)| *eval);
        }
        children
            .into_iter()
            .map(|(mv, child, _)| (mv, child))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn search(
        &self,
        board: &Board,
        to_move: Player,
        root: Player,
        depth: Option<u8>,
        mut alpha: i32,
        mut beta: i32,
        ply: u8,
        clock: SearchClock,
        deadline: Option<Duration>,
        stats: &mut SearchStats,
    ) -> i32 {
        stats.nodes += 1;
        if ply > stats.depth_reached {
            stats.depth_reached = ply;
        }

        match board.terminal() {
            TerminalState::Win { player, .. } => {
                // 越早的胜负分值越极端，引擎因此偏好速胜缓败
                let magnitude = WIN_SCORE - ply as i32;
                return if player == root { magnitude } else { -magnitude };
            }
            TerminalState::Draw => return 0,
            TerminalState::InProgress => {}
        }

        if let Some(limit) = deadline {
            if clock.elapsed() >= limit {
                stats.timed_out = true;
                return evaluate_with(board, root, &self.config.weights);
            }
        }

        if depth == Some(0) {
            return evaluate_with(board, root, &self.config.weights);
        }

        let children = self.ordered_children(board, to_move, root);
        let next_depth = depth.map(|d| d.saturating_sub(1));
        let maximizing = to_move == root;

        if maximizing {
            let mut value = -INFINITY;
            for (_, child) in &children {
                let score = self.search(
                    child,
                    to_move.opponent(),
                    root,
                    next_depth,
                    alpha,
                    beta,
                    ply + 1,
                    clock,
                    deadline,
                    stats,
                );
                value = value.max(score);
                alpha = alpha.max(value);
                if stats.timed_out || beta <= alpha {
                    break;
                }
            }
            value
        } else {
            let mut value = INFINITY;
            for (_, child) in &children {
                let score = self.search(
                    child,
                    to_move.opponent(),
                    root,
                    next_depth,
                    alpha,
                    beta,
                    ply + 1,
                    clock,
                    deadline,
                    stats,
                );
                value = value.min(score);
                beta = beta.min(value);
                if stats.timed_out || beta <= alpha {
                    break;
                }
            }
            value
        }
    }
}
