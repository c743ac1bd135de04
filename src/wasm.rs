//! wasm-bindgen 绑定层：门户前端调用引擎的唯一入口。

use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

use crate::ai::{AiAgent, AiConfig, AiDecision, AiDifficulty};
use crate::game::{Board, GameKind, Move, Player, RuleError, TerminalState};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    web_sys::console::log_1(&"board ai core ready".into());
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn config_for(difficulty: Option<&str>) -> AiConfig {
    let difficulty = difficulty
        .and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or(AiDifficulty::Medium);
    AiConfig::from_difficulty(difficulty)
}

fn parse_kind(kind: &str) -> Result<GameKind, JsValue> {
    GameKind::from_str(kind)
        .map_err(|_| JsValue::from_str(&format!("unknown game kind: {kind}")))
}

/// 落子后的棋盘与终局状态，一并回传给前端。
#[derive(Serialize)]
struct MoveResolution {
    board: Board,
    terminal: TerminalState,
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    board: Board,
    terminal: TerminalState,
}

/// 一局棋的会话：持有棋盘与轮到的棋手，双方交替落子。
#[wasm_bindgen]
pub struct GameSession {
    board: Board,
    to_move: Player,
}

#[wasm_bindgen]
impl GameSession {
    #[wasm_bindgen(constructor)]
    pub fn new(kind: &str, state_json: Option<String>) -> Result<GameSession, JsValue> {
        let board: Board = match state_json {
            Some(json) => serde_json::from_str(&json).map_err(serde_to_js_error)?,
            None => parse_kind(kind)?.board(),
        };
        // 轮次由子数差推出：A 先行
        let (a, b) = board.counts();
        let to_move = if a == b { Player::A } else { Player::B };
        Ok(GameSession { board, to_move })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.board).map_err(serde_to_js_error)
    }

    pub fn current_player(&self) -> Result<JsValue, JsValue> {
        to_value(&self.to_move).map_err(JsValue::from)
    }

    pub fn legal_moves_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.board.legal_moves()).map_err(serde_to_js_error)
    }

    pub fn terminal_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.board.terminal()).map_err(serde_to_js_error)
    }

    pub fn play(&mut self, row: usize, col: usize) -> Result<String, JsValue> {
        self.play_move(Move::new(row, col))
    }

    /// 重力棋盘的便捷入口：按列落子。
    pub fn drop_piece(&mut self, col: usize) -> Result<String, JsValue> {
        let mv = self
            .board
            .drop_move(col)
            .ok_or_else(|| JsValue::from_str(&format!("column {col} is full or out of range")))?;
        self.play_move(mv)
    }

    pub fn ai_move(&mut self, difficulty: Option<String>) -> Result<String, JsValue> {
        let mut agent = AiAgent::new(config_for(difficulty.as_deref()));
        let decision = agent
            .decide_move(&self.board, self.to_move)
            .map_err(to_js_error)?;
        self.board = self
            .board
            .apply(decision.mv, self.to_move)
            .map_err(to_js_error)?;
        self.to_move = self.to_move.opponent();

        let response = AiMoveResponse {
            decision,
            board: self.board.clone(),
            terminal: self.board.terminal(),
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 延迟版 AI 决策，返回 Promise，不改动会话状态（前端拿到结果后再落子）。
    pub fn think(&self, difficulty: Option<String>, delay_ms: Option<u32>) -> Promise {
        let board = self.board.clone();
        let to_move = self.to_move;
        let config = config_for(difficulty.as_deref());
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new(config);
            let decision = agent.decide_move(&board, to_move).map_err(to_js_error)?;
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    fn play_move(&mut self, mv: Move) -> Result<String, JsValue> {
        if self.board.terminal().is_over() {
            return Err(to_js_error(RuleError::GameFinished));
        }
        self.board = self.board.apply(mv, self.to_move).map_err(to_js_error)?;
        self.to_move = self.to_move.opponent();

        let resolution = MoveResolution {
            board: self.board.clone(),
            terminal: self.board.terminal(),
        };
        serde_json::to_string(&resolution).map_err(serde_to_js_error)
    }
}

/// 创建一块空棋盘。
#[wasm_bindgen(js_name = "createBoard")]
pub fn create_board(kind: &str) -> Result<JsValue, JsValue> {
    to_value(&parse_kind(kind)?.board()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "legalMoves")]
pub fn legal_moves(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.legal_moves()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "applyMove")]
pub fn apply_move(board: JsValue, mv: JsValue, player: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let mv: Move = from_value(mv).map_err(JsValue::from)?;
    let player: Player = from_value(player).map_err(JsValue::from)?;
    match board.apply(mv, player) {
        Ok(next) => to_value(&MoveResolution {
            terminal: next.terminal(),
            board: next,
        })
        .map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "checkTerminal")]
pub fn check_terminal(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.terminal()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateBoard")]
pub fn validate_board(board: JsValue) -> Result<(), JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    board
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(())
}

/// 不经会话的单发 AI 决策。
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    player: JsValue,
    difficulty: Option<String>,
) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let player: Player = from_value(player).map_err(JsValue::from)?;
    let mut agent = AiAgent::new(config_for(difficulty.as_deref()));
    match agent.decide_move(&board, player) {
        Ok(decision) => to_value(&decision).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
