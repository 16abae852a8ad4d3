//! 对局会话
//!
//! 持有一局棋的状态和走子历史，支持悔棋。一个会话同一时间只应有一个写入方，
//! 并发访问由上层（传输/房间）串行化。

use serde::Serialize;
use tracing::{info, warn};

use crate::action::Action;
use crate::board::Location;
use crate::castling::CastlingRights;
use crate::diff::{MoveKind, TurnDifferences};
use crate::error::{ChessError, Result};
use crate::message::{GameMessage, INITIAL_MESSAGE};
use crate::piece::Piece;
use crate::state::State;

/// 一回合的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    pub mover: Piece,
    pub action: Action,
    pub kind: MoveKind,
    pub differences: TurnDifferences,
    /// 走子前的易位权（悔棋时恢复）
    pub castling_before: CastlingRights,
}

impl TurnRecord {
    /// 本回合升变的兵
    pub fn promoted(&self) -> Option<Piece> {
        matches!(self.kind, MoveKind::Promotion { .. }).then_some(self.mover)
    }
}

/// 对局会话
#[derive(Debug, Clone)]
pub struct Game {
    initial_message: String,
    state: State,
    history: Vec<TurnRecord>,
}

impl Game {
    /// 从标准初始局面开始
    pub fn new() -> Self {
        Self {
            initial_message: INITIAL_MESSAGE.to_string(),
            state: State::initial(),
            history: Vec::new(),
        }
    }

    /// 从任意 GameMessage 开始
    pub fn from_message(message: &str) -> Result<Self> {
        let state = GameMessage::decode(message)?;
        Ok(Self {
            initial_message: message.to_string(),
            state,
            history: Vec::new(),
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// 当前局面的 GameMessage
    pub fn message(&self) -> String {
        GameMessage::encode(&self.state)
    }

    pub fn initial_message(&self) -> &str {
        &self.initial_message
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// 走一步
    pub fn play(&mut self, mover: Piece, action: Action) -> Result<&TurnRecord> {
        let (next, transition) = self.state.transition(mover, action)?;

        if let MoveKind::EnPassant { captured } = transition.kind {
            if !self.just_double_stepped(captured) {
                warn!("拒绝吃过路兵 {} {}: {} 不是上一步双步前进的兵", mover, action, captured);
                return Err(ChessError::RejectedAction {
                    piece: mover.to_string(),
                    action: action.to_string(),
                    reason: "captured pawn did not just advance two squares",
                });
            }
        }

        let record = TurnRecord {
            mover,
            action,
            kind: transition.kind,
            differences: transition.differences,
            castling_before: self.state.castling(),
        };
        self.state = next;

        let index = self.history.len();
        self.history.push(record);
        Ok(&self.history[index])
    }

    /// 用棋子标记和动作标记走一步
    pub fn play_tokens(&mut self, mover: &str, action: &str) -> Result<&TurnRecord> {
        let mover = Piece::decode(mover)?;
        let action = Action::decode(action)?;
        self.play(mover, action)
    }

    /// 悔棋：撤销最后一步
    pub fn undo(&mut self) -> Result<TurnRecord> {
        let record = self.history.last().ok_or(ChessError::NothingToUndo)?;
        self.state
            .revert(&record.differences, record.castling_before, record.promoted())?;
        info!("撤销 {} {}", record.mover, record.action);
        self.history.pop().ok_or(ChessError::NothingToUndo)
    }

    /// 上一步是否正是这个兵从初始行双步前进
    ///
    /// 没有历史（从中局消息开始）时无法判断，只依赖几何条件。
    fn just_double_stepped(&self, pawn: Piece) -> bool {
        let Some(last) = self.history.last() else {
            return true;
        };
        match last.differences.get(pawn) {
            Some(change) if last.mover == pawn => match (change.last, change.curr) {
                (Location::OnBoard(from), Location::OnBoard(to)) => {
                    from.row() == pawn.color().pawn_row()
                        && (to.row() as i8 - from.row() as i8).abs() == 2
                }
                _ => false,
            },
            _ => false,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
