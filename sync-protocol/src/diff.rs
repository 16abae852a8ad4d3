//! 走子差异与走法分类
//!
//! 只根据前后两个局面（或局面 + 动作）判断发生了什么，不依赖调用方告知走法类型。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionType};
use crate::board::Location;
use crate::castling::CastleSide;
use crate::error::{ChessError, Result};
use crate::piece::{ChessPos, Piece, PieceType};
use crate::state::State;

/// 单个棋子的位置变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub last: Location,
    pub curr: Location,
}

/// 一步棋中所有位置发生变化的棋子
///
/// 包括走子的棋子、被吃的棋子（变为 [`Location::Captured`]）以及易位时随王移动的车。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnDifferences {
    changes: BTreeMap<Piece, Change>,
}

impl TurnDifferences {
    pub fn get(&self, piece: Piece) -> Option<Change> {
        self.changes.get(&piece).copied()
    }

    pub fn contains(&self, piece: Piece) -> bool {
        self.changes.contains_key(&piece)
    }

    /// 按编码顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (Piece, Change)> + '_ {
        self.changes.iter().map(|(piece, change)| (*piece, *change))
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// 比较两个局面，找出位置发生变化的棋子
///
/// 只遍历 32 个棋子身份，不扫描棋盘格子。
pub fn diff(before: &State, after: &State) -> TurnDifferences {
    let changes = before
        .board()
        .positions()
        .filter_map(|(piece, last)| {
            let curr = after.board().location_of(piece);
            (last != curr).then_some((piece, Change { last, curr }))
        })
        .collect();
    TurnDifferences { changes }
}

/// 走法类型
///
/// 各类互斥，只有吃子和升变可以同时发生（[`MoveKind::Promotion`] 带被吃的棋子）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// 普通移动
    Quiet,
    /// 吃子
    Capture { captured: Piece },
    /// 吃过路兵，被吃的兵不在目标格上
    EnPassant { captured: Piece },
    /// 易位，车随王移动
    Castle { side: CastleSide, rook: Piece },
    /// 兵到达对方底线
    Promotion { captured: Option<Piece> },
}

impl MoveKind {
    /// 被吃的棋子（如果有）
    pub fn captured(&self) -> Option<Piece> {
        match self {
            MoveKind::Capture { captured } | MoveKind::EnPassant { captured } => Some(*captured),
            MoveKind::Promotion { captured } => *captured,
            MoveKind::Quiet | MoveKind::Castle { .. } => None,
        }
    }

    /// 动作标记是否与分类结果一致
    pub fn agrees_with(&self, action_type: ActionType) -> bool {
        match (self, action_type) {
            (MoveKind::Quiet, ActionType::Move)
            | (MoveKind::Capture { .. }, ActionType::Capture)
            | (MoveKind::EnPassant { .. }, ActionType::EnPassant)
            | (MoveKind::Promotion { captured: None }, ActionType::Promote(_))
            | (MoveKind::Promotion { captured: Some(_) }, ActionType::CapturePromote(_)) => true,
            (MoveKind::Castle { side, .. }, ActionType::CastleKingside) => {
                *side == CastleSide::Kingside
            }
            (MoveKind::Castle { side, .. }, ActionType::CastleQueenside) => {
                *side == CastleSide::Queenside
            }
            _ => false,
        }
    }
}

/// 根据走子前的局面判断一个动作属于哪类走法
///
/// 只看几何与易位权，不检查完整的合法性（将军、牵制等由规则引擎负责）。
pub fn classify(action: &Action, before: &State, mover: Piece) -> Result<MoveKind> {
    let board = before.board();
    let from = board
        .position_of(mover)
        .ok_or_else(|| ChessError::RejectedAction {
            piece: mover.to_string(),
            action: action.to_string(),
            reason: "mover is not on the board",
        })?;
    let to = action.target;
    let color = mover.color();
    let mover_type = before.effective_type(mover);

    if mover_type == PieceType::King {
        if let Some(side) = castle_side(before, mover, from, to) {
            return Ok(MoveKind::Castle {
                side,
                rook: side.rook(color),
            });
        }
    }

    let captured = board.piece_at(to).filter(|piece| piece.color() != color);

    if mover_type == PieceType::Pawn {
        if board.piece_at(to).is_none() {
            if let Some(victim) = en_passant_victim(before, mover, from, to) {
                return Ok(MoveKind::EnPassant { captured: victim });
            }
        }
        if to.row() == color.promotion_row() {
            return Ok(MoveKind::Promotion { captured });
        }
    }

    Ok(match captured {
        Some(captured) => MoveKind::Capture { captured },
        None => MoveKind::Quiet,
    })
}

/// 王横移两列、王和对应的车都未动过（易位权仍在且都在初始格）时为易位
fn castle_side(state: &State, king: Piece, from: ChessPos, to: ChessPos) -> Option<CastleSide> {
    if from.row() != to.row() || from != king.starting_pos() {
        return None;
    }
    let side = match to.col() as i8 - from.col() as i8 {
        2 => CastleSide::Kingside,
        -2 => CastleSide::Queenside,
        _ => return None,
    };
    let rook = side.rook(king.color());
    let intact = state.castling().has(king.color(), side)
        && to.col() == side.king_target_col()
        && state.board().position_of(rook) == Some(rook.starting_pos());
    intact.then_some(side)
}

/// 兵斜进到空格，且旁边是刚好停在双步落点上的对方兵
fn en_passant_victim(state: &State, pawn: Piece, from: ChessPos, to: ChessPos) -> Option<Piece> {
    let color = pawn.color();
    if from.row() != color.en_passant_row()
        || to.row() as i8 - from.row() as i8 != color.forward()
        || (to.col() as i8 - from.col() as i8).abs() != 1
    {
        return None;
    }
    let beside = ChessPos::new(to.col(), from.row())?;
    let victim = state.board().piece_at(beside)?;
    (victim.color() != color && state.effective_type(victim) == PieceType::Pawn).then_some(victim)
}
