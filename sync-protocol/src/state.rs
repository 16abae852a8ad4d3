//! 对局状态

use tracing::{debug, warn};

use crate::action::{Action, ActionType};
use crate::board::Board;
use crate::castling::CastlingRights;
use crate::diff::{classify, diff, MoveKind, TurnDifferences};
use crate::error::{ChessError, Result};
use crate::piece::{ChessPos, Color, Piece, PieceType};
use crate::promotion::PawnRegistry;

/// 一步棋的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: MoveKind,
    pub differences: TurnDifferences,
}

/// 完整的对局状态（棋盘双索引、走子方、易位权、升变记录）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    board: Board,
    side_to_move: Color,
    castling: CastlingRights,
    promotions: PawnRegistry,
}

impl State {
    /// 创建初始状态
    pub fn initial() -> Self {
        Self {
            board: Board::initial(),
            side_to_move: Color::White,
            castling: CastlingRights::all(),
            promotions: PawnRegistry::new(),
        }
    }

    pub(crate) fn from_parts(
        board: Board,
        side_to_move: Color,
        castling: CastlingRights,
        promotions: PawnRegistry,
    ) -> Self {
        Self {
            board,
            side_to_move,
            castling,
            promotions,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn promotions(&self) -> &PawnRegistry {
        &self.promotions
    }

    /// 棋子的有效兵种（考虑升变）
    pub fn effective_type(&self, piece: Piece) -> PieceType {
        self.promotions.effective_type(piece)
    }

    /// 执行一个动作
    ///
    /// 失败时状态保持不变。
    pub fn apply(&mut self, mover: Piece, action: Action) -> Result<Transition> {
        let (next, transition) = self.transition(mover, action)?;
        *self = next;
        Ok(transition)
    }

    /// 计算执行动作后的结果，但不修改当前状态
    pub fn preview(&self, mover: Piece, action: Action) -> Result<Transition> {
        self.transition(mover, action).map(|(_, transition)| transition)
    }

    pub(crate) fn transition(&self, mover: Piece, action: Action) -> Result<(State, Transition)> {
        let reject = |reason: &'static str| {
            warn!("拒绝动作 {} {}: {}", mover, action, reason);
            ChessError::RejectedAction {
                piece: mover.to_string(),
                action: action.to_string(),
                reason,
            }
        };

        if mover.color() != self.side_to_move {
            return Err(ChessError::NotYourTurn {
                piece: mover.to_string(),
            });
        }
        let from = self
            .board
            .position_of(mover)
            .ok_or_else(|| reject("mover is not on the board"))?;
        let to = action.target;
        if matches!(self.board.piece_at(to), Some(occupant) if occupant.color() == mover.color()) {
            return Err(reject("target square holds a friendly piece"));
        }

        let kind = classify(&action, self, mover)?;
        if !kind.agrees_with(action.action_type) {
            return Err(match action.action_type {
                ActionType::CastleKingside | ActionType::CastleQueenside => {
                    reject("castling is not available")
                }
                _ => reject("action does not match the position"),
            });
        }

        let mut next = self.clone();
        let captured = match kind {
            MoveKind::Quiet => next.board.apply_move(mover, from, to, false)?,
            MoveKind::Capture { .. } => next.board.apply_move(mover, from, to, true)?,
            MoveKind::EnPassant { captured } => {
                let beside = self
                    .board
                    .position_of(captured)
                    .ok_or_else(|| reject("en passant victim is not on the board"))?;
                next.board.capture_at(beside)?;
                next.board.apply_move(mover, from, to, false)?;
                Some(captured)
            }
            MoveKind::Castle { side, rook } => {
                let rook_from = rook.starting_pos();
                if !self.castling_path_clear(from, rook_from) {
                    return Err(reject("castling path is blocked"));
                }
                let rook_to = ChessPos::new(side.rook_target_col(), from.row())
                    .ok_or_else(|| reject("castling rook has no target square"))?;
                next.board.apply_move(mover, from, to, false)?;
                next.board.apply_move(rook, rook_from, rook_to, false)?;
                None
            }
            MoveKind::Promotion { captured } => {
                let new_type = action
                    .action_type
                    .promotion()
                    .ok_or_else(|| reject("promotion needs a target piece type"))?;
                next.board.apply_move(mover, from, to, captured.is_some())?;
                next.promotions.promote(&next.board, mover, new_type)?;
                captured
            }
        };

        next.castling.record_move(mover, captured);
        next.side_to_move = self.side_to_move.opponent();

        let differences = diff(self, &next);
        debug!("{} {} => {:?}, {} 个棋子位置变化", mover, action, kind, differences.len());

        Ok((next, Transition { kind, differences }))
    }

    /// 王和车之间的格子必须都为空
    fn castling_path_clear(&self, king_from: ChessPos, rook_from: ChessPos) -> bool {
        let (low, high) = if king_from.col() < rook_from.col() {
            (king_from.col(), rook_from.col())
        } else {
            (rook_from.col(), king_from.col())
        };
        ((low + 1)..high).all(|col| {
            ChessPos::new(col, king_from.row())
                .map(|pos| self.board.piece_at(pos).is_none())
                .unwrap_or(false)
        })
    }

    /// 撤销一步：按差异倒退棋盘、恢复易位权、取消本步的升变
    pub(crate) fn revert(
        &mut self,
        differences: &TurnDifferences,
        castling: CastlingRights,
        promoted: Option<Piece>,
    ) -> Result<()> {
        let mut previous = self.clone();
        previous.board.revert(differences)?;
        if let Some(pawn) = promoted {
            previous.promotions.revoke(pawn);
        }
        previous.castling = castling;
        previous.side_to_move = self.side_to_move.opponent();
        *self = previous;
        Ok(())
    }
}

impl Default for State {
    fn default() -> Self {
        Self::initial()
    }
}
