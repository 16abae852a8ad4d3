//! 兵的升变记录

use std::collections::BTreeMap;

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::piece::{Piece, PieceType};

/// 升变登记表：兵的身份 → 升变后的兵种
///
/// 没有记录表示仍是兵（或本来就不是兵）。正常对局中只增不减。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PawnRegistry {
    promoted: BTreeMap<Piece, PieceType>,
}

impl PawnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 有效兵种：有升变记录取记录，否则取初始兵种
    pub fn effective_type(&self, piece: Piece) -> PieceType {
        self.promoted
            .get(&piece)
            .copied()
            .unwrap_or_else(|| piece.base_type())
    }

    /// 是否已升变
    pub fn is_promoted(&self, piece: Piece) -> bool {
        self.promoted.contains_key(&piece)
    }

    /// 升变：棋子必须仍是兵、已到达对方底线，目标兵种不能是王或兵
    pub fn promote(&mut self, board: &Board, piece: Piece, new_type: PieceType) -> Result<()> {
        let invalid = |reason: &'static str| ChessError::InvalidPromotion {
            piece: piece.to_string(),
            reason,
        };

        if self.effective_type(piece) != PieceType::Pawn {
            return Err(invalid("piece is not a pawn"));
        }
        if !new_type.is_promotion_target() {
            return Err(invalid("pawns promote to knight, bishop, rook or queen"));
        }
        match board.position_of(piece) {
            Some(pos) if pos.row() == piece.color().promotion_row() => {}
            _ => return Err(invalid("pawn has not reached its farthest rank")),
        }

        self.promoted.insert(piece, new_type);
        Ok(())
    }

    /// 按编码顺序遍历升变记录
    pub fn iter(&self) -> impl Iterator<Item = (Piece, PieceType)> + '_ {
        self.promoted.iter().map(|(piece, piece_type)| (*piece, *piece_type))
    }

    pub fn len(&self) -> usize {
        self.promoted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promoted.is_empty()
    }

    /// 直接登记（解码已有局面时使用）
    pub(crate) fn insert(&mut self, piece: Piece, new_type: PieceType) {
        self.promoted.insert(piece, new_type);
    }

    /// 撤销升变（悔棋时使用）
    pub(crate) fn revoke(&mut self, piece: Piece) {
        self.promoted.remove(&piece);
    }
}
