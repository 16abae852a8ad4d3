//! 棋盘双索引
//!
//! 同时维护“格子 → 棋子”和“棋子 → 位置”两张表，并保证二者在存活棋子上互为逆映射。
//! 外部只能通过这里的操作修改棋盘，不能单独改写其中一张表。

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::constants::{PIECE_COUNT, SQUARE_COUNT};
use crate::diff::TurnDifferences;
use crate::error::{ChessError, Result};
use crate::piece::{ChessPos, Color, Piece};

/// 棋子所在位置：棋盘上某格，或已被吃
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    OnBoard(ChessPos),
    Captured,
}

impl Location {
    pub fn square(&self) -> Option<ChessPos> {
        match self {
            Location::OnBoard(pos) => Some(*pos),
            Location::Captured => None,
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, Location::Captured)
    }
}

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// 8x8 棋盘，索引为 row * 8 + col
    squares: [Option<Piece>; SQUARE_COUNT],
    /// 按 [`Piece::index`] 排列的全部 32 个棋子位置，被吃的棋子也保留
    positions: [Location; PIECE_COUNT],
}

impl Board {
    /// 创建空棋盘（所有棋子都不在棋盘上）
    pub fn empty() -> Self {
        Self {
            squares: [None; SQUARE_COUNT],
            positions: [Location::Captured; PIECE_COUNT],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for piece in Piece::all() {
            let pos = piece.starting_pos();
            board.squares[pos.to_index()] = Some(piece);
            board.positions[piece.index()] = Location::OnBoard(pos);
        }
        board
    }

    /// 获取指定格子上的棋子
    pub fn piece_at(&self, pos: ChessPos) -> Option<Piece> {
        self.squares[pos.to_index()]
    }

    /// 获取棋子的位置
    pub fn location_of(&self, piece: Piece) -> Location {
        self.positions[piece.index()]
    }

    /// 获取存活棋子所在的格子
    pub fn position_of(&self, piece: Piece) -> Option<ChessPos> {
        self.location_of(piece).square()
    }

    /// 遍历所有被占据的格子
    pub fn occupied(&self) -> impl Iterator<Item = (ChessPos, Piece)> + '_ {
        self.squares.iter().enumerate().filter_map(|(index, piece)| {
            let piece = (*piece)?;
            ChessPos::from_index(index).map(|pos| (pos, piece))
        })
    }

    /// 按编码顺序遍历全部棋子及其位置（包括被吃的）
    pub fn positions(&self) -> impl Iterator<Item = (Piece, Location)> + '_ {
        Piece::all().map(move |piece| (piece, self.location_of(piece)))
    }

    /// 获取指定阵营的所有存活棋子
    pub fn live_pieces(&self, color: Color) -> Vec<(Piece, ChessPos)> {
        self.positions()
            .filter(|(piece, _)| piece.color() == color)
            .filter_map(|(piece, location)| location.square().map(|pos| (piece, pos)))
            .collect()
    }

    /// 把一个不在棋盘上的棋子放到空格上（解码时使用）
    pub(crate) fn place(&mut self, piece: Piece, pos: ChessPos) -> Result<()> {
        if let Some(occupant) = self.piece_at(pos) {
            return Err(inconsistent(format!("{} is already occupied by {}", pos, occupant)));
        }
        if let Location::OnBoard(current) = self.location_of(piece) {
            return Err(inconsistent(format!("{} is already on {}", piece, current)));
        }
        self.squares[pos.to_index()] = Some(piece);
        self.positions[piece.index()] = Location::OnBoard(pos);
        self.debug_check();
        Ok(())
    }

    /// 移动棋子
    ///
    /// `is_capture` 为真时目标格必须有对方棋子，它会先被移出棋盘；为假时目标格必须为空。
    /// 返回被吃的棋子。
    pub fn apply_move(
        &mut self,
        piece: Piece,
        from: ChessPos,
        to: ChessPos,
        is_capture: bool,
    ) -> Result<Option<Piece>> {
        if self.location_of(piece) != Location::OnBoard(from) {
            return Err(inconsistent(format!("{} is not on {}", piece, from)));
        }
        if from == to {
            return Err(inconsistent(format!("{} cannot move onto its own square", piece)));
        }

        let captured = match (self.piece_at(to), is_capture) {
            (Some(victim), true) if victim.color() != piece.color() => Some(victim),
            (None, false) => None,
            (Some(occupant), _) => {
                return Err(inconsistent(format!(
                    "{} cannot move onto {} held by {}",
                    piece, to, occupant
                )));
            }
            (None, true) => {
                return Err(inconsistent(format!("nothing to capture on {}", to)));
            }
        };

        if let Some(victim) = captured {
            self.positions[victim.index()] = Location::Captured;
        }
        self.squares[from.to_index()] = None;
        self.squares[to.to_index()] = Some(piece);
        self.positions[piece.index()] = Location::OnBoard(to);
        self.debug_check();

        Ok(captured)
    }

    /// 移除指定格子上的棋子（吃过路兵时被吃的兵不在目标格上）
    pub fn capture_at(&mut self, pos: ChessPos) -> Result<Piece> {
        let victim = self
            .piece_at(pos)
            .ok_or_else(|| inconsistent(format!("nothing to capture on {}", pos)))?;
        self.squares[pos.to_index()] = None;
        self.positions[victim.index()] = Location::Captured;
        self.debug_check();
        Ok(victim)
    }

    /// 按走子差异倒退一步：每个变动的棋子回到原位置
    pub(crate) fn revert(&mut self, differences: &TurnDifferences) -> Result<()> {
        for (piece, change) in differences.iter() {
            if self.location_of(piece) != change.curr {
                return Err(inconsistent(format!(
                    "{} is not where the turn left it ({:?})",
                    piece, change.curr
                )));
            }
        }

        // 先全部拿起再放回，易位时王和车可能交换经过的格子
        for (piece, change) in differences.iter() {
            if let Location::OnBoard(pos) = change.curr {
                self.squares[pos.to_index()] = None;
            }
            self.positions[piece.index()] = Location::Captured;
        }
        for (piece, change) in differences.iter() {
            if let Location::OnBoard(pos) = change.last {
                self.place(piece, pos)?;
            }
        }

        self.check_consistency()
    }

    /// 检查两张表是否互为逆映射
    pub fn check_consistency(&self) -> Result<()> {
        for (pos, piece) in self.occupied() {
            if self.location_of(piece) != Location::OnBoard(pos) {
                return Err(inconsistent(format!(
                    "{} is on {} but indexed at {:?}",
                    piece,
                    pos,
                    self.location_of(piece)
                )));
            }
        }
        for (piece, location) in self.positions() {
            if let Location::OnBoard(pos) = location {
                if self.piece_at(pos) != Some(piece) {
                    return Err(inconsistent(format!(
                        "{} is indexed at {} but the square holds {:?}",
                        piece,
                        pos,
                        self.piece_at(pos)
                    )));
                }
            }
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.check_consistency(), Ok(()));
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

fn inconsistent(reason: String) -> ChessError {
    error!("棋盘状态不一致: {}", reason);
    ChessError::InconsistentState { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pos(token: &str) -> ChessPos {
        ChessPos::decode(token).unwrap()
    }

    fn piece(token: &str) -> Piece {
        Piece::decode(token).unwrap()
    }

    fn assert_inverse(board: &Board) {
        let mut seen = HashSet::new();
        for (square, piece) in board.occupied() {
            assert_eq!(board.location_of(piece), Location::OnBoard(square));
            assert!(seen.insert(piece), "{} appears twice", piece);
        }
        assert_eq!(board.check_consistency(), Ok(()));
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();

        assert_eq!(board.piece_at(pos("E1")), Some(Piece::king(Color::White)));
        assert_eq!(board.piece_at(pos("D8")), Some(Piece::queen(Color::Black)));
        assert_eq!(board.piece_at(pos("A2")), Some(piece("WP1")));
        assert_eq!(board.piece_at(pos("E4")), None);

        assert_eq!(board.live_pieces(Color::White).len(), 16);
        assert_eq!(board.live_pieces(Color::Black).len(), 16);
        assert_inverse(&board);
    }

    #[test]
    fn test_apply_move() {
        let mut board = Board::initial();

        let captured = board.apply_move(piece("WP5"), pos("E2"), pos("E4"), false).unwrap();
        assert!(captured.is_none());
        assert_eq!(board.piece_at(pos("E2")), None);
        assert_eq!(board.position_of(piece("WP5")), Some(pos("E4")));
        assert_inverse(&board);
    }

    #[test]
    fn test_capture_keeps_identity() {
        let mut board = Board::initial();
        board.apply_move(piece("WP5"), pos("E2"), pos("E4"), false).unwrap();
        board.apply_move(piece("BP4"), pos("D7"), pos("D5"), false).unwrap();

        let captured = board.apply_move(piece("WP5"), pos("E4"), pos("D5"), true).unwrap();
        assert_eq!(captured, Some(piece("BP4")));
        assert_eq!(board.location_of(piece("BP4")), Location::Captured);
        assert_eq!(board.piece_at(pos("D5")), Some(piece("WP5")));
        assert_eq!(board.positions().count(), PIECE_COUNT);
        assert_inverse(&board);
    }

    #[test]
    fn test_apply_move_rejects_bad_sequences() {
        let mut board = Board::initial();

        // 起点不对
        assert!(matches!(
            board.apply_move(piece("WP5"), pos("E3"), pos("E4"), false),
            Err(ChessError::InconsistentState { .. })
        ));
        // 目标格有己方棋子
        assert!(matches!(
            board.apply_move(piece("WR1"), pos("A1"), pos("A2"), true),
            Err(ChessError::InconsistentState { .. })
        ));
        // 声明吃子但目标格为空
        assert!(matches!(
            board.apply_move(piece("WP5"), pos("E2"), pos("E4"), true),
            Err(ChessError::InconsistentState { .. })
        ));
        // 失败时棋盘不变
        assert_eq!(board, Board::initial());
    }

    #[test]
    fn test_capture_at() {
        let mut board = Board::initial();
        let victim = board.capture_at(pos("H7")).unwrap();
        assert_eq!(victim, piece("BP8"));
        assert_eq!(board.location_of(victim), Location::Captured);
        assert!(board.capture_at(pos("H7")).is_err());
        assert_inverse(&board);
    }

    #[test]
    fn test_place() {
        let mut board = Board::empty();
        board.place(Piece::king(Color::White), pos("E1")).unwrap();
        assert!(board.place(Piece::king(Color::Black), pos("E1")).is_err());
        assert!(board.place(Piece::king(Color::White), pos("E2")).is_err());
        assert_inverse(&board);
    }
}
