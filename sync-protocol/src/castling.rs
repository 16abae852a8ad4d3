//! 易位权
//!
//! 四个独立标志，只会从保留变为失去。判断只依据王和车的身份是否移动过或被吃，不看棋盘几何。

use serde::{Deserialize, Serialize};

use crate::constants::{CASTLING_SECTION_LEN, RIGHT_KEPT, RIGHT_LOST};
use crate::error::{ChessError, Result};
use crate::piece::{Color, Piece, PieceType};

/// 易位方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// 该方向上参与易位的车
    pub fn rook(&self, color: Color) -> Piece {
        match self {
            CastleSide::Queenside => Piece::rook(color, 1),
            CastleSide::Kingside => Piece::rook(color, 2),
        }
    }

    /// 易位后王所在的列
    pub fn king_target_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    /// 易位后车所在的列
    pub fn rook_target_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    /// 车身份对应的易位方向
    fn of_rook(rook: Piece) -> Option<CastleSide> {
        if rook.base_type() != PieceType::Rook {
            return None;
        }
        match rook.instance() {
            Some(1) => Some(CastleSide::Queenside),
            Some(2) => Some(CastleSide::Kingside),
            _ => None,
        }
    }
}

/// 易位权：白王翼、白后翼、黑王翼、黑后翼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    flags: [bool; 4],
}

impl CastlingRights {
    /// 四项全部保留
    pub fn all() -> Self {
        Self { flags: [true; 4] }
    }

    /// 四项全部失去
    pub fn none() -> Self {
        Self { flags: [false; 4] }
    }

    fn slot(color: Color, side: CastleSide) -> usize {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => 0,
            (Color::White, CastleSide::Queenside) => 1,
            (Color::Black, CastleSide::Kingside) => 2,
            (Color::Black, CastleSide::Queenside) => 3,
        }
    }

    /// 查询某方某方向的易位权
    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        self.flags[Self::slot(color, side)]
    }

    /// 永久取消某一项
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.flags[Self::slot(color, side)] = false;
    }

    /// 根据一步棋更新：走动的王或车，以及被吃掉的车
    pub fn record_move(&mut self, mover: Piece, captured: Option<Piece>) {
        match mover.base_type() {
            PieceType::King => {
                self.revoke(mover.color(), CastleSide::Kingside);
                self.revoke(mover.color(), CastleSide::Queenside);
            }
            PieceType::Rook => {
                if let Some(side) = CastleSide::of_rook(mover) {
                    self.revoke(mover.color(), side);
                }
            }
            _ => {}
        }

        if let Some(victim) = captured {
            if let Some(side) = CastleSide::of_rook(victim) {
                self.revoke(victim.color(), side);
            }
        }
    }

    /// 解析四字符易位权段
    pub fn decode(section: &str) -> Result<Self> {
        let mut flags = [false; 4];
        let mut count = 0;
        for (index, c) in section.chars().enumerate() {
            if index >= CASTLING_SECTION_LEN {
                return Err(ChessError::MalformedCastlingSection {
                    index,
                    found: section.to_string(),
                });
            }
            flags[index] = match c {
                RIGHT_KEPT => true,
                RIGHT_LOST => false,
                _ => {
                    return Err(ChessError::MalformedCastlingSection {
                        index,
                        found: c.to_string(),
                    });
                }
            };
            count += 1;
        }
        if count != CASTLING_SECTION_LEN {
            return Err(ChessError::MalformedCastlingSection {
                index: count,
                found: section.to_string(),
            });
        }
        Ok(Self { flags })
    }

    /// 生成易位权段
    pub fn encode(&self) -> String {
        self.flags
            .iter()
            .map(|&kept| if kept { RIGHT_KEPT } else { RIGHT_LOST })
            .collect()
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(token: &str) -> Piece {
        Piece::decode(token).unwrap()
    }

    #[test]
    fn test_decode_castling() {
        let rights = CastlingRights::decode("TFFT").unwrap();
        assert!(rights.has(Color::White, CastleSide::Kingside));
        assert!(!rights.has(Color::White, CastleSide::Queenside));
        assert!(!rights.has(Color::Black, CastleSide::Kingside));
        assert!(rights.has(Color::Black, CastleSide::Queenside));
        assert_eq!(rights.encode(), "TFFT");
    }

    #[test]
    fn test_decode_castling_rejects() {
        assert_eq!(
            CastlingRights::decode("TTXT"),
            Err(ChessError::MalformedCastlingSection { index: 2, found: "X".to_string() })
        );
        assert_eq!(
            CastlingRights::decode("TTT"),
            Err(ChessError::MalformedCastlingSection { index: 3, found: "TTT".to_string() })
        );
        assert!(CastlingRights::decode("TTTTT").is_err());
        assert!(CastlingRights::decode("").is_err());
        assert!(CastlingRights::decode("ttff").is_err());
    }

    #[test]
    fn test_king_move_revokes_both() {
        let mut rights = CastlingRights::all();
        rights.record_move(Piece::king(Color::White), None);
        assert_eq!(rights.encode(), "FFTT");
    }

    #[test]
    fn test_rook_move_revokes_one() {
        let mut rights = CastlingRights::all();
        rights.record_move(piece("BR1"), None);
        assert_eq!(rights.encode(), "TTTF");
        rights.record_move(piece("WR2"), None);
        assert_eq!(rights.encode(), "FTTF");
    }

    #[test]
    fn test_rook_capture_revokes_victim_side() {
        let mut rights = CastlingRights::all();
        rights.record_move(piece("WB2"), Some(piece("BR2")));
        assert_eq!(rights.encode(), "TTFT");
    }

    #[test]
    fn test_rights_never_return() {
        let mut rights = CastlingRights::decode("FFFF").unwrap();
        rights.record_move(piece("WN1"), Some(piece("BP1")));
        rights.record_move(Piece::queen(Color::Black), None);
        assert_eq!(rights, CastlingRights::none());
    }
}
