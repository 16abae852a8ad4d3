//! 棋子身份与棋盘坐标
//!
//! 棋子标记：`<颜色><兵种>[<编号>]`，例如 `WP5`、`BR2`、`WQ`。
//! 坐标标记：`[A-H][1-8]`，例如 `E4`。

use std::cmp::Ordering;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH, PIECES_PER_COLOR, PIECE_COUNT};
use crate::error::{ChessError, Result};

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    /// 白方（先手，在下方）
    White,
    /// 黑方（后手，在上方）
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 获取标记字符
    pub fn to_char(&self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }

    /// 从标记字符解析
    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'W' => Some(Color::White),
            'B' => Some(Color::Black),
            _ => None,
        }
    }

    /// 底线所在行（0 起）
    pub fn back_row(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// 兵的初始行
    pub fn pawn_row(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// 兵的升变行（对方底线）
    pub fn promotion_row(&self) -> u8 {
        self.opponent().back_row()
    }

    /// 能吃过路兵时兵所在的行
    pub fn en_passant_row(&self) -> u8 {
        match self {
            Color::White => 4,
            Color::Black => 3,
        }
    }

    /// 兵的前进方向
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

/// 兵种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// 获取标记字符
    pub fn to_char(&self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    /// 从标记字符解析
    pub fn from_char(c: char) -> Option<PieceType> {
        match c {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// 同方有多个同类棋子，标记需要带编号
    pub fn is_numbered(&self) -> bool {
        matches!(
            self,
            PieceType::Pawn | PieceType::Knight | PieceType::Bishop | PieceType::Rook
        )
    }

    /// 编号上限
    pub fn max_instance(&self) -> u8 {
        match self {
            PieceType::Pawn => 8,
            PieceType::Knight | PieceType::Bishop | PieceType::Rook => 2,
            PieceType::Queen | PieceType::King => 0,
        }
    }

    /// 兵能否升变为该兵种
    pub fn is_promotion_target(&self) -> bool {
        matches!(
            self,
            PieceType::Knight | PieceType::Bishop | PieceType::Rook | PieceType::Queen
        )
    }
}

/// 底线布局（A 列到 H 列），编号 1 在后翼、2 在王翼
const BACK_RANK: [(PieceType, Option<u8>); 8] = [
    (PieceType::Rook, Some(1)),
    (PieceType::Knight, Some(1)),
    (PieceType::Bishop, Some(1)),
    (PieceType::Queen, None),
    (PieceType::King, None),
    (PieceType::Bishop, Some(2)),
    (PieceType::Knight, Some(2)),
    (PieceType::Rook, Some(2)),
];

/// 棋子身份
///
/// 身份在整局中不变：升变只改变有效兵种（记录在 [`crate::PawnRegistry`]），被吃只改变存活状态。
/// 排序与 [`Piece::index`] 一致，也就是棋盘段里的编码顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
    base_type: PieceType,
    instance: Option<u8>,
}

impl Piece {
    /// 创建棋子身份，编号不合法时返回 None
    pub fn new(color: Color, base_type: PieceType, instance: Option<u8>) -> Option<Self> {
        let valid = match instance {
            Some(n) => base_type.is_numbered() && (1..=base_type.max_instance()).contains(&n),
            None => !base_type.is_numbered(),
        };
        valid.then_some(Self {
            color,
            base_type,
            instance,
        })
    }

    /// 第 n 个兵（1-8，按初始列 A..H）
    pub fn pawn(color: Color, n: u8) -> Option<Self> {
        Self::new(color, PieceType::Pawn, Some(n))
    }

    /// 王
    pub const fn king(color: Color) -> Self {
        Self {
            color,
            base_type: PieceType::King,
            instance: None,
        }
    }

    /// 后
    pub const fn queen(color: Color) -> Self {
        Self {
            color,
            base_type: PieceType::Queen,
            instance: None,
        }
    }

    /// 车（1 为后翼车，2 为王翼车）
    pub(crate) const fn rook(color: Color, instance: u8) -> Self {
        Self {
            color,
            base_type: PieceType::Rook,
            instance: Some(instance),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// 初始兵种（不考虑升变）
    pub fn base_type(&self) -> PieceType {
        self.base_type
    }

    pub fn instance(&self) -> Option<u8> {
        self.instance
    }

    /// 在 32 个身份中的序号：白方底线、白兵、黑方底线、黑兵
    pub fn index(&self) -> usize {
        let offset = match self.color {
            Color::White => 0,
            Color::Black => PIECES_PER_COLOR,
        };
        let queenside = self.instance == Some(1);
        let slot = match self.base_type {
            PieceType::Pawn => 7 + self.instance.unwrap_or(1) as usize,
            PieceType::Rook => if queenside { 0 } else { 7 },
            PieceType::Knight => if queenside { 1 } else { 6 },
            PieceType::Bishop => if queenside { 2 } else { 5 },
            PieceType::Queen => 3,
            PieceType::King => 4,
        };
        offset + slot
    }

    /// 从序号还原身份
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= PIECE_COUNT {
            return None;
        }
        let color = if index < PIECES_PER_COLOR {
            Color::White
        } else {
            Color::Black
        };
        let slot = index % PIECES_PER_COLOR;
        let (base_type, instance) = if slot < 8 {
            BACK_RANK[slot]
        } else {
            (PieceType::Pawn, Some((slot - 7) as u8))
        };
        Some(Self {
            color,
            base_type,
            instance,
        })
    }

    /// 按编码顺序遍历全部 32 个身份
    pub fn all() -> impl Iterator<Item = Piece> {
        (0..PIECE_COUNT).filter_map(Piece::from_index)
    }

    /// 初始位置
    pub fn starting_pos(&self) -> ChessPos {
        let slot = self.index() % PIECES_PER_COLOR;
        if slot < 8 {
            ChessPos::new_unchecked(slot as u8, self.color.back_row())
        } else {
            ChessPos::new_unchecked((slot - 8) as u8, self.color.pawn_row())
        }
    }

    /// 解析棋子标记
    ///
    /// 颜色总在第一位、兵种在第二位，所以 `BB1` 是黑方的 1 号象。
    pub fn decode(token: &str) -> Result<Self> {
        let malformed = || ChessError::MalformedPiece {
            token: token.to_string(),
        };

        let mut chars = token.chars();
        let color = chars.next().and_then(Color::from_char).ok_or_else(malformed)?;
        let base_type = chars
            .next()
            .and_then(PieceType::from_char)
            .ok_or_else(malformed)?;
        let instance = match chars.next() {
            Some(c) => Some(c.to_digit(10).ok_or_else(malformed)? as u8),
            None => None,
        };
        if chars.next().is_some() {
            return Err(malformed());
        }

        Self::new(color, base_type, instance).ok_or_else(malformed)
    }

    /// 生成棋子标记
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl PartialOrd for Piece {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Piece {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color.to_char(), self.base_type.to_char())?;
        if let Some(n) = self.instance {
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Piece::decode(&token).map_err(de::Error::custom)
    }
}

/// 棋盘坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChessPos {
    /// 列 (0-7，对应 A-H)
    col: u8,
    /// 行 (0-7，对应 1-8)
    row: u8,
}

impl ChessPos {
    /// 创建新坐标
    pub fn new(col: u8, row: u8) -> Option<Self> {
        if (col as usize) < BOARD_WIDTH && (row as usize) < BOARD_HEIGHT {
            Some(Self { col, row })
        } else {
            None
        }
    }

    /// 创建新坐标（不检查边界，内部使用）
    pub(crate) const fn new_unchecked(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    /// 列字母
    pub fn column_char(&self) -> char {
        (b'A' + self.col) as char
    }

    /// 行号（1-8）
    pub fn row_number(&self) -> u8 {
        self.row + 1
    }

    /// 获取偏移后的坐标
    pub fn offset(&self, dc: i8, dr: i8) -> Option<ChessPos> {
        let col = (self.col as i8).checked_add(dc)?;
        let row = (self.row as i8).checked_add(dr)?;
        if col < 0 || row < 0 {
            return None;
        }
        ChessPos::new(col as u8, row as u8)
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_WIDTH + self.col as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_WIDTH * BOARD_HEIGHT {
            Some(Self {
                col: (index % BOARD_WIDTH) as u8,
                row: (index / BOARD_WIDTH) as u8,
            })
        } else {
            None
        }
    }

    /// 解析坐标标记，必须恰好是 `[A-H][1-8]`
    pub fn decode(token: &str) -> Result<Self> {
        match token.as_bytes() {
            [c @ b'A'..=b'H', r @ b'1'..=b'8'] => Ok(Self {
                col: c - b'A',
                row: r - b'1',
            }),
            _ => Err(ChessError::MalformedPosition {
                token: token.to_string(),
            }),
        }
    }

    /// 生成坐标标记
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChessPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_char(), self.row_number())
    }
}

impl Serialize for ChessPos {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChessPos {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        ChessPos::decode(&token).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pos() {
        assert_eq!(ChessPos::decode("A1"), Ok(ChessPos::new_unchecked(0, 0)));
        assert_eq!(ChessPos::decode("H8"), Ok(ChessPos::new_unchecked(7, 7)));
        assert_eq!(ChessPos::decode("E4").unwrap().encode(), "E4");

        for bad in ["", "A", "A9", "I1", "a1", "A10", "1A", "É1"] {
            assert_eq!(
                ChessPos::decode(bad),
                Err(ChessError::MalformedPosition { token: bad.to_string() })
            );
        }
    }

    #[test]
    fn test_pos_roundtrip_all_squares() {
        for index in 0..64 {
            let pos = ChessPos::from_index(index).unwrap();
            assert_eq!(ChessPos::decode(&pos.encode()), Ok(pos));
            assert_eq!(pos.to_index(), index);
        }
    }

    #[test]
    fn test_pos_offset() {
        let pos = ChessPos::decode("A1").unwrap();
        assert_eq!(pos.offset(1, 1), ChessPos::decode("B2").ok());
        assert_eq!(pos.offset(-1, 0), None);
        assert_eq!(ChessPos::decode("H8").unwrap().offset(0, 1), None);
        // 大偏移量不溢出
        assert_eq!(ChessPos::decode("H8").unwrap().offset(i8::MAX, 0), None);
        assert_eq!(pos.offset(0, i8::MIN), None);
    }

    #[test]
    fn test_decode_piece() {
        let piece = Piece::decode("WP5").unwrap();
        assert_eq!(piece.color(), Color::White);
        assert_eq!(piece.base_type(), PieceType::Pawn);
        assert_eq!(piece.instance(), Some(5));

        // 颜色在前、兵种在后：B 既可以是黑方也可以是象
        let piece = Piece::decode("BB1").unwrap();
        assert_eq!(piece.color(), Color::Black);
        assert_eq!(piece.base_type(), PieceType::Bishop);

        assert_eq!(Piece::decode("WQ"), Ok(Piece::queen(Color::White)));
        assert_eq!(Piece::decode("BK"), Ok(Piece::king(Color::Black)));
    }

    #[test]
    fn test_decode_piece_rejects_bad_shapes() {
        let bad_tokens = [
            "", "W", "WP", "WN", "WQ1", "BK2", "WP9", "WP0", "WR3", "XP1", "wp1", "WP12", "WX1",
        ];
        for bad in bad_tokens {
            assert_eq!(
                Piece::decode(bad),
                Err(ChessError::MalformedPiece { token: bad.to_string() }),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_piece_index_roundtrip() {
        let pieces: Vec<Piece> = Piece::all().collect();
        assert_eq!(pieces.len(), PIECE_COUNT);
        for (index, piece) in pieces.iter().enumerate() {
            assert_eq!(piece.index(), index);
            assert_eq!(Piece::decode(&piece.encode()), Ok(*piece));
        }
    }

    #[test]
    fn test_starting_pos() {
        assert_eq!(Piece::king(Color::White).starting_pos().encode(), "E1");
        assert_eq!(Piece::queen(Color::Black).starting_pos().encode(), "D8");
        assert_eq!(Piece::decode("WR2").unwrap().starting_pos().encode(), "H1");
        assert_eq!(Piece::decode("BN1").unwrap().starting_pos().encode(), "B8");
        assert_eq!(Piece::pawn(Color::Black, 3).unwrap().starting_pos().encode(), "C7");
    }

    #[test]
    fn test_color_rows() {
        assert_eq!(Color::White.promotion_row(), 7);
        assert_eq!(Color::Black.promotion_row(), 0);
        assert_eq!(Color::White.opponent(), Color::Black);
    }
}
