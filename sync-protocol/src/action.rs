//! 动作标记
//!
//! 格式：`<目标坐标><类型标记>`，例如 `E4M`、`D5X`、`G1OO`、`E8=Q`、`F8X=N`。
//! 动作本身不含走子的棋子，由调用方另外提供。

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{
    TAG_CAPTURE, TAG_CASTLE_KINGSIDE, TAG_CASTLE_QUEENSIDE, TAG_EN_PASSANT, TAG_MOVE, TAG_PROMOTE,
};
use crate::error::{ChessError, Result};
use crate::piece::{ChessPos, PieceType};

/// 动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// 普通移动
    Move,
    /// 吃子
    Capture,
    /// 王翼易位
    CastleKingside,
    /// 后翼易位
    CastleQueenside,
    /// 吃过路兵
    EnPassant,
    /// 升变
    Promote(PieceType),
    /// 吃子并升变
    CapturePromote(PieceType),
}

impl ActionType {
    /// 从类型标记解析
    pub fn from_tag(tag: &str) -> Option<ActionType> {
        let action_type = match tag {
            TAG_MOVE => ActionType::Move,
            TAG_CAPTURE => ActionType::Capture,
            TAG_CASTLE_KINGSIDE => ActionType::CastleKingside,
            TAG_CASTLE_QUEENSIDE => ActionType::CastleQueenside,
            TAG_EN_PASSANT => ActionType::EnPassant,
            _ => {
                if let Some(rest) = tag.strip_prefix(TAG_CAPTURE) {
                    ActionType::CapturePromote(Self::promotion_target(rest)?)
                } else {
                    ActionType::Promote(Self::promotion_target(tag)?)
                }
            }
        };
        Some(action_type)
    }

    /// 解析 `=Q` 这样的升变后缀
    fn promotion_target(tag: &str) -> Option<PieceType> {
        let mut chars = tag.strip_prefix(TAG_PROMOTE)?.chars();
        let piece_type = chars.next().and_then(PieceType::from_char)?;
        if chars.next().is_some() || !piece_type.is_promotion_target() {
            return None;
        }
        Some(piece_type)
    }

    /// 生成类型标记
    pub fn tag(&self) -> String {
        match self {
            ActionType::Move => TAG_MOVE.to_string(),
            ActionType::Capture => TAG_CAPTURE.to_string(),
            ActionType::CastleKingside => TAG_CASTLE_KINGSIDE.to_string(),
            ActionType::CastleQueenside => TAG_CASTLE_QUEENSIDE.to_string(),
            ActionType::EnPassant => TAG_EN_PASSANT.to_string(),
            ActionType::Promote(t) => format!("{}{}", TAG_PROMOTE, t.to_char()),
            ActionType::CapturePromote(t) => {
                format!("{}{}{}", TAG_CAPTURE, TAG_PROMOTE, t.to_char())
            }
        }
    }

    /// 升变目标兵种（如果有）
    pub fn promotion(&self) -> Option<PieceType> {
        match self {
            ActionType::Promote(t) | ActionType::CapturePromote(t) => Some(*t),
            _ => None,
        }
    }
}

/// 动作：目标坐标 + 动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    pub target: ChessPos,
    pub action_type: ActionType,
}

impl Action {
    pub fn new(target: ChessPos, action_type: ActionType) -> Self {
        Self {
            target,
            action_type,
        }
    }

    /// 解析动作标记
    pub fn decode(token: &str) -> Result<Self> {
        let malformed = || ChessError::MalformedAction {
            token: token.to_string(),
        };

        if token.len() < 3 || !token.is_char_boundary(2) {
            return Err(malformed());
        }
        let (pos, tag) = token.split_at(2);
        let target = ChessPos::decode(pos).map_err(|_| malformed())?;
        let action_type = ActionType::from_tag(tag).ok_or_else(malformed)?;

        Ok(Self {
            target,
            action_type,
        })
    }

    /// 生成动作标记
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.target, self.action_type.tag())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Action::decode(&token).map_err(de::Error::custom)
    }
}
