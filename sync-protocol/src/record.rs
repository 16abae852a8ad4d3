//! 棋谱记录格式
//!
//! JSON 格式的棋谱，只保存初始局面和每步的棋子/动作标记，可以重放出完整对局

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::{ChessError, ProtocolError};
use crate::game::Game;
use crate::message::INITIAL_MESSAGE;
use crate::piece::Piece;

/// 棋谱版本
pub const RECORD_VERSION: &str = "1.0";

/// 对局元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    /// 白方玩家名
    pub white_player: String,
    /// 黑方玩家名
    pub black_player: String,
    /// 对局日期
    pub date: String,
}

/// 走法记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub mover: Piece,
    pub action: Action,
}

/// 完整的棋谱记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// 版本号
    pub version: String,
    /// 元数据
    pub metadata: GameMetadata,
    /// 初始局面
    pub initial_message: String,
    /// 走法列表
    pub moves: Vec<MoveRecord>,
    /// 最终局面（可选，重放时用于校验）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_message: Option<String>,
}

impl GameRecord {
    /// 创建新的棋谱记录
    pub fn new(white_player: String, black_player: String) -> Self {
        Self {
            version: RECORD_VERSION.to_string(),
            metadata: GameMetadata {
                white_player,
                black_player,
                date: Utc::now().format("%Y-%m-%d").to_string(),
            },
            initial_message: INITIAL_MESSAGE.to_string(),
            moves: Vec::new(),
            final_message: None,
        }
    }

    /// 从对局会话生成
    pub fn from_game(game: &Game, white_player: String, black_player: String) -> Self {
        let mut record = Self::new(white_player, black_player);
        record.initial_message = game.initial_message().to_string();
        record.moves = game
            .history()
            .iter()
            .map(|turn| MoveRecord {
                mover: turn.mover,
                action: turn.action,
            })
            .collect();
        record.final_message = Some(game.message());
        record
    }

    /// 添加走法
    pub fn add_move(&mut self, mover: Piece, action: Action) {
        self.moves.push(MoveRecord { mover, action });
    }

    /// 重放棋谱，得到对局会话
    pub fn replay(&self) -> Result<Game, ProtocolError> {
        let mut game = Game::from_message(&self.initial_message)?;
        for mv in &self.moves {
            game.play(mv.mover, mv.action)?;
        }

        if let Some(expected) = &self.final_message {
            let actual = game.message();
            if actual != *expected {
                return Err(ChessError::InconsistentState {
                    reason: format!("replay ended at {:?}, record says {:?}", actual, expected),
                }
                .into());
            }
        }

        Ok(game)
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
