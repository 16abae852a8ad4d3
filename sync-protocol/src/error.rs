//! 错误类型定义

use thiserror::Error;

/// 对局状态错误
///
/// 解码类错误都携带出错的子串（以及可定位时的下标），调用方据此自行决定如何提示用户。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 无效的位置标记
    #[error("Malformed position: {token:?}")]
    MalformedPosition { token: String },

    /// 无效的棋子标记
    #[error("Malformed piece: {token:?}")]
    MalformedPiece { token: String },

    /// 无效的动作标记
    #[error("Malformed action: {token:?}")]
    MalformedAction { token: String },

    /// 消息段数不对
    #[error("Malformed game message: expected 3 sections, got {sections}")]
    MalformedMessage { sections: usize },

    /// 棋盘段无效
    #[error("Malformed board section at index {index}: {found:?}")]
    MalformedBoardSection { index: usize, found: String },

    /// 走子方无效
    #[error("Malformed turn color: {found:?}")]
    MalformedTurnColor { found: String },

    /// 易位权段无效
    #[error("Malformed castling section at index {index}: {found:?}")]
    MalformedCastlingSection { index: usize, found: String },

    /// 非法升变
    #[error("Invalid promotion of {piece}: {reason}")]
    InvalidPromotion { piece: String, reason: &'static str },

    /// 棋盘与位置索引不一致（调用方的修改序列有误）
    #[error("Inconsistent state: {reason}")]
    InconsistentState { reason: String },

    /// 不是该棋子所属方的回合
    #[error("Not your turn: {piece} cannot move")]
    NotYourTurn { piece: String },

    /// 动作不满足局部前置条件
    #[error("Rejected action {action} for {piece}: {reason}")]
    RejectedAction {
        piece: String,
        action: String,
        reason: &'static str,
    },

    /// 没有可撤销的回合
    #[error("Nothing to undo")]
    NothingToUndo,
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 对局状态错误
    #[error("Chess error: {0}")]
    Chess(#[from] ChessError),
}

/// 对局操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
