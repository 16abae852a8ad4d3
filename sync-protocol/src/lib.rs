//! 国际象棋对局同步协议库
//!
//! 包含:
//! - 棋子、坐标、动作标记的解析与生成
//! - GameMessage 编解码（棋盘、走子方、易位权）
//! - 棋盘双索引（格子 → 棋子、棋子 → 位置）
//! - 升变记录与易位权跟踪
//! - 走子差异与走法分类
//! - 对局会话（历史、悔棋）与 JSON 棋谱

mod action;
mod board;
mod castling;
mod constants;
mod diff;
mod error;
mod game;
mod message;
mod piece;
mod promotion;
mod record;
mod state;

pub use action::{Action, ActionType};
pub use board::{Board, Location};
pub use castling::{CastleSide, CastlingRights};
pub use constants::*;
pub use diff::{classify, diff, Change, MoveKind, TurnDifferences};
pub use error::{ChessError, ProtocolError, Result};
pub use game::{Game, TurnRecord};
pub use message::{GameMessage, INITIAL_MESSAGE};
pub use piece::{ChessPos, Color, Piece, PieceType};
pub use promotion::PawnRegistry;
pub use record::{GameMetadata, GameRecord, MoveRecord, RECORD_VERSION};
pub use state::{State, Transition};
