//! GameMessage 编解码
//!
//! 格式：`<棋盘> <走子方> <易位权>`
//!
//! 棋盘段固定 64 个字符，按棋子身份的固定顺序（白方底线 A1..H1、白兵 A2..H2、
//! 黑方底线 A8..H8、黑兵 A7..H7）每个身份占两个字符：
//!
//! | 标记 | 含义 |
//! |---|---|
//! | `[A-H][1-8]` | 在棋盘上，未升变 |
//! | `XX` | 已被吃，未升变 |
//! | `[A-H][a-h]` | 升变为后的兵，行号 a..h 对应 1..8 |
//! | `[A-H][i-p]` | 升变为车的兵 |
//! | `[A-H][q-x]` | 升变为象的兵 |
//! | `[A-H][I-P]` | 升变为马的兵 |
//! | `X[QRBN]` | 已被吃的升变兵及其升变兵种 |
//!
//! 升变标记只允许出现在兵的位置上。
//!
//! 初始局面：
//! `A1B1C1D1E1F1G1H1A2B2C2D2E2F2G2H2A8B8C8D8E8F8G8H8A7B7C7D7E7F7G7H7 W TTTT`

use tracing::debug;

use crate::board::{Board, Location};
use crate::castling::CastlingRights;
use crate::constants::{
    BOARD_SECTION_LEN, CAPTURED_MARKER, CAPTURED_TOKEN, SECTION_COUNT, SECTION_SEPARATOR,
};
use crate::error::{ChessError, Result};
use crate::piece::{ChessPos, Color, Piece, PieceType};
use crate::promotion::PawnRegistry;
use crate::state::State;

/// 初始局面
pub const INITIAL_MESSAGE: &str =
    "A1B1C1D1E1F1G1H1A2B2C2D2E2F2G2H2A8B8C8D8E8F8G8H8A7B7C7D7E7F7G7H7 W TTTT";

/// GameMessage 处理
pub struct GameMessage;

impl GameMessage {
    /// 解析 GameMessage 为对局状态
    ///
    /// 任何错误都不会产生部分状态。
    pub fn decode(message: &str) -> Result<State> {
        let sections: Vec<&str> = message.split(SECTION_SEPARATOR).collect();
        if sections.len() != SECTION_COUNT {
            return Err(ChessError::MalformedMessage {
                sections: sections.len(),
            });
        }

        let (board, promotions) = Self::decode_board(sections[0])?;
        let side_to_move = Self::decode_turn(sections[1])?;
        let castling = CastlingRights::decode(sections[2])?;

        debug!(
            "解析局面: {} 个棋子在棋盘上, {} 个兵已升变, 轮到 {:?}",
            board.occupied().count(),
            promotions.len(),
            side_to_move
        );

        Ok(State::from_parts(board, side_to_move, castling, promotions))
    }

    /// 将对局状态转换为 GameMessage
    pub fn encode(state: &State) -> String {
        format!(
            "{}{}{}{}{}",
            Self::encode_board(state),
            SECTION_SEPARATOR,
            state.side_to_move().to_char(),
            SECTION_SEPARATOR,
            state.castling().encode()
        )
    }

    /// 解析棋盘段
    fn decode_board(section: &str) -> Result<(Board, PawnRegistry)> {
        if let Some((index, c)) = section.char_indices().find(|(_, c)| !c.is_ascii()) {
            return Err(ChessError::MalformedBoardSection {
                index,
                found: c.to_string(),
            });
        }
        if section.len() != BOARD_SECTION_LEN {
            return Err(ChessError::MalformedBoardSection {
                index: section.len(),
                found: section.to_string(),
            });
        }

        let mut board = Board::empty();
        let mut promotions = PawnRegistry::new();

        for piece in Piece::all() {
            let index = piece.index() * 2;
            let token = &section[index..index + 2];
            let malformed = || ChessError::MalformedBoardSection {
                index,
                found: token.to_string(),
            };

            let (location, promoted) = decode_token(token).ok_or_else(malformed)?;
            if promoted.is_some() && piece.base_type() != PieceType::Pawn {
                return Err(malformed());
            }
            if let Location::OnBoard(pos) = location {
                // 同一格出现两次
                if board.piece_at(pos).is_some() {
                    return Err(malformed());
                }
                board.place(piece, pos)?;
            }
            if let Some(new_type) = promoted {
                promotions.insert(piece, new_type);
            }
        }

        Ok((board, promotions))
    }

    /// 将棋盘和升变记录转换为棋盘段
    fn encode_board(state: &State) -> String {
        let mut section = String::with_capacity(BOARD_SECTION_LEN);
        for (piece, location) in state.board().positions() {
            let promoted = state
                .promotions()
                .is_promoted(piece)
                .then(|| state.effective_type(piece));
            section.push_str(&encode_token(location, promoted));
        }
        section
    }

    /// 解析走子方段，必须恰好是 `W` 或 `B`
    fn decode_turn(section: &str) -> Result<Color> {
        let mut chars = section.chars();
        match (chars.next().and_then(Color::from_char), chars.next()) {
            (Some(color), None) => Ok(color),
            _ => Err(ChessError::MalformedTurnColor {
                found: section.to_string(),
            }),
        }
    }
}

/// 升变兵在棋盘上时，行字符区段的起点
fn row_block(promoted: Option<PieceType>) -> u8 {
    match promoted {
        Some(PieceType::Queen) => b'a',
        Some(PieceType::Rook) => b'i',
        Some(PieceType::Bishop) => b'q',
        Some(PieceType::Knight) => b'I',
        Some(PieceType::Pawn) | Some(PieceType::King) | None => b'1',
    }
}

/// 解析行字符：返回行号和升变兵种
fn decode_row(c: u8) -> Option<(u8, Option<PieceType>)> {
    let promoted = match c {
        b'1'..=b'8' => None,
        b'a'..=b'h' => Some(PieceType::Queen),
        b'i'..=b'p' => Some(PieceType::Rook),
        b'q'..=b'x' => Some(PieceType::Bishop),
        b'I'..=b'P' => Some(PieceType::Knight),
        _ => return None,
    };
    Some((c - row_block(promoted), promoted))
}

/// 解析棋盘段中的单个两字符标记
fn decode_token(token: &str) -> Option<(Location, Option<PieceType>)> {
    match token.as_bytes() {
        [b'X', b'X'] => Some((Location::Captured, None)),
        [b'X', t] => {
            let promoted = PieceType::from_char(*t as char).filter(|t| t.is_promotion_target())?;
            Some((Location::Captured, Some(promoted)))
        }
        [c @ b'A'..=b'H', r] => {
            let (row, promoted) = decode_row(*r)?;
            let pos = ChessPos::new(c - b'A', row)?;
            Some((Location::OnBoard(pos), promoted))
        }
        _ => None,
    }
}

/// 生成单个两字符标记
fn encode_token(location: Location, promoted: Option<PieceType>) -> String {
    match (location, promoted) {
        (Location::Captured, None) => CAPTURED_TOKEN.to_string(),
        (Location::Captured, Some(t)) => format!("{}{}", CAPTURED_MARKER, t.to_char()),
        (Location::OnBoard(pos), _) => {
            let row = (row_block(promoted) + pos.row()) as char;
            format!("{}{}", pos.column_char(), row)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    fn piece(token: &str) -> Piece {
        Piece::decode(token).unwrap()
    }

    fn pos(token: &str) -> ChessPos {
        ChessPos::decode(token).unwrap()
    }

    #[test]
    fn test_decode_initial_message() {
        let state = GameMessage::decode(INITIAL_MESSAGE).unwrap();

        assert_eq!(state.board().live_pieces(Color::White).len(), 16);
        assert_eq!(state.board().live_pieces(Color::Black).len(), 16);
        assert_eq!(state.side_to_move(), Color::White);
        assert_eq!(state.castling(), CastlingRights::all());
        assert!(state.promotions().is_empty());
        assert_eq!(state, State::initial());

        assert_eq!(state.board().piece_at(pos("E1")), Some(Piece::king(Color::White)));
        assert_eq!(state.board().piece_at(pos("H7")), Some(piece("BP8")));
    }

    #[test]
    fn test_encode_initial_state() {
        assert_eq!(GameMessage::encode(&State::initial()), INITIAL_MESSAGE);
    }

    #[test]
    fn test_message_roundtrip() {
        let messages = [
            INITIAL_MESSAGE,
            "A1B1C1D1E1XXXXH1A2B2C2D2E2F2G2H2A8B8C8D8E8F8G8H8A7B7C7D7E7F7G7H7 B TFTF",
            // WP1 升变为后停在 A8，WP2 升变为马后被吃，BP8 升变为车停在 H1
            "XXXXXXXXE1XXXXXXAhXNXXXXXXXXXXXXXXXXXXXXE8XXXXXXXXXXXXXXXXXXXXHi W FFFF",
            // WP3 升变为象在 C5，BP1 升变为马在 A4
            "XXXXXXXXE1XXXXXXXXXXCuXXXXXXXXXXXXXXXXXXE8XXXXXXALXXXXXXXXXXXXXX B FFFF",
        ];
        for message in messages {
            let state = GameMessage::decode(message).unwrap();
            assert_eq!(GameMessage::encode(&state), message);
        }
    }

    #[test]
    fn test_decode_promotions() {
        let state = GameMessage::decode(
            "XXXXXXXXE1XXXXXXAhXNXXXXXXXXXXXXXXXXXXXXE8XXXXXXXXXXXXXXXXXXXXHi W FFFF",
        )
        .unwrap();

        assert_eq!(state.board().piece_at(pos("A8")), Some(piece("WP1")));
        assert_eq!(state.effective_type(piece("WP1")), PieceType::Queen);
        assert_eq!(state.board().location_of(piece("WP2")), Location::Captured);
        assert_eq!(state.effective_type(piece("WP2")), PieceType::Knight);
        assert_eq!(state.board().piece_at(pos("H1")), Some(piece("BP8")));
        assert_eq!(state.effective_type(piece("BP8")), PieceType::Rook);
        assert_eq!(state.promotions().len(), 3);
    }

    #[test]
    fn test_state_roundtrip_through_game() {
        let mut state = State::initial();
        let moves = [
            ("WP5", "E4M"),
            ("BP4", "D5M"),
            ("WP5", "D5X"),
            ("BP3", "C5M"),
            ("WP5", "C6EP"),
            ("BN2", "F6M"),
            ("WP5", "B7X"),
            ("BB1", "D7M"),
            ("WP5", "A8X=N"),
        ];
        for (mover, action) in moves {
            state
                .apply(piece(mover), Action::decode(action).unwrap())
                .unwrap();
            let message = GameMessage::encode(&state);
            assert_eq!(GameMessage::decode(&message).unwrap(), state, "{message}");
        }
        assert_eq!(state.effective_type(piece("WP5")), PieceType::Knight);
    }

    #[test]
    fn test_wrong_board_length() {
        let result = GameMessage::decode("A1B1C1 W TTTT");
        assert_eq!(
            result,
            Err(ChessError::MalformedBoardSection {
                index: 6,
                found: "A1B1C1".to_string(),
            })
        );
    }

    #[test]
    fn test_malformed_board_tokens() {
        // 非法字符
        let message = INITIAL_MESSAGE.replacen("E1", "E9", 1);
        assert_eq!(
            GameMessage::decode(&message),
            Err(ChessError::MalformedBoardSection {
                index: 8,
                found: "E9".to_string(),
            })
        );

        // 两个棋子在同一格
        let message = INITIAL_MESSAGE.replacen("B1", "A1", 1);
        assert!(matches!(
            GameMessage::decode(&message),
            Err(ChessError::MalformedBoardSection { index: 2, .. })
        ));

        // 升变标记出现在车的位置上
        let message = INITIAL_MESSAGE.replacen("A1", "Aa", 1);
        assert!(matches!(
            GameMessage::decode(&message),
            Err(ChessError::MalformedBoardSection { index: 0, .. })
        ));

        // 被吃的兵不能升变为王
        let message = INITIAL_MESSAGE.replacen("A2", "XK", 1);
        assert!(matches!(
            GameMessage::decode(&message),
            Err(ChessError::MalformedBoardSection { index: 16, .. })
        ));

        // 非 ASCII 字符
        let message = INITIAL_MESSAGE.replacen("A1", "Aé", 1);
        assert!(matches!(
            GameMessage::decode(&message),
            Err(ChessError::MalformedBoardSection { index: 1, .. })
        ));
    }

    #[test]
    fn test_malformed_turn_and_castling() {
        let board = &INITIAL_MESSAGE[..BOARD_SECTION_LEN];

        for turn in ["", "w", "R", "WB"] {
            assert_eq!(
                GameMessage::decode(&format!("{board} {turn} TTTT")),
                Err(ChessError::MalformedTurnColor { found: turn.to_string() })
            );
        }

        assert!(matches!(
            GameMessage::decode(&format!("{board} W TTT")),
            Err(ChessError::MalformedCastlingSection { .. })
        ));
        assert!(matches!(
            GameMessage::decode(&format!("{board} W TTYT")),
            Err(ChessError::MalformedCastlingSection { index: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_section_count() {
        assert_eq!(
            GameMessage::decode(""),
            Err(ChessError::MalformedMessage { sections: 1 })
        );
        assert_eq!(
            GameMessage::decode(&format!("{INITIAL_MESSAGE} 0")),
            Err(ChessError::MalformedMessage { sections: 4 })
        );
        assert_eq!(
            GameMessage::decode(&INITIAL_MESSAGE.replace(' ', "  ")),
            Err(ChessError::MalformedMessage { sections: 5 })
        );
    }
}
