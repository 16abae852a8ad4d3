//! 协议常量定义

/// 棋盘宽度（列数）
pub const BOARD_WIDTH: usize = 8;

/// 棋盘高度（行数）
pub const BOARD_HEIGHT: usize = 8;

/// 棋盘格子总数
pub const SQUARE_COUNT: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// 一局棋中的棋子身份总数（双方各 16 个）
pub const PIECE_COUNT: usize = 32;

/// 每方棋子数
pub const PIECES_PER_COLOR: usize = 16;

/// GameMessage 各段之间的分隔符
pub const SECTION_SEPARATOR: char = ' ';

/// GameMessage 段数：棋盘、走子方、易位权
pub const SECTION_COUNT: usize = 3;

/// 棋盘段长度：32 个两字符位置标记
pub const BOARD_SECTION_LEN: usize = PIECE_COUNT * 2;

/// 易位权段长度
pub const CASTLING_SECTION_LEN: usize = 4;

/// 被吃棋子的位置标记首字符
pub const CAPTURED_MARKER: char = 'X';

/// 未升变且被吃的棋子标记
pub const CAPTURED_TOKEN: &str = "XX";

/// 易位权：保留
pub const RIGHT_KEPT: char = 'T';

/// 易位权：已失去
pub const RIGHT_LOST: char = 'F';

/// 动作标记：普通移动
pub const TAG_MOVE: &str = "M";

/// 动作标记：吃子
pub const TAG_CAPTURE: &str = "X";

/// 动作标记：王翼易位
pub const TAG_CASTLE_KINGSIDE: &str = "OO";

/// 动作标记：后翼易位
pub const TAG_CASTLE_QUEENSIDE: &str = "OOO";

/// 动作标记：吃过路兵
pub const TAG_EN_PASSANT: &str = "EP";

/// 动作标记：升变前缀（后接目标兵种）
pub const TAG_PROMOTE: &str = "=";
