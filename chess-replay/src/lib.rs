//! 对局重放工具
//!
//! 从输入读取一局棋并逐步执行，每一步输出一行 JSON（走法分类、位置差异、新的 GameMessage）。

pub mod replay;

pub use replay::{run, Command, Event};
