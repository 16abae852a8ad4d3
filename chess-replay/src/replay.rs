//! 输入解析与逐步执行
//!
//! 输入格式（每行一条，空行和 `#` 开头的行忽略）：
//! - 第一条：`start` 或一个完整的 GameMessage
//! - 之后：`<棋子> <动作>`（如 `WP5 E4M`）或 `undo`

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use sync_protocol::{Action, Game, Piece, TurnRecord};
use tracing::{debug, info};

/// 起始局面之后的一条指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 走一步
    Play { mover: Piece, action: Action },
    /// 悔棋
    Undo,
}

impl Command {
    /// 解析一行指令
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("undo"), None, None) => Ok(Command::Undo),
            (Some(mover), Some(action), None) => Ok(Command::Play {
                mover: Piece::decode(mover)?,
                action: Action::decode(action)?,
            }),
            _ => bail!("expected `<piece> <action>` or `undo`, got {:?}", line),
        }
    }
}

/// 每条指令的输出
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<'a> {
    Played {
        turn: usize,
        record: &'a TurnRecord,
        message: String,
    },
    Undone {
        record: TurnRecord,
        message: String,
    },
}

/// 读取输入并重放，返回最终的对局会话
pub fn run<R: BufRead, W: Write>(input: R, mut output: W) -> Result<Game> {
    let mut game: Option<Game> = None;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("无法读取第 {} 行", line_no))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let game = match game {
            Some(ref mut game) => game,
            None => {
                game = Some(
                    start(line).with_context(|| format!("第 {} 行: 无效的起始局面", line_no))?,
                );
                continue;
            }
        };

        let command =
            Command::parse(line).with_context(|| format!("第 {} 行: 无效的指令", line_no))?;
        debug!("第 {} 行: {:?}", line_no, command);

        let event_json = match command {
            Command::Play { mover, action } => {
                let record = game
                    .play(mover, action)
                    .with_context(|| format!("第 {} 行: {} {} 执行失败", line_no, mover, action))?
                    .clone();
                let event = Event::Played {
                    turn: game.history().len(),
                    record: &record,
                    message: game.message(),
                };
                serde_json::to_string(&event)?
            }
            Command::Undo => {
                let record = game
                    .undo()
                    .with_context(|| format!("第 {} 行: 无法悔棋", line_no))?;
                info!("悔棋: {} {}", record.mover, record.action);
                let event = Event::Undone {
                    record,
                    message: game.message(),
                };
                serde_json::to_string(&event)?
            }
        };
        writeln!(output, "{}", event_json)?;
    }

    output.flush()?;
    game.context("输入中没有起始局面")
}

fn start(line: &str) -> Result<Game> {
    if line == "start" {
        return Ok(Game::new());
    }
    Ok(Game::from_message(line)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_protocol::INITIAL_MESSAGE;

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse("undo").unwrap(), Command::Undo);
        assert_eq!(
            Command::parse("WP5 E4M").unwrap(),
            Command::Play {
                mover: Piece::decode("WP5").unwrap(),
                action: Action::decode("E4M").unwrap(),
            }
        );
        assert!(Command::parse("WP5").is_err());
        assert!(Command::parse("WP5 E4M extra").is_err());
        assert!(Command::parse("WP9 E4M").is_err());
    }

    #[test]
    fn test_run_outputs_one_line_per_command() {
        let input = "# 意大利开局\nstart\nWP5 E4M\nBP5 E5M\n\nundo\n";
        let mut output = Vec::new();

        let game = run(input.as_bytes(), &mut output).unwrap();
        assert_eq!(game.history().len(), 1);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "played");
        assert_eq!(first["turn"], 1);
        assert_eq!(first["record"]["mover"], "WP5");
        assert_eq!(first["record"]["differences"]["WP5"]["curr"]["OnBoard"], "E4");

        let last: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(last["event"], "undone");
        assert_eq!(last["record"]["mover"], "BP5");
    }

    #[test]
    fn test_run_from_message() {
        let input = format!("{}\nWN2 F3M\n", INITIAL_MESSAGE);
        let game = run(input.as_bytes(), Vec::new()).unwrap();
        assert_eq!(
            game.message(),
            "A1B1C1D1E1F1F3H1A2B2C2D2E2F2G2H2A8B8C8D8E8F8G8H8A7B7C7D7E7F7G7H7 B TTTT"
        );
    }

    #[test]
    fn test_run_reports_failures() {
        assert!(run("".as_bytes(), Vec::new()).is_err());
        assert!(run("not a message\n".as_bytes(), Vec::new()).is_err());
        assert!(run("start\nBP5 E5M\n".as_bytes(), Vec::new()).is_err());
        assert!(run("start\nundo\n".as_bytes(), Vec::new()).is_err());
    }
}
