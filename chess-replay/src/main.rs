use std::io::{self, BufWriter};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // 初始化日志，日志写到 stderr，stdout 只输出回合结果
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("chess_replay=info".parse()?))
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let game = chess_replay::run(stdin.lock(), BufWriter::new(stdout.lock()))?;

    info!("重放结束: {} 步, 最终局面 {}", game.history().len(), game.message());
    Ok(())
}
