//! 日志初始化
//!
//! 诊断信息（下载进度、失败的源）写到 stderr，stdout 只留给结果摘要。

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 根据命令行参数计算日志级别
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// 初始化全局日志，`RUST_LOG` 优先于命令行级别
pub fn init(verbose: u8, quiet: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_for(verbose, quiet).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose >= 2),
        )
        .init();
}
