//! # 错误类型
//!
//! 只有三类运行期错误：
//! - `Fetch` / `Decode`: 单个源失败，记录日志后按空内容处理
//! - `Write`: 输出文件写入失败，致命，进程以非零状态退出
//!
//! 另外 `Config` 只会在启动时出现。

use std::path::PathBuf;

/// 域名列表构建过程中的错误
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// 下载失败（网络错误、超时、非 2xx 状态码）
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// base64 包装的内容无法解码
    #[error("base64 decode failed: {0}")]
    Decode(String),

    /// 输出文件写入失败
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置无效
    #[error("invalid config: {0}")]
    Config(String),
}

impl ListError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn fetch(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ListError>;
