//! # domain-lists
//!
//! 下载规则列表，提取并规范化其中的域名，按来源分为国内 / 海外两组。
//!
//! 模块按依赖顺序：
//! - [`rule`]: 单行规范化与源内容解码
//! - [`fetch`]: 规则源下载
//! - [`aggregate`]: 集合合并与冲突消解
//! - [`output`]: 输出文件写入

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod rule;

pub use aggregate::{Aggregator, Classified};
pub use config::{Classification, Config, Source};
pub use error::ListError;
pub use rule::{normalize, Domain};
