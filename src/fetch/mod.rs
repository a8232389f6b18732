//! # 下载模块
//!
//! 把规则源地址映射为原始文本。聚合器只依赖 [`ContentFetcher`] trait，
//! 测试中可以替换为内存实现。

pub mod http;

pub use http::HttpFetcher;

use crate::error::Result;

/// 规则内容下载器
pub trait ContentFetcher {
    /// 下载指定地址的文本内容
    fn fetch(&self, url: &str) -> Result<String>;
}
