//! # HTTP 下载器
//!
//! 基于 `reqwest::blocking` 的同步下载，每个请求有固定超时，
//! 非 2xx 状态码视为失败。不做重试。

use std::time::Duration;

use tracing::{debug, info};

use super::ContentFetcher;
use crate::error::{ListError, Result};

const USER_AGENT: &str = concat!("domain-lists/", env!("CARGO_PKG_VERSION"));

/// HTTP 规则下载器
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// 创建下载器
    ///
    /// ## 参数
    /// - `timeout`: 单个请求的超时时间（连接 + 读取）
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ListError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        info!(%url, "fetching");

        let wrap = |source: reqwest::Error| ListError::fetch(url, source);

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(wrap)?;
        let body = response.text().map_err(wrap)?;

        debug!(%url, bytes = body.len(), "fetched");
        Ok(body)
    }
}
