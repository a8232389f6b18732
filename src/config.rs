//! # 运行配置
//!
//! 规则源地址、自定义国内域名、输出文件名和下载超时都集中在 [`Config`] 中。
//! 默认值内置在二进制里，可以用 JSON 文件覆盖部分字段：
//!
//! ```json
//! {
//!   "custom_domestic": ["speedtest.net", "ookla.net", "fast.com"],
//!   "timeout_secs": 30
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ListError, Result};
use crate::rule::normalize;

const LOYALSOLDIER_RELEASE: &str =
    "https://raw.githubusercontent.com/Loyalsoldier/clash-rules/release";
const GFWLIST_URL: &str = "https://raw.githubusercontent.com/gfwlist/gfwlist/master/gfwlist.txt";

// ========================================
// 分类
// ========================================

/// 域名分类，也是规则源所属的组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// 国内（直连）
    Domestic,
    /// 海外（走代理）
    Oversea,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Domestic => write!(f, "domestic"),
            Classification::Oversea => write!(f, "oversea"),
        }
    }
}

// ========================================
// 规则源
// ========================================

/// 单个远程规则源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// 源名称（如 "direct", "gfwlist"）
    pub name: String,
    /// 下载地址
    pub url: String,
    /// 该源中的域名默认归入的分类
    pub group: Classification,
}

impl Source {
    pub fn new(name: &str, url: impl Into<String>, group: Classification) -> Self {
        Self {
            name: name.to_string(),
            url: url.into(),
            group,
        }
    }
}

fn default_sources() -> Vec<Source> {
    use Classification::{Domestic, Oversea};

    let release = |name: &str, group| {
        Source::new(name, format!("{}/{}.txt", LOYALSOLDIER_RELEASE, name), group)
    };

    vec![
        release("direct", Domestic),
        release("apple", Domestic),
        release("icloud", Domestic),
        release("proxy", Oversea),
        release("gfw", Oversea),
        Source::new("gfwlist", GFWLIST_URL, Oversea),
    ]
}

// ========================================
// 配置
// ========================================

/// 运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 规则源列表，按顺序下载
    pub sources: Vec<Source>,
    /// 始终归为国内的域名（如测速站点）
    pub custom_domestic: Vec<String>,
    /// 国内域名输出文件名
    pub domestic_file: String,
    /// 海外域名输出文件名
    pub oversea_file: String,
    /// 单次下载超时（秒）
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            custom_domestic: vec!["speedtest.net".to_string(), "ookla.net".to_string()],
            domestic_file: "domestic.conf".to_string(),
            oversea_file: "oversea.conf".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Config {
    /// 从 JSON 文件加载配置，缺失字段使用默认值
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ListError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// 确定本次运行的配置：指定了文件则加载文件，否则使用内置默认值
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// 从 JSON 文本解析并校验配置
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| ListError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ListError::config("timeout_secs must be greater than zero"));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if !names.insert(source.name.as_str()) {
                return Err(ListError::config(format!(
                    "duplicate source name: {}",
                    source.name
                )));
            }
            if source.url.trim().is_empty() {
                return Err(ListError::config(format!(
                    "source {} has an empty url",
                    source.name
                )));
            }
        }

        if self.domestic_file == self.oversea_file {
            return Err(ListError::config(
                "domestic_file and oversea_file must differ",
            ));
        }

        // 自定义域名也要经过规范化，写错的条目直接报错而不是悄悄丢掉
        for entry in &self.custom_domestic {
            if normalize(entry).is_none() {
                return Err(ListError::config(format!(
                    "custom domain is not a valid domain: {entry:?}"
                )));
            }
        }

        Ok(())
    }

    /// 属于指定分组的规则源（保持配置顺序）
    pub fn sources_in(&self, group: Classification) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(move |s| s.group == group)
    }
}
