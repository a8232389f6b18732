//! # 聚合模块
//!
//! 这个模块是核心业务逻辑所在，负责：
//! 1. 按组下载规则源（先国内组，再海外组）
//! 2. 解码并逐行规范化，合并到国内 / 海外两个集合
//! 3. 解决冲突：海外集合减去国内集合
//! 4. 输出两个排好序的域名序列
//!
//! ## 冲突规则
//! 同时出现在两组中的域名只归为国内。自定义国内域名总是保留。
//!
//! ## 失败处理
//! 单个源下载或解码失败只记录警告，按空内容处理，不会中断整体构建。

use std::collections::HashSet;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Classification, Config, Source};
use crate::fetch::ContentFetcher;
use crate::rule::{decoder, normalize, Domain};

// ========================================
// 构建结果
// ========================================

/// 单个规则源的处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    FetchFailed,
    DecodeFailed,
}

/// 单个规则源的处理结果
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub url: String,
    pub group: Classification,
    /// 下载到的原始字节数
    pub bytes: usize,
    /// 该源贡献的去重域名数（冲突消解之前）
    pub domains: usize,
    pub status: SourceStatus,
}

/// 聚合结果
#[derive(Debug, Clone, Serialize)]
pub struct Classified {
    /// 国内域名，按字典序排列
    pub domestic: Vec<Domain>,
    /// 海外域名，按字典序排列，不含任何国内域名
    pub oversea: Vec<Domain>,
    /// 按处理顺序排列的源报告
    pub sources: Vec<SourceReport>,
}

// ========================================
// 聚合器
// ========================================

/// 域名集合聚合器
pub struct Aggregator<F> {
    config: Config,
    fetcher: F,
}

impl<F: ContentFetcher> Aggregator<F> {
    pub fn new(config: Config, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 执行完整的构建流程
    ///
    /// ## 流程
    /// 1. 用自定义域名初始化国内集合，海外集合为空
    /// 2. 处理国内组的所有源，合并到国内集合
    /// 3. 处理海外组的所有源，合并到海外集合
    /// 4. 海外集合减去国内集合
    /// 5. 两个集合分别排序输出
    pub fn build(&self) -> Classified {
        let mut domestic = self.seed();
        let mut oversea = HashSet::new();
        let mut sources = Vec::with_capacity(self.config.sources.len());

        for group in [Classification::Domestic, Classification::Oversea] {
            let target = match group {
                Classification::Domestic => &mut domestic,
                Classification::Oversea => &mut oversea,
            };

            for source in self.config.sources_in(group) {
                let (domains, report) = self.collect_source(source);
                target.extend(domains);
                sources.push(report);
            }
        }

        let before = oversea.len();
        oversea.retain(|d| !domestic.contains(d));
        info!(
            removed = before - oversea.len(),
            "dropped oversea domains already classified as domestic"
        );

        Classified {
            domestic: into_sorted(domestic),
            oversea: into_sorted(oversea),
            sources,
        }
    }

    /// 自定义国内域名集合
    fn seed(&self) -> HashSet<Domain> {
        self.config
            .custom_domestic
            .iter()
            .filter_map(|entry| {
                let domain = normalize(entry);
                if domain.is_none() {
                    warn!(entry = %entry, "ignoring invalid custom domain");
                }
                domain
            })
            .collect()
    }

    /// 下载、解码并提取单个源中的域名
    fn collect_source(&self, source: &Source) -> (HashSet<Domain>, SourceReport) {
        let mut status = SourceStatus::Ok;

        let raw = match self.fetcher.fetch(&source.url) {
            Ok(body) => body,
            Err(e) => {
                warn!(source = %source.name, error = %e, "source unavailable, treating as empty");
                status = SourceStatus::FetchFailed;
                String::new()
            }
        };

        let domains = match decoder::decode(&raw) {
            Ok(text) => extract_domains(&text),
            Err(e) => {
                warn!(source = %source.name, error = %e, "source undecodable, treating as empty");
                status = SourceStatus::DecodeFailed;
                HashSet::new()
            }
        };

        info!(
            source = %source.name,
            group = %source.group,
            domains = domains.len(),
            "processed source"
        );

        let report = SourceReport {
            name: source.name.clone(),
            url: source.url.clone(),
            group: source.group,
            bytes: raw.len(),
            domains: domains.len(),
            status,
        };

        (domains, report)
    }
}

/// 逐行规范化文本，返回去重后的域名集合
///
/// 行与行之间互不依赖，使用 rayon 并行处理；结果是集合，与处理顺序无关。
pub fn extract_domains(text: &str) -> HashSet<Domain> {
    text.par_split(is_line_break)
        .filter_map(normalize)
        .collect()
}

/// 行分隔符：除 `\n` 外还包括单独的 `\r`、`\v`、`\f`、
/// 文件 / 组 / 记录分隔符以及 Unicode 行分隔符和段分隔符
///
/// `\r\n` 会切出一个空行，空行在规范化时被丢弃。
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}'..='\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn into_sorted(set: HashSet<Domain>) -> Vec<Domain> {
    let mut domains: Vec<Domain> = set.into_iter().collect();
    domains.sort_unstable();
    domains
}

// ========================================
// 测试模块
// ========================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::error::{ListError, Result};

    /// 内存下载器：未登记的地址视为下载失败
    #[derive(Default)]
    struct MemoryFetcher {
        bodies: HashMap<String, String>,
    }

    impl MemoryFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl ContentFetcher for MemoryFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| ListError::fetch(url, "connection refused"))
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        for source in &mut config.sources {
            source.url = format!("mem://{}", source.name);
        }
        config
    }

    fn full_fetcher() -> MemoryFetcher {
        MemoryFetcher::default()
            .with(
                "mem://direct",
                "payload:\n  - 'baidu.com'\n  - '+.qq.com'\n  - 'shared.example.com'\n",
            )
            .with("mem://apple", "DOMAIN-SUFFIX,apple.com,DIRECT\n# apple\n")
            .with("mem://icloud", "DOMAIN,icloud.com\nIP-CIDR,17.0.0.0/8,DIRECT\n")
            .with(
                "mem://proxy",
                "payload:\n  - '+.google.com'\n  - 'shared.example.com'\n",
            )
            .with("mem://gfw", "DOMAIN-SUFFIX,twitter.com,Proxy\nGEOIP,US\n")
            .with(
                "mem://gfwlist",
                "[AutoProxy 0.2.9]\n! comment\n||facebook.com\n|SPEEDTEST.NET\n.youtube.com\n",
            )
    }

    fn names(domains: &[Domain]) -> Vec<&str> {
        domains.iter().map(Domain::as_str).collect()
    }

    #[test]
    fn test_build_classifies_by_group() {
        let result = Aggregator::new(test_config(), full_fetcher()).build();

        assert_eq!(
            names(&result.domestic),
            [
                "apple.com",
                "baidu.com",
                "icloud.com",
                "ookla.net",
                "qq.com",
                "shared.example.com",
                "speedtest.net",
            ]
        );
        assert_eq!(
            names(&result.oversea),
            ["facebook.com", "google.com", "twitter.com", "youtube.com"]
        );
    }

    #[test]
    fn test_domestic_wins_conflicts() {
        let result = Aggregator::new(test_config(), full_fetcher()).build();

        let domestic: HashSet<_> = result.domestic.iter().collect();
        assert!(result.oversea.iter().all(|d| !domestic.contains(d)));

        let shared = Domain::parse("shared.example.com").unwrap();
        assert!(domestic.contains(&shared));
        // 种子域名出现在海外源中也归为国内
        assert!(!result.oversea.iter().any(|d| d.as_str() == "speedtest.net"));
    }

    #[test]
    fn test_outputs_strictly_sorted() {
        let result = Aggregator::new(test_config(), full_fetcher()).build();
        for list in [&result.domestic, &result.oversea] {
            assert!(list.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_seed_survives_total_outage() {
        let result = Aggregator::new(test_config(), MemoryFetcher::default()).build();

        assert_eq!(names(&result.domestic), ["ookla.net", "speedtest.net"]);
        assert!(result.oversea.is_empty());
        assert_eq!(result.sources.len(), 6);
        assert!(result
            .sources
            .iter()
            .all(|r| r.status == SourceStatus::FetchFailed && r.domains == 0));
    }

    #[test]
    fn test_single_source_failure_is_isolated() {
        let mut fetcher = full_fetcher();
        fetcher.bodies.remove("mem://gfw");

        let result = Aggregator::new(test_config(), fetcher).build();

        assert!(!result.domestic.is_empty());
        assert_eq!(
            names(&result.oversea),
            ["facebook.com", "google.com", "youtube.com"]
        );

        let gfw = result.sources.iter().find(|r| r.name == "gfw").unwrap();
        assert_eq!(gfw.status, SourceStatus::FetchFailed);
        let ok = result
            .sources
            .iter()
            .filter(|r| r.status == SourceStatus::Ok)
            .count();
        assert_eq!(ok, 5);
    }

    #[test]
    fn test_undecodable_source() {
        let fetcher = full_fetcher().with("mem://gfwlist", "AAECA!!!corrupt");
        let result = Aggregator::new(test_config(), fetcher).build();

        let gfwlist = result.sources.iter().find(|r| r.name == "gfwlist").unwrap();
        assert_eq!(gfwlist.status, SourceStatus::DecodeFailed);
        assert_eq!(gfwlist.domains, 0);
        assert_eq!(names(&result.oversea), ["google.com", "twitter.com"]);
    }

    #[test]
    fn test_reports_follow_group_order() {
        let result = Aggregator::new(test_config(), full_fetcher()).build();
        let order: Vec<_> = result.sources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, ["direct", "apple", "icloud", "proxy", "gfw", "gfwlist"]);

        let direct = &result.sources[0];
        assert_eq!(direct.group, Classification::Domestic);
        assert_eq!(direct.domains, 3);
    }

    #[test]
    fn test_extract_domains_cr_only_line_endings() {
        let domains = extract_domains("a.com\rb.com\r");
        let mut names: Vec<_> = domains.iter().map(Domain::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, ["a.com", "b.com"]);
    }

    #[test]
    fn test_extract_domains_unicode_separators() {
        let text = "a.com\u{2028}b.com\u{2029}c.com\u{85}d.com\u{0c}e.com\u{0b}f.com\u{1e}g.com";
        assert_eq!(extract_domains(text).len(), 7);

        // Windows 换行不会产生多余的域名
        assert_eq!(extract_domains("a.com\r\nb.com\r\n").len(), 2);
    }

    #[test]
    fn test_extract_domains_dedups() {
        let text = "example.com\nEXAMPLE.COM\n||example.com^\r\nDOMAIN-SUFFIX,example.com\n";
        let domains = extract_domains(text);
        assert_eq!(domains.len(), 1);
        assert!(domains.contains(&Domain::parse("example.com").unwrap()));
    }
}
