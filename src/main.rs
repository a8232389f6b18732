//! # domain-lists
//!
//! 从公开规则源生成国内 / 海外域名列表。
//!
//! ## 功能
//! - 下载国内组（direct / apple / icloud）和海外组（proxy / gfw / gfwlist）规则源
//! - 把各种规则语法规范化为裸域名并去重
//! - 同时出现在两组中的域名归为国内
//! - 输出两个按字典序排列的文件: `domestic.conf` 和 `oversea.conf`
//!
//! ## 使用
//! ```bash
//! # 使用内置配置，在当前目录生成两个文件
//! domain-lists
//!
//! # 输出到指定目录
//! domain-lists --out-dir ./lists
//!
//! # 使用 JSON 配置覆盖规则源或自定义域名
//! domain-lists --config lists.json
//!
//! # JSON 格式输出摘要
//! domain-lists --json
//! ```

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use domain_lists::aggregate::{Aggregator, Classified, SourceReport, SourceStatus};
use domain_lists::config::Config;
use domain_lists::fetch::HttpFetcher;
use domain_lists::{logging, output};

// ========================================
// CLI 参数定义
// ========================================

/// 国内 / 海外域名列表生成工具
#[derive(Parser)]
#[command(name = "domain-lists")]
#[command(version)]
#[command(about = "Build sorted domestic / oversea domain lists from public rule sets")]
struct Cli {
    /// JSON 配置文件 (可选，默认使用内置配置)
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// 输出目录
    #[arg(long, short = 'o', value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// JSON 格式输出摘要
    #[arg(long)]
    json: bool,

    /// 日志详细程度 (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// 只输出错误日志
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    quiet: bool,
}

// ========================================
// 主函数
// ========================================

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// 执行完整流程：加载配置 -> 聚合 -> 写文件 -> 输出摘要
fn run(cli: &Cli) -> Result<()> {
    // 1. 加载配置
    let config = Config::resolve(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Built-in config is invalid".to_string(),
    })?;

    // 2. 下载并聚合
    let fetcher = HttpFetcher::new(Duration::from_secs(config.timeout_secs))?;
    let aggregator = Aggregator::new(config, fetcher);
    let result = aggregator.build();

    // 3. 写入输出文件（失败即退出）
    let config = aggregator.config();
    let domestic_path = cli.out_dir.join(&config.domestic_file);
    let oversea_path = cli.out_dir.join(&config.oversea_file);

    output::write_domains(&domestic_path, &result.domestic)?;
    output::write_domains(&oversea_path, &result.oversea)?;
    info!("domain lists written");

    // 4. 输出摘要
    let summary = Summary::new(&result, &domestic_path, &oversea_path);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

// ========================================
// 摘要输出
// ========================================

#[derive(Serialize)]
struct FileSummary {
    path: PathBuf,
    count: usize,
}

#[derive(Serialize)]
struct Summary<'a> {
    domestic: FileSummary,
    oversea: FileSummary,
    sources: &'a [SourceReport],
}

impl<'a> Summary<'a> {
    fn new(result: &'a Classified, domestic_path: &Path, oversea_path: &Path) -> Self {
        Self {
            domestic: FileSummary {
                path: domestic_path.to_path_buf(),
                count: result.domestic.len(),
            },
            oversea: FileSummary {
                path: oversea_path.to_path_buf(),
                count: result.oversea.len(),
            },
            sources: &result.sources,
        }
    }
}

fn print_summary(summary: &Summary<'_>) {
    println!("\n--- Results ---");
    println!(
        "Domestic domains written to {}: {}",
        summary.domestic.path.display(),
        summary.domestic.count
    );
    println!(
        "Oversea domains written to {}: {}",
        summary.oversea.path.display(),
        summary.oversea.count
    );

    let failed: Vec<&str> = summary
        .sources
        .iter()
        .filter(|r| r.status != SourceStatus::Ok)
        .map(|r| r.name.as_str())
        .collect();
    if !failed.is_empty() {
        println!("Sources skipped: {}", failed.join(", "));
    }
}
