//! # 规则行规范化
//!
//! 把规则列表中的一行（Clash / Surge 规则、AdBlock 语法、gfwlist、纯域名）
//! 转换为裸域名。
//!
//! ## 处理步骤（顺序不可调换）
//! 1. 去除首尾空白并转小写
//! 2. 丢弃空行、注释、段头以及 IP / GEOIP / 正则规则
//! 3. 去掉行首的一个规则类型或语法标记（见 [`PREFIX_RULES`]）
//! 4. 去掉第一个逗号及其之后的内容（策略组名等）
//! 5. 删除所有 `[a-z0-9.]` 以外的字符
//! 6. 去掉开头的点
//! 7. 结果必须非空且包含至少一个点
//!
//! ## 使用示例
//! ```rust
//! use domain_lists::rule::normalize;
//!
//! let domain = normalize("DOMAIN-SUFFIX,example.com,DIRECT");
//! assert_eq!(domain.unwrap().as_str(), "example.com");
//! ```

use std::fmt;

use serde::Serialize;

// ========================================
// 域名类型
// ========================================

/// 规范化后的域名
///
/// 只包含 `[a-z0-9.]`，不以点开头，且至少包含一个点。
/// 只能通过 [`normalize`] 构造，所以同一个域名的不同写法总是得到同一个值。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// 把任意一行文本解析为域名，等价于 [`normalize`]
    pub fn parse(line: &str) -> Option<Self> {
        normalize(line)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ========================================
// 行首前缀规则
// ========================================

/// 出现在行首时整行丢弃的前缀
///
/// 分别是：注释、段头（如 `[AutoProxy 0.2.9]`）、IP 规则、GEOIP 规则、正则规则
pub const DISCARD_PREFIXES: &[&str] = &["#", "[", "ip-cidr", "geoip", "url-regex"];

/// 行首前缀剥离规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixRule {
    /// 规则类型关键字，后面可以跟一个逗号，逗号一起去掉
    Token(&'static str),
    /// 列表语法符号，只去掉符号本身
    Symbol(&'static str),
}

impl PrefixRule {
    /// 如果行以此规则开头，返回去掉前缀后的剩余部分
    pub fn strip<'a>(&self, line: &'a str) -> Option<&'a str> {
        match *self {
            PrefixRule::Token(token) => line
                .strip_prefix(token)
                .map(|rest| rest.strip_prefix(',').unwrap_or(rest)),
            PrefixRule::Symbol(symbol) => line.strip_prefix(symbol),
        }
    }
}

/// 按顺序尝试的前缀规则，只有第一个命中的会生效
///
/// `domain-suffix` 必须排在 `domain` 之前，`||` 必须排在 `|` 之前。
pub const PREFIX_RULES: &[PrefixRule] = &[
    PrefixRule::Token("domain-suffix"),
    PrefixRule::Token("domain"),
    PrefixRule::Token("host"),
    PrefixRule::Token("ip-cidr"),
    PrefixRule::Token("geoip"),
    PrefixRule::Token("url-regex"),
    PrefixRule::Token("final"),
    PrefixRule::Symbol("||"),
    PrefixRule::Symbol("|"),
    PrefixRule::Symbol("@@"),
    PrefixRule::Symbol("/"),
    PrefixRule::Symbol("^"),
    PrefixRule::Symbol("!"),
    PrefixRule::Symbol("["),
    PrefixRule::Symbol("]"),
    PrefixRule::Symbol("$"),
    PrefixRule::Symbol("#"),
    PrefixRule::Symbol("*"),
];

/// 是否为需要整行丢弃的行（输入应已 trim 并转小写）
pub fn is_discarded(line: &str) -> bool {
    line.is_empty() || DISCARD_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// 去掉第一个命中的前缀，没有命中时原样返回
pub fn strip_rule_prefix(line: &str) -> &str {
    PREFIX_RULES
        .iter()
        .find_map(|rule| rule.strip(line))
        .unwrap_or(line)
}

#[inline]
fn is_domain_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.'
}

// ========================================
// 规范化入口
// ========================================

/// 将一行规则文本规范化为域名
///
/// 任何无法识别的输入都返回 `None`，不会 panic。
pub fn normalize(line: &str) -> Option<Domain> {
    let line = line.trim().to_lowercase();
    if is_discarded(&line) {
        return None;
    }

    let rest = strip_rule_prefix(&line);

    // 逗号之后是策略组名等附加字段
    let rest = match rest.find(',') {
        Some(idx) => &rest[..idx],
        None => rest,
    };

    let filtered: String = rest.chars().filter(|&c| is_domain_char(c)).collect();
    let domain = filtered.trim_start_matches('.');

    if domain.contains('.') {
        Some(Domain(domain.to_string()))
    } else {
        None
    }
}
