//! # 源内容解码
//!
//! 个别规则源以 base64 包装发布（内容以 `AAECA` 开头）。
//! 在按行切分之前先解开这一层；其他内容原样返回。

use std::borrow::Cow;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{ListError, Result};

/// base64 包装内容的固定开头
pub const ARMOR_PREFIX: &str = "AAECA";

#[inline]
fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// 解码源内容
///
/// 非包装内容原样借用返回。包装内容中 base64 字母表以外的字符
/// （换行、空格、杂散的标点）在解码前全部丢弃。
/// 解码失败或结果不是 UTF-8 时返回 [`ListError::Decode`]，由调用方按空内容处理。
pub fn decode(raw: &str) -> Result<Cow<'_, str>> {
    if !raw.starts_with(ARMOR_PREFIX) {
        return Ok(Cow::Borrowed(raw));
    }

    let compact: String = raw.chars().filter(|&c| is_base64_char(c)).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ListError::Decode(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| ListError::Decode(e.to_string()))?;

    Ok(Cow::Owned(text))
}
