//! # 输出文件写入
//!
//! 每行一个域名，UTF-8，每行以 `\n` 结尾，没有文件头。

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ListError, Result};

/// 将域名序列写入文件
///
/// 父目录不存在时自动创建。空序列写出空文件。
pub fn write_domains<P, D>(path: P, domains: &[D]) -> Result<()>
where
    P: AsRef<Path>,
    D: AsRef<str>,
{
    let path = path.as_ref();
    let to_write_error = |source| ListError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_write_error)?;
    }

    fs::write(path, render(domains)).map_err(to_write_error)?;

    debug!(path = %path.display(), lines = domains.len(), "wrote domain list");
    Ok(())
}

/// 渲染文件内容
fn render<D: AsRef<str>>(domains: &[D]) -> String {
    let mut content = String::with_capacity(domains.iter().map(|d| d.as_ref().len() + 1).sum());
    for domain in domains {
        content.push_str(domain.as_ref());
        content.push('\n');
    }
    content
}
