//! # 规则解析模块
//!
//! 此模块负责：
//! 1. 解开 base64 包装的源内容
//! 2. 把各种规则语法的单行文本规范化为裸域名

pub mod decoder;
pub mod normalizer;

pub use decoder::decode;
pub use normalizer::{normalize, Domain};
