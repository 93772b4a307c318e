//! 转换任务上下文
//!
//! 封装"我正在处理第几个文件"这一信息，仅用于日志

use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct ConversionCtx {
    /// 文件序号（从1开始）
    pub index: usize,
    /// 本批文件总数
    pub total: usize,
    /// 源文件名
    pub source_name: String,
}

impl ConversionCtx {
    pub fn new(index: usize, total: usize, source_name: impl Into<String>) -> Self {
        Self {
            index,
            total,
            source_name: source_name.into(),
        }
    }
}

impl Display for ConversionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文件 {}/{} {}]", self.index, self.total, self.source_name)
    }
}
