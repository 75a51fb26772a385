// ==========================================
// 化工设备报表系统 - 渲染器接口
// ==========================================
// 职责: ReportDocument → 字节流
// 说明: 输出写入调用方提供的 Write，渲染器不持有输出缓冲
// ==========================================

use crate::report::document::ReportDocument;
use std::io::Write;
use thiserror::Error;

/// 渲染错误
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("报表写出失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("报表排版失败: {0}")]
    Layout(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// 渲染器 Trait
pub trait Renderer: Send + Sync {
    /// MIME 类型
    fn content_type(&self) -> &'static str;

    /// 文件扩展名（不含点）
    fn file_extension(&self) -> &'static str;

    fn render(&self, document: &ReportDocument, out: &mut dyn Write) -> RenderResult<()>;
}
