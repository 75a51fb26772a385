// ==========================================
// 化工设备报表系统 - 报表层
// ==========================================
// 职责: 汇总统计 + 明细样本 → 分页 PDF 报表
// 流程: ReportBuilder → ReportDocument → Renderer（排版 + 输出）
// ==========================================

pub mod builder;
pub mod document;
pub mod format;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod renderer;

pub use builder::{ReportBuilder, ReportContent, ReportInput, DEFAULT_DETAIL_LIMIT, NOT_FOUND_NOTICE};
pub use document::ReportDocument;
pub use pdf::PdfRenderer;
pub use renderer::{RenderError, RenderResult, Renderer};
