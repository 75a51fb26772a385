// ==========================================
// 化工设备报表系统 - 引擎层
// ==========================================
// 职责: 批次统计规则（纯函数，不访问数据库）
// ==========================================

pub mod summary;

pub use summary::SummaryEngine;
