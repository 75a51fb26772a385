// ==========================================
// 化工设备报表系统 - 核心库
// ==========================================
// 流程: CSV 上传 → 字段映射 → 批次落库 → 汇总统计 → PDF 报表
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与统计结构
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 汇总统计
pub mod engine;

// 导入层 - 上传文件
pub mod importer;

// 报表层 - 文档构建与渲染
pub mod report;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组件组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Averages, EquipmentDraft, EquipmentRecord, Requester, Summary, TypeCount, UploadBatch,
    UploadFile,
};

// 引擎
pub use engine::SummaryEngine;

// 报表
pub use report::{PdfRenderer, ReportBuilder, Renderer};

// API
pub use api::{AccessGate, ApiError, EquipmentApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "化工设备报表系统";
