// ==========================================
// 化工设备报表系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与统计结构
// 红线: 不含数据访问逻辑,不含统计/渲染逻辑
// ==========================================

pub mod equipment;
pub mod summary;

// 重导出核心类型
pub use equipment::{
    EquipmentDraft, EquipmentRecord, Requester, UploadBatch, UploadFile, REQUIRED_COLUMNS,
};
pub use summary::{Averages, Summary, TypeCount};
