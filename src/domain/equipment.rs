// ==========================================
// 化工设备报表系统 - 设备领域模型
// ==========================================
// 职责: 上传批次 / 设备记录 / 草稿 / 请求者身份
// 对齐: db.rs upload_batch / equipment_record 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 必需列（表头去除首尾空白后精确匹配，区分大小写）
// ==========================================
pub const COL_EQUIPMENT_NAME: &str = "Equipment Name";
pub const COL_TYPE: &str = "Type";
pub const COL_FLOWRATE: &str = "Flowrate";
pub const COL_PRESSURE: &str = "Pressure";
pub const COL_TEMPERATURE: &str = "Temperature";

/// 上传文件必须包含的列（按报告列顺序）
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_EQUIPMENT_NAME,
    COL_TYPE,
    COL_FLOWRATE,
    COL_PRESSURE,
    COL_TEMPERATURE,
];

/// 上传文件在存储中的目录前缀
pub const UPLOAD_DIR_PREFIX: &str = "uploads/";

// ==========================================
// Requester - 请求者身份
// ==========================================
// 所有按批次读取的操作都显式携带该身份，不使用全局"当前用户"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: String,  // 归属判定使用的所有者引用
    pub username: String, // 报表元数据行展示的名称
}

impl Requester {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }

    /// 所有者引用与显示名相同的身份（CLI 使用）
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            user_id: name.clone(),
            username: name,
        }
    }
}

// ==========================================
// UploadFile - 上传的原始文件
// ==========================================
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// 存储引用（uploads/<文件名>），只保留文件名部分
    pub fn storage_name(&self) -> String {
        let base = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("upload.csv");
        format!("{}{}", UPLOAD_DIR_PREFIX, base)
    }
}

// ==========================================
// UploadBatch - 上传批次
// ==========================================
// 不变量: total_records == 当前关联的 EquipmentRecord 数量
// owner 可为空: 所有者被移除后批次保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadBatch {
    pub batch_id: String,
    pub owner: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub total_records: usize,
    pub file_name: String, // 存储引用，如 uploads/plant_a.csv
    pub file_size: usize,
}

// ==========================================
// EquipmentDraft - 尚未落库的设备记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDraft {
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub row_number: usize, // 源文件数据行号（从 1 开始，不含表头）
}

impl EquipmentDraft {
    pub fn new(
        equipment_name: impl Into<String>,
        equipment_type: impl Into<String>,
        flowrate: f64,
        pressure: f64,
        temperature: f64,
    ) -> Self {
        Self {
            equipment_name: equipment_name.into(),
            equipment_type: equipment_type.into(),
            flowrate,
            pressure,
            temperature,
            row_number: 0,
        }
    }

    /// 三个测量值是否均为有限实数（NaN/inf 无法作为测量值存储）
    pub fn has_finite_measurements(&self) -> bool {
        self.flowrate.is_finite() && self.pressure.is_finite() && self.temperature.is_finite()
    }
}

// ==========================================
// EquipmentRecord - 已落库的设备记录
// ==========================================
// 批次独占其记录: 删除批次即删除全部记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: i64,
    #[serde(skip)]
    pub batch_id: String,
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}
