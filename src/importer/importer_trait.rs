// ==========================================
// 化工设备报表系统 - 导入 Trait
// ==========================================
// 职责: 定义设备数据导入各阶段接口（不包含实现）
// 流程: 文件解析 → 字段映射（列校验 + 数值转换） → 建批次 → 事务落库
// ==========================================

use crate::domain::equipment::{EquipmentDraft, UploadBatch, UploadFile};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// 解析后的原始数据行
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_number: usize, // 数据行号（从 1 开始，不含表头）
    pub values: HashMap<String, String>,
}

/// 解析后的原始表格（表头已去除首尾空白）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser
pub trait FileParser: Send + Sync {
    /// 将带表头的分隔文本解析为原始表格
    fn parse(&self, content: &[u8]) -> ImportResult<RawTable>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口
// 实现者: EquipmentFieldMapper
pub trait FieldMapper: Send + Sync {
    /// 校验必需列是否齐全
    fn check_columns(&self, headers: &[String]) -> ImportResult<()>;

    /// 将原始行映射为设备草稿
    fn map_row(&self, row: &RawRow) -> ImportResult<EquipmentDraft>;

    /// 映射整张表：先校验列，再逐行映射，任一行失败则整体失败
    fn map_table(&self, table: &RawTable) -> ImportResult<Vec<EquipmentDraft>> {
        self.check_columns(&table.headers)?;
        table.rows.iter().map(|row| self.map_row(row)).collect()
    }
}

// ==========================================
// EquipmentImporter Trait
// ==========================================
// 用途: 设备数据导入主接口
// 实现者: EquipmentImporterImpl
#[async_trait]
pub trait EquipmentImporter: Send + Sync {
    /// 导入上传文件，成功时返回已落库的批次
    ///
    /// # 返回
    /// - Ok(UploadBatch): total_records 已等于写入记录数
    /// - Err: 校验失败（不建批次）或落库失败（批次已回滚删除）
    async fn import(&self, file: &UploadFile, owner: &str) -> ImportResult<UploadBatch>;
}
