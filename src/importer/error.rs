// ==========================================
// 化工设备报表系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 任一错误都使整个导入失败，不接受部分结果
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件为空: 缺少表头行")]
    EmptyFile,

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据映射错误 =====
    #[error("缺少必需列: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("必填值缺失 (行 {row}, 字段 {field})")]
    MissingValue { row: usize, field: String },

    #[error("类型转换失败 (行 {row}, 字段 {field}): 无法解析为数值: {value}")]
    TypeConversionError {
        row: usize,
        field: String,
        value: String,
    },

    #[error("数值无效 (行 {row}, 字段 {field}): {value} 不是有限实数")]
    NonFiniteValue {
        row: usize,
        field: String,
        value: String,
    },

    // ===== 落库错误 =====
    #[error("批次落库失败: {0}")]
    Storage(#[from] RepositoryError),
}

impl ImportError {
    /// 是否为数据校验类错误（调用方应视为客户端错误）
    pub fn is_validation(&self) -> bool {
        !matches!(self, ImportError::Storage(_))
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
