// ==========================================
// 化工设备报表系统 - API层错误类型
// ==========================================
// 职责: 将导入/仓储/渲染错误转换为调用方可见的错误类别
// 约束:
// - 批次不存在与不属于请求者使用同一个错误，不泄露批次是否存在
// - 落库失败只返回笼统信息，不暴露部分状态
// ==========================================

use crate::importer::error::ImportError;
use crate::report::renderer::RenderError;
use crate::repository::error::RepositoryError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// 对外统一的"未找到或无权访问"提示
pub const NOT_FOUND_OR_DENIED_MESSAGE: &str = "Upload not found or access denied.";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 上传内容不合法（缺列、非数值等），携带具体原因
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    /// 批次不存在或不属于请求者
    #[error("{}", NOT_FOUND_OR_DENIED_MESSAGE)]
    NotFoundOrDenied,

    /// 落库失败（已整体回滚）
    #[error("存储失败: 上传未保存")]
    StorageFailure,

    #[error("报表生成失败: {0}")]
    RenderFailure(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

/// 错误类别（供外层请求处理层映射响应）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFoundOrDenied,
    Storage,
    Internal,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::ValidationError(_) => ErrorKind::Validation,
            ApiError::NotFoundOrDenied => ErrorKind::NotFoundOrDenied,
            ApiError::StorageFailure => ErrorKind::Storage,
            ApiError::RenderFailure(_) | ApiError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFoundOrDenied => 404,
            ErrorKind::Storage | ErrorKind::Internal => 500,
        }
    }
}

// ==========================================
// 从下层错误转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Storage(inner) => {
                error!(error = %inner, "上传落库失败");
                ApiError::StorageFailure
            }
            other => ApiError::ValidationError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFoundOrDenied,
            RepositoryError::IngestionRolledBack { .. } => {
                error!(error = %err, "批次写入回滚");
                ApiError::StorageFailure
            }
            other => {
                error!(error = %other, "仓储操作失败");
                ApiError::InternalError(other.to_string())
            }
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::RenderFailure(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_keeps_detail() {
        let err: ApiError = ImportError::MissingColumns {
            columns: vec!["Pressure".to_string()],
        }
        .into();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("Pressure"));
    }

    #[test]
    fn test_storage_failure_is_generic() {
        let err: ApiError = ImportError::Storage(RepositoryError::IngestionRolledBack {
            batch_id: "b1".to_string(),
            reason: "disk I/O error".to_string(),
        })
        .into();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.status_code(), 500);
        assert!(!err.to_string().contains("disk"));
    }

    #[test]
    fn test_repository_not_found_maps_to_gate_signal() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "UploadBatch".to_string(),
            id: "b1".to_string(),
        }
        .into();

        assert!(matches!(err, ApiError::NotFoundOrDenied));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), NOT_FOUND_OR_DENIED_MESSAGE);
    }

    #[test]
    fn test_render_error_is_internal() {
        let err: ApiError = RenderError::Layout("bad".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
