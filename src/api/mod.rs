// ==========================================
// 化工设备报表系统 - API 层
// ==========================================
// 职责: 面向外部请求处理层的业务接口
// 说明: HTTP 路由与认证不在本层，身份以 Requester 显式传入
// ==========================================

pub mod access_gate;
pub mod equipment_api;
pub mod error;

pub use access_gate::AccessGate;
pub use equipment_api::{EquipmentApi, RenderedReport, UploadResponse};
pub use error::{ApiError, ApiResult, ErrorKind, NOT_FOUND_OR_DENIED_MESSAGE};
