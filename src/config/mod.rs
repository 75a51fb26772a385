// ==========================================
// 化工设备报表系统 - 配置层
// ==========================================
// 职责: 启动配置（AppConfig）与运行期配置（ConfigManager）
// 存储: config_kv 表
// ==========================================

pub mod app_config;
pub mod config_manager;

// 重导出
pub use app_config::{get_default_db_path, AppConfig, DB_PATH_ENV};
pub use config_manager::{config_keys, ConfigManager};
