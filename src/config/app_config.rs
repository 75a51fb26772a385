// ==========================================
// 化工设备报表系统 - 启动配置
// ==========================================
// 职责: 数据库路径等启动期参数（环境变量 + 默认值）
// 优先级: CLI --db > EQUIPMENT_REPORT_DB_PATH > 用户数据目录 > 当前目录
// ==========================================

use std::path::PathBuf;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "EQUIPMENT_REPORT_DB_PATH";

const DATA_DIR_NAME: &str = "equipment-report";
const DB_FILE_NAME: &str = "equipment_report.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
}

impl AppConfig {
    /// 按默认规则解析配置
    pub fn load() -> Self {
        Self {
            db_path: get_default_db_path(),
        }
    }

    /// 显式指定数据库路径（CLI 参数）
    pub fn with_db_path(mut self, db_path: Option<String>) -> Self {
        if let Some(path) = db_path.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
            self.db_path = path;
        }
        self
    }
}

/// 获取默认数据库路径
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join(DATA_DIR_NAME);
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_path_overrides() {
        let cfg = AppConfig {
            db_path: "default.db".to_string(),
        }
        .with_db_path(Some("/tmp/x.db".to_string()));
        assert_eq!(cfg.db_path, "/tmp/x.db");
    }

    #[test]
    fn test_blank_cli_path_ignored() {
        let cfg = AppConfig {
            db_path: "default.db".to_string(),
        }
        .with_db_path(Some("  ".to_string()))
        .with_db_path(None);
        assert_eq!(cfg.db_path, "default.db");
    }

    #[test]
    fn test_default_path_ends_with_db_file() {
        assert!(get_default_db_path().ends_with(".db"));
    }
}
