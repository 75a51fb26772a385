// ==========================================
// 化工设备报表系统 - 配置管理器
// ==========================================
// 职责: 运行期可调参数的查询与覆写
// 存储: config_kv 表 (key-value + scope，仅使用 global)
// 约束: 配置缺失或格式错误时回退默认值，不阻断业务
// ==========================================

use crate::db::open_sqlite_connection;
use crate::report::builder::{DEFAULT_DETAIL_LIMIT, REPORT_TITLE};
use crate::repository::batch_repo::DEFAULT_HISTORY_LIMIT;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 全部 global 配置（按键排序）
    pub fn list_config(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 读取正整数配置；缺失或格式错误时返回默认值
    fn get_positive_usize(&self, key: &str, default: usize) -> Result<usize, Box<dyn Error>> {
        let Some(value) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match value.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %value,
                    default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    // ===== 业务配置 =====

    /// 历史列表条数（默认 5）
    pub fn get_history_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_usize(config_keys::HISTORY_LIMIT, DEFAULT_HISTORY_LIMIT)
    }

    /// 报表明细表条数上限（默认 50）
    pub fn get_report_detail_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_usize(config_keys::REPORT_DETAIL_LIMIT, DEFAULT_DETAIL_LIMIT)
    }

    /// 报表标题
    pub fn get_report_title(&self) -> Result<String, Box<dyn Error>> {
        let title = self
            .get_config_value(config_keys::REPORT_TITLE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| REPORT_TITLE.to_string());
        Ok(title)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const HISTORY_LIMIT: &str = "history_limit";
    pub const REPORT_DETAIL_LIMIT: &str = "report_detail_limit";
    pub const REPORT_TITLE: &str = "report_title";
}
