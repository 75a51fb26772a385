// ==========================================
// 化工设备报表系统 - 应用状态
// ==========================================
// 职责: 打开数据库、建表，组装仓储/配置/API 实例
// 说明: 所有组件共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::EquipmentApi;
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::repository::{BatchRepository, SqliteBatchRepository};

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 建表后的 schema 版本
    pub schema_version: Option<i64>,

    /// 设备数据 API
    pub equipment_api: Arc<EquipmentApi>,

    /// 运行期配置
    pub config_manager: Arc<ConfigManager>,

    /// 批次仓储
    pub batch_repo: Arc<dyn BatchRepository>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let schema_version = read_schema_version(&conn)
            .map_err(|e| format!("无法读取schema版本: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let batch_repo: Arc<dyn BatchRepository> =
            Arc::new(SqliteBatchRepository::from_connection(conn.clone()));

        // ==========================================
        // 初始化配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let equipment_api = Arc::new(EquipmentApi::new(
            batch_repo.clone(),
            Some(config_manager.clone()),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            schema_version,
            equipment_api,
            config_manager,
            batch_repo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::equipment::{Requester, UploadFile};
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_state_wires_sqlite_pipeline() {
        let file = NamedTempFile::new().unwrap();
        let db_path = file.path().to_str().unwrap().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        let alice = Requester::named("alice");
        let resp = state
            .equipment_api
            .upload(
                UploadFile::new(
                    "a.csv",
                    "Equipment Name,Type,Flowrate,Pressure,Temperature\nP-1,Pump,1,2,3\n",
                ),
                &alice,
            )
            .await
            .unwrap();

        assert_eq!(resp.total_records, 1);
        assert_eq!(state.db_path, db_path);
        assert_eq!(state.schema_version, Some(crate::db::CURRENT_SCHEMA_VERSION));

        // 重新打开同一数据库，数据仍在
        let reopened = AppState::new(db_path).unwrap();
        let history = reopened.equipment_api.history(&alice).await.unwrap();
        assert_eq!(history.len(), 1);
    }
}
