// ==========================================
// 化工设备报表系统 - 上传批次 Repository 实现
// ==========================================
// 职责: 使用 rusqlite 实现批次/记录/原始文件的数据访问
// 红线: Repository 不含业务规则，只做数据 CRUD
// 约束: commit_records 失败时记录与批次一并删除，不留空批次
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::equipment::{EquipmentDraft, EquipmentRecord, UploadBatch, UploadFile};
use crate::repository::batch_repo::BatchRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

const BATCH_COLUMNS: &str =
    "batch_id, owner_id, uploaded_at, total_records, file_name, file_size";

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e)))
}

fn map_batch_row(row: &Row<'_>) -> rusqlite::Result<UploadBatch> {
    let uploaded_at: String = row.get(2)?;
    Ok(UploadBatch {
        batch_id: row.get(0)?,
        owner: row.get(1)?,
        uploaded_at: parse_timestamp(&uploaded_at)?,
        total_records: row.get::<_, i64>(3)? as usize,
        file_name: row.get(4)?,
        file_size: row.get::<_, i64>(5)? as usize,
    })
}

fn map_record_row(row: &Row<'_>) -> rusqlite::Result<EquipmentRecord> {
    Ok(EquipmentRecord {
        id: row.get(0)?,
        batch_id: row.get(1)?,
        equipment_name: row.get(2)?,
        equipment_type: row.get(3)?,
        flowrate: row.get(4)?,
        pressure: row.get(5)?,
        temperature: row.get(6)?,
    })
}

// ==========================================
// SqliteBatchRepository
// ==========================================
pub struct SqliteBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBatchRepository {
    /// 打开数据库文件并创建仓储（不建表，建表见 db::init_schema）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从共享连接创建仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn batch_exists(conn: &Connection, batch_id: &str) -> RepositoryResult<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM upload_batch WHERE batch_id = ?1",
                params![batch_id],
                |_row| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// 在事务中写入全部草稿并回写记录数；任一失败则事务随 Drop 回滚
    fn commit_records_tx(
        conn: &mut Connection,
        batch_id: &str,
        drafts: &[EquipmentDraft],
    ) -> RepositoryResult<usize> {
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO equipment_record (
                    batch_id, equipment_name, equipment_type,
                    flowrate, pressure, temperature
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;

            for draft in drafts {
                if !draft.has_finite_measurements() {
                    return Err(RepositoryError::ConstraintViolation(format!(
                        "第 {} 行测量值不是有限实数",
                        draft.row_number
                    )));
                }
                stmt.execute(params![
                    batch_id,
                    draft.equipment_name,
                    draft.equipment_type,
                    draft.flowrate,
                    draft.pressure,
                    draft.temperature,
                ])?;
            }
        }

        let count = drafts.len();
        tx.execute(
            "UPDATE upload_batch SET total_records = ?1 WHERE batch_id = ?2",
            params![count as i64, batch_id],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }
}

#[async_trait]
impl BatchRepository for SqliteBatchRepository {
    async fn create_batch(&self, file: &UploadFile, owner: &str) -> RepositoryResult<UploadBatch> {
        let batch = UploadBatch {
            batch_id: Uuid::new_v4().to_string(),
            owner: Some(owner.to_string()),
            uploaded_at: Utc::now(),
            total_records: 0,
            file_name: file.storage_name(),
            file_size: file.content.len(),
        };

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO upload_batch (
                batch_id, owner_id, uploaded_at, total_records, file_name, file_size
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5)
            "#,
            params![
                batch.batch_id,
                batch.owner,
                format_timestamp(&batch.uploaded_at),
                batch.file_name,
                batch.file_size as i64,
            ],
        )?;
        tx.execute(
            "INSERT INTO upload_file (batch_id, content) VALUES (?1, ?2)",
            params![batch.batch_id, file.content],
        )?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(batch_id = %batch.batch_id, owner = owner, "批次已创建");
        Ok(batch)
    }

    async fn commit_records(
        &self,
        batch_id: &str,
        drafts: Vec<EquipmentDraft>,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;

        if !Self::batch_exists(&conn, batch_id)? {
            return Err(RepositoryError::NotFound {
                entity: "UploadBatch".to_string(),
                id: batch_id.to_string(),
            });
        }

        match Self::commit_records_tx(&mut conn, batch_id, &drafts) {
            Ok(count) => {
                info!(batch_id = batch_id, records = count, "设备记录写入完成");
                Ok(count)
            }
            Err(e) => {
                warn!(batch_id = batch_id, error = %e, "设备记录写入失败，删除批次");
                if let Err(cleanup) = conn.execute(
                    "DELETE FROM upload_batch WHERE batch_id = ?1",
                    params![batch_id],
                ) {
                    return Err(RepositoryError::DatabaseTransactionError(format!(
                        "回滚后删除批次失败: {} (原因: {})",
                        cleanup, e
                    )));
                }
                Err(RepositoryError::IngestionRolledBack {
                    batch_id: batch_id.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn delete_batch(&self, batch_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM upload_batch WHERE batch_id = ?1",
            params![batch_id],
        )?;
        Ok(rows > 0)
    }

    async fn release_owner(&self, owner: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE upload_batch SET owner_id = NULL WHERE owner_id = ?1",
            params![owner],
        )?;
        Ok(rows)
    }

    async fn get_batch(
        &self,
        batch_id: &str,
        owner: &str,
    ) -> RepositoryResult<Option<UploadBatch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM upload_batch WHERE batch_id = ?1 AND owner_id = ?2",
            BATCH_COLUMNS
        );
        let batch = conn
            .query_row(&sql, params![batch_id, owner], map_batch_row)
            .optional()?;
        Ok(batch)
    }

    async fn list_recent_batches(
        &self,
        owner: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<UploadBatch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM upload_batch WHERE owner_id = ?1 \
             ORDER BY uploaded_at DESC, rowid DESC LIMIT ?2",
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![owner, limit as i64], map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    async fn list_records(
        &self,
        batch_id: &str,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<EquipmentRecord>> {
        let conn = self.get_conn()?;
        // SQLite: LIMIT -1 表示不限制
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let mut stmt = conn.prepare(
            r#"
            SELECT id, batch_id, equipment_name, equipment_type,
                   flowrate, pressure, temperature
            FROM equipment_record
            WHERE batch_id = ?1
            ORDER BY id ASC
            LIMIT ?2
            "#,
        )?;
        let records = stmt
            .query_map(params![batch_id, limit], map_record_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn count_records(&self, batch_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM equipment_record WHERE batch_id = ?1",
            params![batch_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn get_batch_file(&self, batch_id: &str) -> RepositoryResult<Option<Vec<u8>>> {
        let conn = self.get_conn()?;
        let content = conn
            .query_row(
                "SELECT content FROM upload_file WHERE batch_id = ?1",
                params![batch_id],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn setup_repo() -> SqliteBatchRepository {
        let conn = open_in_memory().unwrap();
        SqliteBatchRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn sample_drafts() -> Vec<EquipmentDraft> {
        vec![
            EquipmentDraft::new("P-100", "Pump", 12.5, 3.0, 70.0),
            EquipmentDraft::new("P-101", "Pump", 10.0, 2.5, 68.0),
            EquipmentDraft::new("V-200", "Valve", 5.0, 1.0, 25.0),
        ]
    }

    fn sample_file() -> UploadFile {
        UploadFile::new("plant.csv", b"Equipment Name,Type\n".to_vec())
    }

    #[tokio::test]
    async fn test_create_and_commit() {
        let repo = setup_repo();
        let batch = repo.create_batch(&sample_file(), "alice").await.unwrap();
        assert_eq!(batch.total_records, 0);
        assert_eq!(batch.file_name, "uploads/plant.csv");

        let count = repo.commit_records(&batch.batch_id, sample_drafts()).await.unwrap();
        assert_eq!(count, 3);

        let stored = repo.get_batch(&batch.batch_id, "alice").await.unwrap().unwrap();
        assert_eq!(stored.total_records, 3);
        assert_eq!(repo.count_records(&batch.batch_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_records_keep_file_order() {
        let repo = setup_repo();
        let batch = repo.create_batch(&sample_file(), "alice").await.unwrap();
        repo.commit_records(&batch.batch_id, sample_drafts()).await.unwrap();

        let records = repo.list_records(&batch.batch_id, None).await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.equipment_name.as_str()).collect();
        assert_eq!(names, vec!["P-100", "P-101", "V-200"]);

        let limited = repo.list_records(&batch.batch_id, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_commit_failure_removes_batch_and_records() {
        let repo = setup_repo();
        let batch = repo.create_batch(&sample_file(), "alice").await.unwrap();

        let mut drafts = sample_drafts();
        drafts[2].temperature = f64::NAN;
        drafts[2].row_number = 3;

        let err = repo.commit_records(&batch.batch_id, drafts).await.unwrap_err();
        assert!(matches!(err, RepositoryError::IngestionRolledBack { .. }));

        assert!(repo.get_batch(&batch.batch_id, "alice").await.unwrap().is_none());
        assert_eq!(repo.count_records(&batch.batch_id).await.unwrap(), 0);
        assert!(repo.get_batch_file(&batch.batch_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_unknown_batch() {
        let repo = setup_repo();
        let err = repo.commit_records("missing", sample_drafts()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_batch_hides_other_owner() {
        let repo = setup_repo();
        let batch = repo.create_batch(&sample_file(), "alice").await.unwrap();

        assert!(repo.get_batch(&batch.batch_id, "alice").await.unwrap().is_some());
        assert!(repo.get_batch(&batch.batch_id, "bob").await.unwrap().is_none());
        assert!(repo.get_batch("missing", "alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_batches_newest_first() {
        let repo = setup_repo();
        let mut ids = Vec::new();
        for _ in 0..7 {
            ids.push(repo.create_batch(&sample_file(), "alice").await.unwrap().batch_id);
        }
        repo.create_batch(&sample_file(), "bob").await.unwrap();

        let recent = repo.list_recent_batches("alice", 5).await.unwrap();
        let recent_ids: Vec<String> = recent.into_iter().map(|b| b.batch_id).collect();
        let expected: Vec<String> = ids.iter().rev().take(5).cloned().collect();
        assert_eq!(recent_ids, expected);
    }

    #[tokio::test]
    async fn test_delete_batch_cascades() {
        let repo = setup_repo();
        let batch = repo.create_batch(&sample_file(), "alice").await.unwrap();
        repo.commit_records(&batch.batch_id, sample_drafts()).await.unwrap();

        assert!(repo.delete_batch(&batch.batch_id).await.unwrap());
        assert!(!repo.delete_batch(&batch.batch_id).await.unwrap());
        assert_eq!(repo.count_records(&batch.batch_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_release_owner_keeps_batch() {
        let repo = setup_repo();
        let batch = repo.create_batch(&sample_file(), "alice").await.unwrap();
        repo.commit_records(&batch.batch_id, sample_drafts()).await.unwrap();

        assert_eq!(repo.release_owner("alice").await.unwrap(), 1);
        assert!(repo.get_batch(&batch.batch_id, "alice").await.unwrap().is_none());
        assert_eq!(repo.count_records(&batch.batch_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_file_content_retained() {
        let repo = setup_repo();
        let batch = repo.create_batch(&sample_file(), "alice").await.unwrap();
        let content = repo.get_batch_file(&batch.batch_id).await.unwrap().unwrap();
        assert_eq!(content, b"Equipment Name,Type\n".to_vec());
    }
}
