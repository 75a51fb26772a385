// ==========================================
// 化工设备报表系统 - 内存版上传批次 Repository
// ==========================================
// 用途: 不依赖数据库的测试替身，与 SqliteBatchRepository 行为一致
// 支持: 注入"第 N 条写入失败"以验证回滚路径
// ==========================================

use crate::domain::equipment::{EquipmentDraft, EquipmentRecord, UploadBatch, UploadFile};
use crate::repository::batch_repo::BatchRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredBatch {
    batch: UploadBatch,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct MemoryState {
    // 按创建顺序保存
    batches: Vec<StoredBatch>,
    records: Vec<EquipmentRecord>,
    next_record_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryBatchRepository {
    state: Mutex<MemoryState>,
    fail_on_insert: Option<usize>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 n 条记录（从 0 开始）写入时模拟存储失败
    pub fn failing_at(n: usize) -> Self {
        Self {
            state: Mutex::default(),
            fail_on_insert: Some(n),
        }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 当前保存的批次数量（不区分所有者）
    pub fn batch_count(&self) -> usize {
        self.lock().map(|s| s.batches.len()).unwrap_or(0)
    }

    /// 当前保存的记录数量（不区分批次）
    pub fn record_count(&self) -> usize {
        self.lock().map(|s| s.records.len()).unwrap_or(0)
    }

    fn stage_records(
        &self,
        state: &mut MemoryState,
        batch_id: &str,
        drafts: &[EquipmentDraft],
    ) -> RepositoryResult<Vec<EquipmentRecord>> {
        let mut staged = Vec::with_capacity(drafts.len());
        let mut next_id = state.next_record_id;
        for (idx, draft) in drafts.iter().enumerate() {
            if self.fail_on_insert == Some(idx) {
                return Err(RepositoryError::DatabaseQueryError(format!(
                    "模拟写入失败: 第 {} 条记录",
                    idx + 1
                )));
            }
            if !draft.has_finite_measurements() {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "第 {} 行测量值不是有限实数",
                    draft.row_number
                )));
            }
            next_id += 1;
            staged.push(EquipmentRecord {
                id: next_id,
                batch_id: batch_id.to_string(),
                equipment_name: draft.equipment_name.clone(),
                equipment_type: draft.equipment_type.clone(),
                flowrate: draft.flowrate,
                pressure: draft.pressure,
                temperature: draft.temperature,
            });
        }
        state.next_record_id = next_id;
        Ok(staged)
    }
}

#[async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn create_batch(&self, file: &UploadFile, owner: &str) -> RepositoryResult<UploadBatch> {
        let batch = UploadBatch {
            batch_id: Uuid::new_v4().to_string(),
            owner: Some(owner.to_string()),
            uploaded_at: Utc::now(),
            total_records: 0,
            file_name: file.storage_name(),
            file_size: file.content.len(),
        };
        let mut state = self.lock()?;
        state.batches.push(StoredBatch {
            batch: batch.clone(),
            content: file.content.clone(),
        });
        Ok(batch)
    }

    async fn commit_records(
        &self,
        batch_id: &str,
        drafts: Vec<EquipmentDraft>,
    ) -> RepositoryResult<usize> {
        let mut state = self.lock()?;
        if !state.batches.iter().any(|b| b.batch.batch_id == batch_id) {
            return Err(RepositoryError::NotFound {
                entity: "UploadBatch".to_string(),
                id: batch_id.to_string(),
            });
        }

        match self.stage_records(&mut state, batch_id, &drafts) {
            Ok(staged) => {
                let count = staged.len();
                state.records.extend(staged);
                if let Some(stored) = state
                    .batches
                    .iter_mut()
                    .find(|b| b.batch.batch_id == batch_id)
                {
                    stored.batch.total_records = count;
                }
                Ok(count)
            }
            Err(e) => {
                state.batches.retain(|b| b.batch.batch_id != batch_id);
                state.records.retain(|r| r.batch_id != batch_id);
                Err(RepositoryError::IngestionRolledBack {
                    batch_id: batch_id.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn delete_batch(&self, batch_id: &str) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        let before = state.batches.len();
        state.batches.retain(|b| b.batch.batch_id != batch_id);
        state.records.retain(|r| r.batch_id != batch_id);
        Ok(state.batches.len() < before)
    }

    async fn release_owner(&self, owner: &str) -> RepositoryResult<usize> {
        let mut state = self.lock()?;
        let mut released = 0;
        for stored in state.batches.iter_mut() {
            if stored.batch.owner.as_deref() == Some(owner) {
                stored.batch.owner = None;
                released += 1;
            }
        }
        Ok(released)
    }

    async fn get_batch(
        &self,
        batch_id: &str,
        owner: &str,
    ) -> RepositoryResult<Option<UploadBatch>> {
        let state = self.lock()?;
        Ok(state
            .batches
            .iter()
            .find(|b| b.batch.batch_id == batch_id && b.batch.owner.as_deref() == Some(owner))
            .map(|b| b.batch.clone()))
    }

    async fn list_recent_batches(
        &self,
        owner: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<UploadBatch>> {
        let state = self.lock()?;
        let mut owned: Vec<(usize, &UploadBatch)> = state
            .batches
            .iter()
            .enumerate()
            .filter(|(_, b)| b.batch.owner.as_deref() == Some(owner))
            .map(|(seq, b)| (seq, &b.batch))
            .collect();
        owned.sort_by(|(seq_a, a), (seq_b, b)| {
            b.uploaded_at.cmp(&a.uploaded_at).then(seq_b.cmp(seq_a))
        });
        Ok(owned.into_iter().take(limit).map(|(_, b)| b.clone()).collect())
    }

    async fn list_records(
        &self,
        batch_id: &str,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<EquipmentRecord>> {
        let state = self.lock()?;
        let records = state.records.iter().filter(|r| r.batch_id == batch_id);
        Ok(match limit {
            Some(n) => records.take(n).cloned().collect(),
            None => records.cloned().collect(),
        })
    }

    async fn count_records(&self, batch_id: &str) -> RepositoryResult<usize> {
        let state = self.lock()?;
        Ok(state.records.iter().filter(|r| r.batch_id == batch_id).count())
    }

    async fn get_batch_file(&self, batch_id: &str) -> RepositoryResult<Option<Vec<u8>>> {
        let state = self.lock()?;
        Ok(state
            .batches
            .iter()
            .find(|b| b.batch.batch_id == batch_id)
            .map(|b| b.content.clone()))
    }
}
