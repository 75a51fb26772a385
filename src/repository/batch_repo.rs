// ==========================================
// 化工设备报表系统 - 上传批次 Repository Trait
// ==========================================
// 职责: 定义批次与设备记录的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 实现者: SqliteBatchRepository（rusqlite） / InMemoryBatchRepository（测试替身）
// ==========================================

use crate::domain::equipment::{EquipmentDraft, EquipmentRecord, UploadBatch, UploadFile};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

/// 最近批次列表的默认条数
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

#[async_trait]
pub trait BatchRepository: Send + Sync {
    // ===== 写入 =====

    /// 创建上传批次（记录数为 0）并保存原始文件
    ///
    /// # 参数
    /// - file: 上传的原始文件
    /// - owner: 所有者引用
    ///
    /// # 返回
    /// - Ok(UploadBatch): 新建的批次
    async fn create_batch(&self, file: &UploadFile, owner: &str) -> RepositoryResult<UploadBatch>;

    /// 在单个事务中写入全部草稿并更新批次记录数
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数（同时写入 total_records）
    /// - Err(IngestionRolledBack): 任一写入失败，记录回滚且批次被删除
    /// - Err(NotFound): 批次不存在
    async fn commit_records(
        &self,
        batch_id: &str,
        drafts: Vec<EquipmentDraft>,
    ) -> RepositoryResult<usize>;

    /// 删除批次（级联删除记录与原始文件）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 批次不存在
    async fn delete_batch(&self, batch_id: &str) -> RepositoryResult<bool>;

    /// 解除某所有者与其批次的关联（批次保留，owner 置空）
    ///
    /// # 返回
    /// - Ok(usize): 受影响的批次数
    async fn release_owner(&self, owner: &str) -> RepositoryResult<usize>;

    // ===== 查询 =====

    /// 按所有者读取批次
    ///
    /// 批次不存在与不属于该所有者返回同一个 None
    async fn get_batch(&self, batch_id: &str, owner: &str)
        -> RepositoryResult<Option<UploadBatch>>;

    /// 所有者最近的批次（按创建时间倒序，最多 limit 条）
    async fn list_recent_batches(
        &self,
        owner: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<UploadBatch>>;

    /// 批次下的设备记录（按存储顺序，limit 为 None 时返回全部）
    async fn list_records(
        &self,
        batch_id: &str,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<EquipmentRecord>>;

    /// 批次下的设备记录数
    async fn count_records(&self, batch_id: &str) -> RepositoryResult<usize>;

    /// 读取批次保存的原始文件内容
    async fn get_batch_file(&self, batch_id: &str) -> RepositoryResult<Option<Vec<u8>>>;
}
