// ==========================================
// 化工设备报表系统 - 设备数据导入器实现
// ==========================================
// 职责: 整合导入流程，从上传文件到数据库
// 流程: 解析 → 列校验 + 映射 → 建批次 → 事务落库
// 约束: 校验失败不建批次；落库失败批次与记录一并删除
// ==========================================

use crate::domain::equipment::{UploadBatch, UploadFile};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::EquipmentFieldMapper;
use crate::importer::file_parser::CsvParser;
use crate::importer::importer_trait::{EquipmentImporter, FieldMapper, FileParser};
use crate::repository::BatchRepository;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

// ==========================================
// EquipmentImporterImpl - 设备数据导入器实现
// ==========================================
pub struct EquipmentImporterImpl {
    // 数据访问层
    batch_repo: Arc<dyn BatchRepository>,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
}

impl EquipmentImporterImpl {
    /// 创建导入器
    ///
    /// # 参数
    /// - batch_repo: 批次仓储
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    pub fn new(
        batch_repo: Arc<dyn BatchRepository>,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
    ) -> Self {
        Self {
            batch_repo,
            file_parser,
            field_mapper,
        }
    }

    /// 使用 CSV 解析器与标准字段映射器创建导入器
    pub fn with_defaults(batch_repo: Arc<dyn BatchRepository>) -> Self {
        Self::new(
            batch_repo,
            Box::new(CsvParser::new()),
            Box::new(EquipmentFieldMapper),
        )
    }
}

#[async_trait]
impl EquipmentImporter for EquipmentImporterImpl {
    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.content.len()))]
    async fn import(&self, file: &UploadFile, owner: &str) -> ImportResult<UploadBatch> {
        let start_time = Instant::now();
        info!(owner = owner, "开始导入设备数据");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let table = self.file_parser.parse(&file.content).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        info!(total_rows = table.rows.len(), "文件解析完成");

        // === 步骤 2: 列校验与字段映射 ===
        debug!("步骤 2: 列校验与字段映射");
        let drafts = self.field_mapper.map_table(&table).map_err(|e| {
            error!(error = %e, "字段映射失败，未创建批次");
            e
        })?;
        debug!(drafts = drafts.len(), "字段映射完成");

        // === 步骤 3: 创建批次 ===
        let batch = self.batch_repo.create_batch(file, owner).await?;
        info!(batch_id = %batch.batch_id, "批次已创建");

        // === 步骤 4: 事务落库 ===
        let count = match self.batch_repo.commit_records(&batch.batch_id, drafts).await {
            Ok(count) => count,
            Err(e) => {
                error!(batch_id = %batch.batch_id, error = %e, "落库失败，删除批次");
                // 仓储在取锁或查询阶段失败时不会自行清理
                match self.batch_repo.delete_batch(&batch.batch_id).await {
                    Ok(removed) => debug!(batch_id = %batch.batch_id, removed, "批次清理完成"),
                    Err(cleanup) => {
                        error!(batch_id = %batch.batch_id, error = %cleanup, "批次清理失败")
                    }
                }
                return Err(ImportError::Storage(e));
            }
        };

        info!(
            batch_id = %batch.batch_id,
            records = count,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "设备数据导入完成"
        );

        Ok(UploadBatch {
            total_records: count,
            ..batch
        })
    }
}
