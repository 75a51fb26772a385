// ==========================================
// 化工设备报表系统 - 设备数据 API
// ==========================================
// 职责: 对外暴露上传/汇总/历史/明细/报表五个逻辑操作
// 约束:
// - 请求者身份显式传入，不使用全局"当前用户"
// - summary / data / batch_file 未通过归属判定时返回 NotFoundOrDenied
// - report 永远产出文档：未通过判定时正文替换为提示
// ==========================================

use crate::api::access_gate::AccessGate;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::equipment::{EquipmentRecord, Requester, UploadBatch, UploadFile};
use crate::domain::summary::Summary;
use crate::engine::SummaryEngine;
use crate::importer::{EquipmentImporter, EquipmentImporterImpl};
use crate::report::builder::{ReportBuilder, ReportContent, ReportInput, DEFAULT_DETAIL_LIMIT, REPORT_TITLE};
use crate::report::pdf::PdfRenderer;
use crate::report::renderer::Renderer;
use crate::repository::{BatchRepository, DEFAULT_HISTORY_LIMIT};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 上传响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// 批次ID
    pub id: String,
    pub uploaded_at: DateTime<Utc>,
    /// 原始文件存储引用（uploads/<文件名>）
    pub file: String,
    pub total_records: usize,
    /// 所有者显示名
    pub user: String,
}

/// 报表输出结果（正文已写入调用方提供的 Write）
#[derive(Debug, Clone, Serialize)]
pub struct RenderedReport {
    /// 下载文件名 report_<批次ID>.<扩展名>（批次 ID 中的非法字符替换为 '_'）
    pub file_name: String,
    pub content_type: &'static str,
    /// 批次是否通过归属判定（false 时正文为提示）
    pub found: bool,
}

impl RenderedReport {
    /// Content-Disposition 头的值
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

// ==========================================
// EquipmentApi
// ==========================================
pub struct EquipmentApi {
    batch_repo: Arc<dyn BatchRepository>,
    importer: Arc<dyn EquipmentImporter>,
    gate: AccessGate,
    engine: SummaryEngine,
    renderer: Arc<dyn Renderer>,
    config: Option<Arc<ConfigManager>>,
}

impl EquipmentApi {
    /// 创建 API 实例
    ///
    /// # 参数
    /// - batch_repo: 批次仓储
    /// - config: 运行期配置（None 时全部使用默认值）
    pub fn new(batch_repo: Arc<dyn BatchRepository>, config: Option<Arc<ConfigManager>>) -> Self {
        Self {
            importer: Arc::new(EquipmentImporterImpl::with_defaults(batch_repo.clone())),
            gate: AccessGate::new(batch_repo.clone()),
            batch_repo,
            engine: SummaryEngine::new(),
            renderer: Arc::new(PdfRenderer::new()),
            config,
        }
    }

    /// 替换报表渲染器
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    // ==========================================
    // 上传
    // ==========================================

    /// 上传文件：解析 → 校验 → 建批次 → 事务落库
    ///
    /// 失败时不留下任何批次
    #[instrument(skip(self, file), fields(file_name = %file.file_name, user = %requester.user_id))]
    pub async fn upload(&self, file: UploadFile, requester: &Requester) -> ApiResult<UploadResponse> {
        let batch = self.importer.import(&file, &requester.user_id).await?;

        Ok(UploadResponse {
            id: batch.batch_id,
            uploaded_at: batch.uploaded_at,
            file: batch.file_name,
            total_records: batch.total_records,
            user: requester.username.clone(),
        })
    }

    // ==========================================
    // 查询（经归属判定）
    // ==========================================

    pub async fn summary(&self, batch_id: &str, requester: &Requester) -> ApiResult<Summary> {
        self.gate.require_owned(batch_id, requester).await?;
        let records = self.batch_repo.list_records(batch_id, None).await?;
        Ok(self.engine.summarize(batch_id, &records))
    }

    /// 最近的上传批次（新的在前）
    pub async fn history(&self, requester: &Requester) -> ApiResult<Vec<UploadBatch>> {
        let limit = self.history_limit();
        Ok(self
            .batch_repo
            .list_recent_batches(&requester.user_id, limit)
            .await?)
    }

    /// 批次全部记录（不受明细表条数限制）
    pub async fn data(&self, batch_id: &str, requester: &Requester) -> ApiResult<Vec<EquipmentRecord>> {
        self.gate.require_owned(batch_id, requester).await?;
        Ok(self.batch_repo.list_records(batch_id, None).await?)
    }

    /// 批次保存的原始文件
    pub async fn batch_file(&self, batch_id: &str, requester: &Requester) -> ApiResult<Vec<u8>> {
        self.gate.require_owned(batch_id, requester).await?;
        self.batch_repo
            .get_batch_file(batch_id)
            .await?
            .ok_or(ApiError::NotFoundOrDenied)
    }

    // ==========================================
    // 报表
    // ==========================================

    /// 报表下载文件名
    ///
    /// 批次 ID 只保留字母、数字、'-' 与 '_'，结果不含路径分隔符
    pub fn report_file_name(&self, batch_id: &str) -> String {
        let safe: String = batch_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("report_{}.{}", safe, self.renderer.file_extension())
    }

    /// 生成报表，时间戳取本地当前时间
    pub async fn report(
        &self,
        batch_id: &str,
        requester: &Requester,
        out: &mut (dyn Write + Send),
    ) -> ApiResult<RenderedReport> {
        self.report_at(batch_id, requester, Local::now().naive_local(), out)
            .await
    }

    /// 生成报表（指定渲染时间）
    #[instrument(skip(self, out), fields(user = %requester.user_id))]
    pub async fn report_at(
        &self,
        batch_id: &str,
        requester: &Requester,
        rendered_at: NaiveDateTime,
        out: &mut (dyn Write + Send),
    ) -> ApiResult<RenderedReport> {
        let builder = self.report_builder();
        let found = self.gate.owns_batch(batch_id, requester).await?;

        let document = if found {
            let records = self.batch_repo.list_records(batch_id, None).await?;
            let summary = self.engine.summarize(batch_id, &records);
            builder.build(&ReportInput {
                batch_id,
                requester_name: &requester.username,
                rendered_at,
                content: ReportContent::Found {
                    summary: &summary,
                    records: &records,
                },
            })
        } else {
            builder.build(&ReportInput {
                batch_id,
                requester_name: &requester.username,
                rendered_at,
                content: ReportContent::NotFoundOrDenied,
            })
        };

        self.renderer.render(&document, out)?;
        info!(batch_id, found, "报表已生成");

        Ok(RenderedReport {
            file_name: self.report_file_name(batch_id),
            content_type: self.renderer.content_type(),
            found,
        })
    }

    // ==========================================
    // 维护操作
    // ==========================================

    /// 删除请求者自己的批次
    ///
    /// # 返回
    /// - Ok(usize): 随批次一并删除的记录数
    pub async fn delete_upload(&self, batch_id: &str, requester: &Requester) -> ApiResult<usize> {
        self.gate.require_owned(batch_id, requester).await?;
        let records = self.batch_repo.count_records(batch_id).await?;
        self.batch_repo.delete_batch(batch_id).await?;
        info!(batch_id, records, "批次已删除");
        Ok(records)
    }

    /// 移除用户：其批次保留但不再归属任何人
    pub async fn release_user(&self, user_id: &str) -> ApiResult<usize> {
        let released = self.batch_repo.release_owner(user_id).await?;
        info!(user_id, released, "用户批次已解除归属");
        Ok(released)
    }

    // ==========================================
    // 配置读取（失败时回退默认值）
    // ==========================================

    fn history_limit(&self) -> usize {
        match &self.config {
            Some(cfg) => cfg.get_history_limit().unwrap_or_else(|e| {
                warn!(error = %e, "读取 history_limit 失败，使用默认值");
                DEFAULT_HISTORY_LIMIT
            }),
            None => DEFAULT_HISTORY_LIMIT,
        }
    }

    fn report_builder(&self) -> ReportBuilder {
        let Some(cfg) = &self.config else {
            return ReportBuilder::new();
        };
        let detail_limit = cfg.get_report_detail_limit().unwrap_or_else(|e| {
            warn!(error = %e, "读取 report_detail_limit 失败，使用默认值");
            DEFAULT_DETAIL_LIMIT
        });
        let title = cfg.get_report_title().unwrap_or_else(|e| {
            warn!(error = %e, "读取 report_title 失败，使用默认值");
            REPORT_TITLE.to_string()
        });
        ReportBuilder::new()
            .with_title(title)
            .with_detail_limit(detail_limit)
    }
}
