// ==========================================
// 化工设备报表系统 - 访问控制
// ==========================================
// 职责: 批次归属判定，所有按批次读取的入口共用同一判定
// 约束: 不存在与不属于请求者对外不可区分
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::equipment::{Requester, UploadBatch};
use crate::repository::BatchRepository;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct AccessGate {
    batch_repo: Arc<dyn BatchRepository>,
}

impl AccessGate {
    pub fn new(batch_repo: Arc<dyn BatchRepository>) -> Self {
        Self { batch_repo }
    }

    /// 请求者是否拥有该批次
    pub async fn owns_batch(&self, batch_id: &str, requester: &Requester) -> ApiResult<bool> {
        Ok(self.lookup(batch_id, requester).await?.is_some())
    }

    /// 返回请求者拥有的批次；否则 NotFoundOrDenied
    pub async fn require_owned(
        &self,
        batch_id: &str,
        requester: &Requester,
    ) -> ApiResult<UploadBatch> {
        self.lookup(batch_id, requester)
            .await?
            .ok_or(ApiError::NotFoundOrDenied)
    }

    async fn lookup(&self, batch_id: &str, requester: &Requester) -> ApiResult<Option<UploadBatch>> {
        let batch = self
            .batch_repo
            .get_batch(batch_id, &requester.user_id)
            .await?;
        if batch.is_none() {
            debug!(batch_id, user = %requester.user_id, "批次访问被拒绝");
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::equipment::UploadFile;
    use crate::repository::InMemoryBatchRepository;

    async fn setup() -> (AccessGate, String) {
        let repo = Arc::new(InMemoryBatchRepository::new());
        let batch = repo
            .create_batch(&UploadFile::new("a.csv", b"x".to_vec()), "alice")
            .await
            .unwrap();
        (AccessGate::new(repo), batch.batch_id)
    }

    #[tokio::test]
    async fn test_owner_passes() {
        let (gate, id) = setup().await;
        let alice = Requester::named("alice");

        assert!(gate.owns_batch(&id, &alice).await.unwrap());
        assert_eq!(gate.require_owned(&id, &alice).await.unwrap().batch_id, id);
    }

    #[tokio::test]
    async fn test_foreign_and_missing_are_indistinguishable() {
        let (gate, id) = setup().await;
        let bob = Requester::named("bob");

        let foreign = gate.require_owned(&id, &bob).await.unwrap_err();
        let missing = gate.require_owned("no-such-batch", &bob).await.unwrap_err();

        assert!(matches!(foreign, ApiError::NotFoundOrDenied));
        assert!(matches!(missing, ApiError::NotFoundOrDenied));
        assert_eq!(foreign.to_string(), missing.to_string());
        assert!(!gate.owns_batch(&id, &bob).await.unwrap());
    }
}
