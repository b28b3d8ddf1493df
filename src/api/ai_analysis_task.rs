use super::{ApiClient, RequestEnvelope, RequestOptions};
use crate::{
    error::ApiResult,
    models::{AiAnalysisTask, AiTaskQuery, AiTaskStatistics, BatchOperationResult, Page},
};

/// Admin view of the AI analysis queue.
pub struct AiAnalysisTaskApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AiAnalysisTaskApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn page(
        &self,
        query: &AiTaskQuery,
        opts: RequestOptions,
    ) -> ApiResult<Page<AiAnalysisTask>> {
        let envelope = RequestEnvelope::get("/ai-analysis-task/page").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn statistics(&self, opts: RequestOptions) -> ApiResult<AiTaskStatistics> {
        self.client
            .execute(RequestEnvelope::get("/ai-analysis-task/statistics"), &opts, None)
            .await
    }

    /// Only FAILED tasks with retries left are accepted.
    pub async fn retry(&self, task_id: i64, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::post(format!("/ai-analysis-task/{}/retry", task_id)),
                &opts,
                Some("Task retry triggered"),
            )
            .await
    }

    /// batch_retry
    ///
    /// Tasks are retried independently; the ones that could not be retried are listed in
    /// `fail_reasons` while the call itself still succeeds.
    pub async fn batch_retry(
        &self,
        task_ids: &[i64],
        opts: RequestOptions,
    ) -> ApiResult<BatchOperationResult> {
        let envelope = RequestEnvelope::post("/ai-analysis-task/batch-retry").with_json(&task_ids);
        self.client
            .execute(envelope, &opts, Some("Batch retry submitted"))
            .await
    }
}
