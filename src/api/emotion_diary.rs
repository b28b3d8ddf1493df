use serde_json::Value;

use super::{ApiClient, RequestEnvelope, RequestOptions};
use crate::{
    error::ApiResult,
    models::{
        BatchOperationResult, DiaryQuery, EmotionDiary, EmotionDiaryRequest,
        EmotionDiaryStatistics, Page, StatisticsQuery, UpdateEmotionDiaryRequest,
    },
};

/// EmotionDiaryApi
///
/// One diary per user and day. The admin endpoints see every user's diaries and drive the
/// AI analysis queue.
pub struct EmotionDiaryApi<'a> {
    client: &'a ApiClient,
}

impl<'a> EmotionDiaryApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Creates the diary for `diary_date`, or updates the one already recorded that day.
    pub async fn save(
        &self,
        request: &EmotionDiaryRequest,
        opts: RequestOptions,
    ) -> ApiResult<EmotionDiary> {
        let envelope = RequestEnvelope::post("/emotion-diary").with_json(request);
        self.client
            .execute(envelope, &opts, Some("Emotion diary saved"))
            .await
    }

    /// Same as `save`, flagged `isEditMode=true` for the backend.
    pub async fn save_in_edit_mode(
        &self,
        request: &EmotionDiaryRequest,
        opts: RequestOptions,
    ) -> ApiResult<EmotionDiary> {
        let envelope = RequestEnvelope::post("/emotion-diary")
            .with_query_pair("isEditMode", true)
            .with_json(request);
        self.client
            .execute(envelope, &opts, Some("Emotion diary saved"))
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        request: &UpdateEmotionDiaryRequest,
        opts: RequestOptions,
    ) -> ApiResult<EmotionDiary> {
        let envelope = RequestEnvelope::put(format!("/emotion-diary/{}", id)).with_json(request);
        self.client
            .execute(envelope, &opts, Some("Emotion diary updated"))
            .await
    }

    pub async fn get(&self, id: i64, opts: RequestOptions) -> ApiResult<EmotionDiary> {
        self.client
            .execute(RequestEnvelope::get(format!("/emotion-diary/{}", id)), &opts, None)
            .await
    }

    /// `date` is `YYYY-MM-DD`. `None` when nothing was recorded that day.
    pub async fn by_date(&self, date: &str, opts: RequestOptions) -> ApiResult<Option<EmotionDiary>> {
        self.client
            .execute(
                RequestEnvelope::get(format!("/emotion-diary/date/{}", date)),
                &opts,
                None,
            )
            .await
    }

    pub async fn today(&self, opts: RequestOptions) -> ApiResult<Option<EmotionDiary>> {
        self.client
            .execute(RequestEnvelope::get("/emotion-diary/today"), &opts, None)
            .await
    }

    pub async fn page(&self, query: &DiaryQuery, opts: RequestOptions) -> ApiResult<Page<EmotionDiary>> {
        let envelope = RequestEnvelope::get("/emotion-diary/page").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn delete(&self, id: i64, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::delete(format!("/emotion-diary/{}", id)),
                &opts,
                Some("Emotion diary deleted"),
            )
            .await
    }

    pub async fn statistics(
        &self,
        query: &StatisticsQuery,
        opts: RequestOptions,
    ) -> ApiResult<EmotionDiaryStatistics> {
        let envelope = RequestEnvelope::get("/emotion-diary/statistics").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    // --- Admin ---

    pub async fn admin_page(
        &self,
        query: &DiaryQuery,
        opts: RequestOptions,
    ) -> ApiResult<Page<EmotionDiary>> {
        let envelope = RequestEnvelope::get("/emotion-diary/admin/page").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn admin_statistics(
        &self,
        query: &StatisticsQuery,
        opts: RequestOptions,
    ) -> ApiResult<Value> {
        let envelope = RequestEnvelope::get("/emotion-diary/admin/statistics").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn admin_delete(&self, id: i64, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::delete(format!("/emotion-diary/admin/{}", id)),
                &opts,
                Some("Deleted"),
            )
            .await
    }

    pub async fn admin_overview(&self, opts: RequestOptions) -> ApiResult<Value> {
        self.client
            .execute(RequestEnvelope::get("/emotion-diary/admin/overview"), &opts, None)
            .await
    }

    // --- AI analysis ---

    pub async fn ai_analysis(&self, id: i64, opts: RequestOptions) -> ApiResult<Value> {
        self.client
            .execute(
                RequestEnvelope::get(format!("/emotion-diary/{}/ai-analysis", id)),
                &opts,
                None,
            )
            .await
    }

    pub async fn trigger_ai_analysis(&self, id: i64, opts: RequestOptions) -> ApiResult<Value> {
        self.client
            .execute(
                RequestEnvelope::post(format!("/emotion-diary/{}/ai-analysis", id)),
                &opts,
                Some("AI analysis triggered, check back for the result"),
            )
            .await
    }

    pub async fn admin_trigger_ai_analysis(&self, id: i64, opts: RequestOptions) -> ApiResult<Value> {
        self.client
            .execute(
                RequestEnvelope::post(format!("/emotion-diary/admin/{}/ai-analysis", id)),
                &opts,
                Some("AI analysis queued, check back for the result"),
            )
            .await
    }

    /// The body is the bare array of diary ids.
    pub async fn admin_batch_ai_analysis(
        &self,
        diary_ids: &[i64],
        opts: RequestOptions,
    ) -> ApiResult<BatchOperationResult> {
        let envelope =
            RequestEnvelope::post("/emotion-diary/admin/batch-ai-analysis").with_json(&diary_ids);
        self.client
            .execute(envelope, &opts, Some("Batch AI analysis submitted"))
            .await
    }
}
