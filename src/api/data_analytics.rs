use serde_json::Value;

use super::{ApiClient, RequestEnvelope, RequestOptions};
use crate::{error::ApiResult, models::DaysQuery};

/// Dashboard aggregates. Payloads are chart-shaped and passed through as JSON.
pub struct DataAnalyticsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DataAnalyticsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    async fn fetch(&self, endpoint: &str, query: &DaysQuery, opts: RequestOptions) -> ApiResult<Value> {
        let envelope =
            RequestEnvelope::get(format!("/data-analytics/{}", endpoint)).with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn overview(&self, query: &DaysQuery, opts: RequestOptions) -> ApiResult<Value> {
        self.fetch("overview", query, opts).await
    }

    pub async fn emotion_heatmap(&self, query: &DaysQuery, opts: RequestOptions) -> ApiResult<Value> {
        self.fetch("emotion-heatmap", query, opts).await
    }

    pub async fn system_overview(&self, query: &DaysQuery, opts: RequestOptions) -> ApiResult<Value> {
        self.fetch("system-overview", query, opts).await
    }

    pub async fn emotion_trend(&self, query: &DaysQuery, opts: RequestOptions) -> ApiResult<Value> {
        self.fetch("emotion-trend", query, opts).await
    }

    pub async fn consultation_stats(&self, query: &DaysQuery, opts: RequestOptions) -> ApiResult<Value> {
        self.fetch("consultation-stats", query, opts).await
    }

    pub async fn user_activity(&self, query: &DaysQuery, opts: RequestOptions) -> ApiResult<Value> {
        self.fetch("user-activity", query, opts).await
    }
}
