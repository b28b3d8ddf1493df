use super::{ApiClient, RequestEnvelope, RequestOptions};
use crate::{
    error::ApiResult,
    models::{
        Article, ArticleQuery, ArticleStatistics, BatchDeleteRequest, BatchDeleteResult,
        CreateArticleRequest, Page, StatusUpdate, UpdateArticleRequest,
    },
};

/// `/knowledge/article/*`. Article ids are opaque strings.
pub struct KnowledgeArticleApi<'a> {
    client: &'a ApiClient,
}

impl<'a> KnowledgeArticleApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        request: &CreateArticleRequest,
        opts: RequestOptions,
    ) -> ApiResult<Article> {
        let envelope = RequestEnvelope::post("/knowledge/article").with_json(request);
        self.client
            .execute(envelope, &opts, Some("Article created"))
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateArticleRequest,
        opts: RequestOptions,
    ) -> ApiResult<Article> {
        let envelope =
            RequestEnvelope::put(format!("/knowledge/article/{}", id)).with_json(request);
        self.client
            .execute(envelope, &opts, Some("Article updated"))
            .await
    }

    pub async fn delete(&self, id: &str, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::delete(format!("/knowledge/article/{}", id)),
                &opts,
                Some("Article deleted"),
            )
            .await
    }

    /// Fetching an article counts as a read; `is_favorited` reflects the current session.
    pub async fn get(&self, id: &str, opts: RequestOptions) -> ApiResult<Article> {
        self.client
            .execute(
                RequestEnvelope::get(format!("/knowledge/article/{}", id)),
                &opts,
                None,
            )
            .await
    }

    pub async fn read(&self, id: &str, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::post(format!("/knowledge/article/{}/read", id)),
                &opts,
                None,
            )
            .await
    }

    pub async fn publish(&self, id: &str, opts: RequestOptions) -> ApiResult<Article> {
        self.client
            .execute(
                RequestEnvelope::post(format!("/knowledge/article/{}/publish", id)),
                &opts,
                Some("Article published"),
            )
            .await
    }

    pub async fn offline(&self, id: &str, opts: RequestOptions) -> ApiResult<Article> {
        self.client
            .execute(
                RequestEnvelope::post(format!("/knowledge/article/{}/offline", id)),
                &opts,
                Some("Article taken offline"),
            )
            .await
    }

    pub async fn page(&self, query: &ArticleQuery, opts: RequestOptions) -> ApiResult<Page<Article>> {
        let envelope = RequestEnvelope::get("/knowledge/article/page").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    /// `status`: 0 = draft, 1 = published, 2 = offline.
    pub async fn update_status(
        &self,
        id: &str,
        status: i32,
        opts: RequestOptions,
    ) -> ApiResult<Article> {
        let envelope = RequestEnvelope::put(format!("/knowledge/article/{}/status", id))
            .with_json(&StatusUpdate { status });
        self.client
            .execute(envelope, &opts, Some("Status updated"))
            .await
    }

    /// The ids travel as a JSON body on the DELETE.
    pub async fn batch_delete(
        &self,
        ids: Vec<String>,
        opts: RequestOptions,
    ) -> ApiResult<BatchDeleteResult> {
        let envelope = RequestEnvelope::delete("/knowledge/article/batch")
            .with_json(&BatchDeleteRequest { ids });
        self.client
            .execute(envelope, &opts, Some("Articles deleted"))
            .await
    }

    pub async fn statistics(&self, opts: RequestOptions) -> ApiResult<ArticleStatistics> {
        self.client
            .execute(
                RequestEnvelope::get("/knowledge/article/statistics"),
                &opts,
                None,
            )
            .await
    }
}
