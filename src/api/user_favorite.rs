use super::{ApiClient, RequestEnvelope, RequestOptions};
use crate::{
    error::ApiResult,
    models::{Article, FavoriteQuery, Page},
};

/// Favorites of the logged-in user; the server resolves the user from the bearer token.
pub struct UserFavoriteApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserFavoriteApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn add(&self, article_id: &str, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::post(format!("/knowledge/favorite/{}", article_id)),
                &opts,
                Some("Added to favorites"),
            )
            .await
    }

    pub async fn remove(&self, article_id: &str, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::delete(format!("/knowledge/favorite/{}", article_id)),
                &opts,
                Some("Removed from favorites"),
            )
            .await
    }

    pub async fn status(&self, article_id: &str, opts: RequestOptions) -> ApiResult<bool> {
        self.client
            .execute(
                RequestEnvelope::get(format!("/knowledge/favorite/{}/status", article_id)),
                &opts,
                None,
            )
            .await
    }

    pub async fn page(&self, query: &FavoriteQuery, opts: RequestOptions) -> ApiResult<Page<Article>> {
        let envelope = RequestEnvelope::get("/knowledge/favorite/page").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn count(&self, opts: RequestOptions) -> ApiResult<u64> {
        self.client
            .execute(RequestEnvelope::get("/knowledge/favorite/count"), &opts, None)
            .await
    }
}
