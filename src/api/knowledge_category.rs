use super::{ApiClient, RequestEnvelope, RequestOptions};
use crate::{
    error::ApiResult,
    models::{Category, CategoryQuery, CreateCategoryRequest, Page, UpdateCategoryRequest},
};

pub struct KnowledgeCategoryApi<'a> {
    client: &'a ApiClient,
}

impl<'a> KnowledgeCategoryApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        request: &CreateCategoryRequest,
        opts: RequestOptions,
    ) -> ApiResult<Category> {
        let envelope = RequestEnvelope::post("/knowledge/category").with_json(request);
        self.client
            .execute(envelope, &opts, Some("Category created"))
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        request: &UpdateCategoryRequest,
        opts: RequestOptions,
    ) -> ApiResult<Category> {
        let envelope =
            RequestEnvelope::put(format!("/knowledge/category/{}", id)).with_json(request);
        self.client
            .execute(envelope, &opts, Some("Category updated"))
            .await
    }

    pub async fn delete(&self, id: i64, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::delete(format!("/knowledge/category/{}", id)),
                &opts,
                Some("Category deleted"),
            )
            .await
    }

    pub async fn get(&self, id: i64, opts: RequestOptions) -> ApiResult<Category> {
        self.client
            .execute(
                RequestEnvelope::get(format!("/knowledge/category/{}", id)),
                &opts,
                None,
            )
            .await
    }

    pub async fn page(
        &self,
        query: &CategoryQuery,
        opts: RequestOptions,
    ) -> ApiResult<Page<Category>> {
        let envelope = RequestEnvelope::get("/knowledge/category/page").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    /// Root categories with their `children` filled in.
    pub async fn tree(&self, opts: RequestOptions) -> ApiResult<Vec<Category>> {
        self.client
            .execute(RequestEnvelope::get("/knowledge/category/tree"), &opts, None)
            .await
    }
}
