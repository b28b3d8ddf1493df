use std::fmt::Display;

use serde_json::Value;

use super::{ApiClient, RequestEnvelope, RequestOptions};
use crate::{
    error::ApiResult,
    models::{
        ChatMessage, ChatSession, Page, SessionDetail, SessionEmotion, SessionQuery,
        StartSessionRequest, UpdateSessionTitleRequest,
    },
};

/// `/psychological-chat/*`: AI consultation sessions.
pub struct ConsultationApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ConsultationApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn start_session(
        &self,
        request: &StartSessionRequest,
        opts: RequestOptions,
    ) -> ApiResult<ChatSession> {
        let envelope =
            RequestEnvelope::post("/psychological-chat/session/start").with_json(request);
        self.client
            .execute(envelope, &opts, Some("Session created"))
            .await
    }

    pub async fn session_emotion(
        &self,
        session_id: impl Display,
        opts: RequestOptions,
    ) -> ApiResult<SessionEmotion> {
        let envelope =
            RequestEnvelope::get(format!("/psychological-chat/session/{}/emotion", session_id));
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn sessions(
        &self,
        query: &SessionQuery,
        opts: RequestOptions,
    ) -> ApiResult<Page<SessionDetail>> {
        let envelope = RequestEnvelope::get("/psychological-chat/sessions").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn delete_session(&self, session_id: impl Display, opts: RequestOptions) -> ApiResult<()> {
        let envelope =
            RequestEnvelope::delete(format!("/psychological-chat/sessions/{}", session_id));
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn session_detail(
        &self,
        session_id: impl Display,
        opts: RequestOptions,
    ) -> ApiResult<SessionDetail> {
        let envelope =
            RequestEnvelope::get(format!("/psychological-chat/sessions/{}", session_id));
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn messages(
        &self,
        session_id: impl Display,
        opts: RequestOptions,
    ) -> ApiResult<Vec<ChatMessage>> {
        let envelope =
            RequestEnvelope::get(format!("/psychological-chat/sessions/{}/messages", session_id));
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn update_title(
        &self,
        session_id: impl Display,
        request: &UpdateSessionTitleRequest,
        opts: RequestOptions,
    ) -> ApiResult<Value> {
        let envelope =
            RequestEnvelope::put(format!("/psychological-chat/sessions/{}/title", session_id))
                .with_json(request);
        self.client
            .execute(envelope, &opts, Some("Title updated"))
            .await
    }
}
