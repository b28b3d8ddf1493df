use super::{ApiClient, RequestEnvelope, RequestOptions};
use serde::de::Error as _;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        ChangePasswordRequest, ForgetPasswordQuery, LoginRequest, Page, RegisterRequest,
        StatusUpdate, UpdateUserRequest, UserInfo, UserQuery, UserStatistics,
    },
};

/// `/user/*`: authentication, profile and account administration.
pub struct UserApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// login
    ///
    /// On success the returned user and its token become the current session. A response
    /// without a token leaves the session untouched and fails as `ApiError::Decode`.
    pub async fn login(&self, request: &LoginRequest, opts: RequestOptions) -> ApiResult<UserInfo> {
        let envelope = RequestEnvelope::post("/user/login").with_json(request);
        // The success toast waits until the session is stored.
        let deferred = RequestOptions {
            success_msg: None,
            ..opts.clone()
        };
        let user: UserInfo = self.client.execute(envelope, &deferred, None).await?;

        let Some(token) = user.token.clone().filter(|token| !token.is_empty()) else {
            tracing::warn!("Login for {} returned no token", user.username);
            let error = serde_json::Error::custom("login response carried no token");
            return Err(self.client.report(ApiError::Decode(error), &opts));
        };
        self.client.session().login(token, user.clone());
        self.client.announce(&opts, Some("Login successful"));
        Ok(user)
    }

    /// logout
    ///
    /// The local session is cleared whether or not the server call succeeds.
    pub async fn logout(&self, opts: RequestOptions) -> ApiResult<()> {
        let result = self
            .client
            .execute(RequestEnvelope::post("/user/logout"), &opts, None)
            .await;
        self.client.session().logout();
        result
    }

    pub async fn register(
        &self,
        request: &RegisterRequest,
        opts: RequestOptions,
    ) -> ApiResult<UserInfo> {
        let envelope = RequestEnvelope::post("/user/add").with_json(request);
        self.client
            .execute(envelope, &opts, Some("Registration successful"))
            .await
    }

    pub async fn current(&self, opts: RequestOptions) -> ApiResult<UserInfo> {
        self.client
            .execute(RequestEnvelope::get("/user/current"), &opts, None)
            .await
    }

    pub async fn get(&self, id: i64, opts: RequestOptions) -> ApiResult<UserInfo> {
        self.client
            .execute(RequestEnvelope::get(format!("/user/{}", id)), &opts, None)
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        request: &UpdateUserRequest,
        opts: RequestOptions,
    ) -> ApiResult<UserInfo> {
        let envelope = RequestEnvelope::put(format!("/user/{}", id)).with_json(request);
        self.client
            .execute(envelope, &opts, Some("Profile updated"))
            .await
    }

    pub async fn change_password(
        &self,
        id: i64,
        request: &ChangePasswordRequest,
        opts: RequestOptions,
    ) -> ApiResult<()> {
        let envelope = RequestEnvelope::put(format!("/user/password/{}", id)).with_json(request);
        self.client
            .execute(envelope, &opts, Some("Password changed"))
            .await
    }

    /// Resets a password by email. Both fields travel in the query string.
    pub async fn forget_password(
        &self,
        query: &ForgetPasswordQuery,
        opts: RequestOptions,
    ) -> ApiResult<()> {
        let envelope = RequestEnvelope::get("/user/forget").with_query(query);
        self.client
            .execute(envelope, &opts, Some("Password reset"))
            .await
    }

    pub async fn page(&self, query: &UserQuery, opts: RequestOptions) -> ApiResult<Page<UserInfo>> {
        let envelope = RequestEnvelope::get("/user/page").with_query(query);
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn statistics(&self, opts: RequestOptions) -> ApiResult<UserStatistics> {
        self.client
            .execute(RequestEnvelope::get("/user/statistics"), &opts, None)
            .await
    }

    pub async fn update_status(&self, id: i64, status: i32, opts: RequestOptions) -> ApiResult<()> {
        let envelope = RequestEnvelope::put(format!("/user/{}/status", id))
            .with_json(&StatusUpdate { status });
        self.client
            .execute(envelope, &opts, Some("User status updated"))
            .await
    }

    pub async fn delete(&self, id: i64, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::delete(format!("/user/{}", id)),
                &opts,
                Some("User deleted"),
            )
            .await
    }
}
