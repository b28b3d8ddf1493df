use serde_json::Value;

use super::{ApiClient, RequestEnvelope, RequestOptions};
use crate::{
    error::ApiResult,
    models::{EvaluationSubmission, ScoreQuery},
};

pub struct PsychologicalTestApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PsychologicalTestApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Questions and options of a test.
    pub async fn detail(&self, test_id: i64, opts: RequestOptions) -> ApiResult<Value> {
        self.client
            .execute(
                RequestEnvelope::get(format!("/psychological-test/{}/detail", test_id)),
                &opts,
                None,
            )
            .await
    }

    pub async fn info(&self, test_id: i64, opts: RequestOptions) -> ApiResult<Value> {
        self.client
            .execute(
                RequestEnvelope::get(format!("/psychological-test/{}/info", test_id)),
                &opts,
                None,
            )
            .await
    }

    pub async fn report(&self, report_id: i64, score: i32, opts: RequestOptions) -> ApiResult<Value> {
        let envelope = RequestEnvelope::get(format!("/psychological-test/report/{}", report_id))
            .with_query(&ScoreQuery { score });
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn submit(
        &self,
        submission: &EvaluationSubmission,
        opts: RequestOptions,
    ) -> ApiResult<Value> {
        let envelope = RequestEnvelope::post("/psychological-test/submit").with_json(submission);
        self.client.execute(envelope, &opts, None).await
    }
}
