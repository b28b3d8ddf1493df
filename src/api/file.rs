use serde_json::Value;

use super::{ApiClient, FormPart, RequestEnvelope, RequestOptions};
use crate::{
    error::ApiResult,
    models::{BusinessInfo, FileAssociation, FileInfo, UploadFile},
};

/// FileApi
///
/// Direct business uploads plus the two-phase protocol: `upload_temp` parks a file under an
/// opaque temp id, `confirm_temp` later binds it to `(businessType, businessId, businessField)`.
pub struct FileApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FileApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn upload_business(
        &self,
        file: UploadFile,
        business: &BusinessInfo,
        opts: RequestOptions,
    ) -> ApiResult<FileInfo> {
        let mut parts = vec![
            FormPart::file("file", file),
            FormPart::text("businessType", business.business_type.clone()),
        ];
        if let Some(business_id) = &business.business_id {
            parts.push(FormPart::text("businessId", business_id.clone()));
        }
        parts.push(FormPart::text("businessField", business.business_field.clone()));

        let envelope = RequestEnvelope::post("/file/upload").with_multipart(parts);
        self.client
            .execute(envelope, &opts, Some("File uploaded"))
            .await
    }

    pub async fn upload_temp(&self, file: UploadFile, opts: RequestOptions) -> ApiResult<FileInfo> {
        let envelope = RequestEnvelope::post("/file/upload/temp")
            .with_multipart(vec![FormPart::file("file", file)]);
        self.client
            .execute(envelope, &opts, Some("File pre-uploaded"))
            .await
    }

    /// Temp upload that already knows its business type and field (avatars, covers).
    pub async fn upload_temp_business(
        &self,
        file: UploadFile,
        business: &BusinessInfo,
        opts: RequestOptions,
    ) -> ApiResult<FileInfo> {
        let envelope = RequestEnvelope::post("/file/upload/temp-business").with_multipart(vec![
            FormPart::file("file", file),
            FormPart::text("businessType", business.business_type.clone()),
            FormPart::text("businessField", business.business_field.clone()),
        ]);
        self.client
            .execute(envelope, &opts, Some("Avatar pre-uploaded"))
            .await
    }

    /// confirm_temp
    ///
    /// An unknown temp id is an application error with code `"404"`.
    pub async fn confirm_temp(
        &self,
        temp_file_id: i64,
        association: &FileAssociation,
        opts: RequestOptions,
    ) -> ApiResult<FileInfo> {
        let envelope =
            RequestEnvelope::put(format!("/file/confirm/{}", temp_file_id)).with_json(association);
        self.client
            .execute(envelope, &opts, Some("File confirmed"))
            .await
    }

    pub async fn by_business(
        &self,
        business_type: &str,
        business_id: &str,
        opts: RequestOptions,
    ) -> ApiResult<Vec<FileInfo>> {
        let envelope =
            RequestEnvelope::get(format!("/file/business/{}/{}", business_type, business_id));
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn by_business_field(
        &self,
        business_type: &str,
        business_id: &str,
        business_field: &str,
        opts: RequestOptions,
    ) -> ApiResult<Vec<FileInfo>> {
        let envelope = RequestEnvelope::get(format!(
            "/file/business/{}/{}/{}",
            business_type, business_id, business_field
        ));
        self.client.execute(envelope, &opts, None).await
    }

    pub async fn delete(&self, file_id: i64, opts: RequestOptions) -> ApiResult<()> {
        self.client
            .execute(
                RequestEnvelope::delete(format!("/file/{}", file_id)),
                &opts,
                Some("File deleted"),
            )
            .await
    }

    /// Deletes every file of an entity; `business_field` narrows it to one field.
    pub async fn delete_by_business(
        &self,
        business_type: &str,
        business_id: &str,
        business_field: Option<&str>,
        opts: RequestOptions,
    ) -> ApiResult<Value> {
        let mut envelope =
            RequestEnvelope::delete(format!("/file/business/{}/{}", business_type, business_id));
        if let Some(field) = business_field {
            envelope = envelope.with_query_pair("businessField", field);
        }
        self.client
            .execute(envelope, &opts, Some("Files deleted"))
            .await
    }
}
