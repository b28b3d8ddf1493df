use serde_json::{Value, json};
use uuid::Uuid;

use super::{MockDb, MockRegistry, MockRequest, UploadedFile, bind, fail, ok, store::now_iso};
use crate::{
    api::HttpMethod,
    models::{ApiResponse, FileInfo, FileStatus},
};

pub fn register(registry: &mut MockRegistry, db: &MockDb) {
    bind(registry, db, HttpMethod::Post, "/file/upload", upload_business_file);
    bind(registry, db, HttpMethod::Post, "/file/upload/temp", upload_temp_file);
    bind(registry, db, HttpMethod::Post, "/file/upload/temp-business", upload_temp_business_file);
    bind(registry, db, HttpMethod::Put, "/file/confirm/:id", confirm_temp_file);
    bind(registry, db, HttpMethod::Get, "/file/business/:type/:id", files_by_business);
    bind(registry, db, HttpMethod::Get, "/file/business/:type/:id/:field", files_by_business_field);
    bind(registry, db, HttpMethod::Delete, "/file/:id", delete_file);
    bind(registry, db, HttpMethod::Delete, "/file/business/:type/:id", delete_files_by_business);
}

/// Stores the first uploaded file. Business fields are filled by the caller.
fn store_file(db: &MockDb, upload: &UploadedFile, status: FileStatus) -> FileInfo {
    let extension = upload
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext))
        .unwrap_or_default();
    let stored_name = format!("{}{}", Uuid::new_v4(), extension);

    let mut data = db.lock();
    let id = data.next_file_id;
    data.next_file_id += 1;

    let info = FileInfo {
        id,
        original_name: upload.file_name.clone(),
        file_url: format!("/files/{}", stored_name),
        stored_name,
        file_size: upload.bytes.len() as u64,
        content_type: upload.content_type.clone(),
        business_type: None,
        business_id: None,
        business_field: None,
        status,
        created_at: Some(now_iso()),
    };
    data.files.push(info.clone());
    info
}

fn save(db: &MockDb, info: &FileInfo) {
    let mut data = db.lock();
    if let Some(slot) = data.files.iter_mut().find(|f| f.id == info.id) {
        *slot = info.clone();
    }
}

fn upload_business_file(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(upload) = req.files.first() else {
        return fail("Please choose a file to upload", "400");
    };
    let (Some(business_type), Some(business_id), Some(business_field)) = (
        req.param_str("businessType"),
        req.param_str("businessId"),
        req.param_str("businessField"),
    ) else {
        return fail("businessType, businessId and businessField are required", "400");
    };

    let mut info = store_file(db, upload, FileStatus::Confirmed);
    info.business_type = Some(business_type);
    info.business_id = Some(business_id);
    info.business_field = Some(business_field);
    save(db, &info);
    ok(info, "File uploaded")
}

/// First phase of the two-phase protocol: the file is kept in an unassociated temp slot.
fn upload_temp_file(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(upload) = req.files.first() else {
        return fail("Please choose a file to upload", "400");
    };
    let info = store_file(db, upload, FileStatus::Temp);
    tracing::debug!("Stored temp file {} ({})", info.id, info.original_name);
    ok(info, "File pre-uploaded")
}

/// Temp upload that already knows its business type and field, but not the entity id.
fn upload_temp_business_file(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(upload) = req.files.first() else {
        return fail("Please choose a file to upload", "400");
    };
    let (Some(business_type), Some(business_field)) =
        (req.param_str("businessType"), req.param_str("businessField"))
    else {
        return fail("businessType and businessField are required", "400");
    };

    let mut info = store_file(db, upload, FileStatus::Temp);
    info.business_type = Some(business_type);
    info.business_field = Some(business_field);
    save(db, &info);
    ok(info, "Avatar pre-uploaded")
}

/// confirm_temp_file
///
/// Second phase: binds a temp file to `(businessType, businessId, businessField)`.
/// Unknown ids are a 404 envelope, an already-confirmed file a 400.
fn confirm_temp_file(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(id) = req.path_i64("id") else {
        return fail("Temp file not found", "404");
    };

    let mut data = db.lock();
    let Some(file) = data.files.iter_mut().find(|f| f.id == id) else {
        return fail("Temp file not found", "404");
    };
    if file.status == FileStatus::Confirmed {
        return fail("File has already been confirmed", "400");
    }

    let business_type = req.param_str("businessType").or(file.business_type.clone());
    let business_field = req.param_str("businessField").or(file.business_field.clone());
    let (Some(business_type), Some(business_id), Some(business_field)) =
        (business_type, req.param_str("businessId"), business_field)
    else {
        return fail("businessType, businessId and businessField are required", "400");
    };

    file.business_type = Some(business_type);
    file.business_id = Some(business_id);
    file.business_field = Some(business_field);
    file.status = FileStatus::Confirmed;
    ok(file.clone(), "File confirmed")
}

fn matching_files(
    db: &MockDb,
    business_type: &str,
    business_id: &str,
    business_field: Option<&str>,
) -> Vec<FileInfo> {
    db.lock()
        .files
        .iter()
        .filter(|f| f.status == FileStatus::Confirmed)
        .filter(|f| f.business_type.as_deref() == Some(business_type))
        .filter(|f| f.business_id.as_deref() == Some(business_id))
        .filter(|f| business_field.is_none_or(|field| f.business_field.as_deref() == Some(field)))
        .cloned()
        .collect()
}

fn files_by_business(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let files = matching_files(
        db,
        req.path_param("type").unwrap_or_default(),
        req.path_param("id").unwrap_or_default(),
        None,
    );
    ok(files, "Query successful")
}

fn files_by_business_field(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let files = matching_files(
        db,
        req.path_param("type").unwrap_or_default(),
        req.path_param("id").unwrap_or_default(),
        req.path_param("field"),
    );
    ok(files, "Query successful")
}

fn delete_file(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let id = req.path_i64("id");
    let mut data = db.lock();
    let before = data.files.len();
    data.files.retain(|f| Some(f.id) != id);
    if data.files.len() == before {
        return fail("File not found", "404");
    }
    ok(Value::Null, "File deleted")
}

/// Deletes every file of a business entity, optionally narrowed to one field.
fn delete_files_by_business(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let business_type = req.path_param("type").unwrap_or_default().to_string();
    let business_id = req.path_param("id").unwrap_or_default().to_string();
    let business_field = req.param_str("businessField");

    let mut data = db.lock();
    let before = data.files.len();
    data.files.retain(|f| {
        let hit = f.business_type.as_deref() == Some(business_type.as_str())
            && f.business_id.as_deref() == Some(business_id.as_str())
            && business_field
                .as_deref()
                .is_none_or(|field| f.business_field.as_deref() == Some(field));
        !hit
    });
    let deleted = before - data.files.len();
    ok(json!({ "deletedCount": deleted }), "Files deleted")
}
