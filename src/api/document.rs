use std::str::FromStr;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::user::fetch_user;
use crate::auth::principal::Principal;
use crate::envelope::{ErrorEnvelope, SuccessEnvelope};
use crate::error::{ApiError, check_valid};
use crate::model::document::{Document, DocumentType};
use crate::storage::StorageClient;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UploadDocumentReq {
    #[serde(rename = "type")]
    #[schema(example = "Joining_Letter")]
    #[validate(length(min = 1, message = "Document type is required"))]
    pub doc_type: String,
    /// Embedded file payload forwarded to the storage provider.
    #[validate(length(min = 1, message = "No file data uploaded"))]
    pub file: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDocumentReq {
    #[serde(rename = "type")]
    #[schema(example = "AadharCard")]
    pub doc_type: Option<String>,
    pub file: Option<String>,
}

async fn fetch_document(
    pool: &MySqlPool,
    user_id: u64,
    document_id: u64,
) -> Result<Option<Document>, ApiError> {
    Ok(
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ? AND user_id = ?")
            .bind(document_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Upload a document for a user
#[utoipa::path(
    post,
    path = "/api/uploadDocument/{userId}",
    params(("userId", description = "User ID")),
    request_body = UploadDocumentReq,
    responses(
        (status = 200, description = "Document uploaded successfully", body = Document),
        (status = 400, description = "Invalid document type", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
pub async fn upload_document(
    admin: Principal,
    pool: web::Data<MySqlPool>,
    storage: web::Data<StorageClient>,
    path: web::Path<u64>,
    payload: web::Json<UploadDocumentReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;
    let user_id = path.into_inner();

    let user = fetch_user(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let doc_type = DocumentType::from_str(&payload.doc_type)
        .map_err(|_| ApiError::Validation("Invalid document type".into()))?;

    let file_url = storage.upload(&payload.file).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO documents (user_id, user_name, doc_type, file_url, upload_date)
        VALUES (?, ?, ?, ?, NOW())
        "#,
    )
    .bind(user_id)
    .bind(&user.user_name)
    .bind(doc_type.to_string())
    .bind(&file_url)
    .execute(pool.get_ref())
    .await?;

    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await?;

    info!(
        admin = %admin.username,
        user_id,
        doc_type = %doc_type,
        "document uploaded"
    );

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        document,
        200,
        "Document uploaded successfully",
    )))
}

/// List documents of a user
#[utoipa::path(
    get,
    path = "/api/documents/{userId}",
    params(("userId", description = "User ID")),
    responses(
        (status = 200, description = "Documents fetched successfully", body = Object),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    ),
    tag = "Documents"
)]
pub async fn get_documents(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let user = fetch_user(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let documents =
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool.get_ref())
            .await?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        json!({
            "userId": user.id,
            "userName": user.user_name,
            "documents": documents,
        }),
        200,
        "Documents fetched successfully",
    )))
}

/// Replace a user's document
#[utoipa::path(
    put,
    path = "/api/updateDocument/{userId}/{documentId}",
    params(
        ("userId", description = "User ID"),
        ("documentId", description = "Document ID")
    ),
    request_body = UpdateDocumentReq,
    responses(
        (status = 200, description = "Document updated successfully", body = Document),
        (status = 400, description = "No file data uploaded", body = ErrorEnvelope),
        (status = 404, description = "Document not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
pub async fn update_document(
    pool: web::Data<MySqlPool>,
    storage: web::Data<StorageClient>,
    path: web::Path<(u64, u64)>,
    payload: web::Json<UpdateDocumentReq>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, document_id) = path.into_inner();

    fetch_user(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let existing = fetch_document(pool.get_ref(), user_id, document_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))?;

    let doc_type = match &payload.doc_type {
        Some(raw) => DocumentType::from_str(raw)
            .map_err(|_| ApiError::Validation("Invalid document type".into()))?
            .to_string(),
        None => existing.doc_type.clone(),
    };

    let file = payload
        .file
        .as_deref()
        .filter(|file| !file.is_empty())
        .ok_or_else(|| ApiError::Validation("No file data uploaded".into()))?;
    let file_url = storage.upload(file).await?;

    sqlx::query(
        "UPDATE documents SET doc_type = ?, file_url = ?, upload_date = NOW() WHERE id = ?",
    )
    .bind(&doc_type)
    .bind(&file_url)
    .bind(document_id)
    .execute(pool.get_ref())
    .await?;

    let document = fetch_document(pool.get_ref(), user_id, document_id)
        .await?
        .ok_or_else(ApiError::internal)?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        document,
        200,
        "Document updated successfully",
    )))
}

/// Delete a document by id
#[utoipa::path(
    delete,
    path = "/api/document/{documentId}",
    params(("documentId", description = "Document ID")),
    responses(
        (status = 200, description = "Document deleted successfully", body = Document),
        (status = 404, description = "Document not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
pub async fn delete_document(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let document_id = path.into_inner();

    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
        .bind(document_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))?;

    sqlx::query("DELETE FROM documents WHERE id = ?")
        .bind(document_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        document,
        200,
        "Document deleted successfully",
    )))
}
