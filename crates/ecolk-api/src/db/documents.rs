//! Artifact metadata and financial document persistence operations.

use chrono::{DateTime, NaiveDate, Utc};
use ecolk_core::{ArtifactId, FinancialDocumentId, RequirementId, SiteId};
use sqlx::PgPool;
use uuid::Uuid;

use super::unknown_value;
use crate::state::{
    ArtifactRecord, FinancialDocumentRecord, FinancialDocumentStatus, FinancialDocumentType,
};

/// Insert artifact metadata.
pub async fn insert_artifact(pool: &PgPool, record: &ArtifactRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO artifacts (id, site_id, requirement_id, original_file_name, stored_file_name,
             mime_type, file_size, uploaded_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(i64::from(record.id))
    .bind(i64::from(record.site_id))
    .bind(record.requirement_id.map(i64::from))
    .bind(&record.original_file_name)
    .bind(record.stored_file_name)
    .bind(&record.mime_type)
    .bind(record.file_size)
    .bind(record.uploaded_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete artifact metadata. Returns `false` if no row existed.
pub async fn delete_artifact(pool: &PgPool, id: ArtifactId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM artifacts WHERE id = $1")
        .bind(i64::from(id))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Insert a financial document.
pub async fn insert_financial_document(
    pool: &PgPool,
    record: &FinancialDocumentRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO financial_documents (id, site_id, document_number, document_date,
             amount_kopecks, document_type, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(i64::from(record.id))
    .bind(i64::from(record.site_id))
    .bind(&record.document_number)
    .bind(record.document_date)
    .bind(record.amount_kopecks)
    .bind(record.document_type.as_str())
    .bind(record.status.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// Load all artifact metadata on startup.
pub async fn load_all_artifacts(pool: &PgPool) -> Result<Vec<ArtifactRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ArtifactRow>(
        "SELECT id, site_id, requirement_id, original_file_name, stored_file_name, mime_type,
                file_size, uploaded_at
         FROM artifacts ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ArtifactRow::into_record).collect())
}

/// Load all financial documents on startup.
pub async fn load_all_financial_documents(
    pool: &PgPool,
) -> Result<Vec<FinancialDocumentRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FinancialDocumentRow>(
        "SELECT id, site_id, document_number, document_date, amount_kopecks, document_type, status
         FROM financial_documents ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(FinancialDocumentRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct ArtifactRow {
    id: i64,
    site_id: i64,
    requirement_id: Option<i64>,
    original_file_name: String,
    stored_file_name: Uuid,
    mime_type: String,
    file_size: i64,
    uploaded_at: DateTime<Utc>,
}

impl ArtifactRow {
    fn into_record(self) -> ArtifactRecord {
        ArtifactRecord {
            id: ArtifactId::new(self.id),
            site_id: SiteId::new(self.site_id),
            requirement_id: self.requirement_id.map(RequirementId::new),
            original_file_name: self.original_file_name,
            stored_file_name: self.stored_file_name,
            mime_type: self.mime_type,
            file_size: self.file_size,
            uploaded_at: self.uploaded_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FinancialDocumentRow {
    id: i64,
    site_id: i64,
    document_number: String,
    document_date: NaiveDate,
    amount_kopecks: i64,
    document_type: String,
    status: String,
}

impl FinancialDocumentRow {
    fn into_record(self) -> Result<FinancialDocumentRecord, sqlx::Error> {
        let document_type = FinancialDocumentType::parse(&self.document_type)
            .ok_or_else(|| unknown_value("financial_documents.document_type", &self.document_type))?;
        let status = FinancialDocumentStatus::parse(&self.status)
            .ok_or_else(|| unknown_value("financial_documents.status", &self.status))?;
        Ok(FinancialDocumentRecord {
            id: FinancialDocumentId::new(self.id),
            site_id: SiteId::new(self.site_id),
            document_number: self.document_number,
            document_date: self.document_date,
            amount_kopecks: self.amount_kopecks,
            document_type,
            status,
        })
    }
}
