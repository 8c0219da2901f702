//! Legal-act reference directory persistence operations.

use ecolk_core::LegalActId;
use sqlx::PgPool;

use crate::state::LegalActRecord;

/// Insert a new legal act.
pub async fn insert(pool: &PgPool, record: &LegalActRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO legal_acts (id, title, reference_code, description, external_link)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(i64::from(record.id))
    .bind(&record.title)
    .bind(&record.reference_code)
    .bind(&record.description)
    .bind(&record.external_link)
    .execute(pool)
    .await?;
    Ok(())
}

/// Replace every field of a legal act. Returns `false` if the row no longer exists.
pub async fn update(pool: &PgPool, record: &LegalActRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE legal_acts SET title = $1, reference_code = $2, description = $3,
             external_link = $4
         WHERE id = $5",
    )
    .bind(&record.title)
    .bind(&record.reference_code)
    .bind(&record.description)
    .bind(&record.external_link)
    .bind(i64::from(record.id))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a legal act. Returns `false` if no row existed.
pub async fn delete(pool: &PgPool, id: LegalActId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM legal_acts WHERE id = $1")
        .bind(i64::from(id))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Load the whole directory on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<LegalActRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LegalActRow>(
        "SELECT id, title, reference_code, description, external_link
         FROM legal_acts ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(LegalActRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct LegalActRow {
    id: i64,
    title: String,
    reference_code: String,
    description: Option<String>,
    external_link: Option<String>,
}

impl LegalActRow {
    fn into_record(self) -> LegalActRecord {
        LegalActRecord {
            id: LegalActId::new(self.id),
            title: self.title,
            reference_code: self.reference_code,
            description: self.description,
            external_link: self.external_link,
        }
    }
}
