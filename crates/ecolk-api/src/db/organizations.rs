//! Organization persistence operations.

use ecolk_core::{Organization, OrganizationId};
use sqlx::PgPool;

/// Insert a new organization.
pub async fn insert(pool: &PgPool, record: &Organization) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO organizations (id, name, inn, ogrn) VALUES ($1, $2, $3, $4)")
        .bind(i64::from(record.id))
        .bind(&record.name)
        .bind(&record.inn)
        .bind(&record.ogrn)
        .execute(pool)
        .await?;
    Ok(())
}

/// Load all organizations on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Organization>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrganizationRow>(
        "SELECT id, name, inn, ogrn FROM organizations ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(OrganizationRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct OrganizationRow {
    id: i64,
    name: String,
    inn: String,
    ogrn: String,
}

impl OrganizationRow {
    fn into_record(self) -> Organization {
        Organization {
            id: OrganizationId::new(self.id),
            name: self.name,
            inn: self.inn,
            ogrn: self.ogrn,
        }
    }
}
