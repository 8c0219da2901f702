//! Site and requirement persistence operations.
//!
//! A site and its generated requirements are written in one transaction.
//! Requirements, artifacts and financial documents cascade with their
//! site at the schema level.

use chrono::{DateTime, Utc};
use ecolk_core::{
    NvosCategory, OrganizationId, Requirement, RequirementId, RequirementStatus, Site, SiteId,
    SiteProfile, WaterUseType,
};
use sqlx::PgPool;

use super::unknown_value;

/// Insert a site together with its requirements, atomically.
pub async fn insert_with_requirements(
    pool: &PgPool,
    site: &Site,
    requirements: &[Requirement],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO sites (id, organization_id, name, address, category, water_use_type, has_byproducts)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(i64::from(site.id))
    .bind(i64::from(site.organization_id))
    .bind(&site.name)
    .bind(&site.address)
    .bind(site.profile.category.as_str())
    .bind(site.profile.water_use_type.as_str())
    .bind(site.profile.has_byproducts)
    .execute(&mut *tx)
    .await?;

    for requirement in requirements {
        sqlx::query(
            "INSERT INTO requirements (id, site_id, title, basis, penalty_risk, status, deadline, responsible_person)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(i64::from(requirement.id))
        .bind(i64::from(requirement.site_id))
        .bind(&requirement.title)
        .bind(&requirement.basis)
        .bind(&requirement.penalty_risk)
        .bind(requirement.status.as_str())
        .bind(requirement.deadline)
        .bind(&requirement.responsible_person)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Delete a site; dependent rows cascade. Returns `false` if no row existed.
pub async fn delete(pool: &PgPool, id: SiteId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sites WHERE id = $1")
        .bind(i64::from(id))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Replace the mutable fields of a requirement. Returns `false` if the row
/// no longer exists.
pub async fn update_requirement(pool: &PgPool, requirement: &Requirement) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE requirements SET status = $1, deadline = $2, responsible_person = $3 WHERE id = $4",
    )
    .bind(requirement.status.as_str())
    .bind(requirement.deadline)
    .bind(&requirement.responsible_person)
    .bind(i64::from(requirement.id))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Load all sites on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Site>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SiteRow>(
        "SELECT id, organization_id, name, address, category, water_use_type, has_byproducts
         FROM sites ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(SiteRow::into_record).collect()
}

/// Load all requirements on startup.
pub async fn load_all_requirements(pool: &PgPool) -> Result<Vec<Requirement>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RequirementRow>(
        "SELECT id, site_id, title, basis, penalty_risk, status, deadline, responsible_person
         FROM requirements ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(RequirementRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct SiteRow {
    id: i64,
    organization_id: i64,
    name: String,
    address: String,
    category: String,
    water_use_type: String,
    has_byproducts: bool,
}

impl SiteRow {
    fn into_record(self) -> Result<Site, sqlx::Error> {
        let category = NvosCategory::parse(&self.category)
            .ok_or_else(|| unknown_value("sites.category", &self.category))?;
        let water_use_type = WaterUseType::parse(&self.water_use_type)
            .ok_or_else(|| unknown_value("sites.water_use_type", &self.water_use_type))?;
        Ok(Site {
            id: SiteId::new(self.id),
            organization_id: OrganizationId::new(self.organization_id),
            name: self.name,
            address: self.address,
            profile: SiteProfile {
                category,
                water_use_type,
                has_byproducts: self.has_byproducts,
            },
        })
    }
}

#[derive(sqlx::FromRow)]
struct RequirementRow {
    id: i64,
    site_id: i64,
    title: String,
    basis: String,
    penalty_risk: Option<String>,
    status: String,
    deadline: Option<DateTime<Utc>>,
    responsible_person: Option<String>,
}

impl RequirementRow {
    fn into_record(self) -> Result<Requirement, sqlx::Error> {
        let status = RequirementStatus::parse(&self.status)
            .ok_or_else(|| unknown_value("requirements.status", &self.status))?;
        Ok(Requirement {
            id: RequirementId::new(self.id),
            site_id: SiteId::new(self.site_id),
            title: self.title,
            basis: self.basis,
            penalty_risk: self.penalty_risk,
            status,
            deadline: self.deadline,
            responsible_person: self.responsible_person,
        })
    }
}
