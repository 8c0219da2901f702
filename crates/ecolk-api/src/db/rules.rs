//! Generation rule persistence operations.
//!
//! Category triggers are stored as four nullable boolean columns so the
//! tri-state survives a round trip.

use ecolk_core::{RuleId, WaterUseType};
use ecolk_rules::{CategoryTriggers, GenerationRule};
use sqlx::PgPool;

use super::unknown_value;

/// Insert a new rule.
pub async fn insert(pool: &PgPool, rule: &GenerationRule) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO generation_rules (id, description, trigger_category_i, trigger_category_ii,
             trigger_category_iii, trigger_category_iv, trigger_water_use_type, trigger_has_byproducts,
             generated_title, generated_basis, generated_penalty_risk, is_active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(i64::from(rule.id))
    .bind(&rule.description)
    .bind(rule.category_triggers.i)
    .bind(rule.category_triggers.ii)
    .bind(rule.category_triggers.iii)
    .bind(rule.category_triggers.iv)
    .bind(rule.trigger_water_use_type.map(|w| w.as_str()))
    .bind(rule.trigger_has_byproducts)
    .bind(&rule.generated_title)
    .bind(&rule.generated_basis)
    .bind(&rule.generated_penalty_risk)
    .bind(rule.is_active)
    .execute(pool)
    .await?;
    Ok(())
}

/// Replace every field of a rule. Returns `false` if the row no longer exists.
pub async fn update(pool: &PgPool, rule: &GenerationRule) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE generation_rules SET description = $1, trigger_category_i = $2,
             trigger_category_ii = $3, trigger_category_iii = $4, trigger_category_iv = $5,
             trigger_water_use_type = $6, trigger_has_byproducts = $7, generated_title = $8,
             generated_basis = $9, generated_penalty_risk = $10, is_active = $11
         WHERE id = $12",
    )
    .bind(&rule.description)
    .bind(rule.category_triggers.i)
    .bind(rule.category_triggers.ii)
    .bind(rule.category_triggers.iii)
    .bind(rule.category_triggers.iv)
    .bind(rule.trigger_water_use_type.map(|w| w.as_str()))
    .bind(rule.trigger_has_byproducts)
    .bind(&rule.generated_title)
    .bind(&rule.generated_basis)
    .bind(&rule.generated_penalty_risk)
    .bind(rule.is_active)
    .bind(i64::from(rule.id))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a rule. Returns `false` if no row existed.
pub async fn delete(pool: &PgPool, id: RuleId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM generation_rules WHERE id = $1")
        .bind(i64::from(id))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Load the whole catalog on startup, in catalog order.
pub async fn load_all(pool: &PgPool) -> Result<Vec<GenerationRule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RuleRow>(
        "SELECT id, description, trigger_category_i, trigger_category_ii, trigger_category_iii,
                trigger_category_iv, trigger_water_use_type, trigger_has_byproducts,
                generated_title, generated_basis, generated_penalty_risk, is_active
         FROM generation_rules ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(RuleRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    id: i64,
    description: String,
    trigger_category_i: Option<bool>,
    trigger_category_ii: Option<bool>,
    trigger_category_iii: Option<bool>,
    trigger_category_iv: Option<bool>,
    trigger_water_use_type: Option<String>,
    trigger_has_byproducts: Option<bool>,
    generated_title: String,
    generated_basis: String,
    generated_penalty_risk: Option<String>,
    is_active: bool,
}

impl RuleRow {
    fn into_record(self) -> Result<GenerationRule, sqlx::Error> {
        let trigger_water_use_type = match self.trigger_water_use_type.as_deref() {
            Some(raw) => Some(
                WaterUseType::parse(raw)
                    .ok_or_else(|| unknown_value("generation_rules.trigger_water_use_type", raw))?,
            ),
            None => None,
        };
        Ok(GenerationRule {
            id: RuleId::new(self.id),
            description: self.description,
            category_triggers: CategoryTriggers {
                i: self.trigger_category_i,
                ii: self.trigger_category_ii,
                iii: self.trigger_category_iii,
                iv: self.trigger_category_iv,
            },
            trigger_water_use_type,
            trigger_has_byproducts: self.trigger_has_byproducts,
            generated_title: self.generated_title,
            generated_basis: self.generated_basis,
            generated_penalty_risk: self.generated_penalty_risk,
            is_active: self.is_active,
        })
    }
}
