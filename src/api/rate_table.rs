use crate::model::rate_table::RateTable;
use crate::payroll::error::PayrollError;
use crate::utils::rate_cache;
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

/// Everything but the year, which comes from the path.
#[derive(Deserialize, ToSchema)]
pub struct UpsertRateTable {
    #[schema(example = 150000)]
    pub income_deduction: i64,
    #[schema(example = 0.027)]
    pub simplified_tax_rate: f64,
    #[schema(example = 0.1)]
    pub local_tax_rate: f64,
    #[schema(example = 0.009)]
    pub employment_insurance_rate: f64,
    #[schema(example = 0.03545)]
    pub health_insurance_rate: f64,
    #[schema(example = 0.1295)]
    pub longterm_care_rate: f64,
    #[schema(example = 0.045)]
    pub national_pension_rate: f64,
    #[schema(example = 6170000)]
    pub pension_upper_limit: i64,
    #[schema(example = 390000)]
    pub pension_lower_limit: i64,
    #[schema(example = 127056982)]
    pub health_premium_upper: i64,
    #[schema(example = 279266)]
    pub health_premium_lower: i64,
}

/// Replace the statutory rate table for a year. The previous record is
/// kept (new row, latest wins); the year's cache entry is dropped.
#[utoipa::path(
    put,
    path = "/api/v1/rates/{year}",
    params(("year", description = "Effective year, e.g. 2026")),
    request_body = UpsertRateTable,
    responses(
        (status = 200, description = "Rates stored", body = Object, example = json!({
            "message": "Rates for 2026 stored"
        })),
        (status = 400, description = "Validation error", body = Object, example = json!({
            "message": "invalid pension_upper_limit: upper limit below lower limit"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Rates"
)]
pub async fn upsert_rates(
    pool: web::Data<MySqlPool>,
    path: web::Path<i32>,
    payload: web::Json<UpsertRateTable>,
) -> actix_web::Result<impl Responder> {
    let year = path.into_inner();
    let p = payload.into_inner();

    let table = RateTable {
        year,
        income_deduction: p.income_deduction,
        simplified_tax_rate: p.simplified_tax_rate,
        local_tax_rate: p.local_tax_rate,
        employment_insurance_rate: p.employment_insurance_rate,
        health_insurance_rate: p.health_insurance_rate,
        longterm_care_rate: p.longterm_care_rate,
        national_pension_rate: p.national_pension_rate,
        pension_upper_limit: p.pension_upper_limit,
        pension_lower_limit: p.pension_lower_limit,
        health_premium_upper: p.health_premium_upper,
        health_premium_lower: p.health_premium_lower,
    };

    if let Err(e) = table.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": e.to_string()
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO rate_tables
        (year, income_deduction, simplified_tax_rate, local_tax_rate,
         employment_insurance_rate, health_insurance_rate, longterm_care_rate,
         national_pension_rate, pension_upper_limit, pension_lower_limit,
         health_premium_upper, health_premium_lower)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(table.year)
    .bind(table.income_deduction)
    .bind(table.simplified_tax_rate)
    .bind(table.local_tax_rate)
    .bind(table.employment_insurance_rate)
    .bind(table.health_insurance_rate)
    .bind(table.longterm_care_rate)
    .bind(table.national_pension_rate)
    .bind(table.pension_upper_limit)
    .bind(table.pension_lower_limit)
    .bind(table.health_premium_upper)
    .bind(table.health_premium_lower)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, year, "Failed to store rate table");
        ErrorInternalServerError("Internal Server Error")
    })?;

    rate_cache::invalidate(year).await;
    info!(year, "Rate table replaced");

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Rates for {year} stored")
    })))
}

/// Fetch the effective rate table for a year
#[utoipa::path(
    get,
    path = "/api/v1/rates/{year}",
    params(("year", description = "Effective year")),
    responses(
        (status = 200, body = RateTable),
        (status = 404, description = "No rates configured for the year", body = Object, example = json!({
            "message": "no rate table configured for year 2026; set up rates before running payroll"
        }))
    ),
    tag = "Rates"
)]
pub async fn get_rates(
    pool: web::Data<MySqlPool>,
    path: web::Path<i32>,
) -> actix_web::Result<impl Responder> {
    let year = path.into_inner();

    let rates = rate_cache::get_rates(pool.get_ref(), year).await.map_err(|e| {
        error!(error = %e, year, "Failed to fetch rate table");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match rates {
        Some(r) => Ok(HttpResponse::Ok().json(r)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": PayrollError::RatesNotConfigured { year }.to_string()
        }))),
    }
}

/// List the years that have rates configured
#[utoipa::path(
    get,
    path = "/api/v1/rates",
    responses(
        (status = 200, description = "Configured years", body = Object, example = json!({
            "years": [2025, 2026]
        }))
    ),
    tag = "Rates"
)]
pub async fn list_rate_years(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let years: Vec<i32> =
        sqlx::query_scalar::<_, i32>("SELECT DISTINCT year FROM rate_tables ORDER BY year")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list rate years");
                ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(json!({ "years": years })))
}
