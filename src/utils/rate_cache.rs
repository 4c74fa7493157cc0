use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::model::rate_table::RateTable;

/// year => most recent active rate table for that year
pub static RATE_CACHE: Lazy<Cache<i32, RateTable>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(64) // a handful of effective years
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

const SELECT_FOR_YEAR: &str = r#"
    SELECT year, income_deduction, simplified_tax_rate, local_tax_rate,
           employment_insurance_rate, health_insurance_rate, longterm_care_rate,
           national_pension_rate, pension_upper_limit, pension_lower_limit,
           health_premium_upper, health_premium_lower
    FROM rate_tables
    WHERE year = ?
    ORDER BY id DESC
    LIMIT 1
"#;

/// Cached lookup. `Ok(None)` means the year genuinely has no configured
/// table; callers must turn that into a blocking configuration error.
pub async fn get_rates(pool: &MySqlPool, year: i32) -> Result<Option<RateTable>> {
    if let Some(rates) = RATE_CACHE.get(&year).await {
        return Ok(Some(rates));
    }

    let rates = sqlx::query_as::<_, RateTable>(SELECT_FOR_YEAR)
        .bind(year)
        .fetch_optional(pool)
        .await?;

    if let Some(ref r) = rates {
        RATE_CACHE.insert(year, r.clone()).await;
    }
    Ok(rates)
}

/// Drop the cached entry after an administrator replaces a year's table.
pub async fn invalidate(year: i32) {
    RATE_CACHE.invalidate(&year).await;
}

/// Load every configured year into the in-memory cache at startup.
pub async fn warmup_rate_cache(pool: &MySqlPool) -> Result<()> {
    let mut stream = sqlx::query_as::<_, RateTable>(
        r#"
        SELECT t.year, t.income_deduction, t.simplified_tax_rate, t.local_tax_rate,
               t.employment_insurance_rate, t.health_insurance_rate, t.longterm_care_rate,
               t.national_pension_rate, t.pension_upper_limit, t.pension_lower_limit,
               t.health_premium_upper, t.health_premium_lower
        FROM rate_tables t
        INNER JOIN (
            SELECT year, MAX(id) AS id FROM rate_tables GROUP BY year
        ) latest ON latest.id = t.id
        "#,
    )
    .fetch(pool);

    let mut total_count = 0usize;
    while let Some(row) = stream.next().await {
        let rates = row?;
        RATE_CACHE.insert(rates.year, rates).await;
        total_count += 1;
    }

    log::info!("Rate cache warmup complete: {} configured year(s)", total_count);

    Ok(())
}
