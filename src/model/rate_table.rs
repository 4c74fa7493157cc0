use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::payroll::error::PayrollError;

/// Statutory constants for one effective year. Replaced wholesale by the
/// administrator; never mutated in place. KRW amounts are integers, rates
/// are fractions (0.027 = 2.7%).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "year": 2026,
        "income_deduction": 150000,
        "simplified_tax_rate": 0.027,
        "local_tax_rate": 0.1,
        "employment_insurance_rate": 0.009,
        "health_insurance_rate": 0.03545,
        "longterm_care_rate": 0.1295,
        "national_pension_rate": 0.045,
        "pension_upper_limit": 6170000,
        "pension_lower_limit": 390000,
        "health_premium_upper": 127056982,
        "health_premium_lower": 279266
    })
)]
pub struct RateTable {
    #[schema(example = 2026)]
    pub year: i32,

    /// Flat per-day deduction before income tax (the simplified table)
    #[schema(example = 150000)]
    pub income_deduction: i64,

    #[schema(example = 0.027)]
    pub simplified_tax_rate: f64,

    /// Statutorily 10% of income tax
    #[schema(example = 0.1)]
    pub local_tax_rate: f64,

    #[schema(example = 0.009)]
    pub employment_insurance_rate: f64,

    #[schema(example = 0.03545)]
    pub health_insurance_rate: f64,

    /// Surcharge on the health premium, not on labor cost
    #[schema(example = 0.1295)]
    pub longterm_care_rate: f64,

    #[schema(example = 0.045)]
    pub national_pension_rate: f64,

    /// Monthly-income cap/floor for the pension contribution base
    #[schema(example = 6170000)]
    pub pension_upper_limit: i64,
    #[schema(example = 390000)]
    pub pension_lower_limit: i64,

    /// Cap/floor on the health contribution base
    #[schema(example = 127056982)]
    pub health_premium_upper: i64,
    #[schema(example = 279266)]
    pub health_premium_lower: i64,
}

impl RateTable {
    /// Field-level validation run before a table is stored. All rates must
    /// be non-negative and each cap must not sit below its floor.
    pub fn validate(&self) -> Result<(), PayrollError> {
        let rates = [
            ("simplified_tax_rate", self.simplified_tax_rate),
            ("local_tax_rate", self.local_tax_rate),
            ("employment_insurance_rate", self.employment_insurance_rate),
            ("health_insurance_rate", self.health_insurance_rate),
            ("longterm_care_rate", self.longterm_care_rate),
            ("national_pension_rate", self.national_pension_rate),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(PayrollError::validation(field, "rate must be non-negative"));
            }
        }
        if self.income_deduction < 0 {
            return Err(PayrollError::validation(
                "income_deduction",
                "must be non-negative",
            ));
        }
        if self.pension_upper_limit < self.pension_lower_limit {
            return Err(PayrollError::validation(
                "pension_upper_limit",
                "upper limit below lower limit",
            ));
        }
        if self.health_premium_upper < self.health_premium_lower {
            return Err(PayrollError::validation(
                "health_premium_upper",
                "upper limit below lower limit",
            ));
        }
        Ok(())
    }
}
