//! Statutory deduction calculator for daily wage earners.
//!
//! Computation order and rounding follow the published simplified
//! withholding formulas and must not be reordered: auditors check these
//! figures against the formulas step by step. Every monetary rounding in
//! this module is half-up to the nearest whole KRW (`round_krw`).

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::rate_table::RateTable;
use crate::payroll::aggregate::MonthlyLaborTotals;
use crate::payroll::error::PayrollError;

/// Withholdings and net pay for one worker's month. Deterministic from
/// its inputs; reproducible for audit without any stored state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DeductionBreakdown {
    pub income_tax: i64,
    pub resident_tax: i64,
    pub health_insurance: i64,
    pub longterm_care: i64,
    pub national_pension: i64,
    pub employment_insurance: i64,
    pub total_deductions: i64,
    pub net_pay: i64,
    /// Set when gross pay did not cover the deductions and net pay was
    /// clamped to 0. Flagged rows need manual review before filing.
    pub net_pay_clamped: bool,
}

impl DeductionBreakdown {
    pub const ZERO: DeductionBreakdown = DeductionBreakdown {
        income_tax: 0,
        resident_tax: 0,
        health_insurance: 0,
        longterm_care: 0,
        national_pension: 0,
        employment_insurance: 0,
        total_deductions: 0,
        net_pay: 0,
        net_pay_clamped: false,
    };
}

/// Half-up rounding to whole KRW. Contract: 0.5 always rounds away from
/// zero toward the next whole won (1350.5 → 1351). Inputs are never
/// negative in this module.
pub fn round_krw(amount: f64) -> i64 {
    (amount + 0.5).floor() as i64
}

fn clamp_base(labor_cost: i64, lower: i64, upper: i64) -> i64 {
    labor_cost.clamp(lower, upper)
}

/// Rate selection is pinned to the 15th of the target month.
pub fn reference_date(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 15).unwrap_or_default()
}

/// Computes the full breakdown for one worker's month.
///
/// The rate table must belong to the reference date's year; a mismatch is
/// reported as the rates being unconfigured for that year rather than
/// silently computing with a neighbouring year's constants.
pub fn calculate(
    daily_rate: i64,
    totals: &MonthlyLaborTotals,
    rates: &RateTable,
    reference: NaiveDate,
) -> Result<DeductionBreakdown, PayrollError> {
    if rates.year != reference.year() {
        return Err(PayrollError::RatesNotConfigured {
            year: reference.year(),
        });
    }

    // A month without any work has no contribution base: the statutory
    // floors assess labor cost, not the worker, so nothing is due.
    if totals.total_man_days == 0.0 && totals.total_labor_cost == 0 {
        return Ok(DeductionBreakdown::ZERO);
    }

    let labor_cost = totals.total_labor_cost;

    // 1. Income tax: per-day taxable base after the flat deduction, taxed
    //    at the simplified rate, rounded per day, then scaled by man-days.
    let taxable_day_base = (daily_rate - rates.income_deduction).max(0);
    let per_day_tax = round_krw(taxable_day_base as f64 * rates.simplified_tax_rate);
    let income_tax = round_krw(per_day_tax as f64 * totals.total_man_days);

    // 2. Resident tax is tax-on-tax: 10% of the already-rounded income tax.
    let resident_tax = round_krw(income_tax as f64 * rates.local_tax_rate);

    // 3. Employment insurance on the full labor cost.
    let employment_insurance = round_krw(labor_cost as f64 * rates.employment_insurance_rate);

    // 4. Health insurance: the clamp applies to the contribution base,
    //    not to the premium.
    let health_base = clamp_base(
        labor_cost,
        rates.health_premium_lower,
        rates.health_premium_upper,
    );
    let health_insurance = round_krw(health_base as f64 * rates.health_insurance_rate);

    // 5. Long-term care is a surcharge on the health premium just
    //    computed, never on the labor cost.
    let longterm_care = round_krw(health_insurance as f64 * rates.longterm_care_rate);

    // 6. National pension on the clamped pension base.
    let pension_base = clamp_base(
        labor_cost,
        rates.pension_lower_limit,
        rates.pension_upper_limit,
    );
    let national_pension = round_krw(pension_base as f64 * rates.national_pension_rate);

    // 7. The total is the field sum; it is never rounded independently.
    let total_deductions = income_tax
        + resident_tax
        + employment_insurance
        + health_insurance
        + longterm_care
        + national_pension;

    // 8. Net pay never goes negative; a shortfall is clamped and flagged
    //    for manual review instead of showing a negative take-home.
    let raw_net = labor_cost - total_deductions;
    let (net_pay, net_pay_clamped) = if raw_net < 0 { (0, true) } else { (raw_net, false) };

    Ok(DeductionBreakdown {
        income_tax,
        resident_tax,
        health_insurance,
        longterm_care,
        national_pension,
        employment_insurance,
        total_deductions,
        net_pay,
        net_pay_clamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> RateTable {
        RateTable {
            year: 2026,
            income_deduction: 150_000,
            simplified_tax_rate: 0.027,
            local_tax_rate: 0.1,
            employment_insurance_rate: 0.009,
            health_insurance_rate: 0.03545,
            longterm_care_rate: 0.1295,
            national_pension_rate: 0.045,
            pension_upper_limit: 6_170_000,
            pension_lower_limit: 390_000,
            health_premium_upper: 127_056_982,
            health_premium_lower: 279_266,
        }
    }

    fn totals(days: u32, man_days: f64, cost: i64) -> MonthlyLaborTotals {
        MonthlyLaborTotals {
            total_days: days,
            total_man_days: man_days,
            total_labor_cost: cost,
        }
    }

    fn reference() -> NaiveDate {
        reference_date(2026, 3)
    }

    #[test]
    fn half_up_rounding_at_exact_halves() {
        assert_eq!(round_krw(1350.5), 1351);
        assert_eq!(round_krw(1350.4999), 1350);
        assert_eq!(round_krw(0.5), 1);
        assert_eq!(round_krw(0.0), 0);
    }

    #[test]
    fn published_scenario_200k_rate_20_days() {
        // daily 200,000 − deduction 150,000 = 50,000 taxable per day;
        // 50,000 × 0.027 = 1,350/day; × 20 days = 27,000; resident 2,700.
        let b = calculate(200_000, &totals(20, 20.0, 4_000_000), &rates(), reference()).unwrap();
        assert_eq!(b.income_tax, 27_000);
        assert_eq!(b.resident_tax, 2_700);
    }

    #[test]
    fn round_trip_150k_daily_rate_is_tax_free() {
        // income_deduction equals the daily rate, so the taxable base is 0
        let b = calculate(150_000, &totals(22, 22.0, 3_300_000), &rates(), reference()).unwrap();
        assert_eq!(b.income_tax, 0);
        assert_eq!(b.resident_tax, 0);
    }

    #[test]
    fn zero_month_is_all_zero_and_net_zero() {
        let b = calculate(150_000, &MonthlyLaborTotals::ZERO, &rates(), reference()).unwrap();
        assert_eq!(b, DeductionBreakdown::ZERO);
        assert_eq!(b.net_pay, 0);
        assert!(!b.net_pay_clamped);
    }

    #[test]
    fn resident_tax_is_always_ten_percent_of_income_tax() {
        for daily_rate in [150_000, 163_000, 200_000, 500_000] {
            for man_days in [1.0, 7.5, 20.0] {
                let cost = (daily_rate as f64 * man_days) as i64;
                let b = calculate(daily_rate, &totals(1, man_days, cost), &rates(), reference())
                    .unwrap();
                assert_eq!(b.resident_tax, round_krw(b.income_tax as f64 * 0.1));
            }
        }
    }

    #[test]
    fn longterm_care_derives_from_health_premium_not_labor_cost() {
        let b = calculate(300_000, &totals(10, 10.0, 3_000_000), &rates(), reference()).unwrap();
        assert_eq!(b.longterm_care, round_krw(b.health_insurance as f64 * 0.1295));
        // would differ if computed from the labor cost directly
        assert_ne!(b.longterm_care, round_krw(3_000_000.0 * 0.1295));
    }

    #[test]
    fn total_deductions_is_exactly_the_field_sum() {
        let b = calculate(250_000, &totals(15, 15.0, 3_750_000), &rates(), reference()).unwrap();
        assert_eq!(
            b.total_deductions,
            b.income_tax
                + b.resident_tax
                + b.health_insurance
                + b.longterm_care
                + b.national_pension
                + b.employment_insurance
        );
        assert_eq!(b.net_pay, 3_750_000 - b.total_deductions);
    }

    #[test]
    fn pension_base_clamps_at_both_limits() {
        let r = rates();
        // at, below, above the floor
        for (cost, base) in [
            (r.pension_lower_limit, r.pension_lower_limit),
            (r.pension_lower_limit - 1, r.pension_lower_limit),
            (r.pension_lower_limit + 1, r.pension_lower_limit + 1),
            (r.pension_upper_limit, r.pension_upper_limit),
            (r.pension_upper_limit + 1, r.pension_upper_limit),
            (r.pension_upper_limit - 1, r.pension_upper_limit - 1),
        ] {
            let b = calculate(200_000, &totals(1, 1.0, cost), &r, reference()).unwrap();
            assert_eq!(b.national_pension, round_krw(base as f64 * r.national_pension_rate));
        }
    }

    #[test]
    fn health_base_clamps_at_both_limits() {
        let r = rates();
        for (cost, base) in [
            (r.health_premium_lower, r.health_premium_lower),
            (r.health_premium_lower - 1, r.health_premium_lower),
            (r.health_premium_upper, r.health_premium_upper),
            (r.health_premium_upper + 1, r.health_premium_upper),
        ] {
            let b = calculate(200_000, &totals(1, 1.0, cost), &r, reference()).unwrap();
            assert_eq!(b.health_insurance, round_krw(base as f64 * r.health_insurance_rate));
        }
    }

    #[test]
    fn negative_net_pay_clamps_to_zero_and_flags() {
        // Tiny gross with the statutory floors forces premiums above pay.
        let b = calculate(200_000, &totals(1, 0.1, 20_000), &rates(), reference()).unwrap();
        assert!(b.total_deductions > 20_000);
        assert_eq!(b.net_pay, 0);
        assert!(b.net_pay_clamped);
    }

    #[test]
    fn rate_year_mismatch_is_a_configuration_error() {
        let err = calculate(
            200_000,
            &totals(1, 1.0, 200_000),
            &rates(),
            NaiveDate::from_ymd_opt(2027, 3, 15).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, PayrollError::RatesNotConfigured { year: 2027 }));
    }
}
