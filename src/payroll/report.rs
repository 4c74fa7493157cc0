//! Assembles the report aggregate the three renderers consume. Built on
//! demand from a fetched snapshot; nothing here is persisted.

use serde::Serialize;

use crate::model::project::Project;
use crate::model::rate_table::RateTable;
use crate::model::work_record::WorkRecord;
use crate::model::worker::DailyWorker;
use crate::payroll::aggregate::{aggregate_month, MonthlyLaborTotals};
use crate::payroll::deduction::{calculate, reference_date, DeductionBreakdown};
use crate::payroll::error::{BlockedWorker, PayrollError};

#[derive(Debug, Clone)]
pub struct PayrollEntry {
    pub worker: DailyWorker,
    /// man_days per calendar day, index 0 = day 1
    pub days: [f64; 31],
    pub totals: MonthlyLaborTotals,
    pub breakdown: DeductionBreakdown,
    /// Latest worked day of the month (1-based), if any
    pub last_worked_day: Option<u32>,
}

/// Column sums across all workers. Day columns are intentionally absent:
/// none of the formats totals them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub total_man_days: f64,
    pub total_labor_cost: i64,
    pub income_tax: i64,
    pub resident_tax: i64,
    pub health_insurance: i64,
    pub longterm_care: i64,
    pub national_pension: i64,
    pub employment_insurance: i64,
    pub total_deductions: i64,
    pub net_pay: i64,
}

#[derive(Debug, Clone)]
pub struct SitePayrollReport {
    pub project_id: u64,
    pub project_name: String,
    pub year: i32,
    pub month: u32,
    pub entries: Vec<PayrollEntry>,
    pub totals: ReportTotals,
    /// Worker names whose net pay was clamped to 0; these rows need
    /// manual review before the figures are filed.
    pub review: Vec<String>,
}

/// Builds the full report aggregate, failing closed: no rates for the
/// year, or blocked workers carrying attendance, abort before any figure
/// is produced.
pub fn build_report(
    project: &Project,
    workers: &[DailyWorker],
    records: &[WorkRecord],
    rates: Option<&RateTable>,
    year: i32,
    month: u32,
) -> Result<SitePayrollReport, PayrollError> {
    let rates = rates.ok_or(PayrollError::RatesNotConfigured { year })?;

    let blocked: Vec<BlockedWorker> = workers
        .iter()
        .filter(|w| w.is_blocked() && records.iter().any(|r| r.worker_id == w.id && r.man_days > 0.0))
        .map(|w| BlockedWorker {
            worker_id: w.id,
            name: w.name.clone(),
            reason: w
                .blocked_reason
                .clone()
                .unwrap_or_else(|| "missing required documents".to_string()),
        })
        .collect();
    if !blocked.is_empty() {
        return Err(PayrollError::BlockedWorkers(blocked));
    }

    let reference = reference_date(year, month);
    let months = aggregate_month(workers, records, year, month);

    let mut entries = Vec::with_capacity(workers.len());
    let mut totals = ReportTotals::default();
    let mut review = Vec::new();

    for (worker, wm) in workers.iter().zip(months) {
        let breakdown = calculate(worker.daily_rate, &wm.totals, rates, reference)?;
        if breakdown.net_pay_clamped {
            review.push(worker.name.clone());
        }

        totals.total_man_days += wm.totals.total_man_days;
        totals.total_labor_cost += wm.totals.total_labor_cost;
        totals.income_tax += breakdown.income_tax;
        totals.resident_tax += breakdown.resident_tax;
        totals.health_insurance += breakdown.health_insurance;
        totals.longterm_care += breakdown.longterm_care;
        totals.national_pension += breakdown.national_pension;
        totals.employment_insurance += breakdown.employment_insurance;
        totals.total_deductions += breakdown.total_deductions;
        totals.net_pay += breakdown.net_pay;

        entries.push(PayrollEntry {
            worker: worker.clone(),
            days: wm.days,
            totals: wm.totals,
            breakdown,
            last_worked_day: wm.last_worked_day(),
        });
    }

    Ok(SitePayrollReport {
        project_id: project.id,
        project_name: project.name.clone(),
        year,
        month,
        entries,
        totals,
        review,
    })
}

impl SitePayrollReport {
    /// Download name convention: `{kind}_{project}_{YYYY}-{MM}.xlsx`.
    pub fn file_name(&self, kind: &str) -> String {
        let project: String = self
            .project_name
            .chars()
            .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
            .collect();
        format!("{}_{}_{:04}-{:02}.xlsx", kind, project, self.year, self.month)
    }
}
