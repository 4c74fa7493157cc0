//! Folds sparse daily attendance into per-worker monthly totals. Pure:
//! everything comes in through parameters, nothing is cached across calls.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::work_record::WorkRecord;
use crate::model::worker::DailyWorker;

/// Per-worker totals for one calendar month. Derived on every view from
/// the work records; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct MonthlyLaborTotals {
    /// Distinct dates with man_days > 0
    pub total_days: u32,
    pub total_man_days: f64,
    /// daily_rate × total_man_days, in KRW
    pub total_labor_cost: i64,
}

impl MonthlyLaborTotals {
    pub const ZERO: MonthlyLaborTotals = MonthlyLaborTotals {
        total_days: 0,
        total_man_days: 0.0,
        total_labor_cost: 0,
    };
}

/// One worker's month: the day-indexed man-days map plus the totals.
#[derive(Debug, Clone)]
pub struct WorkerMonth {
    pub worker_id: u64,
    /// man_days per calendar day, index 0 = day 1. Days past the end of
    /// the month stay 0.
    pub days: [f64; 31],
    pub totals: MonthlyLaborTotals,
}

impl WorkerMonth {
    /// Latest day of the month with man_days > 0, if any (1-based).
    pub fn last_worked_day(&self) -> Option<u32> {
        self.days
            .iter()
            .rposition(|&d| d > 0.0)
            .map(|i| i as u32 + 1)
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(d) => d.pred_opt().map(|p| p.day()).unwrap_or(31),
        None => 31,
    }
}

/// Aggregates the month for every listed worker. Records outside the
/// target month are ignored, records for unknown workers are skipped, and
/// a worker with no records still yields an all-zero entry so the payroll
/// sheet always lists every active worker.
pub fn aggregate_month(
    workers: &[DailyWorker],
    records: &[WorkRecord],
    year: i32,
    month: u32,
) -> Vec<WorkerMonth> {
    workers
        .iter()
        .map(|worker| {
            let mut days = [0.0_f64; 31];
            for rec in records {
                if rec.worker_id != worker.id {
                    continue;
                }
                if rec.work_date.year() != year || rec.work_date.month() != month {
                    continue;
                }
                days[rec.work_date.day() as usize - 1] = rec.man_days;
            }

            let total_days = days.iter().filter(|&&d| d > 0.0).count() as u32;
            let total_man_days: f64 = days.iter().sum();
            let total_labor_cost = (worker.daily_rate as f64 * total_man_days).round() as i64;

            WorkerMonth {
                worker_id: worker.id,
                days,
                totals: MonthlyLaborTotals {
                    total_days,
                    total_man_days,
                    total_labor_cost,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(id: u64, daily_rate: i64) -> DailyWorker {
        DailyWorker {
            id,
            name: format!("worker-{id}"),
            job_code: "01".into(),
            daily_rate,
            is_foreign: false,
            nationality_code: None,
            visa_code: None,
            national_id: Some("900101-1234567".into()),
            phone: Some("010-1234-5678".into()),
            insurance_type: None,
            status: "active".into(),
            blocked_reason: None,
        }
    }

    fn record(worker_id: u64, y: i32, m: u32, d: u32, man_days: f64) -> WorkRecord {
        WorkRecord {
            id: 0,
            worker_id,
            project_id: 1,
            work_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            man_days,
        }
    }

    #[test]
    fn twenty_two_full_days_at_150k() {
        let workers = [worker(1, 150_000)];
        let records: Vec<_> = (1..=22).map(|d| record(1, 2026, 3, d, 1.0)).collect();

        let months = aggregate_month(&workers, &records, 2026, 3);
        assert_eq!(months.len(), 1);
        let t = months[0].totals;
        assert_eq!(t.total_days, 22);
        assert_eq!(t.total_man_days, 22.0);
        assert_eq!(t.total_labor_cost, 3_300_000);
        assert_eq!(months[0].last_worked_day(), Some(22));
    }

    #[test]
    fn worker_with_no_records_gets_zero_totals_not_omitted() {
        let workers = [worker(1, 150_000), worker(2, 200_000)];
        let records = [record(1, 2026, 3, 5, 1.0)];

        let months = aggregate_month(&workers, &records, 2026, 3);
        assert_eq!(months.len(), 2);
        assert_eq!(months[1].totals, MonthlyLaborTotals::ZERO);
        assert_eq!(months[1].last_worked_day(), None);
    }

    #[test]
    fn cross_month_records_do_not_leak() {
        let workers = [worker(1, 100_000)];
        let records = [
            record(1, 2026, 2, 28, 1.0),
            record(1, 2026, 3, 1, 1.0),
            record(1, 2026, 4, 1, 1.0),
            record(1, 2025, 3, 10, 1.0),
        ];
        let months = aggregate_month(&workers, &records, 2026, 3);
        assert_eq!(months[0].totals.total_days, 1);
        assert_eq!(months[0].totals.total_man_days, 1.0);
    }

    #[test]
    fn toggled_off_day_does_not_count_as_worked() {
        let workers = [worker(1, 100_000)];
        let records = [record(1, 2026, 3, 5, 1.0), record(1, 2026, 3, 6, 0.0)];
        let months = aggregate_month(&workers, &records, 2026, 3);
        assert_eq!(months[0].totals.total_days, 1);
        assert_eq!(months[0].totals.total_man_days, 1.0);
        assert_eq!(months[0].last_worked_day(), Some(5));
    }

    #[test]
    fn fractional_man_days_sum_and_round_cost() {
        let workers = [worker(1, 150_000)];
        let records = [record(1, 2026, 3, 3, 0.5), record(1, 2026, 3, 4, 1.5)];
        let months = aggregate_month(&workers, &records, 2026, 3);
        let t = months[0].totals;
        assert_eq!(t.total_days, 2);
        assert_eq!(t.total_man_days, 2.0);
        assert_eq!(t.total_labor_cost, 300_000);
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }
}
