//! NTS (국세청) bulk-upload workbook for daily-wage income. The receiving
//! system locates data by sheet name, so the single sheet must be named
//! exactly `Sheet1`, and it accepts at most 1,000 data rows per file —
//! an oversized report is rejected outright, never silently truncated.

use super::{Cell, ReportKind, ReportRenderer, Sheet};
use crate::payroll::error::{ExportError, PayrollError, RowFieldProblem};
use crate::payroll::report::SitePayrollReport;

pub struct NtsRenderer;

/// Hard constraint of the upload template
pub const SHEET_NAME: &str = "Sheet1";
pub const MAX_DATA_ROWS: usize = 1_000;
pub const COLUMN_COUNT: usize = 13;

/// Domestic/foreign flag values enumerated by the template
const FLAG_DOMESTIC: &str = "1";
const FLAG_FOREIGN: &str = "9";

impl ReportRenderer for NtsRenderer {
    fn kind(&self) -> ReportKind {
        ReportKind::Nts
    }

    fn sheets(&self, report: &SitePayrollReport) -> Result<Vec<Sheet>, PayrollError> {
        validate(report)?;

        let mut sheet = Sheet::new(SHEET_NAME);
        sheet.rows.push(header_row());

        // month fields are 2-digit text, not numbers; the template
        // enumerates "01".."12" and rejects numeric cells
        let month_str = format!("{:02}", report.month);

        for (i, entry) in report.entries.iter().enumerate() {
            let w = &entry.worker;
            let b = &entry.breakdown;

            let last_worked = entry
                .last_worked_day
                .map(|d| format!("{:04}{:02}{:02}", report.year, report.month, d))
                .unwrap_or_default();

            sheet.rows.push(vec![
                Cell::Int(i as i64 + 1),
                Cell::text(&w.name),
                Cell::text(if w.is_foreign { FLAG_FOREIGN } else { FLAG_DOMESTIC }),
                Cell::text(w.unhyphenated_national_id()),
                Cell::text(w.phone.as_deref().unwrap_or("")),
                Cell::text(&month_str),
                Cell::text(&month_str),
                Cell::Int(entry.totals.total_days as i64),
                if last_worked.is_empty() {
                    Cell::Blank
                } else {
                    Cell::text(last_worked)
                },
                Cell::Int(entry.totals.total_labor_cost),
                Cell::Int(0), // non-taxable income
                Cell::Int(b.income_tax),
                Cell::Int(b.resident_tax),
            ]);
        }

        Ok(vec![sheet])
    }
}

fn validate(report: &SitePayrollReport) -> Result<(), PayrollError> {
    if report.entries.len() > MAX_DATA_ROWS {
        return Err(ExportError::RowLimitExceeded {
            limit: MAX_DATA_ROWS,
            rows: report.entries.len(),
        }
        .into());
    }

    let mut problems = Vec::new();
    for (i, entry) in report.entries.iter().enumerate() {
        if entry.worker.unhyphenated_national_id().is_empty() {
            problems.push(RowFieldProblem {
                row: i + 1,
                worker_name: entry.worker.name.clone(),
                field: "national_id",
            });
        }
        if entry.worker.phone.as_deref().map_or(true, str::is_empty) {
            problems.push(RowFieldProblem {
                row: i + 1,
                worker_name: entry.worker.name.clone(),
                field: "phone",
            });
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ExportError::MissingFields(problems).into())
    }
}

fn header_row() -> Vec<Cell> {
    [
        "연번",
        "성명",
        "내외국인",
        "주민등록번호",
        "전화번호",
        "지급월",
        "귀속월",
        "근무일수",
        "최종근무일",
        "과세소득",
        "비과세소득",
        "소득세",
        "지방소득세",
    ]
    .iter()
    .map(|h| Cell::text(*h))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::work_record::WorkRecord;
    use crate::payroll::report::build_report;
    use crate::payroll::report::tests::{project, rates_2026, record, sample_report, worker};

    #[test]
    fn single_sheet_named_exactly_sheet1() {
        let sheets = NtsRenderer.sheets(&sample_report()).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Sheet1");
        for row in &sheets[0].rows {
            assert_eq!(row.len(), COLUMN_COUNT);
        }
    }

    #[test]
    fn month_fields_are_two_digit_text_and_flag_is_enumerated() {
        let s = NtsRenderer.sheets(&sample_report()).unwrap().remove(0);
        let row = &s.rows[1];
        assert_eq!(row[5], Cell::text("03"));
        assert_eq!(row[6], Cell::text("03"));
        assert_eq!(row[2], Cell::text("1"));
    }

    #[test]
    fn foreign_worker_flag_is_nine() {
        let mut report = sample_report();
        report.entries[0].worker.is_foreign = true;
        let s = NtsRenderer.sheets(&report).unwrap().remove(0);
        assert_eq!(s.rows[1][2], Cell::text("9"));
    }

    #[test]
    fn last_worked_date_is_yyyymmdd_or_blank() {
        let workers = [worker(1, "김철수", 200_000), worker(2, "이영희", 150_000)];
        let records: Vec<WorkRecord> = vec![record(1, 9, 1.0), record(1, 17, 1.0)];
        let report =
            build_report(&project(), &workers, &records, Some(&rates_2026()), 2026, 3).unwrap();

        let s = NtsRenderer.sheets(&report).unwrap().remove(0);
        assert_eq!(s.rows[1][8], Cell::text("20260317"));
        // worker 2 never worked this month
        assert_eq!(s.rows[2][8], Cell::Blank);
        assert_eq!(s.rows[2][7], Cell::Int(0));
    }

    #[test]
    fn a_1001_row_report_is_rejected_not_truncated() {
        let workers: Vec<_> = (1..=1001)
            .map(|id| worker(id, &format!("worker-{id}"), 150_000))
            .collect();
        let records: Vec<WorkRecord> = workers.iter().map(|w| record(w.id, 10, 1.0)).collect();
        let report =
            build_report(&project(), &workers, &records, Some(&rates_2026()), 2026, 3).unwrap();

        let err = NtsRenderer.sheets(&report).unwrap_err();
        match err {
            PayrollError::Export(ExportError::RowLimitExceeded { limit, rows }) => {
                assert_eq!(limit, 1000);
                assert_eq!(rows, 1001);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exactly_1000_rows_is_accepted() {
        let workers: Vec<_> = (1..=1000)
            .map(|id| worker(id, &format!("worker-{id}"), 150_000))
            .collect();
        let report =
            build_report(&project(), &workers, &[], Some(&rates_2026()), 2026, 3).unwrap();
        let sheets = NtsRenderer.sheets(&report).unwrap();
        assert_eq!(sheets[0].rows.len(), 1001); // header + 1000 data rows
    }

    #[test]
    fn missing_id_is_listed_per_row() {
        let mut report = sample_report();
        report.entries[1].worker.national_id = None;
        let err = NtsRenderer.sheets(&report).unwrap_err();
        match err {
            PayrollError::Export(ExportError::MissingFields(problems)) => {
                assert_eq!(problems.len(), 1);
                assert_eq!(problems[0].row, 2);
                assert_eq!(problems[0].field, "national_id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_phone_is_listed_per_row() {
        let mut report = sample_report();
        report.entries[0].worker.phone = None;
        report.entries[1].worker.phone = Some(String::new());
        let err = NtsRenderer.sheets(&report).unwrap_err();
        match err {
            PayrollError::Export(ExportError::MissingFields(problems)) => {
                assert_eq!(problems.len(), 2);
                assert_eq!(problems[0].row, 1);
                assert_eq!(problems[0].field, "phone");
                assert_eq!(problems[1].row, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
