//! Internal payroll sheet for site-office manual review. Column order and
//! header labels are fixed; downstream review is done by eye against this
//! exact layout. Non-working day cells stay blank here (KWDI, by
//! contrast, requires explicit zeros).

use super::{man_day_cell, Cell, ReportKind, ReportRenderer, Sheet};
use crate::payroll::codes::job_label;
use crate::payroll::error::PayrollError;
use crate::payroll::report::SitePayrollReport;

pub struct InternalSheetRenderer;

const SHEET_NAME: &str = "노무비명세서";

const LEAD_HEADERS: [&str; 5] = ["연번", "성명", "직종", "주민등록번호", "일당"];

const SUMMARY_HEADERS: [&str; 10] = [
    "총공수",
    "노무비총액",
    "소득세",
    "주민세",
    "국민연금",
    "건강보험",
    "장기요양보험",
    "고용보험",
    "공제합계",
    "실지급액",
];

/// 5 leading + 31 days + 9 summary columns + net pay
pub const COLUMN_COUNT: usize = 5 + 31 + 10;

impl ReportRenderer for InternalSheetRenderer {
    fn kind(&self) -> ReportKind {
        ReportKind::Internal
    }

    fn sheets(&self, report: &SitePayrollReport) -> Result<Vec<Sheet>, PayrollError> {
        let mut sheet = Sheet::new(SHEET_NAME);

        let mut header: Vec<Cell> = LEAD_HEADERS.iter().map(|h| Cell::text(*h)).collect();
        for day in 1..=31 {
            header.push(Cell::Int(day));
        }
        header.extend(SUMMARY_HEADERS.iter().map(|h| Cell::text(*h)));
        sheet.rows.push(header);

        for (i, entry) in report.entries.iter().enumerate() {
            let w = &entry.worker;
            let b = &entry.breakdown;
            let mut row = vec![
                Cell::Int(i as i64 + 1),
                Cell::text(&w.name),
                Cell::text(job_label(&w.job_code).unwrap_or(w.job_code.as_str())),
                Cell::text(w.masked_national_id()),
                Cell::Int(w.daily_rate),
            ];
            for &d in &entry.days {
                // blank, not zero: zero-day cells stay empty on this sheet
                row.push(if d > 0.0 { man_day_cell(d) } else { Cell::Blank });
            }
            row.extend([
                Cell::Float(entry.totals.total_man_days),
                Cell::Int(entry.totals.total_labor_cost),
                Cell::Int(b.income_tax),
                Cell::Int(b.resident_tax),
                Cell::Int(b.national_pension),
                Cell::Int(b.health_insurance),
                Cell::Int(b.longterm_care),
                Cell::Int(b.employment_insurance),
                Cell::Int(b.total_deductions),
                Cell::Int(b.net_pay),
            ]);
            sheet.rows.push(row);
        }

        // Totals row: monetary columns summed, day columns blank
        let t = &report.totals;
        let mut totals_row = vec![
            Cell::Blank,
            Cell::text("합계"),
            Cell::Blank,
            Cell::Blank,
            Cell::Blank,
        ];
        totals_row.extend(std::iter::repeat(Cell::Blank).take(31));
        totals_row.extend([
            Cell::Float(t.total_man_days),
            Cell::Int(t.total_labor_cost),
            Cell::Int(t.income_tax),
            Cell::Int(t.resident_tax),
            Cell::Int(t.national_pension),
            Cell::Int(t.health_insurance),
            Cell::Int(t.longterm_care),
            Cell::Int(t.employment_insurance),
            Cell::Int(t.total_deductions),
            Cell::Int(t.net_pay),
        ]);
        sheet.rows.push(totals_row);

        Ok(vec![sheet])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::report::tests::sample_report;

    fn sheet() -> Sheet {
        InternalSheetRenderer
            .sheets(&sample_report())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn fixed_sheet_name_and_column_layout() {
        let s = sheet();
        assert_eq!(s.name, "노무비명세서");
        let header = &s.rows[0];
        assert_eq!(header.len(), COLUMN_COUNT);
        assert_eq!(header[0], Cell::text("연번"));
        assert_eq!(header[4], Cell::text("일당"));
        assert_eq!(header[5], Cell::Int(1));
        assert_eq!(header[35], Cell::Int(31));
        assert_eq!(header[36], Cell::text("총공수"));
        assert_eq!(header[COLUMN_COUNT - 1], Cell::text("실지급액"));
    }

    #[test]
    fn toggled_off_day_is_blank_not_zero() {
        let s = sheet();
        // worker 1 worked days 1-20 except day 5 (toggled to 0)
        let row = &s.rows[1];
        assert_eq!(row[5 + 4], Cell::Blank, "day 5 must be blank");
        assert_eq!(row[5 + 3], Cell::Int(1), "day 4 is worked");
        assert_eq!(row[5 + 25], Cell::Blank, "day 26 never worked");
    }

    #[test]
    fn rows_carry_masked_id_and_net_pay() {
        let s = sheet();
        let row = &s.rows[1];
        assert_eq!(row[3], Cell::text("900101-1******"));
        // net pay is the last column and matches gross minus deductions
        let Cell::Int(net) = &row[COLUMN_COUNT - 1] else {
            panic!("net pay must be numeric")
        };
        let Cell::Int(gross) = &row[37] else {
            panic!("gross must be numeric")
        };
        let Cell::Int(deductions) = &row[COLUMN_COUNT - 2] else {
            panic!("deduction total must be numeric")
        };
        assert_eq!(*net, *gross - *deductions);
    }

    #[test]
    fn totals_row_sums_monetary_columns_and_leaves_days_blank() {
        let s = sheet();
        let report = sample_report();
        let totals = s.rows.last().unwrap();
        assert_eq!(totals[1], Cell::text("합계"));
        for day_col in 5..36 {
            assert_eq!(totals[day_col], Cell::Blank);
        }
        assert_eq!(totals[37], Cell::Int(report.totals.total_labor_cost));
        assert_eq!(totals[COLUMN_COUNT - 1], Cell::Int(report.totals.net_pay));
        // one header + one row per worker + totals
        assert_eq!(s.rows.len(), report.entries.len() + 2);
    }
}
