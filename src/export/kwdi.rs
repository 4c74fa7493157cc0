//! KWDI (근로복지공단) electronic-filing workbook: the monthly
//! work-detail confirmation report for daily workers. The receiving
//! system validates sheet names and column positions against the
//! official template, so the 54-column A–BB layout and the extra guide
//! and code sheets are part of the contract, not cosmetics.
//!
//! Unlike the internal sheet, non-working day cells carry a literal `0`.

use super::{man_day_cell, Cell, ReportKind, ReportRenderer, Sheet};
use crate::model::worker::DailyWorker;
use crate::payroll::codes::{InsuranceType, JOB_CODES, NATIONALITY_CODES, VISA_CODES};
use crate::payroll::error::{ExportError, PayrollError, RowFieldProblem};
use crate::payroll::report::SitePayrollReport;

pub struct KwdiRenderer;

const DATA_SHEET: &str = "근로내용확인신고";
const GUIDE_SHEET: &str = "작성요령";
const CODE_SHEET: &str = "코드표";

/// Columns A through BB
pub const COLUMN_COUNT: usize = 54;

/// Hours reported per worked day; the filing fixes this at 8.
const DAILY_HOURS: i64 = 8;

/// Separation reason "1" = employer-side (end of daily engagement)
const SEPARATION_REASON: &str = "1";

impl ReportRenderer for KwdiRenderer {
    fn kind(&self) -> ReportKind {
        ReportKind::Kwdi
    }

    fn sheets(&self, report: &SitePayrollReport) -> Result<Vec<Sheet>, PayrollError> {
        validate(report)?;
        Ok(vec![data_sheet(report), guide_sheet(), code_sheet()])
    }
}

/// The filing requires an identity and a reachable phone number for every
/// reported worker. Problems are listed per row before any bytes exist.
fn validate(report: &SitePayrollReport) -> Result<(), PayrollError> {
    let mut problems = Vec::new();
    for (i, entry) in report.entries.iter().enumerate() {
        let w = &entry.worker;
        if w.unhyphenated_national_id().is_empty() {
            problems.push(RowFieldProblem {
                row: i + 1,
                worker_name: w.name.clone(),
                field: "national_id",
            });
        }
        if split_phone(w.phone.as_deref().unwrap_or("")).is_none() {
            problems.push(RowFieldProblem {
                row: i + 1,
                worker_name: w.name.clone(),
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

/// Splits a phone number into the filing's three sub-fields. Mobile
/// numbers (01x) split 3-4-4; Seoul landlines keep the 2-digit "02" area
/// code. The subscriber part is always the last four digits.
pub fn split_phone(phone: &str) -> Option<(String, String, String)> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 9 || digits.len() > 11 {
        return None;
    }
    let area_len = if digits.starts_with("02") { 2 } else { 3 };
    let subscriber = &digits[digits.len() - 4..];
    let exchange = &digits[area_len..digits.len() - 4];
    if exchange.is_empty() {
        return None;
    }
    Some((
        digits[..area_len].to_string(),
        exchange.to_string(),
        subscriber.to_string(),
    ))
}

fn nationality_cell(w: &DailyWorker) -> Cell {
    if w.is_foreign {
        Cell::text(w.nationality_code.as_deref().unwrap_or("999"))
    } else {
        // domestic workers are filed with the column left blank
        Cell::Blank
    }
}

fn visa_cell(w: &DailyWorker) -> Cell {
    if w.is_foreign {
        Cell::text(w.visa_code.as_deref().unwrap_or(""))
    } else {
        Cell::Blank
    }
}

fn data_sheet(report: &SitePayrollReport) -> Sheet {
    let mut sheet = Sheet::new(DATA_SHEET);
    sheet.rows.push(header_row());

    let payment_month = format!("{:04}{:02}", report.year, report.month);

    for entry in &report.entries {
        let w = &entry.worker;
        let b = &entry.breakdown;
        let (area, exchange, subscriber) =
            split_phone(w.phone.as_deref().unwrap_or("")).unwrap_or_default();

        let mut row = vec![
            Cell::text(w.insurance_type.as_deref().unwrap_or(InsuranceType::DEFAULT_CODE)),
            Cell::text(&w.name),
            Cell::text(w.unhyphenated_national_id()),
            nationality_cell(w),
            visa_cell(w),
            Cell::text(area),
            Cell::text(exchange),
            Cell::text(subscriber),
            Cell::text(&w.job_code),
        ];

        // day columns demand explicit zeros for non-working days
        for &d in &entry.days {
            row.push(if d > 0.0 { man_day_cell(d) } else { Cell::Int(0) });
        }

        let taxable = entry.totals.total_labor_cost;
        let non_taxable = 0_i64;
        row.extend([
            Cell::Int(entry.totals.total_days as i64),
            Cell::Int(DAILY_HOURS),
            Cell::Int(entry.totals.total_days as i64),
            Cell::Int(taxable),
            Cell::Int(taxable + non_taxable),
            Cell::text(SEPARATION_REASON),
            Cell::Blank, // employment-insurance adjustment code
            Cell::Blank, // accident-insurance adjustment code
            Cell::text("Y"), // this pay is also reported to the NTS
            Cell::text(&payment_month),
            Cell::Int(taxable),
            Cell::Int(non_taxable),
            Cell::Int(b.income_tax),
            Cell::Int(b.resident_tax),
        ]);
        sheet.rows.push(row);
    }
    sheet
}

fn header_row() -> Vec<Cell> {
    let mut header: Vec<Cell> = [
        "보험구분",
        "성명",
        "주민등록번호",
        "국적",
        "체류자격",
        "전화(지역)",
        "전화(국)",
        "전화(번호)",
        "직종코드",
    ]
    .iter()
    .map(|h| Cell::text(*h))
    .collect();
    for day in 1..=31 {
        header.push(Cell::text(format!("{day}일")));
    }
    header.extend(
        [
            "근로일수",
            "일평균근로시간",
            "보수지급기초일수",
            "보수총액",
            "임금총액",
            "이직사유",
            "고용보험부과구분",
            "산재보험부과구분",
            "국세청신고여부",
            "지급월",
            "과세소득",
            "비과세소득",
            "소득세",
            "지방소득세",
        ]
        .iter()
        .map(|h| Cell::text(*h)),
    );
    header
}

/// Human-readable field guide, one row per column group.
fn guide_sheet() -> Sheet {
    let mut sheet = Sheet::new(GUIDE_SHEET);
    sheet.rows.push(vec![Cell::text("항목"), Cell::text("작성요령")]);
    let entries: [(&str, &str); 8] = [
        ("보험구분", "01 고용·산재, 02 산재만, 03 고용만"),
        ("주민등록번호", "'-' 없이 13자리 입력"),
        ("국적", "내국인은 빈칸, 외국인은 코드표의 국적코드"),
        ("전화", "지역/국/번호 3개 필드로 분리 (휴대전화는 3-4-4)"),
        ("일별근무", "근무하지 않은 날은 0으로 입력 (빈칸 불가)"),
        ("일평균근로시간", "일용근로자는 8로 고정"),
        ("이직사유", "1 (사업주 사정) 고정"),
        ("지급월", "YYYYMM 형식"),
    ];
    for (field, guide) in entries {
        sheet.rows.push(vec![Cell::text(field), Cell::text(guide)]);
    }
    sheet
}

/// Nationality and job code lookups, as the official template ships them.
fn code_sheet() -> Sheet {
    let mut sheet = Sheet::new(CODE_SHEET);
    sheet
        .rows
        .push(vec![Cell::text("구분"), Cell::text("코드"), Cell::text("명칭")]);
    for ty in [
        InsuranceType::Both,
        InsuranceType::AccidentOnly,
        InsuranceType::EmploymentOnly,
    ] {
        sheet.rows.push(vec![
            Cell::text("보험구분"),
            Cell::text(ty.to_string()),
            Cell::text(ty.label()),
        ]);
    }
    for (code, label) in NATIONALITY_CODES {
        sheet.rows.push(vec![
            Cell::text("국적"),
            Cell::text(*code),
            Cell::text(*label),
        ]);
    }
    for (code, label) in VISA_CODES {
        sheet.rows.push(vec![
            Cell::text("체류자격"),
            Cell::text(*code),
            Cell::text(*label),
        ]);
    }
    for (code, label) in JOB_CODES {
        sheet.rows.push(vec![
            Cell::text("직종"),
            Cell::text(*code),
            Cell::text(*label),
        ]);
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::internal::InternalSheetRenderer;
    use crate::payroll::report::tests::sample_report;

    fn sheets() -> Vec<Sheet> {
        KwdiRenderer.sheets(&sample_report()).unwrap()
    }

    #[test]
    fn workbook_has_the_three_official_sheets() {
        let s = sheets();
        let names: Vec<&str> = s.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["근로내용확인신고", "작성요령", "코드표"]);
    }

    #[test]
    fn data_rows_span_columns_a_through_bb() {
        let s = sheets();
        for row in &s[0].rows {
            assert_eq!(row.len(), COLUMN_COUNT);
        }
    }

    #[test]
    fn non_working_day_is_literal_zero_while_internal_sheet_is_blank() {
        // same input through both renderers: day 5 was toggled off for
        // worker 1, so KWDI must say 0 where the internal sheet says blank
        let report = sample_report();
        let kwdi = KwdiRenderer.sheets(&report).unwrap().remove(0);
        let internal = InternalSheetRenderer.sheets(&report).unwrap().remove(0);

        let day5_kwdi = &kwdi.rows[1][9 + 4];
        let day5_internal = &internal.rows[1][5 + 4];
        assert_eq!(day5_kwdi, &Cell::Int(0));
        assert_eq!(day5_internal, &Cell::Blank);

        // a worked day is numeric in both
        assert_eq!(&kwdi.rows[1][9 + 3], &Cell::Int(1));
        assert_eq!(&internal.rows[1][5 + 3], &Cell::Int(1));
    }

    #[test]
    fn derived_columns_after_the_day_grid() {
        let report = sample_report();
        let s = KwdiRenderer.sheets(&report).unwrap().remove(0);
        let row = &s.rows[1];
        let e = &report.entries[0];
        assert_eq!(row[40], Cell::Int(e.totals.total_days as i64));
        assert_eq!(row[41], Cell::Int(8));
        assert_eq!(row[43], Cell::Int(e.totals.total_labor_cost));
        assert_eq!(row[44], Cell::Int(e.totals.total_labor_cost)); // + 0 non-taxable
        assert_eq!(row[45], Cell::text("1"));
        assert_eq!(row[46], Cell::Blank);
        assert_eq!(row[48], Cell::text("Y"));
        assert_eq!(row[49], Cell::text("202603"));
        assert_eq!(row[52], Cell::Int(e.breakdown.income_tax));
        assert_eq!(row[53], Cell::Int(e.breakdown.resident_tax));
    }

    #[test]
    fn id_is_unhyphenated_and_domestic_nationality_blank() {
        let s = sheets();
        let row = &s[0].rows[1];
        assert_eq!(row[2], Cell::text("9001011234567"));
        assert_eq!(row[3], Cell::Blank);
        assert_eq!(row[4], Cell::Blank);
    }

    #[test]
    fn foreign_worker_carries_codes() {
        let mut report = sample_report();
        report.entries[0].worker.is_foreign = true;
        report.entries[0].worker.nationality_code = Some("102".into());
        report.entries[0].worker.visa_code = Some("E-9".into());
        let s = KwdiRenderer.sheets(&report).unwrap().remove(0);
        assert_eq!(s.rows[1][3], Cell::text("102"));
        assert_eq!(s.rows[1][4], Cell::text("E-9"));
    }

    #[test]
    fn mobile_phone_splits_3_4_4() {
        assert_eq!(
            split_phone("010-1234-5678"),
            Some(("010".into(), "1234".into(), "5678".into()))
        );
        assert_eq!(
            split_phone("01099991111"),
            Some(("010".into(), "9999".into(), "1111".into()))
        );
    }

    #[test]
    fn seoul_landline_keeps_two_digit_area_code() {
        assert_eq!(
            split_phone("02-345-6789"),
            Some(("02".into(), "345".into(), "6789".into()))
        );
        assert_eq!(
            split_phone("02-3456-7890"),
            Some(("02".into(), "3456".into(), "7890".into()))
        );
    }

    #[test]
    fn unusable_phone_is_rejected() {
        assert_eq!(split_phone(""), None);
        assert_eq!(split_phone("1234"), None);
    }

    #[test]
    fn missing_phone_or_id_is_reported_per_row_before_rendering() {
        let mut report = sample_report();
        report.entries[0].worker.phone = None;
        report.entries[1].worker.national_id = None;
        let err = KwdiRenderer.sheets(&report).unwrap_err();
        match err {
            PayrollError::Export(ExportError::MissingFields(problems)) => {
                assert_eq!(problems.len(), 2);
                assert_eq!(problems[0].row, 1);
                assert_eq!(problems[0].field, "phone");
                assert_eq!(problems[1].row, 2);
                assert_eq!(problems[1].field, "national_id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn code_sheet_lists_every_static_table() {
        let s = sheets();
        let rows = &s[2].rows;
        let expected = 1 + 3 + NATIONALITY_CODES.len() + VISA_CODES.len() + JOB_CODES.len();
        assert_eq!(rows.len(), expected);
    }
}
