//! Spreadsheet renderers for the three statutory recipients. Each format
//! is an independent external contract: sheet names, header text, column
//! order and cell data types must match the official templates exactly,
//! so the three renderers share only the input aggregate and the plumbing
//! in this module.
//!
//! Renderers first build a typed [`Cell`] grid per sheet and only then
//! write the workbook. The grid is what tests assert against; the xlsx
//! writing is a mechanical pass over it.

pub mod internal;
pub mod kwdi;
pub mod nts;

use rust_xlsxwriter::{Format, Workbook};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::payroll::error::{ExportError, PayrollError};
use crate::payroll::report::SitePayrollReport;

/// One spreadsheet cell. `Blank` and `Int(0)` are different things: the
/// internal sheet leaves non-working days blank while KWDI requires a
/// literal zero, and the receiving systems check for exactly that.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Blank,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    /// Leading rows written with the header format
    pub header_rows: usize,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            header_rows: 1,
            rows: Vec::new(),
        }
    }
}

/// The three download formats, as they appear in the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReportKind {
    Internal,
    Kwdi,
    Nts,
}

impl ReportKind {
    pub fn renderer(&self) -> Box<dyn ReportRenderer> {
        match self {
            ReportKind::Internal => Box::new(internal::InternalSheetRenderer),
            ReportKind::Kwdi => Box::new(kwdi::KwdiRenderer),
            ReportKind::Nts => Box::new(nts::NtsRenderer),
        }
    }
}

/// A pure `(report) -> document` transform. `sheets` carries the whole
/// format contract; `render` just serializes the grid.
pub trait ReportRenderer {
    fn kind(&self) -> ReportKind;

    fn sheets(&self, report: &SitePayrollReport) -> Result<Vec<Sheet>, PayrollError>;

    fn render(&self, report: &SitePayrollReport) -> Result<Vec<u8>, PayrollError> {
        let sheets = self.sheets(report)?;
        write_workbook(&sheets).map_err(PayrollError::Export)
    }
}

fn write_workbook(sheets: &[Sheet]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for sheet in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(&sheet.name)
            .map_err(|e| ExportError::Workbook(e.to_string()))?;

        for (r, row) in sheet.rows.iter().enumerate() {
            let fmt = (r < sheet.header_rows).then_some(&header);
            for (c, cell) in row.iter().enumerate() {
                write_cell(ws, r as u32, c as u16, cell, fmt)
                    .map_err(|e| ExportError::Workbook(e.to_string()))?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ExportError::Workbook(e.to_string()))
}

fn write_cell(
    ws: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    fmt: Option<&Format>,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match (cell, fmt) {
        (Cell::Blank, _) => {}
        (Cell::Int(v), None) => {
            ws.write_number(row, col, *v as f64)?;
        }
        (Cell::Int(v), Some(f)) => {
            ws.write_number_with_format(row, col, *v as f64, f)?;
        }
        (Cell::Float(v), None) => {
            ws.write_number(row, col, *v)?;
        }
        (Cell::Float(v), Some(f)) => {
            ws.write_number_with_format(row, col, *v, f)?;
        }
        (Cell::Text(v), None) => {
            ws.write_string(row, col, v)?;
        }
        (Cell::Text(v), Some(f)) => {
            ws.write_string_with_format(row, col, v, f)?;
        }
    }
    Ok(())
}

/// man-day cell shared by the internal and KWDI day columns: whole
/// man-days render as integers, fractional ones keep their fraction.
pub(crate) fn man_day_cell(value: f64) -> Cell {
    if value.fract() == 0.0 {
        Cell::Int(value as i64)
    } else {
        Cell::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::report::tests::sample_report;

    #[test]
    fn every_kind_renders_bytes_from_the_same_report() {
        let report = sample_report();
        for kind in [ReportKind::Internal, ReportKind::Kwdi, ReportKind::Nts] {
            let bytes = kind.renderer().render(&report).unwrap();
            // xlsx files are zip archives
            assert_eq!(&bytes[..2], b"PK", "{kind} did not produce xlsx bytes");
        }
    }

    #[test]
    fn kind_parses_from_path_segment() {
        use std::str::FromStr;
        assert_eq!(ReportKind::from_str("kwdi").unwrap(), ReportKind::Kwdi);
        assert_eq!(ReportKind::Internal.to_string(), "internal");
        assert!(ReportKind::from_str("csv").is_err());
    }

    #[test]
    fn man_day_cells_keep_fractions_but_not_trailing_zeroes() {
        assert_eq!(man_day_cell(1.0), Cell::Int(1));
        assert_eq!(man_day_cell(0.5), Cell::Float(0.5));
    }
}
