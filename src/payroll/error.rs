use thiserror::Error;

/// Error taxonomy of the payroll core. Calculation fails closed: any
/// missing precondition stops the pipeline before a report is produced.
#[derive(Debug, Error)]
pub enum PayrollError {
    /// No rate table configured for the requested year. The caller must
    /// surface this as a blocking configuration problem, never fall back
    /// to a guessed table.
    #[error("no rate table configured for year {year}; set up rates before running payroll")]
    RatesNotConfigured { year: i32 },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Workers that cannot take part in payroll, with the reason each one
    /// is blocked. Listable so the UI can show who and why.
    #[error("{} worker(s) are blocked from payroll", .0.len())]
    BlockedWorkers(Vec<BlockedWorker>),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PayrollError {
    pub fn validation(field: &str, message: &str) -> Self {
        PayrollError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockedWorker {
    pub worker_id: u64,
    pub name: String,
    pub reason: String,
}

/// Problems detected while preparing an export, reported per report and
/// per row before any file bytes are produced.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The receiving system caps the number of data rows per file.
    #[error("report has {rows} rows but the format accepts at most {limit}; narrow the scope")]
    RowLimitExceeded { limit: usize, rows: usize },

    /// Worker rows missing a field the target format requires.
    #[error("{} row(s) are missing fields required by this format", .0.len())]
    MissingFields(Vec<RowFieldProblem>),

    #[error("failed to write workbook: {0}")]
    Workbook(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowFieldProblem {
    pub row: usize,
    pub worker_name: String,
    pub field: &'static str,
}
