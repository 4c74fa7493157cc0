use crate::api::rate_table::UpsertRateTable;
use crate::api::report::ReportQuery;
use crate::api::work_record::{
    RejectedRecord, SaveWorkRecord, SaveWorkRecordBatch, WorkRecordQuery,
};
use crate::api::worker::{
    BlockWorker, CreateWorker, UpdateWorker, WorkerListResponse, WorkerQuery,
};
use crate::model::rate_table::RateTable;
use crate::model::worker::DailyWorker;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Daily-Labor Payroll API",
        version = "1.0.0",
        description = r#"
## Daily-Labor Payroll Service

This API powers the daily-labor payroll subsystem of a construction
project-management platform: worker registration, daily attendance,
statutory rate administration and report generation.

### 🔹 Key Features
- **Worker Management**
  - Register daily workers, keep wage/contact/insurance details, block
    workers with missing documents from payroll
- **Attendance**
  - Per-day man-day entry with upsert/toggle semantics, single or batch
- **Statutory Rates**
  - Year-scoped withholding and social-insurance constants, replaced
    per year by an administrator
- **Report Generation**
  - Internal payroll sheet, KWDI (근로복지공단) electronic filing and
    NTS (국세청) bulk-upload spreadsheets, byte-exact against the
    official templates

### 📦 Response Format
- JSON-based RESTful responses; report downloads are xlsx attachments
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::worker::create_worker,
        crate::api::worker::list_workers,
        crate::api::worker::get_worker,
        crate::api::worker::update_worker,
        crate::api::worker::block_worker,
        crate::api::worker::unblock_worker,

        crate::api::work_record::save_work_record,
        crate::api::work_record::save_work_record_batch,
        crate::api::work_record::list_work_records,

        crate::api::rate_table::upsert_rates,
        crate::api::rate_table::get_rates,
        crate::api::rate_table::list_rate_years,

        crate::api::report::download_report
    ),
    components(
        schemas(
            DailyWorker,
            CreateWorker,
            UpdateWorker,
            BlockWorker,
            WorkerQuery,
            WorkerListResponse,
            SaveWorkRecord,
            SaveWorkRecordBatch,
            WorkRecordQuery,
            RejectedRecord,
            RateTable,
            UpsertRateTable,
            ReportQuery
        )
    ),
    tags(
        (name = "Worker", description = "Daily-worker management APIs"),
        (name = "WorkRecord", description = "Attendance / man-day APIs"),
        (name = "Rates", description = "Statutory rate administration APIs"),
        (name = "Report", description = "Payroll report generation APIs"),
    )
)]
pub struct ApiDoc;
