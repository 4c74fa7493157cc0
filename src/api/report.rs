use crate::export::ReportKind;
use crate::model::project::Project;
use crate::model::work_record::WorkRecord;
use crate::model::worker::DailyWorker;
use crate::payroll::error::{ExportError, PayrollError};
use crate::payroll::report::build_report;
use crate::utils::rate_cache;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    #[schema(example = 7)]
    pub project_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
}

/// Generate and download a payroll report
///
/// `kind` selects the recipient format: `internal` (site payroll sheet),
/// `kwdi` (근로복지공단 electronic filing) or `nts` (국세청 bulk upload).
#[utoipa::path(
    get,
    path = "/api/v1/reports/{kind}",
    params(
        ("kind", description = "Report format: internal | kwdi | nts"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "xlsx document", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Unknown format or invalid month"),
        (status = 404, description = "Project not found"),
        (status = 409, description = "Rates not configured, or blocked workers with attendance"),
        (status = 422, description = "Export constraint violated (row cap, missing fields)"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn download_report(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    let Ok(kind) = ReportKind::from_str(&path) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("unknown report format '{}'", path.into_inner())
        })));
    };

    let Some(month_start) = NaiveDate::from_ymd_opt(query.year, query.month, 1) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("invalid month {}-{}", query.year, query.month),
            "field": "month"
        })));
    };

    // -------- fetch the snapshot the pure core will consume --------
    let project = sqlx::query_as::<_, Project>("SELECT id, name FROM projects WHERE id = ?")
        .bind(query.project_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, project_id = query.project_id, "Failed to fetch project");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(project) = project else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Project not found"
        })));
    };

    let workers =
        sqlx::query_as::<_, DailyWorker>("SELECT * FROM daily_workers ORDER BY name, id")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch workers");
                ErrorInternalServerError("Internal Server Error")
            })?;

    let month_end = if month_start.month() == 12 {
        NaiveDate::from_ymd_opt(month_start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month_start.year(), month_start.month() + 1, 1)
    }
    .unwrap_or(month_start);

    let records = sqlx::query_as::<_, WorkRecord>(
        r#"
        SELECT id, worker_id, project_id, work_date, man_days
        FROM work_records
        WHERE project_id = ? AND work_date >= ? AND work_date < ?
        "#,
    )
    .bind(query.project_id)
    .bind(month_start)
    .bind(month_end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, project_id = query.project_id, "Failed to fetch work records");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let rates = rate_cache::get_rates(pool.get_ref(), query.year)
        .await
        .map_err(|e| {
            error!(error = %e, year = query.year, "Failed to fetch rate table");
            ErrorInternalServerError("Internal Server Error")
        })?;

    // -------- pure pipeline: aggregate, calculate, render --------
    let report = match build_report(
        &project,
        &workers,
        &records,
        rates.as_ref(),
        query.year,
        query.month,
    ) {
        Ok(report) => report,
        Err(e) => return Ok(payroll_error_response(e)),
    };

    let bytes = match kind.renderer().render(&report) {
        Ok(bytes) => bytes,
        Err(e) => return Ok(payroll_error_response(e)),
    };

    let file_name = report.file_name(kind.as_ref());
    info!(
        kind = %kind,
        project_id = report.project_id,
        workers = report.entries.len(),
        bytes = bytes.len(),
        "Report generated"
    );

    Ok(HttpResponse::Ok()
        .content_type(XLSX_MIME)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(bytes))
}

/// Maps the core taxonomy onto responses: configuration and domain
/// problems are 409 with actionable detail, export-contract problems are
/// 422 listing the offending rows. Nothing here ever ships a partial file.
fn payroll_error_response(err: PayrollError) -> HttpResponse {
    match err {
        PayrollError::RatesNotConfigured { .. } => HttpResponse::Conflict().json(json!({
            "message": err.to_string()
        })),
        PayrollError::BlockedWorkers(ref list) => HttpResponse::Conflict().json(json!({
            "message": err.to_string(),
            "blocked": list.iter().map(|b| json!({
                "worker_id": b.worker_id,
                "name": b.name,
                "reason": b.reason
            })).collect::<Vec<_>>()
        })),
        PayrollError::Validation { ref field, .. } => HttpResponse::BadRequest().json(json!({
            "message": err.to_string(),
            "field": field
        })),
        PayrollError::Export(ref export) => match export {
            ExportError::MissingFields(problems) => HttpResponse::UnprocessableEntity().json(json!({
                "message": export.to_string(),
                "problems": problems.iter().map(|p| json!({
                    "row": p.row,
                    "worker": p.worker_name,
                    "field": p.field
                })).collect::<Vec<_>>()
            })),
            ExportError::RowLimitExceeded { .. } => {
                HttpResponse::UnprocessableEntity().json(json!({
                    "message": export.to_string()
                }))
            }
            ExportError::Workbook(_) => {
                error!(error = %export, "Workbook serialization failed");
                HttpResponse::InternalServerError().json(json!({
                    "message": "Internal Server Error"
                }))
            }
        },
    }
}
