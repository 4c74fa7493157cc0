use crate::model::work_record::WorkRecord;
use crate::model::worker::DailyWorker;
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct SaveWorkRecord {
    #[schema(example = 1)]
    pub worker_id: u64,
    #[schema(example = 7)]
    pub project_id: u64,
    #[schema(example = "2026-03-05", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    /// 1.0 full day, fractional for partial days, 0.0 toggles the day off
    #[schema(example = 1.0)]
    pub man_days: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveWorkRecordBatch {
    pub records: Vec<SaveWorkRecord>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct WorkRecordQuery {
    #[schema(example = 7)]
    pub project_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
}

#[derive(Serialize, ToSchema)]
pub struct RejectedRecord {
    pub worker_id: u64,
    pub worker_name: String,
    pub reason: String,
}

fn validate_record(r: &SaveWorkRecord) -> Option<(&'static str, String)> {
    if !(0.0..=3.0).contains(&r.man_days) || !r.man_days.is_finite() {
        return Some(("man_days", format!("man_days {} out of range", r.man_days)));
    }
    None
}

async fn fetch_worker(pool: &MySqlPool, worker_id: u64) -> Result<Option<DailyWorker>, sqlx::Error> {
    sqlx::query_as::<_, DailyWorker>("SELECT * FROM daily_workers WHERE id = ?")
        .bind(worker_id)
        .fetch_optional(pool)
        .await
}

/// Duplicate (project, worker, date) collapses to the latest value.
async fn upsert(pool: &MySqlPool, r: &SaveWorkRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO work_records (worker_id, project_id, work_date, man_days)
        VALUES (?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE man_days = VALUES(man_days)
        "#,
    )
    .bind(r.worker_id)
    .bind(r.project_id)
    .bind(r.work_date)
    .bind(r.man_days)
    .execute(pool)
    .await?;
    Ok(())
}

/// Save one day of attendance (upsert)
#[utoipa::path(
    post,
    path = "/api/v1/work-records",
    request_body = SaveWorkRecord,
    responses(
        (status = 200, description = "Attendance saved", body = Object, example = json!({
            "message": "Attendance saved"
        })),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Worker not found"),
        (status = 409, description = "Worker is blocked from payroll", body = Object, example = json!({
            "message": "Worker is blocked from payroll",
            "reason": "개인정보 동의서 미제출"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "WorkRecord"
)]
pub async fn save_work_record(
    pool: web::Data<MySqlPool>,
    payload: web::Json<SaveWorkRecord>,
) -> actix_web::Result<impl Responder> {
    if let Some((field, message)) = validate_record(&payload) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": message,
            "field": field
        })));
    }

    let worker = fetch_worker(pool.get_ref(), payload.worker_id)
        .await
        .map_err(|e| {
            error!(error = %e, worker_id = payload.worker_id, "Failed to fetch worker");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(worker) = worker else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Worker not found"
        })));
    };

    // Blocked workers cannot accumulate payroll attendance; this is a
    // listable domain condition, not a generic failure.
    if worker.is_blocked() {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Worker is blocked from payroll",
            "reason": worker.blocked_reason.unwrap_or_default()
        })));
    }

    upsert(pool.get_ref(), &payload).await.map_err(|e| {
        error!(error = %e, worker_id = payload.worker_id, "Failed to save attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance saved"
    })))
}

/// Save a month of attendance in one call. Records for blocked workers
/// are rejected and listed; the rest are saved.
#[utoipa::path(
    post,
    path = "/api/v1/work-records/batch",
    request_body = SaveWorkRecordBatch,
    responses(
        (status = 200, description = "Batch result", body = Object, example = json!({
            "saved": 41,
            "rejected": [{
                "worker_id": 3,
                "worker_name": "박민수",
                "reason": "보험가입 서류 미비"
            }]
        })),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal server error")
    ),
    tag = "WorkRecord"
)]
pub async fn save_work_record_batch(
    pool: web::Data<MySqlPool>,
    payload: web::Json<SaveWorkRecordBatch>,
) -> actix_web::Result<impl Responder> {
    for (i, r) in payload.records.iter().enumerate() {
        if let Some((field, message)) = validate_record(r) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": message,
                "field": field,
                "index": i
            })));
        }
    }

    let mut saved = 0usize;
    let mut rejected: Vec<RejectedRecord> = Vec::new();

    for r in &payload.records {
        let worker = fetch_worker(pool.get_ref(), r.worker_id).await.map_err(|e| {
            error!(error = %e, worker_id = r.worker_id, "Failed to fetch worker");
            ErrorInternalServerError("Internal Server Error")
        })?;

        let Some(worker) = worker else {
            rejected.push(RejectedRecord {
                worker_id: r.worker_id,
                worker_name: String::new(),
                reason: "worker not found".into(),
            });
            continue;
        };

        if worker.is_blocked() {
            if !rejected.iter().any(|x| x.worker_id == worker.id) {
                rejected.push(RejectedRecord {
                    worker_id: worker.id,
                    worker_name: worker.name.clone(),
                    reason: worker.blocked_reason.clone().unwrap_or_default(),
                });
            }
            continue;
        }

        upsert(pool.get_ref(), r).await.map_err(|e| {
            error!(error = %e, worker_id = r.worker_id, "Failed to save attendance");
            ErrorInternalServerError("Internal Server Error")
        })?;
        saved += 1;
    }

    Ok(HttpResponse::Ok().json(json!({
        "saved": saved,
        "rejected": rejected
    })))
}

/// List a project's attendance for one month
#[utoipa::path(
    get,
    path = "/api/v1/work-records",
    params(WorkRecordQuery),
    responses(
        (status = 200, description = "Work records for the month", body = Object),
        (status = 400, description = "Invalid month")
    ),
    tag = "WorkRecord"
)]
pub async fn list_work_records(
    pool: web::Data<MySqlPool>,
    query: web::Query<WorkRecordQuery>,
) -> actix_web::Result<impl Responder> {
    let Some(month_start) = NaiveDate::from_ymd_opt(query.year, query.month, 1) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("invalid month {}-{}", query.year, query.month),
            "field": "month"
        })));
    };
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
        ORDER BY worker_id, work_date
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

    Ok(HttpResponse::Ok().json(json!({ "data": records })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn man_days_range_is_enforced() {
        let mk = |man_days: f64| SaveWorkRecord {
            worker_id: 1,
            project_id: 1,
            work_date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            man_days,
        };
        assert!(validate_record(&mk(1.0)).is_none());
        assert!(validate_record(&mk(0.0)).is_none());
        assert!(validate_record(&mk(0.5)).is_none());
        assert!(validate_record(&mk(-1.0)).is_some());
        assert!(validate_record(&mk(5.0)).is_some());
        assert!(validate_record(&mk(f64::NAN)).is_some());
    }
}
