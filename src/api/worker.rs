use crate::model::worker::DailyWorker;
use crate::payroll::codes::InsuranceType;
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateWorker {
    #[schema(example = "김철수")]
    pub name: String,

    #[schema(example = "01")]
    pub job_code: String,

    /// Fixed daily wage in KRW. Legacy clients still send this as `wage`.
    #[serde(alias = "wage")]
    #[schema(example = 150000)]
    pub daily_rate: i64,

    #[serde(default)]
    pub is_foreign: bool,

    #[serde(default)]
    #[schema(example = "102", nullable = true)]
    pub nationality_code: Option<String>,

    #[serde(default)]
    #[schema(example = "E-9", nullable = true)]
    pub visa_code: Option<String>,

    /// Legacy clients send `jumin_no`; normalized here, never downstream.
    #[serde(default, alias = "jumin_no")]
    #[schema(example = "900101-1234567", nullable = true)]
    pub national_id: Option<String>,

    #[serde(default, alias = "phone_no")]
    #[schema(example = "010-1234-5678", nullable = true)]
    pub phone: Option<String>,

    #[serde(default)]
    #[schema(example = "01", nullable = true)]
    pub insurance_type: Option<String>,
}

impl CreateWorker {
    fn validate(&self) -> Result<(), (String, String)> {
        if self.name.trim().is_empty() {
            return Err(("name".into(), "name must not be empty".into()));
        }
        if self.daily_rate <= 0 {
            return Err(("daily_rate".into(), "daily rate must be positive".into()));
        }
        if let Some(code) = &self.insurance_type {
            if InsuranceType::from_str(code).is_err() {
                return Err((
                    "insurance_type".into(),
                    format!("unknown insurance-type code '{code}'"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateWorker {
    pub name: Option<String>,
    pub job_code: Option<String>,
    #[schema(example = 160000)]
    pub daily_rate: Option<i64>,
    pub phone: Option<String>,
    pub insurance_type: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct BlockWorker {
    #[schema(example = "개인정보 동의서 미제출")]
    pub reason: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct WorkerQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by status ("active" / "blocked")
    pub status: Option<String>,
    /// Search by name
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct WorkerListResponse {
    pub data: Vec<DailyWorker>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Register a daily worker
#[utoipa::path(
    post,
    path = "/api/v1/workers",
    request_body = CreateWorker,
    responses(
        (status = 201, description = "Worker registered", body = Object, example = json!({
            "message": "Worker registered successfully"
        })),
        (status = 400, description = "Validation error", body = Object, example = json!({
            "message": "daily rate must be positive", "field": "daily_rate"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Worker"
)]
pub async fn create_worker(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateWorker>,
) -> actix_web::Result<impl Responder> {
    if let Err((field, message)) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": message,
            "field": field
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO daily_workers
        (name, job_code, daily_rate, is_foreign, nationality_code, visa_code,
         national_id, phone, insurance_type, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'active')
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.job_code)
    .bind(payload.daily_rate)
    .bind(payload.is_foreign)
    .bind(&payload.nationality_code)
    .bind(&payload.visa_code)
    .bind(&payload.national_id)
    .bind(&payload.phone)
    .bind(&payload.insurance_type)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Worker registered successfully"
        }))),
        Err(e) => {
            error!(error = %e, "Failed to register worker");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Paginated worker list
#[utoipa::path(
    get,
    path = "/api/v1/workers",
    params(WorkerQuery),
    responses(
        (status = 200, description = "Paginated worker list", body = WorkerListResponse)
    ),
    tag = "Worker"
)]
pub async fn list_workers(
    pool: web::Data<MySqlPool>,
    query: web::Query<WorkerQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        bindings.push(status.clone());
    }
    if let Some(search) = &query.search {
        conditions.push("name LIKE ?");
        bindings.push(format!("%{}%", search));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM daily_workers {}", where_clause);
    debug!(sql = %count_sql, "Counting workers");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }
    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count workers");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT * FROM daily_workers {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut data_query = sqlx::query_as::<_, DailyWorker>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let workers = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch workers");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(WorkerListResponse {
        data: workers,
        page,
        per_page,
        total,
    }))
}

/// Get a worker by id
#[utoipa::path(
    get,
    path = "/api/v1/workers/{worker_id}",
    params(("worker_id", description = "Worker ID")),
    responses(
        (status = 200, body = DailyWorker),
        (status = 404, description = "Worker not found")
    ),
    tag = "Worker"
)]
pub async fn get_worker(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let worker_id = path.into_inner();

    let worker = sqlx::query_as::<_, DailyWorker>("SELECT * FROM daily_workers WHERE id = ?")
        .bind(worker_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, worker_id, "Failed to fetch worker");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match worker {
        Some(w) => Ok(HttpResponse::Ok().json(w)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Worker not found"
        }))),
    }
}

/// Update a worker (absent fields keep their current value)
#[utoipa::path(
    put,
    path = "/api/v1/workers/{worker_id}",
    params(("worker_id", description = "Worker ID")),
    request_body = UpdateWorker,
    responses(
        (status = 200, description = "Worker updated"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Worker not found")
    ),
    tag = "Worker"
)]
pub async fn update_worker(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateWorker>,
) -> actix_web::Result<impl Responder> {
    let worker_id = path.into_inner();

    let current = sqlx::query_as::<_, DailyWorker>("SELECT * FROM daily_workers WHERE id = ?")
        .bind(worker_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, worker_id, "Failed to fetch worker");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(current) = current else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Worker not found"
        })));
    };

    let daily_rate = body.daily_rate.unwrap_or(current.daily_rate);
    if daily_rate <= 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "daily rate must be positive",
            "field": "daily_rate"
        })));
    }
    let name = body.name.clone().unwrap_or(current.name);
    let job_code = body.job_code.clone().unwrap_or(current.job_code);
    let phone = body.phone.clone().or(current.phone);
    let insurance_type = body.insurance_type.clone().or(current.insurance_type);

    sqlx::query(
        r#"
        UPDATE daily_workers
        SET name = ?, job_code = ?, daily_rate = ?, phone = ?, insurance_type = ?
        WHERE id = ?
        "#,
    )
    .bind(&name)
    .bind(&job_code)
    .bind(daily_rate)
    .bind(&phone)
    .bind(&insurance_type)
    .bind(worker_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, worker_id, "Failed to update worker");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Worker updated successfully"
    })))
}

/// Block a worker from payroll (missing documents/consents)
#[utoipa::path(
    put,
    path = "/api/v1/workers/{worker_id}/block",
    params(("worker_id", description = "Worker ID")),
    request_body = BlockWorker,
    responses(
        (status = 200, description = "Worker blocked"),
        (status = 404, description = "Worker not found")
    ),
    tag = "Worker"
)]
pub async fn block_worker(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<BlockWorker>,
) -> actix_web::Result<impl Responder> {
    set_status(pool.get_ref(), path.into_inner(), "blocked", Some(&body.reason)).await
}

/// Lift a worker's payroll block
#[utoipa::path(
    put,
    path = "/api/v1/workers/{worker_id}/unblock",
    params(("worker_id", description = "Worker ID")),
    responses(
        (status = 200, description = "Worker unblocked"),
        (status = 404, description = "Worker not found")
    ),
    tag = "Worker"
)]
pub async fn unblock_worker(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    set_status(pool.get_ref(), path.into_inner(), "active", None).await
}

async fn set_status(
    pool: &MySqlPool,
    worker_id: u64,
    status: &str,
    reason: Option<&str>,
) -> actix_web::Result<HttpResponse> {
    let result = sqlx::query("UPDATE daily_workers SET status = ?, blocked_reason = ? WHERE id = ?")
        .bind(status)
        .bind(reason)
        .bind(worker_id)
        .execute(pool)
        .await
        .map_err(|e| {
            error!(error = %e, worker_id, status, "Failed to change worker status");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Worker not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Worker is now {status}")
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_field_names_normalize_at_the_boundary() {
        // old admin screens still post jumin_no / phone_no / wage
        let legacy = json!({
            "name": "김철수",
            "job_code": "01",
            "wage": 150000,
            "jumin_no": "900101-1234567",
            "phone_no": "010-1234-5678"
        });
        let parsed: CreateWorker = serde_json::from_value(legacy).unwrap();
        assert_eq!(parsed.daily_rate, 150_000);
        assert_eq!(parsed.national_id.as_deref(), Some("900101-1234567"));
        assert_eq!(parsed.phone.as_deref(), Some("010-1234-5678"));
    }

    #[test]
    fn validation_reports_the_offending_field() {
        let payload: CreateWorker = serde_json::from_value(json!({
            "name": "김철수",
            "job_code": "01",
            "daily_rate": -5
        }))
        .unwrap();
        let (field, _) = payload.validate().unwrap_err();
        assert_eq!(field, "daily_rate");

        let payload: CreateWorker = serde_json::from_value(json!({
            "name": " ",
            "job_code": "01",
            "daily_rate": 100000
        }))
        .unwrap();
        let (field, _) = payload.validate().unwrap_err();
        assert_eq!(field, "name");

        let payload: CreateWorker = serde_json::from_value(json!({
            "name": "김철수",
            "job_code": "01",
            "daily_rate": 100000,
            "insurance_type": "7x"
        }))
        .unwrap();
        let (field, _) = payload.validate().unwrap_err();
        assert_eq!(field, "insurance_type");
    }
}
