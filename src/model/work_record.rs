use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of attendance for one worker on one project. `man_days` is
/// usually 1.0 but may be fractional for partial days; 0.0 means the day
/// was toggled off and no longer counts.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkRecord {
    pub id: u64,
    pub worker_id: u64,
    pub project_id: u64,
    pub work_date: NaiveDate,
    pub man_days: f64,
}
