use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "김철수",
        "job_code": "01",
        "daily_rate": 150000,
        "is_foreign": false,
        "nationality_code": null,
        "visa_code": null,
        "national_id": "900101-1234567",
        "phone": "010-1234-5678",
        "insurance_type": "01",
        "status": "active",
        "blocked_reason": null
    })
)]
pub struct DailyWorker {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "김철수")]
    pub name: String,

    /// Job classification code, see the code-lookup sheet of the KWDI export
    #[schema(example = "01")]
    pub job_code: String,

    /// Fixed daily wage in KRW
    #[schema(example = 150000)]
    pub daily_rate: i64,

    pub is_foreign: bool,

    /// KWDI nationality code; blank for domestic workers
    #[schema(example = "102", nullable = true)]
    pub nationality_code: Option<String>,

    /// Residency (visa) status code; blank for domestic workers
    #[schema(example = "E-9", nullable = true)]
    pub visa_code: Option<String>,

    /// Resident registration number, hyphenated or not
    #[schema(example = "900101-1234567", nullable = true)]
    pub national_id: Option<String>,

    #[schema(example = "010-1234-5678", nullable = true)]
    pub phone: Option<String>,

    /// Optional override of the insurance-type code reported to KWDI
    #[schema(example = "01", nullable = true)]
    pub insurance_type: Option<String>,

    /// "active" or "blocked"; blocked workers cannot receive work records
    #[schema(example = "active")]
    pub status: String,

    #[schema(nullable = true)]
    pub blocked_reason: Option<String>,
}

impl DailyWorker {
    pub fn is_blocked(&self) -> bool {
        self.status == "blocked"
    }

    /// National id masked for the internal sheet: birth date kept, the
    /// serial tail hidden (e.g. `900101-1******`).
    pub fn masked_national_id(&self) -> String {
        let Some(id) = self.national_id.as_deref() else {
            return String::new();
        };
        let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() < 7 {
            return id.to_string();
        }
        format!("{}-{}******", &digits[..6], &digits[6..7])
    }

    /// National id with the hyphen stripped, as KWDI expects it.
    pub fn unhyphenated_national_id(&self) -> String {
        self.national_id
            .as_deref()
            .map(|id| id.chars().filter(|c| c.is_ascii_digit()).collect())
            .unwrap_or_default()
    }
}
