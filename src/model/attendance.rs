use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "date": "2026-08-03",
        "name": "Ayşe Demir",
        "giris": "08:30",
        "cikis": "17:30",
        "izin": 0
    })
)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "2026-08-03", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "Ayşe Demir")]
    pub name: String,

    /// Check-in wall-clock time, HH:MM.
    #[schema(example = "08:30")]
    pub giris: String,

    /// Check-out wall-clock time, HH:MM.
    #[schema(example = "17:30")]
    pub cikis: String,

    /// Leave flag, 0 or 1.
    #[schema(example = 0)]
    pub izin: i8,
}
