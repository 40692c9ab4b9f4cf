use crate::{
    model::attendance::Attendance,
    utils::hours::aggregate_hours,
    utils::listing::{FilterBind, Listing, ListingMode, ListingParams},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::collections::BTreeMap;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

const SELECT_RECORD: &str = "SELECT id, date, name, giris, cikis, izin FROM attendance";

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    /// ISO-8601 timestamp; only the calendar date is kept.
    #[schema(example = "2026-08-03T00:00:00.000Z", format = "date-time", value_type = String)]
    pub date: DateTime<Utc>,
    #[schema(example = "Ayşe Demir")]
    pub name: String,
    #[schema(example = "08:30")]
    pub giris: String,
    #[schema(example = "17:30")]
    pub cikis: String,
    /// Leave flag, 0 or 1. Defaults to 0 when omitted.
    #[serde(default)]
    #[schema(example = 0)]
    pub izin: i8,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendance {
    #[schema(example = "2026-08-03T00:00:00.000Z", format = "date-time", value_type = String)]
    pub date: DateTime<Utc>,
    #[schema(example = "Ayşe Demir")]
    pub name: String,
    #[schema(example = "08:30")]
    pub giris: String,
    #[schema(example = "17:30")]
    pub cikis: String,
}

/// The leave flag travels on its own endpoint so toggling it can never
/// touch the rest of the record.
#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveFlag {
    #[schema(example = 1)]
    pub izin: i8,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<Attendance>,
    /// Total records matching the filter, not just this page.
    #[schema(example = 42)]
    pub count: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HoursQuery {
    /// Name substring filter
    pub q: Option<String>,
}

async fn fetch_record(pool: &MySqlPool, id: u64) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(&format!("{SELECT_RECORD} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// List attendance records
///
/// Three shapes, chosen by the query string: `twoWeeks=true` returns the
/// trailing two weeks unpaginated, `page`+`pageSize` returns one page with
/// a filter-wide count, and neither returns everything.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(ListingParams),
    responses(
        (status = 200, description = "Bare array, or {data, count} when paginated", body = AttendanceListResponse),
        (status = 400, description = "Malformed query parameter"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<ListingParams>,
) -> actix_web::Result<impl Responder> {
    let params = query.into_inner();
    let listing = Listing::build(&params, Utc::now().date_naive());
    let (where_sql, binds) = listing.filter_sql();
    let order_sql = listing.order_sql();

    if let ListingMode::Page { limit, offset } = listing.mode {
        let count_sql = format!("SELECT COUNT(*) FROM attendance{where_sql}");

        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &binds {
            count_q = match bind {
                FilterBind::Date(d) => count_q.bind(*d),
                FilterBind::Text(t) => count_q.bind(t.clone()),
            };
        }

        let count = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
            error!(error = %e, sql = %count_sql, "Failed to count attendance records");
            ErrorInternalServerError("Internal Server Error")
        })?;

        let data_sql = format!("{SELECT_RECORD}{where_sql}{order_sql} LIMIT ? OFFSET ?");
        debug!(sql = %data_sql, limit, offset, "Fetching attendance page");

        let mut data_q = sqlx::query_as::<_, Attendance>(&data_sql);
        for bind in binds {
            data_q = match bind {
                FilterBind::Date(d) => data_q.bind(d),
                FilterBind::Text(t) => data_q.bind(t),
            };
        }

        let data = data_q
            .bind(limit)
            .bind(offset)
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, sql = %data_sql, "Failed to fetch attendance page");
                ErrorInternalServerError("Internal Server Error")
            })?;

        return Ok(HttpResponse::Ok().json(AttendanceListResponse { data, count }));
    }

    // Trailing-window and full listings respond with a bare array.
    let data_sql = format!("{SELECT_RECORD}{where_sql}{order_sql}");
    debug!(sql = %data_sql, "Fetching attendance listing");

    let mut data_q = sqlx::query_as::<_, Attendance>(&data_sql);
    for bind in binds {
        data_q = match bind {
            FilterBind::Date(d) => data_q.bind(d),
            FilterBind::Text(t) => data_q.bind(t),
        };
    }

    let data = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch attendance listing");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(data))
}

/// Worked hours per person over the trailing two weeks
#[utoipa::path(
    get,
    path = "/api/v1/attendance/hours",
    params(HoursQuery),
    responses(
        (status = 200, description = "Name to total hours, two decimal places", body = Object, example = json!({
            "Ayşe Demir": 75.5,
            "Mehmet Kaya": 80.25
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn trailing_hours(
    pool: web::Data<MySqlPool>,
    query: web::Query<HoursQuery>,
) -> actix_web::Result<impl Responder> {
    let params = ListingParams {
        two_weeks: Some(true),
        q: query.into_inner().q,
        ..Default::default()
    };
    let listing = Listing::build(&params, Utc::now().date_naive());
    let (where_sql, binds) = listing.filter_sql();

    let data_sql = format!("{SELECT_RECORD}{where_sql}");

    let mut data_q = sqlx::query_as::<_, Attendance>(&data_sql);
    for bind in binds {
        data_q = match bind {
            FilterBind::Date(d) => data_q.bind(d),
            FilterBind::Text(t) => data_q.bind(t),
        };
    }

    let rows = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch trailing-window records");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // Totals accumulate unrounded; this endpoint is the display boundary.
    let totals: BTreeMap<String, f64> = aggregate_hours(&rows)
        .into_iter()
        .map(|(name, hours)| (name, (hours * 100.0).round() / 100.0))
        .collect();

    Ok(HttpResponse::Ok().json(totals))
}

/// Create an attendance record
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 200, description = "Record created", body = Attendance),
        (status = 400, description = "Malformed payload"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn create_attendance(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAttendance>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let date = payload.date.date_naive();

    let result =
        sqlx::query("INSERT INTO attendance (date, name, giris, cikis, izin) VALUES (?, ?, ?, ?, ?)")
            .bind(date)
            .bind(&payload.name)
            .bind(&payload.giris)
            .bind(&payload.cikis)
            .bind(payload.izin)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create attendance record");
                ErrorInternalServerError("Internal Server Error")
            })?;

    let record = Attendance {
        id: result.last_insert_id(),
        date,
        name: payload.name,
        giris: payload.giris,
        cikis: payload.cikis,
        izin: payload.izin,
    };

    Ok(HttpResponse::Ok().json(record))
}

/// Get one attendance record
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Record found", body = Attendance),
        (status = 404, description = "Record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let record = fetch_record(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch attendance record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        }))),
    }
}

/// Replace an attendance record
///
/// Full replace of date, name and both times. The leave flag is owned by
/// the PATCH endpoint and is never written here.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Record updated", body = Attendance),
        (status = 404, description = "Record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn update_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateAttendance>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let payload = payload.into_inner();

    let result =
        sqlx::query("UPDATE attendance SET date = ?, name = ?, giris = ?, cikis = ? WHERE id = ?")
            .bind(payload.date.date_naive())
            .bind(&payload.name)
            .bind(&payload.giris)
            .bind(&payload.cikis)
            .bind(id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, id, "Failed to update attendance record");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    }

    let record = fetch_record(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch updated attendance record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        }))),
    }
}

/// Set the leave flag
#[utoipa::path(
    patch,
    path = "/api/v1/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    request_body = UpdateLeaveFlag,
    responses(
        (status = 200, description = "Leave flag updated", body = Attendance),
        (status = 404, description = "Record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn set_leave_flag(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveFlag>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let result = sqlx::query("UPDATE attendance SET izin = ? WHERE id = ?")
        .bind(payload.izin)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to update leave flag");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    }

    let record = fetch_record(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch updated attendance record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        }))),
    }
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Record deleted", body = Object, example = json!({
            "success": true
        })),
        (status = 404, description = "Record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete attendance record");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn create_payload_defaults_izin_to_zero() {
        let payload: CreateAttendance = serde_json::from_str(
            r#"{"date":"2026-08-03T00:00:00.000Z","name":"Ali","giris":"09:00","cikis":"18:00"}"#,
        )
        .unwrap();
        assert_eq!(payload.izin, 0);
    }

    #[test]
    fn create_payload_keeps_explicit_izin() {
        let payload: CreateAttendance = serde_json::from_str(
            r#"{"date":"2026-08-03T00:00:00.000Z","name":"Ali","giris":"09:00","cikis":"18:00","izin":1}"#,
        )
        .unwrap();
        assert_eq!(payload.izin, 1);
    }

    #[test]
    fn create_payload_rejects_missing_required_fields() {
        let result: Result<CreateAttendance, _> =
            serde_json::from_str(r#"{"date":"2026-08-03T00:00:00.000Z","name":"Ali"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn payload_timestamp_reduces_to_calendar_date() {
        let payload: CreateAttendance = serde_json::from_str(
            r#"{"date":"2026-08-03T21:45:00.000Z","name":"Ali","giris":"09:00","cikis":"18:00"}"#,
        )
        .unwrap();
        assert_eq!(
            payload.date.date_naive(),
            NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
        );
    }

    #[test]
    fn list_response_wire_shape() {
        let value = serde_json::to_value(AttendanceListResponse {
            data: vec![],
            count: 7,
        })
        .unwrap();
        assert_eq!(value, json!({ "data": [], "count": 7 }));
    }
}
