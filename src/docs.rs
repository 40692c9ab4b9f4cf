use crate::api::attendance::{
    AttendanceListResponse, CreateAttendance, UpdateAttendance, UpdateLeaveFlag,
};
use crate::model::attendance::Attendance;
use crate::utils::listing::ListingParams;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Attendance Tracker

REST API for a small internal attendance tracker.

### Key Features
- **Records**
  - Create, update, list and delete daily attendance entries
- **Listing**
  - Paginated, sorted and name-filtered queries
  - Trailing two-week window view
- **Leave flag**
  - Toggled independently of the rest of a record
- **Worked hours**
  - Per-person totals over the trailing two weeks, overnight shifts included

### Response Format
- JSON-based RESTful responses
- Paginated listings return `{data, count}`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::list_attendance,
        crate::api::attendance::trailing_hours,
        crate::api::attendance::create_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::set_leave_flag,
        crate::api::attendance::delete_attendance
    ),
    components(
        schemas(
            Attendance,
            CreateAttendance,
            UpdateAttendance,
            UpdateLeaveFlag,
            AttendanceListResponse,
            ListingParams
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance tracking APIs"),
    )
)]
pub struct ApiDoc;
