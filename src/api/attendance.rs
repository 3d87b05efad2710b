use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::holiday::HolidayCalendar;
use crate::core::state::{ActionError, validate_coordinates};
use crate::core::summary::{DayDetail, DayRecord, LeaveSpan, Period, classify_days};
use crate::core::timeclock::format_duration;
use crate::model::attendance::Attendance;

/// Geolocation attached to every clock action.
#[derive(Deserialize, ToSchema)]
pub struct ClockAction {
    #[schema(example = 23.7808875)]
    pub latitude: f64,
    #[schema(example = 90.2792371)]
    pub longitude: f64,
}

fn rejection(err: ActionError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "message": err.to_string() }))
}

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, date, clock_in, clock_out, status,
    is_on_break, break_start, total_break_secs, has_taken_break,
    shift_id, expected_start, expected_end,
    clock_in_lat, clock_in_lng, clock_out_lat, clock_out_lng
"#;

async fn fetch_today(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Option<Attendance>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM attendance WHERE employee_id = ? AND date = ?",
        ATTENDANCE_COLUMNS
    );
    sqlx::query_as::<_, Attendance>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(pool)
        .await
}

#[derive(sqlx::FromRow)]
struct ShiftTimes {
    id: u64,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

/// The employee's assigned shift, or the default shift if none is assigned.
async fn resolve_shift(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Option<ShiftTimes>, sqlx::Error> {
    let assigned = sqlx::query_as::<_, ShiftTimes>(
        r#"
        SELECT s.id, s.start_time, s.end_time
        FROM employees e
        JOIN shifts s ON s.id = e.shift_id
        WHERE e.id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    if assigned.is_some() {
        return Ok(assigned);
    }

    sqlx::query_as::<_, ShiftTimes>(
        "SELECT id, start_time, end_time FROM shifts WHERE is_default = TRUE LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}

/// Clock-in: creates today's record, status Present/Late against the shift
/// start (or the configured fallback threshold).
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    request_body = ClockAction,
    responses(
        (status = 200, description = "Clocked in", body = Object, example = json!({
            "message": "Clocked in", "status": "present"
        })),
        (status = 400, description = "Already clocked in today or invalid location"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ClockAction>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    if let Err(e) = validate_coordinates(payload.latitude, payload.longitude) {
        return Ok(rejection(e));
    }

    let now = config.now_local();
    if let Some(record) = fetch_today(pool.get_ref(), employee_id, now.date())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
    {
        if let Err(e) = record.day_state().ensure_can_clock_in() {
            return Ok(rejection(e));
        }
    }

    let shift = resolve_shift(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to resolve shift");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let threshold = shift
        .as_ref()
        .map(|s| s.start_time)
        .unwrap_or(config.late_threshold);
    let status = crate::core::state::status_for_clock_in(now.time(), threshold);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
            (employee_id, date, clock_in, status, shift_id,
             expected_start, expected_end, clock_in_lat, clock_in_lng)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(now.date())
    .bind(now.time())
    .bind(status.to_string())
    .bind(shift.as_ref().map(|s| s.id))
    .bind(shift.as_ref().map(|s| s.start_time))
    .bind(shift.as_ref().map(|s| s.end_time))
    .bind(payload.latitude)
    .bind(payload.longitude)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Clocked in",
            "status": status.to_string()
        }))),
        Err(e) => {
            // Unique (employee_id, date) key rejects the duplicate day.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(rejection(ActionError::AlreadyClockedIn));
                }
            }
            tracing::error!(error = %e, employee_id, "Clock-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Clock-out: terminal for the day; an open break is closed into the total
/// first. The guarded UPDATE keeps clock_out immutable once set.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-out",
    request_body = ClockAction,
    responses(
        (status = 200, description = "Clocked out", body = Object, example = json!({
            "message": "Clocked out", "worked": "8 Hr 05 Mins 09 Secs"
        })),
        (status = 400, description = "Not clocked in, already clocked out, or invalid location"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ClockAction>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    if let Err(e) = validate_coordinates(payload.latitude, payload.longitude) {
        return Ok(rejection(e));
    }

    let now = config.now_local();
    let record = fetch_today(pool.get_ref(), employee_id, now.date())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(record) = record else {
        return Ok(rejection(ActionError::NotClockedIn));
    };

    let state = record.day_state();
    let close = match state.close_for_clock_out(now) {
        Ok(c) => c,
        Err(e) => return Ok(rejection(e)),
    };
    let closed_break = state.is_on_break;

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET clock_out = ?, is_on_break = FALSE, break_start = NULL,
            total_break_secs = ?, has_taken_break = has_taken_break OR ?,
            clock_out_lat = ?, clock_out_lng = ?
        WHERE id = ? AND clock_out IS NULL
        "#,
    )
    .bind(now.time())
    .bind(close.total_break_secs)
    .bind(closed_break)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(record.id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Clock-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(rejection(ActionError::AlreadyClockedOut));
    }

    let clock = crate::core::timeclock::Timeclock {
        clock_in: record.clock_in.unwrap_or(now.time()),
        clock_out: Some(now.time()),
        break_start: None,
        total_break_secs: close.total_break_secs,
        is_on_break: false,
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Clocked out",
        "worked": format_duration(clock.worked_secs(now)),
        "break": format_duration(close.total_break_secs)
    })))
}

/// Break start: pauses the worked counter.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/break/start",
    responses(
        (status = 200, description = "Break started"),
        (status = 400, description = "Not clocked in, already on break, or already clocked out"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn break_start(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let now = config.now_local();

    let record = fetch_today(pool.get_ref(), employee_id, now.date())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(record) = record else {
        return Ok(rejection(ActionError::NotClockedIn));
    };

    if let Err(e) = record.day_state().ensure_can_start_break() {
        return Ok(rejection(e));
    }

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET is_on_break = TRUE, break_start = ?
        WHERE id = ? AND is_on_break = FALSE AND clock_out IS NULL
        "#,
    )
    .bind(now)
    .bind(record.id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Break start failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        // Lost a race with another submission of the same action.
        return Ok(rejection(ActionError::AlreadyOnBreak));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Break started"
    })))
}

/// Break end: commits the elapsed break into the cumulative total and
/// resumes the worked counter from where it paused.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/break/end",
    responses(
        (status = 200, description = "Break ended", body = Object, example = json!({
            "message": "Break ended", "break": "0 Hr 10 Mins 00 Secs"
        })),
        (status = 400, description = "No break in progress"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn break_end(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let now = config.now_local();

    let record = fetch_today(pool.get_ref(), employee_id, now.date())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(record) = record else {
        return Ok(rejection(ActionError::NotClockedIn));
    };

    let close = match record.day_state().end_break(now) {
        Ok(c) => c,
        Err(e) => return Ok(rejection(e)),
    };

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET is_on_break = FALSE, break_start = NULL,
            total_break_secs = ?, has_taken_break = TRUE
        WHERE id = ? AND is_on_break = TRUE
        "#,
    )
    .bind(close.total_break_secs)
    .bind(record.id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Break end failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(rejection(ActionError::NotOnBreak));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Break ended",
        "break": format_duration(close.total_break_secs)
    })))
}

/// One-shot seed for the client display timers. Clients keep their own
/// interval counters and must re-fetch this after every state change.
#[derive(Serialize, ToSchema)]
pub struct TimeclockSnapshot {
    pub has_clocked_in: bool,
    pub has_clocked_out: bool,
    pub is_on_break: bool,
    pub has_taken_break: bool,
    #[schema(value_type = String, example = "09:02:11", nullable = true)]
    pub clock_in: Option<NaiveTime>,
    #[schema(value_type = String, example = "17:30:00", nullable = true)]
    pub clock_out: Option<NaiveTime>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub break_start: Option<NaiveDateTime>,
    pub total_break_secs: i64,
    pub worked_secs: i64,
    pub break_secs: i64,
    #[schema(example = "8 Hr 05 Mins 09 Secs")]
    pub worked_display: String,
    #[schema(example = "0 Hr 10 Mins 00 Secs")]
    pub break_display: String,
    #[schema(value_type = String, format = "date-time")]
    pub server_now: NaiveDateTime,
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance/snapshot",
    responses(
        (status = 200, description = "Today's timeclock seed", body = TimeclockSnapshot),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn snapshot(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let now = config.now_local();

    let record = fetch_today(pool.get_ref(), employee_id, now.date())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let snapshot = match record {
        Some(record) => {
            let (worked, brk) = match record.timeclock() {
                Some(clock) => (clock.worked_secs(now), clock.break_secs(now)),
                None => (0, 0),
            };
            TimeclockSnapshot {
                has_clocked_in: record.clock_in.is_some(),
                has_clocked_out: record.clock_out.is_some(),
                is_on_break: record.is_on_break,
                has_taken_break: record.has_taken_break,
                clock_in: record.clock_in,
                clock_out: record.clock_out,
                break_start: record.break_start,
                total_break_secs: record.total_break_secs,
                worked_secs: worked,
                break_secs: brk,
                worked_display: format_duration(worked),
                break_display: format_duration(brk),
                server_now: now,
            }
        }
        None => TimeclockSnapshot {
            has_clocked_in: false,
            has_clocked_out: false,
            is_on_break: false,
            has_taken_break: false,
            clock_in: None,
            clock_out: None,
            break_start: None,
            total_break_secs: 0,
            worked_secs: 0,
            break_secs: 0,
            worked_display: format_duration(0),
            break_display: format_duration(0),
            server_now: now,
        },
    };

    Ok(HttpResponse::Ok().json(snapshot))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 6)]
    pub month: u32,
    /// Another employee's calendar; HR/Admin only.
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayDetail>,
}

/// Per-day classification feeding the month-view detail modal.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Day-by-day classification", body = CalendarResponse),
        (status = 400, description = "Invalid month"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn calendar(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<CalendarQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match query.employee_id {
        Some(other) if Some(other) != auth.employee_id => {
            auth.require_hr_or_admin()?;
            other
        }
        _ => auth.require_employee_id()?,
    };

    if !(1..=12).contains(&query.month) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "month must be between 1 and 12"
        })));
    }

    let period = Period::month(query.year, query.month);
    let (Some(first), Some(last)) = (period.first_day(), period.last_day()) else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid year/month"
        })));
    };

    let records = sqlx::query_as::<_, (NaiveDate, Option<NaiveTime>, Option<String>)>(
        r#"
        SELECT date, clock_in, status
        FROM attendance
        WHERE employee_id = ? AND date BETWEEN ? AND ?
        "#,
    )
    .bind(employee_id)
    .bind(first)
    .bind(last)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch attendance range");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    let records: Vec<DayRecord> = records
        .into_iter()
        .map(|(date, clock_in, status)| DayRecord {
            date,
            clocked_in: clock_in.is_some(),
            status,
        })
        .collect();

    let leaves = sqlx::query_as::<_, (NaiveDate, NaiveDate)>(
        r#"
        SELECT start_date, end_date
        FROM leave_requests
        WHERE employee_id = ? AND status = 'approved'
          AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(employee_id)
    .bind(last)
    .bind(first)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch leave ranges");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    let leaves: Vec<LeaveSpan> = leaves
        .into_iter()
        .map(|(start, end)| LeaveSpan { start, end })
        .collect();

    let holidays = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT date FROM holidays WHERE date BETWEEN ? AND ?",
    )
    .bind(first)
    .bind(last)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch holidays");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    let calendar = HolidayCalendar::from_dates(holidays);

    let today = config.now_local().date();
    let days = classify_days(period, today, &records, &leaves, &calendar);

    Ok(HttpResponse::Ok().json(CalendarResponse {
        year: query.year,
        month: query.month,
        days,
    }))
}
