use crate::auth::auth::AuthUser;
use crate::core::holiday::HolidayCalendar;
use crate::model::leave_request::LeaveStatus;
use crate::model::role::Role;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, Clone, Copy, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Casual,
    Unpaid,
}

impl LeaveType {
    fn as_str(&self) -> &str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Casual => "casual",
            LeaveType::Unpaid => "unpaid",
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-06-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick")]
    pub leave_type: LeaveType,
    #[schema(example = "Flu", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-06-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick", value_type = String)]
    pub leave_type: String,
    #[schema(example = "pending", value_type = String)]
    pub status: Option<String>,
    #[schema(example = "Flu", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "2026-06-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[schema(example = 123)]
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[schema(example = "pending")]
    pub status: Option<String>,
    /// Pagination page number (1-based)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Items per page
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// HR/Admin see every request; an employee sees only their own.
fn can_view_leave(auth: &AuthUser, owner_employee_id: u64) -> bool {
    match auth.role {
        Role::Admin | Role::Hr => true,
        Role::Employee => auth.employee_id == Some(owner_employee_id),
    }
}

/// Remaining entitlement in days for the category, `None` when uncapped.
async fn remaining_entitlement(
    pool: &MySqlPool,
    employee_id: u64,
    leave_type: LeaveType,
    year: i32,
) -> Result<Option<i64>, sqlx::Error> {
    let column = match leave_type {
        LeaveType::Annual => "annual_leave_days",
        LeaveType::Sick => "sick_leave_days",
        LeaveType::Casual => "casual_leave_days",
        LeaveType::Unpaid => return Ok(None),
    };

    let sql = format!("SELECT {} FROM employees WHERE id = ?", column);
    let entitled = sqlx::query_scalar::<_, u32>(&sql)
        .bind(employee_id)
        .fetch_one(pool)
        .await?;

    let year_start = NaiveDate::from_ymd_opt(year, 1, 1);
    let year_end = NaiveDate::from_ymd_opt(year, 12, 31);

    let spans = sqlx::query_as::<_, (NaiveDate, NaiveDate)>(
        r#"
        SELECT start_date, end_date
        FROM leave_requests
        WHERE employee_id = ? AND leave_type = ? AND status = 'approved'
          AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(employee_id)
    .bind(leave_type.as_str())
    .bind(year_end)
    .bind(year_start)
    .fetch_all(pool)
    .await?;

    let holidays = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT date FROM holidays WHERE date BETWEEN ? AND ?",
    )
    .bind(year_start)
    .bind(year_end)
    .fetch_all(pool)
    .await?;
    let calendar = HolidayCalendar::from_dates(holidays);

    let used: i64 = spans
        .iter()
        .map(|&(start, end)| calendar.working_days_between(start, end) as i64)
        .sum();

    Ok(Some((entitled as i64 - used).max(0)))
}

/// Create leave request
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted",
            "status": "pending"
        })),
        (status = 400, description = "Bad request"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    // Balance check against the category entitlement for the start year.
    let remaining = remaining_entitlement(
        pool.get_ref(),
        employee_id,
        payload.leave_type,
        payload.start_date.year(),
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to compute leave balance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Some(remaining) = remaining {
        let holidays = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT date FROM holidays WHERE date BETWEEN ? AND ?",
        )
        .bind(payload.start_date)
        .bind(payload.end_date)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch holidays");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
        let calendar = HolidayCalendar::from_dates(holidays);
        let requested =
            calendar.working_days_between(payload.start_date, payload.end_date) as i64;

        if requested > remaining {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": format!(
                    "Insufficient {} leave balance: {} day(s) requested, {} remaining",
                    payload.leave_type.as_str(), requested, remaining
                )
            })));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, start_date, end_date, leave_type, reason)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.as_str())
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

async fn set_leave_status(
    pool: &MySqlPool,
    leave_id: u64,
    status: LeaveStatus,
) -> actix_web::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(status.to_string())
    .bind(leave_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, %status, "Leave status update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(result.rows_affected() > 0)
}

/// Approve leave (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved"),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let leave_id = path.into_inner();

    if !set_leave_status(pool.get_ref(), leave_id, LeaveStatus::Approved).await? {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approved"
    })))
}

/// Reject leave (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected"),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let leave_id = path.into_inner();

    if !set_leave_status(pool.get_ref(), leave_id, LeaveStatus::Rejected).await? {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}

/// Fetch one leave application
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401), (status = 403),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveResponse>(
        r#"
        SELECT id, employee_id, start_date, end_date, leave_type, status, reason, created_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(data) if can_view_leave(&auth, data.employee_id) => {
            Ok(HttpResponse::Ok().json(data))
        }
        Some(_) => Err(actix_web::error::ErrorForbidden("Not your leave request")),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// Paginated leave list
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // Employees are pinned to their own records; HR/Admin may filter freely.
    let employee_filter = match auth.role {
        Role::Admin | Role::Hr => query.employee_id,
        Role::Employee => Some(auth.require_employee_id()?),
    };

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = employee_filter {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, start_date, end_date, leave_type, status, reason, created_at
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveResponse>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, employee_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "test".to_string(),
            role,
            employee_id,
        }
    }

    #[test]
    fn employee_can_view_own_leave_request() {
        let auth = user(Role::Employee, Some(42));
        assert!(can_view_leave(&auth, 42));
    }

    #[test]
    fn employee_cannot_view_another_employees_leave() {
        let auth = user(Role::Employee, Some(42));
        assert!(!can_view_leave(&auth, 43));

        // No linked employee profile means no visibility at all.
        let orphan = user(Role::Employee, None);
        assert!(!can_view_leave(&orphan, 42));
    }

    #[test]
    fn hr_and_admin_can_view_any_leave() {
        assert!(can_view_leave(&user(Role::Hr, None), 42));
        assert!(can_view_leave(&user(Role::Admin, Some(7)), 42));
    }
}
