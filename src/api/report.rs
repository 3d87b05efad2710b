use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::collections::HashMap;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::holiday::HolidayCalendar;
use crate::core::summary::{DayRecord, LeaveSpan, Period, SummaryCounts, summarize};

/// One export row: employee identity plus the aggregated counts. The
/// spreadsheet/PDF exporter consumes these as-is.
#[derive(Serialize, ToSchema)]
pub struct SummaryRow {
    pub employee_id: u64,
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[serde(flatten)]
    pub counts: SummaryCounts,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryReport {
    pub year: i32,
    #[schema(nullable = true)]
    pub month: Option<u32>,
    pub rows: Vec<SummaryRow>,
    /// Company total across all rows.
    pub total: SummaryCounts,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MonthlyQuery {
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 6)]
    pub month: u32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct YearlyQuery {
    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(sqlx::FromRow)]
struct EmployeeName {
    id: u64,
    employee_code: String,
    first_name: String,
    last_name: String,
}

async fn build_report(
    pool: &MySqlPool,
    config: &Config,
    period: Period,
) -> Result<SummaryReport, sqlx::Error> {
    let (Some(first), Some(last)) = (period.first_day(), period.last_day()) else {
        return Ok(SummaryReport {
            year: period.year,
            month: period.month,
            rows: Vec::new(),
            total: SummaryCounts::default(),
        });
    };

    let employees = sqlx::query_as::<_, EmployeeName>(
        r#"
        SELECT id, employee_code, first_name, last_name
        FROM employees
        WHERE status = 'active'
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut records: HashMap<u64, Vec<DayRecord>> = HashMap::new();
    let rows = sqlx::query_as::<_, (u64, NaiveDate, Option<NaiveTime>, Option<String>)>(
        r#"
        SELECT employee_id, date, clock_in, status
        FROM attendance
        WHERE date BETWEEN ? AND ?
        "#,
    )
    .bind(first)
    .bind(last)
    .fetch_all(pool)
    .await?;
    for (employee_id, date, clock_in, status) in rows {
        records.entry(employee_id).or_default().push(DayRecord {
            date,
            clocked_in: clock_in.is_some(),
            status,
        });
    }

    let mut leaves: HashMap<u64, Vec<LeaveSpan>> = HashMap::new();
    let spans = sqlx::query_as::<_, (u64, NaiveDate, NaiveDate)>(
        r#"
        SELECT employee_id, start_date, end_date
        FROM leave_requests
        WHERE status = 'approved' AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(last)
    .bind(first)
    .fetch_all(pool)
    .await?;
    for (employee_id, start, end) in spans {
        leaves
            .entry(employee_id)
            .or_default()
            .push(LeaveSpan { start, end });
    }

    let holidays =
        sqlx::query_scalar::<_, NaiveDate>("SELECT date FROM holidays WHERE date BETWEEN ? AND ?")
            .bind(first)
            .bind(last)
            .fetch_all(pool)
            .await?;
    let calendar = HolidayCalendar::from_dates(holidays);

    let today = config.now_local().date();
    let empty_records: Vec<DayRecord> = Vec::new();
    let empty_leaves: Vec<LeaveSpan> = Vec::new();

    let mut total = SummaryCounts::default();
    let mut out = Vec::with_capacity(employees.len());
    for employee in employees {
        let counts = summarize(
            period,
            today,
            records.get(&employee.id).unwrap_or(&empty_records),
            leaves.get(&employee.id).unwrap_or(&empty_leaves),
            &calendar,
        );
        total.accumulate(&counts);
        out.push(SummaryRow {
            employee_id: employee.id,
            employee_code: employee.employee_code,
            employee_name: format!("{} {}", employee.first_name, employee.last_name),
            counts,
        });
    }

    Ok(SummaryReport {
        year: period.year,
        month: period.month,
        rows: out,
        total,
    })
}

/// Monthly attendance summary, one row per employee plus a company total.
#[utoipa::path(
    get,
    path = "/api/v1/report/monthly",
    params(MonthlyQuery),
    responses(
        (status = 200, description = "Monthly summary rows", body = SummaryReport),
        (status = 400, description = "Invalid month"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn monthly_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<MonthlyQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if !(1..=12).contains(&query.month) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "month must be between 1 and 12"
        })));
    }

    let report = build_report(
        pool.get_ref(),
        config.get_ref(),
        Period::month(query.year, query.month),
    )
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to build monthly report");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(report))
}

/// Yearly attendance summary.
#[utoipa::path(
    get,
    path = "/api/v1/report/yearly",
    params(YearlyQuery),
    responses(
        (status = 200, description = "Yearly summary rows", body = SummaryReport),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn yearly_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<YearlyQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let report = build_report(pool.get_ref(), config.get_ref(), Period::year(query.year))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to build yearly report");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(report))
}
