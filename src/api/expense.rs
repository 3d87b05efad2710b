use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;

#[derive(Deserialize, ToSchema)]
pub struct CreateExpense {
    #[schema(example = "2026-06-10", value_type = String, format = "date")]
    pub claim_date: NaiveDate,

    #[schema(example = "travel")]
    pub category: String,

    #[schema(example = 1250.50)]
    pub amount: f64,

    #[schema(example = "Taxi to client site", nullable = true)]
    pub note: Option<String>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct ExpenseResponse {
    pub id: u64,
    pub employee_id: u64,

    #[schema(value_type = String, format = "date")]
    pub claim_date: NaiveDate,

    pub category: String,
    pub amount: f64,
    pub note: Option<String>,
    pub status: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ExpenseQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = 1001)]
    pub employee_id: Option<u64>,

    #[schema(example = "pending")]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedExpenseResponse {
    pub data: Vec<ExpenseResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Submit an expense claim
#[utoipa::path(
    post,
    path = "/api/v1/expense",
    request_body = CreateExpense,
    responses(
        (status = 201, description = "Expense claim submitted"),
        (status = 400, description = "Invalid amount"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Expense"
)]
pub async fn create_expense(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateExpense>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    if !payload.amount.is_finite() || payload.amount <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Amount must be a positive number"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO expense_claims
            (employee_id, claim_date, category, amount, note)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.claim_date)
    .bind(&payload.category)
    .bind(payload.amount)
    .bind(&payload.note)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to create expense claim");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Expense claim submitted",
        "status": "pending"
    })))
}

async fn set_expense_status(
    pool: &MySqlPool,
    expense_id: u64,
    status: &str,
) -> actix_web::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE expense_claims
        SET status = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(status)
    .bind(expense_id)
    .execute(pool)
    .await
    .map_err(|e| {
        error!(error = %e, expense_id, status, "Expense status update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(result.rows_affected() > 0)
}

/// Approve expense claim (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/expense/{expense_id}/approve",
    params(("expense_id" = u64, Path, description = "Expense claim ID")),
    responses(
        (status = 200, description = "Expense approved"),
        (status = 400, description = "Claim not found or already processed"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Expense"
)]
pub async fn approve_expense(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let expense_id = path.into_inner();

    if !set_expense_status(pool.get_ref(), expense_id, "approved").await? {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Expense claim not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Expense approved" })))
}

/// Reject expense claim (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/expense/{expense_id}/reject",
    params(("expense_id" = u64, Path, description = "Expense claim ID")),
    responses(
        (status = 200, description = "Expense rejected"),
        (status = 400, description = "Claim not found or already processed"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Expense"
)]
pub async fn reject_expense(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let expense_id = path.into_inner();

    if !set_expense_status(pool.get_ref(), expense_id, "rejected").await? {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Expense claim not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Expense rejected" })))
}

/// Fetch one expense claim
#[utoipa::path(
    get,
    path = "/api/v1/expense/{expense_id}",
    params(("expense_id" = u64, Path, description = "Expense claim ID")),
    responses(
        (status = 200, body = ExpenseResponse),
        (status = 404, description = "Claim not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Expense"
)]
pub async fn get_expense(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let expense_id = path.into_inner();

    let expense = sqlx::query_as::<_, ExpenseResponse>(
        r#"
        SELECT id, employee_id, claim_date, category, amount, note, status, created_at
        FROM expense_claims
        WHERE id = ?
        "#,
    )
    .bind(expense_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, expense_id, "Failed to fetch expense claim");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match expense {
        Some(e) => Ok(HttpResponse::Ok().json(e)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Expense claim not found"
        }))),
    }
}

/// Paginated expense claim list
#[utoipa::path(
    get,
    path = "/api/v1/expense",
    params(ExpenseQuery),
    responses(
        (status = 200, body = PaginatedExpenseResponse),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Expense"
)]
pub async fn list_expenses(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ExpenseQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    enum Arg {
        U64(u64),
        Str(String),
    }

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<Arg> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(Arg::U64(emp_id));
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(Arg::Str(status.to_string()));
    }

    let count_sql = format!("SELECT COUNT(*) FROM expense_claims{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            Arg::U64(v) => count_q.bind(*v),
            Arg::Str(s) => count_q.bind(s.clone()),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count expense claims");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, claim_date, category, amount, note, status, created_at
        FROM expense_claims
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, ExpenseResponse>(&data_sql);
    for arg in args {
        data_q = match arg {
            Arg::U64(v) => data_q.bind(v),
            Arg::Str(s) => data_q.bind(s),
        };
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch expense claims");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(PaginatedExpenseResponse {
        data,
        page,
        per_page,
        total,
    }))
}
