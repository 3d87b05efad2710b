use crate::{
    auth::auth::AuthUser,
    model::employee::Employee,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-3000")]
    pub employee_code: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,
    #[schema(example = 1, nullable = true)]
    pub shift_id: Option<u64>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    #[schema(example = 20)]
    pub annual_leave_days: Option<u32>,
    #[schema(example = 10)]
    pub sick_leave_days: Option<u32>,
    #[schema(example = 5)]
    pub casual_leave_days: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department_id: Option<u64>,
    pub shift_id: Option<u64>,
    pub status: Option<String>,
    /// Matches against name, code and email.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

const EMPLOYEE_COLUMNS: &str = r#"
    id, employee_code, first_name, last_name, email, phone,
    department_id, shift_id, hire_date, status,
    annual_leave_days, sick_leave_days, casual_leave_days
"#;

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employee",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created"),
        (status = 409, description = "Employee code or email already in use"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
            (employee_code, first_name, last_name, email, phone,
             department_id, shift_id, hire_date,
             annual_leave_days, sick_leave_days, casual_leave_days)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.employee_code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(payload.department_id)
    .bind(payload.shift_id)
    .bind(payload.hire_date)
    .bind(payload.annual_leave_days.unwrap_or(20))
    .bind(payload.sick_leave_days.unwrap_or(10))
    .bind(payload.casual_leave_days.unwrap_or(5))
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Employee created"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Employee code or email already in use"
                    })));
                }
            }
            error!(error = %e, "Failed to create employee");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Paginated employee list with department/shift/status filters and search.
#[utoipa::path(
    get,
    path = "/api/v1/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
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

    if let Some(dep) = query.department_id {
        where_sql.push_str(" AND department_id = ?");
        args.push(Arg::U64(dep));
    }
    if let Some(shift) = query.shift_id {
        where_sql.push_str(" AND shift_id = ?");
        args.push(Arg::U64(shift));
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(Arg::Str(status.to_string()));
    }
    if let Some(search) = query.search.as_deref() {
        where_sql.push_str(
            " AND (first_name LIKE ? OR last_name LIKE ? OR employee_code LIKE ? OR email LIKE ?)",
        );
        let pattern = format!("%{}%", search);
        for _ in 0..4 {
            args.push(Arg::Str(pattern.clone()));
        }
    }

    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            Arg::U64(v) => count_q.bind(*v),
            Arg::Str(s) => count_q.bind(s.clone()),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT {} FROM employees{} ORDER BY id LIMIT ? OFFSET ?",
        EMPLOYEE_COLUMNS, where_sql
    );
    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
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
            error!(error = %e, "Failed to fetch employee list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Fetch one employee
#[utoipa::path(
    get,
    path = "/api/v1/employee/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match employee {
        Some(e) => Ok(HttpResponse::Ok().json(e)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Partial update from an arbitrary JSON object of column values.
#[utoipa::path(
    put,
    path = "/api/v1/employee/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "No fields provided"),
        (status = 404, description = "Employee not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    const ALLOWED: &[&str] = &[
        "employee_code",
        "first_name",
        "last_name",
        "email",
        "phone",
        "department_id",
        "shift_id",
        "hire_date",
        "status",
        "annual_leave_days",
        "sick_leave_days",
        "casual_leave_days",
    ];
    if let Some(obj) = payload.as_object() {
        if let Some(bad) = obj.keys().find(|k| !ALLOWED.contains(&k.as_str())) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("Unknown field: {}", bad)
            })));
        }
    }

    let update = build_update_sql("employees", &payload, "id", id as i64)?;
    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, id, "Failed to update employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated"
    })))
}

/// Delete employee
#[utoipa::path(
    delete,
    path = "/api/v1/employee/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 404, description = "Employee not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted"
    })))
}
