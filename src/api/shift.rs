use crate::{auth::auth::AuthUser, model::shift::Shift};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateShift {
    #[schema(example = "Day shift")]
    pub name: String,
    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "17:00:00", value_type = String)]
    pub end_time: NaiveTime,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateShift {
    pub name: Option<String>,
    #[schema(example = "09:30:00", value_type = String)]
    pub start_time: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = String)]
    pub end_time: Option<NaiveTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignShift {
    #[schema(example = 1001)]
    pub employee_id: u64,
}

/// Create shift (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/shift",
    request_body = CreateShift,
    responses(
        (status = 201, description = "Shift created"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn create_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    sqlx::query("INSERT INTO shifts (name, start_time, end_time) VALUES (?, ?, ?)")
        .bind(&payload.name)
        .bind(payload.start_time)
        .bind(payload.end_time)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create shift");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Shift created"
    })))
}

/// List shifts
#[utoipa::path(
    get,
    path = "/api/v1/shift",
    responses(
        (status = 200, description = "All shifts", body = [Shift]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn list_shifts(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let shifts = sqlx::query_as::<_, Shift>(
        "SELECT id, name, start_time, end_time, is_default FROM shifts ORDER BY start_time",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch shifts");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(shifts))
}

/// Update shift times/name
#[utoipa::path(
    put,
    path = "/api/v1/shift/{id}",
    params(("id" = u64, Path, description = "Shift ID")),
    request_body = UpdateShift,
    responses(
        (status = 200, description = "Shift updated"),
        (status = 404, description = "Shift not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn update_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let current = sqlx::query_as::<_, Shift>(
        "SELECT id, name, start_time, end_time, is_default FROM shifts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch shift");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(current) = current else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Shift not found"
        })));
    };

    sqlx::query("UPDATE shifts SET name = ?, start_time = ?, end_time = ? WHERE id = ?")
        .bind(payload.name.as_deref().unwrap_or(&current.name))
        .bind(payload.start_time.unwrap_or(current.start_time))
        .bind(payload.end_time.unwrap_or(current.end_time))
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to update shift");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Shift updated"
    })))
}

/// Delete shift; assigned employees fall back to the default shift.
#[utoipa::path(
    delete,
    path = "/api/v1/shift/{id}",
    params(("id" = u64, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift deleted"),
        (status = 404, description = "Shift not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn delete_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    let mut tx = pool.get_ref().begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("UPDATE employees SET shift_id = NULL WHERE shift_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to unassign shift");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let result = sqlx::query("DELETE FROM shifts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete shift");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Shift not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Shift deleted"
    })))
}

/// Make this shift the default. Clears the flag elsewhere in the same
/// transaction so at most one default exists.
#[utoipa::path(
    put,
    path = "/api/v1/shift/{id}/default",
    params(("id" = u64, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Default shift set"),
        (status = 404, description = "Shift not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn set_default_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let mut tx = pool.get_ref().begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("UPDATE shifts SET is_default = FALSE WHERE is_default = TRUE")
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to clear default shift");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let result = sqlx::query("UPDATE shifts SET is_default = TRUE WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to set default shift");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        // Unknown shift id; abandon the transaction so the old default stays.
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Shift not found"
        })));
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Default shift set"
    })))
}

/// Assign an employee to this shift
#[utoipa::path(
    put,
    path = "/api/v1/shift/{id}/assign",
    params(("id" = u64, Path, description = "Shift ID")),
    request_body = AssignShift,
    responses(
        (status = 200, description = "Employee assigned"),
        (status = 404, description = "Shift or employee not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn assign_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AssignShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let shift_id = path.into_inner();

    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM shifts WHERE id = ?)")
            .bind(shift_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, shift_id, "Failed to check shift");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    if !exists {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Shift not found"
        })));
    }

    let result = sqlx::query("UPDATE employees SET shift_id = ? WHERE id = ?")
        .bind(shift_id)
        .bind(payload.employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, shift_id, "Failed to assign shift");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee assigned to shift"
    })))
}
