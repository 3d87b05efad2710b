use crate::{auth::auth::AuthUser, model::holiday::Holiday};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "2026-03-26", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Independence Day")]
    pub name: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HolidayQuery {
    #[schema(example = 2026)]
    pub year: i32,
}

/// Holidays configured for one year
#[utoipa::path(
    get,
    path = "/api/v1/holiday",
    params(HolidayQuery),
    responses(
        (status = 200, description = "Holidays for the year", body = [Holiday]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn list_holidays(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HolidayQuery>,
) -> actix_web::Result<impl Responder> {
    let holidays = sqlx::query_as::<_, Holiday>(
        "SELECT id, date, name FROM holidays WHERE YEAR(date) = ? ORDER BY date",
    )
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, year = query.year, "Failed to fetch holidays");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(holidays))
}

/// Add a holiday (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/holiday",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday added"),
        (status = 409, description = "Date already configured"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query("INSERT INTO holidays (date, name) VALUES (?, ?)")
        .bind(payload.date)
        .bind(&payload.name)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Holiday added"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "A holiday is already configured for that date"
                    })));
                }
            }
            error!(error = %e, "Failed to add holiday");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Remove a holiday (HR/Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/holiday/{id}",
    params(("id" = u64, Path, description = "Holiday ID")),
    responses(
        (status = 200, description = "Holiday removed"),
        (status = 404, description = "Holiday not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete holiday");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Holiday not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Holiday removed"
    })))
}
