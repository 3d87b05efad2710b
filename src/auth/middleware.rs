use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use crate::models::TokenType;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "error": message }))
}

/// Validates the bearer token and builds the request principal. Only access
/// tokens pass; a refresh token is good for `/auth/refresh` and nothing else.
fn authenticate(req: &ServiceRequest, config: &Config) -> Result<AuthUser, HttpResponse> {
    let header_value = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header encoding"))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Authorization header must start with Bearer"))?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| unauthorized("Invalid or expired token"))?;

    if claims.token_type != TokenType::Access {
        return Err(unauthorized("Access token required"));
    }

    let role = Role::from_id(claims.role).ok_or_else(|| unauthorized("Invalid role"))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    match authenticate(&req, config) {
        Ok(auth_user) => {
            req.extensions_mut().insert(auth_user);
            next.call(req).await
        }
        Err(resp) => Ok(req.into_response(resp.map_into_boxed_body())),
    }
}
