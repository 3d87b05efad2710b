use crate::{
    api::{attendance, employee, expense, holiday, leave_request, report, shift},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(handlers::protected)
            .service(
                web::scope("/user").service(
                    web::resource("/{id}/role").route(web::put().to(handlers::set_user_role)),
                ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out").route(web::post().to(attendance::clock_out)),
                    )
                    .service(
                        web::resource("/break/start")
                            .route(web::post().to(attendance::break_start)),
                    )
                    .service(
                        web::resource("/break/end").route(web::post().to(attendance::break_end)),
                    )
                    .service(
                        web::resource("/snapshot").route(web::get().to(attendance::snapshot)),
                    )
                    .service(
                        web::resource("/calendar").route(web::get().to(attendance::calendar)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/employee")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/shift")
                    .service(
                        web::resource("")
                            .route(web::post().to(shift::create_shift))
                            .route(web::get().to(shift::list_shifts)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(shift::update_shift))
                            .route(web::delete().to(shift::delete_shift)),
                    )
                    .service(
                        web::resource("/{id}/default")
                            .route(web::put().to(shift::set_default_shift)),
                    )
                    .service(
                        web::resource("/{id}/assign").route(web::put().to(shift::assign_shift)),
                    ),
            )
            .service(
                web::scope("/holiday")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::create_holiday)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(holiday::delete_holiday)),
                    ),
            )
            .service(
                web::scope("/expense")
                    .service(
                        web::resource("")
                            .route(web::post().to(expense::create_expense))
                            .route(web::get().to(expense::list_expenses)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(expense::get_expense)))
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(expense::approve_expense)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(expense::reject_expense)),
                    ),
            )
            .service(
                web::scope("/report")
                    .service(
                        web::resource("/monthly").route(web::get().to(report::monthly_report)),
                    )
                    .service(web::resource("/yearly").route(web::get().to(report::yearly_report))),
            ),
    );
}
