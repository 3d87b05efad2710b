use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Offset from UTC, in minutes. All status comparisons (late threshold,
    /// "today") happen in this single zone.
    pub tz_offset_minutes: i32,
    /// Fallback late threshold for employees without an assigned shift.
    pub late_threshold: NaiveTime,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            tz_offset_minutes: env::var("TZ_OFFSET_MINUTES")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap(),
            late_threshold: env::var("LATE_THRESHOLD")
                .ok()
                .and_then(|raw| crate::core::timeclock::parse_time_lenient(&raw, "LATE_THRESHOLD"))
                .unwrap_or_else(|| NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
        }
    }

    /// Current wall-clock time in the configured zone.
    pub fn now_local(&self) -> NaiveDateTime {
        Utc::now().naive_utc() + Duration::minutes(self.tz_offset_minutes as i64)
    }
}
