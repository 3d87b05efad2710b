use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "department_id": 10,
        "shift_id": 1,
        "hire_date": "2024-01-01",
        "status": "active",
        "annual_leave_days": 20,
        "sick_leave_days": 10,
        "casual_leave_days": 5
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = 10, nullable = true)]
    pub department_id: Option<u64>,

    /// Assigned shift; the default shift applies when absent.
    #[schema(example = 1, nullable = true)]
    pub shift_id: Option<u64>,

    #[schema(
        example = "2024-01-01",
        value_type = String,
        format = "date"
    )]
    pub hire_date: NaiveDate,

    #[schema(example = "active")]
    pub status: String,

    /// Leave entitlements in days, per category.
    #[schema(example = 20)]
    pub annual_leave_days: u32,
    #[schema(example = 10)]
    pub sick_leave_days: u32,
    #[schema(example = 5)]
    pub casual_leave_days: u32,
}
