use crate::api::attendance::{CalendarResponse, ClockAction, TimeclockSnapshot};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::expense::{
    CreateExpense, ExpenseQuery, ExpenseResponse, PaginatedExpenseResponse,
};
use crate::api::holiday::CreateHoliday;
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse};
use crate::api::report::{SummaryReport, SummaryRow};
use crate::api::shift::{AssignShift, CreateShift, UpdateShift};
use crate::core::summary::{DayDetail, DayKind, SummaryCounts};
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::model::holiday::Holiday;
use crate::model::shift::Shift;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracking API",
        version = "1.0.0",
        description = r#"
## HR Attendance Tracking

Employee clock-in/clock-out with geolocation, break timers, shift assignment,
leave requests, expense claims, and monthly/yearly attendance summaries.

### Key Features
- **Attendance** — daily clock-in/out, break start/end, timeclock snapshot for
  live display timers, per-day calendar detail
- **Shifts** — working-hour templates with a single default and per-employee
  assignment; lateness is judged against the assigned shift start
- **Leave** — apply, approve/reject, entitlement balances per category
- **Expenses** — submit and approve expense claims
- **Holidays** — per-year public holiday configuration
- **Reports** — per-employee monthly/yearly summary rows plus a company total,
  ready for spreadsheet/PDF export

### Security
JWT Bearer authentication; HR/Admin roles guard the sensitive operations.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::break_start,
        crate::api::attendance::break_end,
        crate::api::attendance::snapshot,
        crate::api::attendance::calendar,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::shift::create_shift,
        crate::api::shift::list_shifts,
        crate::api::shift::update_shift,
        crate::api::shift::delete_shift,
        crate::api::shift::set_default_shift,
        crate::api::shift::assign_shift,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::expense::create_expense,
        crate::api::expense::list_expenses,
        crate::api::expense::get_expense,
        crate::api::expense::approve_expense,
        crate::api::expense::reject_expense,

        crate::api::report::monthly_report,
        crate::api::report::yearly_report
    ),
    components(
        schemas(
            ClockAction,
            TimeclockSnapshot,
            CalendarResponse,
            DayDetail,
            DayKind,
            Attendance,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            CreateLeave,
            CreateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            CreateShift,
            UpdateShift,
            AssignShift,
            Shift,
            CreateHoliday,
            Holiday,
            CreateExpense,
            ExpenseQuery,
            ExpenseResponse,
            PaginatedExpenseResponse,
            SummaryCounts,
            SummaryRow,
            SummaryReport
        )
    ),
    tags(
        (name = "Attendance", description = "Clock, break and calendar APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Shift", description = "Shift management APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
        (name = "Expense", description = "Expense claim APIs"),
        (name = "Report", description = "Attendance summary report APIs"),
    )
)]
pub struct ApiDoc;
