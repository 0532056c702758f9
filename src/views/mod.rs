//! Role view builder: one pure entry point, four role-shaped outputs.

pub mod activity;
pub mod builder;
pub mod model;
pub mod scope;

pub use activity::{Activity, ActivityKind};
pub use builder::{ViewRequest, build};
pub use model::{
    EmployeeView, EvaluationRow, HrView, ManagerView, OrgMetrics, PendingReview, ProgramBreakdown,
    RoleView, SupervisorView, TaskRow, TeamMember, TeamOverview, TeamPerformance,
    UpcomingEvent,
};
