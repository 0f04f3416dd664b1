pub mod auth;
pub mod budget;
pub mod dashboard;
pub mod ledger;
pub mod subscription;
pub mod user;

pub use auth::{AuthToken, LoginRequest};
pub use budget::{Budget, BudgetView, CreateBudgetRequest};
pub use dashboard::{
    CategoryBreakdown, DashboardGraph, GoalPair, IncomeExpensePoint, MonthlyPoint, PastReport,
    PeriodSummary, PieChartSlice, RecentExpense, SavingsGoalView,
};
pub use ledger::{
    AdditiveUpdateRequest, CreateExpenseRequest, CreateIncomeRequest, ExpenseEntry, IncomeEntry,
};
pub use subscription::{
    CreateSubscriptionRequest, Frequency, OccurrenceProjection, Subscription,
    UpdateSubscriptionRequest,
};
pub use user::{CreateUserRequest, GoalSnapshot, UpdateGoalsRequest, User, UserProfile};
