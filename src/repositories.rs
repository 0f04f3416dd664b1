pub mod budget_repository;
pub mod expense_repository;
pub mod income_repository;
pub mod subscription_repository;
pub mod user_repository;

/// Repository errors for database operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Resource not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub use budget_repository::{BudgetRepository, PostgresBudgetRepository};
pub use expense_repository::{ExpenseRepository, PostgresExpenseRepository};
pub use income_repository::{IncomeRepository, PostgresIncomeRepository};
pub use subscription_repository::{PostgresSubscriptionRepository, SubscriptionRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};
