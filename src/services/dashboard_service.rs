use async_trait::async_trait;
use chrono::{DateTime, Datelike, Months, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::aggregation;
use crate::models::dashboard::{
    DashboardGraph, MonthlyPoint, PastReport, PeriodSummary, SavingsGoalView,
};
use crate::repositories::{
    BudgetRepository, ExpenseRepository, IncomeRepository, RepositoryError, UserRepository,
};

/// How many months the trends endpoint looks back, current month included
const TREND_WINDOW_MONTHS: u32 = 6;

/// Dashboard service errors
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for DashboardError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => DashboardError::UserNotFound,
            RepositoryError::DatabaseError(msg) => DashboardError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => DashboardError::DatabaseError(msg),
        }
    }
}

/// Trait defining the dashboard aggregation operations
#[async_trait]
pub trait DashboardService: Send + Sync {
    /// Headline figures for the current month
    async fn financial_data(&self, user_id: Uuid) -> Result<PeriodSummary, DashboardError>;

    /// Chart payloads for the current month
    async fn graphs(&self, user_id: Uuid) -> Result<Vec<DashboardGraph>, DashboardError>;

    /// Historical report for an explicit English month name and year
    async fn past_report(
        &self,
        user_id: Uuid,
        month_name: &str,
        year: i32,
    ) -> Result<PastReport, DashboardError>;

    /// Per-month income/expense totals over the trailing window
    async fn trends(&self, user_id: Uuid) -> Result<Vec<MonthlyPoint>, DashboardError>;

    /// Savings progress toward the user's goal for the current month
    async fn savings_goal(&self, user_id: Uuid) -> Result<SavingsGoalView, DashboardError>;
}

/// Implementation of DashboardService
pub struct DashboardServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    income_repository: Arc<dyn IncomeRepository>,
    expense_repository: Arc<dyn ExpenseRepository>,
    budget_repository: Arc<dyn BudgetRepository>,
}

impl DashboardServiceImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        income_repository: Arc<dyn IncomeRepository>,
        expense_repository: Arc<dyn ExpenseRepository>,
        budget_repository: Arc<dyn BudgetRepository>,
    ) -> Self {
        Self {
            user_repository,
            income_repository,
            expense_repository,
            budget_repository,
        }
    }

    /// Income/savings goals in force for a period. The current month reads
    /// the live user goals; a past month reads the snapshot taken while it
    /// was live, falling back to the live goals when no snapshot exists.
    async fn goals_for_period(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<(Option<Decimal>, Option<Decimal>), DashboardError> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DashboardError::UserNotFound)?;

        let now = Utc::now();
        if (year, month) != (now.year(), now.month()) {
            if let Some(snapshot) = self
                .user_repository
                .find_goal_snapshot(user_id, year, month)
                .await?
            {
                return Ok((snapshot.income_goal, snapshot.savings_goal));
            }
        }

        Ok((user.income_goal, user.savings_goal))
    }

    /// Build the summary for one calendar month
    async fn summarize_month(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<PeriodSummary, DashboardError> {
        let (start, end) = aggregation::month_bounds(year, month)
            .ok_or_else(|| DashboardError::InvalidPeriod(format!("{}-{}", year, month)))?;

        let incomes = self
            .income_repository
            .find_by_user_between(user_id, start, end)
            .await?;
        let expenses = self
            .expense_repository
            .find_by_user_between(user_id, start, end)
            .await?;
        let budgets = self.budget_repository.find_by_user(user_id).await?;
        let (income_goal, savings_goal) = self.goals_for_period(user_id, year, month).await?;

        Ok(aggregation::summarize_period(
            &incomes,
            &expenses,
            &budgets,
            income_goal,
            savings_goal,
        ))
    }

    /// Build the tagged graph payloads for one calendar month
    async fn graphs_for_month(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<DashboardGraph>, DashboardError> {
        let summary = self.summarize_month(user_id, year, month).await?;

        let (start, end) = aggregation::month_bounds(year, month)
            .ok_or_else(|| DashboardError::InvalidPeriod(format!("{}-{}", year, month)))?;
        let expenses = self
            .expense_repository
            .find_by_user_between(user_id, start, end)
            .await?;
        let breakdown = aggregation::breakdown_by_category(&expenses);

        Ok(aggregation::dashboard_graphs(&summary, &breakdown))
    }
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    async fn financial_data(&self, user_id: Uuid) -> Result<PeriodSummary, DashboardError> {
        let now = Utc::now();
        self.summarize_month(user_id, now.year(), now.month()).await
    }

    async fn graphs(&self, user_id: Uuid) -> Result<Vec<DashboardGraph>, DashboardError> {
        let now = Utc::now();
        self.graphs_for_month(user_id, now.year(), now.month())
            .await
    }

    async fn past_report(
        &self,
        user_id: Uuid,
        month_name: &str,
        year: i32,
    ) -> Result<PastReport, DashboardError> {
        let month = aggregation::parse_month_name(month_name)
            .ok_or_else(|| DashboardError::InvalidPeriod(month_name.to_string()))?;

        let financial_data = self.summarize_month(user_id, year, month).await?;
        let graph_data = self.graphs_for_month(user_id, year, month).await?;

        Ok(PastReport {
            financial_data,
            graph_data,
        })
    }

    async fn trends(&self, user_id: Uuid) -> Result<Vec<MonthlyPoint>, DashboardError> {
        let now = Utc::now();
        let (_, end) = aggregation::month_bounds(now.year(), now.month())
            .ok_or_else(|| DashboardError::DatabaseError("Invalid clock reading".to_string()))?;
        let start: DateTime<Utc> = end
            .checked_sub_months(Months::new(TREND_WINDOW_MONTHS))
            .ok_or_else(|| DashboardError::DatabaseError("Invalid clock reading".to_string()))?;

        let incomes = self
            .income_repository
            .find_by_user_between(user_id, start, end)
            .await?;
        let expenses = self
            .expense_repository
            .find_by_user_between(user_id, start, end)
            .await?;

        Ok(aggregation::build_time_series(&incomes, &expenses))
    }

    async fn savings_goal(&self, user_id: Uuid) -> Result<SavingsGoalView, DashboardError> {
        let now = Utc::now();
        let summary = self.summarize_month(user_id, now.year(), now.month()).await?;

        Ok(aggregation::savings_goal_view(
            summary.savings.current,
            summary.savings.goal,
        ))
    }
}
