use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::aggregation;
use crate::models::budget::{Budget, BudgetView, CreateBudgetRequest};
use crate::repositories::{BudgetRepository, ExpenseRepository, RepositoryError};

/// Budget service errors
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("Invalid amount: amount must be positive")]
    InvalidAmount,

    #[error("A budget for this category already exists")]
    DuplicateCategory,

    #[error("No budget exists for this category")]
    CategoryNotFound,

    #[error("Update would drive the amount below zero")]
    NegativeBalance,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for BudgetError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => BudgetError::CategoryNotFound,
            RepositoryError::ConstraintViolation(msg) => {
                if msg.contains("below zero") {
                    BudgetError::NegativeBalance
                } else {
                    BudgetError::DuplicateCategory
                }
            }
            RepositoryError::DatabaseError(msg) => BudgetError::DatabaseError(msg),
        }
    }
}

/// Trait defining budget service operations
#[async_trait]
pub trait BudgetService: Send + Sync {
    /// Create a new budget allocation
    async fn create_budget(
        &self,
        user_id: Uuid,
        request: CreateBudgetRequest,
    ) -> Result<Budget, BudgetError>;

    /// Budgets with derived spend figures for the current month
    async fn list_budgets(&self, user_id: Uuid) -> Result<Vec<BudgetView>, BudgetError>;

    /// Add a delta to the allocation for (user, category)
    async fn add_budget_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<Budget, BudgetError>;
}

/// Implementation of BudgetService
pub struct BudgetServiceImpl {
    budget_repository: Arc<dyn BudgetRepository>,
    expense_repository: Arc<dyn ExpenseRepository>,
}

impl BudgetServiceImpl {
    pub fn new(
        budget_repository: Arc<dyn BudgetRepository>,
        expense_repository: Arc<dyn ExpenseRepository>,
    ) -> Self {
        Self {
            budget_repository,
            expense_repository,
        }
    }
}

#[async_trait]
impl BudgetService for BudgetServiceImpl {
    async fn create_budget(
        &self,
        user_id: Uuid,
        request: CreateBudgetRequest,
    ) -> Result<Budget, BudgetError> {
        if request.budget_amount <= Decimal::ZERO {
            return Err(BudgetError::InvalidAmount);
        }

        let budget = Budget {
            id: Uuid::new_v4(),
            user_id,
            category: request.budget_category,
            emoji: request.budget_emoji,
            total_amount: request.budget_amount,
            created_at: Utc::now(),
        };

        Ok(self.budget_repository.create(budget).await?)
    }

    async fn list_budgets(&self, user_id: Uuid) -> Result<Vec<BudgetView>, BudgetError> {
        let budgets = self.budget_repository.find_by_user(user_id).await?;

        let now = Utc::now();
        let (start, end) = aggregation::month_bounds(now.year(), now.month())
            .ok_or_else(|| BudgetError::DatabaseError("Invalid clock reading".to_string()))?;
        let expenses = self
            .expense_repository
            .find_by_user_between(user_id, start, end)
            .await?;
        let breakdown = aggregation::breakdown_by_category(&expenses);

        let views = budgets
            .into_iter()
            .map(|budget| {
                // Exact category match; an unmatched budget has spent 0
                let spent = breakdown
                    .iter()
                    .find(|group| group.category == budget.category)
                    .map(|group| group.total)
                    .unwrap_or(Decimal::ZERO);

                BudgetView {
                    id: budget.id,
                    category: budget.category,
                    emoji: budget.emoji,
                    total_amount: budget.total_amount,
                    spent,
                    remaining: budget.total_amount - spent,
                    percent_used: aggregation::calculate_percentage(spent, budget.total_amount),
                }
            })
            .collect();

        Ok(views)
    }

    async fn add_budget_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<Budget, BudgetError> {
        Ok(self
            .budget_repository
            .add_amount(user_id, category, delta)
            .await?)
    }
}
