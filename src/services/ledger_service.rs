use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::aggregation;
use crate::models::dashboard::{CategoryBreakdown, RecentExpense};
use crate::models::ledger::{
    CreateExpenseRequest, CreateIncomeRequest, ExpenseEntry, IncomeEntry,
};
use crate::repositories::{
    ExpenseRepository, IncomeRepository, RepositoryError, SubscriptionRepository,
};

/// How many rows the recent-activity table shows
const RECENT_EXPENSE_LIMIT: usize = 10;

/// Ledger service errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid amount: amount must be positive")]
    InvalidAmount,

    #[error("An entry for this category already exists")]
    DuplicateCategory,

    #[error("No entry exists for this category")]
    CategoryNotFound,

    #[error("Update would drive the amount below zero")]
    NegativeBalance,

    #[error("Referenced subscription not found")]
    SubscriptionNotFound,

    #[error("Unauthorized to access this entry")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for LedgerError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => LedgerError::CategoryNotFound,
            RepositoryError::ConstraintViolation(msg) => {
                if msg.contains("below zero") {
                    LedgerError::NegativeBalance
                } else {
                    LedgerError::DuplicateCategory
                }
            }
            RepositoryError::DatabaseError(msg) => LedgerError::DatabaseError(msg),
        }
    }
}

/// Trait defining income/expense ledger operations
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Create a new income entry
    async fn create_income(
        &self,
        user_id: Uuid,
        request: CreateIncomeRequest,
    ) -> Result<IncomeEntry, LedgerError>;

    /// All income entries for a user
    async fn list_incomes(&self, user_id: Uuid) -> Result<Vec<IncomeEntry>, LedgerError>;

    /// Add a delta to the income entry for (user, category)
    async fn add_income_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<IncomeEntry, LedgerError>;

    /// Create a new expense entry, optionally attributed to a subscription
    async fn create_expense(
        &self,
        user_id: Uuid,
        request: CreateExpenseRequest,
    ) -> Result<ExpenseEntry, LedgerError>;

    /// All expense entries for a user
    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<ExpenseEntry>, LedgerError>;

    /// Add a delta to the manual expense entry for (user, category)
    async fn add_expense_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<ExpenseEntry, LedgerError>;

    /// Current-month expenses grouped by category
    async fn expense_breakdown(&self, user_id: Uuid)
        -> Result<Vec<CategoryBreakdown>, LedgerError>;

    /// Most recent expense rows for the activity table
    async fn recent_expenses(&self, user_id: Uuid) -> Result<Vec<RecentExpense>, LedgerError>;
}

/// Implementation of LedgerService
pub struct LedgerServiceImpl {
    income_repository: Arc<dyn IncomeRepository>,
    expense_repository: Arc<dyn ExpenseRepository>,
    subscription_repository: Arc<dyn SubscriptionRepository>,
}

impl LedgerServiceImpl {
    pub fn new(
        income_repository: Arc<dyn IncomeRepository>,
        expense_repository: Arc<dyn ExpenseRepository>,
        subscription_repository: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            income_repository,
            expense_repository,
            subscription_repository,
        }
    }
}

#[async_trait]
impl LedgerService for LedgerServiceImpl {
    async fn create_income(
        &self,
        user_id: Uuid,
        request: CreateIncomeRequest,
    ) -> Result<IncomeEntry, LedgerError> {
        if request.income_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let entry = IncomeEntry {
            id: Uuid::new_v4(),
            user_id,
            category: request.income_category,
            emoji: request.income_emoji,
            amount: request.income_amount,
            created_at: Utc::now(),
        };

        Ok(self.income_repository.create(entry).await?)
    }

    async fn list_incomes(&self, user_id: Uuid) -> Result<Vec<IncomeEntry>, LedgerError> {
        Ok(self.income_repository.find_by_user(user_id).await?)
    }

    async fn add_income_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<IncomeEntry, LedgerError> {
        Ok(self
            .income_repository
            .add_amount(user_id, category, delta)
            .await?)
    }

    async fn create_expense(
        &self,
        user_id: Uuid,
        request: CreateExpenseRequest,
    ) -> Result<ExpenseEntry, LedgerError> {
        if request.expense_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        // A subscription-attributed entry must reference a subscription the
        // user actually owns
        if let Some(subscription_id) = request.subscription_id {
            let subscription = self
                .subscription_repository
                .find_by_id(subscription_id)
                .await
                .map_err(|e| LedgerError::DatabaseError(e.to_string()))?
                .ok_or(LedgerError::SubscriptionNotFound)?;

            if subscription.user_id != user_id {
                return Err(LedgerError::Unauthorized);
            }
        }

        let entry = ExpenseEntry {
            id: Uuid::new_v4(),
            user_id,
            category: request.expense_category,
            emoji: request.expense_emoji,
            amount: request.expense_amount,
            subscription_id: request.subscription_id,
            created_at: Utc::now(),
        };

        Ok(self.expense_repository.create(entry).await?)
    }

    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<ExpenseEntry>, LedgerError> {
        Ok(self.expense_repository.find_by_user(user_id).await?)
    }

    async fn add_expense_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<ExpenseEntry, LedgerError> {
        Ok(self
            .expense_repository
            .add_amount(user_id, category, delta)
            .await?)
    }

    async fn expense_breakdown(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CategoryBreakdown>, LedgerError> {
        let now = Utc::now();
        let (start, end) = aggregation::month_bounds(now.year(), now.month())
            .ok_or_else(|| LedgerError::DatabaseError("Invalid clock reading".to_string()))?;

        let expenses = self
            .expense_repository
            .find_by_user_between(user_id, start, end)
            .await?;

        Ok(aggregation::breakdown_by_category(&expenses))
    }

    async fn recent_expenses(&self, user_id: Uuid) -> Result<Vec<RecentExpense>, LedgerError> {
        let expenses = self.expense_repository.find_by_user(user_id).await?;
        Ok(aggregation::recent_expenses(&expenses, RECENT_EXPENSE_LIMIT))
    }
}
