use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A current value paired with its target
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct GoalPair {
    pub current: Decimal,
    pub goal: Decimal,
}

/// The four headline figures for one reporting period, as rendered by the
/// dashboard overview cards
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PeriodSummary {
    pub expenses: GoalPair,
    pub budget: GoalPair,
    pub income: GoalPair,
    pub savings: GoalPair,
}

/// One bar of the income/expense/savings chart
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IncomeExpensePoint {
    pub label: String,
    pub amount: Decimal,
    pub fill: String,
}

/// One slice of the expense-categories pie chart
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PieChartSlice {
    pub name: String,
    pub value: Decimal,
}

/// Graph payloads multiplexed into one response array. The `type` field is
/// the discriminator the dashboard switches on.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum DashboardGraph {
    #[serde(rename = "incomeExpenseAnalysis")]
    IncomeExpenseAnalysis(Vec<IncomeExpensePoint>),
    #[serde(rename = "Piechart_data")]
    PieChart(Vec<PieChartSlice>),
}

/// Per-category expense totals. `subscription_total` is the portion of
/// `total` attributed to subscription-recorded entries, never exceeding it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total: Decimal,
    pub subscription_total: Decimal,
}

/// One month of the income-vs-expenses trend, chronological order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MonthlyPoint {
    /// Three-letter month label ("Jan".."Dec")
    pub name: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

/// Row of the recent-activity table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecentExpense {
    pub category: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
}

/// Savings progress toward the user's goal. `percentage` is clamped to 100
/// for direct use as a gauge width.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SavingsGoalView {
    pub saved: Decimal,
    pub remaining: Decimal,
    pub goal: Decimal,
    pub percentage: i64,
}

/// Historical report for an explicit (month, year)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PastReport {
    #[serde(rename = "financialData")]
    pub financial_data: PeriodSummary,
    pub graph_data: Vec<DashboardGraph>,
}
