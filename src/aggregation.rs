//! Summary math behind every dashboard screen.
//!
//! Pure functions over ledger rows already fetched for one user and one
//! period. The dashboard service composes these with repository reads; no
//! I/O happens here.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::budget::Budget;
use crate::models::dashboard::{
    CategoryBreakdown, DashboardGraph, GoalPair, IncomeExpensePoint, MonthlyPoint, PeriodSummary,
    PieChartSlice, RecentExpense, SavingsGoalView,
};
use crate::models::ledger::{ExpenseEntry, IncomeEntry};
use crate::models::subscription::{Frequency, OccurrenceProjection, Subscription};

/// Fallback monthly budget target when the user has not configured one
pub fn default_budget_goal() -> Decimal {
    Decimal::from(50_000_i64)
}

/// Percentage of `goal` reached by `current`, rounded half away from zero.
/// A zero goal reads as 0% regardless of `current`. Unclamped: values over
/// 100 signal over-goal states.
pub fn calculate_percentage(current: Decimal, goal: Decimal) -> i64 {
    if goal.is_zero() {
        return 0;
    }
    (current / goal * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Same as [`calculate_percentage`] but capped at 100, for progress-bar
/// widths
pub fn calculate_percentage_clamped(current: Decimal, goal: Decimal) -> i64 {
    calculate_percentage(current, goal).min(100)
}

fn sum_incomes(incomes: &[IncomeEntry]) -> Decimal {
    incomes.iter().map(|entry| entry.amount).sum()
}

fn sum_expenses(expenses: &[ExpenseEntry]) -> Decimal {
    expenses.iter().map(|entry| entry.amount).sum()
}

/// Build the four headline figures for a period.
///
/// The expense goal is the total allocated budget (the overview card reads
/// "% of total budget"); income and savings goals come from the user's
/// stored targets and read as 0 when unset.
pub fn summarize_period(
    incomes: &[IncomeEntry],
    expenses: &[ExpenseEntry],
    budgets: &[Budget],
    income_goal: Option<Decimal>,
    savings_goal: Option<Decimal>,
) -> PeriodSummary {
    let income_total = sum_incomes(incomes);
    let expense_total = sum_expenses(expenses);
    let budget_total: Decimal = budgets.iter().map(|b| b.total_amount).sum();

    PeriodSummary {
        expenses: GoalPair {
            current: expense_total,
            goal: budget_total,
        },
        budget: GoalPair {
            current: budget_total,
            goal: default_budget_goal(),
        },
        income: GoalPair {
            current: income_total,
            goal: income_goal.unwrap_or(Decimal::ZERO),
        },
        savings: GoalPair {
            current: income_total - expense_total,
            goal: savings_goal.unwrap_or(Decimal::ZERO),
        },
    }
}

/// Group expenses by exact category string and sum each group.
///
/// Matching is case-sensitive with no canonicalization, so "Food" and
/// "food" are distinct groups. Categories with no entries are omitted.
/// The subscription-attributed portion of each group is reported
/// separately; it is a subset of `total`, never an addition to it.
pub fn breakdown_by_category(expenses: &[ExpenseEntry]) -> Vec<CategoryBreakdown> {
    let mut groups: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();

    for entry in expenses {
        let (total, from_subscriptions) = groups.entry(entry.category.as_str()).or_default();
        *total += entry.amount;
        if entry.subscription_id.is_some() {
            *from_subscriptions += entry.amount;
        }
    }

    let mut breakdown: Vec<CategoryBreakdown> = groups
        .into_iter()
        .map(|(category, (total, subscription_total))| CategoryBreakdown {
            category: category.to_string(),
            total,
            subscription_total,
        })
        .collect();

    // Largest spend first; BTreeMap iteration keeps ties alphabetical
    breakdown.sort_by(|a, b| b.total.cmp(&a.total));
    breakdown
}

/// Three-letter label for a 1-based month number
pub fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}

/// Per-month income and expense totals, in chronological order regardless
/// of the order rows were written
pub fn build_time_series(incomes: &[IncomeEntry], expenses: &[ExpenseEntry]) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();

    for entry in incomes {
        let key = (entry.created_at.year(), entry.created_at.month());
        months.entry(key).or_default().0 += entry.amount;
    }
    for entry in expenses {
        let key = (entry.created_at.year(), entry.created_at.month());
        months.entry(key).or_default().1 += entry.amount;
    }

    months
        .into_iter()
        .map(|((_, month), (income, expense))| MonthlyPoint {
            name: month_label(month).to_string(),
            income,
            expenses: expense,
        })
        .collect()
}

/// The bar-chart payload of the dashboard graphs endpoint
pub fn income_expense_graph(summary: &PeriodSummary) -> Vec<IncomeExpensePoint> {
    vec![
        IncomeExpensePoint {
            label: "Income".to_string(),
            amount: summary.income.current,
            fill: "#0088FE".to_string(),
        },
        IncomeExpensePoint {
            label: "Expense".to_string(),
            amount: summary.expenses.current,
            fill: "#FF8042".to_string(),
        },
        IncomeExpensePoint {
            label: "Savings".to_string(),
            amount: summary.savings.current,
            fill: "#00C49F".to_string(),
        },
    ]
}

/// Pie-chart slices from a category breakdown
pub fn pie_chart(breakdown: &[CategoryBreakdown]) -> Vec<PieChartSlice> {
    breakdown
        .iter()
        .map(|group| PieChartSlice {
            name: group.category.clone(),
            value: group.total,
        })
        .collect()
}

/// Most recent expense rows first, capped at `limit`
pub fn recent_expenses(expenses: &[ExpenseEntry], limit: usize) -> Vec<RecentExpense> {
    let mut rows: Vec<&ExpenseEntry> = expenses.iter().collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    rows.into_iter()
        .take(limit)
        .map(|entry| RecentExpense {
            category: entry.category.clone(),
            amount: entry.amount,
            date: entry.created_at,
        })
        .collect()
}

/// Savings progress gauge. `remaining` floors at zero once the goal is met;
/// the percentage is clamped for direct use as a gauge width.
pub fn savings_goal_view(saved: Decimal, goal: Decimal) -> SavingsGoalView {
    let remaining = (goal - saved).max(Decimal::ZERO);
    SavingsGoalView {
        saved,
        remaining,
        goal,
        percentage: calculate_percentage_clamped(saved, goal),
    }
}

/// Assemble the full graphs payload for one period
pub fn dashboard_graphs(
    summary: &PeriodSummary,
    breakdown: &[CategoryBreakdown],
) -> Vec<DashboardGraph> {
    vec![
        DashboardGraph::IncomeExpenseAnalysis(income_expense_graph(summary)),
        DashboardGraph::PieChart(pie_chart(breakdown)),
    ]
}

/// 1-based month number for an English month name, as sent by the
/// past-reports picker
pub fn parse_month_name(name: &str) -> Option<u32> {
    let month = match name {
        "January" => 1,
        "February" => 2,
        "March" => 3,
        "April" => 4,
        "May" => 5,
        "June" => 6,
        "July" => 7,
        "August" => 8,
        "September" => 9,
        "October" => 10,
        "November" => 11,
        "December" => 12,
        _ => return None,
    };
    Some(month)
}

/// Half-open UTC interval [start, end) covering one calendar month.
/// None for out-of-range month numbers.
pub fn month_bounds(
    year: i32,
    month: u32,
) -> Option<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?;
    Some((
        start.and_hms_opt(0, 0, 0)?.and_utc(),
        end.and_hms_opt(0, 0, 0)?.and_utc(),
    ))
}

fn next_due_after(frequency: Frequency, due: NaiveDate) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => due.checked_add_days(Days::new(1)),
        Frequency::Weekly => due.checked_add_days(Days::new(7)),
        Frequency::Monthly => due.checked_add_months(Months::new(1)),
        Frequency::Yearly => due.checked_add_months(Months::new(12)),
    }
}

/// Walk the occurrence schedule of a subscription up to `as_of`.
///
/// Occurrences fall on the start date and every cadence step after it. The
/// schedule terminates past `end_date` or once `repeat_count` occurrences
/// have elapsed, whichever bound is hit first; `next_due_date` is None
/// after termination. Pure projection: nothing is generated or persisted.
pub fn project_occurrences(subscription: &Subscription, as_of: NaiveDate) -> OccurrenceProjection {
    let mut occurrences: u32 = 0;
    let mut due = subscription.start_date;

    loop {
        if let Some(end) = subscription.end_date {
            if due > end {
                return OccurrenceProjection {
                    occurrences,
                    next_due_date: None,
                };
            }
        }
        if let Some(count) = subscription.repeat_count {
            if occurrences >= count as u32 {
                return OccurrenceProjection {
                    occurrences,
                    next_due_date: None,
                };
            }
        }
        if due > as_of {
            return OccurrenceProjection {
                occurrences,
                next_due_date: Some(due),
            };
        }

        occurrences += 1;
        due = match next_due_after(subscription.frequency, due) {
            Some(next) => next,
            // Calendar overflow: treat the schedule as exhausted
            None => {
                return OccurrenceProjection {
                    occurrences,
                    next_due_date: None,
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn income(category: &str, amount: &str, year: i32, month: u32, day: u32) -> IncomeEntry {
        IncomeEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category: category.to_string(),
            emoji: "💰".to_string(),
            amount: dec(amount),
            created_at: Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
        }
    }

    fn expense(category: &str, amount: &str, year: i32, month: u32, day: u32) -> ExpenseEntry {
        ExpenseEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category: category.to_string(),
            emoji: "💸".to_string(),
            amount: dec(amount),
            subscription_id: None,
            created_at: Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
        }
    }

    fn subscription_expense(category: &str, amount: &str) -> ExpenseEntry {
        ExpenseEntry {
            subscription_id: Some(Uuid::new_v4()),
            ..expense(category, amount, 2025, 1, 15)
        }
    }

    fn budget(category: &str, total: &str) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category: category.to_string(),
            emoji: "💰".to_string(),
            total_amount: dec(total),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn netflix(frequency: Frequency) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Netflix".to_string(),
            amount: dec("649"),
            category: "Entertainment".to_string(),
            frequency,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            repeat_count: None,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_percentage_zero_goal_is_zero() {
        assert_eq!(calculate_percentage(dec("1800"), Decimal::ZERO), 0);
        assert_eq!(calculate_percentage(Decimal::ZERO, Decimal::ZERO), 0);
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(calculate_percentage(dec("1800"), dec("2000")), 90);
        assert_eq!(calculate_percentage(dec("1"), dec("3")), 33);
        assert_eq!(calculate_percentage(dec("2"), dec("3")), 67);
        // Half rounds away from zero
        assert_eq!(calculate_percentage(dec("1"), dec("200")), 1);
    }

    #[test]
    fn test_percentage_unclamped_exceeds_hundred() {
        assert_eq!(calculate_percentage(dec("300"), dec("200")), 150);
    }

    #[test]
    fn test_percentage_clamped_caps_at_hundred() {
        assert_eq!(calculate_percentage_clamped(dec("300"), dec("200")), 100);
        assert_eq!(calculate_percentage_clamped(dec("100"), dec("200")), 50);
        assert_eq!(calculate_percentage_clamped(dec("50"), Decimal::ZERO), 0);
    }

    #[test]
    fn test_summarize_period_end_to_end() {
        let incomes = vec![income("Salary", "3000", 2025, 1, 5)];
        let expenses = vec![expense("Food", "450", 2025, 1, 10)];
        let budgets = vec![budget("Food", "500")];

        let summary = summarize_period(&incomes, &expenses, &budgets, None, None);

        assert_eq!(summary.income.current, dec("3000"));
        assert_eq!(summary.expenses.current, dec("450"));
        assert_eq!(summary.budget.current, dec("500"));
        assert_eq!(summary.savings.current, dec("2550"));
        // Expense goal is the allocated budget
        assert_eq!(summary.expenses.goal, dec("500"));
        // Unset user goals read as zero
        assert_eq!(summary.income.goal, Decimal::ZERO);
        assert_eq!(summary.savings.goal, Decimal::ZERO);
    }

    #[test]
    fn test_summarize_period_uses_stored_goals() {
        let summary = summarize_period(&[], &[], &[], Some(dec("50000")), Some(dec("20000")));
        assert_eq!(summary.income.goal, dec("50000"));
        assert_eq!(summary.savings.goal, dec("20000"));
        assert_eq!(summary.savings.current, Decimal::ZERO);
    }

    #[test]
    fn test_breakdown_partitions_period_total() {
        let expenses = vec![
            expense("Food", "20", 2025, 1, 1),
            expense("Food", "30", 2025, 1, 2),
            expense("Transport", "15", 2025, 1, 3),
        ];

        let breakdown = breakdown_by_category(&expenses);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Food");
        assert_eq!(breakdown[0].total, dec("50"));
        assert_eq!(breakdown[1].category, "Transport");
        assert_eq!(breakdown[1].total, dec("15"));

        // Partition sums back to the unpartitioned total
        let partitioned: Decimal = breakdown.iter().map(|g| g.total).sum();
        let unpartitioned: Decimal = expenses.iter().map(|e| e.amount).sum();
        assert_eq!(partitioned, unpartitioned);
    }

    #[test]
    fn test_breakdown_is_case_sensitive() {
        let expenses = vec![
            expense("Food", "20", 2025, 1, 1),
            expense("food", "30", 2025, 1, 2),
        ];

        let breakdown = breakdown_by_category(&expenses);
        assert_eq!(breakdown.len(), 2);
    }

    #[test]
    fn test_breakdown_omits_empty_and_reports_subscription_subtotal() {
        let mut expenses = vec![
            expense("Entertainment", "60", 2025, 1, 1),
            subscription_expense("Entertainment", "40"),
        ];

        let breakdown = breakdown_by_category(&expenses);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].total, dec("100"));
        assert_eq!(breakdown[0].subscription_total, dec("40"));
        assert!(breakdown[0].subscription_total <= breakdown[0].total);

        // No zero-valued groups appear for categories without entries
        expenses.clear();
        assert!(breakdown_by_category(&expenses).is_empty());
    }

    #[test]
    fn test_time_series_is_chronological_regardless_of_write_order() {
        let incomes = vec![
            income("Salary", "3000", 2025, 3, 1),
            income("Salary2", "2800", 2025, 1, 1),
            income("Salary3", "2900", 2025, 2, 1),
        ];
        let expenses = vec![
            expense("Food", "400", 2025, 2, 10),
            expense("Rent", "1200", 2025, 1, 5),
        ];

        let series = build_time_series(&incomes, &expenses);

        let labels: Vec<&str> = series.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(series[0].income, dec("2800"));
        assert_eq!(series[0].expenses, dec("1200"));
        assert_eq!(series[2].expenses, Decimal::ZERO);
    }

    #[test]
    fn test_dashboard_graphs_are_tagged() {
        let summary = summarize_period(&[], &[], &[], None, None);
        let graphs = dashboard_graphs(&summary, &[]);

        let json = serde_json::to_value(&graphs).unwrap();
        assert_eq!(json[0]["type"], "incomeExpenseAnalysis");
        assert_eq!(json[1]["type"], "Piechart_data");
        assert_eq!(json[0]["data"][0]["label"], "Income");
    }

    #[test]
    fn test_recent_expenses_newest_first() {
        let expenses = vec![
            expense("Food", "10", 2025, 1, 1),
            expense("Transport", "20", 2025, 1, 3),
            expense("Shopping", "30", 2025, 1, 2),
        ];

        let recent = recent_expenses(&expenses, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].category, "Transport");
        assert_eq!(recent[1].category, "Shopping");
    }

    #[test]
    fn test_savings_goal_view_clamps() {
        let view = savings_goal_view(dec("7500"), dec("10000"));
        assert_eq!(view.remaining, dec("2500"));
        assert_eq!(view.percentage, 75);

        let over = savings_goal_view(dec("12000"), dec("10000"));
        assert_eq!(over.remaining, Decimal::ZERO);
        assert_eq!(over.percentage, 100);
    }

    #[test]
    fn test_parse_month_name() {
        assert_eq!(parse_month_name("January"), Some(1));
        assert_eq!(parse_month_name("December"), Some(12));
        assert_eq!(parse_month_name("january"), None);
        assert_eq!(parse_month_name("Januray"), None);
    }

    #[test]
    fn test_month_bounds_are_half_open() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert!(month_bounds(2025, 13).is_none());
    }

    #[test]
    fn test_projection_counts_monthly_occurrences() {
        let mut sub = netflix(Frequency::Monthly);
        sub.repeat_count = Some(12);

        let projection =
            project_occurrences(&sub, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(projection.occurrences, 3); // Jan 1, Feb 1, Mar 1
        assert_eq!(
            projection.next_due_date,
            Some(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
        );
    }

    #[test]
    fn test_projection_terminates_at_repeat_count() {
        let mut sub = netflix(Frequency::Weekly);
        sub.repeat_count = Some(2);

        let projection =
            project_occurrences(&sub, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(projection.occurrences, 2);
        assert_eq!(projection.next_due_date, None);
    }

    #[test]
    fn test_projection_terminates_past_end_date() {
        let mut sub = netflix(Frequency::Daily);
        sub.end_date = Some(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());

        let projection =
            project_occurrences(&sub, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(projection.occurrences, 3); // Jan 1, 2, 3
        assert_eq!(projection.next_due_date, None);
    }

    #[test]
    fn test_projection_before_start() {
        let sub = netflix(Frequency::Monthly);

        let projection =
            project_occurrences(&sub, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(projection.occurrences, 0);
        assert_eq!(projection.next_due_date, Some(sub.start_date));
    }

    #[test]
    fn test_projection_earlier_bound_wins() {
        // Both bounds supplied: repeat_count of 2 runs out before the end date
        let mut sub = netflix(Frequency::Monthly);
        sub.repeat_count = Some(2);
        sub.end_date = Some(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        let projection =
            project_occurrences(&sub, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(projection.occurrences, 2);
        assert_eq!(projection.next_due_date, None);
    }
}
