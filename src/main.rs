use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use spendtrail_backend::handlers::auth_handlers::{
    log_in_handler, profile_handler, sign_up_handler, update_goals_handler,
};
use spendtrail_backend::handlers::budget_handlers::{
    create_budget_handler, list_budgets_handler, update_budget_handler,
};
use spendtrail_backend::handlers::dashboard_handlers::{
    financial_data_handler, graphs_handler, past_report_handler, savings_goal_handler,
    trends_handler,
};
use spendtrail_backend::handlers::ledger_handlers::{
    create_expense_handler, create_income_handler, expense_breakdown_handler,
    list_expenses_handler, list_incomes_handler, recent_expenses_handler, update_expense_handler,
    update_income_handler,
};
use spendtrail_backend::handlers::subscription_handlers::{
    create_subscription_handler, list_subscriptions_handler, subscription_projection_handler,
    update_subscription_handler,
};
use spendtrail_backend::handlers::ErrorResponse;
use spendtrail_backend::middleware::auth_middleware::auth_middleware;
use spendtrail_backend::models::{
    AdditiveUpdateRequest, AuthToken, Budget, BudgetView, CategoryBreakdown, CreateBudgetRequest,
    CreateExpenseRequest, CreateIncomeRequest, CreateSubscriptionRequest, CreateUserRequest,
    DashboardGraph, ExpenseEntry, Frequency, GoalPair, IncomeEntry, IncomeExpensePoint,
    LoginRequest, MonthlyPoint, OccurrenceProjection, PastReport, PeriodSummary, PieChartSlice,
    RecentExpense, SavingsGoalView, Subscription, UpdateGoalsRequest, UpdateSubscriptionRequest,
    User, UserProfile,
};
use spendtrail_backend::repositories::{
    PostgresBudgetRepository, PostgresExpenseRepository, PostgresIncomeRepository,
    PostgresSubscriptionRepository, PostgresUserRepository,
};
use spendtrail_backend::services::auth_service::{AuthService, AuthServiceImpl};
use spendtrail_backend::services::budget_service::{BudgetService, BudgetServiceImpl};
use spendtrail_backend::services::dashboard_service::{DashboardService, DashboardServiceImpl};
use spendtrail_backend::services::ledger_service::{LedgerService, LedgerServiceImpl};
use spendtrail_backend::services::subscription_service::{
    SubscriptionService, SubscriptionServiceImpl,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        spendtrail_backend::handlers::auth_handlers::sign_up_handler,
        spendtrail_backend::handlers::auth_handlers::log_in_handler,
        spendtrail_backend::handlers::auth_handlers::profile_handler,
        spendtrail_backend::handlers::auth_handlers::update_goals_handler,
        spendtrail_backend::handlers::ledger_handlers::create_income_handler,
        spendtrail_backend::handlers::ledger_handlers::list_incomes_handler,
        spendtrail_backend::handlers::ledger_handlers::update_income_handler,
        spendtrail_backend::handlers::ledger_handlers::create_expense_handler,
        spendtrail_backend::handlers::ledger_handlers::list_expenses_handler,
        spendtrail_backend::handlers::ledger_handlers::update_expense_handler,
        spendtrail_backend::handlers::ledger_handlers::expense_breakdown_handler,
        spendtrail_backend::handlers::ledger_handlers::recent_expenses_handler,
        spendtrail_backend::handlers::budget_handlers::create_budget_handler,
        spendtrail_backend::handlers::budget_handlers::list_budgets_handler,
        spendtrail_backend::handlers::budget_handlers::update_budget_handler,
        spendtrail_backend::handlers::subscription_handlers::create_subscription_handler,
        spendtrail_backend::handlers::subscription_handlers::list_subscriptions_handler,
        spendtrail_backend::handlers::subscription_handlers::update_subscription_handler,
        spendtrail_backend::handlers::subscription_handlers::subscription_projection_handler,
        spendtrail_backend::handlers::dashboard_handlers::financial_data_handler,
        spendtrail_backend::handlers::dashboard_handlers::graphs_handler,
        spendtrail_backend::handlers::dashboard_handlers::past_report_handler,
        spendtrail_backend::handlers::dashboard_handlers::trends_handler,
        spendtrail_backend::handlers::dashboard_handlers::savings_goal_handler,
    ),
    components(
        schemas(
            User, UserProfile, CreateUserRequest, UpdateGoalsRequest, LoginRequest, AuthToken,
            IncomeEntry, ExpenseEntry, CreateIncomeRequest, CreateExpenseRequest,
            AdditiveUpdateRequest, Budget, BudgetView, CreateBudgetRequest,
            Subscription, Frequency, CreateSubscriptionRequest, UpdateSubscriptionRequest,
            OccurrenceProjection, PeriodSummary, GoalPair, CategoryBreakdown, RecentExpense,
            DashboardGraph, IncomeExpensePoint, PieChartSlice, MonthlyPoint, PastReport,
            SavingsGoalView, ErrorResponse
        )
    ),
    tags(
        (name = "auth", description = "Authentication and profile endpoints"),
        (name = "ledger", description = "Income and expense endpoints"),
        (name = "budgets", description = "Budget endpoints"),
        (name = "subscriptions", description = "Subscription endpoints"),
        (name = "dashboard", description = "Aggregated dashboard endpoints")
    ),
    info(
        title = "SpendTrail API",
        version = "0.1.0",
        description = "REST API backend for the SpendTrail personal finance dashboard",
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("spendtrail_backend=info,tower_http=info")),
        )
        .init();

    // Get configuration from environment
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("migrations completed");

    // Initialize repositories
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let income_repository = Arc::new(PostgresIncomeRepository::new(pool.clone()));
    let expense_repository = Arc::new(PostgresExpenseRepository::new(pool.clone()));
    let budget_repository = Arc::new(PostgresBudgetRepository::new(pool.clone()));
    let subscription_repository = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));

    // Initialize services
    let auth_service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
        user_repository.clone(),
        jwt_secret,
    ));
    let ledger_service: Arc<dyn LedgerService> = Arc::new(LedgerServiceImpl::new(
        income_repository.clone(),
        expense_repository.clone(),
        subscription_repository.clone(),
    ));
    let budget_service: Arc<dyn BudgetService> = Arc::new(BudgetServiceImpl::new(
        budget_repository.clone(),
        expense_repository.clone(),
    ));
    let subscription_service: Arc<dyn SubscriptionService> = Arc::new(
        SubscriptionServiceImpl::new(subscription_repository.clone()),
    );
    let dashboard_service: Arc<dyn DashboardService> = Arc::new(DashboardServiceImpl::new(
        user_repository.clone(),
        income_repository.clone(),
        expense_repository.clone(),
        budget_repository.clone(),
    ));

    // Routes reachable without a bearer token
    let public_routes = Router::new()
        .route("/auth/sign_up", post(sign_up_handler))
        .route("/auth/log_in", post(log_in_handler))
        .with_state(auth_service.clone());

    // Everything below requires a valid bearer token
    let protected_routes = Router::new()
        .merge(
            Router::new()
                .route("/auth/profile", get(profile_handler))
                .route("/auth/goals", put(update_goals_handler))
                .with_state(auth_service.clone()),
        )
        .merge(
            Router::new()
                .route("/api/create_income", post(create_income_handler))
                .route("/api/incomes", get(list_incomes_handler))
                .route("/api/update_income/{category}", put(update_income_handler))
                .route("/api/create_expense", post(create_expense_handler))
                .route("/api/expenses", get(list_expenses_handler))
                .route(
                    "/api/update_expense/{category}",
                    put(update_expense_handler),
                )
                .route("/api/expenses/breakdown", get(expense_breakdown_handler))
                .route(
                    "/api/dashboard/recent_expenses",
                    get(recent_expenses_handler),
                )
                .with_state(ledger_service),
        )
        .merge(
            Router::new()
                .route("/api/create_budget", post(create_budget_handler))
                .route("/api/budgets", get(list_budgets_handler))
                .route("/api/update_budget/{category}", put(update_budget_handler))
                .with_state(budget_service),
        )
        .merge(
            Router::new()
                .route(
                    "/api/create_subscription",
                    post(create_subscription_handler),
                )
                .route("/api/subscriptions", get(list_subscriptions_handler))
                .route("/api/update_subscription", put(update_subscription_handler))
                .route(
                    "/api/subscriptions/{id}/projection",
                    get(subscription_projection_handler),
                )
                .with_state(subscription_service),
        )
        .merge(
            Router::new()
                .route("/api/dashboard/financialData", get(financial_data_handler))
                .route("/api/dashboard/graphs", get(graphs_handler))
                .route("/api/dashboard/past-reports/", get(past_report_handler))
                .route("/api/dashboard/trends", get(trends_handler))
                .route("/api/dashboard/savings_goal", get(savings_goal_handler))
                .with_state(dashboard_service),
        )
        .layer(middleware::from_fn_with_state(
            auth_service.clone(),
            auth_middleware,
        ));

    // Build router with routes
    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(protected_routes)
        // Merge Swagger UI
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        // Add CORS middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "server running");
    tracing::info!("API docs at http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
