use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Datelike, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::auth::{AuthToken, LoginRequest};
use crate::models::user::{CreateUserRequest, UpdateGoalsRequest, User, UserProfile};
use crate::repositories::{RepositoryError, UserRepository};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    exp: i64,    // expiration timestamp
}

/// Authentication service errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Trait defining authentication service operations
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, request: CreateUserRequest) -> Result<User, AuthError>;

    /// Authenticate user and return JWT token
    async fn login(&self, request: LoginRequest) -> Result<AuthToken, AuthError>;

    /// Validate JWT token and return user_id
    async fn validate_token(&self, token: &str) -> Result<Uuid, AuthError>;

    /// Fetch the public profile for a user
    async fn profile(&self, user_id: Uuid) -> Result<UserProfile, AuthError>;

    /// Update income/savings goals and snapshot them for the current month
    async fn update_goals(
        &self,
        user_id: Uuid,
        request: UpdateGoalsRequest,
    ) -> Result<UserProfile, AuthError>;
}

/// Implementation of AuthService
pub struct AuthServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    jwt_secret: String,
}

impl AuthServiceImpl {
    pub fn new(user_repository: Arc<dyn UserRepository>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            jwt_secret,
        }
    }

    /// Hash a password using bcrypt
    fn hash_password(password: &str) -> Result<String, AuthError> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AuthError::DatabaseError(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a hash
    fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        verify(password, hash)
            .map_err(|e| AuthError::DatabaseError(format!("Password verification failed: {}", e)))
    }

    /// Generate a JWT token for a user
    fn generate_jwt(&self, user_id: Uuid) -> Result<AuthToken, AuthError> {
        let expiration = Utc::now() + Duration::hours(24);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::DatabaseError(format!("Token generation failed: {}", e)))?;

        Ok(AuthToken {
            token,
            expires_at: expiration,
        })
    }

    /// Decode and validate a JWT token
    fn decode_jwt(&self, token: &str) -> Result<Uuid, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            if e.to_string().contains("ExpiredSignature") {
                AuthError::TokenExpired
            } else {
                AuthError::InvalidToken
            }
        })?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    /// Avatar fallback shown until the user uploads one: the first letter
    /// of their name
    fn avatar_initial(name: &str) -> String {
        name.chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string())
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: CreateUserRequest) -> Result<User, AuthError> {
        // Hash the password
        let password_hash = Self::hash_password(&request.password)?;
        let avatar = Self::avatar_initial(&request.name);

        // Create user in repository
        let user = self
            .user_repository
            .create(request, password_hash, avatar)
            .await
            .map_err(|e| match e {
                RepositoryError::ConstraintViolation(_) => AuthError::DuplicateEmail,
                RepositoryError::DatabaseError(msg) => AuthError::DatabaseError(msg),
                RepositoryError::NotFound => {
                    AuthError::DatabaseError("Unexpected error".to_string())
                }
            })?;

        Ok(user)
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthToken, AuthError> {
        // Find user by email
        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        // Verify password
        let is_valid = Self::verify_password(&request.password, &user.password_hash)?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        // Generate JWT token
        self.generate_jwt(user.id)
    }

    async fn validate_token(&self, token: &str) -> Result<Uuid, AuthError> {
        self.decode_jwt(token)
    }

    async fn profile(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    async fn update_goals(
        &self,
        user_id: Uuid,
        request: UpdateGoalsRequest,
    ) -> Result<UserProfile, AuthError> {
        let user = self
            .user_repository
            .update_goals(user_id, request.income_goal, request.savings_goal)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                RepositoryError::DatabaseError(msg) => AuthError::DatabaseError(msg),
                RepositoryError::ConstraintViolation(msg) => AuthError::DatabaseError(msg),
            })?;

        // Snapshot the goals now in force so past-period reports keep the
        // values that applied when the month was live
        let now = Utc::now();
        self.user_repository
            .upsert_goal_snapshot(
                user_id,
                now.year(),
                now.month(),
                user.income_goal,
                user.savings_goal,
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock repository for testing
    struct MockUserRepository {
        users: Mutex<HashMap<String, User>>,
        snapshots: Mutex<HashMap<(Uuid, i32, u32), (Option<Decimal>, Option<Decimal>)>>,
    }

    impl MockUserRepository {
        fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
                snapshots: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn create(
            &self,
            user: CreateUserRequest,
            password_hash: String,
            avatar: String,
        ) -> Result<User, RepositoryError> {
            let mut users = self.users.lock().unwrap();

            if users.contains_key(&user.email) {
                return Err(RepositoryError::ConstraintViolation(
                    "Email already exists".to_string(),
                ));
            }

            let new_user = User {
                id: Uuid::new_v4(),
                name: user.name,
                email: user.email.clone(),
                password_hash,
                avatar,
                income_goal: user.income_goal,
                savings_goal: user.savings_goal,
                join_date: Utc::now(),
            };

            users.insert(new_user.email.clone(), new_user.clone());
            Ok(new_user)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn update_goals(
            &self,
            id: Uuid,
            income_goal: Option<Decimal>,
            savings_goal: Option<Decimal>,
        ) -> Result<User, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .values_mut()
                .find(|u| u.id == id)
                .ok_or(RepositoryError::NotFound)?;

            if income_goal.is_some() {
                user.income_goal = income_goal;
            }
            if savings_goal.is_some() {
                user.savings_goal = savings_goal;
            }
            Ok(user.clone())
        }

        async fn upsert_goal_snapshot(
            &self,
            user_id: Uuid,
            year: i32,
            month: u32,
            income_goal: Option<Decimal>,
            savings_goal: Option<Decimal>,
        ) -> Result<(), RepositoryError> {
            let mut snapshots = self.snapshots.lock().unwrap();
            snapshots.insert((user_id, year, month), (income_goal, savings_goal));
            Ok(())
        }

        async fn find_goal_snapshot(
            &self,
            user_id: Uuid,
            year: i32,
            month: u32,
        ) -> Result<Option<crate::models::user::GoalSnapshot>, RepositoryError> {
            let snapshots = self.snapshots.lock().unwrap();
            Ok(snapshots.get(&(user_id, year, month)).map(|(income, savings)| {
                crate::models::user::GoalSnapshot {
                    income_goal: *income,
                    savings_goal: *savings,
                }
            }))
        }
    }

    fn register_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            income_goal: None,
            savings_goal: None,
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let repo = Arc::new(MockUserRepository::new());
        let service = AuthServiceImpl::new(repo, "test_secret".to_string());

        let result = service.register(register_request("test@example.com")).await;
        assert!(result.is_ok());

        let user = result.unwrap();
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.avatar, "T");
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let repo = Arc::new(MockUserRepository::new());
        let service = AuthServiceImpl::new(repo, "test_secret".to_string());

        service
            .register(register_request("test@example.com"))
            .await
            .unwrap();
        let result = service.register(register_request("test@example.com")).await;

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_login_and_validate_token() {
        let repo = Arc::new(MockUserRepository::new());
        let service = AuthServiceImpl::new(repo, "test_secret".to_string());

        let user = service
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        let token = service
            .login(LoginRequest {
                email: "test@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        let user_id = service.validate_token(&token.token).await.unwrap();
        assert_eq!(user_id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let repo = Arc::new(MockUserRepository::new());
        let service = AuthServiceImpl::new(repo, "test_secret".to_string());

        service
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        let result = service
            .login(LoginRequest {
                email: "test@example.com".to_string(),
                password: "wrong_password".to_string(),
            })
            .await;

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_validate_token_rejects_garbage() {
        let repo = Arc::new(MockUserRepository::new());
        let service = AuthServiceImpl::new(repo, "test_secret".to_string());

        let result = service.validate_token("not_a_token").await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_update_goals_snapshots_current_month() {
        let repo = Arc::new(MockUserRepository::new());
        let service = AuthServiceImpl::new(repo.clone(), "test_secret".to_string());

        let user = service
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        let result = service
            .update_goals(
                user.id,
                UpdateGoalsRequest {
                    income_goal: Some(Decimal::from(50_000_i64)),
                    savings_goal: None,
                },
            )
            .await;
        assert!(result.is_ok());

        let now = Utc::now();
        let snapshot = repo
            .find_goal_snapshot(user.id, now.year(), now.month())
            .await
            .unwrap()
            .expect("snapshot should be written");
        assert_eq!(snapshot.income_goal, Some(Decimal::from(50_000_i64)));
    }

    #[tokio::test]
    async fn test_profile_unknown_user() {
        let repo = Arc::new(MockUserRepository::new());
        let service = AuthServiceImpl::new(repo, "test_secret".to_string());

        let result = service.profile(Uuid::new_v4()).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::UserNotFound));
    }
}
