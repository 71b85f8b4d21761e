// Authentication service - business logic layer

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{primary_role, AuthResponse, CreateUserRequest, NewUser, Role, User, UserResponse},
    password::PasswordService,
    repository::UserStore,
    token::{TokenService, TokenSubject},
};
use crate::validation::{validate_new_user, NewUserFields};

/// Authentication service coordinating login and user administration
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    password_service: PasswordService,
    token_service: Arc<TokenService>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        store: Arc<dyn UserStore>,
        password_service: PasswordService,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            password_service,
            token_service,
        }
    }

    /// Verify credentials and issue a 24 hour token.
    ///
    /// Unknown emails and wrong passwords fail identically.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = match self.store.find_by_email(email).await? {
            Some(user) => user,
            None => {
                self.password_service.verify_against_dummy(password);
                warn!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .password_service
            .verify_password(password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let roles = self.store.list_roles(user.id).await?;
        let issued = self.token_service.issue(&TokenSubject {
            user_id: user.id,
            username: &user.email,
            email: &user.email,
            roles: &roles,
        })?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse {
            token: issued.token,
            user_id: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name(),
            role: primary_role(&roles),
            expiration: issued.expires_at,
        })
    }

    /// Create an HR or Interviewer account
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, AuthError> {
        // Role first: an unassignable role fails whatever else is wrong
        let role = Role::parse_assignable(&request.role)
            .ok_or_else(|| AuthError::InvalidRole(request.role.clone()))?;

        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let errors = validate_new_user(
            &self.password_service,
            NewUserFields {
                email: &request.email,
                password: &request.password,
                first_name: request.first_name.as_deref(),
                last_name: request.last_name.as_deref(),
            },
        );
        if !errors.is_empty() {
            return Err(AuthError::CreationFailed(errors));
        }

        let password_hash = self.password_service.hash_password(&request.password)?;
        let user = self
            .store
            .create(NewUser {
                email: request.email,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
            })
            .await?;
        self.store.add_role(user.id, role.as_str()).await?;

        info!(user_id = %user.id, "User created");
        Ok(UserResponse::from_user(&user, role.to_string()))
    }

    /// All active users with their primary role
    #[instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<UserResponse>, AuthError> {
        let users = self.store.list_active().await?;
        let mut responses = Vec::with_capacity(users.len());
        for user in &users {
            responses.push(self.to_response(user).await?);
        }

        Ok(responses)
    }

    /// Look a user up by id, active or not. Unparseable ids are simply absent.
    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<UserResponse>, AuthError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        match self.store.find_by_id(id).await? {
            Some(user) => Ok(Some(self.to_response(&user).await?)),
            None => Ok(None),
        }
    }

    /// Flip a user to inactive. False when the user does not exist.
    #[instrument(skip(self))]
    pub async fn deactivate_user(&self, id: &str) -> Result<bool, AuthError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(false);
        };
        let Some(mut user) = self.store.find_by_id(id).await? else {
            return Ok(false);
        };

        user.is_active = false;
        let updated = self.store.update(&user).await?;
        if updated {
            info!(user_id = %user.id, "User deactivated");
        }

        Ok(updated)
    }

    /// Provision an account with an arbitrary role, bypassing the admin
    /// creation restriction. Used for bootstrap seeding only.
    pub(crate) async fn provision(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Option<User>, AuthError> {
        if self.store.find_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let errors = validate_new_user(
            &self.password_service,
            NewUserFields {
                email,
                password,
                first_name: None,
                last_name: None,
            },
        );
        if !errors.is_empty() {
            return Err(AuthError::CreationFailed(errors));
        }

        let password_hash = self.password_service.hash_password(password)?;
        let user = self
            .store
            .create(NewUser {
                email: email.to_string(),
                password_hash,
                first_name: None,
                last_name: None,
            })
            .await?;
        self.store.add_role(user.id, role.as_str()).await?;

        Ok(Some(user))
    }

    async fn to_response(&self, user: &User) -> Result<UserResponse, AuthError> {
        let roles = self.store.list_roles(user.id).await?;
        Ok(UserResponse::from_user(user, primary_role(&roles)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::InMemoryUserStore;
    use crate::config::JwtSettings;
    use proptest::prelude::*;

    fn token_service() -> Arc<TokenService> {
        let settings = JwtSettings::new(
            "test_secret_key_for_testing_purposes_0123".to_string(),
            "tracker".to_string(),
            "tracker-clients".to_string(),
        )
        .unwrap();
        Arc::new(TokenService::new(&settings))
    }

    /// Helper function to create a service over an empty in-memory store
    fn create_service() -> (AuthService, Arc<TokenService>) {
        let tokens = token_service();
        let service = AuthService::new(
            Arc::new(InMemoryUserStore::new()),
            PasswordService::default(),
            tokens.clone(),
        );
        (service, tokens)
    }

    fn request(email: &str, password: &str, role: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let (service, _) = create_service();
        let created = service
            .create_user(request("a@x.com", "P@ssw0rd!", "HR"))
            .await
            .expect("Failed to create user");

        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.full_name, "Ada Lovelace");
        assert_eq!(created.role, "HR");
        assert!(created.is_active);

        let fetched = service.get_user_by_id(&created.user_id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_user_rejects_unassignable_roles() {
        let (service, _) = create_service();
        for role in ["Admin", "hr", "", "Manager"] {
            let result = service.create_user(request("a@x.com", "P@ssw0rd!", role)).await;
            assert!(matches!(result, Err(AuthError::InvalidRole(_))), "role {:?}", role);
        }
    }

    #[tokio::test]
    async fn test_invalid_role_wins_over_other_failures() {
        let (service, _) = create_service();
        service
            .create_user(request("a@x.com", "P@ssw0rd!", "HR"))
            .await
            .unwrap();

        // Duplicate email and weak password, but the role is checked first
        let result = service.create_user(request("a@x.com", "weak", "Admin")).await;
        assert!(matches!(result, Err(AuthError::InvalidRole(_))));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let (service, _) = create_service();
        service
            .create_user(request("a@x.com", "P@ssw0rd!", "HR"))
            .await
            .unwrap();

        let result = service
            .create_user(request("A@X.COM", "P@ssw0rd!", "Interviewer"))
            .await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_of_inactive_user() {
        let (service, _) = create_service();
        let created = service
            .create_user(request("a@x.com", "P@ssw0rd!", "HR"))
            .await
            .unwrap();
        assert!(service.deactivate_user(&created.user_id).await.unwrap());

        let result = service.create_user(request("a@x.com", "P@ssw0rd!", "HR")).await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_create_user_weak_password_fails_with_joined_messages() {
        let (service, _) = create_service();
        let err = service
            .create_user(request("a@x.com", "password", "HR"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            concat!(
                "User creation failed: ",
                "Passwords must have at least one non alphanumeric character., ",
                "Passwords must have at least one digit ('0'-'9')., ",
                "Passwords must have at least one uppercase ('A'-'Z')."
            )
        );
        assert!(service.get_all_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_success_returns_token_and_profile() {
        let (service, tokens) = create_service();
        let created = service
            .create_user(request("a@x.com", "P@ssw0rd!", "Interviewer"))
            .await
            .unwrap();

        let auth = service.login("a@x.com", "P@ssw0rd!").await.unwrap();
        assert_eq!(auth.user_id, created.user_id);
        assert_eq!(auth.email, "a@x.com");
        assert_eq!(auth.full_name, "Ada Lovelace");
        assert_eq!(auth.role, "Interviewer");

        let claims = tokens.validate(&auth.token).unwrap();
        assert_eq!(claims.sub, created.user_id);
        assert_eq!(claims.exp, auth.expiration.timestamp());
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(claims.has_role("Interviewer"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (service, _) = create_service();
        service
            .create_user(request("a@x.com", "P@ssw0rd!", "HR"))
            .await
            .unwrap();

        let unknown = service.login("nobody@x.com", "P@ssw0rd!").await.unwrap_err();
        let wrong = service.login("a@x.com", "Wr0ng!pass").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_inactive_user_can_still_log_in() {
        let (service, _) = create_service();
        let created = service
            .create_user(request("a@x.com", "P@ssw0rd!", "HR"))
            .await
            .unwrap();
        service.deactivate_user(&created.user_id).await.unwrap();

        assert!(service.login("a@x.com", "P@ssw0rd!").await.is_ok());
    }

    #[tokio::test]
    async fn test_login_user_without_roles_has_empty_role() {
        let (service, _) = create_service();
        service
            .store
            .create(NewUser {
                email: "norole@x.com".to_string(),
                password_hash: service.password_service.hash_password("P@ssw0rd!").unwrap(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();

        let auth = service.login("norole@x.com", "P@ssw0rd!").await.unwrap();
        assert_eq!(auth.role, "");
        assert_eq!(auth.full_name, "");
    }

    #[tokio::test]
    async fn test_get_user_by_id_unknown_or_malformed() {
        let (service, _) = create_service();
        assert!(service
            .get_user_by_id(&Uuid::new_v4().to_string())
            .await
            .unwrap()
            .is_none());
        assert!(service.get_user_by_id("not-a-uuid").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate_user_is_idempotent() {
        let (service, _) = create_service();
        let created = service
            .create_user(request("a@x.com", "P@ssw0rd!", "HR"))
            .await
            .unwrap();

        assert!(service.deactivate_user(&created.user_id).await.unwrap());
        assert!(service.deactivate_user(&created.user_id).await.unwrap());
        assert!(!service
            .deactivate_user(&Uuid::new_v4().to_string())
            .await
            .unwrap());
        assert!(!service.deactivate_user("garbage").await.unwrap());
    }

    #[tokio::test]
    async fn test_user_lifecycle_scenario() {
        let (service, tokens) = create_service();
        let created = service
            .create_user(CreateUserRequest {
                email: "a@x.com".to_string(),
                password: "P@ssw0rd!".to_string(),
                first_name: None,
                last_name: None,
                role: "HR".to_string(),
            })
            .await
            .unwrap();
        assert!(created.is_active);

        let auth = service.login("a@x.com", "P@ssw0rd!").await.unwrap();
        assert_eq!(auth.role, "HR");
        assert!(tokens.validate(&auth.token).unwrap().has_role("HR"));

        assert!(service.deactivate_user(&created.user_id).await.unwrap());

        let listed = service.get_all_users().await.unwrap();
        assert!(listed.iter().all(|u| u.user_id != created.user_id));

        let fetched = service.get_user_by_id(&created.user_id).await.unwrap().unwrap();
        assert!(!fetched.is_active);
        assert_eq!(fetched.role, "HR");
    }

    #[tokio::test]
    async fn test_provision_is_skipped_for_existing_email() {
        let (service, _) = create_service();
        let admin = service
            .provision("admin@x.com", "Adm1n!Pass", Role::Admin)
            .await
            .unwrap()
            .expect("first provision creates the user");
        assert_eq!(service.store.list_roles(admin.id).await.unwrap(), vec!["Admin"]);

        let again = service
            .provision("admin@x.com", "Adm1n!Pass", Role::Admin)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_unassignable_roles_always_rejected(
            role in "[A-Za-z]{0,12}".prop_filter("assignable", |r| r != "HR" && r != "Interviewer"),
            email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
            password in "\\PC{0,12}"
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (service, _) = create_service();
            let result = rt.block_on(service.create_user(request(&email, &password, &role)));
            prop_assert!(matches!(result, Err(AuthError::InvalidRole(_))));
        }
    }
}
