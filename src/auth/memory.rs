// In-process credential store for tests and database-less runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{normalize_email, NewUser, User},
    repository::UserStore,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// normalized email -> id
    emails: HashMap<String, Uuid>,
    roles: HashMap<Uuid, BTreeSet<String>>,
}

/// Credential store kept entirely in memory. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryUserStore {
    tables: RwLock<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let tables = self.tables.read().await;
        Ok(tables
            .emails
            .get(&normalize_email(email))
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        let mut tables = self.tables.write().await;
        let normalized = normalize_email(&new_user.email);
        if tables.emails.contains_key(&normalized) {
            return Err(AuthError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.trim().to_string(),
            normalized_email: normalized.clone(),
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            is_active: true,
            created_date: Utc::now(),
        };
        tables.emails.insert(normalized, user.id);
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<bool, AuthError> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.users.get(&user.id) else {
            return Ok(false);
        };

        let old_email = existing.normalized_email.clone();
        let new_email = normalize_email(&user.email);
        if new_email != old_email {
            if tables.emails.contains_key(&new_email) {
                return Err(AuthError::DuplicateEmail);
            }
            tables.emails.remove(&old_email);
            tables.emails.insert(new_email.clone(), user.id);
        }

        let mut stored = user.clone();
        stored.normalized_email = new_email;
        tables.users.insert(user.id, stored);

        Ok(true)
    }

    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), AuthError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AuthError::NotFound);
        }
        tables
            .roles
            .entry(user_id)
            .or_default()
            .insert(role.to_string());

        Ok(())
    }

    async fn list_roles(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        Ok(self
            .tables
            .read()
            .await
            .roles
            .get(&user_id)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_active(&self) -> Result<Vec<User>, AuthError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| user.is_active)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_date.cmp(&b.created_date).then(a.id.cmp(&b.id)));

        Ok(users)
    }
}
