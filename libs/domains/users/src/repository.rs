use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, UpdateUser, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Get a user by ID
    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    /// Find a user by exact email, optionally ignoring one ID
    async fn find_by_email(&self, email: &str, exclude: Option<ObjectId>)
    -> UserResult<Option<User>>;

    /// Insert a new user with a generated ID and timestamps
    async fn create(&self, input: NewUser) -> UserResult<User>;

    /// Apply a partial update and return the updated document, or `None` if the ID is unknown
    async fn update(&self, id: ObjectId, input: UpdateUser) -> UserResult<Option<User>>;

    /// Delete a user by ID; `false` if nothing was deleted
    async fn delete(&self, id: ObjectId) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Enforces email uniqueness the way the MongoDB unique index does.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Store a prepared document as-is, replacing any user with the same ID.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let mut result: Vec<User> = users.values().cloned().collect();
        // ObjectIds start with a timestamp, which approximates natural order
        result.sort_by_key(|u| u.id);
        Ok(result)
    }

    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<ObjectId>,
    ) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email == email && Some(u.id) != exclude)
            .cloned();
        Ok(user)
    }

    async fn create(&self, input: NewUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == input.email) {
            return Err(UserError::DuplicateEmail);
        }

        let user = User::new(input);
        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn update(&self, id: ObjectId, input: UpdateUser) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(ref email) = input.email {
            if users.values().any(|u| u.id != id && &u.email == email) {
                return Err(UserError::DuplicateEmail);
            }
        }

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        user.apply_update(input);

        tracing::info!(user_id = %id, "Updated user");
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id).is_some();

        if removed {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(removed)
    }
}
