//! User Service - Business logic layer

use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, NewUser, UpdateUser, UserResponse};
use crate::repository::UserRepository;

/// Parse a path identifier into an ObjectId.
///
/// Anything other than 24 hex characters is rejected before storage is touched.
pub fn parse_id(id: &str) -> UserResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| UserError::InvalidId)
}

/// Tag a repository failure with the client-facing `message` of the failing operation.
fn storage_failure(message: &'static str) -> impl Fn(UserError) -> UserError {
    move |err| match err {
        UserError::Database(detail) => UserError::Storage { message, detail },
        other => other,
    }
}

/// Service layer for User business logic
///
/// Validates input, enforces email uniqueness, and shapes documents for the API.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self
            .repository
            .list()
            .await
            .map_err(storage_failure("Failed to fetch users"))?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> UserResult<UserResponse> {
        let id = parse_id(id)?;

        let user = self
            .repository
            .get_by_id(id)
            .await
            .map_err(storage_failure("Failed to fetch user"))?
            .ok_or(UserError::NotFound)?;

        Ok(user.into())
    }

    /// Create a user. The email must be well-formed and not already in use.
    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        let new_user = NewUser::try_from(input)?;
        let failed = storage_failure("Failed to create user");

        if self
            .repository
            .find_by_email(&new_user.email, None)
            .await
            .map_err(&failed)?
            .is_some()
        {
            return Err(UserError::DuplicateEmail);
        }

        let created = self.repository.create(new_user).await.map_err(&failed)?;
        Ok(created.into())
    }

    /// Partially update a user.
    ///
    /// A new email is checked against every *other* user, so re-submitting the current
    /// email is allowed.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: &str, input: UpdateUser) -> UserResult<UserResponse> {
        let id = parse_id(id)?;
        input.validate()?;
        let failed = storage_failure("Failed to update user");

        if let Some(ref email) = input.email {
            if self
                .repository
                .find_by_email(email, Some(id))
                .await
                .map_err(&failed)?
                .is_some()
            {
                return Err(UserError::DuplicateEmail);
            }
        }

        let user = self
            .repository
            .update(id, input)
            .await
            .map_err(&failed)?
            .ok_or(UserError::NotFound)?;

        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        let id = parse_id(id)?;

        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(storage_failure("Failed to delete user"))?;
        if !deleted {
            return Err(UserError::NotFound);
        }
        Ok(())
    }
}
