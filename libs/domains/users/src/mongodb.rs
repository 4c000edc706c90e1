//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{DateTime, Document, doc, oid::ObjectId, to_bson},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, UpdateUser, User};
use crate::repository::UserRepository;

/// Collection holding user documents
pub const COLLECTION: &str = "users";

/// Name of the unique index on `email`
pub const EMAIL_INDEX: &str = "email_unique";

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    /// Create a repository over the `users` collection
    ///
    /// # Example
    /// ```ignore
    /// let client = database::mongodb::connect_lazy(&config)?;
    /// let repo = MongoUserRepository::new(&client.database("users"));
    /// ```
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    /// Create a repository over a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<User>(collection_name);
        Self { collection }
    }

    /// Ensure the unique email index exists. Idempotent.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(EMAIL_INDEX.to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!(index = EMAIL_INDEX, "User indexes initialized");
        Ok(())
    }

    /// `$set` document for a partial update. `updatedAt` is always refreshed.
    fn build_update(input: &UpdateUser) -> UserResult<Document> {
        let mut set = doc! {};

        if let Some(ref name) = input.name {
            set.insert("name", name.as_str());
        }
        if let Some(ref email) = input.email {
            set.insert("email", email.as_str());
        }
        if let Some(ref phone) = input.phone {
            set.insert("phone", phone.as_str());
        }
        if let Some(ref company) = input.company {
            set.insert("company", company.as_str());
        }
        if let Some(ref address) = input.address {
            let address = to_bson(address).map_err(|e| UserError::Database(e.to_string()))?;
            set.insert("address", address);
        }

        set.insert("updatedAt", DateTime::now());

        Ok(doc! { "$set": set })
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> UserResult<Vec<User>> {
        let cursor = self.collection.find(doc! {}).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<ObjectId>,
    ) -> UserResult<Option<User>> {
        let mut filter = doc! { "email": email };
        if let Some(id) = exclude {
            filter.insert("_id", doc! { "$ne": id });
        }

        let user = self.collection.find_one(filter).await?;
        Ok(user)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let user = User::new(input);

        self.collection.insert_one(&user).await?;

        tracing::info!(user_id = %user.id, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: ObjectId, input: UpdateUser) -> UserResult<Option<User>> {
        let update = Self::build_update(&input)?;

        let user = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?;

        if user.is_some() {
            tracing::info!(user_id = %id, "User updated successfully");
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count == 0 {
            return Ok(false);
        }

        tracing::info!(user_id = %id, "User deleted successfully");
        Ok(true)
    }
}
