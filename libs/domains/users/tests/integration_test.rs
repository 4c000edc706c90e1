//! MongoDB integration tests for the Users domain
//!
//! These run against a real MongoDB in a container and need Docker:
//! `cargo test -p domain_users -- --ignored`

use domain_users::*;
use ::mongodb::bson::{DateTime, Document, doc, oid::ObjectId};
use test_utils::{TestDataBuilder, TestMongo};

async fn repository(mongo: &TestMongo, test_name: &str) -> MongoUserRepository {
    let builder = TestDataBuilder::from_test_name(test_name);
    let repo = MongoUserRepository::new(&mongo.database(&builder.name("db", "users")));
    repo.init_indexes().await.unwrap();
    repo
}

fn new_user(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.into(),
        email: email.into(),
        phone: None,
        company: None,
        address: None,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_get_delete_round_trip() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "round_trip").await;

    let created = repo.create(new_user("Ann", "ann@x.com")).await.unwrap();
    let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Ann");
    assert_eq!(fetched.email, "ann@x.com");

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    assert!(!repo.delete(created.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unique_index_maps_to_duplicate_email() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "unique_index").await;

    repo.create(new_user("Ann", "ann@x.com")).await.unwrap();

    // Bypasses the service pre-check, so only the index can catch it
    let result = repo.create(new_user("Ann again", "ann@x.com")).await;
    assert!(matches!(result, Err(UserError::DuplicateEmail)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_to_taken_email_hits_index() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "update_unique").await;

    repo.create(new_user("Ann", "ann@x.com")).await.unwrap();
    let bob = repo.create(new_user("Bob", "bob@x.com")).await.unwrap();

    let result = repo
        .update(
            bob.id,
            UpdateUser {
                email: Some("ann@x.com".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(UserError::DuplicateEmail)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_partial_update_and_email_exclusion() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("partial_update");
    let db = mongo.database(&builder.name("db", "users"));
    let repo = MongoUserRepository::new(&db);
    repo.init_indexes().await.unwrap();

    // Seed a document whose timestamps are well in the past
    let past = DateTime::from_millis(1_700_000_000_000).to_chrono();
    let mut ann = User::new(new_user("Ann", "ann@x.com"));
    ann.created_at = past;
    ann.updated_at = past;
    db.collection::<User>("users").insert_one(&ann).await.unwrap();

    let updated = repo
        .update(
            ann.id,
            UpdateUser {
                phone: Some("555-0100".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Ann");
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));
    assert!(updated.updated_at > past);
    assert_eq!(updated.created_at, past);

    let raw = db
        .collection::<Document>("users")
        .find_one(doc! { "_id": ann.id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw.get_datetime("createdAt").unwrap().to_chrono(), past);
    assert!(raw.get_datetime("updatedAt").unwrap().to_chrono() > past);

    assert!(repo.find_by_email("ann@x.com", None).await.unwrap().is_some());
    assert!(
        repo.find_by_email("ann@x.com", Some(ann.id))
            .await
            .unwrap()
            .is_none()
    );

    let missing = repo
        .update(ObjectId::new(), UpdateUser::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_init_indexes_is_idempotent() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("indexes");
    let db = mongo.database(&builder.name("db", "users"));
    let repo = MongoUserRepository::new(&db);

    repo.init_indexes().await.unwrap();
    repo.init_indexes().await.unwrap();

    let names = db
        .collection::<::mongodb::bson::Document>("users")
        .list_index_names()
        .await
        .unwrap();
    assert!(names.contains(&"email_unique".to_string()));

    let stored = db
        .collection::<::mongodb::bson::Document>("users")
        .count_documents(doc! {})
        .await
        .unwrap();
    assert_eq!(stored, 0);
}
