#![cfg(feature = "mongo")]

//! Live MongoDB checks. Skipped unless MONGO_URL points at a reachable server
//! whose URI names a database.

use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use starter_infra::database::{MongoRepository, MongoService};
use starter_infra::LoggerService;
use starter_types::ports::database::{DatabaseError, DatabaseService};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    #[serde(rename = "_id")]
    id: String,
    body: String,
}

macro_rules! skip_if_no_mongo {
    () => {
        match std::env::var("MONGO_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => {
                eprintln!("skipping: MONGO_URL not set");
                return;
            }
        }
    };
}

#[tokio::test]
async fn disconnect_before_connect_fails() {
    let service = MongoService::new(LoggerService::new("mongo-test"));
    assert!(matches!(
        service.disconnect().await,
        Err(DatabaseError::Disconnected { .. })
    ));
}

#[tokio::test]
async fn repository_crud_flow() {
    let url = skip_if_no_mongo!();
    let service = MongoService::new(LoggerService::new("mongo-test"));
    service.connect(&url).await.unwrap();
    service.is_connected().await.unwrap();

    let collection = format!("notes_{}", uuid::Uuid::new_v4().simple());
    let repo: MongoRepository<Note> = MongoRepository::new(&service.database().unwrap(), &collection);
    repo.is_connected().await.unwrap();

    let note = Note {
        id: "note-1".into(),
        body: "hello".into(),
    };
    let created = repo.create(&note).await.unwrap();
    assert!(created.created);
    assert_eq!(created.id, "note-1");

    assert_eq!(repo.find_by_id("note-1").await.unwrap(), Some(note.clone()));
    assert_eq!(repo.find_all().await.unwrap().len(), 1);

    let updated = repo
        .update_one(doc! { "_id": "note-1" }, doc! { "$set": { "body": "bye" } }, None)
        .await
        .unwrap();
    assert_eq!(updated.modified_count, 1);
    let found = repo
        .find_one(doc! { "body": "bye" }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, "note-1");

    let removed = repo.remove(doc! {}).await.unwrap();
    assert!(removed.deleted);
    assert!(repo.find_all().await.unwrap().is_empty());

    repo.collection().drop().await.unwrap();
    service.disconnect().await.unwrap();
}
