use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOneOptions, FindOptions, UpdateOptions};
use mongodb::results::UpdateResult;
use mongodb::{Collection, Database};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use starter_types::ports::database::DatabaseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedModel {
    pub id: String,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedModel {
    pub deleted_count: u64,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedModel {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

impl From<UpdateResult> for UpdatedModel {
    fn from(result: UpdateResult) -> Self {
        Self {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id.map(id_string),
        }
    }
}

fn query_error(err: mongodb::error::Error) -> DatabaseError {
    DatabaseError::Query(err.to_string())
}

fn id_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

/// Ids that parse as an ObjectId are matched as one, anything else as a string.
pub fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": oid },
        Err(_) => doc! { "_id": id },
    }
}

/// Thin pass-through over one collection.
pub struct MongoRepository<T>
where
    T: Send + Sync,
{
    database: Database,
    collection: Collection<T>,
}

impl<T> MongoRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + Unpin,
{
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection::<T>(collection),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn is_connected(&self) -> Result<(), DatabaseError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|_| DatabaseError::Disconnected {
                database: self.database.name().to_string(),
            })
    }

    pub async fn create(&self, document: &T) -> Result<CreatedModel, DatabaseError> {
        let result = self
            .collection
            .insert_one(document)
            .await
            .map_err(query_error)?;
        let id = id_string(result.inserted_id);
        Ok(CreatedModel {
            created: !id.is_empty(),
            id,
        })
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        self.collection
            .find_one(id_filter(id))
            .await
            .map_err(query_error)
    }

    pub async fn find_all(&self) -> Result<Vec<T>, DatabaseError> {
        self.find(doc! {}, None).await
    }

    pub async fn find(
        &self,
        filter: Document,
        options: Option<FindOptions>,
    ) -> Result<Vec<T>, DatabaseError> {
        let cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .map_err(query_error)?;
        cursor.try_collect().await.map_err(query_error)
    }

    pub async fn find_one(
        &self,
        filter: Document,
        options: Option<FindOneOptions>,
    ) -> Result<Option<T>, DatabaseError> {
        self.collection
            .find_one(filter)
            .with_options(options)
            .await
            .map_err(query_error)
    }

    pub async fn remove(&self, filter: Document) -> Result<RemovedModel, DatabaseError> {
        let result = self
            .collection
            .delete_many(filter)
            .await
            .map_err(query_error)?;
        Ok(RemovedModel {
            deleted_count: result.deleted_count,
            deleted: result.deleted_count > 0,
        })
    }

    pub async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: Option<UpdateOptions>,
    ) -> Result<UpdatedModel, DatabaseError> {
        self.collection
            .update_one(filter, update)
            .with_options(options)
            .await
            .map(UpdatedModel::from)
            .map_err(query_error)
    }

    pub async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: Option<UpdateOptions>,
    ) -> Result<UpdatedModel, DatabaseError> {
        self.collection
            .update_many(filter, update)
            .with_options(options)
            .await
            .map(UpdatedModel::from)
            .map_err(query_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_strings_filter_as_object_ids() {
        let oid = ObjectId::new();
        let filter = id_filter(&oid.to_hex());
        assert_eq!(filter.get_object_id("_id").unwrap(), oid);
    }

    #[test]
    fn other_ids_filter_as_strings() {
        let filter = id_filter("user-1");
        assert_eq!(filter.get_str("_id").unwrap(), "user-1");
    }

    #[test]
    fn update_model_stringifies_upserted_id() {
        let oid = ObjectId::new();
        assert_eq!(id_string(Bson::ObjectId(oid)), oid.to_hex());
        assert_eq!(id_string(Bson::String("x".into())), "x");
    }
}
