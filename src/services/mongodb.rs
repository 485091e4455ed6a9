use async_trait::async_trait;
use mongodb::bson::{self, doc, Document};
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Database};

use crate::models::{CompanyRecord, StoreError};
use crate::traits::{split_key_path, RecordStore};

#[derive(Clone)]
pub struct MongoDBService {
    db: Database,
}

impl MongoDBService {
    pub async fn init(uri: &str, database: &str) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(uri).await?;

        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        client_options.server_api = Some(server_api);

        client_options.connect_timeout = Some(std::time::Duration::from_secs(10));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await?;

        log::info!("Successfully connected to MongoDB, using database {}", database);

        Ok(Self { db: client.database(database) })
    }
}

/// Document stored for a key path: the record with `_id` set to the id segment.
pub fn record_document(id: &str, record: &CompanyRecord) -> Result<Document, StoreError> {
    let mut document = bson::to_document(record)
        .map_err(|e| StoreError::Backend(format!("Failed to encode record: {}", e)))?;
    document.insert("_id", id);
    Ok(document)
}

#[async_trait]
impl RecordStore for MongoDBService {
    async fn write_record(&self, key_path: &str, record: &CompanyRecord) -> Result<(), StoreError> {
        let (collection, id) = split_key_path(key_path)?;
        let document = record_document(id, record)?;

        // set semantics: a rewrite of the same key replaces the record
        self.db
            .collection::<Document>(collection)
            .replace_one(
                doc! { "_id": id },
                document,
                mongodb::options::ReplaceOptions::builder().upsert(true).build(),
            )
            .await?;

        log::info!("Wrote record {}", key_path);
        Ok(())
    }
}
