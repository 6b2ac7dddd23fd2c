use anyhow::{Context, Result};
use futures::future::BoxFuture;
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{
    Client, Collection, Database as MongoDatabase, IndexModel,
    bson::{Document, doc, oid::ObjectId, to_document},
};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::CONFIG;
use crate::data_models::IndexedDocument;

/// Collection names as constants for consistency
pub mod collections {
    pub const DOCUMENTS: &str = "documents";
}

/// Main database wrapper providing connection management and collection access
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: MongoDatabase,
}

impl Database {
    /// Create a new Database instance with custom URI and database name.
    /// Useful for testing with a different database.
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        let mut client_options = ClientOptions::parse(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client =
            Client::with_options(client_options).context("Failed to create MongoDB client")?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to connect to MongoDB")?;

        log::info!("Connected to MongoDB database: {}", db_name);

        let db = client.database(db_name);

        Ok(Self { client, db })
    }

    /// Create a Database instance using environment configuration
    pub async fn from_config() -> Result<Self> {
        Self::new(&CONFIG.mongo_uri, &CONFIG.mongo_db_name).await
    }

    /// Get a typed collection by name
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.db.collection(name)
    }

    /// Get the underlying MongoDB client (for advanced operations)
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn documents(&self) -> Collection<IndexedDocument> {
        self.collection(collections::DOCUMENTS)
    }
}

// =============================================================================
// Generic CRUD operations
// =============================================================================

pub struct Repository<T>
where
    T: Send + Sync,
{
    collection: Collection<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection }
    }

    /// Insert a single document
    pub async fn insert(&self, doc: &T) -> Result<ObjectId> {
        let result = self
            .collection
            .insert_one(doc)
            .await
            .context("Failed to insert document")?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow::anyhow!("Failed to get inserted ObjectId"))
    }

    /// Find a document by ObjectId
    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<T>> {
        self.find_one(doc! { "_id": id }).await
    }

    /// Find a single document matching a filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        self.collection
            .find_one(filter)
            .await
            .context("Failed to find document")
    }

    /// Find all documents matching a filter, in natural (insertion) order
    pub async fn find(&self, filter: Document) -> Result<Vec<T>> {
        use futures::TryStreamExt;

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "_id": 1 })
            .await
            .context("Failed to execute find query")?;

        cursor
            .try_collect()
            .await
            .context("Failed to collect results")
    }

    pub async fn find_all(&self) -> Result<Vec<T>> {
        self.find(doc! {}).await
    }

    pub async fn delete_one(&self, filter: Document) -> Result<bool> {
        let result = self
            .collection
            .delete_one(filter)
            .await
            .context("Failed to delete document")?;

        Ok(result.deleted_count > 0)
    }

    /// Count documents matching a filter
    pub async fn count(&self, filter: Document) -> Result<u64> {
        self.collection
            .count_documents(filter)
            .await
            .context("Failed to count documents")
    }
}

// =============================================================================
// Document store seam
// =============================================================================

/// Where the search engine reads documents from and the indexer writes them to.
pub trait DocumentStore: Send + Sync {
    /// Every stored document, in insertion order.
    fn list_documents(&self) -> BoxFuture<'_, Result<Vec<IndexedDocument>>>;

    fn find_document(&self, id: ObjectId) -> BoxFuture<'_, Result<Option<IndexedDocument>>>;

    /// Stores `document`, replacing any previous document with the same filename.
    /// Returns the id the document is stored under.
    fn upsert_document(&self, document: IndexedDocument) -> BoxFuture<'_, Result<ObjectId>>;
}

/// MongoDB-backed store for the `documents` collection.
pub struct DocumentRepo {
    repo: Repository<IndexedDocument>,
    collection: Collection<IndexedDocument>,
}

impl DocumentRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            repo: Repository::new(db.documents()),
            collection: db.documents(),
        }
    }

    /// Creates the unique filename index. Safe to call on every start.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "filename": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection
            .create_index(index)
            .await
            .context("Failed to create filename index")?;
        Ok(())
    }

    pub async fn insert(&self, document: &IndexedDocument) -> Result<ObjectId> {
        self.repo.insert(document).await
    }

    /// Inserts or replaces the document with the same filename in one round trip, so
    /// concurrent indexers never race on the unique filename index.
    pub async fn upsert_by_filename(&self, document: &IndexedDocument) -> Result<ObjectId> {
        let mut serialized = to_document(document)?;
        // _id is immutable, only set it when the document is created
        serialized.remove("_id");

        let stored = self
            .collection
            .find_one_and_update(
                doc! { "filename": &document.filename },
                doc! {
                    "$set": serialized,
                    "$setOnInsert": { "_id": document.id },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .context("failed to upsert document")?
            .context("upsert returned no document")?;
        Ok(stored.id)
    }

    pub async fn find_by_filename(&self, filename: &str) -> Result<Option<IndexedDocument>> {
        self.repo.find_one(doc! { "filename": filename }).await
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<IndexedDocument>> {
        self.repo.find_by_id(id).await
    }

    pub async fn delete_by_filename(&self, filename: &str) -> Result<bool> {
        self.repo.delete_one(doc! { "filename": filename }).await
    }

    pub async fn list_all(&self) -> Result<Vec<IndexedDocument>> {
        self.repo.find_all().await
    }

    pub async fn count(&self) -> Result<u64> {
        self.repo.count(doc! {}).await
    }
}

impl DocumentStore for DocumentRepo {
    fn list_documents(&self) -> BoxFuture<'_, Result<Vec<IndexedDocument>>> {
        Box::pin(self.list_all())
    }

    fn find_document(&self, id: ObjectId) -> BoxFuture<'_, Result<Option<IndexedDocument>>> {
        Box::pin(self.find_by_id(id))
    }

    fn upsert_document(&self, document: IndexedDocument) -> BoxFuture<'_, Result<ObjectId>> {
        Box::pin(async move { self.upsert_by_filename(&document).await })
    }
}

/// In-process store, used when serving a corpus straight from disk without MongoDB.
#[derive(Default)]
pub struct MemoryDocuments {
    documents: RwLock<Vec<IndexedDocument>>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: Vec<IndexedDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl DocumentStore for MemoryDocuments {
    fn list_documents(&self) -> BoxFuture<'_, Result<Vec<IndexedDocument>>> {
        Box::pin(async move { Ok(self.documents.read().await.clone()) })
    }

    fn find_document(&self, id: ObjectId) -> BoxFuture<'_, Result<Option<IndexedDocument>>> {
        Box::pin(async move {
            Ok(self
                .documents
                .read()
                .await
                .iter()
                .find(|d| d.id == id)
                .cloned())
        })
    }

    fn upsert_document(&self, mut document: IndexedDocument) -> BoxFuture<'_, Result<ObjectId>> {
        Box::pin(async move {
            let mut documents = self.documents.write().await;
            match documents.iter_mut().find(|d| d.filename == document.filename) {
                Some(existing) => {
                    document.id = existing.id;
                    *existing = document;
                    Ok(existing.id)
                }
                None => {
                    let id = document.id;
                    documents.push(document);
                    Ok(id)
                }
            }
        })
    }
}

// =============================================================================
// Test utilities
// =============================================================================
