use super::types::StoredObject;
use serde::Deserialize;
use std::ops::Deref;
use surrealdb::{
    engine::any::{connect, Any},
    Error, Surreal,
};

const NAMESPACE: &str = "rag";
const DATABASE: &str = "index";

#[derive(Clone)]
pub struct SurrealDbClient {
    pub client: Surreal<Any>,
}

#[derive(Deserialize)]
struct CountRow {
    count: usize,
}

impl SurrealDbClient {
    /// Opens the embedded vector index at the given directory, creating it on
    /// first use.
    pub async fn open(index_dir: &str) -> Result<Self, Error> {
        let db = connect(format!("surrealkv://{index_dir}")).await?;

        db.use_ns(NAMESPACE).use_db(DATABASE).await?;

        Ok(SurrealDbClient { client: db })
    }

    /// Defines the HNSW index over chunk embeddings. Idempotent, so callers
    /// run it on startup and again before each ingestion write.
    pub async fn ensure_chunk_index(&self, dimensions: usize) -> Result<(), Error> {
        self.client
            .query(format!(
                "DEFINE INDEX IF NOT EXISTS idx_embedding_chunks ON document_chunk FIELDS embedding HNSW DIMENSION {dimensions}"
            ))
            .await?;

        Ok(())
    }

    /// Operation to store a object in SurrealDB, requires the struct to implement StoredObject
    ///
    /// # Arguments
    /// * `item` - The item to be stored
    ///
    /// # Returns
    /// * `Result` - Item or Error
    pub async fn store_item<T>(&self, item: T) -> Result<Option<T>, Error>
    where
        T: StoredObject + Send + Sync + 'static,
    {
        self.client
            .create((T::table_name(), item.get_id()))
            .content(item)
            .await
    }

    /// Operation to retrieve all objects from a certain table, requires the struct to implement StoredObject
    ///
    /// # Returns
    /// * `Result` - Vec<T> or Error
    pub async fn get_all_stored_items<T>(&self) -> Result<Vec<T>, Error>
    where
        T: for<'de> StoredObject,
    {
        self.client.select(T::table_name()).await
    }

    /// Operation to retrieve a single object by its ID, requires the struct to implement StoredObject
    ///
    /// # Arguments
    /// * `id` - The ID of the item to retrieve
    ///
    /// # Returns
    /// * `Result<Option<T>, Error>` - The found item or Error
    pub async fn get_item<T>(&self, id: &str) -> Result<Option<T>, Error>
    where
        T: for<'de> StoredObject,
    {
        self.client.select((T::table_name(), id)).await
    }

    /// Counts the rows of a stored object's table.
    pub async fn count_table<T>(&self) -> Result<usize, Error>
    where
        T: StoredObject,
    {
        let rows: Vec<CountRow> = self
            .client
            .query("SELECT count() AS count FROM type::table($table) GROUP ALL")
            .bind(("table", T::table_name()))
            .await?
            .take(0)?;

        Ok(rows.first().map_or(0, |row| row.count))
    }
}

impl Deref for SurrealDbClient {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SurrealDbClient {
    /// Create an in-memory SurrealDB client for testing.
    pub async fn memory(namespace: &str, database: &str) -> Result<Self, Error> {
        let db = connect("mem://").await?;

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::document_chunk::DocumentChunk;
    use uuid::Uuid;

    async fn memory_db() -> SurrealDbClient {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string(); // ensures isolation per test run
        SurrealDbClient::memory(namespace, database)
            .await
            .expect("Failed to start in-memory surrealdb")
    }

    #[tokio::test]
    async fn test_store_and_count() {
        let db = memory_db().await;

        assert_eq!(
            db.count_table::<DocumentChunk>()
                .await
                .expect("count should succeed"),
            0
        );

        for i in 0..3 {
            let chunk = DocumentChunk::new(
                format!("file-{i}.md"),
                format!("chunk number {i}"),
                vec![0.0; 8],
            );
            db.store_item(chunk).await.expect("Failed to store");
        }

        assert_eq!(
            db.count_table::<DocumentChunk>()
                .await
                .expect("count should succeed"),
            3
        );
    }

    #[tokio::test]
    async fn test_get_all_stored_items() {
        let db = memory_db().await;

        let chunk = DocumentChunk::new("a.md".into(), "Hello world.".into(), vec![0.1; 8]);
        db.store_item(chunk).await.expect("Failed to store");

        let all: Vec<DocumentChunk> = db
            .get_all_stored_items()
            .await
            .expect("Failed to select all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source, "a.md");
    }

    #[tokio::test]
    async fn test_ensure_chunk_index_is_idempotent() {
        let db = memory_db().await;

        db.ensure_chunk_index(8)
            .await
            .expect("first definition should succeed");
        db.ensure_chunk_index(8)
            .await
            .expect("second definition should succeed");
    }
}
