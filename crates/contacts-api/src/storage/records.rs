//! sled-backed record store

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::path::Path;

use super::{Record, RecordStore, StorageError, StorageResult};

/// Contact records stored as JSON in a sled tree, keyed by big-endian id
#[derive(Clone)]
pub struct SledRecordStore {
    db: sled::Db,
    records: sled::Tree,
}

impl SledRecordStore {
    const TREE: &'static str = "contacts";

    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory database removed on drop
    pub fn temporary() -> StorageResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StorageResult<Self> {
        let records = db.open_tree(Self::TREE)?;
        Ok(Self { db, records })
    }

    fn decode(bytes: &[u8]) -> StorageResult<Record> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn write(&self, record: &Record) -> StorageResult<()> {
        self.records
            .insert(record.id.to_be_bytes(), serde_json::to_vec(record)?)?;
        self.records.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SledRecordStore {
    async fn list(&self) -> StorageResult<Vec<Record>> {
        self.records
            .iter()
            .values()
            .map(|bytes| Self::decode(&bytes?))
            .collect()
    }

    async fn get(&self, id: u64) -> StorageResult<Option<Record>> {
        self.records
            .get(id.to_be_bytes())?
            .map(|bytes| Self::decode(&bytes))
            .transpose()
    }

    async fn create(&self, infos: Map<String, Value>) -> StorageResult<Record> {
        // sled ids start at 0; contact ids start at 1
        let record = Record {
            id: self.db.generate_id()? + 1,
            infos,
            inserted_timestamp: Utc::now(),
        };
        self.write(&record)?;
        tracing::debug!(id = record.id, "record created");
        Ok(record)
    }

    async fn update(&self, id: u64, infos: Map<String, Value>) -> StorageResult<Record> {
        let mut record = self.get(id).await?.ok_or(StorageError::NotFound(id))?;
        record.infos = infos;
        self.write(&record)?;
        tracing::debug!(id, "record updated");
        Ok(record)
    }

    async fn delete(&self, id: u64) -> StorageResult<Option<Record>> {
        let removed = self
            .records
            .remove(id.to_be_bytes())?
            .map(|bytes| Self::decode(&bytes))
            .transpose()?;
        self.records.flush()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infos(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = SledRecordStore::temporary().unwrap();
        let first = store.create(infos(json!({"firstname": "Luke"}))).await.unwrap();
        let second = store.create(infos(json!({"firstname": "Leia"}))).await.unwrap();

        assert!(first.id >= 1);
        assert!(second.id > first.id);

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], first);
        assert_eq!(all[1], second);
    }

    #[tokio::test]
    async fn test_update_replaces_infos() {
        let store = SledRecordStore::temporary().unwrap();
        let created = store.create(infos(json!({"firstname": "Luke"}))).await.unwrap();

        let updated = store
            .update(created.id, infos(json!({"firstname": "Ben"})))
            .await
            .unwrap();
        assert_eq!(updated.infos, infos(json!({"firstname": "Ben"})));
        assert_eq!(updated.inserted_timestamp, created.inserted_timestamp);
        assert_eq!(store.get(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = SledRecordStore::temporary().unwrap();
        let err = store.update(42, Map::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SledRecordStore::temporary().unwrap();
        let created = store.create(infos(json!({"a": 1}))).await.unwrap();

        assert_eq!(store.delete(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(store.delete(created.id).await.unwrap(), None);
        assert_eq!(store.get(created.id).await.unwrap(), None);
    }
}
