use crate::errors::{AppError, AppResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// The external document store boundary: schema-less collections of JSON
/// documents with store-assigned ids. Returned documents always carry their
/// id injected under `"id"`, mirroring how the web clients read them.
pub trait DocumentStore: Send + Sync {
    fn create(&self, collection: &str, body: &Value) -> AppResult<String>;
    fn read(&self, collection: &str, id: &str) -> AppResult<Option<Value>>;
    fn update(&self, collection: &str, id: &str, patch: &Value) -> AppResult<()>;
    fn delete(&self, collection: &str, id: &str) -> AppResult<()>;
    fn list(&self, collection: &str, order_field: Option<&str>) -> AppResult<Vec<Value>>;
}

pub fn with_id(id: &str, body: &Value) -> Value {
    let mut object = body.as_object().cloned().unwrap_or_default();
    object.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(object)
}

/// Top-level field merge, the update semantics of the document store:
/// fields in the patch replace fields in the stored body, everything else
/// is left alone.
pub fn merge_fields(body: &mut Map<String, Value>, patch: &Value) {
    if let Some(patch) = patch.as_object() {
        for (key, value) in patch {
            body.insert(key.clone(), value.clone());
        }
    }
}

pub fn order_documents(documents: &mut [Value], order_field: Option<&str>) {
    let Some(field) = order_field else {
        return;
    };
    documents.sort_by(|a, b| {
        let left = a.get(field).and_then(Value::as_str).unwrap_or("").to_lowercase();
        let right = b.get(field).and_then(Value::as_str).unwrap_or("").to_lowercase();
        left.cmp(&right)
    });
}

/// In-memory store used by tests and ephemeral tooling. Documents keep
/// insertion order per collection so unordered listings are deterministic.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<(String, Map<String, Value>)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn create(&self, collection: &str, body: &Value) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        let object = body.as_object().cloned().unwrap_or_default();
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), object));
        Ok(id)
    }

    fn read(&self, collection: &str, id: &str) -> AppResult<Option<Value>> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        let Some(entries) = collections.get(collection) else {
            return Ok(None);
        };
        Ok(entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(entry_id, body)| with_id(entry_id, &Value::Object(body.clone()))))
    }

    fn update(&self, collection: &str, id: &str, patch: &Value) -> AppResult<()> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::NotFound(format!("Collection '{}' is empty", collection)))?;
        let Some((_, body)) = entries.iter_mut().find(|(entry_id, _)| entry_id == id) else {
            return Err(AppError::NotFound(format!(
                "Document '{}/{}' not found",
                collection, id
            )));
        };
        merge_fields(body, patch);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        if let Some(entries) = collections.get_mut(collection) {
            entries.retain(|(entry_id, _)| entry_id != id);
        }
        Ok(())
    }

    fn list(&self, collection: &str, order_field: Option<&str>) -> AppResult<Vec<Value>> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        let mut documents: Vec<Value> = collections
            .get(collection)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, body)| with_id(id, &Value::Object(body.clone())))
                    .collect()
            })
            .unwrap_or_default();
        order_documents(&mut documents, order_field);
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, MemoryStore};
    use serde_json::json;

    #[test]
    fn create_read_update_delete_round_trip() {
        let store = MemoryStore::new();
        let id = store
            .create("companies", &json!({"companyName": "Acme", "industry": "Tech"}))
            .expect("create");

        let doc = store.read("companies", &id).expect("read").expect("present");
        assert_eq!(doc["companyName"], "Acme");
        assert_eq!(doc["id"], json!(id));

        store
            .update("companies", &id, &json!({"industry": "Retail"}))
            .expect("update");
        let doc = store.read("companies", &id).expect("read").expect("present");
        assert_eq!(doc["industry"], "Retail");
        assert_eq!(doc["companyName"], "Acme");

        store.delete("companies", &id).expect("delete");
        assert!(store.read("companies", &id).expect("read").is_none());
    }

    #[test]
    fn updating_a_missing_document_is_not_found() {
        let store = MemoryStore::new();
        store.create("companies", &json!({})).expect("create");
        let err = store
            .update("companies", "absent", &json!({"x": 1}))
            .expect_err("missing doc");
        assert!(matches!(err, crate::errors::AppError::NotFound(_)));
    }

    #[test]
    fn listing_preserves_insertion_order_and_supports_ordering() {
        let store = MemoryStore::new();
        store.create("companies", &json!({"companyName": "Zeta"})).expect("create");
        store.create("companies", &json!({"companyName": "Acme"})).expect("create");

        let unordered = store.list("companies", None).expect("list");
        assert_eq!(unordered[0]["companyName"], "Zeta");

        let ordered = store.list("companies", Some("companyName")).expect("list");
        assert_eq!(ordered[0]["companyName"], "Acme");
    }
}
