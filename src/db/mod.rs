use crate::errors::{AppError, AppResult};
use crate::models::AppSettings;
use crate::store::{merge_fields, order_documents, with_id, DocumentStore};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// SQLite-backed document store. Collections share one `documents` table
/// keyed by (collection, id); bodies are stored as JSON text so the schema
/// never has to chase the raw documents' field drift.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = 'app'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(serde_json::from_str::<AppSettings>(&raw).unwrap_or_default()),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn update_settings(&self, update: Value) -> AppResult<AppSettings> {
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        if let Some(merged_map) = merged.as_object_mut() {
            merge_fields(merged_map, &update);
        }
        let settings: AppSettings = serde_json::from_value(merged)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO settings (key, value_json, updated_at)
             VALUES ('app', ?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![serde_json::to_string(&settings)?, Utc::now().to_rfc3339()],
        )?;

        Ok(settings)
    }

    fn read_body(&self, collection: &str, id: &str) -> AppResult<Option<Map<String, Value>>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT body_json FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => {
                let body: Value = serde_json::from_str(&raw)?;
                Ok(Some(body.as_object().cloned().unwrap_or_default()))
            }
            None => Ok(None),
        }
    }
}

impl DocumentStore for Database {
    fn create(&self, collection: &str, body: &Value) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let object = body.as_object().cloned().unwrap_or_default();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, body_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                collection,
                id,
                serde_json::to_string(&Value::Object(object))?,
                now
            ],
        )?;
        Ok(id)
    }

    fn read(&self, collection: &str, id: &str) -> AppResult<Option<Value>> {
        Ok(self
            .read_body(collection, id)?
            .map(|body| with_id(id, &Value::Object(body))))
    }

    fn update(&self, collection: &str, id: &str, patch: &Value) -> AppResult<()> {
        let Some(mut body) = self.read_body(collection, id)? else {
            return Err(AppError::NotFound(format!(
                "Document '{}/{}' not found",
                collection, id
            )));
        };
        merge_fields(&mut body, patch);

        let conn = self.lock()?;
        conn.execute(
            "UPDATE documents SET body_json = ?1, updated_at = ?2
             WHERE collection = ?3 AND id = ?4",
            params![
                serde_json::to_string(&Value::Object(body))?,
                Utc::now().to_rfc3339(),
                collection,
                id
            ],
        )?;
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(())
    }

    fn list(&self, collection: &str, order_field: Option<&str>) -> AppResult<Vec<Value>> {
        let conn = self.lock()?;
        let mut statement = conn.prepare(
            "SELECT id, body_json FROM documents WHERE collection = ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let rows = statement.query_map([collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, raw) = row?;
            let body: Value = serde_json::from_str(&raw)?;
            documents.push(with_id(&id, &body));
        }
        order_documents(&mut documents, order_field);
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::store::DocumentStore;
    use serde_json::json;

    #[test]
    fn documents_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("directory.sqlite");

        let id = {
            let db = Database::new(&path).expect("open");
            db.create("companies", &json!({"companyName": "Acme"}))
                .expect("create")
        };

        let db = Database::new(&path).expect("reopen");
        let doc = db.read("companies", &id).expect("read").expect("present");
        assert_eq!(doc["companyName"], "Acme");
    }

    #[test]
    fn update_merges_fields_and_keeps_the_rest() {
        let db = Database::open_in_memory().expect("open");
        let id = db
            .create("companies", &json!({"companyName": "Acme", "rank": 1}))
            .expect("create");

        db.update("companies", &id, &json!({"rank": 2, "featured": true}))
            .expect("update");

        let doc = db.read("companies", &id).expect("read").expect("present");
        assert_eq!(doc["companyName"], "Acme");
        assert_eq!(doc["rank"], 2);
        assert_eq!(doc["featured"], true);
    }

    #[test]
    fn list_orders_by_creation_then_by_requested_field() {
        let db = Database::open_in_memory().expect("open");
        db.create("companies", &json!({"companyName": "Zeta"})).expect("create");
        db.create("companies", &json!({"companyName": "Acme"})).expect("create");

        let by_creation = db.list("companies", None).expect("list");
        assert_eq!(by_creation[0]["companyName"], "Zeta");

        let by_name = db.list("companies", Some("companyName")).expect("list");
        assert_eq!(by_name[0]["companyName"], "Acme");
    }

    #[test]
    fn settings_round_trip_with_partial_update() {
        let db = Database::open_in_memory().expect("open");
        let defaults = db.get_settings().expect("defaults");
        assert_eq!(defaults.page_size, 10);

        let updated = db
            .update_settings(json!({"pageSize": 25}))
            .expect("update");
        assert_eq!(updated.page_size, 25);
        assert_eq!(updated.geo_defaults.country, "Russia");

        let reloaded = db.get_settings().expect("reload");
        assert_eq!(reloaded.page_size, 25);
    }
}
