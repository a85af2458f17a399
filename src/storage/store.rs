use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::Storage;

/// What actually lands in storage for every key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: Value,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub version: String,
}

/// Rewrites a payload saved by `from` into the shape `to` expects.
#[derive(Debug, Clone)]
pub struct Migration {
    pub from: String,
    pub to: String,
    pub apply: fn(Value) -> Value,
}

/// Versioned, namespaced JSON persistence over a raw `Storage`.
///
/// Every operation is best effort: failures are logged and reported through
/// the return value, never propagated.
#[derive(Debug)]
pub struct ProgressStore<S> {
    storage: S,
    prefix: String,
    version: String,
    migrations: Vec<Migration>,
}

impl<S: Storage> ProgressStore<S> {
    pub fn new(storage: S, prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            version: version.into(),
            migrations: Vec::new(),
        }
    }

    pub fn with_migrations(mut self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[cfg(test)]
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn save_data<T: Serialize>(&mut self, key: &str, data: &T) -> bool {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                error!(key, error = %e, "failed to serialize save data");
                return false;
            }
        };
        let envelope = Envelope {
            data,
            timestamp: Utc::now().timestamp_millis(),
            version: self.version.clone(),
        };
        self.write_envelope(key, &envelope)
    }

    fn write_envelope(&mut self, key: &str, envelope: &Envelope) -> bool {
        let json = match serde_json::to_string(envelope) {
            Ok(json) => json,
            Err(e) => {
                error!(key, error = %e, "failed to encode envelope");
                return false;
            }
        };
        let full_key = self.full_key(key);
        match self.storage.set(&full_key, &json) {
            Ok(()) => {
                debug!(key = %full_key, bytes = json.len(), "data saved");
                true
            }
            Err(e) => {
                error!(key = %full_key, error = %e, "failed to save data");
                false
            }
        }
    }

    /// Returns `None` when the key is absent or its contents do not parse.
    pub fn load_data<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let envelope = self.read_envelope(key)?;
        let data = self.migrate(key, envelope);
        match serde_json::from_value(data) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(key, error = %e, "saved data has an unexpected shape");
                None
            }
        }
    }

    fn read_envelope(&self, key: &str) -> Option<Envelope> {
        let full_key = self.full_key(key);
        let raw = match self.storage.get(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(key = %full_key, error = %e, "failed to read data");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                error!(key = %full_key, error = %e, "failed to parse saved data");
                None
            }
        }
    }

    /// Walks registered migrations from the saved version towards the running
    /// one. Without a complete path the payload is used unchanged.
    fn migrate(&self, key: &str, envelope: Envelope) -> Value {
        if envelope.version == self.version {
            return envelope.data;
        }
        warn!(
            key,
            saved = %envelope.version,
            running = %self.version,
            "save version mismatch"
        );

        let mut version = envelope.version.clone();
        let mut data = envelope.data.clone();
        for _ in 0..=self.migrations.len() {
            if version == self.version {
                info!(key, from = %envelope.version, to = %version, "save migrated");
                return data;
            }
            match self.migrations.iter().find(|m| m.from == version) {
                Some(migration) => {
                    data = (migration.apply)(data);
                    version = migration.to.clone();
                }
                None => break,
            }
        }

        warn!(key, saved = %envelope.version, "no migration path, using saved data as-is");
        envelope.data
    }

    pub fn delete_data(&mut self, key: &str) -> bool {
        let full_key = self.full_key(key);
        match self.storage.remove(&full_key) {
            Ok(()) => true,
            Err(e) => {
                error!(key = %full_key, error = %e, "failed to delete data");
                false
            }
        }
    }

    pub fn has_data(&self, key: &str) -> bool {
        matches!(self.storage.get(&self.full_key(key)), Ok(Some(_)))
    }

    /// Keys inside this store's namespace, without the prefix.
    pub fn get_all_keys(&self) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
                .collect(),
            Err(e) => {
                error!(error = %e, "failed to list keys");
                Vec::new()
            }
        }
    }

    pub fn clear_all_data(&mut self) -> bool {
        let mut ok = true;
        for key in self.get_all_keys() {
            ok &= self.delete_data(&key);
        }
        info!(ok, "all saved data cleared");
        ok
    }

    /// Every envelope in the namespace as one JSON object keyed by the
    /// unprefixed key.
    pub fn export_data(&self) -> Option<String> {
        let mut all = Map::new();
        for key in self.get_all_keys() {
            if let Some(envelope) = self.read_envelope(&key) {
                match serde_json::to_value(envelope) {
                    Ok(value) => {
                        all.insert(key, value);
                    }
                    Err(e) => error!(key, error = %e, "failed to export entry"),
                }
            }
        }
        match serde_json::to_string_pretty(&Value::Object(all)) {
            Ok(json) => Some(json),
            Err(e) => {
                error!(error = %e, "failed to encode export");
                None
            }
        }
    }

    /// Replaces the namespace with the entries produced by `export_data`.
    /// Nothing is touched if the document does not parse.
    pub fn import_data(&mut self, json: &str) -> bool {
        let entries: Map<String, Value> = match serde_json::from_str(json) {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "import document is not a JSON object");
                return false;
            }
        };

        let mut parsed = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match serde_json::from_value::<Envelope>(value) {
                Ok(envelope) => parsed.push((key, envelope)),
                Err(e) => {
                    error!(key, error = %e, "import entry is not a save envelope");
                    return false;
                }
            }
        }

        let mut ok = self.clear_all_data();
        for (key, envelope) in &parsed {
            ok &= self.write_envelope(key, envelope);
        }
        info!(entries = parsed.len(), ok, "data imported");
        ok
    }
}
