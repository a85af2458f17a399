use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{Storage, StorageError};

const EXTENSION: &str = "json";

/// One file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", encode_key(key)))
    }
}

/// Keys become file names. Bytes outside `[A-Za-z0-9_-]` are written as
/// `%XX` so `decode_key` can recover the key exactly.
fn encode_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name
}

/// Inverse of `encode_key`. `None` for names this storage did not write.
fn decode_key(name: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(name.len());
    let mut rest = name.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'%' {
            let hex = std::str::from_utf8(tail.get(..2)?).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write then rename so a crash never leaves half a save behind.
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let pattern = format!("{dir}/*.{EXTENSION}");
        let mut keys: Vec<String> = glob::glob(&pattern)?
            .filter_map(|entry| entry.ok())
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?.to_owned();
                decode_key(&stem)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.get("cyberops_progress").unwrap(), None);
        storage.set("cyberops_progress", "{\"a\":1}").unwrap();
        assert_eq!(
            storage.get("cyberops_progress").unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        storage.remove("cyberops_progress").unwrap();
        assert_eq!(storage.get("cyberops_progress").unwrap(), None);
        // Removing twice is fine.
        storage.remove("cyberops_progress").unwrap();
    }

    #[test]
    fn keys_lists_json_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        storage.set("cyberops_stats", "{}").unwrap();
        storage.set("cyberops_progress", "{}").unwrap();
        fs::write(dir.path().join("cyber-ops.log"), "noise").unwrap();

        assert_eq!(
            storage.keys().unwrap(),
            vec!["cyberops_progress".to_string(), "cyberops_stats".to_string()]
        );
    }

    #[test]
    fn unsafe_key_characters_stay_inside_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        storage.set("../escape", "x").unwrap();
        assert!(dir.path().join("%2E%2E%2Fescape.json").exists());
        assert_eq!(storage.keys().unwrap(), vec!["../escape".to_string()]);
        assert_eq!(storage.get("../escape").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn keys_survive_file_name_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        storage.set("cyber.ops_progress", "{}").unwrap();
        storage.set("cyber ops/100%", "{}").unwrap();
        // Not written by this storage: a stray percent sign.
        fs::write(dir.path().join("bad%zz.json"), "{}").unwrap();

        assert_eq!(
            storage.keys().unwrap(),
            vec!["cyber ops/100%".to_string(), "cyber.ops_progress".to_string()]
        );
    }

    #[test]
    fn decode_rejects_truncated_escapes() {
        assert_eq!(decode_key("abc%2"), None);
        assert_eq!(decode_key("abc%"), None);
        assert_eq!(decode_key("a%2Eb").as_deref(), Some("a.b"));
    }
}
