use super::backend::SessionBackend;
use crate::error::{GridError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const BLOB_EXT: &str = ".json";

/// Session storage in a directory, one JSON file per grid key.
///
/// The directory is the session: hosts point it at a per-session location
/// (a temp dir, a runtime dir) and wipe it when the session ends.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}{}", encode_key(key), BLOB_EXT))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(GridError::Io)?;
        }
        Ok(())
    }
}

impl SessionBackend for FsBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(GridError::Io)?;
        Ok(Some(content))
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.blob_path(key);

        // Atomic write
        let tmp = self.root.join(format!(".view-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, blob).map_err(GridError::Io)?;
        fs::rename(&tmp, &path).map_err(GridError::Io)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.blob_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(GridError::Io)?;
        }
        Ok(())
    }

    fn clear(&self, prefix: &str) -> Result<usize> {
        let mut removed = 0;
        for key in self.keys()? {
            if key.starts_with(prefix) {
                self.remove(&key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(GridError::Io)? {
            let entry = entry.map_err(GridError::Io)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Some(stem) = name.strip_suffix(BLOB_EXT) {
                if let Some(key) = decode_key(stem) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Percent-encodes the key so any key is a safe file name. A leading dot is
/// escaped too, since dot-files are reserved for in-flight writes.
fn encode_key(key: &str) -> String {
    let encoded = urlencoding::encode(key);
    match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{}", rest),
        None => encoded.into_owned(),
    }
}

fn decode_key(name: &str) -> Option<String> {
    urlencoding::decode(name).ok().map(|key| key.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn key_encoding_roundtrips_paths() {
        let key = "editgrid:/characters/list";
        let encoded = encode_key(key);
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains(':'));
        assert_eq!(decode_key(&encoded).as_deref(), Some(key));
    }

    #[test]
    fn dotted_keys_stay_visible() {
        let temp = TempDir::new().unwrap();
        let backend = FsBackend::new(temp.path());
        backend.save(".hidden", "1").unwrap();
        backend.save("a b/ü", "2").unwrap();
        assert_eq!(backend.keys().unwrap(), vec![".hidden", "a b/ü"]);
        assert_eq!(backend.load(".hidden").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let backend = FsBackend::new(temp.path().join("session"));

        assert_eq!(backend.load("editgrid:/a").unwrap(), None);
        backend.save("editgrid:/a", r#"{"sorting":[]}"#).unwrap();
        assert_eq!(
            backend.load("editgrid:/a").unwrap().as_deref(),
            Some(r#"{"sorting":[]}"#)
        );
        assert_eq!(backend.keys().unwrap(), vec!["editgrid:/a"]);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let temp = TempDir::new().unwrap();
        let backend = FsBackend::new(temp.path());
        backend.save("k", "1").unwrap();
        backend.save("k", "2").unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json"]);
        assert_eq!(backend.load("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn clear_removes_prefixed_blobs() {
        let temp = TempDir::new().unwrap();
        let backend = FsBackend::new(temp.path());
        backend.save("editgrid:a", "1").unwrap();
        backend.save("editgrid:b", "2").unwrap();
        backend.save("notes", "3").unwrap();
        assert_eq!(backend.clear("editgrid:").unwrap(), 2);
        assert_eq!(backend.keys().unwrap(), vec!["notes"]);
    }

    #[test]
    fn missing_dir_has_no_keys() {
        let temp = TempDir::new().unwrap();
        let backend = FsBackend::new(temp.path().join("nope"));
        assert!(backend.keys().unwrap().is_empty());
        backend.remove("x").unwrap();
    }
}
