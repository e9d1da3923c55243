use crate::errors::{AppError, AppResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Object storage boundary for uploaded assets (company logos). Stored
/// objects are addressed by the relative key returned from `put`.
pub trait ObjectStorage: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> AppResult<String>;
    fn delete(&self, key: &str) -> AppResult<()>;
}

fn sanitize_component(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '-' | '_' | '.') {
                character
            } else {
                '-'
            }
        })
        .collect();
    // reject path traversal outright rather than trying to repair it
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Decodes a `data:<mime>;base64,<payload>` URL into its extension and raw
/// bytes. Anything else is a policy error: uploads only arrive inline.
pub fn decode_data_url(data_url: &str) -> AppResult<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::Policy("Upload must be a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::Policy("Malformed data URL".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::Policy("Data URL must be base64-encoded".to_string()))?;

    let extension = match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        other => {
            return Err(AppError::Policy(format!(
                "Unsupported upload content type: '{}'",
                other
            )))
        }
    };

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|err| AppError::Policy(format!("Invalid base64 payload: {}", err)))?;
    Ok((extension.to_string(), bytes))
}

pub fn logo_key(company_id: &str, extension: &str) -> String {
    format!(
        "logos/{}-{}.{}",
        sanitize_component(company_id),
        Uuid::new_v4(),
        sanitize_component(extension)
    )
}

/// Filesystem-backed storage rooted at the configured uploads directory.
#[derive(Debug)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for component in key.split('/') {
            path.push(sanitize_component(component));
        }
        path
    }
}

impl ObjectStorage for FsStorage {
    fn put(&self, key: &str, bytes: &[u8]) -> AppResult<String> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        fs::write(&path, bytes).map_err(|err| AppError::Io(err.to_string()))?;
        Ok(key.to_string())
    }

    fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // deleting an already-absent object is not an error
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Io(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_data_url, logo_key, FsStorage, ObjectStorage};
    use crate::errors::AppError;

    #[test]
    fn decodes_a_png_data_url() {
        let data_url = "data:image/png;base64,aGVsbG8=";
        let (extension, bytes) = decode_data_url(data_url).expect("decode");
        assert_eq!(extension, "png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn rejects_non_data_urls_and_unknown_types() {
        assert!(matches!(
            decode_data_url("https://cdn.example/logo.png"),
            Err(AppError::Policy(_))
        ));
        assert!(matches!(
            decode_data_url("data:application/x-msdownload;base64,aGVsbG8="),
            Err(AppError::Policy(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,!!not base64!!"),
            Err(AppError::Policy(_))
        ));
    }

    #[test]
    fn put_and_delete_round_trip_under_the_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FsStorage::new(dir.path());

        let key = logo_key("company-1", "png");
        storage.put(&key, b"logo-bytes").expect("put");
        assert!(dir.path().join(&key).exists());

        storage.delete(&key).expect("delete");
        assert!(!dir.path().join(&key).exists());
        // idempotent
        storage.delete(&key).expect("delete twice");
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FsStorage::new(dir.path());

        storage.put("../escape.txt", b"x").expect("put");
        assert!(!dir.path().parent().expect("parent").join("escape.txt").exists());
    }
}
